use anyhow::Context;
use betsync::sync::export_report;
use betsync::{Config, SyncEngine, SyncSummary};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "betsync")]
#[command(about = "Mirror bet history from the tracker into Supabase", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch bets and insert the ones newer than the stored max id
    Sync {
        /// Stop after diffing; report what would be inserted
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch bets and write them as report rows (JSON)
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::new()?;

    match cli.command {
        Commands::Sync { dry_run } => {
            config.validate()?;
            let engine = SyncEngine::from_config(&config)?;
            let summary = if dry_run {
                engine.dry_run().await?
            } else {
                engine.sync().await?
            };
            print_summary(&summary, dry_run);
        }
        Commands::Export { output } => {
            config.validate_source()?;
            let rows = export_report(&config.source).await?;
            let json = serde_json::to_string_pretty(&rows)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!("Wrote {} rows to {}", rows.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &SyncSummary, dry_run: bool) {
    println!("Fetched:      {}", summary.fetched);
    println!("Max stored:   {}", summary.max_existing_id);
    println!("New:          {}", summary.new_records);
    if dry_run {
        println!("Inserted:     0 (dry run)");
        return;
    }
    println!("Inserted:     {}", summary.inserted());
    if summary.failed_batches() > 0 {
        println!("Failed batches: {}", summary.failed_batches());
    }
}
