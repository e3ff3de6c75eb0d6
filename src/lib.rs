//! # betsync
//!
//! Incrementally mirrors a betting tracker's bet history into a PostgREST
//! (Supabase) table without duplicating rows already stored.
//!
//! ## Quick Start
//!
//! ```no_run
//! use betsync::{Config, SyncEngine};
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Load config.toml (optional) and environment overrides
//! let config = Config::new()?;
//!
//! // Scrape the nonce, paginate the API, insert ids above the stored max
//! let engine = SyncEngine::from_config(&config)?;
//! let summary = engine.sync().await?;
//! println!("inserted {} of {} fetched", summary.inserted(), summary.fetched);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! - **Token**: fetch the tracker page with a browser user agent and pull the
//!   `nonce` out of the embedded `var EV_HR = {...};` object
//! - **Pagination**: request pages of 2000 rows with the nonce header until a
//!   short or empty page; a 403 stops early and keeps what was fetched
//! - **Normalization**: report rows (EV, Prob %, Value %) and store rows
//!   (nullable floats)
//! - **Sync**: filter by the stored max id and insert in batches of 1000;
//!   a failed batch is logged and skipped, never retried
//!
//! ## Configuration
//!
//! ```toml
//! [source]
//! page_url = "https://tracker.example/bet-history/"
//! api_url = "https://tracker.example/wp-json/ev/v1/bets"
//!
//! [store]
//! url = "https://project.supabase.co"
//! key = "service_role_key"
//! table = "value_betting_edge_viper_entries"
//! ```
//!
//! `SOURCE_PAGE_URL`, `SOURCE_API_URL`, `SUPABASE_URL`, `SUPABASE_KEY` and
//! `SUPABASE_TABLE_NAME` override the file.

pub mod config;
pub mod dto;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod store;
pub mod sync;
pub mod token;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use dto::*;
pub use error::SyncError;
pub use fetcher::{PaginatedFetcher, Termination};
pub use store::{BetStore, SupabaseStore};
pub use sync::{BatchOutcome, SyncEngine, SyncSummary};
pub use token::TokenAcquirer;
