use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_CONFIG_VAR: &str = "EV_HR";
pub const DEFAULT_PAGE_SIZE: usize = 2000;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 1000;
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_TABLE: &str = "value_betting_edge_viper_entries";
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Page that embeds the nonce-bearing config object
    pub page_url: String,
    /// Paginated bets endpoint
    pub api_url: String,
    /// Name of the global the page assigns the config object to
    pub config_var: String,
    pub user_agent: String,
    pub page_size: usize,
    pub page_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_url: String::new(),
            api_url: String::new(),
            config_var: DEFAULT_CONFIG_VAR.to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
        }
    }
}

impl SourceConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub url: String,
    pub key: String,
    pub table: String,
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            table: DEFAULT_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

// Keep the service key out of logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("table", &self.table)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Load `config.toml` from the working directory when present, then apply
    /// environment overrides.
    pub fn new() -> Result<Self> {
        let path = Path::new("config.toml");
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        info!("Config: {:?}", config);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&config_str)
            .map_err(|e| SyncError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Overlay values from a variable lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *target = value;
            }
        };
        set(&mut self.source.page_url, "SOURCE_PAGE_URL");
        set(&mut self.source.api_url, "SOURCE_API_URL");
        set(&mut self.store.url, "SUPABASE_URL");
        set(&mut self.store.key, "SUPABASE_KEY");
        set(&mut self.store.table, "SUPABASE_TABLE_NAME");
    }

    /// Check what the source side of a run needs.
    pub fn validate_source(&self) -> Result<()> {
        require(&[
            ("SOURCE_PAGE_URL", &self.source.page_url),
            ("SOURCE_API_URL", &self.source.api_url),
        ])?;
        if self.source.page_size == 0 {
            return Err(SyncError::Config("page_size must be positive".to_string()));
        }
        Ok(())
    }

    /// Check everything a full sync needs.
    pub fn validate(&self) -> Result<()> {
        self.validate_source()?;
        require(&[
            ("SUPABASE_URL", &self.store.url),
            ("SUPABASE_KEY", &self.store.key),
        ])?;
        if self.store.batch_size == 0 {
            return Err(SyncError::Config("batch_size must be positive".to_string()));
        }
        Ok(())
    }
}

fn require(fields: &[(&str, &String)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Config(format!("{} must be set", missing.join(", "))))
    }
}
