//! Recovers the API nonce from the config object the tracker page embeds.

use crate::config::SourceConfig;
use crate::error::{Result, SyncError};
use regex::Regex;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const NONCE_PATTERN: &str = r#""nonce"\s*:\s*"([^"]+)""#;

/// The embedded config object. Only `nonce` is required.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub nonce: String,
    pub extra: Map<String, Value>,
}

impl PageConfig {
    fn from_nonce(nonce: String) -> Self {
        Self {
            nonce,
            extra: Map::new(),
        }
    }
}

/// Find the `NAME = { ... };` assignment and return the object literal.
pub fn locate_config_object<'a>(body: &'a str, config_var: &str) -> Result<&'a str> {
    let pattern = format!(
        r"(?s)(?:\b(?:var|let|const)\s+)?\b{}\s*=\s*(\{{.*?\}});",
        regex::escape(config_var)
    );
    let re = Regex::new(&pattern).map_err(|e| SyncError::Config(e.to_string()))?;
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| SyncError::ConfigNotFound(config_var.to_string()))
}

/// Strict strategy: the object is valid JSON with a string `nonce`.
pub fn parse_structured(object: &str) -> std::result::Result<PageConfig, String> {
    let mut map: Map<String, Value> = serde_json::from_str(object).map_err(|e| e.to_string())?;
    match map.remove("nonce") {
        Some(Value::String(nonce)) if !nonce.is_empty() => Ok(PageConfig { nonce, extra: map }),
        Some(other) => Err(format!("nonce is not a string: {other}")),
        None => Err("object has no nonce".to_string()),
    }
}

/// Degraded strategy: pull a quoted `"nonce":"..."` pair out of the raw text.
pub fn match_nonce_pattern(object: &str) -> std::result::Result<PageConfig, String> {
    let re = Regex::new(NONCE_PATTERN).map_err(|e| e.to_string())?;
    re.captures(object)
        .and_then(|caps| caps.get(1))
        .map(|m| PageConfig::from_nonce(m.as_str().to_string()))
        .ok_or_else(|| "no quoted nonce pair".to_string())
}

/// Run both strategies in order against a page body.
pub fn extract_page_config(body: &str, config_var: &str) -> Result<PageConfig> {
    let object = locate_config_object(body, config_var)?;

    parse_structured(object).or_else(|strict_err| {
        debug!("Structured parse of {} failed: {}", config_var, strict_err);
        match_nonce_pattern(object).map_err(|fallback_err| {
            warn!(
                "Nonce fallback failed for {}: {} / {}",
                config_var, strict_err, fallback_err
            );
            SyncError::TokenParse(config_var.to_string())
        })
    })
}

pub struct TokenAcquirer {
    client: Client,
    page_url: String,
    config_var: String,
}

impl TokenAcquirer {
    pub fn new(source: &SourceConfig) -> Result<Self> {
        // The tracker rejects non-browser clients.
        let client = Client::builder()
            .user_agent(source.user_agent.as_str())
            .build()
            .map_err(|e| SyncError::Config(format!("building HTTP client: {e}")))?;

        Ok(Self {
            client,
            page_url: source.page_url.clone(),
            config_var: source.config_var.clone(),
        })
    }

    pub async fn acquire(&self) -> Result<PageConfig> {
        info!("Visiting {} to get security token...", self.page_url);

        let response = self
            .client
            .get(&self.page_url)
            .send()
            .await
            .map_err(|e| SyncError::SourcePageUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::SourcePageUnreachable(format!(
                "{} returned HTTP {}",
                self.page_url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::SourcePageUnreachable(e.to_string()))?;

        let config = extract_page_config(&body, &self.config_var)?;
        info!("Found nonce: {}", config.nonce);
        Ok(config)
    }
}
