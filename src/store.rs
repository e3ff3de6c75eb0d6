use crate::config::StoreConfig;
use crate::dto::{IdRow, PersistedBetRecord};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

/// The mirror table, as seen by the sync engine.
#[async_trait]
pub trait BetStore: Send + Sync {
    /// Highest stored id, `None` when the table is empty.
    async fn max_id(&self) -> Result<Option<i64>>;

    /// Append one batch as a single write.
    async fn insert(&self, records: &[PersistedBetRecord]) -> Result<()>;
}

/// PostgREST table behind a Supabase project.
pub struct SupabaseStore {
    client: Client,
    table_url: String,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.key)
                .map_err(|e| SyncError::Config(format!("invalid store key: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.key))
                .map_err(|e| SyncError::Config(format!("invalid store key: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Config(format!("building store client: {e}")))?;

        Ok(Self {
            client,
            table_url: format!(
                "{}/rest/v1/{}",
                config.url.trim_end_matches('/'),
                config.table
            ),
        })
    }
}

#[async_trait]
impl BetStore for SupabaseStore {
    async fn max_id(&self) -> Result<Option<i64>> {
        let response = self
            .client
            .get(&self.table_url)
            .query(&[("select", "id"), ("order", "id.desc"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| SyncError::StoreQuery(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::StoreQuery(e.to_string()))?;
        debug!("Max id response {}: {}", status, body);

        if !status.is_success() {
            return Err(SyncError::StoreQuery(format!("HTTP {status}: {body}")));
        }

        let rows: Vec<IdRow> =
            serde_json::from_str(&body).map_err(|e| SyncError::StoreQuery(e.to_string()))?;
        Ok(rows.first().map(|row| row.id))
    }

    async fn insert(&self, records: &[PersistedBetRecord]) -> Result<()> {
        let response = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=minimal")
            .json(records)
            .send()
            .await
            .map_err(|e| SyncError::StoreWrite(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::StoreWrite(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }
}
