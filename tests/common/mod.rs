#![allow(dead_code)]

use async_trait::async_trait;
use betsync::config::SourceConfig;
use betsync::dto::PersistedBetRecord;
use betsync::error::{Result, SyncError};
use betsync::store::BetStore;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::sync::Mutex;

pub const NONCE: &str = "abc123";
pub const PAGE_PATH: &str = "/bet-history/";
pub const API_PATH: &str = "/wp-json/ev/v1/bets";

pub fn source_config(server: &ServerGuard) -> SourceConfig {
    SourceConfig {
        page_url: format!("{}{}", server.url(), PAGE_PATH),
        api_url: format!("{}{}", server.url(), API_PATH),
        page_delay_ms: 0,
        ..Default::default()
    }
}

pub fn page_html(nonce: &str) -> String {
    format!(
        r#"<html><head><script>var EV_HR = {{"nonce":"{nonce}","ajaxUrl":"/wp-admin/admin-ajax.php"}};</script></head><body></body></html>"#
    )
}

/// `count` rows with consecutive ids starting at `first_id`.
pub fn rows_body(first_id: i64, count: usize) -> String {
    let rows: Vec<serde_json::Value> = (0..count as i64)
        .map(|i| {
            json!({
                "bet_id": (first_id + i).to_string(),
                "date": "2024-03-01",
                "book": "Pinnacle",
                "event": "Arsenal v Lens",
                "bet_text": "Arsenal -1.5",
                "stake": "10",
                "odds": "2.10",
                "fair_odds": "1.95",
                "probability": 0.5128,
                "value_ratio": 1.0769,
                "result": "W",
                "profit": "11.00",
            })
        })
        .collect();
    json!({ "rows": rows }).to_string()
}

pub async fn mock_token_page(server: &mut ServerGuard, nonce: &str) -> Mock {
    server
        .mock("GET", PAGE_PATH)
        .with_status(200)
        .with_header("content-type", "text/html; charset=UTF-8")
        .with_body(page_html(nonce))
        .create_async()
        .await
}

pub async fn mock_page(server: &mut ServerGuard, page: u32, body: String) -> Mock {
    server
        .mock("GET", API_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), page.to_string()),
            Matcher::UrlEncoded("pageSize".into(), "2000".into()),
            Matcher::UrlEncoded("mode".into(), "flat".into()),
        ]))
        .match_header("x-wp-nonce", NONCE)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

pub async fn mock_page_status(server: &mut ServerGuard, page: u32, status: usize) -> Mock {
    server
        .mock("GET", API_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), page.to_string()))
        .with_status(status)
        .with_body(r#"{"code":"rest_forbidden"}"#)
        .create_async()
        .await
}

/// In-memory table that records every write it sees.
#[derive(Default)]
pub struct MemoryStore {
    pub rows: Mutex<Vec<PersistedBetRecord>>,
    pub writes: Mutex<Vec<usize>>,
    pub fail_writes: Vec<usize>,
    pub fail_max_id: bool,
}

impl MemoryStore {
    pub fn failing_writes(indices: &[usize]) -> Self {
        Self {
            fail_writes: indices.to_vec(),
            ..Default::default()
        }
    }

    pub fn seeded(ids: impl IntoIterator<Item = i64>) -> Self {
        let rows = ids
            .into_iter()
            .map(|id| PersistedBetRecord {
                id,
                date: None,
                bookie: None,
                selection: None,
                event: None,
                stake: None,
                odds: None,
                closing_odds: None,
                result: None,
            })
            .collect();
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn ids(&self) -> Vec<i64> {
        self.rows.lock().unwrap().iter().map(|r| r.id).collect()
    }

    pub fn write_sizes(&self) -> Vec<usize> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BetStore for MemoryStore {
    async fn max_id(&self) -> Result<Option<i64>> {
        if self.fail_max_id {
            return Err(SyncError::StoreQuery("connection refused".to_string()));
        }
        Ok(self.rows.lock().unwrap().iter().map(|r| r.id).max())
    }

    async fn insert(&self, records: &[PersistedBetRecord]) -> Result<()> {
        let index = {
            let mut writes = self.writes.lock().unwrap();
            writes.push(records.len());
            writes.len() - 1
        };
        if self.fail_writes.contains(&index) {
            return Err(SyncError::StoreWrite(format!("batch {index} rejected")));
        }
        self.rows.lock().unwrap().extend_from_slice(records);
        Ok(())
    }
}
