use serde::{Deserialize, Serialize};

/// Row shape of the mirror table. `id` is the source `bet_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBetRecord {
    pub id: i64,
    pub date: Option<String>,
    pub bookie: Option<String>,
    pub selection: Option<String>,
    pub event: Option<String>,
    pub stake: Option<f64>,
    pub odds: Option<f64>,
    pub closing_odds: Option<f64>,
    pub result: Option<String>,
}

/// Projection used by the max-id query.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRow {
    pub id: i64,
}
