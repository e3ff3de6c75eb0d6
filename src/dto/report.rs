use serde::{Deserialize, Serialize};

/// Presentation projection of a bet, keyed by the report column titles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReportRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Bookie")]
    pub bookie: String,
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "Bet")]
    pub bet: String,
    #[serde(rename = "Stake")]
    pub stake: String,
    #[serde(rename = "Odds")]
    pub odds: String,
    #[serde(rename = "Fair Odds")]
    pub fair_odds: String,
    #[serde(rename = "Prob %")]
    pub prob_pct: String,
    #[serde(rename = "Value %")]
    pub value_pct: String,
    #[serde(rename = "EV")]
    pub ev: String,
    #[serde(rename = "Result")]
    pub result: String,
    #[serde(rename = "Profit")]
    pub profit: String,
}
