use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the source `rows` array.
///
/// Every field stays untyped: the tracker mixes strings, numbers and nulls for
/// the same column, so coercion happens in [`crate::normalize`].
/*
{"bet_id":"48213","date":"2023-11-28","book":"Pinnacle","event":"Arsenal v Lens",
 "bet_text":"Arsenal -1.5","stake":"25","odds":"2.10","fair_odds":"1.95",
 "probability":0.5128,"value_ratio":1.0769,"result":"W","profit":"27.50"}
*/
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBetRecord {
    pub bet_id: Option<Value>,
    pub date: Option<Value>,
    pub book: Option<Value>,
    pub event: Option<Value>,
    pub bet_text: Option<Value>,
    pub stake: Option<Value>,
    pub odds: Option<Value>,
    pub fair_odds: Option<Value>,
    pub probability: Option<Value>,
    pub value_ratio: Option<Value>,
    pub result: Option<Value>,
    pub profit: Option<Value>,
}

/// Body of a single page response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BetsPage {
    #[serde(default)]
    pub rows: Vec<RawBetRecord>,
}
