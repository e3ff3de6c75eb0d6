//! Pure mappings from source rows to the report and store shapes.
//!
//! The two paths coerce numbers differently. The report path defaults
//! missing or unparsable numbers to zero, which suppresses the derived
//! columns. The store path keeps missingness as `None` so the table gets a
//! NULL instead of a fake zero.

use crate::dto::{NormalizedReportRow, PersistedBetRecord, RawBetRecord};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Render a raw value as report text. Null and missing become "".
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Like [`display_value`] but keeps missingness for the store.
pub fn optional_text(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Report-path coercion: anything that is not a number reads as zero.
pub fn decimal_or_zero(value: Option<&Value>) -> Decimal {
    let parsed = match value {
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s),
        Some(Value::Bool(b)) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
        _ => None,
    };
    parsed.unwrap_or(Decimal::ZERO)
}

/// Store-path coercion: empty, null and non-numeric values become `None`.
pub fn clean_float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Parse the dedup key. Missing or non-integer ids yield `None`.
///
/// Numbers with an integral value (`42.0`) count as integers; strings must
/// be plain integers.
pub fn parse_bet_id(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            parse_decimal(&n.to_string())
                .filter(|d| d.fract().is_zero())
                .and_then(|d| d.to_i64())
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

// Derived columns go blank when the arithmetic leaves Decimal's range.

/// `stake * (value_ratio - 1)` to 2dp, only when both inputs are positive.
pub fn expected_value(stake: Decimal, value_ratio: Decimal) -> String {
    if stake <= Decimal::ZERO || value_ratio <= Decimal::ZERO {
        return String::new();
    }
    value_ratio
        .checked_sub(Decimal::ONE)
        .and_then(|edge| stake.checked_mul(edge))
        .map(|ev| fixed(ev, 2))
        .unwrap_or_default()
}

pub fn probability_pct(probability: Decimal) -> String {
    if probability <= Decimal::ZERO {
        return String::new();
    }
    probability
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|pct| format!("{}%", fixed(pct, 1)))
        .unwrap_or_default()
}

pub fn value_pct(value_ratio: Decimal) -> String {
    if value_ratio <= Decimal::ZERO {
        return String::new();
    }
    let Some(vp) = value_ratio
        .checked_sub(Decimal::ONE)
        .and_then(|edge| edge.checked_mul(Decimal::ONE_HUNDRED))
    else {
        return String::new();
    };
    let sign = if vp > Decimal::ZERO { "+" } else { "" };
    format!("{sign}{}%", fixed(vp, 1))
}

pub fn to_report_row(raw: &RawBetRecord) -> NormalizedReportRow {
    let stake = decimal_or_zero(raw.stake.as_ref());
    let value_ratio = decimal_or_zero(raw.value_ratio.as_ref());
    let probability = decimal_or_zero(raw.probability.as_ref());

    NormalizedReportRow {
        id: display_value(raw.bet_id.as_ref()),
        date: display_value(raw.date.as_ref()),
        bookie: display_value(raw.book.as_ref()),
        event: display_value(raw.event.as_ref()),
        bet: display_value(raw.bet_text.as_ref()),
        stake: display_value(raw.stake.as_ref()),
        odds: display_value(raw.odds.as_ref()),
        fair_odds: display_value(raw.fair_odds.as_ref()),
        prob_pct: probability_pct(probability),
        value_pct: value_pct(value_ratio),
        ev: expected_value(stake, value_ratio),
        result: display_value(raw.result.as_ref()),
        profit: display_value(raw.profit.as_ref()),
    }
}

/// Map a raw row to the store shape. The caller has already parsed `id`.
pub fn to_persisted_record(id: i64, raw: &RawBetRecord) -> PersistedBetRecord {
    PersistedBetRecord {
        id,
        date: optional_text(raw.date.as_ref()),
        bookie: optional_text(raw.book.as_ref()),
        selection: optional_text(raw.bet_text.as_ref()),
        event: optional_text(raw.event.as_ref()),
        stake: clean_float(raw.stake.as_ref()),
        odds: clean_float(raw.odds.as_ref()),
        closing_odds: clean_float(raw.fair_odds.as_ref()),
        result: optional_text(raw.result.as_ref()),
    }
}
