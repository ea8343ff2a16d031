//! Row extraction and period/value normalization.
//!
//! Upstream rows have no fixed schema: the period may live in `year`,
//! `financial_year`, a `month` column or just a string, and the value under
//! any of several names. Normalization reduces every row to one
//! [`SeriesPoint`] or skips it.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::core::filters::{FilterSet, scalar_to_string};
use crate::core::series::SeriesPoint;

/// One upstream data row.
pub type Row = Map<String, Value>;

/// `YYYY` or `YYYY-MM`. `None` only if the pattern fails to compile, in
/// which case no period is ever found.
static PERIOD_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d{4}(?:-\d{2})?)").ok());

/// Keys tried first, in order, when looking for a row's value.
const VALUE_KEYS: [&str; 7] = [
    "value",
    "index_value",
    "index",
    "rate",
    "val",
    "current_price",
    "constant_price",
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Object rows of a payload: a bare array, or its `data` or `rows` array.
#[must_use]
pub fn extract_rows(payload: &Value) -> Vec<Row> {
    let list = match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => map
            .get("data")
            .and_then(Value::as_array)
            .or_else(|| map.get("rows").and_then(Value::as_array)),
        _ => None,
    };
    list.map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect()
    })
    .unwrap_or_default()
}

/// Rows agreeing with `filters` on every key they carry.
///
/// Keys a row lacks are ignored. When no row matches, every row is kept.
#[must_use]
pub fn match_filters(rows: Vec<Row>, filters: &FilterSet) -> Vec<Row> {
    if filters.is_empty() {
        return rows;
    }
    let matching: Vec<Row> = rows
        .iter()
        .filter(|row| {
            filters.iter().all(|(key, expected)| {
                row.get(key)
                    .is_none_or(|actual| cell_text(actual) == *expected)
            })
        })
        .cloned()
        .collect();
    if matching.is_empty() { rows } else { matching }
}

fn cell_text(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| value.to_string())
}

fn first_period(text: &str) -> Option<String> {
    PERIOD_RE
        .as_ref()?
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn month_number(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => {
            let name = name.trim().to_lowercase();
            MONTHS
                .iter()
                .position(|m| *m == name)
                .map(|idx| format!("{:02}", idx + 1))
        }
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(truncate_month))
            .map(|m| format!("{m:02}")),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn truncate_month(value: f64) -> i64 {
    value as i64
}

/// Period of a row: `YYYY`, `YYYY-YY` or `YYYY-MM`.
///
/// An explicit `year` column wins over other year-like columns
/// (`base_year` never counts). A month column, by name or number, is
/// appended. Rows without any year column fall back to the first year-like
/// string value.
#[must_use]
pub fn find_period(row: &Row) -> Option<String> {
    let year = row
        .get("year")
        .and_then(|v| first_period(&cell_text(v)))
        .or_else(|| {
            row.iter()
                .filter(|(key, _)| {
                    let key = key.to_lowercase();
                    key.contains("year") && key != "base_year"
                })
                .find_map(|(_, v)| first_period(&cell_text(v)))
        });

    let month = row.get("month").and_then(month_number).or_else(|| {
        row.iter()
            .filter(|(key, _)| key.to_lowercase().contains("month"))
            .find_map(|(_, v)| month_number(v))
    });

    match (year, month) {
        (Some(year), Some(month)) => Some(format!("{year}-{month}")),
        (Some(year), None) => Some(year),
        (None, _) => row
            .values()
            .filter_map(Value::as_str)
            .find_map(first_period),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Value of a row: a preferred key, else the first numeric non-time column.
#[must_use]
pub fn find_value(row: &Row) -> Option<f64> {
    VALUE_KEYS
        .iter()
        .filter_map(|key| row.get(*key))
        .find_map(numeric)
        .or_else(|| {
            row.iter()
                .filter(|(key, _)| {
                    let key = key.to_lowercase();
                    !key.contains("year") && !key.contains("month")
                })
                .find_map(|(_, v)| numeric(v))
        })
}

/// Reduces rows to a period-ordered series.
///
/// Rows are first narrowed with [`match_filters`]; rows without a period or
/// a value are skipped and the first value seen for a period wins.
#[must_use]
pub fn normalize_series(rows: Vec<Row>, filters: &FilterSet) -> Vec<SeriesPoint> {
    let mut series: BTreeMap<String, f64> = BTreeMap::new();
    for row in match_filters(rows, filters) {
        let (Some(period), Some(value)) = (find_period(&row), find_value(&row)) else {
            continue;
        };
        series.entry(period).or_insert(value);
    }
    series
        .into_iter()
        .map(|(period, value)| SeriesPoint { period, value })
        .collect()
}
