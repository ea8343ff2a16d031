//! Filter sets and the declared API parameters that govern them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Mapping of parameter name to string value.
///
/// Comma-joined values are only meaningful on time-like keys
/// (see [`is_time_like`]); everywhere else they denote alternatives that
/// the fetcher expands into separate requests.
pub type FilterSet = BTreeMap<String, String>;

/// Returns `true` for keys that address a time dimension.
///
/// A key is time-like when it contains `year` (case-insensitive) or is
/// exactly `month_code` / `month`.
#[must_use]
pub fn is_time_like(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.contains("year") || lower == "month_code" || lower == "month"
}

/// Renders a JSON scalar the way the upstream API expects filter values.
///
/// Strings pass through, numbers and booleans use their JSON text, null and
/// containers have no filter form.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Renders a proposed filter value. Arrays of scalars become one
/// comma-joined value; anything else follows [`scalar_to_string`].
#[must_use]
pub fn filter_value(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
            (!parts.is_empty()).then(|| parts.join(","))
        }
        other => scalar_to_string(other),
    }
}

/// Deserializes a JSON object into a [`FilterSet`], stringifying scalars,
/// comma-joining lists and dropping entries with no filter form.
pub fn deserialize_filter_set<'de, D>(deserializer: D) -> Result<FilterSet, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| filter_value(&v).map(|s| (k, s)))
        .collect())
}

/// Like [`deserialize_filter_set`] but keeps "absent" distinct from "empty".
pub fn deserialize_opt_filter_set<'de, D>(deserializer: D) -> Result<Option<FilterSet>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Object(map)) => Some(
            map.into_iter()
                .filter_map(|(k, v)| filter_value(&v).map(|s| (k, s)))
                .collect(),
        ),
        _ => None,
    })
}

/// One entry of a dataset's `api_params` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiParam {
    /// Parameter name as accepted by the data tool.
    pub name: String,
    /// Whether the parameter may never be dropped.
    #[serde(default)]
    pub required: bool,
}

/// Per-dataset list of legal parameters, read from the metadata payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiParamSpec {
    params: Vec<ApiParam>,
}

impl ApiParamSpec {
    /// Builds a spec from explicit parameters.
    #[must_use]
    pub const fn new(params: Vec<ApiParam>) -> Self {
        Self { params }
    }

    /// Reads the `api_params` list from a metadata payload.
    ///
    /// Entries without a name are skipped; a missing or malformed list
    /// yields an empty spec.
    #[must_use]
    pub fn from_metadata(metadata: &Value) -> Self {
        let params = metadata
            .get("api_params")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let name = entry.get("name").and_then(Value::as_str)?;
                        if name.is_empty() {
                            return None;
                        }
                        let required = entry
                            .get("required")
                            .and_then(Value::as_bool)
                            .unwrap_or(false);
                        Some(ApiParam {
                            name: name.to_string(),
                            required,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { params }
    }

    /// Names of all declared parameters.
    #[must_use]
    pub fn names(&self) -> BTreeSet<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    /// Names of parameters marked required.
    #[must_use]
    pub fn required(&self) -> BTreeSet<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Whether `name` is declared.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    /// Returns `true` if no parameters are declared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
