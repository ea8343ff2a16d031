//! Metadata-driven filter resolution.
//!
//! Turns the loosely-typed filters proposed by the filter selector into a
//! parameter set the data tool accepts:
//!
//! 1. keys not declared in the metadata's `api_params` are dropped;
//! 2. comma lists on non-time keys are cut to their first entry;
//! 3. human labels are replaced by codes using the tables found in the
//!    metadata's `data` section.
//!
//! Resolution never fails. Missing or malformed metadata just means fewer
//! keys survive and no labels are translated.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

use crate::core::filters::{ApiParamSpec, FilterSet, is_time_like, scalar_to_string};

/// Label → code table for one parameter.
type LabelTable = HashMap<String, String>;

/// Resolver bound to one metadata payload.
#[derive(Debug, Clone, Default)]
pub struct FilterResolver {
    allowed: BTreeSet<String>,
    tables: HashMap<String, LabelTable>,
}

impl FilterResolver {
    /// Builds the allowed-name set and label tables from a metadata payload.
    #[must_use]
    pub fn from_metadata(metadata: &Value) -> Self {
        let allowed = ApiParamSpec::from_metadata(metadata)
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            allowed,
            tables: label_tables(metadata),
        }
    }

    /// Resolves proposed filters into legal, coded filters.
    #[must_use]
    pub fn resolve(&self, proposed: &FilterSet) -> FilterSet {
        proposed
            .iter()
            .filter(|(key, _)| self.allowed.contains(key.as_str()))
            .map(|(key, value)| {
                let single = if value.contains(',') && !is_time_like(key) {
                    value.split(',').next().map_or("", str::trim).to_string()
                } else {
                    value.clone()
                };
                let resolved = self
                    .tables
                    .get(key)
                    .and_then(|table| table.get(&single))
                    .cloned()
                    .unwrap_or(single);
                (key.clone(), resolved)
            })
            .collect()
    }

    /// Code a label or code maps to for `key`, if the metadata knows it.
    #[must_use]
    pub fn lookup(&self, key: &str, value: &str) -> Option<&str> {
        self.tables.get(key)?.get(value).map(String::as_str)
    }
}

/// Resolves `proposed` against `metadata` in one shot.
#[must_use]
pub fn resolve(proposed: &FilterSet, metadata: &Value) -> FilterSet {
    FilterResolver::from_metadata(metadata).resolve(proposed)
}

/// Fields of the metadata `data` section.
///
/// The section is either an object of fields or a list whose first element
/// is such an object.
fn data_fields(metadata: &Value) -> Option<&Map<String, Value>> {
    match metadata.get("data")? {
        Value::Object(fields) => Some(fields),
        Value::Array(items) => items.first()?.as_object(),
        _ => None,
    }
}

/// Collects label tables for every list-valued field of the data section.
///
/// Each table is registered under the field name and under the entry's
/// `*_code` key. Codes always map to themselves; a label only claims a slot
/// no code holds, which keeps resolution idempotent.
fn label_tables(metadata: &Value) -> HashMap<String, LabelTable> {
    let mut tables: HashMap<String, LabelTable> = HashMap::new();
    let Some(fields) = data_fields(metadata) else {
        return tables;
    };

    for (field, values) in fields {
        let Some(entries) = values.as_array() else {
            continue;
        };
        for entry in entries.iter().filter_map(Value::as_object) {
            let code_key = entry.keys().filter(|k| k.ends_with("_code")).last();
            let name_key = entry.keys().filter(|k| k.ends_with("_name")).last();
            let Some(code_key) = code_key else {
                continue;
            };
            let Some(code) = entry.get(code_key).and_then(scalar_to_string) else {
                continue;
            };
            let label = name_key
                .and_then(|k| entry.get(k))
                .and_then(scalar_to_string);

            let mut targets = vec![field.as_str()];
            if code_key != field {
                targets.push(code_key.as_str());
            }
            for target in targets {
                let table = tables.entry(target.to_string()).or_default();
                table.insert(code.clone(), code.clone());
                if let Some(label) = &label {
                    table.entry(label.clone()).or_insert_with(|| code.clone());
                }
            }
        }
    }

    tables
}
