//! # Info Document
//!
//! The per-symbol "info" view: a flat mapping merged from the provider's
//! summary modules (price, summary detail, key statistics, profile, ...).
//! Every lookup returns an `Option`, and a JSON `null` counts as absent, so
//! callers always make an explicit presence check.

use serde_json::{Map, Value};

/// Flat optional-field view over a ticker's summary modules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoDocument {
    fields: Map<String, Value>,
}

/// A company officer entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Officer {
    pub name: Option<String>,
    pub title: Option<String>,
}

impl InfoDocument {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds the document from already unwrapped summary modules. Modules are
    /// merged in iteration order; a later module never overwrites a field an
    /// earlier module already provided.
    pub fn from_modules(modules: &Map<String, Value>) -> Self {
        let mut fields = Map::new();

        for (module_name, module) in modules {
            let Some(module) = module.as_object() else {
                continue;
            };

            // calendarEvents keeps its useful fields one level down
            if module_name == "calendarEvents" {
                if let Some(earnings) = module.get("earnings").and_then(Value::as_object) {
                    merge_absent(&mut fields, earnings);
                }
            }

            merge_absent(&mut fields, module);
        }

        Self { fields }
    }

    /// Looks up a field; `None` when missing or `null`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Looks up a field and clones it, mapping absence to `null` for projection
    /// into a response body.
    pub fn get_or_null(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or(Value::Null)
    }

    /// The `companyOfficers` list; empty when absent or malformed.
    pub fn company_officers(&self) -> Vec<Officer> {
        self.get("companyOfficers")
            .and_then(Value::as_array)
            .map(|officers| {
                officers
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|officer| Officer {
                        name: officer.get("name").and_then(Value::as_str).map(str::to_string),
                        title: officer.get("title").and_then(Value::as_str).map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn merge_absent(fields: &mut Map<String, Value>, module: &Map<String, Value>) {
    for (key, value) in module {
        if value.is_null() || key == "maxAge" {
            continue;
        }
        match fields.get(key) {
            Some(existing) if !existing.is_null() => {}
            _ => {
                fields.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Replaces the provider's `{"raw": .., "fmt": ..}` wrappers by their raw
/// value, recursively. Empty objects (the provider's way of saying "no value")
/// become `null`.
pub fn unwrap_raw(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if let Some(raw) = map.remove("raw") {
                return raw;
            }
            if map.is_empty() {
                return Value::Null;
            }
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, unwrap_raw(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(unwrap_raw).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn modules() -> Map<String, Value> {
        let raw = json!({
            "summaryDetail": {
                "maxAge": 1,
                "previousClose": {"raw": 189.84, "fmt": "189.84"},
                "dayLow": {"raw": 187.45, "fmt": "187.45"},
                "dividendYield": {},
            },
            "price": {
                "longName": "Apple Inc.",
                "previousClose": {"raw": 1.0, "fmt": "1.00"},
            },
            "calendarEvents": {
                "earnings": {
                    "earningsDate": [{"raw": 1714680000, "fmt": "2024-05-02"}],
                },
            },
            "assetProfile": {
                "companyOfficers": [
                    {"name": "Mr. Timothy D. Cook", "title": "CEO & Director", "totalPay": {"raw": 16239562}},
                    {"name": "Mr. Luca Maestri", "title": "CFO & Senior VP"},
                ],
            },
        });
        unwrap_raw(raw).as_object().cloned().unwrap()
    }

    #[test]
    fn unwraps_raw_wrappers_recursively() {
        let value = unwrap_raw(json!({"a": {"raw": 1, "fmt": "1"}, "b": [{"raw": 2}], "c": {}}));
        assert_eq!(value, json!({"a": 1, "b": [2], "c": null}));
    }

    #[test]
    fn first_module_wins_on_conflicts() {
        let info = InfoDocument::from_modules(&modules());
        assert_eq!(info.get("previousClose"), Some(&json!(189.84)));
        assert_eq!(info.get("longName"), Some(&json!("Apple Inc.")));
    }

    #[test]
    fn null_and_missing_fields_are_absent() {
        let info = InfoDocument::from_modules(&modules());
        assert_eq!(info.get("dividendYield"), None);
        assert_eq!(info.get("doesNotExist"), None);
        assert_eq!(info.get_or_null("dividendYield"), Value::Null);
        assert_eq!(info.get("maxAge"), None);
    }

    #[test]
    fn lifts_calendar_earnings_fields() {
        let info = InfoDocument::from_modules(&modules());
        assert_eq!(info.get("earningsDate"), Some(&json!([1714680000])));
    }

    #[test]
    fn reads_company_officers() {
        let info = InfoDocument::from_modules(&modules());
        let officers = info.company_officers();

        assert_eq!(officers.len(), 2);
        assert_eq!(officers[0].name.as_deref(), Some("Mr. Timothy D. Cook"));
        assert_eq!(officers[1].title.as_deref(), Some("CFO & Senior VP"));
    }

    #[test]
    fn missing_officer_list_is_empty() {
        assert!(InfoDocument::default().company_officers().is_empty());
    }
}
