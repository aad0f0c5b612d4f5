//! Generic flat key/value settings storage.

use std::collections::BTreeMap;

/// Flat key/value settings store, mirroring the host's configuration model.
///
/// The serialization layer that names, versions, and migrates keys lives
/// outside this crate; the store only provides typed access to already-parsed
/// values. Missing keys fall back to caller-supplied defaults.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SettingsStore {
    values: BTreeMap<String, serde_json::Value>,
}

impl SettingsStore {
    /// New empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a float value, falling back to `default` when absent or untyped.
    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).and_then(|v| v.as_f64()).unwrap_or(default)
    }

    /// Write a float value.
    pub fn set_f64(&mut self, key: &str, value: f64) {
        self.values.insert(
            key.to_string(),
            serde_json::Number::from_f64(value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        );
    }

    /// Read an integer value, falling back to `default`.
    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).and_then(|v| v.as_i64()).unwrap_or(default)
    }

    /// Write an integer value.
    pub fn set_i64(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), serde_json::Value::from(value));
    }

    /// Read a string value, falling back to the empty string.
    pub fn get_str(&self, key: &str) -> &str {
        self.values.get(key).and_then(|v| v.as_str()).unwrap_or("")
    }

    /// Write a string value.
    pub fn set_str(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), serde_json::Value::from(value));
    }
}
