//! Translation dictionaries and `{{ param }}` interpolation.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("placeholder regex is valid")
    })
}

/// Flat `key -> text` map for one language.
///
/// Built from either a flat or a nested JSON object; nested keys are joined
/// with `.` so `{"nav": {"home": "Home"}}` yields `nav.home`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON translation file.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn flatten_into(&mut self, prefix: &str, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    self.flatten_into(&path, child);
                }
            }
            Value::String(s) => self.insert(prefix, s.as_str()),
            Value::Number(n) => self.insert(prefix, n.to_string()),
            Value::Bool(b) => self.insert(prefix, b.to_string()),
            // arrays and nulls carry no translatable text
            Value::Array(_) | Value::Null => {}
        }
    }
}

impl TryFrom<Value> for Dictionary {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err("translation file must be a JSON object".to_string());
        }
        let mut dictionary = Dictionary::new();
        dictionary.flatten_into("", &value);
        Ok(dictionary)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dictionary = Dictionary::new();
        for (k, v) in iter {
            dictionary.insert(k, v);
        }
        dictionary
    }
}

/// Named values substituted into `{{ name }}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationParams {
    values: BTreeMap<String, String>,
}

impl TranslationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.values.insert(name.into(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Replace placeholders with parameter values. Placeholders without a
/// matching parameter are left as written.
pub fn interpolate(template: &str, params: &TranslationParams) -> String {
    if params.is_empty() {
        return template.to_string();
    }
    placeholder_regex()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            params
                .get(&caps[1])
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Names of the placeholders used in `template`.
pub fn placeholders(template: &str) -> BTreeSet<String> {
    placeholder_regex()
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}
