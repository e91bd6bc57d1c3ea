//! Multi-valued query strings and urlencoded forms

use std::collections::HashMap;

/// Parsed `a=1&b=2&b=3` data
///
/// Keys keep their first-seen order; repeated keys collect every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    raw: String,
    keys: Vec<String>,
    values: HashMap<String, Vec<String>>,
}

impl QueryString {
    pub fn parse(raw: &str) -> Self {
        let mut query = QueryString { raw: raw.to_string(), ..Default::default() };

        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((k, v)) => (decode_component(k), decode_component(v)),
                None => (decode_component(pair), String::new()),
            };
            if key.is_empty() {
                continue;
            }
            query.push(key, value);
        }

        query
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.first()).map(|s| s.as_str())
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Append a value for `key`
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.push(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.keys.retain(|k| k != key);
        self.values.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Single-valued view, first value wins
    pub fn to_map(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.first().map(|first| (k.clone(), first.clone())))
            .collect()
    }

    fn push(&mut self, key: String, value: String) {
        if !self.values.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.values.entry(key).or_default().push(value);
    }
}

impl std::fmt::Display for QueryString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decode one urlencoded component (`+` is a space)
pub fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    urlencoding::decode(&spaced).map(|c| c.into_owned()).unwrap_or(spaced)
}
