use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A single value in a score breakdown.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakdownValue {
    Count(u64),
    Number(f64),
    Flag(bool),
    Text(String),
}

impl fmt::Display for BreakdownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakdownValue::Count(n) => write!(f, "{}", n),
            BreakdownValue::Number(x) => write!(f, "{}", x),
            BreakdownValue::Flag(b) => write!(f, "{}", b),
            BreakdownValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for BreakdownValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BreakdownValue::Count(n) => serializer.serialize_u64(*n),
            BreakdownValue::Number(x) => serializer.serialize_f64(*x),
            BreakdownValue::Flag(b) => serializer.serialize_bool(*b),
            BreakdownValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<u64> for BreakdownValue {
    fn from(n: u64) -> Self {
        BreakdownValue::Count(n)
    }
}

impl From<f64> for BreakdownValue {
    fn from(x: f64) -> Self {
        BreakdownValue::Number(x)
    }
}

impl From<bool> for BreakdownValue {
    fn from(b: bool) -> Self {
        BreakdownValue::Flag(b)
    }
}

impl From<&str> for BreakdownValue {
    fn from(s: &str) -> Self {
        BreakdownValue::Text(s.to_string())
    }
}

/// Ordered key/value map describing how a score was produced.
///
/// Keys are fixed per scorer, so they are `&'static str`. Insertion order is
/// kept for display. The same shape carries a scorer's configuration values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    entries: Vec<(&'static str, BreakdownValue)>,
}

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key`, replacing the value in place if the key already exists.
    pub fn set(&mut self, key: &'static str, value: impl Into<BreakdownValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl Into<BreakdownValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn extend(&mut self, other: Breakdown) {
        for (key, value) in other.entries {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&BreakdownValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &BreakdownValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One `key: value` line per entry.
impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
