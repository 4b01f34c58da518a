use std::collections::BTreeMap;
use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// A single story marker. Untagged so catalogs can write `true`, `3` or `"ally"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FlagValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            FlagValue::Bool(value) => *value,
            FlagValue::Int(value) => *value != 0,
            FlagValue::Text(value) => !value.is_empty(),
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            FlagValue::Bool(true) => 1,
            FlagValue::Bool(false) => 0,
            FlagValue::Int(value) => *value,
            FlagValue::Text(_) => 0,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(value) => write!(f, "{}", value),
            FlagValue::Int(value) => write!(f, "{}", value),
            FlagValue::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Int(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryFlags {
    #[serde(default)]
    pub values: BTreeMap<String, FlagValue>,
}

impl StoryFlags {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FlagValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FlagValue> {
        self.values.get(key)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.values.get(key).map(FlagValue::is_truthy).unwrap_or(false)
    }

    pub fn int(&self, key: &str) -> i64 {
        self.values.get(key).map(FlagValue::as_int).unwrap_or(0)
    }

    /// Add `by` to a counter flag, treating missing or non-numeric values as zero.
    pub fn increment(&mut self, key: &str, by: i64) -> i64 {
        let next = self.int(key) + by;
        self.values.insert(key.to_string(), FlagValue::Int(next));
        next
    }

    pub fn clear(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FlagValue)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_value_kind() {
        let mut flags = StoryFlags::default();
        flags.set("met_mentor", true);
        flags.set("kills", 0i64);
        flags.set("oath", "");
        flags.set("ally", "gojo");
        assert!(flags.is_set("met_mentor"));
        assert!(!flags.is_set("kills"));
        assert!(!flags.is_set("oath"));
        assert!(flags.is_set("ally"));
        assert!(!flags.is_set("missing"));
    }

    #[test]
    fn increment_starts_from_zero_and_overwrites_text() {
        let mut flags = StoryFlags::default();
        assert_eq!(flags.increment("exorcisms", 2), 2);
        assert_eq!(flags.increment("exorcisms", 3), 5);
        flags.set("mood", "grim");
        assert_eq!(flags.increment("mood", 1), 1);
        assert_eq!(flags.get("mood"), Some(&FlagValue::Int(1)));
    }

    #[test]
    fn untagged_json_round_trip() {
        let json = r#"{"values":{"a":true,"b":4,"c":"text"}}"#;
        let flags: StoryFlags = serde_json::from_str(json).expect("parse");
        assert_eq!(flags.get("a"), Some(&FlagValue::Bool(true)));
        assert_eq!(flags.get("b"), Some(&FlagValue::Int(4)));
        assert_eq!(flags.get("c"), Some(&FlagValue::Text("text".to_string())));
    }
}
