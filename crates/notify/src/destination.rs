//! Where a rendered message goes and the caller-supplied extras.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form extras attached to a notification rule. Only `note` is read.
pub type Extra = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub webhook_url: String,
    #[serde(default)]
    pub extra: Extra,
}

impl Destination {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            extra: Extra::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.extra.insert("note".to_string(), Value::String(note.into()));
        self
    }

    pub fn note(&self) -> Option<String> {
        note_from(&self.extra)
    }
}

/// The `note` entry as display text, if it is set to something non-empty.
pub fn note_from(extra: &Extra) -> Option<String> {
    match extra.get("note")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn note_present() {
        let destination = Destination::new("https://hooks.slack.test/T/B/x").with_note("deploy freeze");
        assert_eq!(destination.note().as_deref(), Some("deploy freeze"));
    }

    #[test]
    fn note_missing_empty_or_null() {
        assert_eq!(Destination::new("u").note(), None);

        let mut extra = Extra::new();
        extra.insert("note".into(), json!(""));
        assert_eq!(note_from(&extra), None);

        extra.insert("note".into(), Value::Null);
        assert_eq!(note_from(&extra), None);
    }

    #[test]
    fn numeric_note_is_stringified() {
        let mut extra = Extra::new();
        extra.insert("note".into(), json!(42));
        assert_eq!(note_from(&extra).as_deref(), Some("42"));
    }

    #[test]
    fn destination_from_json_without_extra() {
        let destination: Destination =
            serde_json::from_value(json!({"webhook_url": "https://hooks.slack.test"})).unwrap();
        assert!(destination.extra.is_empty());
    }
}
