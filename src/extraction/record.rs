//! Extraction record types.

use serde::Serialize;
use serde_json::{Map, Value};

use super::validator::{self, RejectionWarning};

/// Keys the model is asked to return for every entry.
pub const RECORD_KEYS: [&str; 6] = [
    "instruction",
    "input",
    "output",
    "page_number",
    "source_quote",
    "section",
];

/// A record that passed citation validation.
///
/// Wraps the model's key/value map unchanged; serializes to exactly that map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedRecord(Map<String, Value>);

impl ValidatedRecord {
    /// Only the validator constructs records.
    pub(super) fn new_unchecked(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Cited page. Values above `i64::MAX` saturate.
    pub fn page_number(&self) -> i64 {
        match self.0.get("page_number") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|_| i64::MAX))
                .unwrap_or_default(),
            _ => 0,
        }
    }

    pub fn source_quote(&self) -> &str {
        self.str_field("source_quote").unwrap_or_default()
    }

    pub fn section(&self) -> &str {
        self.str_field("section").unwrap_or_default()
    }

    pub fn instruction(&self) -> Option<&str> {
        self.str_field("instruction")
    }

    pub fn input(&self) -> Option<&str> {
        self.str_field("input")
    }

    pub fn output(&self) -> Option<&str> {
        self.str_field("output")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl TryFrom<Value> for ValidatedRecord {
    type Error = RejectionWarning;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        validator::validate(1, value)
    }
}

impl From<ValidatedRecord> for Value {
    fn from(record: ValidatedRecord) -> Self {
        Value::Object(record.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let record = ValidatedRecord::try_from(json!({
            "instruction": "How do I create an offer?",
            "input": "Offers screen",
            "output": "Click New Offer.",
            "page_number": 12,
            "source_quote": "To create a new offer click the New Offer button",
            "section": "Creating Offers"
        }))
        .unwrap();

        assert_eq!(record.page_number(), 12);
        assert_eq!(record.section(), "Creating Offers");
        assert_eq!(record.instruction(), Some("How do I create an offer?"));
        assert_eq!(record.input(), Some("Offers screen"));
        assert_eq!(record.output(), Some("Click New Offer."));
        assert!(record.source_quote().starts_with("To create"));
    }

    #[test]
    fn test_serializes_unchanged() {
        let value = json!({
            "page_number": 3,
            "source_quote": "Blackout periods prevent offers from being redeemed",
            "section": "Blackouts",
            "extra": {"nested": true}
        });
        let record = ValidatedRecord::try_from(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
        assert_eq!(Value::from(record), value);
    }
}
