//! Citation validation for model-generated entries.
//!
//! Entries come back from the model as untrusted JSON. An entry is kept only
//! if it carries an integer `page_number`, a `source_quote` of at least
//! [`MIN_QUOTE_CHARS`] characters and a non-empty `section`. Every failing
//! check is reported, not just the first.

use serde_json::{Map, Value};

use super::record::ValidatedRecord;

/// Minimum length of `source_quote`, in characters.
pub const MIN_QUOTE_CHARS: usize = 10;

/// A citation field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationField {
    PageNumber,
    SourceQuote,
    Section,
}

impl CitationField {
    /// JSON key of the field.
    pub fn key(&self) -> &'static str {
        match self {
            CitationField::PageNumber => "page_number",
            CitationField::SourceQuote => "source_quote",
            CitationField::Section => "section",
        }
    }
}

impl std::fmt::Display for CitationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CitationField::SourceQuote => {
                write!(f, "{} (min {} chars)", self.key(), MIN_QUOTE_CHARS)
            }
            _ => write!(f, "{}", self.key()),
        }
    }
}

/// Why an entry was dropped. Shown to the operator, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionWarning {
    /// 1-based position of the entry in the model's response.
    pub entry: usize,
    pub missing: Vec<CitationField>,
}

impl RejectionWarning {
    pub fn names(&self, field: CitationField) -> bool {
        self.missing.contains(&field)
    }
}

impl std::fmt::Display for RejectionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<String> = self.missing.iter().map(|m| m.to_string()).collect();
        write!(f, "Entry {}: Missing {}", self.entry, fields.join(", "))
    }
}

/// Accepted and rejected entries from one response.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<ValidatedRecord>,
    pub rejected: Vec<RejectionWarning>,
}

impl ValidationOutcome {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

/// Validate one entry. `entry` is its 1-based position, used for reporting.
pub fn validate(entry: usize, candidate: Value) -> Result<ValidatedRecord, RejectionWarning> {
    match candidate {
        Value::Object(map) => {
            let missing = failed_fields(&map);
            if missing.is_empty() {
                Ok(ValidatedRecord::new_unchecked(map))
            } else {
                Err(RejectionWarning { entry, missing })
            }
        }
        // Not a mapping at all: nothing can be cited.
        _ => Err(RejectionWarning {
            entry,
            missing: vec![
                CitationField::PageNumber,
                CitationField::SourceQuote,
                CitationField::Section,
            ],
        }),
    }
}

/// Validate every entry of a response, in order.
pub fn validate_all(candidates: Vec<Value>) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    for (idx, candidate) in candidates.into_iter().enumerate() {
        match validate(idx + 1, candidate) {
            Ok(record) => outcome.accepted.push(record),
            Err(warning) => outcome.rejected.push(warning),
        }
    }
    outcome
}

/// Citation checks that fail for `map`, in a fixed order.
pub fn failed_fields(map: &Map<String, Value>) -> Vec<CitationField> {
    let mut missing = Vec::new();

    if !map.get("page_number").is_some_and(is_integer) {
        missing.push(CitationField::PageNumber);
    }

    let quote_ok = map
        .get("source_quote")
        .and_then(Value::as_str)
        .is_some_and(|q| q.chars().count() >= MIN_QUOTE_CHARS);
    if !quote_ok {
        missing.push(CitationField::SourceQuote);
    }

    let section_ok = map
        .get("section")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());
    if !section_ok {
        missing.push(CitationField::Section);
    }

    missing
}

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_entry() -> Value {
        json!({
            "instruction": "What happens when an offer is blacked out?",
            "input": "Offer Manager 4.2",
            "output": "The offer cannot be redeemed during the blackout window.",
            "page_number": 17,
            "source_quote": "Offers cannot be redeemed during an active blackout period",
            "section": "Blackout Periods"
        })
    }

    fn without(key: &str) -> Value {
        let mut entry = valid_entry();
        entry.as_object_mut().unwrap().remove(key);
        entry
    }

    #[test]
    fn test_valid_entry_accepted_unchanged() {
        let record = validate(1, valid_entry()).unwrap();
        assert_eq!(Value::from(record.clone()), valid_entry());

        // Re-validating an accepted record accepts it again.
        let again = validate(1, Value::from(record.clone())).unwrap();
        assert_eq!(again, record);
    }

    #[test]
    fn test_each_missing_field_named() {
        let warning = validate(2, without("page_number")).unwrap_err();
        assert_eq!(warning.entry, 2);
        assert_eq!(warning.missing, vec![CitationField::PageNumber]);

        let warning = validate(1, without("source_quote")).unwrap_err();
        assert_eq!(warning.missing, vec![CitationField::SourceQuote]);

        let warning = validate(1, without("section")).unwrap_err();
        assert_eq!(warning.missing, vec![CitationField::Section]);
    }

    #[test]
    fn test_all_missing_fields_reported() {
        let warning = validate(3, json!({"instruction": "q", "output": "a"})).unwrap_err();
        assert_eq!(
            warning.missing,
            vec![
                CitationField::PageNumber,
                CitationField::SourceQuote,
                CitationField::Section
            ]
        );
        assert_eq!(
            warning.to_string(),
            "Entry 3: Missing page_number, source_quote (min 10 chars), section"
        );
    }

    #[test]
    fn test_page_number_must_be_integer() {
        for bad in [json!("12"), json!(12.5), json!(true), json!(null), json!([12])] {
            let mut entry = valid_entry();
            entry["page_number"] = bad;
            let warning = validate(1, entry).unwrap_err();
            assert_eq!(warning.missing, vec![CitationField::PageNumber]);
        }

        let mut entry = valid_entry();
        entry["page_number"] = json!(0);
        assert!(validate(1, entry).is_ok());
    }

    #[test]
    fn test_page_number_accepts_full_integer_range() {
        let entry: Value = serde_json::from_str(
            r#"{"page_number": 18446744073709551615, "source_quote": "Offers cannot be redeemed during a blackout", "section": "Blackouts"}"#,
        )
        .unwrap();
        let record = validate(1, entry).unwrap();
        assert_eq!(record.page_number(), i64::MAX);

        let mut entry = valid_entry();
        entry["page_number"] = json!(-2);
        assert_eq!(validate(1, entry).unwrap().page_number(), -2);
    }

    #[test]
    fn test_source_quote_length() {
        let mut entry = valid_entry();
        entry["source_quote"] = json!("too short");
        assert!(validate(1, entry.clone())
            .unwrap_err()
            .names(CitationField::SourceQuote));

        entry["source_quote"] = json!("");
        assert!(validate(1, entry.clone()).is_err());

        entry["source_quote"] = json!(1234567890);
        assert!(validate(1, entry.clone()).is_err());

        entry["source_quote"] = json!("exactly10!");
        assert!(validate(1, entry.clone()).is_ok());

        // Characters, not bytes.
        entry["source_quote"] = json!("éééééééé");
        assert!(validate(1, entry.clone()).is_err());
        entry["source_quote"] = json!("éééééééééé");
        assert!(validate(1, entry).is_ok());
    }

    #[test]
    fn test_section_must_be_non_empty_string() {
        for bad in [json!(""), json!(null), json!(4)] {
            let mut entry = valid_entry();
            entry["section"] = bad;
            assert_eq!(
                validate(1, entry).unwrap_err().missing,
                vec![CitationField::Section]
            );
        }
    }

    #[test]
    fn test_non_object_entry_rejected() {
        let warning = validate(1, json!("just a string")).unwrap_err();
        assert_eq!(warning.missing.len(), 3);
    }

    #[test]
    fn test_validate_all_keeps_order() {
        let outcome = validate_all(vec![valid_entry(), without("section"), valid_entry()]);
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].entry, 2);
        assert_eq!(outcome.total(), 3);
    }
}
