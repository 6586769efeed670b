//! Header canonicalization for imported rows

use serde_json::Value;
use std::collections::BTreeMap;

/// A row as handed over by the file collaborator: header text -> cell value.
pub type RawRecord = BTreeMap<String, Value>;

/// A row with canonical keys (`"Correct Answer"` -> `correctanswer`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

/// Lower-case, drop whitespace and anything that is not `[a-z0-9]`.
pub fn canonical_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

pub fn normalize(raw: &RawRecord) -> Record {
    let fields = raw
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other.clone(),
            };
            (canonical_key(key), value)
        })
        .collect();
    Record { fields }
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field as text; `None` when absent, null or an empty string.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(number_text(n)),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.text(field).is_some()
    }

    pub fn is_blank(&self) -> bool {
        self.fields.keys().all(|k| !self.has(k))
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let raw: RawRecord = iter.into_iter().collect();
        normalize(&raw)
    }
}

// Spreadsheet numbers arrive as floats; 3.0 should read as "3".
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_variants_collapse() {
        assert_eq!(canonical_key("Correct Answer"), "correctanswer");
        assert_eq!(canonical_key("correct_answer"), "correctanswer");
        assert_eq!(canonical_key(" CorrectAnswer "), "correctanswer");
        assert_eq!(canonical_key("Option A"), "optiona");
        assert_eq!(canonical_key("Option-B:"), "optionb");
    }

    #[test]
    fn strings_are_trimmed_and_others_pass_through() {
        let raw: RawRecord = [
            ("Subject ".to_string(), json!("  Civil  ")),
            ("Points".to_string(), json!(3.0)),
            ("Flag".to_string(), json!(true)),
        ]
        .into_iter()
        .collect();

        let record = normalize(&raw);
        assert_eq!(record.get("subject"), Some(&json!("Civil")));
        assert_eq!(record.get("points"), Some(&json!(3.0)));
        assert_eq!(record.text("points").as_deref(), Some("3"));
        assert_eq!(record.text("flag").as_deref(), Some("true"));
    }

    #[test]
    fn empty_values_read_as_missing() {
        let record: Record = [
            ("Question".to_string(), json!("   ")),
            ("Answer".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();

        assert!(!record.has("question"));
        assert!(!record.has("answer"));
        assert!(!record.has("subject"));
        assert!(record.is_blank());
    }
}
