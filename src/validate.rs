//! Row validation rules for flashcard and mock test imports

use crate::models::{Difficulty, OptionLetter};
use crate::normalize::{normalize, RawRecord, Record};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

pub const FLASHCARD_FIELDS: [&str; 3] = ["subject", "question", "answer"];
pub const MOCK_TEST_FIELDS: [&str; 7] = [
    "subject",
    "question",
    "optiona",
    "optionb",
    "optionc",
    "optiond",
    "correctanswer",
];
pub const OPTION_FIELDS: [&str; 4] = ["optiona", "optionb", "optionc", "optiond"];

/// Why a single row was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowIssue {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid correct answer \"{0}\" - must be A, B, C, or D")]
    InvalidCorrectAnswer(String),

    #[error("At least two options must be meaningfully different")]
    IndistinctOptions,

    #[error("Invalid difficulty \"{0}\" - must be easy, medium, or hard")]
    InvalidDifficulty(String),

    #[error("Invalid subject '{0}'")]
    UnknownSubject(String),

    #[error("Duplicate question in this import")]
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    MalformedRow,
    InvalidValue,
}

impl RowIssue {
    pub fn kind(&self) -> IssueKind {
        match self {
            RowIssue::MissingFields(_) => IssueKind::MalformedRow,
            _ => IssueKind::InvalidValue,
        }
    }
}

/// A row issue tagged with its 1-based row number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub issue: RowIssue,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.issue)
    }
}

impl Serialize for RowError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of checking a whole file before importing it.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub record_count: usize,
    pub errors: Vec<RowError>,
}

impl ValidationReport {
    fn from_errors(record_count: usize, errors: Vec<RowError>) -> Self {
        ValidationReport {
            valid: errors.is_empty(),
            record_count,
            errors,
        }
    }
}

fn missing_fields(record: &Record, required: &[&'static str]) -> Option<RowIssue> {
    let missing: Vec<&'static str> = required.iter().copied().filter(|f| !record.has(f)).collect();
    (!missing.is_empty()).then_some(RowIssue::MissingFields(missing))
}

fn difficulty_issue(record: &Record) -> Option<RowIssue> {
    let text = record.text("difficulty")?;
    match Difficulty::parse(&text) {
        Some(_) => None,
        None => Some(RowIssue::InvalidDifficulty(text)),
    }
}

/// First character, upper-cased, must be A-D ("b) Workability" reads as B).
pub fn parse_correct_answer(text: &str) -> Option<OptionLetter> {
    text.chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .and_then(OptionLetter::from_char)
}

fn option_key(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn options_distinct(record: &Record) -> bool {
    let distinct: HashSet<String> = OPTION_FIELDS
        .iter()
        .filter_map(|f| record.text(f))
        .map(|t| option_key(&t))
        .collect();
    distinct.len() >= 2
}

/// All problems with a flashcard row.
pub fn validate_flashcard_row(record: &Record) -> Vec<RowIssue> {
    missing_fields(record, &FLASHCARD_FIELDS)
        .into_iter()
        .chain(difficulty_issue(record))
        .collect()
}

/// Fast reject: the first failing rule, in rule order.
pub fn validate_mock_test_row(record: &Record) -> Result<(), RowIssue> {
    if let Some(issue) = missing_fields(record, &MOCK_TEST_FIELDS) {
        return Err(issue);
    }
    if let Some(issue) = correct_answer_issue(record) {
        return Err(issue);
    }
    if !options_distinct(record) {
        return Err(RowIssue::IndistinctOptions);
    }
    match difficulty_issue(record) {
        Some(issue) => Err(issue),
        None => Ok(()),
    }
}

/// Full report: every rule that fails for this row.
pub fn mock_test_row_issues(record: &Record) -> Vec<RowIssue> {
    let mut issues = Vec::new();
    let missing = missing_fields(record, &MOCK_TEST_FIELDS);
    let options_present = OPTION_FIELDS.iter().all(|f| record.has(f));

    issues.extend(missing);
    issues.extend(correct_answer_issue(record));
    if options_present && !options_distinct(record) {
        issues.push(RowIssue::IndistinctOptions);
    }
    issues.extend(difficulty_issue(record));
    issues
}

fn correct_answer_issue(record: &Record) -> Option<RowIssue> {
    let text = record.text("correctanswer")?;
    match parse_correct_answer(&text) {
        Some(_) => None,
        None => Some(RowIssue::InvalidCorrectAnswer(text)),
    }
}

fn report<F>(rows: &[RawRecord], check: F) -> ValidationReport
where
    F: Fn(&Record) -> Vec<RowIssue>,
{
    let errors = rows
        .iter()
        .enumerate()
        .flat_map(|(i, raw)| {
            check(&normalize(raw))
                .into_iter()
                .map(move |issue| RowError { row: i + 1, issue })
        })
        .collect();
    ValidationReport::from_errors(rows.len(), errors)
}

pub fn validate_flashcard_rows(rows: &[RawRecord]) -> ValidationReport {
    report(rows, validate_flashcard_row)
}

pub fn validate_mock_test_rows(rows: &[RawRecord]) -> ValidationReport {
    report(rows, mock_test_row_issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    fn mock_row(correct: &str, options: [&str; 4]) -> Record {
        record(&[
            ("Subject", "Civil"),
            ("Question", "Slump test measures..."),
            ("Option A", options[0]),
            ("Option B", options[1]),
            ("Option C", options[2]),
            ("Option D", options[3]),
            ("Correct Answer", correct),
        ])
    }

    #[test]
    fn flashcard_row_rules() {
        let ok = record(&[("Subject", "Civil"), ("Question", "Q"), ("Answer", "A")]);
        assert!(validate_flashcard_row(&ok).is_empty());

        let bad = record(&[("Subject", "Civil"), ("Question", ""), ("Difficulty", "brutal")]);
        let issues = validate_flashcard_row(&bad);
        assert_eq!(
            issues,
            vec![
                RowIssue::MissingFields(vec!["question", "answer"]),
                RowIssue::InvalidDifficulty("brutal".into()),
            ]
        );
        assert_eq!(issues[0].kind(), IssueKind::MalformedRow);
        assert_eq!(issues[1].kind(), IssueKind::InvalidValue);
    }

    #[test]
    fn correct_answer_uses_first_character() {
        assert_eq!(parse_correct_answer("b"), Some(OptionLetter::B));
        assert_eq!(parse_correct_answer("Dog"), Some(OptionLetter::D));
        assert_eq!(parse_correct_answer("E"), None);
        assert_eq!(parse_correct_answer("1"), None);
    }

    #[test]
    fn mock_row_fast_reject_reports_first_failure() {
        assert!(validate_mock_test_row(&mock_row("B", ["Strength", "Workability", "Durability", "Color"])).is_ok());

        let err = validate_mock_test_row(&mock_row("X", ["same", "same", "same", "same"])).unwrap_err();
        assert_eq!(err, RowIssue::InvalidCorrectAnswer("X".into()));

        let err = validate_mock_test_row(&mock_row("A", ["Same", " same", "SAME ", "same"])).unwrap_err();
        assert_eq!(err, RowIssue::IndistinctOptions);
        assert_eq!(err.to_string(), "At least two options must be meaningfully different");
    }

    #[test]
    fn mock_row_full_report_collects_every_rule() {
        let mut pairs = vec![
            ("Subject", "Civil"),
            ("Question", "Q"),
            ("Option A", "x"),
            ("Option B", "X"),
            ("Option C", "x "),
            ("Option D", "x"),
            ("Correct Answer", "Z"),
            ("Difficulty", "impossible"),
        ];
        let issues = mock_test_row_issues(&record(&pairs));
        assert_eq!(
            issues,
            vec![
                RowIssue::InvalidCorrectAnswer("Z".into()),
                RowIssue::IndistinctOptions,
                RowIssue::InvalidDifficulty("impossible".into()),
            ]
        );

        pairs.retain(|(k, _)| *k != "Subject");
        let issues = mock_test_row_issues(&record(&pairs));
        assert_eq!(issues[0], RowIssue::MissingFields(vec!["subject"]));
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn batch_report_tags_rows() {
        let rows: Vec<RawRecord> = vec![
            [("Subject", "Civil"), ("Question", "Q1"), ("Answer", "A1")],
            [("Subject", "Civil"), ("Question", "Q2"), ("Answer", "")],
        ]
        .into_iter()
        .map(|row| row.iter().map(|(k, v)| (k.to_string(), json!(v))).collect())
        .collect();

        let report = validate_flashcard_rows(&rows);
        assert!(!report.valid);
        assert_eq!(report.record_count, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].to_string(), "Row 2: Missing required fields: answer");
    }
}
