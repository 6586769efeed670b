//! Import pipeline: normalize, validate, classify and append rows to the bank

use crate::bank::QuestionBank;
use crate::error::{CoreError, Result};
use crate::excel::read_rows;
use crate::models::{Difficulty, OptionLetter};
use crate::normalize::{normalize, RawRecord, Record};
use crate::subject::{classify, SubjectCategory};
use crate::validate::{
    parse_correct_answer, validate_flashcard_rows, validate_mock_test_row, validate_mock_test_rows, RowError,
    RowIssue, ValidationReport, FLASHCARD_FIELDS,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlashcardImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub rejections: Vec<RowError>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MockTestImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}

/// Append flashcards from a fully read row set.
///
/// Duplicates are detected on lower-cased `(subject, question)` against rows seen
/// earlier in this batch only, never against cards already in the bank.
pub fn import_flashcards(bank: &mut QuestionBank, rows: &[RawRecord]) -> FlashcardImportSummary {
    let mut summary = FlashcardImportSummary::default();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for (i, raw) in rows.iter().enumerate() {
        let record = normalize(raw);
        match accept_flashcard(&record, &mut seen) {
            Ok((subject, question, answer, difficulty)) => {
                bank.add_flashcard(subject, question, answer, difficulty);
                summary.imported += 1;
            }
            Err(issue) => {
                debug!(row = i + 1, %issue, "skipped flashcard row");
                summary.skipped += 1;
                summary.rejections.push(RowError { row: i + 1, issue });
            }
        }
    }

    info!(imported = summary.imported, skipped = summary.skipped, "flashcard import finished");
    summary
}

type FlashcardFields = (SubjectCategory, String, String, Difficulty);

fn accept_flashcard(
    record: &Record,
    seen: &mut HashSet<(String, String)>,
) -> std::result::Result<FlashcardFields, RowIssue> {
    let (Some(subject), Some(question), Some(answer)) =
        (record.text("subject"), record.text("question"), record.text("answer"))
    else {
        let missing = FLASHCARD_FIELDS.iter().copied().filter(|f| !record.has(f)).collect();
        return Err(RowIssue::MissingFields(missing));
    };

    if !seen.insert((subject.to_lowercase(), question.to_lowercase())) {
        return Err(RowIssue::Duplicate);
    }

    let category = classify(&subject).ok_or_else(|| RowIssue::UnknownSubject(subject.clone()))?;
    // unrecognized difficulty falls back to medium for flashcards
    let difficulty = record
        .text("difficulty")
        .and_then(|d| Difficulty::parse(&d))
        .unwrap_or_default();

    Ok((category, question, answer, difficulty))
}

/// Append mock test questions, recording a tagged reason for every skipped row.
pub fn import_mock_tests(bank: &mut QuestionBank, rows: &[RawRecord]) -> MockTestImportSummary {
    let mut summary = MockTestImportSummary::default();

    for (i, raw) in rows.iter().enumerate() {
        let record = normalize(raw);
        let (category, correct) = match accept_mock_test(&record) {
            Ok(accepted) => accepted,
            Err(issue) => {
                summary.skipped += 1;
                summary.errors.push(RowError { row: i + 1, issue });
                continue;
            }
        };

        let field = |name: &str| record.text(name).unwrap_or_default();
        let options = [field("optiona"), field("optionb"), field("optionc"), field("optiond")];
        let difficulty = record
            .text("difficulty")
            .and_then(|d| Difficulty::parse(&d))
            .unwrap_or_default();

        bank.add_mock_test(category, field("question"), options, correct, difficulty);
        summary.imported += 1;
    }

    if !summary.errors.is_empty() {
        let shown: Vec<String> = summary.errors.iter().take(5).map(|e| e.to_string()).collect();
        warn!(
            issues = summary.errors.len(),
            first = ?shown,
            "mock test import issues"
        );
    }
    info!(imported = summary.imported, skipped = summary.skipped, "mock test import finished");
    summary
}

fn accept_mock_test(record: &Record) -> std::result::Result<(SubjectCategory, OptionLetter), RowIssue> {
    validate_mock_test_row(record)?;
    let subject = record.text("subject").unwrap_or_default();
    let category = classify(&subject).ok_or(RowIssue::UnknownSubject(subject))?;
    let correct = record
        .text("correctanswer")
        .as_deref()
        .and_then(parse_correct_answer)
        .ok_or_else(|| RowIssue::InvalidCorrectAnswer(String::new()))?;
    Ok((category, correct))
}

/// Outcome of importing one file: rows were read and applied, or the file could not be read.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome<T> {
    Imported(T),
    Failed { message: String },
}

impl<T> FileOutcome<T> {
    pub fn imported(&self) -> Option<&T> {
        match self {
            FileOutcome::Imported(summary) => Some(summary),
            FileOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub flashcards: Option<FileOutcome<FlashcardImportSummary>>,
    pub mock_tests: Option<FileOutcome<MockTestImportSummary>>,
}

/// Import whichever files were provided.
///
/// A file that cannot be read is reported on its own; the other file is still imported.
pub fn import_files(
    bank: &mut QuestionBank,
    flashcard_path: Option<&Path>,
    mock_test_path: Option<&Path>,
) -> Result<ImportReport> {
    if flashcard_path.is_none() && mock_test_path.is_none() {
        return Err(CoreError::EmptyInput("Please upload at least one file".to_string()));
    }

    let mut report = ImportReport::default();

    if let Some(path) = flashcard_path {
        report.flashcards = Some(match read_rows(path) {
            Ok(rows) => FileOutcome::Imported(import_flashcards(bank, &rows)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "flashcard file import failed");
                FileOutcome::Failed { message: e.to_string() }
            }
        });
    }

    if let Some(path) = mock_test_path {
        report.mock_tests = Some(match read_rows(path) {
            Ok(rows) => FileOutcome::Imported(import_mock_tests(bank, &rows)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "mock test file import failed");
                FileOutcome::Failed { message: e.to_string() }
            }
        });
    }

    Ok(report)
}

/// Which row shape a file is expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Flashcards,
    MockTests,
}

/// Read a file and report every row problem without touching the bank.
pub fn validate_file(path: &Path, kind: ImportKind) -> Result<ValidationReport> {
    let rows = read_rows(path)?;
    Ok(match kind {
        ImportKind::Flashcards => validate_flashcard_rows(&rows),
        ImportKind::MockTests => validate_mock_test_rows(&rows),
    })
}
