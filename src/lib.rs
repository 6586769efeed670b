//! LetStudy Core - mock test engine for the LET study tool
//!
//! Imports flashcards and multiple-choice questions from Excel/CSV, classifies them by
//! subject, generates timed mock exams under a per-subject difficulty policy, scores
//! them and keeps test history. Python bindings are available behind the `python` feature.

pub mod bank;
pub mod config;
pub mod deck;
pub mod error;
pub mod excel;
pub mod generator;
pub mod import;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod scorer;
pub mod session;
pub mod state;
pub mod store;
pub mod subject;
pub mod template;
pub mod validate;
pub mod views;

#[cfg(feature = "python")]
mod python;

pub use bank::{QuestionBank, SubjectMastery};
pub use config::{DifficultyMix, DistributionPolicy, ExamConfig, SubjectQuota};
pub use error::{CoreError, Result};
pub use excel::{read_csv, read_rows};
pub use generator::{generate, select_questions};
pub use import::{import_files, import_flashcards, import_mock_tests, validate_file, ImportKind, ImportReport};
pub use models::{Difficulty, Flashcard, ItemId, Mastery, MockTestQuestion, OptionLetter, ReviewMark};
pub use normalize::{normalize, RawRecord, Record};
pub use progress::{dashboard, DashboardStats, TestHistory, TestHistoryEntry};
pub use scorer::{score, ScoreBand, ScoreReport};
pub use session::{ExamSession, SessionState, Tick};
pub use state::StudyState;
pub use store::{MemoryStore, SqliteStore, StateStore};
pub use subject::{classify, SubjectCategory};
pub use validate::{validate_flashcard_rows, validate_mock_test_rows, ValidationReport};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// LetStudy Core Python Module
#[cfg(feature = "python")]
#[pymodule]
fn letstudy_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyStudyState>()?;

    // Subject classification and file checks
    m.add_function(wrap_pyfunction!(python::py_classify_subject, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_validate_file, m)?)?;

    // Import templates
    m.add_function(wrap_pyfunction!(python::py_flashcard_template, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_mock_test_template, m)?)?;

    m.add_function(wrap_pyfunction!(python::py_init_logging, m)?)?;

    Ok(())
}
