//! Python bindings. View models cross the boundary as JSON strings.

use crate::config::ExamConfig;
use crate::error::CoreError;
use crate::import::{validate_file, ImportKind};
use crate::models::{OptionLetter, ReviewMark};
use crate::session::{format_hms, Tick};
use crate::state::StudyState;
use crate::store::SqliteStore;
use crate::subject::{classify, SubjectCategory};
use crate::template::{flashcard_template, mock_test_template};
use chrono::Utc;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

fn to_py_err(e: CoreError) -> PyErr {
    match e {
        CoreError::Config(_) | CoreError::QuestionOutOfRange { .. } => PyValueError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyRuntimeError::new_err(format!("Failed to serialize: {}", e)))
}

fn parse_letter(letter: &str) -> PyResult<OptionLetter> {
    letter
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .and_then(OptionLetter::from_char)
        .ok_or_else(|| PyValueError::new_err(format!("Invalid option letter: {}", letter)))
}

fn load_config(config_path: Option<&str>) -> PyResult<ExamConfig> {
    match config_path {
        Some(path) => ExamConfig::from_path(path),
        None => ExamConfig::from_env(),
    }
    .map_err(to_py_err)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[pyclass(name = "StudyState")]
pub struct PyStudyState {
    inner: StudyState,
    rng: StdRng,
}

#[pymethods]
impl PyStudyState {
    #[new]
    #[pyo3(signature = (config_path=None, seed=None))]
    fn new(config_path: Option<&str>, seed: Option<u64>) -> PyResult<Self> {
        Ok(PyStudyState {
            inner: StudyState::new(load_config(config_path)?),
            rng: make_rng(seed),
        })
    }

    /// Restore bank and history from a SQLite file
    #[staticmethod]
    #[pyo3(signature = (db_path, config_path=None, seed=None))]
    fn load(db_path: &str, config_path: Option<&str>, seed: Option<u64>) -> PyResult<Self> {
        let store = SqliteStore::open(db_path).map_err(to_py_err)?;
        let inner = StudyState::load(&store, load_config(config_path)?).map_err(to_py_err)?;
        Ok(PyStudyState {
            inner,
            rng: make_rng(seed),
        })
    }

    fn save(&self, db_path: &str) -> PyResult<()> {
        let mut store = SqliteStore::open(db_path).map_err(to_py_err)?;
        self.inner.save(&mut store).map_err(to_py_err)
    }

    #[pyo3(signature = (flashcard_path=None, mock_test_path=None))]
    fn import_files(&mut self, flashcard_path: Option<&str>, mock_test_path: Option<&str>) -> PyResult<String> {
        let report = self
            .inner
            .import_files(flashcard_path.map(Path::new), mock_test_path.map(Path::new))
            .map_err(to_py_err)?;
        to_json(&report)
    }

    fn clear_bank(&mut self) {
        self.inner.clear_bank();
    }

    fn dashboard(&self) -> PyResult<String> {
        to_json(&self.inner.dashboard())
    }

    // ----- flashcards -----

    fn select_flashcard_subject(&mut self, subject: &str) -> PyResult<()> {
        let subject: SubjectCategory = subject.parse().map_err(PyValueError::new_err)?;
        self.inner.select_flashcard_subject(subject);
        Ok(())
    }

    fn current_flashcard(&self) -> PyResult<Option<String>> {
        self.inner.current_flashcard().as_ref().map(to_json).transpose()
    }

    fn next_flashcard(&mut self) {
        self.inner.next_flashcard();
    }

    fn previous_flashcard(&mut self) {
        self.inner.previous_flashcard();
    }

    /// `mark` is "mastered" or "difficult"
    fn mark_flashcard(&mut self, mark: &str) -> PyResult<bool> {
        let mark = match mark.trim().to_lowercase().as_str() {
            "mastered" => ReviewMark::Mastered,
            "difficult" => ReviewMark::Difficult,
            other => return Err(PyValueError::new_err(format!("Unknown review mark: {}", other))),
        };
        Ok(self.inner.mark_flashcard(mark))
    }

    fn shuffle_flashcards(&mut self) {
        self.inner.shuffle_flashcards(&mut self.rng);
    }

    // ----- mock exam -----

    /// Returns the number of questions in the new exam
    fn start_exam(&mut self) -> PyResult<usize> {
        let session = self.inner.start_exam(Utc::now(), &mut self.rng).map_err(to_py_err)?;
        Ok(session.len())
    }

    fn answer(&mut self, index: usize, letter: &str) -> PyResult<()> {
        let letter = parse_letter(letter)?;
        self.inner.answer(index, letter).map_err(to_py_err)
    }

    fn go_to(&mut self, index: usize) -> PyResult<bool> {
        self.inner.go_to(index).map_err(to_py_err)
    }

    fn previous_question(&mut self) -> PyResult<bool> {
        self.inner.previous_question().map_err(to_py_err)
    }

    /// Score report JSON when this call submitted the exam
    fn advance(&mut self) -> PyResult<Option<String>> {
        let report = self.inner.advance(Utc::now()).map_err(to_py_err)?;
        report.as_ref().map(to_json).transpose()
    }

    fn submit(&mut self) -> PyResult<Option<String>> {
        let report = self.inner.submit(Utc::now()).map_err(to_py_err)?;
        report.as_ref().map(to_json).transpose()
    }

    /// Call once a second while an exam is on screen.
    fn tick(&mut self) -> PyResult<String> {
        let value = match self.inner.tick(Utc::now()) {
            Tick::Running { remaining } => json!({ "status": "running", "remaining": format_hms(remaining) }),
            Tick::Expired(report) => json!({ "status": "expired", "report": report }),
            Tick::Idle => json!({ "status": "idle" }),
        };
        to_json(&value)
    }

    fn countdown(&self) -> Option<String> {
        self.inner.countdown_display(Utc::now())
    }

    fn question_view(&self) -> PyResult<Option<String>> {
        self.inner.question_view().as_ref().map(to_json).transpose()
    }

    fn results(&self) -> PyResult<Option<String>> {
        self.inner.results().as_ref().map(to_json).transpose()
    }

    fn review(&self) -> PyResult<Option<String>> {
        self.inner.review().as_ref().map(to_json).transpose()
    }

    fn __repr__(&self) -> String {
        format!(
            "StudyState(flashcards={}, mock_tests={}, tests_taken={})",
            self.inner.bank().flashcard_count(),
            self.inner.bank().mock_test_count(),
            self.inner.history().entries().len()
        )
    }
}

/// Category key for free subject text, or None
#[pyfunction]
#[pyo3(name = "classify_subject")]
pub fn py_classify_subject(raw_subject: &str) -> Option<&'static str> {
    classify(raw_subject).map(|c| c.key())
}

/// Check a file without importing it. `kind` is "flashcards" or "mock_tests".
#[pyfunction]
#[pyo3(name = "validate_file")]
pub fn py_validate_file(path: &str, kind: &str) -> PyResult<String> {
    let kind = match kind {
        "flashcards" => ImportKind::Flashcards,
        "mock_tests" => ImportKind::MockTests,
        other => return Err(PyValueError::new_err(format!("Unknown import kind: {}", other))),
    };
    let report = validate_file(Path::new(path), kind).map_err(to_py_err)?;
    to_json(&report)
}

#[pyfunction]
#[pyo3(name = "flashcard_template")]
pub fn py_flashcard_template() -> PyResult<String> {
    flashcard_template().map_err(to_py_err)
}

#[pyfunction]
#[pyo3(name = "mock_test_template")]
pub fn py_mock_test_template() -> PyResult<String> {
    mock_test_template().map_err(to_py_err)
}

#[pyfunction]
#[pyo3(name = "init_logging")]
pub fn py_init_logging() -> bool {
    crate::logging::init()
}
