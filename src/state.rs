//! Application state: question bank, exam history and the exam in progress

use crate::bank::QuestionBank;
use crate::config::ExamConfig;
use crate::deck::{FlashcardCursor, FlashcardView};
use crate::error::{CoreError, Result};
use crate::generator::generate;
use crate::import::{import_files, ImportReport};
use crate::models::{OptionLetter, ReviewMark};
use crate::progress::{dashboard, DashboardStats, TestHistory};
use crate::scorer::ScoreReport;
use crate::session::{ExamSession, Tick};
use crate::store::{load_bank, load_history, save_bank, save_history, StateStore};
use crate::subject::SubjectCategory;
use crate::views::{question_view, results_summary, review, QuestionView, ResultsSummary, ReviewItem};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::path::Path;
use tracing::info;

fn no_exam() -> CoreError {
    CoreError::EmptyInput("No exam has been started".to_string())
}

/// Everything one user works with. At most one exam exists at a time.
#[derive(Debug, Default)]
pub struct StudyState {
    bank: QuestionBank,
    history: TestHistory,
    session: Option<ExamSession>,
    cursor: FlashcardCursor,
    config: ExamConfig,
}

impl StudyState {
    pub fn new(config: ExamConfig) -> Self {
        StudyState {
            config,
            ..Self::default()
        }
    }

    /// Restore bank and history from `store`.
    pub fn load<S: StateStore + ?Sized>(store: &S, config: ExamConfig) -> Result<Self> {
        let state = StudyState {
            bank: load_bank(store)?,
            history: load_history(store)?,
            ..Self::new(config)
        };
        info!(
            flashcards = state.bank.flashcard_count(),
            mock_tests = state.bank.mock_test_count(),
            tests_taken = state.history.entries().len(),
            "study state loaded"
        );
        Ok(state)
    }

    pub fn save<S: StateStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        save_bank(store, &self.bank)?;
        save_history(store, &self.history)
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn history(&self) -> &TestHistory {
        &self.history
    }

    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&ExamSession> {
        self.session.as_ref()
    }

    pub fn import_files(&mut self, flashcard_path: Option<&Path>, mock_test_path: Option<&Path>) -> Result<ImportReport> {
        import_files(&mut self.bank, flashcard_path, mock_test_path)
    }

    /// Drop every imported question. History is kept.
    pub fn clear_bank(&mut self) {
        self.bank.clear();
        self.cursor = FlashcardCursor::default();
    }

    // ----- flashcards -----

    pub fn select_flashcard_subject(&mut self, subject: SubjectCategory) {
        self.cursor.select_subject(subject);
    }

    pub fn current_flashcard(&self) -> Option<FlashcardView> {
        self.cursor.current(&self.bank)
    }

    pub fn next_flashcard(&mut self) {
        self.cursor.next(&self.bank);
    }

    pub fn previous_flashcard(&mut self) {
        self.cursor.previous(&self.bank);
    }

    pub fn mark_flashcard(&mut self, mark: ReviewMark) -> bool {
        self.cursor.mark(&mut self.bank, mark)
    }

    pub fn shuffle_flashcards<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cursor.shuffle(&mut self.bank, rng);
    }

    // ----- mock exam -----

    /// Generate a new exam, replacing any previous one along with its countdown.
    pub fn start_exam<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Result<&ExamSession> {
        let session = generate(&self.bank, &self.config, now, rng)?;
        info!(questions = session.len(), duration_secs = self.config.duration_secs, "exam started");
        Ok(&*self.session.insert(session))
    }

    fn active_session(&mut self) -> Result<&mut ExamSession> {
        self.session.as_mut().ok_or_else(no_exam)
    }

    pub fn answer(&mut self, index: usize, letter: OptionLetter) -> Result<()> {
        self.active_session()?.record_answer(index, letter)
    }

    pub fn go_to(&mut self, index: usize) -> Result<bool> {
        Ok(self.active_session()?.go_to(index))
    }

    pub fn previous_question(&mut self) -> Result<bool> {
        Ok(self.active_session()?.previous())
    }

    /// "Next" on every question but the last, "Submit" on the last.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Option<ScoreReport>> {
        let session = self.session.as_mut().ok_or_else(no_exam)?;
        Ok(session.advance_or_finish(now, &mut self.history))
    }

    /// Submit the exam. `None` if it had already finished.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<Option<ScoreReport>> {
        let session = self.session.as_mut().ok_or_else(no_exam)?;
        Ok(session.finish(now, &mut self.history))
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        match self.session.as_mut() {
            Some(session) => session.tick(now, &mut self.history),
            None => Tick::Idle,
        }
    }

    pub fn countdown_display(&self, now: DateTime<Utc>) -> Option<String> {
        self.session.as_ref().map(|s| s.countdown_display(now))
    }

    pub fn question_view(&self) -> Option<QuestionView> {
        self.session.as_ref().and_then(question_view)
    }

    pub fn results(&self) -> Option<ResultsSummary> {
        let report = self.session.as_ref()?.report()?;
        Some(results_summary(&report))
    }

    pub fn review(&self) -> Option<Vec<ReviewItem>> {
        self.session.as_ref().and_then(review)
    }

    pub fn dashboard(&self) -> DashboardStats {
        dashboard(&self.bank, &self.history)
    }
}
