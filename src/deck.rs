//! Flashcard review loop over one subject at a time

use crate::bank::QuestionBank;
use crate::models::{Difficulty, Mastery, ReviewMark};
use crate::subject::SubjectCategory;
use rand::Rng;
use serde::Serialize;

/// What the UI needs to draw the current card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashcardView {
    pub subject: SubjectCategory,
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    pub mastery: Mastery,
    /// 1-based
    pub position: usize,
    pub total: usize,
}

/// Cursor into the bank's flashcards. Movement wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashcardCursor {
    subject: SubjectCategory,
    index: usize,
}

impl Default for FlashcardCursor {
    fn default() -> Self {
        FlashcardCursor {
            subject: SubjectCategory::Civil,
            index: 0,
        }
    }
}

impl FlashcardCursor {
    pub fn subject(&self) -> SubjectCategory {
        self.subject
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn select_subject(&mut self, subject: SubjectCategory) {
        self.subject = subject;
        self.index = 0;
    }

    pub fn next(&mut self, bank: &QuestionBank) {
        let len = bank.flashcards(self.subject).len();
        if len > 0 {
            self.index = (self.index + 1) % len;
        }
    }

    pub fn previous(&mut self, bank: &QuestionBank) {
        let len = bank.flashcards(self.subject).len();
        if len > 0 {
            self.index = (self.index + len - 1) % len;
        }
    }

    /// Record the review outcome for the current card and move on.
    pub fn mark(&mut self, bank: &mut QuestionBank, mark: ReviewMark) -> bool {
        if bank.mark_flashcard(self.subject, self.index, mark).is_none() {
            return false;
        }
        self.next(bank);
        true
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, bank: &mut QuestionBank, rng: &mut R) {
        bank.shuffle_flashcards(self.subject, rng);
        self.index = 0;
    }

    /// `None` when the subject has no cards.
    pub fn current(&self, bank: &QuestionBank) -> Option<FlashcardView> {
        let cards = bank.flashcards(self.subject);
        let card = cards.get(self.index)?;
        Some(FlashcardView {
            subject: self.subject,
            question: card.question.clone(),
            answer: card.answer.clone(),
            difficulty: card.difficulty,
            mastery: card.mastery,
            position: self.index + 1,
            total: cards.len(),
        })
    }
}
