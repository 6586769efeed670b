//! Subject-keyed in-memory question bank

use crate::models::{Difficulty, Flashcard, ItemId, Mastery, MockTestQuestion, OptionLetter, ReviewMark};
use crate::subject::SubjectCategory;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ordered list per subject; every category is always present.
pub type SubjectMap<T> = BTreeMap<SubjectCategory, Vec<T>>;

fn empty_map<T>() -> SubjectMap<T> {
    SubjectCategory::ALL.into_iter().map(|s| (s, Vec::new())).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    flashcards: SubjectMap<Flashcard>,
    mock_tests: SubjectMap<MockTestQuestion>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        QuestionBank {
            flashcards: empty_map(),
            mock_tests: empty_map(),
        }
    }
}

/// Flashcard progress for one subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectMastery {
    pub subject: SubjectCategory,
    pub mastered: usize,
    pub total: usize,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored collections, filling any category the store lacks.
    pub fn from_parts(flashcards: SubjectMap<Flashcard>, mock_tests: SubjectMap<MockTestQuestion>) -> Self {
        let mut bank = QuestionBank::default();
        bank.flashcards.extend(flashcards);
        bank.mock_tests.extend(mock_tests);
        bank
    }

    pub fn flashcard_map(&self) -> &SubjectMap<Flashcard> {
        &self.flashcards
    }

    pub fn mock_test_map(&self) -> &SubjectMap<MockTestQuestion> {
        &self.mock_tests
    }

    pub fn flashcards(&self, subject: SubjectCategory) -> &[Flashcard] {
        self.flashcards.get(&subject).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn mock_tests(&self, subject: SubjectCategory) -> &[MockTestQuestion] {
        self.mock_tests.get(&subject).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_flashcard(
        &mut self,
        subject: SubjectCategory,
        question: String,
        answer: String,
        difficulty: Difficulty,
    ) -> ItemId {
        let cards = self.flashcards.entry(subject).or_default();
        let id = ItemId { subject, ordinal: cards.len() };
        cards.push(Flashcard {
            id,
            question,
            answer,
            difficulty,
            mastery: Mastery::New,
        });
        id
    }

    pub fn add_mock_test(
        &mut self,
        subject: SubjectCategory,
        question: String,
        options: [String; 4],
        correct_answer: OptionLetter,
        difficulty: Difficulty,
    ) -> ItemId {
        let questions = self.mock_tests.entry(subject).or_default();
        let id = ItemId { subject, ordinal: questions.len() };
        questions.push(MockTestQuestion {
            id,
            question,
            options,
            correct_answer,
            difficulty,
        });
        id
    }

    pub fn has_mock_test_questions(&self) -> bool {
        self.mock_tests.values().any(|q| !q.is_empty())
    }

    pub fn flashcard_count(&self) -> usize {
        self.flashcards.values().map(Vec::len).sum()
    }

    pub fn mock_test_count(&self) -> usize {
        self.mock_tests.values().map(Vec::len).sum()
    }

    /// Mark the card at `position` in the subject's current order.
    pub fn mark_flashcard(&mut self, subject: SubjectCategory, position: usize, mark: ReviewMark) -> Option<&Flashcard> {
        let card = self.flashcards.get_mut(&subject)?.get_mut(position)?;
        card.mark(mark);
        Some(card)
    }

    /// Reorder a subject's cards; their ids are kept.
    pub fn shuffle_flashcards<R: Rng + ?Sized>(&mut self, subject: SubjectCategory, rng: &mut R) {
        if let Some(cards) = self.flashcards.get_mut(&subject) {
            cards.shuffle(rng);
        }
    }

    pub fn mastery(&self) -> Vec<SubjectMastery> {
        self.flashcards
            .iter()
            .map(|(subject, cards)| SubjectMastery {
                subject: *subject,
                mastered: cards.iter().filter(|c| c.mastery == Mastery::Mastered).count(),
                total: cards.len(),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        *self = QuestionBank::default();
    }
}
