//! Progress tracking - exam history and dashboard statistics

use crate::bank::{QuestionBank, SubjectMastery};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one finished exam
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestHistoryEntry {
    pub taken_at: DateTime<Utc>,
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
}

/// Append-only list of finished exams
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestHistory {
    entries: Vec<TestHistoryEntry>,
}

impl TestHistory {
    pub fn from_entries(entries: Vec<TestHistoryEntry>) -> Self {
        TestHistory { entries }
    }

    pub fn push(&mut self, entry: TestHistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TestHistoryEntry] {
        &self.entries
    }

    /// Mean score rounded to a whole percent, 0 with no history.
    pub fn average_score(&self) -> u32 {
        if self.entries.is_empty() {
            return 0;
        }
        let sum: u64 = self.entries.iter().map(|e| u64::from(e.score)).sum();
        (sum as f64 / self.entries.len() as f64).round() as u32
    }

    /// `("Test 1", score), ("Test 2", score), ...` for the score chart
    pub fn score_series(&self) -> Vec<(String, u32)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (format!("Test {}", i + 1), e.score))
            .collect()
    }
}

/// Badge colour for a subject's mastery ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryBadge {
    Success,
    Warning,
    Danger,
}

impl MasteryBadge {
    pub fn of(mastery: &SubjectMastery) -> Self {
        let scaled = mastery.mastered * 100;
        if mastery.total > 0 && scaled >= 80 * mastery.total {
            MasteryBadge::Success
        } else if mastery.total > 0 && scaled >= 40 * mastery.total {
            MasteryBadge::Warning
        } else {
            MasteryBadge::Danger
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectProgress {
    #[serde(flatten)]
    pub mastery: SubjectMastery,
    pub badge: MasteryBadge,
}

/// Figures shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_flashcards: usize,
    pub mastered_flashcards: usize,
    pub tests_taken: usize,
    pub average_score: u32,
    pub subjects: Vec<SubjectProgress>,
    pub score_history: Vec<(String, u32)>,
}

pub fn dashboard(bank: &QuestionBank, history: &TestHistory) -> DashboardStats {
    let mastery = bank.mastery();
    let subjects = mastery
        .iter()
        .map(|m| SubjectProgress {
            mastery: *m,
            badge: MasteryBadge::of(m),
        })
        .collect();

    DashboardStats {
        total_flashcards: mastery.iter().map(|m| m.total).sum(),
        mastered_flashcards: mastery.iter().map(|m| m.mastered).sum(),
        tests_taken: history.entries().len(),
        average_score: history.average_score(),
        subjects,
        score_history: history.score_series(),
    }
}
