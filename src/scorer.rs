//! Exam scoring and per-subject breakdown

use crate::models::{MockTestQuestion, OptionLetter};
use crate::subject::SubjectCategory;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectScore {
    pub subject: SubjectCategory,
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub percentage: u32,
    pub correct_count: usize,
    pub total: usize,
    /// Display only; the overall percentage is computed from the totals.
    pub per_subject: Vec<SubjectScore>,
}

/// Colour band used when presenting a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn of(percentage: u32) -> Self {
        match percentage {
            80.. => ScoreBand::Good,
            60..=79 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }
}

/// `round(correct / total * 100)`, half rounding up; an empty exam scores 0.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// Score answers position by position; an unset answer never matches.
pub fn score(questions: &[MockTestQuestion], answers: &[Option<OptionLetter>]) -> ScoreReport {
    let mut by_subject: BTreeMap<SubjectCategory, (usize, usize)> = BTreeMap::new();
    let mut correct_count = 0;

    for (i, question) in questions.iter().enumerate() {
        let correct = question.is_correct(answers.get(i).copied().flatten());
        let entry = by_subject.entry(question.subject()).or_default();
        entry.1 += 1;
        if correct {
            entry.0 += 1;
            correct_count += 1;
        }
    }

    let per_subject = by_subject
        .into_iter()
        .map(|(subject, (correct, total))| SubjectScore {
            subject,
            correct,
            total,
            percentage: percentage(correct, total),
        })
        .collect();

    ScoreReport {
        percentage: percentage(correct_count, questions.len()),
        correct_count,
        total: questions.len(),
        per_subject,
    }
}
