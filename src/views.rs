//! View models handed to the rendering layer

use crate::models::{Difficulty, OptionLetter};
use crate::scorer::{ScoreBand, ScoreReport, SubjectScore};
use crate::session::ExamSession;
use crate::subject::SubjectCategory;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub letter: OptionLetter,
    pub text: String,
    pub selected: bool,
}

/// The question currently on screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub subject: SubjectCategory,
    pub difficulty: Difficulty,
    pub text: String,
    pub options: Vec<OptionView>,
    /// The primary button submits instead of moving on
    pub is_last: bool,
    pub pages: Vec<PageItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageItem {
    Page { index: usize, active: bool },
    Ellipsis,
}

/// First page, pages within two of `current`, last page, with gaps marked.
pub fn pagination(total: usize, current: usize) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }
    let page = |index: usize| PageItem::Page {
        index,
        active: index == current,
    };

    let last = total - 1;
    let start = current.saturating_sub(2).max(1);
    let end = (current + 2).min(last);

    let mut items = vec![page(0)];
    if start > 1 {
        items.push(PageItem::Ellipsis);
    }
    items.extend((start..=end).filter(|&i| i != 0 && i != last).map(page));
    if end + 1 < last {
        items.push(PageItem::Ellipsis);
    }
    if total > 1 {
        items.push(page(last));
    }
    items
}

pub fn question_view(session: &ExamSession) -> Option<QuestionView> {
    let index = session.current_index();
    let question = session.current_question()?;
    let answer = session.answers().get(index).copied().flatten();

    Some(QuestionView {
        index,
        total: session.len(),
        subject: question.subject(),
        difficulty: question.difficulty,
        text: question.question.clone(),
        options: OptionLetter::ALL
            .iter()
            .map(|&letter| OptionView {
                letter,
                text: question.option(letter).to_string(),
                selected: answer == Some(letter),
            })
            .collect(),
        is_last: session.is_last(),
        pages: pagination(session.len(), index),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectRow {
    pub label: String,
    #[serde(flatten)]
    pub score: SubjectScore,
    pub band: ScoreBand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsSummary {
    pub percentage: u32,
    pub correct_count: usize,
    pub total: usize,
    pub band: ScoreBand,
    pub subjects: Vec<SubjectRow>,
}

pub fn results_summary(report: &ScoreReport) -> ResultsSummary {
    ResultsSummary {
        percentage: report.percentage,
        correct_count: report.correct_count,
        total: report.total,
        band: ScoreBand::of(report.percentage),
        subjects: report
            .per_subject
            .iter()
            .map(|s| SubjectRow {
                label: s.subject.label(),
                score: s.clone(),
                band: ScoreBand::of(s.percentage),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    Correct,
    IncorrectChoice,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOption {
    pub letter: OptionLetter,
    pub text: String,
    pub mark: OptionMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    pub number: usize,
    pub subject: SubjectCategory,
    pub text: String,
    pub user_answer: Option<OptionLetter>,
    pub is_correct: bool,
    pub options: Vec<ReviewOption>,
    /// Set when the user missed the question
    pub correct_text: Option<String>,
}

/// Per-question review of a finished session; `None` while it is still running.
pub fn review(session: &ExamSession) -> Option<Vec<ReviewItem>> {
    if !session.is_finished() {
        return None;
    }

    let items = session
        .questions()
        .iter()
        .zip(session.answers())
        .enumerate()
        .map(|(i, (question, &answer))| {
            let is_correct = question.is_correct(answer);
            let options = OptionLetter::ALL
                .iter()
                .map(|&letter| ReviewOption {
                    letter,
                    text: question.option(letter).to_string(),
                    mark: if letter == question.correct_answer {
                        OptionMark::Correct
                    } else if Some(letter) == answer {
                        OptionMark::IncorrectChoice
                    } else {
                        OptionMark::Plain
                    },
                })
                .collect();

            ReviewItem {
                number: i + 1,
                subject: question.subject(),
                text: question.question.clone(),
                user_answer: answer,
                is_correct,
                options,
                correct_text: (!is_correct).then(|| question.correct_text().to_string()),
            }
        })
        .collect();
    Some(items)
}
