//! Exam session state machine with its countdown

use crate::error::{CoreError, Result};
use crate::models::{MockTestQuestion, OptionLetter};
use crate::progress::{TestHistory, TestHistoryEntry};
use crate::scorer::{score, ScoreReport};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Finished,
}

/// Deadline owned by an in-progress session. Dropped exactly once, when the session finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    deadline: DateTime<Utc>,
}

impl Countdown {
    pub fn start(now: DateTime<Utc>, budget: Duration) -> Self {
        Countdown { deadline: now + budget }
    }

    /// Time left, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.deadline - now).max(Duration::zero())
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline <= now
    }
}

/// `HH:MM:SS`, hours not wrapped at 24.
pub fn format_hms(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Result of a one-second timer tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Running { remaining: Duration },
    /// The budget ran out on this tick and the session was finished.
    Expired(ScoreReport),
    /// No countdown is running (already finished).
    Idle,
}

#[derive(Debug, Clone)]
pub struct ExamSession {
    questions: Vec<MockTestQuestion>,
    answers: Vec<Option<OptionLetter>>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    score: Option<u32>,
    current: usize,
    timer: Option<Countdown>,
}

impl ExamSession {
    pub fn new(questions: Vec<MockTestQuestion>, started_at: DateTime<Utc>, budget: Duration) -> Self {
        let answers = vec![None; questions.len()];
        ExamSession {
            questions,
            answers,
            started_at,
            ended_at: None,
            score: None,
            current: 0,
            timer: Some(Countdown::start(started_at, budget)),
        }
    }

    pub fn state(&self) -> SessionState {
        match self.ended_at {
            Some(_) => SessionState::Finished,
            None => SessionState::InProgress,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() == SessionState::Finished
    }

    pub fn questions(&self) -> &[MockTestQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<OptionLetter>] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Percentage, present once finished.
    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&MockTestQuestion> {
        self.questions.get(self.current)
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn record_answer(&mut self, index: usize, letter: OptionLetter) -> Result<()> {
        if self.is_finished() {
            return Err(CoreError::SessionFinished);
        }
        let len = self.answers.len();
        let slot = self
            .answers
            .get_mut(index)
            .ok_or(CoreError::QuestionOutOfRange { index, len })?;
        *slot = Some(letter);
        Ok(())
    }

    /// Move the pointer; out-of-range indexes are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.questions.len() {
            return false;
        }
        self.current = index;
        true
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    /// Finish the exam, score it and append the attempt to `history`.
    ///
    /// Only the first call has any effect; later calls return `None`.
    pub fn finish(&mut self, now: DateTime<Utc>, history: &mut TestHistory) -> Option<ScoreReport> {
        if self.is_finished() {
            return None;
        }
        self.timer.take();
        self.ended_at = Some(now);

        let report = score(&self.questions, &self.answers);
        self.score = Some(report.percentage);
        history.push(TestHistoryEntry {
            taken_at: now,
            score: report.percentage,
            total_questions: report.total,
            correct_answers: report.correct_count,
        });

        info!(
            score = report.percentage,
            correct = report.correct_count,
            total = report.total,
            "exam finished"
        );
        Some(report)
    }

    /// Submit from the last question, otherwise move to the next one.
    pub fn advance_or_finish(&mut self, now: DateTime<Utc>, history: &mut TestHistory) -> Option<ScoreReport> {
        if self.is_last() {
            self.finish(now, history)
        } else {
            self.next();
            None
        }
    }

    /// Drive the countdown; finishes the session when the budget is spent.
    pub fn tick(&mut self, now: DateTime<Utc>, history: &mut TestHistory) -> Tick {
        let Some(timer) = self.timer else {
            return Tick::Idle;
        };
        if timer.expired(now) {
            match self.finish(now, history) {
                Some(report) => Tick::Expired(report),
                None => Tick::Idle,
            }
        } else {
            Tick::Running {
                remaining: timer.remaining(now),
            }
        }
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.timer.map(|t| t.remaining(now))
    }

    /// Countdown text; `00:00:00` once the session is over.
    pub fn countdown_display(&self, now: DateTime<Utc>) -> String {
        format_hms(self.remaining(now).unwrap_or_else(Duration::zero))
    }

    /// Score report for a finished session.
    pub fn report(&self) -> Option<ScoreReport> {
        self.is_finished().then(|| score(&self.questions, &self.answers))
    }
}
