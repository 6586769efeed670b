//! Canonical question model shared by import, generation and scoring

use crate::subject::SubjectCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Case-insensitive parse of "easy" / "medium" / "hard"
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-assessed learning status of a flashcard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mastery {
    #[default]
    New,
    Learning,
    Mastered,
}

/// Option letters bound to the four answer positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [OptionLetter::A, OptionLetter::B, OptionLetter::C, OptionLetter::D];

    /// Exact, case-sensitive: only 'A'..='D' are letters.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(OptionLetter::A),
            'B' => Some(OptionLetter::B),
            'C' => Some(OptionLetter::C),
            'D' => Some(OptionLetter::D),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            OptionLetter::A => 0,
            OptionLetter::B => 1,
            OptionLetter::C => 2,
            OptionLetter::D => 3,
        }
    }

    pub fn as_char(self) -> char {
        (b'A' + self.index() as u8) as char
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Identity of a bank item: subject plus its position at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId {
    pub subject: SubjectCategory,
    pub ordinal: usize,
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.subject, self.ordinal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: ItemId,
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    pub mastery: Mastery,
}

/// Outcome of reviewing a single flashcard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewMark {
    Mastered,
    Difficult,
}

impl Flashcard {
    pub fn mark(&mut self, mark: ReviewMark) {
        self.mastery = match mark {
            ReviewMark::Mastered => Mastery::Mastered,
            ReviewMark::Difficult => Mastery::Learning,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockTestQuestion {
    pub id: ItemId,
    pub question: String,
    pub options: [String; 4],
    pub correct_answer: OptionLetter,
    pub difficulty: Difficulty,
}

impl MockTestQuestion {
    pub fn subject(&self) -> SubjectCategory {
        self.id.subject
    }

    pub fn option(&self, letter: OptionLetter) -> &str {
        &self.options[letter.index()]
    }

    pub fn correct_text(&self) -> &str {
        self.option(self.correct_answer)
    }

    pub fn is_correct(&self, answer: Option<OptionLetter>) -> bool {
        answer == Some(self.correct_answer)
    }
}
