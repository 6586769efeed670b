//! Subject taxonomy and keyword classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight fixed subject buckets. Declaration order is the classification priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectCategory {
    Civil,
    Mechanical,
    Electrical,
    Electronics,
    Programming,
    Mathematics,
    Mechanics,
    English,
}

impl SubjectCategory {
    pub const ALL: [SubjectCategory; 8] = [
        SubjectCategory::Civil,
        SubjectCategory::Mechanical,
        SubjectCategory::Electrical,
        SubjectCategory::Electronics,
        SubjectCategory::Programming,
        SubjectCategory::Mathematics,
        SubjectCategory::Mechanics,
        SubjectCategory::English,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SubjectCategory::Civil => "civil",
            SubjectCategory::Mechanical => "mechanical",
            SubjectCategory::Electrical => "electrical",
            SubjectCategory::Electronics => "electronics",
            SubjectCategory::Programming => "programming",
            SubjectCategory::Mathematics => "mathematics",
            SubjectCategory::Mechanics => "mechanics",
            SubjectCategory::English => "english",
        }
    }

    /// Capitalized label for display ("Civil", "Mathematics", ...)
    pub fn label(self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            SubjectCategory::Civil => &["civil", "structure", "building", "survey", "construction"],
            SubjectCategory::Mechanical => &["mech", "thermo", "fluid", "machine", "mechanical"],
            SubjectCategory::Electrical => &["electric", "power", "electrical"],
            SubjectCategory::Electronics => &["electron", "circuit", "digital", "semiconductor"],
            SubjectCategory::Programming => &["program", "coding", "c programming", "software"],
            SubjectCategory::Mathematics => &["math", "algebra", "calculus", "statistics"],
            SubjectCategory::Mechanics => &["mechanics", "statics", "dynamics", "kinetics"],
            SubjectCategory::English => &["english", "grammar", "verbal", "language"],
        }
    }
}

impl fmt::Display for SubjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SubjectCategory {
    type Err = String;

    /// Exact key lookup; use [`classify`] for free text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SubjectCategory::ALL
            .into_iter()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| format!("Unknown subject category: {}", s))
    }
}

/// Map free subject text to a category by keyword containment.
///
/// Categories are tested in declaration order and the first hit wins, so text
/// such as "Mechanics of machines" lands in `Mechanical` ("mech" is checked first).
pub fn classify(raw_subject: &str) -> Option<SubjectCategory> {
    let subject = raw_subject.trim().to_lowercase();
    if subject.is_empty() {
        return None;
    }

    SubjectCategory::ALL
        .into_iter()
        .find(|category| category.keywords().iter().any(|kw| subject.contains(kw)))
}
