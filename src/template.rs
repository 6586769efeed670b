//! Downloadable CSV templates showing the expected import columns

use crate::error::{CoreError, Result};
use csv::WriterBuilder;

pub const FLASHCARD_HEADER: [&str; 4] = ["Subject", "Question", "Answer", "Difficulty"];
pub const MOCK_TEST_HEADER: [&str; 8] = [
    "Subject",
    "Question",
    "Option A",
    "Option B",
    "Option C",
    "Option D",
    "Correct Answer",
    "Difficulty",
];

pub const FLASHCARD_TEMPLATE_NAME: &str = "flashcards_template.csv";
pub const MOCK_TEST_TEMPLATE_NAME: &str = "mocktest_template.csv";

fn write_csv(rows: &[&[&str]]) -> Result<String> {
    let mut writer = WriterBuilder::new().terminator(csv::Terminator::Any(b'\n')).from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(*row)
            .map_err(|e| CoreError::Storage(format!("Failed to write template row: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Storage(format!("Failed to finish template: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Storage(e.to_string()))
}

pub fn flashcard_template() -> Result<String> {
    write_csv(&[
        &FLASHCARD_HEADER,
        &["Civil", "What is the purpose of a slump test?", "To measure concrete workability", "Easy"],
        &["Mathematics", "What is the formula for the area of a circle?", "πr²", "Medium"],
    ])
}

pub fn mock_test_template() -> Result<String> {
    write_csv(&[
        &MOCK_TEST_HEADER,
        &["Civil", "Slump test measures...", "Strength", "Workability", "Durability", "Color", "B", "Medium"],
        &["Programming", "What does printf() do?", "Input", "Output", "Calculate", "Loop", "B", "Easy"],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;
    use crate::excel::read_csv;
    use crate::import::{import_flashcards, import_mock_tests};

    #[test]
    fn templates_start_with_the_header() {
        let text = flashcard_template().unwrap();
        assert!(text.starts_with("Subject,Question,Answer,Difficulty\n"));
        let text = mock_test_template().unwrap();
        assert!(text.starts_with("Subject,Question,Option A,Option B,Option C,Option D,Correct Answer,Difficulty\n"));
    }

    #[test]
    fn template_rows_import_cleanly() {
        let mut bank = QuestionBank::new();

        let rows = read_csv(flashcard_template().unwrap().as_bytes()).unwrap();
        let summary = import_flashcards(&mut bank, &rows);
        assert_eq!((summary.imported, summary.skipped), (2, 0));

        let rows = read_csv(mock_test_template().unwrap().as_bytes()).unwrap();
        let summary = import_mock_tests(&mut bank, &rows);
        assert_eq!((summary.imported, summary.skipped), (2, 0));
    }
}
