//! Load/save hooks for the question bank and exam history
//!
//! The core does not own a storage medium. It serializes state to JSON records under
//! fixed keys and hands them to a `StateStore`; a SQLite-backed store is provided.

use crate::bank::{QuestionBank, SubjectMap};
use crate::error::Result;
use crate::models::{Flashcard, MockTestQuestion};
use crate::progress::TestHistory;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub const FLASHCARDS_KEY: &str = "letStudyFlashcards";
pub const MOCK_TESTS_KEY: &str = "letStudyMockTests";
pub const TEST_HISTORY_KEY: &str = "letStudyTestHistory";

/// String key -> JSON text, like browser local storage.
pub trait StateStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key/value table in a SQLite database
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(SqliteStore { conn })
    }
}

impl StateStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM app_state WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        Ok(())
    }
}

pub fn save_bank<S: StateStore + ?Sized>(store: &mut S, bank: &QuestionBank) -> Result<()> {
    store.save(FLASHCARDS_KEY, &serde_json::to_string(bank.flashcard_map())?)?;
    store.save(MOCK_TESTS_KEY, &serde_json::to_string(bank.mock_test_map())?)?;
    debug!(
        flashcards = bank.flashcard_count(),
        mock_tests = bank.mock_test_count(),
        "saved question bank"
    );
    Ok(())
}

/// Missing keys load as empty collections.
pub fn load_bank<S: StateStore + ?Sized>(store: &S) -> Result<QuestionBank> {
    let flashcards: SubjectMap<Flashcard> = match store.load(FLASHCARDS_KEY)? {
        Some(text) => serde_json::from_str(&text)?,
        None => SubjectMap::new(),
    };
    let mock_tests: SubjectMap<MockTestQuestion> = match store.load(MOCK_TESTS_KEY)? {
        Some(text) => serde_json::from_str(&text)?,
        None => SubjectMap::new(),
    };
    Ok(QuestionBank::from_parts(flashcards, mock_tests))
}

pub fn save_history<S: StateStore + ?Sized>(store: &mut S, history: &TestHistory) -> Result<()> {
    store.save(TEST_HISTORY_KEY, &serde_json::to_string(history)?)
}

pub fn load_history<S: StateStore + ?Sized>(store: &S) -> Result<TestHistory> {
    match store.load(TEST_HISTORY_KEY)? {
        Some(text) => Ok(serde_json::from_str(&text)?),
        None => Ok(TestHistory::default()),
    }
}
