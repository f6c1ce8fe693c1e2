#![forbid(unsafe_code)]

mod error;
mod events;
mod profiles;
mod requests;
mod tasks;

pub use error::StoreError;
pub use requests::*;

use ql_core::{Progress, SetupState, TaskStatus};
use rusqlite::{Connection, Transaction, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "questlog.db";
const SCHEMA_VERSION: &str = "v1";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileRow {
    pub name: String,
    pub profile_image: String,
    pub class: Option<String>,
    pub race: Option<String>,
    pub setup_state: SetupState,
    pub experience: u32,
    pub level: u32,
    pub gold: u32,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl ProfileRow {
    pub fn progress(&self) -> Progress {
        Progress {
            experience: self.experience,
            level: self.level,
            gold: self.gold,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRow {
    pub id: i64,
    pub name: String,
    /// Raw stored label. Rows from older builds may carry labels outside the
    /// current difficulty enum; they stay readable and reward zero points.
    pub difficulty: String,
    pub due_date: String,
    pub status: TaskStatus,
    pub owner_name: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRow {
    pub seq: i64,
    pub ts_ms: i64,
    pub owner_name: String,
    pub event_type: String,
    pub payload_json: String,
}

/// The outcome of persisting one reward application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardOutcome {
    pub before: Progress,
    pub after: Progress,
    pub levels_gained: u32,
    pub gold_earned: u32,
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn transaction(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self.conn.transaction()?)
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS profiles (
          name TEXT PRIMARY KEY,
          profile_image TEXT NOT NULL,
          class TEXT,
          race TEXT,
          setup_state TEXT NOT NULL,
          experience INTEGER NOT NULL,
          level INTEGER NOT NULL,
          gold INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          difficulty TEXT NOT NULL,
          due_date TEXT NOT NULL,
          status TEXT NOT NULL,
          owner_name TEXT NOT NULL REFERENCES profiles(name),
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS events (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          ts_ms INTEGER NOT NULL,
          owner_name TEXT NOT NULL,
          type TEXT NOT NULL,
          payload_json TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_owner_status ON tasks(owner_name, status);
        CREATE INDEX IF NOT EXISTS idx_events_owner_seq ON events(owner_name, seq);
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION],
    )?;
    Ok(())
}

pub(crate) fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}

pub(crate) fn insert_event_tx(
    tx: &Transaction<'_>,
    owner_name: &str,
    ts_ms: i64,
    event_type: &str,
    payload_json: &str,
) -> Result<EventRow, StoreError> {
    tx.execute(
        r#"
        INSERT INTO events(ts_ms, owner_name, type, payload_json)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![ts_ms, owner_name, event_type, payload_json],
    )?;
    let seq = tx.last_insert_rowid();
    Ok(EventRow {
        seq,
        ts_ms,
        owner_name: owner_name.to_string(),
        event_type: event_type.to_string(),
        payload_json: payload_json.to_string(),
    })
}
