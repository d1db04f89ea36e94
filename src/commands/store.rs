use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};

use super::model::{Command, CommandRequest, CommandStatus};
use crate::error::Error;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS commands (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        command_type INTEGER NOT NULL,
        status       TEXT    NOT NULL,
        params       TEXT,
        created_on   TEXT    NOT NULL,
        updated_on   TEXT    NOT NULL
    );
";

const SELECT_ALL: &str =
    "SELECT id, command_type, status, params, created_on, updated_on FROM commands ORDER BY id";

/// SQLite-backed command table.
///
/// Calls block on the connection lock and on disk I/O; async callers should
/// run them on the blocking pool.
pub struct CommandStore {
    conn: Mutex<Connection>,
}

impl CommandStore {
    /// Opens the database at `path`, creating the table if needed.
    /// `:memory:` gives a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let conn = if path == Path::new(":memory:") {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn in_memory() -> Result<Self, Error> {
        Self::open(":memory:")
    }

    pub fn list(&self) -> Result<Vec<Command>, Error> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(SELECT_ALL)?;
        let commands = stmt
            .query_map([], row_to_command)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(commands)
    }

    /// Inserts a new `pending` command and returns it as stored.
    pub fn create(&self, req: CommandRequest) -> Result<Command, Error> {
        let now = Utc::now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO commands (command_type, status, params, created_on, updated_on)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![req.command_type, CommandStatus::Pending, req.params, now],
        )?;
        let id = conn.last_insert_rowid();
        let command = conn.query_row(
            "SELECT id, command_type, status, params, created_on, updated_on
             FROM commands WHERE id = ?1",
            [id],
            row_to_command,
        )?;
        Ok(command)
    }

    /// Deletes by id; `false` when no such command exists.
    pub fn delete(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM commands WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}

fn row_to_command(row: &Row<'_>) -> rusqlite::Result<Command> {
    Ok(Command {
        id: row.get(0)?,
        command_type: row.get(1)?,
        status: row.get(2)?,
        params: row.get(3)?,
        created_on: row.get(4)?,
        updated_on: row.get(5)?,
    })
}
