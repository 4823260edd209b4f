//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode};

use super::{TerminalUpdate, TicketError, TicketRecord, TicketStore};

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path).map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                ticket TEXT PRIMARY KEY,
                status INTEGER NOT NULL DEFAULT 0,
                success INTEGER,
                requested_time TEXT NOT NULL,
                execution_time REAL,
                result TEXT,
                filesize INTEGER NOT NULL,
                comment TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_requested_time ON tickets(requested_time);
            "#,
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(())
    }

    fn parse_requested_time(raw: &str) -> Result<DateTime<Utc>, TicketError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| TicketError::Database(format!("invalid requested_time: {}", e)))
    }
}

impl TicketStore for SqliteTicketStore {
    fn insert(&self, ticket: &str, filesize: u64) -> Result<(), TicketError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let result = conn.execute(
            "INSERT INTO tickets (ticket, status, requested_time, filesize) VALUES (?, 0, ?, ?)",
            params![ticket, now.to_rfc3339(), filesize],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(TicketError::AlreadyExists(ticket.to_string()))
            }
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }

    fn mark_terminal(
        &self,
        ticket: &str,
        success: bool,
        result: Option<&str>,
        comment: Option<&str>,
    ) -> Result<TerminalUpdate, TicketError> {
        let conn = self.conn.lock().unwrap();

        let row: Result<(String, i64), _> = conn.query_row(
            "SELECT requested_time, status FROM tickets WHERE ticket = ?",
            params![ticket],
            |row| Ok((row.get(0)?, row.get(1)?)),
        );

        let (requested_time_str, status) = match row {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(TicketError::NotFound(ticket.to_string()));
            }
            Err(e) => return Err(TicketError::Database(e.to_string())),
        };

        if status != 0 {
            return Err(TicketError::AlreadyTerminal(ticket.to_string()));
        }

        let requested_time = Self::parse_requested_time(&requested_time_str)?;
        let now = Utc::now();
        let elapsed_ms = now.signed_duration_since(requested_time).num_milliseconds();
        let execution_time = (elapsed_ms.max(0) as f64) / 1000.0;

        // The status guard in the WHERE clause keeps the update single-shot
        // even if another writer slipped in between the read and the write.
        let updated = conn
            .execute(
                "UPDATE tickets SET status = 1, success = ?, execution_time = ?, result = ?, \
                 comment = ? WHERE ticket = ? AND status = 0",
                params![success, execution_time, result, comment, ticket],
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        if updated == 0 {
            return Err(TicketError::AlreadyTerminal(ticket.to_string()));
        }

        Ok(TerminalUpdate {
            requested_time,
            execution_time,
        })
    }

    fn get(&self, ticket: &str) -> Result<Option<TicketRecord>, TicketError> {
        let conn = self.conn.lock().unwrap();

        type Row = (
            String,
            i64,
            Option<i64>,
            String,
            Option<f64>,
            Option<String>,
            u64,
            Option<String>,
        );

        let result: Result<Row, _> = conn.query_row(
            "SELECT ticket, status, success, requested_time, execution_time, result, filesize, \
             comment FROM tickets WHERE ticket = ?",
            params![ticket],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            },
        );

        match result {
            Ok((ticket, status, success, requested_raw, execution_time, result, filesize, comment)) => {
                Ok(Some(TicketRecord {
                    ticket,
                    completed: status != 0,
                    success: success.map(|s| s != 0),
                    requested_time: Self::parse_requested_time(&requested_raw)?,
                    execution_time,
                    result,
                    filesize,
                    comment,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }

    fn result_path(&self, ticket: &str) -> Result<Option<String>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let result: Result<Option<String>, _> = conn.query_row(
            "SELECT result FROM tickets WHERE ticket = ?",
            params![ticket],
            |row| row.get(0),
        );

        match result {
            Ok(path) => Ok(path),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }

    fn ping(&self) -> Result<(), TicketError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| TicketError::Database(e.to_string()))?;
        Ok(())
    }
}
