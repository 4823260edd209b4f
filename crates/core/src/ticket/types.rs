//! Core ticket data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generate a fresh ticket identifier.
///
/// The identifier is the md5 hex digest of a random UUIDv4, yielding an
/// opaque 32-character key with negligible collision probability.
pub fn new_ticket_id() -> String {
    format!("{:x}", md5::compute(uuid::Uuid::new_v4().to_string()))
}

/// One row of the ticket table.
///
/// A ticket is inserted once when a deferred job is accepted and receives
/// exactly one terminal update when the job finishes. While the job is
/// pending or running, `completed` is false and `success`, `execution_time`,
/// `result` and `comment` are all unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketRecord {
    /// Unique ticket key.
    pub ticket: String,
    /// Whether the job has reached a terminal state (success or failure).
    pub completed: bool,
    /// Outcome of the job; `None` until terminal.
    pub success: Option<bool>,
    /// When the job was accepted.
    pub requested_time: DateTime<Utc>,
    /// Seconds between acceptance and completion; `None` until terminal.
    pub execution_time: Option<f64>,
    /// Result location relative to the output root; set only on success.
    pub result: Option<String>,
    /// Byte size of the accepted input.
    pub filesize: u64,
    /// Error message when the job failed.
    pub comment: Option<String>,
}

/// Timing information returned by the terminal update, used for the
/// accounting log line.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalUpdate {
    pub requested_time: DateTime<Utc>,
    pub execution_time: f64,
}
