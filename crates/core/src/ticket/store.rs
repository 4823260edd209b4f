//! Ticket storage trait.

use thiserror::Error;

use super::{TerminalUpdate, TicketRecord};

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// A row with this ticket key already exists.
    #[error("Ticket already exists: {0}")]
    AlreadyExists(String),

    /// The ticket already received its terminal update.
    #[error("Ticket already terminal: {0}")]
    AlreadyTerminal(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for ticket storage backends.
///
/// One writer per ticket: the HTTP layer writes only at `insert`, the job
/// that owns the ticket writes only at `mark_terminal`. Reads may happen
/// concurrently with either.
pub trait TicketStore: Send + Sync {
    /// Record a newly accepted job. `requested_time` is set to the current
    /// server clock.
    fn insert(&self, ticket: &str, filesize: u64) -> Result<(), TicketError>;

    /// Record the job outcome. Computes the execution time against
    /// `requested_time` and writes all terminal fields in one statement, so
    /// a concurrent reader never observes a half-written terminal row.
    ///
    /// A second terminal update for the same ticket is rejected with
    /// `AlreadyTerminal`.
    fn mark_terminal(
        &self,
        ticket: &str,
        success: bool,
        result: Option<&str>,
        comment: Option<&str>,
    ) -> Result<TerminalUpdate, TicketError>;

    /// Fetch the full projection for the status endpoint.
    fn get(&self, ticket: &str) -> Result<Option<TicketRecord>, TicketError>;

    /// Fetch only the result location. `Ok(None)` covers both an unknown
    /// ticket and a ticket without a published result.
    fn result_path(&self, ticket: &str) -> Result<Option<String>, TicketError>;

    /// Verify that the backing store is reachable.
    fn ping(&self) -> Result<(), TicketError>;
}
