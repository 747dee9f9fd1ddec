//! Database session abstraction used by the script runner.
//!
//! Sessions are opened and closed by the caller. The runner only borrows
//! them for the length of a run through a [`SessionMap`].

mod command;
mod split;

use std::collections::HashMap;
use std::pin::Pin;

use futures::Stream;
use thiserror::Error;

pub use command::{CommandSession, DEFAULT_SYNC_STATEMENT, SYNC_MARKER};
pub use split::split_statements;

use crate::plan::SessionRole;

/// One executed statement and the rows it returned, in driver order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementResult {
    pub query: String,
    pub rows: Vec<String>,
}

pub type StatementStream<'a> =
    Pin<Box<dyn Stream<Item = Result<StatementResult, SessionError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session '{label}' has no command configured")]
    NotConfigured { label: String },
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to {action} `{command}`: {source}")]
    Io {
        action: &'static str,
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("statement failed ({status}): {stderr}\n  query: {query}")]
    StatementFailed {
        query: String,
        status: String,
        stderr: String,
    },
    /// Failure reported by a custom [`SqlSession`] implementation, such as a
    /// driver-backed session, in its own words.
    #[error("{0}")]
    Remote(String),
}

/// A live connection able to run a multi-statement SQL text.
pub trait SqlSession: Send {
    fn label(&self) -> &str;

    /// Executes `sql` statement by statement. The stream yields one result per
    /// statement and ends after the first error.
    fn execute_stream<'a>(&'a mut self, sql: &'a str) -> StatementStream<'a>;
}

/// Caller-owned sessions keyed by the role they play in a plan.
#[derive(Default)]
pub struct SessionMap<'s> {
    sessions: HashMap<SessionRole, &'s mut dyn SqlSession>,
}

impl<'s> SessionMap<'s> {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    pub fn insert(&mut self, role: SessionRole, session: &'s mut dyn SqlSession) {
        self.sessions.insert(role, session);
    }

    pub fn with(mut self, role: SessionRole, session: Option<&'s mut dyn SqlSession>) -> Self {
        if let Some(session) = session {
            self.insert(role, session);
        }
        self
    }

    pub fn get_mut(&mut self, role: SessionRole) -> Option<&mut (dyn SqlSession + 's)> {
        self.sessions.get_mut(&role).map(|session| &mut **session)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
