//! Traversal engine over the person graph.
//!
//! # Responsibility
//! - Expand ancestor/descendant generations level by level.
//! - Find shortest kinship paths over parent, child and spouse edges.
//! - Audit relationship symmetry without mutating anything.
//!
//! # Invariants
//! - Every step resolves neighbors through the repository; nothing here
//!   keeps its own copy of the graph between calls.
//! - A visited set bounds every walk, so relationship cycles terminate.

use crate::model::person::PersonId;
use crate::repo::person_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod integrity;
pub mod kinship;
pub mod levels;

pub type GraphResult<T> = Result<T, GraphError>;

/// Errors from graph traversals.
#[derive(Debug)]
pub enum GraphError {
    /// Traversal was stopped through its [`CancelFlag`].
    Cancelled,
    /// A person seen earlier in the same traversal no longer resolves.
    MissingPerson(PersonId),
    Repo(RepoError),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "graph traversal cancelled"),
            Self::MissingPerson(id) => write!(f, "person disappeared during traversal: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Cancelled | Self::MissingPerson(_) => None,
        }
    }
}

impl From<RepoError> for GraphError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Shared cancellation signal checked between level expansions.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub(crate) fn check(flag: Option<&Self>) -> GraphResult<()> {
        match flag {
            Some(flag) if flag.is_cancelled() => Err(GraphError::Cancelled),
            _ => Ok(()),
        }
    }
}
