//! The error taxonomy surfaced by ORDB to its callers.

use crate::value::IndexKeyValue;
use crate::Nid;

/// All failure modes an [`crate::updater::Updater`] commit or a query can
/// raise. Construction never retries or logs on ORDB's behalf; callers
/// decide what to do with a failed transaction.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum OrdbError {
    /// A generic constraint failure: missing root, bad NPath name, a
    /// non-leaf violation, and similar schema-level problems that aren't
    /// one of the more specific variants below.
    #[error("model violation: {0}")]
    ModelViolation(String),

    /// A unique index saw two rows for the same key.
    #[error("unique violation on index {index:?}: {key:?}")]
    UniqueViolation {
        index: &'static str,
        key: IndexKeyValue,
    },

    /// A local-ref points at a nonexistent nid, or a removal would leave
    /// one dangling.
    #[error("dangling local ref to nid {0}")]
    DanglingLocalRef(Nid),

    /// `one()` did not return exactly one row, or a path lookup missed.
    #[error("query error: {0}")]
    QueryException(String),

    /// Catch-all for misuse: bad transaction state, duplicate nid, nid
    /// allocator exhausted, cursor used on the wrong subgraph.
    #[error("ordb misuse: {0}")]
    OrdbException(String),
}

pub type OrdbResult<T> = Result<T, OrdbError>;
