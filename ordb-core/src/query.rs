//! `all(query)` / `one(query)`: lookup by node kind (or, via
//! [`crate::index::IndexKey`], by any other registered index) with
//! cardinality enforcement for the single-result case.

use crate::error::{OrdbError, OrdbResult};
use crate::index::IndexKey;
use crate::subgraph::SubgraphLike;
use crate::Nid;

/// All nids registered against `kind`, in the index's natural order
/// (insertion order, since the per-kind index is an ordered bucket).
pub fn all<S: SubgraphLike>(subgraph: &S, kind: &'static str) -> Vec<Nid> {
    by_key(subgraph, &IndexKey::Kind(kind))
}

/// All nids registered against an arbitrary index key.
pub fn by_key<S: SubgraphLike>(subgraph: &S, key: &IndexKey) -> Vec<Nid> {
    subgraph
        .snapshot()
        .index
        .get(key)
        .map(|bucket| bucket.iter_nids().collect())
        .unwrap_or_default()
}

/// The single nid registered against `kind`; fails if there are zero or
/// more than one.
pub fn one<S: SubgraphLike>(subgraph: &S, kind: &'static str) -> OrdbResult<Nid> {
    let mut nids = all(subgraph, kind);
    match nids.len() {
        1 => Ok(nids.remove(0)),
        0 => Err(OrdbError::QueryException(format!("no {kind} node found"))),
        n => Err(OrdbError::QueryException(format!(
            "expected exactly one {kind} node, found {n}"
        ))),
    }
}
