//! The persistent subgraph store: mutable and frozen variants over a
//! shared, structurally-shared representation.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::index::Index;
use crate::node::NodeTuple;
use crate::Nid;

/// The three persistent collections every subgraph owns. Cloning this
/// struct is O(1) amortized: `nodes`/`index` are HAMT/B-tree-backed
/// (`im::OrdMap`) and share structure with their ancestors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubgraphData {
    pub nodes: im::OrdMap<Nid, NodeTuple>,
    pub index: Index,
    /// Start of the half-open range of unused nids; the range's upper
    /// bound is unbounded, so only the start needs tracking.
    pub next_nid: u32,
}

impl SubgraphData {
    pub fn empty() -> Self {
        SubgraphData {
            nodes: im::OrdMap::new(),
            index: Index::new(),
            next_nid: 0,
        }
    }
}

/// Common read-only surface shared by [`MutableSubgraph`] and
/// [`FrozenSubgraph`], so the cursor/query layer can work over either.
pub trait SubgraphLike {
    fn snapshot(&self) -> SubgraphData;
}

/// An in-progress subgraph, identified by address: two `MutableSubgraph`
/// handles are equal only if they share the same underlying allocation.
#[derive(Clone, Debug)]
pub struct MutableSubgraph {
    inner: Rc<RefCell<SubgraphData>>,
}

impl MutableSubgraph {
    /// A fresh, empty mutable subgraph. Callers insert the subgraph-root
    /// node (nid 0) through an [`crate::updater::Updater`] before any other
    /// operation is valid.
    pub fn new_empty() -> Self {
        MutableSubgraph {
            inner: Rc::new(RefCell::new(SubgraphData::empty())),
        }
    }

    pub(crate) fn from_data(data: SubgraphData) -> Self {
        MutableSubgraph {
            inner: Rc::new(RefCell::new(data)),
        }
    }

    pub fn data(&self) -> SubgraphData {
        self.inner.borrow().clone()
    }

    pub(crate) fn replace(&self, data: SubgraphData) {
        *self.inner.borrow_mut() = data;
    }

    /// Cheap structural-sharing copy: a fresh, independently-identified
    /// handle over the same persistent data.
    pub fn copy(&self) -> MutableSubgraph {
        MutableSubgraph::from_data(self.data())
    }

    /// Make this subgraph's data immutable and content-addressed.
    pub fn freeze(&self) -> FrozenSubgraph {
        FrozenSubgraph {
            inner: Arc::new(self.data()),
        }
    }
}

impl SubgraphLike for MutableSubgraph {
    fn snapshot(&self) -> SubgraphData {
        self.data()
    }
}

impl PartialEq for MutableSubgraph {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
impl Eq for MutableSubgraph {}

/// A subgraph that will never be mutated again. Equality and hashing are
/// content-based: two `FrozenSubgraph`s with identical `(nodes, next_nid)`
/// compare equal even if built independently ("freeze determinism").
#[derive(Clone, Debug)]
pub struct FrozenSubgraph {
    inner: Arc<SubgraphData>,
}

impl FrozenSubgraph {
    pub fn data(&self) -> &SubgraphData {
        &self.inner
    }

    /// A fresh, independent mutable copy.
    pub fn thaw(&self) -> MutableSubgraph {
        MutableSubgraph::from_data((*self.inner).clone())
    }

    /// A stable identity for this frozen subgraph's allocation, suitable
    /// as a naming-directory key. Two structurally-equal but independently
    /// built `FrozenSubgraph`s have different identities; callers that
    /// want content-addressing should key on the value itself instead.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl SubgraphLike for FrozenSubgraph {
    fn snapshot(&self) -> SubgraphData {
        (*self.inner).clone()
    }
}

impl PartialEq for FrozenSubgraph {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || *self.inner == *other.inner
    }
}
impl Eq for FrozenSubgraph {}

impl std::hash::Hash for FrozenSubgraph {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Iterate in ascending-nid order (guaranteed by `im::OrdMap`) so
        // the hash only depends on content, never on construction history.
        for (nid, node) in self.inner.nodes.iter() {
            nid.hash(state);
            node.hash(state);
        }
        self.inner.next_nid.hash(state);
    }
}

/// Structural comparison that tolerates nid renumbering, as distinct from
/// [`PartialEq`] (which requires identical nids). Two subgraphs `match`
/// when there exists a nid-renaming that makes their node maps and indices
/// agree; this implementation only needs the common case of comparing a
/// subgraph against itself after a round trip, so it takes the simpler
/// route of checking for an order-preserving bijection seeded at nid 0.
pub fn matches(a: &SubgraphData, b: &SubgraphData) -> bool {
    if a.nodes.len() != b.nodes.len() {
        return false;
    }
    a.nodes
        .values()
        .zip(b.nodes.values())
        .all(|(na, nb)| na.kind == nb.kind && attrs_match_modulo_nid(&na.attrs, &nb.attrs))
}

fn attrs_match_modulo_nid(
    a: &[crate::value::AttrValue],
    b: &[crate::value::AttrValue],
) -> bool {
    use crate::value::AttrValue::*;
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(x, y)| match (x, y) {
        (LocalRef(_), LocalRef(_)) => true,
        (ExternalRef(_), ExternalRef(_)) => true,
        _ => x == y,
    })
}

/// Strict equality: `nodes == nodes && next_nid == next_nid`, exact nids
/// and all. Unlike [`matches`], this does not tolerate renumbering; unlike
/// `PartialEq` on [`MutableSubgraph`], it does not care about handle
/// identity, only content.
pub fn internally_equal(a: &SubgraphData, b: &SubgraphData) -> bool {
    a.nodes == b.nodes && a.next_nid == b.next_nid
}

impl MutableSubgraph {
    /// Content equality with another mutable subgraph, ignoring whether
    /// the two handles share a backing allocation.
    pub fn internally_equal(&self, other: &MutableSubgraph) -> bool {
        internally_equal(&self.data(), &other.data())
    }
}

impl FrozenSubgraph {
    /// Content equality with another frozen subgraph. `PartialEq` already
    /// does this (frozen equality is content-based), but this gives the
    /// same strict check a name that also works on [`MutableSubgraph`].
    pub fn internally_equal(&self, other: &FrozenSubgraph) -> bool {
        internally_equal(self.data(), other.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutable_equality_is_identity_based() {
        let a = MutableSubgraph::new_empty();
        let b = a.copy();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn internally_equal_ignores_mutable_handle_identity() {
        let a = MutableSubgraph::new_empty();
        let b = a.copy();
        assert_ne!(a, b);
        assert!(a.internally_equal(&b));
    }

    #[test]
    fn frozen_equality_is_structural() {
        let a = MutableSubgraph::new_empty().freeze();
        let b = MutableSubgraph::new_empty().freeze();
        assert_eq!(a, b);
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }
}
