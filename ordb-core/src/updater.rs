//! The transactional updater: batches add/update/remove, enforces
//! referential and uniqueness constraints atomically, allocates nids.

use crate::error::{OrdbError, OrdbResult};
use crate::index::{self, Index, IndexKey};
use crate::node::NodeTuple;
use crate::schema::{NodeKind, RefKind, Registry, NPATH_NAME, NPATH_PARENT, NPATH_REF};
use crate::subgraph::{MutableSubgraph, SubgraphData};
use crate::value::{AttrValue, PathName};
use crate::Nid;
use ordb_entity::EntityRef;

fn path_name_of(v: &AttrValue) -> PathName {
    match v {
        AttrValue::Str(s) => PathName::Str(s.clone()),
        AttrValue::Int(i) => PathName::Int(*i),
        other => PathName::Str(other.to_string()),
    }
}

/// An NPath string name must start with an ASCII letter or underscore.
/// Integer names (array-like children) are exempt — there is no lexical
/// shape to check.
fn check_npath_name(v: &AttrValue) -> OrdbResult<()> {
    if let AttrValue::Str(s) = v {
        let starts_ok = s
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        if !starts_ok {
            return Err(OrdbError::ModelViolation(format!(
                "bad NPath name {s:?}: must start with an ASCII letter or underscore"
            )));
        }
    }
    Ok(())
}

/// All index entries that `node` (already placed at `nid`) contributes.
/// `bool` is `true` for an ordered bucket, `false` for an unordered set.
fn node_index_entries(kind: &NodeKind, node: &NodeTuple) -> Vec<(IndexKey, bool)> {
    let mut entries = vec![(IndexKey::Kind(node.kind), true)];
    for (i, field) in kind.fields.iter().enumerate() {
        let value = &node.attrs[i];
        if field.unique {
            if let Some(key) = value.as_index_key() {
                entries.push((IndexKey::Unique(kind.name, field.name, key), true));
            }
        }
        if field.kind == RefKind::LocalRef {
            if let Some(Some(target)) = value.as_local_ref() {
                entries.push((IndexKey::LocalRefTarget(target), false));
            }
        }
    }
    if node.kind == "NPath" {
        let parent = node.attrs[NPATH_PARENT].as_local_ref().flatten();
        let name = path_name_of(&node.attrs[NPATH_NAME]);
        entries.push((IndexKey::PathChild(parent, name), true));
        if let Some(Some(Some(r))) = node.attrs.get(NPATH_REF).map(|v| v.as_local_ref()) {
            entries.push((IndexKey::PathRef(r), true));
        }
    }
    entries
}

fn apply_entries(idx: &Index, entries: &[(IndexKey, bool)], nid: Nid, insert: bool) -> Index {
    let mut idx = idx.clone();
    for (key, ordered) in entries {
        idx = if insert {
            if *ordered {
                index::insert_ordered(&idx, key.clone(), nid)
            } else {
                index::insert_set(&idx, key.clone(), nid)
            }
        } else {
            index::remove(&idx, key, nid)
        };
    }
    idx
}

/// Anything that, given an open updater, inserts one or more nodes and
/// returns the "primary" nid — a plain [`NodeTuple`], or a closure wrapped
/// in [`FuncInserter`] for nodes whose children must be inserted alongside
/// them in the same transaction.
pub trait Inserter {
    fn insert_into(self, updater: &mut Updater<'_>) -> OrdbResult<Nid>;
}

impl Inserter for NodeTuple {
    fn insert_into(self, updater: &mut Updater<'_>) -> OrdbResult<Nid> {
        let nid = updater.nid_generate()?;
        updater.add_single(self, nid)?;
        Ok(nid)
    }
}

/// Wraps a closure that performs several adds/updates and returns the
/// primary nid, used for parent nodes whose children must reference them
/// atomically.
pub struct FuncInserter<F>(pub F);

impl<F> Inserter for FuncInserter<F>
where
    F: FnOnce(&mut Updater<'_>) -> OrdbResult<Nid>,
{
    fn insert_into(self, updater: &mut Updater<'_>) -> OrdbResult<Nid> {
        (self.0)(updater)
    }
}

/// A scoped, in-memory transaction over a [`MutableSubgraph`]. Mutates
/// working copies of `nodes`/`index`/`next_nid`; [`Updater::commit`]
/// validates and publishes them atomically, anything else (including just
/// dropping the updater) discards them, leaving the target untouched.
pub struct Updater<'s> {
    target: &'s MutableSubgraph,
    working: SubgraphData,
    registry: &'s Registry,
    touched: Vec<Nid>,
    removed: Vec<Nid>,
    finished: bool,
}

impl<'s> Updater<'s> {
    pub fn open(target: &'s MutableSubgraph, registry: &'s Registry) -> Self {
        Updater {
            working: target.data(),
            target,
            registry,
            touched: Vec::new(),
            removed: Vec::new(),
            finished: false,
        }
    }

    pub fn nid_generate(&mut self) -> OrdbResult<Nid> {
        let raw = self.working.next_nid;
        let next = raw
            .checked_add(1)
            .ok_or_else(|| OrdbError::OrdbException("nid allocator exhausted".into()))?;
        self.working.next_nid = next;
        Ok(Nid::new(raw as usize))
    }

    /// Insert `node` at exactly `nid`. `nid` must fall inside the unused
    /// range and not already be occupied.
    pub fn add_single(&mut self, node: NodeTuple, nid: Nid) -> OrdbResult<Nid> {
        if nid.as_u32() >= self.working.next_nid {
            return Err(OrdbError::OrdbException(format!(
                "nid {nid} is outside the allocator's range"
            )));
        }
        if self.working.nodes.contains_key(&nid) {
            return Err(OrdbError::OrdbException(format!(
                "nid {nid} is already occupied"
            )));
        }
        let kind = self.kind_of(&node)?;
        let entries = node_index_entries(kind, &node);
        self.working.index = apply_entries(&self.working.index, &entries, nid, true);
        self.working.nodes.insert(nid, node);
        self.touched.push(nid);
        self.removed.retain(|n| *n != nid);
        Ok(nid)
    }

    pub fn remove_nid(&mut self, nid: Nid) -> OrdbResult<()> {
        if nid == Nid::ROOT {
            return Err(OrdbError::OrdbException("cannot remove the root node".into()));
        }
        let node = self
            .working
            .nodes
            .get(&nid)
            .cloned()
            .ok_or_else(|| OrdbError::OrdbException(format!("no such nid {nid}")))?;
        let kind = self.kind_of(&node)?;
        let entries = node_index_entries(kind, &node);
        self.working.index = apply_entries(&self.working.index, &entries, nid, false);
        self.working.nodes.remove(&nid);
        self.removed.push(nid);
        self.touched.retain(|n| *n != nid);
        Ok(())
    }

    pub fn update(&mut self, nid: Nid, node: NodeTuple) -> OrdbResult<()> {
        let old = self
            .working
            .nodes
            .get(&nid)
            .cloned()
            .ok_or_else(|| OrdbError::OrdbException(format!("no such nid {nid}")))?;
        let old_kind = self.kind_of(&old)?;
        let old_entries = node_index_entries(old_kind, &old);
        self.working.index = apply_entries(&self.working.index, &old_entries, nid, false);
        let new_kind = self.kind_of(&node)?;
        let new_entries = node_index_entries(new_kind, &node);
        self.working.index = apply_entries(&self.working.index, &new_entries, nid, true);
        self.working.nodes.insert(nid, node);
        self.touched.push(nid);
        Ok(())
    }

    pub fn insert(&mut self, inserter: impl Inserter) -> OrdbResult<Nid> {
        inserter.insert_into(self)
    }

    /// Read back a node from this transaction's working copy, including
    /// ones inserted earlier in the same transaction.
    pub fn working_node(&self, nid: Nid) -> Option<NodeTuple> {
        self.working.nodes.get(&nid).cloned()
    }

    fn kind_of(&self, node: &NodeTuple) -> OrdbResult<&NodeKind> {
        self.registry
            .get(node.kind)
            .ok_or_else(|| OrdbError::OrdbException(format!("unknown node kind {:?}", node.kind)))
    }

    fn check(&self) -> OrdbResult<()> {
        let root = self
            .working
            .nodes
            .get(&Nid::ROOT)
            .ok_or_else(|| OrdbError::ModelViolation("subgraph has no root node (nid 0)".into()))?;
        let root_kind = self.kind_of(root)?;
        if !root_kind.is_subgraph_root {
            return Err(OrdbError::ModelViolation(format!(
                "{} is not a subgraph-root kind",
                root_kind.name
            )));
        }

        for &nid in &self.touched {
            let node = self.working.nodes.get(&nid).expect("touched nid must exist");
            let kind = self.kind_of(node)?;
            for (i, field) in kind.fields.iter().enumerate() {
                let value = &node.attrs[i];
                if field.kind == RefKind::LocalRef {
                    match value.as_local_ref().flatten() {
                        Some(target) => {
                            if !self.working.nodes.contains_key(&target) {
                                return Err(OrdbError::DanglingLocalRef(target));
                            }
                        }
                        None if !field.optional => {
                            return Err(OrdbError::ModelViolation(format!(
                                "{}.{} is required",
                                kind.name, field.name
                            )));
                        }
                        None => {}
                    }
                }
                if field.unique {
                    if let Some(key) = value.as_index_key() {
                        let index_key = IndexKey::Unique(kind.name, field.name, key.clone());
                        if let Some(bucket) = index::get(&self.working.index, &index_key) {
                            if bucket.len() > 1 {
                                return Err(OrdbError::UniqueViolation {
                                    index: field.name,
                                    key,
                                });
                            }
                        }
                    }
                }
            }
            if node.kind == "NPath" {
                let parent = node.attrs[NPATH_PARENT].as_local_ref().flatten();
                check_npath_name(&node.attrs[NPATH_NAME])?;
                // The node this NPath nests under isn't `parent` itself (that's
                // the parent *NPath* entry, chaining the namespace) — it's
                // whatever node that parent NPath's own `ref` points to, or the
                // subgraph root when there is no parent NPath at all. A pure
                // namespace node (`ref == None`, from `mkpath`) owns nothing to
                // check against.
                let owner = match parent {
                    None => Some(Nid::ROOT),
                    Some(parent_npath_nid) => {
                        let parent_npath = self
                            .working
                            .nodes
                            .get(&parent_npath_nid)
                            .ok_or(OrdbError::DanglingLocalRef(parent_npath_nid))?;
                        parent_npath.attrs[NPATH_REF].as_local_ref().flatten()
                    }
                };
                if let Some(owner_nid) = owner {
                    let owner_node = self
                        .working
                        .nodes
                        .get(&owner_nid)
                        .ok_or(OrdbError::DanglingLocalRef(owner_nid))?;
                    let owner_kind = self.kind_of(owner_node)?;
                    if !owner_kind.is_non_leaf {
                        return Err(OrdbError::ModelViolation(format!(
                            "{} is a leaf kind and cannot have NPath children",
                            owner_kind.name
                        )));
                    }
                }
                let name = path_name_of(&node.attrs[NPATH_NAME]);
                let child_key = IndexKey::PathChild(parent, name);
                if let Some(bucket) = index::get(&self.working.index, &child_key) {
                    if bucket.len() > 1 {
                        return Err(OrdbError::ModelViolation(
                            "duplicate NPath (parent, name)".into(),
                        ));
                    }
                }
                if let Some(r) = node.attrs[NPATH_REF].as_local_ref().flatten() {
                    let ref_key = IndexKey::PathRef(r);
                    if let Some(bucket) = index::get(&self.working.index, &ref_key) {
                        if bucket.len() > 1 {
                            return Err(OrdbError::ModelViolation(
                                "duplicate NPath ref".into(),
                            ));
                        }
                    }
                }
            }
        }

        for &nid in &self.removed {
            if let Some(bucket) = index::get(&self.working.index, &IndexKey::LocalRefTarget(nid)) {
                if !bucket.is_empty() {
                    return Err(OrdbError::DanglingLocalRef(nid));
                }
            }
        }

        Ok(())
    }

    /// Validate and publish this transaction's working copies to the
    /// target subgraph. On any constraint failure nothing is published.
    pub fn commit(mut self) -> OrdbResult<()> {
        self.check()?;
        self.target.replace(self.working.clone());
        self.finished = true;
        log::trace!("transaction committed: {} nid(s) touched, {} removed", self.touched.len(), self.removed.len());
        Ok(())
    }

    /// Explicitly discard this transaction. Equivalent to dropping the
    /// updater, spelled out for callers that want the intent visible.
    pub fn discard(mut self) {
        self.finished = true;
        log::trace!("transaction discarded");
    }
}

impl Drop for Updater<'_> {
    fn drop(&mut self) {
        if !self.finished {
            log::debug!("Updater dropped without commit() or discard(); changes were not applied");
        }
    }
}

impl MutableSubgraph {
    /// Sugar: open an updater, insert `inserter`, commit. Individual
    /// add/update/remove calls on the subgraph API never bypass the
    /// transactional path.
    pub fn add(&self, registry: &Registry, inserter: impl Inserter) -> OrdbResult<Nid> {
        let mut updater = Updater::open(self, registry);
        let nid = updater.insert(inserter)?;
        updater.commit()?;
        Ok(nid)
    }

    pub fn update_node(&self, registry: &Registry, nid: Nid, node: NodeTuple) -> OrdbResult<()> {
        let mut updater = Updater::open(self, registry);
        updater.update(nid, node)?;
        updater.commit()
    }

    pub fn remove(&self, registry: &Registry, nid: Nid) -> OrdbResult<()> {
        let mut updater = Updater::open(self, registry);
        updater.remove_nid(nid)?;
        updater.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use crate::{node_kind, Nid};
    use ordb_entity::EntityRef;

    fn registry_with(kinds: Vec<NodeKind>) -> Registry {
        let mut reg = Registry::new();
        for k in kinds {
            reg.register(k);
        }
        reg
    }

    fn root_kind() -> NodeKind {
        node_kind!("Root", fields: [], root)
    }

    #[test]
    fn commit_requires_root_node() {
        let reg = registry_with(vec![root_kind()]);
        let sg = MutableSubgraph::new_empty();
        let mut u = Updater::open(&sg, &reg);
        let _ = u.nid_generate().unwrap(); // burns nid 0 without inserting it
        let err = u.commit().unwrap_err();
        assert_eq!(err, OrdbError::ModelViolation("subgraph has no root node (nid 0)".into()));
    }

    #[test]
    fn unique_violation_blocks_commit_and_leaves_subgraph_untouched() {
        let u1 = node_kind!(
            "NodeU1",
            fields: [FieldSpec::new("label", RefKind::Plain).unique()]
        );
        let reg = registry_with(vec![root_kind(), u1]);
        let sg = MutableSubgraph::new_empty();
        sg.add(&reg, NodeTuple::new("Root", vec![])).unwrap();
        sg.add(
            &reg,
            NodeTuple::new("NodeU1", vec![AttrValue::Str("hello".into())]),
        )
        .unwrap();
        let before = sg.data();
        let err = sg
            .add(
                &reg,
                NodeTuple::new("NodeU1", vec![AttrValue::Str("hello".into())]),
            )
            .unwrap_err();
        assert!(matches!(err, OrdbError::UniqueViolation { .. }));
        assert_eq!(sg.data(), before);
    }

    #[test]
    fn dangling_local_ref_is_rejected_and_rolled_back() {
        let person = node_kind!(
            "Person",
            fields: [
                FieldSpec::new("best_friend", RefKind::LocalRef).optional(),
                FieldSpec::new("worst_enemy", RefKind::LocalRef).optional(),
            ]
        );
        let reg = registry_with(vec![root_kind(), person]);
        let sg = MutableSubgraph::new_empty();
        sg.add(&reg, NodeTuple::new("Root", vec![])).unwrap();
        let alice = sg
            .add(
                &reg,
                NodeTuple::new("Person", vec![AttrValue::None, AttrValue::None]),
            )
            .unwrap();
        let _bob = sg
            .add(
                &reg,
                NodeTuple::new(
                    "Person",
                    vec![AttrValue::LocalRef(Some(alice)), AttrValue::None],
                ),
            )
            .unwrap();
        let charlie = sg
            .add(
                &reg,
                NodeTuple::new("Person", vec![AttrValue::None, AttrValue::None]),
            )
            .unwrap();
        let before = sg.data();
        let err = sg
            .update_node(
                &reg,
                charlie,
                NodeTuple::new(
                    "Person",
                    vec![AttrValue::None, AttrValue::LocalRef(Some(Nid::new(123456)))],
                ),
            )
            .unwrap_err();
        assert_eq!(err, OrdbError::DanglingLocalRef(Nid::new(123456)));
        assert_eq!(sg.data(), before);
    }

    #[test]
    fn removing_a_referenced_node_is_rejected() {
        let person = node_kind!(
            "Person",
            fields: [FieldSpec::new("best_friend", RefKind::LocalRef).optional()]
        );
        let reg = registry_with(vec![root_kind(), person]);
        let sg = MutableSubgraph::new_empty();
        sg.add(&reg, NodeTuple::new("Root", vec![])).unwrap();
        let alice = sg.add(&reg, NodeTuple::new("Person", vec![AttrValue::None])).unwrap();
        sg.add(
            &reg,
            NodeTuple::new("Person", vec![AttrValue::LocalRef(Some(alice))]),
        )
        .unwrap();
        let err = sg.remove(&reg, alice).unwrap_err();
        assert_eq!(err, OrdbError::DanglingLocalRef(alice));
    }

    proptest::proptest! {
        /// A transaction that ends with at least one dangling local ref
        /// never publishes any of its other, individually-valid edits —
        /// `commit()` is all-or-nothing regardless of how many adds
        /// preceded the failing one.
        #[test]
        fn failing_transaction_leaves_subgraph_byte_for_byte_unchanged(
            good_labels in proptest::collection::vec("[a-z]{1,8}", 0..8),
            bad_ref in 1000u32..2000,
        ) {
            let node = node_kind!(
                "Node",
                fields: [FieldSpec::new("label", RefKind::Plain)]
            );
            let referring = node_kind!(
                "Referring",
                fields: [FieldSpec::new("target", RefKind::LocalRef)]
            );
            let reg = registry_with(vec![root_kind(), node, referring]);
            let sg = MutableSubgraph::new_empty();
            sg.add(&reg, NodeTuple::new("Root", vec![])).unwrap();
            for label in &good_labels {
                sg.add(&reg, NodeTuple::new("Node", vec![AttrValue::Str(label.clone())])).unwrap();
            }
            let before = sg.data();

            let mut u = Updater::open(&sg, &reg);
            for label in &good_labels {
                NodeTuple::new("Node", vec![AttrValue::Str(format!("new_{label}"))])
                    .insert_into(&mut u)
                    .unwrap();
            }
            NodeTuple::new("Referring", vec![AttrValue::LocalRef(Some(Nid::new(bad_ref as usize)))])
                .insert_into(&mut u)
                .unwrap();
            let err = u.commit().unwrap_err();

            proptest::prop_assert!(matches!(err, OrdbError::DanglingLocalRef(_)));
            proptest::prop_assert_eq!(sg.data(), before);
        }
    }
}
