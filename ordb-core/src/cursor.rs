//! Typed navigation over a subgraph: attribute reads/writes and the
//! hierarchical-naming layer built on NPath nodes.

use crate::error::{OrdbError, OrdbResult};
use crate::index::IndexKey;
use crate::node::NodeTuple;
use crate::schema::{Registry, NPATH_NAME, NPATH_PARENT, NPATH_REF};
use crate::subgraph::{MutableSubgraph, SubgraphLike};
use crate::updater::{Inserter, Updater};
use crate::value::{AttrValue, PathName};
use crate::Nid;

/// A value-typed locator `(subgraph, nid, npath_nid)`. Cursors do not own
/// anything; they become stale (reads fail) if their nid is removed from
/// the underlying subgraph.
#[derive(Clone, Copy)]
pub struct Cursor<'s, S> {
    subgraph: &'s S,
    nid: Option<Nid>,
    npath_nid: Option<Nid>,
}

impl<'s, S> Cursor<'s, S> {
    pub fn at(subgraph: &'s S, nid: Nid) -> Self {
        Cursor {
            subgraph,
            nid: Some(nid),
            npath_nid: None,
        }
    }

    pub fn at_path(subgraph: &'s S, nid: Option<Nid>, npath_nid: Option<Nid>) -> Self {
        Cursor {
            subgraph,
            nid,
            npath_nid,
        }
    }

    pub fn root(subgraph: &'s S) -> Self {
        Cursor::at(subgraph, Nid::ROOT)
    }

    pub fn nid(&self) -> Option<Nid> {
        self.nid
    }

    pub fn npath_nid(&self) -> Option<Nid> {
        self.npath_nid
    }

    pub fn subgraph(&self) -> &'s S {
        self.subgraph
    }
}

impl<'s, S: SubgraphLike> Cursor<'s, S> {
    fn node(&self) -> OrdbResult<NodeTuple> {
        let nid = self
            .nid
            .ok_or_else(|| OrdbError::OrdbException("cursor has no nid".into()))?;
        self.subgraph
            .snapshot()
            .nodes
            .get(&nid)
            .cloned()
            .ok_or_else(|| OrdbError::OrdbException(format!("stale cursor: nid {nid} no longer exists")))
    }

    /// Read a plain attribute value.
    pub fn attr(&self, registry: &Registry, name: &str) -> OrdbResult<AttrValue> {
        let node = self.node()?;
        let kind = registry
            .get(node.kind)
            .ok_or_else(|| OrdbError::OrdbException(format!("unknown node kind {:?}", node.kind)))?;
        let i = kind
            .field_index(name)
            .ok_or_else(|| OrdbError::QueryException(format!("{} has no field {name}", kind.name)))?;
        Ok(node.attrs[i].clone())
    }

    /// Read a local-ref (or subgraph-ref) attribute and expand it into a
    /// cursor at the referenced nid, in the same subgraph.
    pub fn attr_cursor(&self, registry: &Registry, name: &str) -> OrdbResult<Cursor<'s, S>> {
        let value = self.attr(registry, name)?;
        match value.as_local_ref() {
            Some(Some(target)) => Ok(Cursor::at(self.subgraph, target)),
            Some(None) => Err(OrdbError::QueryException(format!("{name} is None"))),
            None => Err(OrdbError::OrdbException(format!(
                "{name} is not a local-ref attribute"
            ))),
        }
    }

    /// Look up the NPath child named `name` under this cursor's namespace
    /// and return a cursor at its `ref`, tagged with the NPath's own nid as
    /// the new `npath_nid`.
    pub fn child(&self, name: impl Into<PathName>) -> OrdbResult<Cursor<'s, S>> {
        let name = name.into();
        let key = IndexKey::PathChild(self.npath_nid, name.clone());
        let bucket = self
            .subgraph
            .snapshot()
            .index
            .get(&key)
            .cloned()
            .ok_or_else(|| OrdbError::QueryException(format!("no child named {name}")))?;
        let npath_nid = bucket
            .iter_nids()
            .next()
            .ok_or_else(|| OrdbError::QueryException(format!("no child named {name}")))?;
        let npath_node = self
            .subgraph
            .snapshot()
            .nodes
            .get(&npath_nid)
            .cloned()
            .expect("index entry without backing node");
        let target = npath_node.attrs[NPATH_REF].as_local_ref().flatten();
        Ok(Cursor {
            subgraph: self.subgraph,
            nid: target,
            npath_nid: Some(npath_nid),
        })
    }

    /// Walk up to this cursor's NPath parent.
    pub fn parent(&self) -> OrdbResult<Cursor<'s, S>> {
        let npath_nid = self
            .npath_nid
            .ok_or_else(|| OrdbError::QueryException("cursor has no npath_nid".into()))?;
        let npath_node = self
            .subgraph
            .snapshot()
            .nodes
            .get(&npath_nid)
            .cloned()
            .ok_or_else(|| OrdbError::OrdbException("stale npath cursor".into()))?;
        let parent_npath = npath_node.attrs[NPATH_PARENT].as_local_ref().flatten();
        let parent_ref = parent_npath.and_then(|p| {
            self.subgraph
                .snapshot()
                .nodes
                .get(&p)
                .and_then(|n| n.attrs[NPATH_REF].as_local_ref().flatten())
        });
        Ok(Cursor {
            subgraph: self.subgraph,
            nid: parent_ref,
            npath_nid: parent_npath,
        })
    }

    /// The chain of path segment names from the subgraph's namespace root
    /// down to this cursor, e.g. `["foo", "bar", 3]`.
    pub fn full_path_list(&self) -> Vec<PathName> {
        let mut segments = Vec::new();
        let mut current = self.npath_nid;
        let snapshot = self.subgraph.snapshot();
        while let Some(nid) = current {
            let Some(node) = snapshot.nodes.get(&nid) else {
                break;
            };
            segments.push(path_name(&node.attrs[NPATH_NAME]));
            current = node.attrs[NPATH_PARENT].as_local_ref().flatten();
        }
        segments.reverse();
        segments
    }

    pub fn full_path_str(&self) -> String {
        self.full_path_list()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn path_name(v: &AttrValue) -> PathName {
    match v {
        AttrValue::Str(s) => PathName::Str(s.clone()),
        AttrValue::Int(i) => PathName::Int(*i),
        other => PathName::Str(other.to_string()),
    }
}

impl<'s> Cursor<'s, MutableSubgraph> {
    /// Write a single attribute as its own one-op transaction.
    pub fn set_attr(&self, registry: &Registry, name: &str, value: AttrValue) -> OrdbResult<()> {
        let nid = self
            .nid
            .ok_or_else(|| OrdbError::OrdbException("cursor has no nid".into()))?;
        let node = self.node()?;
        let kind = registry.get(node.kind).expect("node kind must be registered");
        let i = kind
            .field_index(name)
            .ok_or_else(|| OrdbError::QueryException(format!("{} has no field {name}", kind.name)))?;
        let updated = node.with_attr(i, value);
        self.subgraph.update_node(registry, nid, updated)
    }

    /// Insert `inserter`'s payload, then link it under this cursor's
    /// namespace with the NPath `(parent=self.npath_nid, name)`.
    pub fn assign_child(
        &self,
        registry: &Registry,
        name: impl Into<PathName>,
        inserter: impl Inserter,
    ) -> OrdbResult<Cursor<'s, MutableSubgraph>> {
        let name = name.into();
        let parent = self.npath_nid;
        let mut updater = Updater::open(self.subgraph, registry);
        let target_nid = updater.insert(inserter)?;
        let npath = NodeTuple::new(
            "NPath",
            vec![
                parent.map_or(AttrValue::None, |p| AttrValue::LocalRef(Some(p))),
                name_to_attr(&name),
                AttrValue::LocalRef(Some(target_nid)),
            ],
        );
        let npath_nid = updater.insert(npath)?;
        updater.commit()?;
        Ok(Cursor {
            subgraph: self.subgraph,
            nid: Some(target_nid),
            npath_nid: Some(npath_nid),
        })
    }

    /// Create a pure namespace node (no `ref`) under this cursor.
    pub fn mkpath(
        &self,
        registry: &Registry,
        name: impl Into<PathName>,
    ) -> OrdbResult<Cursor<'s, MutableSubgraph>> {
        let name = name.into();
        let parent = self.npath_nid;
        let npath = NodeTuple::new(
            "NPath",
            vec![
                parent.map_or(AttrValue::None, |p| AttrValue::LocalRef(Some(p))),
                name_to_attr(&name),
                AttrValue::None,
            ],
        );
        let npath_nid = self.subgraph.add(registry, npath)?;
        Ok(Cursor {
            subgraph: self.subgraph,
            nid: None,
            npath_nid: Some(npath_nid),
        })
    }

    /// `self % inserter`: insert `inserter`'s payload and set its `ref`
    /// back-pointer to `self.nid` — used when a child node's own `ref`
    /// field points back to the cursor it logically belongs to, rather
    /// than the other way round as `assign_child` does.
    pub fn backref(
        &self,
        registry: &Registry,
        field: &str,
        inserter: impl Inserter,
    ) -> OrdbResult<Cursor<'s, MutableSubgraph>> {
        let owner = self
            .nid
            .ok_or_else(|| OrdbError::OrdbException("cursor has no nid".into()))?;
        let field = field.to_string();
        let mut updater = Updater::open(self.subgraph, registry);
        let nid = updater.insert(inserter)?;
        let node = updater
            .working_node(nid)
            .ok_or_else(|| OrdbError::OrdbException("inserted node vanished".into()))?;
        let kind_name = node.kind;
        let reg_kind = registry
            .get(kind_name)
            .ok_or_else(|| OrdbError::OrdbException(format!("unknown node kind {kind_name:?}")))?;
        let i = reg_kind
            .field_index(&field)
            .ok_or_else(|| OrdbError::QueryException(format!("{kind_name} has no field {field}")))?;
        let updated = node.with_attr(i, AttrValue::LocalRef(Some(owner)));
        updater.update(nid, updated)?;
        updater.commit()?;
        Ok(Cursor::at(self.subgraph, nid))
    }

    /// Remove this cursor's NPath and, if present, the node it refers to.
    pub fn delete(&self, registry: &Registry) -> OrdbResult<()> {
        let npath_nid = self
            .npath_nid
            .ok_or_else(|| OrdbError::OrdbException("cursor has no npath_nid".into()))?;
        let mut updater = Updater::open(self.subgraph, registry);
        if let Some(nid) = self.nid {
            updater.remove_nid(nid)?;
        }
        updater.remove_nid(npath_nid)?;
        updater.commit()
    }
}

fn name_to_attr(name: &PathName) -> AttrValue {
    match name {
        PathName::Str(s) => AttrValue::Str(s.clone()),
        PathName::Int(i) => AttrValue::Int(*i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, NodeKind, RefKind, Registry};
    use crate::{node_kind, Nid};

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(node_kind!("Root", fields: [], root, non_leaf));
        reg.register(node_kind!(
            "Leaf",
            fields: [FieldSpec::new("value", RefKind::Plain)]
        ));
        reg
    }

    #[test]
    fn child_lookup_roundtrips_through_npath() {
        let reg = registry();
        let sg = MutableSubgraph::new_empty();
        sg.add(&reg, NodeTuple::new("Root", vec![])).unwrap();
        let root = Cursor::root(&sg);
        let leaf = root
            .assign_child(&reg, "a", NodeTuple::new("Leaf", vec![AttrValue::Int(1)]))
            .unwrap();
        let found = root.child("a").unwrap();
        assert_eq!(found.nid(), leaf.nid());
        assert_eq!(found.full_path_str(), "a");
    }

    #[test]
    fn cursor_at_matches_cursor_at_nid() {
        let reg = registry();
        let sg = MutableSubgraph::new_empty();
        sg.add(&reg, NodeTuple::new("Root", vec![])).unwrap();
        let c = Cursor::at(&sg, Nid::ROOT);
        assert_eq!(c.nid(), Some(Nid::ROOT));
    }
}
