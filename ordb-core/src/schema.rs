//! Declarative description of node kinds: attributes, reference kinds, and
//! the indices a kind participates in.
//!
//! The original source generates this table per class via a metaclass at
//! import time. Here it is an ordinary value, built once by the
//! [`node_kind!`] macro (or by hand) and interned behind a
//! [`once_cell::sync::Lazy`] static; attribute access elsewhere in the
//! crate is a `Vec` index, never per-type generated code.

use crate::value::AttrValue;

/// How a field relates to the rest of the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    /// An ordinary value with no referential meaning to ORDB.
    Plain,
    /// Checked at commit: must resolve to a live nid in the same subgraph.
    LocalRef,
    /// Unchecked: an nid understood by a schema-supplied resolver function,
    /// potentially in a different subgraph.
    ExternalRef,
    /// An entire embedded frozen subgraph.
    SubgraphRef,
}

/// One attribute slot in a [`NodeKind`]'s tuple layout.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: RefKind,
    /// `true` if `AttrValue::None` is a legal value for this field.
    pub optional: bool,
    /// `true` if this field backs a unique index (one entry in `index` per
    /// distinct value, checked at commit).
    pub unique: bool,
    pub default: Option<AttrValue>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: RefKind) -> Self {
        FieldSpec {
            name,
            kind,
            optional: false,
            unique: false,
            default: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, v: AttrValue) -> Self {
        self.default = Some(v);
        self
    }
}

/// A schema declaration: a stable name, an ordered list of attribute
/// descriptors (inherited fields first, per [`NodeKind::extending`]), and
/// the handful of flags the rest of ORDB needs to enforce invariants.
#[derive(Clone, Debug)]
pub struct NodeKind {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
    /// Subgraph-root kinds are the only ones legal at `nid == 0`.
    pub is_subgraph_root: bool,
    /// Only non-leaf kinds may have NPath children attached.
    pub is_non_leaf: bool,
}

impl NodeKind {
    pub fn new(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        NodeKind {
            name,
            fields,
            is_subgraph_root: false,
            is_non_leaf: false,
        }
    }

    pub fn root(mut self) -> Self {
        self.is_subgraph_root = true;
        self
    }

    pub fn non_leaf(mut self) -> Self {
        self.is_non_leaf = true;
        self
    }

    /// Build a new `NodeKind` whose field list is `base`'s fields followed
    /// by `extra` — the Rust stand-in for attribute inheritance.
    pub fn extending(name: &'static str, base: &NodeKind, extra: Vec<FieldSpec>) -> Vec<FieldSpec> {
        let mut fields = base.fields.clone();
        fields.extend(extra);
        let _ = name;
        fields
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Build a [`NodeKind`] value from a flat field list. Declarative sugar
/// over [`NodeKind::new`]/[`FieldSpec::new`] so node definitions read as a
/// table rather than a sequence of builder calls.
#[macro_export]
macro_rules! node_kind {
    ($display:expr, fields: [ $( $field:expr ),* $(,)? ] $(, $modifier:ident)* ) => {{
        #[allow(unused_mut)]
        let mut kind = $crate::schema::NodeKind::new($display, vec![ $( $field ),* ]);
        $( kind = kind.$modifier(); )*
        kind
    }};
}

/// The reserved kind backing the hierarchical-naming layer (component E).
/// Every subgraph may contain any number of these; they are distinguished
/// from ordinary nodes only by `name == "NPath"` and by the `(parent,
/// name)` / `ref` indices the subgraph store maintains for them.
pub fn npath_kind() -> NodeKind {
    node_kind!(
        "NPath",
        fields: [
            FieldSpec::new("parent", RefKind::LocalRef).optional(),
            FieldSpec::new("name", RefKind::Plain),
            FieldSpec::new("ref", RefKind::LocalRef).optional(),
        ]
    )
}

pub const NPATH_PARENT: usize = 0;
pub const NPATH_NAME: usize = 1;
pub const NPATH_REF: usize = 2;

/// The process-wide table mapping a node kind's stable name to its
/// [`NodeKind`] declaration, consulted by the updater at commit time to
/// find constraint-relevant field specs. Schemas built on `ordb-core`
/// register their kinds once, typically behind a `once_cell::sync::Lazy`.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    kinds: std::collections::HashMap<&'static str, NodeKind>,
}

impl Registry {
    pub fn new() -> Self {
        let mut reg = Registry {
            kinds: std::collections::HashMap::new(),
        };
        reg.register(npath_kind());
        reg
    }

    pub fn register(&mut self, kind: NodeKind) -> &mut Self {
        self.kinds.insert(kind.name, kind);
        self
    }

    pub fn get(&self, name: &str) -> Option<&NodeKind> {
        self.kinds.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inheritance_concatenates_fields() {
        let base = node_kind!("Base", fields: [FieldSpec::new("a", RefKind::Plain)]);
        let derived_fields =
            NodeKind::extending("Derived", &base, vec![FieldSpec::new("b", RefKind::Plain)]);
        assert_eq!(derived_fields.len(), 2);
        assert_eq!(derived_fields[0].name, "a");
        assert_eq!(derived_fields[1].name, "b");
    }

    #[test]
    fn npath_kind_has_three_fields() {
        let k = npath_kind();
        assert_eq!(k.fields.len(), 3);
        assert_eq!(k.field_index("ref"), Some(NPATH_REF));
    }
}
