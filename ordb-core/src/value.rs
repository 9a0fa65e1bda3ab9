//! The dynamically-typed attribute value carried in every node tuple slot.
//!
//! The original source lets any Python object sit in a tuple slot; here the
//! set of representable shapes is closed over the primitives ORDB actually
//! needs to reason about (references, the geometry/rational primitives, and
//! a handful of scalar kinds). Schemas built on top of `ordb-core` are free
//! to store richer payloads by nesting further `Str`/`Int` encodings, but
//! ORDB itself only needs to compare, hash, and index these variants.

use ordb_entity::{Rational, Rect4R, Vec2R, D4};
use std::fmt;

use crate::subgraph::FrozenSubgraph;
use crate::Nid;

/// One value stored in a node's attribute tuple.
#[derive(Clone, Debug)]
pub enum AttrValue {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Rational(Rational),
    Vec2R(Vec2R),
    Rect4R(Rect4R),
    D4(D4),
    /// A reference checked by ORDB: must resolve to a live nid in the same
    /// subgraph, unless the value is `None` and the field is optional.
    LocalRef(Option<Nid>),
    /// A reference into another, unspecified subgraph. ORDB does not check
    /// that the nid exists; resolution is delegated to a schema-supplied
    /// `of_subgraph` function.
    ExternalRef(Option<Nid>),
    /// An embedded frozen subgraph, structurally shared with whoever else
    /// holds a reference to the same value.
    SubgraphRef(FrozenSubgraph),
}

impl AttrValue {
    pub fn is_none(&self) -> bool {
        matches!(self, AttrValue::None)
    }

    pub fn as_local_ref(&self) -> Option<Option<Nid>> {
        match self {
            AttrValue::LocalRef(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_external_ref(&self) -> Option<Option<Nid>> {
        match self {
            AttrValue::ExternalRef(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_subgraph_ref(&self) -> Option<&FrozenSubgraph> {
        match self {
            AttrValue::SubgraphRef(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Project a value down to the narrow, totally-ordered key space usable
    /// in a unique index or an NPath name. Geometry/subgraph-valued
    /// attributes have no sensible index key and return `None`.
    pub fn as_index_key(&self) -> Option<IndexKeyValue> {
        match self {
            AttrValue::Bool(b) => Some(IndexKeyValue::Bool(*b)),
            AttrValue::Int(i) => Some(IndexKeyValue::Int(*i)),
            AttrValue::Str(s) => Some(IndexKeyValue::Str(s.clone())),
            AttrValue::LocalRef(Some(n)) | AttrValue::ExternalRef(Some(n)) => {
                Some(IndexKeyValue::Nid(*n))
            }
            AttrValue::None => Some(IndexKeyValue::None),
            _ => None,
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        use AttrValue::*;
        match (self, other) {
            (None, None) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Rational(a), Rational(b)) => a == b,
            (Vec2R(a), Vec2R(b)) => a == b,
            (Rect4R(a), Rect4R(b)) => a == b,
            (D4(a), D4(b)) => a == b,
            (LocalRef(a), LocalRef(b)) => a == b,
            (ExternalRef(a), ExternalRef(b)) => a == b,
            (SubgraphRef(a), SubgraphRef(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for AttrValue {}

impl std::hash::Hash for AttrValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            AttrValue::None => {}
            AttrValue::Bool(b) => b.hash(state),
            AttrValue::Int(i) => i.hash(state),
            AttrValue::Str(s) => s.hash(state),
            AttrValue::Rational(r) => r.hash(state),
            AttrValue::Vec2R(v) => {
                v.x.hash(state);
                v.y.hash(state);
            }
            AttrValue::Rect4R(r) => {
                r.lx.hash(state);
                r.ly.hash(state);
                r.ux.hash(state);
                r.uy.hash(state);
            }
            AttrValue::D4(d) => d.hash(state),
            AttrValue::LocalRef(n) => n.hash(state),
            AttrValue::ExternalRef(n) => n.hash(state),
            AttrValue::SubgraphRef(s) => s.hash(state),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::None => write!(f, "None"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Str(s) => write!(f, "{s:?}"),
            AttrValue::Rational(r) => write!(f, "{r}"),
            AttrValue::Vec2R(v) => write!(f, "Vec2R({}, {})", v.x, v.y),
            AttrValue::Rect4R(r) => write!(f, "Rect4R({}, {}, {}, {})", r.lx, r.ly, r.ux, r.uy),
            AttrValue::D4(d) => write!(f, "{d}"),
            AttrValue::LocalRef(Some(n)) => write!(f, "->{n}"),
            AttrValue::LocalRef(None) => write!(f, "None"),
            AttrValue::ExternalRef(Some(n)) => write!(f, "ext->{n}"),
            AttrValue::ExternalRef(None) => write!(f, "None"),
            AttrValue::SubgraphRef(_) => write!(f, "<subgraph>"),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}
impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}
impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}
impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}
impl From<Rational> for AttrValue {
    fn from(v: Rational) -> Self {
        AttrValue::Rational(v)
    }
}
impl From<Vec2R> for AttrValue {
    fn from(v: Vec2R) -> Self {
        AttrValue::Vec2R(v)
    }
}
impl From<Rect4R> for AttrValue {
    fn from(v: Rect4R) -> Self {
        AttrValue::Rect4R(v)
    }
}
impl From<D4> for AttrValue {
    fn from(v: D4) -> Self {
        AttrValue::D4(v)
    }
}

/// A narrow, totally-ordered projection of [`AttrValue`], used as the key
/// type for unique indices and in error messages.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKeyValue {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Nid(Nid),
}

impl fmt::Display for IndexKeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKeyValue::None => write!(f, "None"),
            IndexKeyValue::Bool(b) => write!(f, "{b}"),
            IndexKeyValue::Int(i) => write!(f, "{i}"),
            IndexKeyValue::Str(s) => write!(f, "{s:?}"),
            IndexKeyValue::Nid(n) => write!(f, "{n}"),
        }
    }
}

/// An NPath segment name: either an identifier-like string or an integer,
/// for array-like children.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathName {
    Str(String),
    Int(i64),
}

impl fmt::Display for PathName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathName::Str(s) => write!(f, "{s}"),
            PathName::Int(i) => write!(f, "[{i}]"),
        }
    }
}

impl From<&str> for PathName {
    fn from(v: &str) -> Self {
        PathName::Str(v.to_string())
    }
}
impl From<i64> for PathName {
    fn from(v: i64) -> Self {
        PathName::Int(v)
    }
}
