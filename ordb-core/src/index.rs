//! The per-subgraph secondary index store.
//!
//! An `Index` is a persistent map from [`IndexKey`] to either an
//! insertion-ordered sequence of nids (used wherever enumeration order
//! matters: the per-kind index that backs `all(Kind)`, and NPath's
//! `(parent, name)`/`ref` lookups, both of which are declared unique and so
//! only ever hold zero or one element) or an unordered set (used for the
//! local-ref back-index, whose only job is answering "does anything still
//! point at this nid", per spec note: "ordered sequences... or sets (for
//! local-ref back-indices whose values have no useful order)".

use crate::value::{IndexKeyValue, PathName};
use crate::Nid;

/// What a secondary index is keyed on.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// All nids of a given node kind, in insertion order.
    Kind(&'static str),
    /// A unique index declared on `(kind, field)`.
    Unique(&'static str, &'static str, IndexKeyValue),
    /// NPath `(parent, name) -> nid`.
    PathChild(Option<Nid>, PathName),
    /// NPath `ref -> nid`.
    PathRef(Nid),
    /// Local-ref back-index: everyone who points at this nid.
    LocalRefTarget(Nid),
}

/// The value side of an index entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexValues {
    Ordered(im::Vector<Nid>),
    Set(im::OrdSet<Nid>),
}

impl IndexValues {
    pub fn len(&self) -> usize {
        match self {
            IndexValues::Ordered(v) => v.len(),
            IndexValues::Set(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, nid: Nid) -> bool {
        match self {
            IndexValues::Ordered(v) => v.iter().any(|n| *n == nid),
            IndexValues::Set(s) => s.contains(&nid),
        }
    }

    pub fn iter_nids(&self) -> Box<dyn Iterator<Item = Nid> + '_> {
        match self {
            IndexValues::Ordered(v) => Box::new(v.iter().copied()),
            IndexValues::Set(s) => Box::new(s.iter().copied()),
        }
    }
}

pub type Index = im::OrdMap<IndexKey, IndexValues>;

/// Append `nid` to an ordered index bucket, creating it if absent.
pub fn insert_ordered(index: &Index, key: IndexKey, nid: Nid) -> Index {
    let mut index = index.clone();
    index
        .entry(key)
        .and_modify(|v| {
            if let IndexValues::Ordered(vec) = v {
                vec.push_back(nid);
            }
        })
        .or_insert_with(|| IndexValues::Ordered(im::vector![nid]));
    index
}

/// Insert `nid` into an unordered index bucket, creating it if absent.
pub fn insert_set(index: &Index, key: IndexKey, nid: Nid) -> Index {
    let mut index = index.clone();
    index
        .entry(key)
        .and_modify(|v| {
            if let IndexValues::Set(set) = v {
                set.insert(nid);
            }
        })
        .or_insert_with(|| IndexValues::Set(im::ordset![nid]));
    index
}

/// Remove `nid` from whichever bucket `key` names, dropping the bucket
/// entirely once empty so that stale empty entries never accumulate.
pub fn remove(index: &Index, key: &IndexKey, nid: Nid) -> Index {
    let mut index = index.clone();
    let empty_after = match index.get_mut(key) {
        Some(IndexValues::Ordered(vec)) => {
            if let Some(pos) = vec.iter().position(|n| *n == nid) {
                vec.remove(pos);
            }
            vec.is_empty()
        }
        Some(IndexValues::Set(set)) => {
            set.remove(&nid);
            set.is_empty()
        }
        None => false,
    };
    if empty_after {
        index.remove(key);
    }
    index
}

pub fn get<'a>(index: &'a Index, key: &IndexKey) -> Option<&'a IndexValues> {
    index.get(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordb_entity::EntityRef;

    #[test]
    fn ordered_bucket_preserves_insertion_order() {
        let idx = Index::new();
        let idx = insert_ordered(&idx, IndexKey::Kind("Pin"), Nid::new(3));
        let idx = insert_ordered(&idx, IndexKey::Kind("Pin"), Nid::new(1));
        let bucket = get(&idx, &IndexKey::Kind("Pin")).unwrap();
        let nids: Vec<_> = bucket.iter_nids().collect();
        assert_eq!(nids, vec![Nid::new(3), Nid::new(1)]);
    }

    #[test]
    fn removing_last_entry_drops_bucket() {
        let idx = Index::new();
        let idx = insert_set(&idx, IndexKey::LocalRefTarget(Nid::new(0)), Nid::new(1));
        let idx = remove(&idx, &IndexKey::LocalRefTarget(Nid::new(0)), Nid::new(1));
        assert!(get(&idx, &IndexKey::LocalRefTarget(Nid::new(0))).is_none());
    }
}
