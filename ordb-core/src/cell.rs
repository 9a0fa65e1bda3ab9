//! Parametric cell interning and the lazily-built, memoised view cache.
//!
//! A cell class is a user-defined `(class, parameter-map)` pair; this
//! module provides the process-wide interning and the per-cell view cache
//! generically over the parameter type `P`. Concrete cell *classes* (one
//! intern table per class) are expected to declare their own `static`
//! table behind a `once_cell::sync::Lazy`, the way the rest of this
//! workspace keeps process-wide state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{OrdbError, OrdbResult};
use crate::schema::Registry;
use crate::subgraph::{FrozenSubgraph, MutableSubgraph};
use crate::Nid;

/// Bound satisfied by any parameter map usable as a [`Cell`] key: it must
/// be comparable and hashable so equal parameter maps intern to the same
/// object, per the structural-identity property.
pub trait CellParams: Clone + Eq + std::hash::Hash + 'static {}
impl<T: Clone + Eq + std::hash::Hash + 'static> CellParams for T {}

/// The result of a view generator: either a freshly-built mutable
/// subgraph (frozen on caching) or an already-frozen one.
pub enum GeneratedSubgraph {
    Mutable(MutableSubgraph),
    Frozen(FrozenSubgraph),
}

impl GeneratedSubgraph {
    fn into_frozen(self) -> FrozenSubgraph {
        match self {
            GeneratedSubgraph::Mutable(m) => m.freeze(),
            GeneratedSubgraph::Frozen(f) => f,
        }
    }
}

struct CellData<P> {
    params: P,
    views: RwLock<HashMap<&'static str, FrozenSubgraph>>,
}

/// An interned `(class, parameter-map)` pair. Two `Cell<P>`s built from
/// equal parameter maps are the same object (same `Arc` allocation) as
/// long as they came from the same [`intern`] table.
pub struct Cell<P>(Arc<CellData<P>>);

impl<P> Clone for Cell<P> {
    fn clone(&self) -> Self {
        Cell(self.0.clone())
    }
}

impl<P> PartialEq for Cell<P> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl<P> Eq for Cell<P> {}

impl<P> std::fmt::Debug for Cell<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Cell").field(&self.identity()).finish()
    }
}

impl<P> Cell<P> {
    pub fn params(&self) -> &P {
        &self.0.params
    }

    /// A stable identity for this cell's underlying allocation, suitable
    /// as a naming-directory key; equal for any two `Cell<P>` handles
    /// returned by the same [`intern`] call.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Return the cached frozen subgraph for `name`, generating it via
    /// `generate` on first access. A generator that returns `Err` leaves no
    /// cache entry — a subsequent access retries.
    pub fn view(
        &self,
        registry: &Registry,
        name: &'static str,
        generate: impl FnOnce(&Cell<P>) -> OrdbResult<GeneratedSubgraph>,
    ) -> OrdbResult<FrozenSubgraph> {
        if let Some(cached) = self.0.views.read().unwrap().get(name) {
            return Ok(cached.clone());
        }
        let frozen = generate(self)?.into_frozen();
        validate_root(&frozen, registry)?;
        let mut views = self.0.views.write().unwrap();
        Ok(views.entry(name).or_insert(frozen).clone())
    }

    /// Number of views built so far, useful for tests asserting a
    /// generator was invoked exactly once.
    pub fn cached_view_count(&self) -> usize {
        self.0.views.read().unwrap().len()
    }
}

fn validate_root(frozen: &FrozenSubgraph, registry: &Registry) -> OrdbResult<()> {
    let root = frozen
        .data()
        .nodes
        .get(&Nid::ROOT)
        .ok_or_else(|| OrdbError::ModelViolation("generated subgraph has no root node".into()))?;
    match registry.get(root.kind) {
        Some(k) if k.is_subgraph_root => Ok(()),
        _ => Err(OrdbError::ModelViolation(format!(
            "{} is not a subgraph-root kind",
            root.kind
        ))),
    }
}

/// Intern `params` against `table`, the class's process-wide cell table.
/// Two calls with equal `params` return the same `Cell`.
pub fn intern<P: CellParams>(table: &'static Mutex<HashMap<P, Cell<P>>>, params: P) -> Cell<P> {
    let mut guard = table.lock().unwrap();
    guard
        .entry(params.clone())
        .or_insert_with(|| {
            Cell(Arc::new(CellData {
                params,
                views: RwLock::new(HashMap::new()),
            }))
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeTuple;
    use crate::schema::NodeKind;
    use crate::{node_kind, updater::Inserter};
    use once_cell::sync::Lazy;
    use std::cell::Cell as StdCell;
    use std::rc::Rc;

    #[derive(Clone, PartialEq, Eq, Hash)]
    struct Params {
        width: i64,
    }

    static TABLE: Lazy<Mutex<HashMap<Params, Cell<Params>>>> =
        Lazy::new(|| Mutex::new(HashMap::new()));

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(node_kind!("Root", fields: [], root));
        reg
    }

    #[test]
    fn equal_params_intern_to_the_same_cell() {
        let a = intern(&TABLE, Params { width: 1 });
        let b = intern(&TABLE, Params { width: 1 });
        assert_eq!(a, b);
    }

    #[test]
    fn view_is_cached_and_generator_runs_once() {
        let reg = registry();
        let cell = intern(&TABLE, Params { width: 2 });
        let calls = Rc::new(StdCell::new(0));
        let make = |_: &Cell<Params>| {
            calls.set(calls.get() + 1);
            let sg = MutableSubgraph::new_empty();
            let mut updater = crate::updater::Updater::open(&sg, &reg);
            NodeTuple::new("Root", vec![]).insert_into(&mut updater)?;
            updater.commit()?;
            Ok(GeneratedSubgraph::Mutable(sg))
        };
        let v1 = cell.view(&reg, "only", make).unwrap();
        let v2 = cell.view(&reg, "only", make).unwrap();
        assert_eq!(v1, v2);
        assert_eq!(calls.get(), 1);
    }
}
