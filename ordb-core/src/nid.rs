//! Dense per-subgraph node identifiers.

use ordb_entity::entity_impl;

/// A node id, dense and unique within one subgraph. `Nid::new(0)` is always
/// the subgraph root.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nid(u32);

entity_impl!(Nid, "n");

impl Nid {
    pub const ROOT: Nid = Nid(0);

    pub fn as_u32(self) -> u32 {
        self.0
    }
}
