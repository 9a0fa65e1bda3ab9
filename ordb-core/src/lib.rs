//! `ordb-core`: the schema-aware persistent graph database at the heart of
//! ORDeC. See `SPEC_FULL.md` at the workspace root for the full
//! specification; this crate implements components B through F (the
//! primitives in component A live in `ordb-entity`).
//!
//! Dependency order within the crate (leaves first): [`value`] and
//! [`node`] define what a node tuple is; [`schema`] declares node kinds;
//! [`index`] and [`subgraph`] hold the persistent store; [`updater`]
//! layers transactions on top; [`cursor`] and [`query`] provide read/write
//! navigation; [`cell`] provides the parametric cache that sits above all
//! of it.

pub mod cell;
pub mod cursor;
pub mod dump;
pub mod error;
pub mod index;
mod nid;
pub mod node;
pub mod query;
pub mod schema;
pub mod subgraph;
pub mod updater;
pub mod value;

pub use error::{OrdbError, OrdbResult};
pub use nid::Nid;
pub use ordb_entity::EntityRef;
