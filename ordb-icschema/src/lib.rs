//! `ordb-icschema`: the IC design domain schema built on `ordb-core` —
//! symbols and their pins, schematics and their nets/instances, and the
//! process layer stack. See `SPEC_FULL.md` at the workspace root.
//!
//! Each node kind lives in its own module paired with plain constructor
//! functions (or a small builder, for kinds with several optional fields)
//! rather than generated classes; field-index constants give the rest of
//! the crate typed access into a `NodeTuple`'s flat attribute vector.

pub mod layer;
pub mod pin;
pub mod schematic;

use once_cell::sync::Lazy;
use ordb_core::schema::Registry;

/// The process-wide registry of every node kind this crate declares,
/// built once and shared by every cell that uses this schema.
pub static REGISTRY: Lazy<Registry> = Lazy::new(build_registry);

fn build_registry() -> Registry {
    let mut reg = Registry::new();
    reg.register(pin::symbol_kind());
    reg.register(pin::pin_kind());
    reg.register(schematic::schematic_kind());
    reg.register(schematic::net_kind());
    reg.register(schematic::schemport_kind());
    reg.register(schematic::scheminstance_kind());
    reg.register(schematic::scheminstanceconn_kind());
    reg.register(layer::layerstack_kind());
    reg.register(layer::layer_kind());
    reg
}
