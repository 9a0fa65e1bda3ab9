//! `Schematic`, `Net`, `SchemPort`, `SchemInstance`, `SchemInstanceConn`:
//! the netlist-space half of the schema. A schematic's `symbol` field
//! embeds the pin-out it exposes to callers; `SchemInstance.symbol` embeds
//! the symbol of whatever it instantiates, so browsing a design never
//! needs to leave the frozen subgraph it was built from.

use ordb_core::cursor::Cursor;
use ordb_core::node::NodeTuple;
use ordb_core::schema::{FieldSpec, NodeKind, RefKind};
use ordb_core::subgraph::{FrozenSubgraph, SubgraphLike};
use ordb_core::value::AttrValue;
use ordb_core::{node_kind, Nid};
use ordb_entity::{Vec2R, D4};

pub const SCHEMATIC_SYMBOL: usize = 0;
pub const SCHEMATIC_OUTLINE: usize = 1;
pub const SCHEMATIC_DEFAULT_SUPPLY: usize = 2;
pub const SCHEMATIC_DEFAULT_GROUND: usize = 3;

/// A schematic's root node: the symbol it implements, plus the default
/// supply/ground nets new instances connect unlabeled pins to.
pub fn schematic_kind() -> NodeKind {
    node_kind!(
        "Schematic",
        fields: [
            FieldSpec::new("symbol", RefKind::SubgraphRef).optional(),
            FieldSpec::new("outline", RefKind::Plain).optional(),
            FieldSpec::new("default_supply", RefKind::LocalRef).optional(),
            FieldSpec::new("default_ground", RefKind::LocalRef).optional(),
        ],
        root,
        non_leaf
    )
}

pub const NET_PIN: usize = 0;
pub const NET_ROUTE: usize = 1;

/// A node of the netlist: one electrical net, optionally tied to a `Pin`
/// in the schematic's own symbol (an `ExternalRef`, since that pin lives
/// in a different, embedded subgraph).
pub fn net_kind() -> NodeKind {
    node_kind!(
        "Net",
        fields: [
            FieldSpec::new("pin", RefKind::ExternalRef).optional(),
            FieldSpec::new("route", RefKind::Plain).optional().default_value(AttrValue::Bool(true)),
        ]
    )
}

pub const SCHEMPORT_REF: usize = 0;
pub const SCHEMPORT_POS: usize = 1;
pub const SCHEMPORT_ALIGN: usize = 2;

/// The schematic-space drawing of a `Net` exposed through the symbol:
/// where its pin glyph sits on the canvas.
pub fn schemport_kind() -> NodeKind {
    node_kind!(
        "SchemPort",
        fields: [
            FieldSpec::new("ref", RefKind::LocalRef),
            FieldSpec::new("pos", RefKind::Plain).optional(),
            FieldSpec::new("align", RefKind::Plain).optional().default_value(AttrValue::D4(D4::R0)),
        ]
    )
}

pub const SCHEMINSTANCE_POS: usize = 0;
pub const SCHEMINSTANCE_ORIENTATION: usize = 1;
pub const SCHEMINSTANCE_SYMBOL: usize = 2;

/// One placed instance of another cell's symbol.
pub fn scheminstance_kind() -> NodeKind {
    node_kind!(
        "SchemInstance",
        fields: [
            FieldSpec::new("pos", RefKind::Plain).optional(),
            FieldSpec::new("orientation", RefKind::Plain).optional().default_value(AttrValue::D4(D4::R0)),
            FieldSpec::new("symbol", RefKind::SubgraphRef),
        ]
    )
}

pub const SCHEMINSTANCECONN_REF: usize = 0;
pub const SCHEMINSTANCECONN_HERE: usize = 1;
pub const SCHEMINSTANCECONN_THERE: usize = 2;

/// One wire of an instance's connection: which net on this side (`here`)
/// attaches to which pin of the instantiated symbol (`there`, an
/// `ExternalRef` into `ref`'s embedded `symbol` subgraph).
pub fn scheminstanceconn_kind() -> NodeKind {
    node_kind!(
        "SchemInstanceConn",
        fields: [
            FieldSpec::new("ref", RefKind::LocalRef),
            FieldSpec::new("here", RefKind::LocalRef),
            FieldSpec::new("there", RefKind::ExternalRef),
        ]
    )
}

pub fn new_schematic(symbol: Option<FrozenSubgraph>) -> NodeTuple {
    NodeTuple::new(
        "Schematic",
        vec![
            symbol.map_or(AttrValue::None, AttrValue::SubgraphRef),
            AttrValue::None,
            AttrValue::LocalRef(None),
            AttrValue::LocalRef(None),
        ],
    )
}

pub fn new_net(pin: Option<Nid>) -> NodeTuple {
    NodeTuple::new(
        "Net",
        vec![
            AttrValue::ExternalRef(pin),
            AttrValue::Bool(true),
        ],
    )
}

pub fn new_schemport(net: Nid, pos: Option<Vec2R>, align: D4) -> NodeTuple {
    NodeTuple::new(
        "SchemPort",
        vec![
            AttrValue::LocalRef(Some(net)),
            pos.map_or(AttrValue::None, AttrValue::Vec2R),
            AttrValue::D4(align),
        ],
    )
}

pub fn new_scheminstance(symbol: FrozenSubgraph, pos: Option<Vec2R>, orientation: D4) -> NodeTuple {
    NodeTuple::new(
        "SchemInstance",
        vec![
            pos.map_or(AttrValue::None, AttrValue::Vec2R),
            AttrValue::D4(orientation),
            AttrValue::SubgraphRef(symbol),
        ],
    )
}

pub fn new_scheminstanceconn(instance: Nid, here: Nid, there: Nid) -> NodeTuple {
    NodeTuple::new(
        "SchemInstanceConn",
        vec![
            AttrValue::LocalRef(Some(instance)),
            AttrValue::LocalRef(Some(here)),
            AttrValue::ExternalRef(Some(there)),
        ],
    )
}

/// A schematic's own `symbol` field, if it has one, as an embedded
/// subgraph a `Net.pin` `ExternalRef` resolves into.
pub fn schematic_symbol_of<S: SubgraphLike>(
    schematic: &Cursor<'_, S>,
    registry: &ordb_core::schema::Registry,
) -> Option<FrozenSubgraph> {
    schematic
        .attr(registry, "symbol")
        .ok()
        .and_then(|v| v.as_subgraph_ref().cloned())
}

/// Resolve an `ExternalRef` nid (`Net.pin` or `SchemInstanceConn.there`)
/// to a cursor at the target node inside its owning embedded subgraph.
/// `ExternalRef` is, by design, unchecked by ORDB itself; this is the
/// schema-supplied resolver spec.md calls for.
pub fn resolve_external_ref(embedded: &FrozenSubgraph, target: Nid) -> Cursor<'_, FrozenSubgraph> {
    Cursor::at(embedded, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_defaults_to_routed_with_no_pin() {
        let node = new_net(None);
        assert_eq!(node.attrs[NET_PIN], AttrValue::ExternalRef(None));
        assert_eq!(node.attrs[NET_ROUTE], AttrValue::Bool(true));
    }
}
