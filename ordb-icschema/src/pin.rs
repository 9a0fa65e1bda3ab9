//! `Symbol` and `Pin`: the symbol-space half of the schema, equivalent to a
//! cell's pin-out diagram.

use ordb_core::node::NodeTuple;
use ordb_core::schema::{FieldSpec, NodeKind, RefKind};
use ordb_core::value::AttrValue;
use ordb_core::{node_kind, Nid};
use ordb_entity::{Rect4R, Vec2R, D4};

/// Electrical direction of a [`Pin`], mirrored into storage as a short
/// string so it rides in an ordinary `AttrValue::Str` slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinType {
    In,
    Out,
    Inout,
}

impl PinType {
    fn as_str(self) -> &'static str {
        match self {
            PinType::In => "in",
            PinType::Out => "out",
            PinType::Inout => "inout",
        }
    }

    fn parse(s: &str) -> Option<PinType> {
        match s {
            "in" => Some(PinType::In),
            "out" => Some(PinType::Out),
            "inout" => Some(PinType::Inout),
            _ => None,
        }
    }
}

impl From<PinType> for AttrValue {
    fn from(v: PinType) -> Self {
        AttrValue::Str(v.as_str().to_string())
    }
}

impl TryFrom<&AttrValue> for PinType {
    type Error = ();
    fn try_from(v: &AttrValue) -> Result<Self, ()> {
        v.as_str().and_then(PinType::parse).ok_or(())
    }
}

pub const SYMBOL_OUTLINE: usize = 0;
pub const SYMBOL_CAPTION: usize = 1;
pub const SYMBOL_CELL: usize = 2;

/// A symbol's own node kind: a subgraph root with an outline bounding box,
/// a caption, and a backing cell reference, carrying `Pin` children under
/// its NPath namespace. `cell` is always `None` in this crate's scope — it
/// has no closed `AttrValue` representation here — but the field is kept
/// so a symbol's shape matches what the rest of the schema expects.
pub fn symbol_kind() -> NodeKind {
    node_kind!(
        "Symbol",
        fields: [
            FieldSpec::new("outline", RefKind::Plain).optional(),
            FieldSpec::new("caption", RefKind::Plain).optional(),
            FieldSpec::new("cell", RefKind::Plain).optional(),
        ],
        root,
        non_leaf
    )
}

pub const PIN_PINTYPE: usize = 0;
pub const PIN_POS: usize = 1;
pub const PIN_ALIGN: usize = 2;

/// A single-wire connection point exposed through a [`Symbol`].
pub fn pin_kind() -> NodeKind {
    node_kind!(
        "Pin",
        fields: [
            FieldSpec::new("pintype", RefKind::Plain).optional(),
            FieldSpec::new("pos", RefKind::Plain).optional(),
            FieldSpec::new("align", RefKind::Plain).optional(),
        ]
    )
}

/// Build an empty symbol's root node: `outline=None, caption=None, cell=None`.
pub fn new_symbol() -> NodeTuple {
    NodeTuple::new("Symbol", vec![AttrValue::None, AttrValue::None, AttrValue::None])
}

pub fn symbol_with_outline(outline: Rect4R, caption: &str) -> NodeTuple {
    NodeTuple::new(
        "Symbol",
        vec![
            AttrValue::Rect4R(outline),
            AttrValue::from(caption),
            AttrValue::None,
        ],
    )
}

pub struct PinBuilder {
    pintype: PinType,
    pos: Option<Vec2R>,
    align: D4,
}

impl PinBuilder {
    pub fn new(pintype: PinType) -> Self {
        PinBuilder {
            pintype,
            pos: None,
            align: D4::R0,
        }
    }

    pub fn pos(mut self, pos: Vec2R) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn align(mut self, align: D4) -> Self {
        self.align = align;
        self
    }

    pub fn build(self) -> NodeTuple {
        NodeTuple::new(
            "Pin",
            vec![
                AttrValue::from(self.pintype),
                self.pos.map_or(AttrValue::None, AttrValue::Vec2R),
                AttrValue::D4(self.align),
            ],
        )
    }
}

/// Read a `Pin` node's `pintype` field back out, panicking if the node
/// isn't a `Pin` or the stored string isn't a recognized [`PinType`].
pub fn pin_type_of(node: &NodeTuple) -> PinType {
    assert_eq!(node.kind, "Pin");
    PinType::try_from(&node.attrs[PIN_PINTYPE]).expect("Pin.pintype must be a valid PinType")
}

pub fn pin_pos_of(node: &NodeTuple) -> Option<Vec2R> {
    assert_eq!(node.kind, "Pin");
    match &node.attrs[PIN_POS] {
        AttrValue::Vec2R(v) => Some(*v),
        _ => None,
    }
}

/// Used by [`crate::schematic::net_pin_subgraph`] and similar resolvers
/// that need a plain nid rather than a cursor.
pub fn local_ref_target(node: &NodeTuple, field: usize) -> Option<Nid> {
    node.attrs[field].as_local_ref().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pintype_round_trips_through_attrvalue() {
        for pt in [PinType::In, PinType::Out, PinType::Inout] {
            let v = AttrValue::from(pt);
            assert_eq!(PinType::try_from(&v), Ok(pt));
        }
    }

    #[test]
    fn builder_defaults_to_r0_and_no_position() {
        let node = PinBuilder::new(PinType::Inout).build();
        assert_eq!(pin_pos_of(&node), None);
        assert_eq!(node.attrs[PIN_ALIGN], AttrValue::D4(D4::R0));
    }
}
