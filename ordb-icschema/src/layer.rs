//! `LayerStack` and `Layer`: the process technology's drawing layers,
//! shared across every cell built against it.

use ordb_core::node::NodeTuple;
use ordb_core::schema::{FieldSpec, NodeKind, RefKind};
use ordb_core::value::AttrValue;
use ordb_core::node_kind;
use ordb_entity::Rational;

pub const LAYERSTACK_UNIT: usize = 0;

/// The root node of a layer stack: the physical length one database unit
/// represents.
pub fn layerstack_kind() -> NodeKind {
    node_kind!(
        "LayerStack",
        fields: [FieldSpec::new("unit", RefKind::Plain).optional()],
        root,
        non_leaf
    )
}

pub const LAYER_GDS_LAYER_TEXT: usize = 0;
pub const LAYER_GDS_LAYER_SHAPES: usize = 1;
pub const LAYER_STYLE_FILL: usize = 2;
pub const LAYER_STYLE_STROKE: usize = 3;
pub const LAYER_IS_PINLAYER: usize = 4;

/// One named drawing layer: a pair of GDS layer numbers (one for text
/// labels, one for shapes) plus how the UI should render it.
pub fn layer_kind() -> NodeKind {
    node_kind!(
        "Layer",
        fields: [
            FieldSpec::new("gds_layer_text", RefKind::Plain).unique(),
            FieldSpec::new("gds_layer_shapes", RefKind::Plain).unique(),
            FieldSpec::new("style_fill", RefKind::Plain).optional(),
            FieldSpec::new("style_stroke", RefKind::Plain).optional(),
            FieldSpec::new("is_pinlayer", RefKind::Plain).optional().default_value(AttrValue::Bool(false)),
        ],
        non_leaf
    )
}

pub fn new_layerstack(unit: Option<Rational>) -> NodeTuple {
    NodeTuple::new("LayerStack", vec![unit.map_or(AttrValue::None, AttrValue::Rational)])
}

pub struct LayerBuilder {
    gds_layer_text: i64,
    gds_layer_shapes: i64,
    style_fill: Option<String>,
    style_stroke: Option<String>,
    is_pinlayer: bool,
}

impl LayerBuilder {
    pub fn new(gds_layer_text: i64, gds_layer_shapes: i64) -> Self {
        LayerBuilder {
            gds_layer_text,
            gds_layer_shapes,
            style_fill: None,
            style_stroke: None,
            is_pinlayer: false,
        }
    }

    pub fn style_fill(mut self, color: &str) -> Self {
        self.style_fill = Some(color.to_string());
        self
    }

    pub fn style_stroke(mut self, color: &str) -> Self {
        self.style_stroke = Some(color.to_string());
        self
    }

    pub fn pinlayer(mut self) -> Self {
        self.is_pinlayer = true;
        self
    }

    pub fn build(self) -> NodeTuple {
        NodeTuple::new(
            "Layer",
            vec![
                AttrValue::Int(self.gds_layer_text),
                AttrValue::Int(self.gds_layer_shapes),
                self.style_fill.map_or(AttrValue::None, AttrValue::from),
                self.style_stroke.map_or(AttrValue::None, AttrValue::from),
                AttrValue::Bool(self.is_pinlayer),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_not_a_pinlayer() {
        let node = LayerBuilder::new(1, 2).build();
        assert_eq!(node.attrs[LAYER_IS_PINLAYER], AttrValue::Bool(false));
        assert_eq!(node.attrs[LAYER_GDS_LAYER_TEXT], AttrValue::Int(1));
    }
}
