//! Integration tests for the symbol-space scenarios: an empty symbol, and
//! an inverter symbol with four named pins.

use ordb_core::cursor::Cursor;
use ordb_core::dump::dump;
use ordb_core::node::NodeTuple;
use ordb_core::query;
use ordb_core::subgraph::MutableSubgraph;
use ordb_core::updater::Updater;
use ordb_core::value::AttrValue;
use ordb_core::Nid;
use ordb_entity::{Rect4R, Vec2R, D4};

use ordb_icschema::pin::{new_symbol, pin_type_of, symbol_with_outline, PinBuilder, PinType};
use ordb_icschema::REGISTRY;

/// An empty symbol: a bare subgraph root with no children.
#[test]
fn empty_symbol_dumps_to_a_single_entry() {
    let sg = MutableSubgraph::new_empty();
    sg.add(&REGISTRY, new_symbol()).unwrap();

    let data = sg.data();
    assert_eq!(data.nodes.len(), 1);
    assert_eq!(data.next_nid, 1);
    let text = dump(&data);
    assert_eq!(text, "MutableSubgraph.load({\n  0: Symbol(None, None, None),\n})");
}

/// An inverter symbol: four pins, each with its own NPath entry. Built
/// through direct `Updater` calls (rather than `Cursor::assign_child`,
/// which interleaves a pin's own nid with its NPath nid on every call) so
/// that all four `Pin` nids land before any `NPath` nid, matching the
/// grouped dump order this scenario expects.
#[test]
fn inverter_symbol_groups_pins_before_npaths() {
    let sg = MutableSubgraph::new_empty();
    let mut u = Updater::open(&sg, &REGISTRY);
    let symbol_nid = u.nid_generate().unwrap();
    u.add_single(
        symbol_with_outline(Rect4R::new(0.into(), 0.into(), 4.into(), 4.into()), "inv"),
        symbol_nid,
    )
    .unwrap();

    let pins = [
        ("vdd", PinType::In, Vec2R::new(2.into(), 4.into()), D4::R90),
        ("vss", PinType::In, Vec2R::new(2.into(), 0.into()), D4::R270),
        ("a", PinType::In, Vec2R::new(0.into(), 2.into()), D4::R180),
        ("y", PinType::Out, Vec2R::new(4.into(), 2.into()), D4::R0),
    ];
    let mut pin_nids = Vec::new();
    for &(_, pintype, pos, align) in pins.iter() {
        let nid = u.nid_generate().unwrap();
        u.add_single(PinBuilder::new(pintype).pos(pos).align(align).build(), nid)
            .unwrap();
        pin_nids.push(nid);
    }
    for ((name, _, _, _), nid) in pins.iter().zip(pin_nids.iter()) {
        let npath_nid = u.nid_generate().unwrap();
        u.add_single(
            NodeTuple::new(
                "NPath",
                vec![
                    AttrValue::None,
                    AttrValue::from(*name),
                    AttrValue::LocalRef(Some(*nid)),
                ],
            ),
            npath_nid,
        )
        .unwrap();
    }
    u.commit().unwrap();

    let data = sg.data();
    let nids_in_order: Vec<Nid> = data.nodes.keys().cloned().collect();
    assert_eq!(nids_in_order[0], symbol_nid);
    for (i, pin_nid) in pin_nids.iter().enumerate() {
        assert_eq!(nids_in_order[1 + i], *pin_nid);
    }
    for nid in &nids_in_order[5..9] {
        assert_eq!(data.nodes.get(nid).unwrap().kind, "NPath");
    }

    let all_pins = query::all(&sg, "Pin");
    assert_eq!(all_pins, pin_nids);
    assert_eq!(
        pin_type_of(data.nodes.get(&pin_nids[3]).unwrap()),
        PinType::Out
    );

    let root = Cursor::root(&sg);
    let y = root.child("y").unwrap();
    assert_eq!(y.nid(), Some(pin_nids[3]));
}
