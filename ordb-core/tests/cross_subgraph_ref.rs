//! A node's `ExternalRef` attribute can carry a nid meaningful only in
//! some other subgraph. ORDB itself never resolves these (unlike
//! `LocalRef`, which is checked at commit against the subgraph it lives
//! in); resolution is always up to whoever declared the field. This test
//! builds a minimal ad hoc schema exercising that pattern end to end:
//! two independent frozen subgraphs, each with one named child, embedded
//! by value into a third subgraph's nodes alongside an `ExternalRef` nid
//! into them.

use ordb_core::cursor::Cursor;
use ordb_core::node::NodeTuple;
use ordb_core::schema::{FieldSpec, NodeKind, RefKind, Registry};
use ordb_core::subgraph::{FrozenSubgraph, MutableSubgraph};
use ordb_core::value::AttrValue;
use ordb_core::{node_kind, Nid};

fn head_kind() -> NodeKind {
    node_kind!("MyHead", fields: [], root, non_leaf)
}

fn leaf_kind() -> NodeKind {
    node_kind!(
        "MyLeaf",
        fields: [FieldSpec::new("tag", RefKind::Plain)]
    )
}

fn edge_kind() -> NodeKind {
    node_kind!(
        "Edge",
        fields: [
            FieldSpec::new("subg", RefKind::SubgraphRef),
            FieldSpec::new("eref", RefKind::ExternalRef),
        ]
    )
}

fn registry() -> Registry {
    let mut reg = Registry::new();
    reg.register(head_kind());
    reg.register(leaf_kind());
    reg.register(edge_kind());
    reg.register(node_kind!("EdgeHead", fields: [], root, non_leaf));
    reg
}

fn build_head_with_n1(reg: &Registry, tag: &str) -> (MutableSubgraph, Nid) {
    let sg = MutableSubgraph::new_empty();
    sg.add(reg, NodeTuple::new("MyHead", vec![])).unwrap();
    let root = Cursor::root(&sg);
    let n1 = root
        .assign_child(reg, "n1", NodeTuple::new("MyLeaf", vec![AttrValue::from(tag)]))
        .unwrap();
    let nid = n1.nid().unwrap();
    (sg, nid)
}

#[test]
fn external_ref_resolves_into_the_subgraph_it_was_built_against() {
    let reg = registry();

    let (s1, s1_n1_nid) = build_head_with_n1(&reg, "first");
    let (s2, s2_n1_nid) = build_head_with_n1(&reg, "second");
    let f1: FrozenSubgraph = s1.freeze();
    let f2: FrozenSubgraph = s2.freeze();

    let s3 = MutableSubgraph::new_empty();
    s3.add(&reg, NodeTuple::new("EdgeHead", vec![])).unwrap();
    let root3 = Cursor::root(&s3);
    let e1 = root3
        .assign_child(
            &reg,
            "e1",
            NodeTuple::new(
                "Edge",
                vec![
                    AttrValue::SubgraphRef(f1.clone()),
                    AttrValue::ExternalRef(Some(s1_n1_nid)),
                ],
            ),
        )
        .unwrap();
    let e2 = root3
        .assign_child(
            &reg,
            "e2",
            NodeTuple::new(
                "Edge",
                vec![
                    AttrValue::SubgraphRef(f2.clone()),
                    AttrValue::ExternalRef(Some(s2_n1_nid)),
                ],
            ),
        )
        .unwrap();

    let e1_subg = e1.attr(&reg, "subg").unwrap().as_subgraph_ref().unwrap().clone();
    let e1_eref = e1.attr(&reg, "eref").unwrap().as_external_ref().unwrap().unwrap();
    let resolved1 = Cursor::at(&e1_subg, e1_eref);
    assert_eq!(resolved1.nid(), Some(s1_n1_nid));
    assert_eq!(
        resolved1.attr(&reg, "subg").is_err(),
        true,
        "resolved node is a MyLeaf, not an Edge"
    );

    let e2_subg = e2.attr(&reg, "subg").unwrap().as_subgraph_ref().unwrap().clone();
    let e2_eref = e2.attr(&reg, "eref").unwrap().as_external_ref().unwrap().unwrap();
    let resolved2 = Cursor::at(&e2_subg, e2_eref);
    assert_eq!(resolved2.nid(), Some(s2_n1_nid));

    assert_eq!(resolved1.attr(&reg, "tag").unwrap(), AttrValue::from("first"));
    assert_eq!(resolved2.attr(&reg, "tag").unwrap(), AttrValue::from("second"));
    assert_ne!(e1_subg, e2_subg, "each edge resolves into its own, differently-tagged subgraph");
    assert_eq!(e1_subg, f1);
    assert_eq!(e2_subg, f2);
}
