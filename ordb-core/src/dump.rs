//! The stable textual dump used by tests and for debugging.

use crate::error::OrdbResult;
use crate::node::NodeTuple;
use crate::schema::Registry;
use crate::subgraph::{MutableSubgraph, SubgraphData};
use crate::updater::Updater;
use crate::value::AttrValue;
use crate::Nid;

fn format_attrs(attrs: &[AttrValue]) -> String {
    attrs
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Canonical dump, ascending by nid: `MutableSubgraph.load({ 0: Root(...), ... })`.
pub fn dump(data: &SubgraphData) -> String {
    let mut out = String::from("MutableSubgraph.load({\n");
    for (nid, node) in data.nodes.iter() {
        out.push_str(&format!(
            "  {}: {}({}),\n",
            nid.as_u32(),
            node.kind,
            format_attrs(&node.attrs)
        ));
    }
    out.push_str("})");
    out
}

/// Pretty form: one table per node kind, subgraph-root kinds first, then
/// alphabetical by kind name, rows in ascending nid order within a table.
pub fn tables(data: &SubgraphData, registry: &Registry) -> String {
    let mut kinds: Vec<&'static str> = data
        .nodes
        .values()
        .map(|n| n.kind)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    kinds.sort_by_key(|k| {
        let is_root = registry.get(k).map(|nk| nk.is_subgraph_root).unwrap_or(false);
        (!is_root, *k)
    });

    let mut out = String::new();
    for kind in kinds {
        out.push_str(&format!("== {kind} ==\n"));
        let mut rows: Vec<(Nid, &NodeTuple)> = data
            .nodes
            .iter()
            .filter(|(_, n)| n.kind == kind)
            .map(|(nid, n)| (*nid, n))
            .collect();
        rows.sort_by_key(|(nid, _)| *nid);
        for (nid, node) in rows {
            out.push_str(&format!("  {}: {}\n", nid.as_u32(), format_attrs(&node.attrs)));
        }
    }
    out
}

/// The `(nid, node)` pairs backing a dump, in ascending nid order.
pub fn node_dict(data: &SubgraphData) -> Vec<(Nid, NodeTuple)> {
    data.nodes.iter().map(|(n, t)| (*n, t.clone())).collect()
}

/// Rebuild a mutable subgraph from a `node_dict()`-shaped entry list,
/// re-running the same constraint checks an ordinary transaction would.
/// Entries need not be sorted or contiguous, but every nid referenced by a
/// local-ref must appear.
pub fn load(registry: &Registry, entries: Vec<(Nid, NodeTuple)>) -> OrdbResult<MutableSubgraph> {
    let sg = MutableSubgraph::new_empty();
    let max_nid = entries.iter().map(|(n, _)| n.as_u32()).max();
    let mut updater = Updater::open(&sg, registry);
    if let Some(max_nid) = max_nid {
        for _ in 0..=max_nid {
            updater.nid_generate()?;
        }
    }
    for (nid, node) in entries {
        updater.add_single(node, nid)?;
    }
    updater.commit()?;
    Ok(sg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use crate::subgraph::matches;
    use crate::{node_kind, schema::RefKind};

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(node_kind!("Root", fields: [], root));
        reg.register(node_kind!(
            "Leaf",
            fields: [FieldSpec::new("value", RefKind::Plain)]
        ));
        reg
    }

    #[test]
    fn dump_is_ascending_by_nid() {
        let reg = registry();
        let sg = MutableSubgraph::new_empty();
        sg.add(&reg, NodeTuple::new("Root", vec![])).unwrap();
        sg.add(&reg, NodeTuple::new("Leaf", vec![AttrValue::Int(1)])).unwrap();
        let text = dump(&sg.data());
        let pos_root = text.find("0: Root").unwrap();
        let pos_leaf = text.find("1: Leaf").unwrap();
        assert!(pos_root < pos_leaf);
    }

    #[test]
    fn round_trip_through_node_dict_matches_structurally() {
        let reg = registry();
        let sg = MutableSubgraph::new_empty();
        sg.add(&reg, NodeTuple::new("Root", vec![])).unwrap();
        sg.add(&reg, NodeTuple::new("Leaf", vec![AttrValue::Int(7)])).unwrap();
        let reloaded = load(&reg, node_dict(&sg.data())).unwrap();
        assert!(matches(&sg.data(), &reloaded.data()));
    }
}
