//! The name directory: a collaborator outside ORDB proper that assigns
//! human-readable, collision-free names to cells, subgraphs, and nodes for
//! consumers like netlisting, GDS export, and the UI. ORDB exposes enough
//! identity (cell/subgraph allocation identity, nid, path) for this crate
//! to build names; it implements no policy that ORDB itself needs.

use std::collections::HashMap;

use ordb_core::Nid;

/// Bidirectional name tables for cells, subgraphs, and nodes. Cell and
/// subgraph names share one flat namespace each; node names are namespaced
/// per subgraph, since the same nid-local name (`vdd`, `y`, ...) recurs in
/// every instance of a cell.
#[derive(Default)]
pub struct Directory {
    cell_names: HashMap<usize, String>,
    name_to_cell: HashMap<String, usize>,
    subgraph_names: HashMap<usize, String>,
    name_to_subgraph: HashMap<String, usize>,
    node_names: HashMap<usize, HashMap<Nid, String>>,
    name_to_node: HashMap<usize, HashMap<String, Nid>>,
}

/// Lowercase `raw`, replacing every run of characters outside
/// `[a-z0-9_]` with a single `_`, and ensure it doesn't start with a digit.
fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = false;
    for c in raw.chars() {
        let lc = c.to_ascii_lowercase();
        if lc.is_ascii_alphanumeric() || lc == '_' {
            out.push(lc);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    if out.chars().next().unwrap().is_ascii_digit() {
        out.insert(0, '_');
    }
    out
}

/// Append a numeric suffix to `base` until the result is absent from
/// `taken`, starting from the bare name and trying `_2`, `_3`, ... from
/// there.
fn unique_name(base: &str, taken: &HashMap<String, Nid>) -> String {
    unique_against(base, |candidate| taken.contains_key(candidate))
}

fn unique_against(base: &str, mut is_taken: impl FnMut(&str) -> bool) -> String {
    let base = sanitize(base);
    if !is_taken(&base) {
        return base;
    }
    let mut n = 2u64;
    loop {
        let candidate = format!("{base}_{n}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

impl Directory {
    pub fn new() -> Self {
        Directory::default()
    }

    pub fn name_cell(&mut self, cell_id: usize, hint: &str) -> String {
        if let Some(existing) = self.cell_names.get(&cell_id) {
            return existing.clone();
        }
        let taken = &self.name_to_cell;
        let name = unique_against(hint, |c| taken.contains_key(c));
        self.cell_names.insert(cell_id, name.clone());
        self.name_to_cell.insert(name.clone(), cell_id);
        name
    }

    pub fn cell_of_name(&self, name: &str) -> Option<usize> {
        self.name_to_cell.get(name).copied()
    }

    pub fn name_subgraph(&mut self, subgraph_id: usize, hint: &str) -> String {
        if let Some(existing) = self.subgraph_names.get(&subgraph_id) {
            return existing.clone();
        }
        let taken = &self.name_to_subgraph;
        let name = unique_against(hint, |c| taken.contains_key(c));
        self.subgraph_names.insert(subgraph_id, name.clone());
        self.name_to_subgraph.insert(name.clone(), subgraph_id);
        name
    }

    pub fn subgraph_of_name(&self, name: &str) -> Option<usize> {
        self.name_to_subgraph.get(name).copied()
    }

    /// Assign (or recall) a name for `nid` within `subgraph_id`'s own
    /// namespace.
    pub fn name_node(&mut self, subgraph_id: usize, nid: Nid, prefix: &str) -> String {
        if let Some(existing) = self.node_names.get(&subgraph_id).and_then(|m| m.get(&nid)) {
            return existing.clone();
        }
        let hint = if prefix.is_empty() {
            nid.to_string()
        } else {
            prefix.to_string()
        };
        let name = {
            let taken = self.name_to_node.entry(subgraph_id).or_default();
            unique_name(&hint, taken)
        };
        self.node_names
            .entry(subgraph_id)
            .or_default()
            .insert(nid, name.clone());
        self.name_to_node
            .entry(subgraph_id)
            .or_default()
            .insert(name.clone(), nid);
        name
    }

    /// The name already assigned to `(subgraph_id, nid)`, if any, without
    /// allocating a new one.
    pub fn existing_name_node(&self, subgraph_id: usize, nid: Nid) -> Option<&str> {
        self.node_names
            .get(&subgraph_id)
            .and_then(|m| m.get(&nid))
            .map(String::as_str)
    }

    pub fn node_of_name(&self, subgraph_id: usize, name: &str) -> Option<Nid> {
        self.name_to_node.get(&subgraph_id).and_then(|m| m.get(name)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordb_core::EntityRef;

    #[test]
    fn collisions_get_numeric_suffixes() {
        let mut dir = Directory::new();
        let a = dir.name_cell(1, "inverter");
        let b = dir.name_cell(2, "inverter");
        let c = dir.name_cell(3, "inverter");
        assert_eq!(a, "inverter");
        assert_eq!(b, "inverter_2");
        assert_eq!(c, "inverter_3");
    }

    #[test]
    fn repeated_lookup_is_stable() {
        let mut dir = Directory::new();
        let first = dir.name_cell(42, "buffer");
        let second = dir.name_cell(42, "anything else entirely");
        assert_eq!(first, second);
    }

    #[test]
    fn sanitizes_non_identifier_characters() {
        let mut dir = Directory::new();
        let name = dir.name_cell(1, "My Cell! 9000");
        assert_eq!(name, "my_cell_9000");
    }

    #[test]
    fn node_names_are_scoped_per_subgraph() {
        let mut dir = Directory::new();
        let n1 = dir.name_node(1, Nid::new(0), "vdd");
        let n2 = dir.name_node(2, Nid::new(0), "vdd");
        assert_eq!(n1, "vdd");
        assert_eq!(n2, "vdd");
        assert_eq!(dir.node_of_name(1, "vdd"), Some(Nid::new(0)));
        assert_eq!(dir.node_of_name(2, "vdd"), Some(Nid::new(0)));
    }

    #[test]
    fn node_names_collide_within_same_subgraph() {
        let mut dir = Directory::new();
        let a = dir.name_node(1, Nid::new(0), "pin");
        let b = dir.name_node(1, Nid::new(1), "pin");
        assert_eq!(a, "pin");
        assert_eq!(b, "pin_2");
    }
}
