use std::collections::{BTreeMap, BTreeSet};

/// Every distinct simple cycle in `graph`, as closed walks (the entry node is
/// repeated at the end). Cycles reachable through different rotations or
/// entry points are deduplicated by their node set.
///
/// A pure function over its inputs: all traversal state is local, so
/// independent graphs can be searched concurrently. Nodes already explored on
/// a finished branch are never re-expanded, bounding the work at O(V + E).
/// Returns an empty vector if and only if the graph is a DAG.
pub fn find_cycles<N>(graph: &BTreeMap<N, BTreeSet<N>>) -> Vec<Vec<N>>
where
    N: Clone + Ord,
{
    let mut visited = BTreeSet::new();
    let mut seen_sets = BTreeSet::new();
    let mut cycles = Vec::new();

    for node in graph.keys() {
        if !visited.contains(node) {
            let mut path = Vec::new();
            visit(node, graph, &mut visited, &mut path, &mut seen_sets, &mut cycles);
        }
    }

    cycles
}

fn visit<N>(
    node: &N,
    graph: &BTreeMap<N, BTreeSet<N>>,
    visited: &mut BTreeSet<N>,
    path: &mut Vec<N>,
    seen_sets: &mut BTreeSet<BTreeSet<N>>,
    cycles: &mut Vec<Vec<N>>,
) where
    N: Clone + Ord,
{
    if let Some(start) = path.iter().position(|n| n == node) {
        // Back edge: the sub-path from the node's first occurrence, closed by
        // repeating it.
        let mut cycle: Vec<N> = path[start..].to_vec();
        cycle.push(node.clone());
        let node_set: BTreeSet<N> = path[start..].iter().cloned().collect();
        if seen_sets.insert(node_set) {
            cycles.push(cycle);
        }
        return;
    }
    if visited.contains(node) {
        return;
    }

    path.push(node.clone());
    if let Some(targets) = graph.get(node) {
        for target in targets {
            visit(target, graph, visited, path, seen_sets, cycles);
        }
    }
    path.pop();
    visited.insert(node.clone());
}
