use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::fmt;

use crate::graph::cycles::find_cycles;
use crate::scenario::Scenario;
use crate::types::{Link, OperationRef, StatusCode};

/// Operation-level dependency map derived from all parsed links.
///
/// An edge A -> B means a link declared under operation A targets operation B,
/// i.e. B's request can be driven by A's response. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    edges: BTreeMap<OperationRef, BTreeSet<OperationRef>>,
}

impl DependencyGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group `by_operation -> set<for_operation>` over all links and reject
    /// cyclic input. Links without a resolved target reference (identified
    /// purely by `operationId`) contribute no edge.
    pub fn from_links(links: &[Link]) -> Result<Self, CycleError> {
        let mut edges: BTreeMap<OperationRef, BTreeSet<OperationRef>> = BTreeMap::new();
        for link in links {
            let Some(target) = &link.for_operation else {
                continue;
            };
            edges
                .entry(link.by_operation.clone())
                .or_default()
                .insert(target.clone());
        }

        let cycles = find_cycles(&edges);
        if !cycles.is_empty() {
            return Err(CycleError { cycles });
        }
        Ok(Self { edges })
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &BTreeMap<OperationRef, BTreeSet<OperationRef>> {
        &self.edges
    }

    /// A deterministic topological order of `scenarios`, returned as indices
    /// into the input slice.
    ///
    /// Edges are first collapsed to operation granularity (the response
    /// status that produced a dependency is intentionally ignored), scenarios
    /// are grouped by the same operation key, and every collapsed edge fans
    /// out to all concrete scenario pairs of the two groups. Kahn's algorithm
    /// then drains a ready-queue ordered by (operation key, status, input
    /// position), so identical input always yields an identical order.
    pub fn order_indices<S: Scenario>(&self, scenarios: &[S]) -> Result<Vec<usize>, OrderError> {
        let mut operation_edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (from, targets) in &self.edges {
            let entry = operation_edges.entry(from.operation_key()).or_default();
            for to in targets {
                entry.insert(to.operation_key());
            }
        }

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, scenario) in scenarios.iter().enumerate() {
            groups.entry(scenario.operation_key()).or_default().push(index);
        }

        // Cartesian expansion of each operation-level edge into scenario pairs.
        let mut successors: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for (from_key, to_keys) in &operation_edges {
            let Some(from_group) = groups.get(from_key) else {
                continue;
            };
            for to_key in to_keys {
                let Some(to_group) = groups.get(to_key) else {
                    continue;
                };
                for &from_index in from_group {
                    for &to_index in to_group {
                        successors.entry(from_index).or_default().insert(to_index);
                    }
                }
            }
        }

        let mut in_degree = vec![0usize; scenarios.len()];
        for targets in successors.values() {
            for &target in targets {
                in_degree[target] += 1;
            }
        }

        let sort_key = |index: usize| {
            let scenario = &scenarios[index];
            (scenario.operation_key(), scenario.status(), index)
        };

        let mut ready = BinaryHeap::new();
        for index in 0..scenarios.len() {
            if in_degree[index] == 0 {
                ready.push(Reverse(sort_key(index)));
            }
        }

        let mut ordered = Vec::with_capacity(scenarios.len());
        while let Some(Reverse((_, _, index))) = ready.pop() {
            ordered.push(index);
            if let Some(targets) = successors.get(&index) {
                for &target in targets {
                    in_degree[target] -= 1;
                    if in_degree[target] == 0 {
                        ready.push(Reverse(sort_key(target)));
                    }
                }
            }
        }

        if ordered.len() != scenarios.len() {
            return Err(OrderError {
                expected: scenarios.len(),
                ordered: ordered.len(),
                blocked: scenarios.len() - ordered.len(),
            });
        }
        Ok(ordered)
    }

    /// Sort an owned scenario list; fails when any scenario stays blocked.
    pub fn sort_scenarios<S: Scenario>(&self, scenarios: Vec<S>) -> Result<Vec<S>, OrderError> {
        let order = self.order_indices(&scenarios)?;
        let mut slots: Vec<Option<S>> = scenarios.into_iter().map(Some).collect();
        let mut sorted = Vec::with_capacity(slots.len());
        for index in order {
            if let Some(scenario) = slots[index].take() {
                sorted.push(scenario);
            }
        }
        Ok(sorted)
    }

    /// Graphviz rendering of the edge map, for diagnostics.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph links {\n");
        out.push_str("  rankdir=LR;\n");
        for (from, targets) in &self.edges {
            if targets.is_empty() {
                out.push_str(&format!("  \"{from}\";\n"));
            } else {
                for to in targets {
                    out.push_str(&format!("  \"{from}\" -> \"{to}\";\n"));
                }
            }
        }
        out.push_str("}\n");
        out
    }
}

/// Cyclic link definitions make any execution order unsatisfiable.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleError {
    /// Closed walks; each ends by repeating its first node.
    pub cycles: Vec<Vec<OperationRef>>,
}

impl CycleError {
    pub fn distinct_operations(&self) -> usize {
        self.cycles
            .iter()
            .flat_map(|cycle| cycle.iter())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dependency cycle(s) detected over {} operation(s):",
            self.cycles.len(),
            self.distinct_operations()
        )?;
        for cycle in &self.cycles {
            let rendered: Vec<String> = cycle.iter().map(|node| node.to_string()).collect();
            write!(f, " {}", rendered.join(" -> "))?;
        }
        Ok(())
    }
}

impl std::error::Error for CycleError {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unable to order scenarios: expected {expected} but ordered {ordered} \
     ({blocked} scenario(s) blocked by cyclic dependencies)"
)]
pub struct OrderError {
    pub expected: usize,
    pub ordered: usize,
    pub blocked: usize,
}
