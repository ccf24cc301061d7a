use std::collections::BTreeMap;

use oplink_core::{
    parse_link, DependencyGraph, Document, ExpressionLookup, Link, LinkError, OperationRef,
    Scenario,
};
use tracing::warn;

use crate::config::LinkOptions;
use crate::mode::FailureMode;
use crate::synthesis::{synthesize, ExampleRow};

/// All parsed links of one document, aggregated by producing operation.
///
/// Built once per document load; immutable and shareable across test threads
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct LinkRepository {
    links: BTreeMap<OperationRef, Vec<Link>>,
    graph: DependencyGraph,
    options: LinkOptions,
}

impl LinkRepository {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_document(
        document: &Document,
        lookup: &dyn ExpressionLookup,
        options: LinkOptions,
        mode: FailureMode,
    ) -> Result<Self, LinkError> {
        if !options.process_links {
            return Ok(Self {
                options,
                ..Self::default()
            });
        }

        let mut parsed = Vec::new();
        for raw in document.links() {
            let outcome = parse_link(document, &raw.owner, &raw.name, raw.node, lookup);
            if let Some(link) = mode.absorb(outcome, &raw.name)? {
                parsed.push(link);
            }
        }

        let graph = if !options.reorder {
            // Reordering disabled: skip graph construction and cycle
            // detection entirely.
            DependencyGraph::empty()
        } else {
            match DependencyGraph::from_links(&parsed) {
                Ok(graph) => graph,
                Err(cycles) => match mode {
                    FailureMode::Strict => return Err(cycles.into()),
                    FailureMode::Lenient => {
                        // A cycle is never treated as "no dependency": the
                        // whole graph is replaced by an empty one, disabling
                        // reordering for this document.
                        warn!(error = %cycles, "dependency cycles detected; scenario reordering disabled");
                        DependencyGraph::empty()
                    }
                },
            }
        };

        let mut links: BTreeMap<OperationRef, Vec<Link>> = BTreeMap::new();
        for link in parsed {
            links.entry(link.by_operation.clone()).or_default().push(link);
        }

        Ok(Self {
            links,
            graph,
            options,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.values().map(Vec::len).sum()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Links defined *for* a scenario (consumer side).
    pub fn links_for(&self, scenario: &dyn Scenario) -> Vec<&Link> {
        self.links
            .values()
            .flatten()
            .filter(|link| link.defined_for(scenario))
            .collect()
    }

    /// Links defined *by* an operation + status (producer side).
    pub fn links_by(&self, operation: &OperationRef) -> Vec<&Link> {
        self.links
            .values()
            .flatten()
            .filter(|link| link.defined_by(operation))
            .collect()
    }

    /// Derive example rows from matched links for one scenario.
    ///
    /// Strict propagates the first synthesis failure; lenient drops the
    /// failing link's row and keeps the rest.
    pub fn examples_for(
        &self,
        links: &[&Link],
        scenario: &dyn Scenario,
        mode: FailureMode,
    ) -> Result<Vec<ExampleRow>, LinkError> {
        let mut rows = Vec::with_capacity(links.len());
        for link in links {
            let outcome = synthesize(link, scenario).map(|request| ExampleRow {
                link_name: link.name.clone(),
                partial: link.partial,
                source: link.source.clone(),
                request,
            });
            if let Some(row) = mode.absorb(outcome, &link.name)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Reorder scenarios so every producer runs before its consumers.
    ///
    /// With reordering disabled the input comes back unchanged. Lenient mode
    /// degrades any ordering failure to the unchanged input as well.
    pub fn reorder<S: Scenario>(
        &self,
        scenarios: Vec<S>,
        mode: FailureMode,
    ) -> Result<Vec<S>, LinkError> {
        if !self.options.reorder || self.graph.is_empty() {
            return Ok(scenarios);
        }
        // Check the ordering on a borrow first: `sort_scenarios` consumes the
        // list, and lenient mode must hand the input back on failure.
        if let Err(error) = self.graph.order_indices(&scenarios) {
            return match mode {
                FailureMode::Strict => Err(error.into()),
                FailureMode::Lenient => {
                    warn!(error = %error, "scenario reordering failed; keeping input order");
                    Ok(scenarios)
                }
            };
        }
        self.graph.sort_scenarios(scenarios).map_err(LinkError::from)
    }
}
