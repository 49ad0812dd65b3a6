//! Dependency ordering of catalog objects.
//!
//! DDL has to be emitted so that every object follows the objects it
//! depends upon. The order is a stable topological sort: among objects whose
//! dependencies are already placed, the one that came first in the input
//! goes first, so an input that is already valid comes back unchanged.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::metadata::CatalogObject;
use crate::sql::ident::canonical_fqn;

/// Errors raised while ordering objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("circular dependency between: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
}

/// Result type for dependency ordering.
pub type GraphResult<T> = Result<T, GraphError>;

/// Order `objects` so each one follows its dependencies.
///
/// Returns indices into `objects`. Dependencies naming objects outside the
/// slice are ignored, as are self references.
///
/// # Errors
///
/// [`GraphError::CyclicDependency`] with the fully-qualified names of every
/// object taking part in a cycle, in input order.
pub fn sort_by_dependencies<T: CatalogObject>(objects: &[T]) -> GraphResult<Vec<usize>> {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(objects.len(), 0);
    let nodes: Vec<NodeIndex> = (0..objects.len()).map(|i| graph.add_node(i)).collect();

    let by_key: HashMap<String, NodeIndex> = objects
        .iter()
        .zip(&nodes)
        .map(|(object, node)| (canonical_fqn(&object.fqn()), *node))
        .collect();

    // Edges point from a dependency to its dependent.
    for (object, node) in objects.iter().zip(&nodes) {
        for dependency in object.depends_upon() {
            if let Some(&from) = by_key.get(&canonical_fqn(dependency)) {
                if from != *node && graph.find_edge(from, *node).is_none() {
                    graph.add_edge(from, *node, ());
                }
            }
        }
    }

    let mut in_degree: Vec<usize> = nodes
        .iter()
        .map(|n| graph.neighbors_directed(*n, Direction::Incoming).count())
        .collect();
    let mut ready: BTreeSet<usize> = (0..objects.len()).filter(|i| in_degree[*i] == 0).collect();
    let mut order = Vec::with_capacity(objects.len());

    while let Some(index) = ready.pop_first() {
        order.push(index);
        for dependent in graph.neighbors_directed(nodes[index], Direction::Outgoing) {
            let dependent = graph[dependent];
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() == objects.len() {
        return Ok(order);
    }

    let mut members: Vec<usize> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .flatten()
        .map(|node| graph[node])
        .collect();
    members.sort_unstable();
    Err(GraphError::CyclicDependency(
        members.into_iter().map(|i| objects[i].fqn()).collect(),
    ))
}
