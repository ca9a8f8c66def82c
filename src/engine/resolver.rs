use crate::core::item::{ComputableItem, ItemId, Reference};
use crate::engine::error::EngineError;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Compute a safe linear execution order for one calculation pass.
///
/// Each item is a graph node; an edge dependency → dependent exists only
/// when the item's declared reference points at another item *in the same
/// pass's set*. A reference to a prior-pass item or to an aggregate line is
/// not an edge — it is assumed already resolved and is read from the
/// context at execution time.
///
/// The returned order is positions into `items`. Ties among independent
/// items break by input order, so a fixed item set always yields the same
/// order (some downstream diagnostics are order-sensitive).
///
/// An empty set is a valid no-op. A cycle is a fatal error naming every
/// item on the offending cycle.
pub fn resolve_order(items: &[&dyn ComputableItem]) -> Result<Vec<usize>, EngineError> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..items.len()).map(|i| graph.add_node(i)).collect();
    let position: HashMap<ItemId, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id(), i))
        .collect();

    for (i, item) in items.iter().enumerate() {
        if let Reference::Item(dep) = item.reference() {
            if let Some(&j) = position.get(&dep) {
                graph.add_edge(nodes[j], nodes[i], ());
            }
        }
    }

    // Kahn's algorithm; the ready set drains lowest input position first.
    let mut indegree: Vec<usize> = nodes
        .iter()
        .map(|n| graph.neighbors_directed(*n, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(items.len());
    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for succ in graph.neighbors_directed(nodes[i], Direction::Outgoing) {
            let s = graph[succ];
            indegree[s] -= 1;
            if indegree[s] == 0 {
                ready.push(Reverse(s));
            }
        }
    }

    if order.len() == items.len() {
        return Ok(order);
    }
    Err(cycle_error(items, &graph, &nodes))
}

/// Name the members of some cycle in a graph Kahn's algorithm could not
/// exhaust. Kahn only says which nodes remain; the actual cycle comes from
/// a self-loop check plus Tarjan's strongly connected components.
fn cycle_error(
    items: &[&dyn ComputableItem],
    graph: &DiGraph<usize, ()>,
    nodes: &[NodeIndex],
) -> EngineError {
    for (i, node) in nodes.iter().enumerate() {
        if graph.contains_edge(*node, *node) {
            return EngineError::DependencyCycle {
                items: vec![items[i].name().to_string()],
            };
        }
    }

    for component in tarjan_scc(graph) {
        if component.len() > 1 {
            let mut positions: Vec<usize> = component.iter().map(|n| graph[*n]).collect();
            positions.sort_unstable();
            return EngineError::DependencyCycle {
                items: positions
                    .iter()
                    .map(|&i| items[i].name().to_string())
                    .collect(),
            };
        }
    }

    // Kahn stalled, so a cycle must exist; reaching here would mean the
    // graph changed between the two passes.
    EngineError::DependencyCycle { items: Vec::new() }
}
