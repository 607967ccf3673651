//! Edge-based Dijkstra.
//!
//! # States
//!
//! A search state is a directed edge `(edge, forward)` and its settled cost is
//! the cost of arriving at that edge's head.  Searching over edges rather
//! than vertices is what lets turn costs, which depend on the edge a vertex
//! was entered by, take part in the search.
//!
//! # Start and end
//!
//! Sources and targets are [`SnapPoint`]s.  The source edge is entered both
//! ways at the source offset; a target is reached as soon as its edge is
//! entered, at the cost of the part of that edge up to the target offset.
//!
//! # Pruning
//!
//! Every search takes a `settled` callback, called with the head vertex and
//! cost of each state as it is settled.  Returning `true` stops the search
//! from expanding that state.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use tn_core::{Coordinate, EdgeId, VertexId};
use tn_network::{MAX_OFFSET, NetworkError, RoutingNetwork};

use crate::{Path, ProfileHandler, RoutingResult, SnapPoint};

/// A path with the weight the search assigned it.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedPath {
    pub path: Path,
    pub weight: f64,
}

/// Prunes states whose head lies farther than a fixed distance from an
/// origin.  With no distance set it prunes nothing.
#[derive(Copy, Clone, Debug)]
pub struct SearchBound {
    pub origin: Coordinate,
    pub max_distance_m: Option<f64>,
}

impl SearchBound {
    pub fn unbounded(origin: Coordinate) -> Self {
        Self { origin, max_distance_m: None }
    }

    pub fn prunes(&self, network: &RoutingNetwork, vertex: VertexId) -> bool {
        let Some(max) = self.max_distance_m else { return false };
        network.vertex(vertex).is_ok_and(|c| c.distance_m(self.origin) > max)
    }
}

/// Best path from `source` to `target`, `None` if there is none.
pub fn one_to_one<F>(
    network: &RoutingNetwork,
    handler: &mut ProfileHandler,
    source: SnapPoint,
    target: SnapPoint,
    settled: F,
) -> RoutingResult<Option<WeightedPath>>
where
    F: FnMut(VertexId, f64) -> bool,
{
    let mut found = one_to_many(network, handler, source, &[target], settled)?;
    Ok(found.pop().flatten())
}

/// Best path from `source` to each of `targets`, in target order.
pub fn one_to_many<F>(
    network: &RoutingNetwork,
    handler: &mut ProfileHandler,
    source: SnapPoint,
    targets: &[SnapPoint],
    mut settled: F,
) -> RoutingResult<Vec<Option<WeightedPath>>>
where
    F: FnMut(VertexId, f64) -> bool,
{
    let mut by_edge: FxHashMap<EdgeId, Vec<usize>> = FxHashMap::default();
    for (i, target) in targets.iter().enumerate() {
        by_edge.entry(target.edge_id).or_default().push(i);
    }
    let mut best: Vec<Option<Best>> = vec![None; targets.len()];

    let mut tree: Vec<Visit> = Vec::new();
    let mut heap: BinaryHeap<Reverse<(Cost, u32)>> = BinaryHeap::new();
    let mut edges = network.edge_enumerator();

    for forward in [true, false] {
        if !edges.move_to_edge(source.edge_id, forward) {
            return Err(NetworkError::EdgeNotFound(source.edge_id).into());
        }
        let Some(weight) = handler.edge_weight(&edges)? else { continue };
        let start = source.offset_in(forward);

        if let Some(on_edge) = by_edge.get(&source.edge_id) {
            for &i in on_edge {
                let end = targets[i].offset_in(forward);
                if end >= start {
                    improve(&mut best[i], weight * fraction(end - start), Via::Direct(forward));
                }
            }
        }

        let ptr = push_visit(&mut tree, source.edge_id, forward, edges.head(), edges.head_order(), NO_PARENT);
        heap.push(Reverse((Cost(weight * fraction(MAX_OFFSET - start)), ptr)));
    }

    let mut done: FxHashSet<(EdgeId, bool)> = FxHashSet::default();
    while let Some(Reverse((Cost(cost), ptr))) = heap.pop() {
        if all_settled(&best, cost) {
            break;
        }
        let visit = tree[ptr as usize];
        if !done.insert((visit.edge, visit.forward)) {
            continue;
        }
        if settled(visit.head, cost) {
            continue;
        }

        if !edges.move_to(visit.head) {
            return Err(NetworkError::VertexNotFound(visit.head).into());
        }
        while edges.move_next() {
            let edge = edges.edge_id();
            let forward = edges.forward();
            // No U-turn back over the edge just travelled.
            if edge == visit.edge {
                continue;
            }
            let Some(turn) = handler.turn_cost(network, edges.turn_cost_to_tail(visit.head_order)) else {
                continue;
            };
            let Some(weight) = handler.edge_weight(&edges)? else { continue };
            let entered = cost + turn;

            // A settled edge can still lead to a target on it, e.g. the source
            // edge reached again around a loop.
            if let Some(on_edge) = by_edge.get(&edge) {
                for &i in on_edge {
                    let partial = weight * fraction(targets[i].offset_in(forward));
                    improve(&mut best[i], entered + partial, Via::Visit(ptr, forward));
                }
            }
            if done.contains(&(edge, forward)) {
                continue;
            }

            let next = push_visit(&mut tree, edge, forward, edges.head(), edges.head_order(), ptr);
            heap.push(Reverse((Cost(entered + weight), next)));
        }
    }
    trace!(source = %source, settled = done.len(), visits = tree.len(), "search finished");

    Ok(best
        .iter()
        .zip(targets)
        .map(|(b, &target)| b.map(|b| reconstruct(&tree, source, target, b)))
        .collect())
}

// ── Search internals ──────────────────────────────────────────────────────────

const NO_PARENT: u32 = u32::MAX;

/// A node of the search tree.
#[derive(Copy, Clone, Debug)]
struct Visit {
    edge: EdgeId,
    forward: bool,
    head: VertexId,
    head_order: u8,
    parent: u32,
}

/// How the best path to a target ends: directly along the source edge, or
/// after the search-tree node `ptr`.  Both carry the travel direction on the
/// target edge.
#[derive(Copy, Clone, Debug)]
enum Via {
    Direct(bool),
    Visit(u32, bool),
}

#[derive(Copy, Clone, Debug)]
struct Best {
    weight: f64,
    via: Via,
}

/// `f64` ordered by `total_cmp` for the heap.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[inline]
fn fraction(offset: u16) -> f64 {
    tn_network::offset_fraction(offset)
}

fn push_visit(tree: &mut Vec<Visit>, edge: EdgeId, forward: bool, head: VertexId, head_order: u8, parent: u32) -> u32 {
    tree.push(Visit { edge, forward, head, head_order, parent });
    (tree.len() - 1) as u32
}

fn improve(slot: &mut Option<Best>, weight: f64, via: Via) {
    if slot.is_none_or(|b| weight < b.weight) {
        *slot = Some(Best { weight, via });
    }
}

/// Every target found at a weight no later state can beat.
fn all_settled(best: &[Option<Best>], cost: f64) -> bool {
    best.iter().all(|b| b.is_some_and(|b| b.weight <= cost))
}

fn reconstruct(tree: &[Visit], source: SnapPoint, target: SnapPoint, best: Best) -> WeightedPath {
    let mut path = Path::new();
    let target_forward = match best.via {
        Via::Direct(forward) => {
            path.set_offset1(source.offset_in(forward));
            forward
        }
        Via::Visit(ptr, forward) => {
            let mut chain = Vec::new();
            let mut cur = ptr;
            while cur != NO_PARENT {
                let visit = tree[cur as usize];
                chain.push((visit.edge, visit.forward));
                cur = visit.parent;
            }
            chain.reverse();
            if let Some(&(_, first_forward)) = chain.first() {
                path.set_offset1(source.offset_in(first_forward));
            }
            for (edge, edge_forward) in chain {
                path.push(edge, edge_forward);
            }
            forward
        }
    };
    path.push(target.edge_id, target_forward);
    path.set_offset2(target.offset_in(target_forward));
    path.trim();
    WeightedPath { path, weight: best.weight }
}
