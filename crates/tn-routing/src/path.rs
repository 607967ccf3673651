//! Paths: sequences of directed edges with partial first and last edges.
//!
//! Offsets on a path are in travel direction: `offset1` is where the path
//! enters its first edge, `offset2` where it leaves its last one.  Interior
//! edges are traversed in full.

use tn_core::EdgeId;
use tn_network::{MAX_OFFSET, RoutingNetwork};

use crate::{RoutingError, RoutingResult};

/// One edge of a path with the part of it that is travelled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    pub edge_id: EdgeId,
    pub forward: bool,
    pub offset1: u16,
    pub offset2: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    edges: Vec<(EdgeId, bool)>,
    offset1: u16,
    offset2: u16,
}

impl Path {
    pub fn new() -> Self {
        Self { edges: Vec::new(), offset1: 0, offset2: MAX_OFFSET }
    }

    pub fn push(&mut self, edge_id: EdgeId, forward: bool) {
        self.edges.push((edge_id, forward));
    }

    pub fn edges(&self) -> &[(EdgeId, bool)] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn first(&self) -> Option<(EdgeId, bool)> {
        self.edges.first().copied()
    }

    pub fn last(&self) -> Option<(EdgeId, bool)> {
        self.edges.last().copied()
    }

    pub fn offset1(&self) -> u16 {
        self.offset1
    }

    pub fn offset2(&self) -> u16 {
        self.offset2
    }

    pub fn set_offset1(&mut self, offset: u16) {
        self.offset1 = offset;
    }

    pub fn set_offset2(&mut self, offset: u16) {
        self.offset2 = offset;
    }

    /// Every edge with the offsets travelled on it.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = PathSegment> + '_ {
        let last = self.edges.len().saturating_sub(1);
        self.edges.iter().enumerate().map(move |(i, &(edge_id, forward))| PathSegment {
            edge_id,
            forward,
            offset1: if i == 0 { self.offset1 } else { 0 },
            offset2: if i == last { self.offset2 } else { MAX_OFFSET },
        })
    }

    /// Drop a first edge only touched at its end and a last edge only
    /// touched at its start.  A single-edge path is left alone.
    pub fn trim(&mut self) {
        if self.edges.len() > 1 && self.offset1 == MAX_OFFSET {
            self.edges.remove(0);
            self.offset1 = 0;
        }
        if self.edges.len() > 1 && self.offset2 == 0 {
            self.edges.pop();
            self.offset2 = MAX_OFFSET;
        }
    }

    /// Extend this path with `other`, which must start where this one ends.
    ///
    /// When `other` starts on this path's last edge the two are merged into
    /// one segment; otherwise both boundary offsets must be at the edge ends.
    pub fn append(&mut self, other: &Path) -> RoutingResult<()> {
        let (Some(last), Some(first)) = (self.last(), other.first()) else {
            if self.is_empty() {
                *self = other.clone();
            }
            return Ok(());
        };

        if last == first {
            if self.offset2 != other.offset1 {
                return Err(RoutingError::InvalidPath("appended path starts elsewhere on the shared edge"));
            }
            let single = self.len() == 1 && other.len() == 1;
            self.edges.extend_from_slice(&other.edges[1..]);
            self.offset2 = other.offset2;
            if single && self.offset1 > self.offset2 {
                return Err(RoutingError::InvalidPath("appended path runs backwards on the shared edge"));
            }
            return Ok(());
        }

        if self.offset2 != MAX_OFFSET || other.offset1 != 0 {
            return Err(RoutingError::InvalidPath("appended path does not start where this one ends"));
        }
        self.edges.extend_from_slice(&other.edges);
        self.offset2 = other.offset2;
        Ok(())
    }

    /// `true` if consecutive edges share a vertex and a single-edge path does
    /// not run backwards.
    pub fn is_valid(&self, network: &RoutingNetwork) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.len() == 1 && self.offset1 > self.offset2 {
            return false;
        }

        let mut edges = network.edge_enumerator();
        let mut head = None;
        for &(edge_id, forward) in &self.edges {
            if !edges.move_to_edge(edge_id, forward) {
                return false;
            }
            if head.is_some_and(|h| h != edges.tail()) {
                return false;
            }
            head = Some(edges.head());
        }
        true
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}
