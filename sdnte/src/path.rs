// SDN-TE: Delay-Aware Traffic Engineering for Software-Defined Networks
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Path Computation
//!
//! Shortest path over the topology, using a non-negative scalar weight per link. Without a
//! heuristic, the A* search of `petgraph` is a Dijkstra search that stops at the destination.

use crate::error::NoPathFound;
use crate::topology::{LinkWeight, SwitchId, Topology};

use petgraph::algo::astar;
use petgraph::visit::EdgeRef;
use std::fmt;

/// Metric used as the link weight while computing the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Use the (measured) link delay
    Delay,
    /// Every link has cost 1
    HopCount,
}

impl Metric {
    /// Cost of traversing a link with the given weight
    pub fn link_cost(&self, weight: LinkWeight) -> LinkWeight {
        match self {
            Metric::Delay => weight,
            Metric::HopCount => 1.0,
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Delay
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Delay => write!(f, "delay"),
            Metric::HopCount => write!(f, "hop-count"),
        }
    }
}

/// # Path
///
/// Ordered sequence of distinct switches, where consecutive switches are adjacent. The first
/// element is the source, the last one the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<SwitchId>,
    cost: LinkWeight,
}

impl Path {
    /// The path from a switch to itself, with cost 0.
    pub fn trivial(node: SwitchId) -> Self {
        Self { nodes: vec![node], cost: 0.0 }
    }

    /// Create a path from its nodes and total cost.
    pub fn new(nodes: Vec<SwitchId>, cost: LinkWeight) -> Self {
        Self { nodes, cost }
    }

    /// Switches along the path
    pub fn nodes(&self) -> &[SwitchId] {
        &self.nodes
    }

    /// Total cost of the path
    pub fn cost(&self) -> LinkWeight {
        self.cost
    }

    /// First switch
    pub fn source(&self) -> SwitchId {
        self.nodes[0]
    }

    /// Last switch
    pub fn destination(&self) -> SwitchId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of switches on the path
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false, a path contains at least the source.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of hops (links) on the path
    pub fn num_hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Iterate over all hops `(current, next)` in order.
    pub fn hops(&self) -> impl Iterator<Item = (SwitchId, SwitchId)> + '_ {
        self.nodes.windows(2).map(|w| (w[0], w[1]))
    }

    /// Returns true if the link between `a` and `b` (in any direction) is part of the path.
    pub fn contains_link(&self, a: SwitchId, b: SwitchId) -> bool {
        self.hops().any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Returns true if both paths traverse the same switches in the same order.
    pub fn same_route(&self, other: &Path) -> bool {
        self.nodes == other.nodes
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr: Vec<String> = self.nodes.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", repr.join(" -> "))
    }
}

/// Compute the path with minimal total cost from `source` to `destination`.
///
/// If `source == destination`, the trivial path is returned without looking at the topology. If
/// multiple paths have the exact same cost, the result only depends on the topology, so the same
/// topology always yields the same path. Returns [`NoPathFound`] if the two switches are not
/// connected.
pub fn shortest_path(
    topo: &Topology,
    source: SwitchId,
    destination: SwitchId,
    metric: Metric,
) -> Result<Path, NoPathFound> {
    if source == destination {
        return Ok(Path::trivial(source));
    }
    let no_path = NoPathFound { src: source, dst: destination };
    let (start, goal) = match (topo.node_index(source), topo.node_index(destination)) {
        (Some(start), Some(goal)) => (start, goal),
        _ => return Err(no_path),
    };

    let graph = topo.graph();
    let (cost, nodes) = astar(
        graph,
        start,
        |n| n == goal,
        |e| metric.link_cost(*e.weight()),
        |_| 0.0,
    )
    .ok_or(no_path)?;

    Ok(Path { nodes: nodes.into_iter().map(|n| graph[n].id).collect(), cost })
}
