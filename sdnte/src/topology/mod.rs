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

//! # Topology Model
//!
//! The switch-level topology is an undirected, weighted graph. It is built once from a
//! [`TopologyDescriptor`], and afterwards, only the link weights change. Every weight update is
//! written into both the graph and the [`CostMatrix`], such that both representations stay
//! synchronized.

mod cost_matrix;
mod descriptor;
mod ports;

pub use cost_matrix::CostMatrix;
pub use descriptor::{LinkSpec, SwitchSpec, TopologyDescriptor};
pub use ports::{PortResolver, PortTable};

use crate::error::TopologyError;

use log::*;
use petgraph::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Link weight (milliseconds, or abstract hop cost)
pub type LinkWeight = f64;

/// Switch identification. Switches are numbered starting at 1.
#[derive(
    PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SwitchId(pub u32);

impl SwitchId {
    /// Name of the switch inside the emulated network, e.g., `s3`.
    pub fn name(&self) -> String {
        format!("s{}", self.0)
    }

    /// Name of the host attached to the switch, e.g., `h3`.
    pub fn host_name(&self) -> String {
        format!("h{}", self.0)
    }

    /// Node id of the switch in the OpenFlow inventory, e.g., `openflow:3`.
    pub fn openflow_id(&self) -> String {
        format!("openflow:{}", self.0)
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<u32> for SwitchId {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

/// Node data of the topology graph
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    /// Id of the switch
    pub id: SwitchId,
    /// Address of the attached host (in CIDR notation), if any
    pub host: Option<String>,
}

/// Undirected topology graph
pub type TopologyGraph = Graph<Switch, LinkWeight, Undirected, u32>;

/// # Topology
///
/// Holds the topology graph and the cost matrix. The node and edge set is fixed after
/// construction; only [`Topology::set_weight`] mutates the structure, and it always writes both
/// representations.
#[derive(Debug, Clone)]
pub struct Topology {
    name: String,
    graph: TopologyGraph,
    switches: Vec<SwitchId>,
    node_lookup: HashMap<SwitchId, NodeIndex<u32>>,
    edge_lookup: HashMap<(SwitchId, SwitchId), EdgeIndex<u32>>,
    cost_matrix: CostMatrix,
}

impl Topology {
    /// Build the topology from a snapshot. Broken links (unknown endpoints, self loops,
    /// duplicates) are logged and skipped. Links whose delay attribute cannot be parsed get
    /// weight 0. The build only fails if the snapshot contains no usable switch.
    pub fn build(snapshot: &TopologyDescriptor) -> Result<Self, TopologyError> {
        let mut graph = TopologyGraph::new_undirected();
        let mut node_lookup: HashMap<SwitchId, NodeIndex<u32>> = HashMap::new();

        for spec in snapshot.switches.iter() {
            if spec.id.0 == 0 {
                warn!("{}", TopologyError::ZeroSwitchId);
                continue;
            }
            if node_lookup.contains_key(&spec.id) {
                warn!("{}", TopologyError::DuplicateSwitch(spec.id));
                continue;
            }
            let idx = graph.add_node(Switch { id: spec.id, host: spec.host.clone() });
            node_lookup.insert(spec.id, idx);
        }

        if node_lookup.is_empty() {
            return Err(TopologyError::EmptyTopology);
        }

        let mut switches: Vec<SwitchId> = node_lookup.keys().copied().collect();
        switches.sort();
        let mut cost_matrix = CostMatrix::new(switches.iter().copied());
        let mut edge_lookup = HashMap::new();

        for link in snapshot.links.iter() {
            let (a, b) = (link.a, link.b);
            let (idx_a, idx_b) = match (node_lookup.get(&a), node_lookup.get(&b)) {
                (Some(x), Some(y)) => (*x, *y),
                _ => {
                    warn!("{}", TopologyError::UnknownEndpoint(a, b));
                    continue;
                }
            };
            if a == b {
                warn!("{}", TopologyError::SelfLoop(a));
                continue;
            }
            if edge_lookup.contains_key(&key(a, b)) {
                warn!("{}", TopologyError::DuplicateLink(a, b));
                continue;
            }
            let weight = match parse_delay(&link.delay) {
                Some(w) => w,
                None => {
                    warn!(
                        "{}, using weight 0",
                        TopologyError::InvalidDelay { a, b, attr: link.delay.clone() }
                    );
                    0.0
                }
            };
            let edge = graph.add_edge(idx_a, idx_b, weight);
            edge_lookup.insert(key(a, b), edge);
            cost_matrix.set(a, b, weight);
        }

        debug!(
            "Built topology {} with {} switches and {} links",
            snapshot.name,
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            name: snapshot.name.clone(),
            graph,
            switches,
            node_lookup,
            edge_lookup,
            cost_matrix,
        })
    }

    /// Name of the topology
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All switches, sorted by their id
    pub fn switches(&self) -> &[SwitchId] {
        &self.switches
    }

    /// Number of switches
    pub fn num_switches(&self) -> usize {
        self.switches.len()
    }

    /// Number of links
    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the switch is part of the topology
    pub fn contains(&self, id: SwitchId) -> bool {
        self.node_lookup.contains_key(&id)
    }

    /// Address of the host attached to the switch. If the snapshot did not specify one, the
    /// address `10.0.0.<id>/24` is used.
    pub fn host_addr(&self, id: SwitchId) -> String {
        self.node_lookup
            .get(&id)
            .and_then(|idx| self.graph[*idx].host.clone())
            .unwrap_or_else(|| format!("10.0.0.{}/24", id.0))
    }

    /// Index of the switch in the graph
    pub fn node_index(&self, id: SwitchId) -> Option<NodeIndex<u32>> {
        self.node_lookup.get(&id).copied()
    }

    /// Returns true if there is a link between `a` and `b`.
    pub fn is_adjacent(&self, a: SwitchId, b: SwitchId) -> bool {
        self.edge_lookup.contains_key(&key(a, b))
    }

    /// Weight of the link between `a` and `b`, or `None` if they are not adjacent.
    pub fn weight(&self, a: SwitchId, b: SwitchId) -> Option<LinkWeight> {
        self.edge_lookup.get(&key(a, b)).map(|e| self.graph[*e])
    }

    /// Update the weight of the link between `a` and `b`, in both the graph and the cost matrix.
    /// Returns the old weight. Negative, NaN and infinite weights are rejected, and the topology
    /// is left unchanged.
    pub fn set_weight(
        &mut self,
        a: SwitchId,
        b: SwitchId,
        weight: LinkWeight,
    ) -> Result<LinkWeight, TopologyError> {
        let edge = *self.edge_lookup.get(&key(a, b)).ok_or(TopologyError::NoSuchLink(a, b))?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(TopologyError::InvalidWeight { a, b, weight });
        }
        let old = std::mem::replace(&mut self.graph[edge], weight);
        self.cost_matrix.set(a, b, weight);
        Ok(old)
    }

    /// All neighbors of a switch with the weight of the connecting link, sorted by switch id.
    pub fn neighbors(&self, id: SwitchId) -> Vec<(SwitchId, LinkWeight)> {
        let idx = match self.node_lookup.get(&id) {
            Some(idx) => *idx,
            None => return Vec::new(),
        };
        let mut neighbors: Vec<(SwitchId, LinkWeight)> = self
            .graph
            .edges(idx)
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                (self.graph[other].id, *e.weight())
            })
            .collect();
        neighbors.sort_by_key(|(n, _)| *n);
        neighbors
    }

    /// All links in the order in which they were declared in the snapshot.
    pub fn links(&self) -> Vec<(SwitchId, SwitchId, LinkWeight)> {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()].id, self.graph[e.target()].id, *e.weight()))
            .collect()
    }

    /// The cost matrix, mirroring all link weights.
    pub fn cost_matrix(&self) -> &CostMatrix {
        &self.cost_matrix
    }

    /// The underlying graph
    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }
}

/// Parse a delay attribute like `"0.092ms"`. Values in `us` and `s` are converted to
/// milliseconds, values without unit are taken as milliseconds.
pub fn parse_delay(attr: impl AsRef<str>) -> Option<LinkWeight> {
    let attr = attr.as_ref().trim();
    let (number, factor) = if let Some(n) = attr.strip_suffix("ms") {
        (n, 1.0)
    } else if let Some(n) = attr.strip_suffix("us") {
        (n, 0.001)
    } else if let Some(n) = attr.strip_suffix('s') {
        (n, 1000.0)
    } else {
        (attr, 1.0)
    };
    let value: LinkWeight = number.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value * factor)
    } else {
        None
    }
}

/// Normalized key of an undirected link
fn key(a: SwitchId, b: SwitchId) -> (SwitchId, SwitchId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
