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

//! # Port Resolution
//!
//! Static mapping from a pair of adjacent switches to the egress port on the first switch that
//! leads to the second one.

use super::{SwitchId, Topology};
use crate::error::PortUnresolvedError;

use log::*;
use std::collections::HashMap;

/// Raw port assignment, as supplied by the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortTable {
    ports: HashMap<(SwitchId, SwitchId), u32>,
}

impl PortTable {
    /// Create an empty port table
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the port matrix. Row `i - 1`, column `j - 1` is the port on switch `i` towards switch
    /// `j`. Cells with `0` are ignored.
    pub fn from_matrix(matrix: &[Vec<u32>]) -> Self {
        let mut ports = HashMap::new();
        for (i, row) in matrix.iter().enumerate() {
            for (j, port) in row.iter().enumerate() {
                if *port != 0 {
                    ports.insert((SwitchId(i as u32 + 1), SwitchId(j as u32 + 1)), *port);
                }
            }
        }
        Self { ports }
    }

    /// Derive the ports from the order in which the links are created on the emulator: every
    /// switch numbers its ports starting at 1, in the order of the links it is part of. Repeated
    /// links (in any orientation) are ignored.
    pub fn from_link_order(links: &[(SwitchId, SwitchId)]) -> Self {
        let mut next_port: HashMap<SwitchId, u32> = HashMap::new();
        let mut table = Self::new();
        for &(a, b) in links {
            if a == b || table.get(a, b).is_some() || table.get(b, a).is_some() {
                continue;
            }
            for (current, next) in [(a, b), (b, a)].iter() {
                let port = next_port.entry(*current).or_insert(1);
                table.ports.insert((*current, *next), *port);
                *port += 1;
            }
        }
        table
    }

    /// Set the port on `current` towards `next`.
    pub fn insert(&mut self, current: SwitchId, next: SwitchId, port: u32) {
        if port == 0 {
            self.ports.remove(&(current, next));
        } else {
            self.ports.insert((current, next), port);
        }
    }

    /// Lookup the raw table, without checking the topology.
    pub fn get(&self, current: SwitchId, next: SwitchId) -> Option<u32> {
        self.ports.get(&(current, next)).copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Returns true if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

/// # Port Resolver
///
/// A [`PortTable`] restricted to the adjacency of a [`Topology`]. Entries for pairs that are not
/// adjacent in the topology are dropped during construction, such that resolution only succeeds
/// for adjacent switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortResolver {
    ports: HashMap<(SwitchId, SwitchId), u32>,
    missing: Vec<(SwitchId, SwitchId)>,
}

impl PortResolver {
    /// Build the resolver and log every inconsistency between the table and the topology.
    pub fn new(table: &PortTable, topo: &Topology) -> Self {
        let mut ports = HashMap::new();
        for ((current, next), port) in table.ports.iter() {
            if topo.is_adjacent(*current, *next) {
                ports.insert((*current, *next), *port);
            } else {
                debug!("Ignoring port {} from {} to {}: not adjacent", port, current, next);
            }
        }

        let mut missing = Vec::new();
        for (a, b, _) in topo.links() {
            for (current, next) in [(a, b), (b, a)].iter() {
                if !ports.contains_key(&(*current, *next)) {
                    warn!("Port table has no egress port from {} to {}", current, next);
                    missing.push((*current, *next));
                }
            }
        }

        Self { ports, missing }
    }

    /// Returns the egress port on `current` leading to `next`.
    pub fn resolve_port(
        &self,
        current: SwitchId,
        next: SwitchId,
    ) -> Result<u32, PortUnresolvedError> {
        self.ports.get(&(current, next)).copied().ok_or(PortUnresolvedError { current, next })
    }

    /// Directed pairs of adjacent switches for which no port is known.
    pub fn missing(&self) -> &[(SwitchId, SwitchId)] {
        &self.missing
    }
}
