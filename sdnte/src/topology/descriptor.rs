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

//! # Topology Descriptor
//!
//! Configuration data describing a topology: the switches, the links with their initial delay
//! attribute, and the port assignment of every switch. The descriptor is stored as JSON.
//!
//! ```json
//! {
//!   "name": "triangle",
//!   "switches": [{ "id": 1 }, { "id": 2 }, { "id": 3, "host": "10.0.0.3/24" }],
//!   "links": [
//!     { "a": 1, "b": 2, "delay": "5ms" },
//!     { "a": 2, "b": 3, "delay": "3ms" },
//!     { "a": 1, "b": 3, "delay": "10ms" }
//!   ],
//!   "ports": [[0, 2, 3], [1, 0, 3], [1, 2, 0]]
//! }
//! ```

use super::{LinkWeight, PortTable, SwitchId};
use crate::Error;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Description of a single switch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchSpec {
    /// Id of the switch (1-based)
    pub id: SwitchId,
    /// Address of the attached host in CIDR notation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Description of a single link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    /// First endpoint
    pub a: SwitchId,
    /// Second endpoint
    pub b: SwitchId,
    /// Delay attribute of the link, as configured on the emulator (e.g., `"0.092ms"`)
    pub delay: String,
}

/// Topology snapshot and port assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyDescriptor {
    /// Name of the topology
    pub name: String,
    /// All switches
    pub switches: Vec<SwitchSpec>,
    /// All links
    pub links: Vec<LinkSpec>,
    /// Port matrix. Row `i - 1`, column `j - 1` contains the port on switch `i` towards switch
    /// `j`, and `0` if the two are not adjacent.
    #[serde(default)]
    pub ports: Vec<Vec<u32>>,
}

impl TopologyDescriptor {
    /// Create a descriptor with switches `1..=num_switches`, each with its host `h<i>` at
    /// `10.0.0.<i>/24`, no links and an empty port matrix.
    pub fn with_switches(name: impl Into<String>, num_switches: u32) -> Self {
        Self {
            name: name.into(),
            switches: (1..=num_switches)
                .map(|i| SwitchSpec { id: SwitchId(i), host: Some(format!("10.0.0.{}/24", i)) })
                .collect(),
            links: Vec::new(),
            ports: Vec::new(),
        }
    }

    /// Read the descriptor from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the descriptor into a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Add a link between the switches with ids `a` and `b`, with the given delay (in
    /// milliseconds)
    pub fn add_link(&mut self, a: u32, b: u32, delay: LinkWeight) {
        self.links.push(LinkSpec { a: SwitchId(a), b: SwitchId(b), delay: format_delay(delay) });
    }

    /// Overwrite the delay attribute of all links between `a` and `b` (in both orientations).
    /// Returns false if no such link is declared.
    pub fn set_link_delay(&mut self, a: SwitchId, b: SwitchId, delay: LinkWeight) -> bool {
        let mut found = false;
        for link in self.links.iter_mut() {
            if (link.a == a && link.b == b) || (link.a == b && link.b == a) {
                link.delay = format_delay(delay);
                found = true;
            }
        }
        found
    }

    /// The port table of the topology. If the descriptor has no port matrix, the ports are
    /// derived from the link order (see [`PortTable::from_link_order`]).
    pub fn port_table(&self) -> PortTable {
        if self.ports.is_empty() {
            PortTable::from_link_order(&self.link_pairs())
        } else {
            PortTable::from_matrix(&self.ports)
        }
    }

    /// All declared links as pairs, in declaration order.
    pub fn link_pairs(&self) -> Vec<(SwitchId, SwitchId)> {
        self.links.iter().map(|l| (l.a, l.b)).collect()
    }
}

/// Format a delay in milliseconds as a delay attribute.
pub(crate) fn format_delay(delay: LinkWeight) -> String {
    format!("{}ms", delay)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_json() {
        let d: TopologyDescriptor = serde_json::from_str(
            r#"{
                "name": "line",
                "switches": [{ "id": 1 }, { "id": 2, "host": "10.1.0.2/16" }],
                "links": [{ "a": 1, "b": 2, "delay": "0.5ms" }]
            }"#,
        )
        .unwrap();
        assert_eq!(d.name, "line");
        assert_eq!(d.switches[0], SwitchSpec { id: SwitchId(1), host: None });
        assert_eq!(d.switches[1].host.as_deref(), Some("10.1.0.2/16"));
        assert_eq!(d.link_pairs(), vec![(SwitchId(1), SwitchId(2))]);
        assert!(d.ports.is_empty());
    }

    #[test]
    fn overwrite_delay() {
        let mut d = TopologyDescriptor::with_switches("t", 3);
        d.add_link(1, 2, 1.0);
        d.add_link(3, 2, 1.0);
        assert!(d.set_link_delay(SwitchId(2), SwitchId(3), 2.5));
        assert!(!d.set_link_delay(SwitchId(1), SwitchId(3), 2.5));
        assert_eq!(d.links[0].delay, "1ms");
        assert_eq!(d.links[1].delay, "2.5ms");
    }
}
