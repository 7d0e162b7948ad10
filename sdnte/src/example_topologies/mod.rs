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

//! Topologies for testing and running the control loop

use crate::topology::TopologyDescriptor;

mod abilene;
pub use abilene::Abilene;

mod abovenet;
pub use abovenet::AboveNet;

mod abilene_dataset;
pub use abilene_dataset::AbileneDataset;

/// Initial delay (in milliseconds) of every link, before any measurement or seeding.
pub(crate) const INITIAL_DELAY: f64 = 1.0;

/// Trait for easier access to example topologies.
pub trait ExampleTopology {
    /// Name under which the topology can be selected
    const NAME: &'static str;
    /// Source and destination of the route computed on this topology
    const ROUTE: (u32, u32);
    /// Get the descriptor of the topology
    fn descriptor() -> TopologyDescriptor;
}

/// Names of all example topologies
pub const EXAMPLE_NAMES: [&str; 3] = [Abilene::NAME, AboveNet::NAME, AbileneDataset::NAME];

/// Get the descriptor of an example topology by its name.
pub fn by_name(name: &str) -> Option<TopologyDescriptor> {
    if name == Abilene::NAME {
        Some(Abilene::descriptor())
    } else if name == AboveNet::NAME {
        Some(AboveNet::descriptor())
    } else if name == AbileneDataset::NAME {
        Some(AbileneDataset::descriptor())
    } else {
        None
    }
}
