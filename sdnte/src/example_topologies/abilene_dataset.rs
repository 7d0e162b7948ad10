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

use super::ExampleTopology;
use crate::topology::TopologyDescriptor;

/// # Abilene Dataset Topology
///
/// Topology used to generate delay datasets: 15 switches, of which only the first 11 are
/// connected, with measured link delays. It carries no port matrix; the ports follow the link
/// order.
pub struct AbileneDataset;

impl ExampleTopology for AbileneDataset {
    const NAME: &'static str = "abilene-dataset";
    const ROUTE: (u32, u32) = (1, 11);

    fn descriptor() -> TopologyDescriptor {
        let mut d = TopologyDescriptor::with_switches(Self::NAME, 15);
        let links: [(u32, u32, f64); 12] = [
            (1, 2, 0.092),
            (1, 3, 0.094),
            (2, 4, 0.094),
            (2, 5, 0.1),
            (3, 5, 0.084),
            (4, 6, 0.1),
            (5, 6, 0.090),
            (5, 7, 0.097),
            (6, 8, 0.097),
            (7, 9, 0.101),
            (8, 10, 0.105),
            (9, 11, 0.104),
        ];
        for (a, b, delay) in links.iter() {
            d.add_link(*a, *b, *delay);
        }
        d
    }
}
