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

use super::{ExampleTopology, INITIAL_DELAY};
use crate::topology::TopologyDescriptor;

/// # Abilene Network
///
/// The Abilene backbone from [topology-zoo](http://topology-zoo.org/dataset.html) with 11
/// switches. Every switch has a host attached at `10.0.0.<id>/24`. The route is computed from
/// `s3` to `s6`.
///
/// The link list contains the link between `s2` and `s9` twice, once in each orientation. The
/// second declaration is skipped when the topology is built.
pub struct Abilene;

impl ExampleTopology for Abilene {
    const NAME: &'static str = "abilene";
    const ROUTE: (u32, u32) = (3, 6);

    fn descriptor() -> TopologyDescriptor {
        let mut d = TopologyDescriptor::with_switches(Self::NAME, 11);
        let links: [(u32, u32); 13] = [
            (1, 11),
            (1, 6),
            (2, 5),
            (2, 7),
            (2, 9),
            (3, 7),
            (3, 8),
            (4, 8),
            (4, 7),
            (8, 10),
            (9, 11),
            (9, 2),
            (10, 11),
        ];
        for (a, b) in links.iter() {
            d.add_link(*a, *b, INITIAL_DELAY);
        }
        d.ports = vec![
            vec![0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 1],
            vec![0, 0, 0, 0, 1, 0, 2, 0, 3, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 1, 2, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 2, 1, 0, 0, 0],
            vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 1, 2, 3, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 1, 2, 0, 0, 0, 0, 0, 3, 0],
            vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 2],
            vec![0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 2],
            vec![1, 0, 0, 0, 0, 0, 0, 0, 2, 3, 0],
        ];
        d
    }
}
