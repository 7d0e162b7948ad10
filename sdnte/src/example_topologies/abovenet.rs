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

/// # AboveNet
///
/// The AboveNet topology with 15 switches and 23 links. Every switch has a host attached at
/// `10.0.0.<id>/24`. The route is computed from `s4` to `s15`.
pub struct AboveNet;

impl ExampleTopology for AboveNet {
    const NAME: &'static str = "abovenet";
    const ROUTE: (u32, u32) = (4, 15);

    fn descriptor() -> TopologyDescriptor {
        let mut d = TopologyDescriptor::with_switches(Self::NAME, 15);
        let links: [(u32, u32); 23] = [
            (1, 2),
            (1, 3),
            (2, 4),
            (2, 5),
            (3, 6),
            (3, 7),
            (4, 8),
            (5, 9),
            (6, 10),
            (7, 11),
            (8, 12),
            (9, 13),
            (10, 14),
            (11, 15),
            (13, 7),
            (7, 10),
            (1, 4),
            (2, 3),
            (5, 6),
            (8, 9),
            (10, 11),
            (12, 13),
            (14, 15),
        ];
        for (a, b) in links.iter() {
            d.add_link(*a, *b, INITIAL_DELAY);
        }
        d.ports = vec![
            vec![0, 1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            vec![1, 0, 4, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            vec![1, 4, 0, 0, 0, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0],
            vec![3, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 1, 0, 0, 0, 3, 0, 0, 2, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 1, 0, 3, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0],
            vec![0, 0, 1, 0, 0, 0, 0, 0, 0, 4, 2, 0, 3, 0, 0],
            vec![0, 0, 0, 1, 0, 0, 0, 0, 3, 0, 0, 2, 0, 0, 0],
            vec![0, 0, 0, 0, 1, 0, 0, 3, 0, 0, 0, 0, 2, 0, 0],
            vec![0, 0, 0, 0, 0, 1, 3, 0, 0, 0, 4, 0, 0, 2, 0],
            vec![0, 0, 0, 0, 0, 0, 1, 0, 0, 3, 0, 0, 0, 0, 2],
            vec![0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 2, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 2, 0, 1, 0, 0, 3, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 2],
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 2, 0],
        ];
        d
    }
}
