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

//! # Printer
//!
//! Utility functions for formatting the state of the topology in a human readable way.

use crate::path::Path;
use crate::topology::{LinkWeight, Topology};

use itertools::Itertools;

/// Width of a single cell in the cost matrix
const CELL_WIDTH: usize = 10;

/// Returns the cost matrix as a fixed-width table. Each row and column is labelled with the
/// switch name. Missing links are shown as `-`, and the diagonal as `0`.
pub fn cost_matrix(topo: &Topology) -> String {
    let matrix = topo.cost_matrix();
    let header = std::iter::once(format!("{:>w$}", "", w = CELL_WIDTH / 2))
        .chain(matrix.ids().iter().map(|id| format!("{:>w$}", id.name(), w = CELL_WIDTH)))
        .join("");
    let rows = matrix.ids().iter().map(|id| {
        std::iter::once(format!("{:>w$}", id.name(), w = CELL_WIDTH / 2))
            .chain(matrix.row(*id).into_iter().map(cell))
            .join("")
    });
    std::iter::once(header).chain(rows).join("\n")
}

fn cell(weight: Option<LinkWeight>) -> String {
    match weight {
        Some(w) if w == 0.0 => format!("{:>w$}", "0", w = CELL_WIDTH),
        Some(w) => format!("{:>w$.6}", w, w = CELL_WIDTH),
        None => format!("{:>w$}", "-", w = CELL_WIDTH),
    }
}

/// Returns the path including its total cost, e.g., `s1 -> s2 -> s3 (cost: 8.000000)`.
pub fn path(path: &Path) -> String {
    format!("{} (cost: {:.6})", path, path.cost())
}

/// Returns all links with their weight, one per line.
pub fn links(topo: &Topology) -> String {
    topo.links().into_iter().map(|(a, b, w)| format!("{} <-> {}: {:.6}ms", a, b, w)).join("\n")
}
