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

//! # Cost Matrix
//!
//! Symmetric N×N matrix of link weights. Absent links are stored as `None`, which keeps them
//! distinct from links with zero weight.

use super::{LinkWeight, SwitchId};

use std::collections::HashMap;

/// Symmetric matrix of link weights, indexed by [`SwitchId`]. The diagonal is always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    ids: Vec<SwitchId>,
    pos: HashMap<SwitchId, usize>,
    cells: Vec<Option<LinkWeight>>,
}

impl CostMatrix {
    /// Create a matrix without any link for the given switches.
    pub fn new(ids: impl IntoIterator<Item = SwitchId>) -> Self {
        let mut ids: Vec<SwitchId> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        let pos = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let n = ids.len();
        Self { ids, pos, cells: vec![None; n * n] }
    }

    /// Number of switches (rows and columns)
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Switches in the order of the rows.
    pub fn ids(&self) -> &[SwitchId] {
        &self.ids
    }

    /// Returns the weight at `(a, b)`. The diagonal returns `Some(0.0)`, absent links and unknown
    /// switches return `None`.
    pub fn get(&self, a: SwitchId, b: SwitchId) -> Option<LinkWeight> {
        if a == b {
            return self.pos.get(&a).map(|_| 0.0);
        }
        let (i, j) = (*self.pos.get(&a)?, *self.pos.get(&b)?);
        self.cells[i * self.size() + j]
    }

    /// Returns true if there is a link between `a` and `b` (the diagonal does not count).
    pub fn has_link(&self, a: SwitchId, b: SwitchId) -> bool {
        a != b && self.get(a, b).is_some()
    }

    /// Write the weight symmetrically at `(a, b)` and `(b, a)`. Writes on the diagonal or for
    /// unknown switches are ignored.
    pub(crate) fn set(&mut self, a: SwitchId, b: SwitchId, weight: LinkWeight) {
        if a == b {
            return;
        }
        if let (Some(i), Some(j)) = (self.pos.get(&a).copied(), self.pos.get(&b).copied()) {
            let n = self.size();
            self.cells[i * n + j] = Some(weight);
            self.cells[j * n + i] = Some(weight);
        }
    }

    /// Returns the row of a switch, with zero on the diagonal and `None` for absent links.
    pub fn row(&self, a: SwitchId) -> Vec<Option<LinkWeight>> {
        self.ids.iter().map(|b| self.get(a, *b)).collect()
    }
}
