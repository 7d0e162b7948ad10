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

use sdnte::example_topologies::{self, EXAMPLE_NAMES};
use sdnte::topology::TopologyDescriptor;

use std::error::Error;
use std::path::Path;

/// Get the descriptor of a built-in topology by its name (e.g., `abilene`), or read it from a
/// JSON file.
pub fn get_topo(name_or_path: &str) -> Result<TopologyDescriptor, Box<dyn Error>> {
    if let Some(descriptor) = example_topologies::by_name(name_or_path) {
        return Ok(descriptor);
    }
    if Path::new(name_or_path).is_file() {
        return Ok(TopologyDescriptor::from_file(name_or_path)?);
    }
    Err(format!(
        "{:?} is neither a file nor a known topology (known: {})",
        name_or_path,
        EXAMPLE_NAMES.join(", ")
    )
    .into())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_topologies() {
        for name in EXAMPLE_NAMES.iter() {
            assert!(get_topo(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn unknown_topology() {
        assert!(get_topo("no-such-topology.json").is_err());
    }
}
