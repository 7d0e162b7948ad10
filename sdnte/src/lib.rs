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

#![deny(missing_docs)]

//! # SDN-TE: Delay-Aware Traffic Engineering for Software-Defined Networks
//! This is a library for routing traffic along the path with the smallest measured delay in a
//! software-defined network, and for adapting the route as the link delays change.
//!
//! ## Structure
//!
//! - **[`Topology`](topology::Topology)**: Undirected, weighted graph of switches, built from a
//!   [`TopologyDescriptor`](topology::TopologyDescriptor). The link weights are mirrored in a
//!   [`CostMatrix`](topology::CostMatrix). The [`PortResolver`](topology::PortResolver) maps
//!   each pair of adjacent switches to the egress port.
//!
//! - **[`Path`](path)**: Shortest path computation (Dijkstra) under a
//!   [`Metric`](path::Metric), either the link delay or the hop count.
//!
//! - **[`Flow`](flow)**: Translation of a path into one flow rule per hop, and installation of
//!   these rules through the [`Southbound`](flow::Southbound) interface of the controller.
//!
//! - **[`Probe`](probe)**: Measurement of the link delay using a traffic generator, executed
//!   through the [`Emulation`](probe::Emulation) interface. Background load can be generated on
//!   the links of the active path while measuring.
//!
//! - **[`Control`](control)**: The [`ControlLoop`](control::ControlLoop), which measures the
//!   links, computes the path and installs it, and repeats this for a number of iterations.
//!
//! - **[`History`](history)**: Reading historical delays from CSV to seed the link weights, and
//!   writing measurements to CSV.
//!
//! ## Usage
//!
//! ```
//! use sdnte::example_topologies::{Abilene, ExampleTopology};
//! use sdnte::path::{shortest_path, Metric};
//! use sdnte::topology::{SwitchId, Topology};
//!
//! fn main() -> Result<(), sdnte::Error> {
//!     let topo = Topology::build(&Abilene::descriptor())?;
//!     let path = shortest_path(&topo, SwitchId(3), SwitchId(6), Metric::Delay)?;
//!     println!("{}", path);
//!     Ok(())
//! }
//! ```

pub mod control;
mod error;
pub mod flow;
pub mod history;
pub mod path;
pub mod printer;
pub mod probe;
pub mod topology;

// test modules
pub mod example_topologies;
mod test;

pub use error::*;
