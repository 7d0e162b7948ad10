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

//! Module containing all error types

use crate::topology::{LinkWeight, SwitchId};
use thiserror::Error;

/// Main error type, returned only for failures that make it impossible to set up the control loop.
#[derive(Debug, Error)]
pub enum Error {
    /// Topology cannot be built at all
    #[error("Topology Error: {0}")]
    TopologyError(#[from] TopologyError),
    /// IO Error
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    /// Cannot parse a JSON descriptor
    #[error("Cannot parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Cannot read or write a CSV file
    #[error("CSV Error: {0}")]
    CsvError(#[from] csv::Error),
    /// No path between the source and the destination
    #[error("{0}")]
    NoPathFound(#[from] NoPathFound),
    /// The requested switch does not exist in the topology
    #[error("Switch {0} is not part of the topology")]
    UnknownSwitch(SwitchId),
}

/// Malformed or missing topology data. Except for [`TopologyError::EmptyTopology`], these errors
/// are logged and the offending element is substituted or skipped.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum TopologyError {
    /// The link delay attribute cannot be parsed
    #[error("Cannot parse the delay attribute {attr:?} of link {a} <-> {b}")]
    InvalidDelay {
        /// First endpoint
        a: SwitchId,
        /// Second endpoint
        b: SwitchId,
        /// raw attribute
        attr: String,
    },
    /// The weight is negative, NaN or infinite.
    #[error("Invalid weight {weight} for link {a} <-> {b}")]
    InvalidWeight {
        /// First endpoint
        a: SwitchId,
        /// Second endpoint
        b: SwitchId,
        /// the rejected weight
        weight: LinkWeight,
    },
    /// A link references a switch that is not declared
    #[error("Link {0} <-> {1} references an unknown switch")]
    UnknownEndpoint(SwitchId, SwitchId),
    /// A link connects a switch to itself
    #[error("Link {0} <-> {0} is a self loop")]
    SelfLoop(SwitchId),
    /// The same link is declared twice
    #[error("Link {0} <-> {1} is declared twice")]
    DuplicateLink(SwitchId, SwitchId),
    /// The same switch id is declared twice
    #[error("Switch {0} is declared twice")]
    DuplicateSwitch(SwitchId),
    /// Switch ids are 1-based
    #[error("Switch id 0 is invalid, switch ids start at 1")]
    ZeroSwitchId,
    /// Two switches are not adjacent
    #[error("There is no link between {0} and {1}")]
    NoSuchLink(SwitchId, SwitchId),
    /// The topology contains no switch at all
    #[error("The topology contains no switches")]
    EmptyTopology,
}

/// No path connects the source and the destination under the current weights.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("No path found between {src} and {dst}")]
pub struct NoPathFound {
    /// Requested source
    pub src: SwitchId,
    /// Requested destination
    pub dst: SwitchId,
}

/// The port table has no egress port for a pair of switches.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("No egress port known from {current} towards {next}")]
pub struct PortUnresolvedError {
    /// Switch on which the rule would be installed
    pub current: SwitchId,
    /// Next hop
    pub next: SwitchId,
}

/// Failure while talking to the flow-table of the controller.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum InstallError {
    /// The controller answered with a non-success status code
    #[error("Controller rejected the request with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// response body
        body: String,
    },
    /// The request did not reach the controller, or the response could not be read
    #[error("Transport failure: {0}")]
    Transport(String),
}

/// The decoded report of the traffic generator is malformed.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ProbeParseError {
    /// A field was not found in the report
    #[error("Field {0:?} is missing in the report")]
    MissingField(&'static str),
    /// The field was found, but the value is not a number
    #[error("Field {field:?} has an invalid value: {value:?}")]
    InvalidValue {
        /// Name of the field
        field: &'static str,
        /// raw value
        value: String,
    },
    /// The report has fewer lines than required by the offset based parsing
    #[error("Report has only {0} lines")]
    TooShort(usize),
}

/// Failure while executing a command on a node of the emulated network.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ProcessError {
    /// The node is unknown to the emulation
    #[error("Node {0} is not known to the emulation")]
    UnknownNode(String),
    /// Cannot start the command
    #[error("Cannot execute {cmd:?} on {node}: {reason}")]
    Exec {
        /// name of the node
        node: String,
        /// the command
        cmd: String,
        /// reason of the failure
        reason: String,
    },
    /// A background task failed or panicked
    #[error("Background task on {0} failed: {1}")]
    Task(String, String),
}

/// The delay of a link cannot be changed on the emulated network.
#[derive(Debug, Error)]
pub enum DelayChangeError {
    /// The interface of the link is unknown
    #[error("{0}")]
    Port(#[from] PortUnresolvedError),
    /// The command failed
    #[error("{0}")]
    Process(#[from] ProcessError),
}
