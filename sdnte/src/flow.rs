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

//! # Flow Installation
//!
//! Translates a [`Path`] into one flow rule per hop, and pushes them to the flow table of the
//! controller through the [`Southbound`] interface. Installation is best-effort: a failing hop is
//! recorded in the [`InstallReport`], and the remaining hops are installed anyway. Nothing is
//! rolled back.

use crate::error::{InstallError, PortUnresolvedError};
use crate::path::Path;
use crate::topology::{PortResolver, SwitchId};

use log::*;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Flow table in which all rules are installed
pub const FLOW_TABLE: u8 = 0;
/// Priority of all rules
pub const FLOW_PRIORITY: u32 = 1000;
/// Name tag of all rules
pub const FLOW_NAME: &str = "dest-ip-flow";
/// Maximum packet length of the output action
pub const MAX_PACKET_LEN: u32 = 65535;

/// Identifier of a flow rule. It only depends on the source, the destination and the (1-based)
/// hop index, such that installing the same path twice overwrites the same rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowRuleId(String);

impl FlowRuleId {
    /// Identifier of the rule for hop `hop` (starting at 1) of the path from `source` to
    /// `destination`.
    pub fn new(source: SwitchId, destination: SwitchId, hop: usize) -> Self {
        Self(format!("flow_{}_{}_{}", source, destination, hop))
    }

    /// String representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Forwarding directive for a single switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRule {
    /// Identifier of the rule
    pub id: FlowRuleId,
    /// Switch on which the rule is installed
    pub node: SwitchId,
    /// Flow table index
    pub table: u8,
    /// Priority of the rule
    pub priority: u32,
    /// Name tag
    pub name: String,
    /// Destination address to match (CIDR)
    pub destination_addr: String,
    /// Egress port
    pub output_port: u32,
    /// Maximum packet length of the output action
    pub max_length: u32,
}

impl FlowRule {
    /// Rule with the default table, priority, name and max length.
    pub fn new(id: FlowRuleId, node: SwitchId, destination_addr: String, output_port: u32) -> Self {
        Self {
            id,
            node,
            table: FLOW_TABLE,
            priority: FLOW_PRIORITY,
            name: FLOW_NAME.to_string(),
            destination_addr,
            output_port,
            max_length: MAX_PACKET_LEN,
        }
    }
}

/// # Southbound Interface
///
/// Flow-table API of the SDN controller. Both operations are idempotent on the controller side.
pub trait Southbound {
    /// Create or replace the rule on its switch.
    fn upsert_flow(&self, rule: &FlowRule) -> Result<(), InstallError>;

    /// Delete the rule with the given id from the switch.
    fn delete_flow(&self, node: SwitchId, table: u8, id: &FlowRuleId) -> Result<(), InstallError>;
}

/// Reason why a single hop could not be installed.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum HopError {
    /// No egress port is known for the hop
    #[error(transparent)]
    PortUnresolved(#[from] PortUnresolvedError),
    /// The controller did not accept the rule
    #[error(transparent)]
    Install(#[from] InstallError),
}

/// A hop that could not be installed
#[derive(Debug, Clone, PartialEq)]
pub struct HopFailure {
    /// Hop index, starting at 1
    pub hop: usize,
    /// Rule that was supposed to be installed
    pub rule: FlowRuleId,
    /// Reason
    pub error: HopError,
}

/// Result of installing a path
#[derive(Debug, Clone, PartialEq)]
pub struct InstallReport {
    /// Source of the path
    pub source: SwitchId,
    /// Destination of the path
    pub destination: SwitchId,
    /// Ids of all rules that were sent, in hop order (including failed ones)
    pub rules: Vec<FlowRuleId>,
    /// Hop indices (starting at 1) that were installed successfully
    pub succeeded: Vec<usize>,
    /// Hops that failed
    pub failed: Vec<HopFailure>,
    /// Rules of a previous path that were removed
    pub retracted: Vec<FlowRuleId>,
    /// Rules of a previous path that could not be removed
    pub retract_failed: Vec<(FlowRuleId, InstallError)>,
}

impl InstallReport {
    fn new(source: SwitchId, destination: SwitchId) -> Self {
        Self {
            source,
            destination,
            rules: Vec::new(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            retracted: Vec::new(),
            retract_failed: Vec::new(),
        }
    }

    /// Hop indices of all failed hops
    pub fn failed_hops(&self) -> Vec<usize> {
        self.failed.iter().map(|f| f.hop).collect()
    }

    /// Returns true if every hop was installed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// # Flow Installer
///
/// Installs paths on the controller. The installer remembers which rules it has installed for each
/// source-destination pair. If `retract_stale` is enabled, the rules of the previously installed
/// path that are not part of the new path are deleted after the new rules are installed.
#[derive(Debug)]
pub struct FlowInstaller<S> {
    southbound: S,
    retract_stale: bool,
    installed: HashMap<(SwitchId, SwitchId), Vec<(SwitchId, FlowRuleId)>>,
}

impl<S: Southbound> FlowInstaller<S> {
    /// Create a new installer. Stale rules are retracted by default.
    pub fn new(southbound: S) -> Self {
        Self { southbound, retract_stale: true, installed: HashMap::new() }
    }

    /// Enable or disable the retraction of stale rules.
    pub fn retract_stale(mut self, enable: bool) -> Self {
        self.retract_stale = enable;
        self
    }

    /// Access the southbound interface
    pub fn southbound(&self) -> &S {
        &self.southbound
    }

    /// Rules owned by the last path installed for a source-destination pair.
    pub fn installed_rules(
        &self,
        source: SwitchId,
        destination: SwitchId,
    ) -> &[(SwitchId, FlowRuleId)] {
        self.installed.get(&(source, destination)).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Build the rules for every hop of the path. Hops without a known egress port are returned as
    /// an error at the same position.
    pub fn build_rules(
        path: &Path,
        ports: &PortResolver,
        destination_addr: &str,
    ) -> Vec<(usize, FlowRuleId, Result<FlowRule, PortUnresolvedError>)> {
        let (source, destination) = (path.source(), path.destination());
        path.hops()
            .enumerate()
            .map(|(i, (current, next))| {
                let hop = i + 1;
                let id = FlowRuleId::new(source, destination, hop);
                let rule = ports.resolve_port(current, next).map(|port| {
                    FlowRule::new(id.clone(), current, destination_addr.to_string(), port)
                });
                (hop, id, rule)
            })
            .collect()
    }

    /// Install one rule per hop of the path. Every hop is attempted, regardless of failures on
    /// other hops. `destination_addr` is the address matched by all rules.
    pub fn install(
        &mut self,
        path: &Path,
        ports: &PortResolver,
        destination_addr: &str,
    ) -> InstallReport {
        let (source, destination) = (path.source(), path.destination());
        let mut report = InstallReport::new(source, destination);
        // every hop of the new path is owned by it, even when its rule could not be written
        let mut now_installed: Vec<(SwitchId, FlowRuleId)> = Vec::new();
        let rules = Self::build_rules(path, ports, destination_addr);

        for ((current, _), (hop, id, rule)) in path.hops().zip(rules) {
            report.rules.push(id.clone());
            now_installed.push((current, id.clone()));
            let rule = match rule {
                Ok(rule) => rule,
                Err(e) => {
                    warn!("Skipping hop {} ({}): {}", hop, id, e);
                    report.failed.push(HopFailure { hop, rule: id, error: e.into() });
                    continue;
                }
            };
            match self.southbound.upsert_flow(&rule) {
                Ok(()) => {
                    info!(
                        "Flow added successfully: {} on {} (port {})",
                        id, rule.node, rule.output_port
                    );
                    report.succeeded.push(hop);
                }
                Err(e) => {
                    warn!("Failed to add flow {}: {}", id, e);
                    report.failed.push(HopFailure { hop, rule: id, error: e.into() });
                }
            }
        }

        let previous = self.installed.insert((source, destination), now_installed.clone());

        if self.retract_stale {
            let keep: HashSet<(SwitchId, FlowRuleId)> = now_installed.into_iter().collect();
            for (node, id) in previous.into_iter().flatten() {
                if keep.contains(&(node, id.clone())) {
                    continue;
                }
                match self.southbound.delete_flow(node, FLOW_TABLE, &id) {
                    Ok(()) => {
                        info!("Removed stale flow {} from {}", id, node);
                        report.retracted.push(id);
                    }
                    Err(e) => {
                        warn!("Cannot remove stale flow {} from {}: {}", id, node, e);
                        report.retract_failed.push((id, e));
                    }
                }
            }
        }

        report
    }
}
