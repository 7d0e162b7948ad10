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

//! Southbound interface backed by the RESTCONF API of an OpenDaylight controller

use odl::{Flow, OdlServer};
use sdnte::flow::{FlowRule, FlowRuleId, Southbound};
use sdnte::topology::SwitchId;
use sdnte::InstallError;

use log::*;

/// Flow-table access through an OpenDaylight controller. Every rule is written to the config
/// datastore of the node `openflow:<id>`.
#[derive(Debug, Clone)]
pub struct OdlSouthbound {
    server: OdlServer,
}

impl OdlSouthbound {
    /// Use the given controller
    pub fn new(server: OdlServer) -> Self {
        Self { server }
    }

    /// Returns the controller
    pub fn server(&self) -> &OdlServer {
        &self.server
    }
}

impl Southbound for OdlSouthbound {
    fn upsert_flow(&self, rule: &FlowRule) -> Result<(), InstallError> {
        let flow = flow_of(rule);
        let status = self.server.put_flow(rule.node.openflow_id(), &flow).map_err(install_error)?;
        debug!("PUT {} on {}: {}", rule.id, rule.node.openflow_id(), status);
        Ok(())
    }

    fn delete_flow(&self, node: SwitchId, table: u8, id: &FlowRuleId) -> Result<(), InstallError> {
        self.server.delete_flow(node.openflow_id(), table, id.as_str()).map_err(install_error)
    }
}

/// Translate the rule into the RESTCONF representation.
pub fn flow_of(rule: &FlowRule) -> Flow {
    Flow::output_to(
        rule.id.as_str(),
        rule.table,
        rule.priority,
        rule.name.as_str(),
        rule.destination_addr.as_str(),
        rule.output_port,
        rule.max_length,
    )
}

fn install_error(e: odl::Error) -> InstallError {
    match e {
        odl::Error::ResponseError(status, body) => InstallError::Rejected { status, body },
        e => InstallError::Transport(e.to_string()),
    }
}
