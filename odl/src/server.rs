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

//! # OpenDaylight Server
use crate::types::*;
use crate::{Error, Result};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use isahc::http::Request;
use isahc::prelude::*;
use log::*;

/// # OpenDaylight Controller Handle
#[derive(Debug, PartialEq, Clone)]
pub struct OdlServer {
    address: String,
    auth: Option<String>,
}

impl OdlServer {
    /// Create a new handle for the RESTCONF interface at the given host and port. No request is
    /// sent.
    pub fn new(host: impl AsRef<str>, port: u16) -> Self {
        Self { address: format!("http://{}:{}", host.as_ref(), port), auth: None }
    }

    /// Use basic authentication for all requests.
    pub fn with_credentials(mut self, user: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        let token = STANDARD.encode(format!("{}:{}", user.as_ref(), password.as_ref()));
        self.auth = Some(format!("Basic {}", token));
        self
    }

    /// Base address of the controller
    pub fn address(&self) -> &str {
        self.address.as_ref()
    }

    /// Path of a flow entry, relative to the RESTCONF root.
    pub fn flow_path(node: impl AsRef<str>, table: u8, flow_id: impl AsRef<str>) -> String {
        format!(
            "opendaylight-inventory:nodes/node/{}/flow-node-inventory:table/{}/flow/{}",
            node.as_ref(),
            table,
            flow_id.as_ref()
        )
    }

    /// Create or replace a flow entry on the node (e.g., `openflow:3`). Returns the status code
    /// of the response.
    pub fn put_flow(&self, node: impl AsRef<str>, flow: &Flow) -> Result<u16> {
        let key = Self::flow_path(node, flow.table_id, &flow.id);
        let data = serde_json::to_string(&FlowConfig { flow: flow.clone() })?;
        let (status, _) = self.request_put(key, data)?;
        Ok(status)
    }

    /// Delete a flow entry. Deleting an entry that does not exist succeeds.
    pub fn delete_flow(
        &self,
        node: impl AsRef<str>,
        table: u8,
        flow_id: impl AsRef<str>,
    ) -> Result<()> {
        match self.request_delete(Self::flow_path(node, table, flow_id)) {
            Ok(_) => Ok(()),
            Err(Error::ResponseError(404, _)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn request_put(&self, key: impl AsRef<str>, data: String) -> Result<(u16, String)> {
        let addr = format!("{}/restconf/config/{}", self.address, key.as_ref());
        debug!("PUT  {} {}", addr, data);
        let request = self.authorize(Request::put(&addr)).body(data)?;
        self.handle_response(request.send()?)
    }

    fn request_delete(&self, key: impl AsRef<str>) -> Result<(u16, String)> {
        let addr = format!("{}/restconf/config/{}", self.address, key.as_ref());
        debug!("DEL  {}", addr);
        let request = self.authorize(Request::delete(&addr)).body(())?;
        self.handle_response(request.send()?)
    }

    fn authorize(&self, builder: isahc::http::request::Builder) -> isahc::http::request::Builder {
        let builder =
            builder.header("Content-Type", "application/json").header("Accept", "application/json");
        match self.auth.as_ref() {
            Some(auth) => builder.header("Authorization", auth.as_str()),
            None => builder,
        }
    }

    fn handle_response(&self, mut response: Response<Body>) -> Result<(u16, String)> {
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(Error::ResponseError(status.as_u16(), text));
        }
        Ok((status.as_u16(), text))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn credentials() {
        let server = OdlServer::new("localhost", 8181).with_credentials("admin", "admin");
        assert_eq!(server.address(), "http://localhost:8181");
        assert_eq!(server.auth.as_deref(), Some("Basic YWRtaW46YWRtaW4="));
    }

    #[test]
    fn flow_path() {
        assert_eq!(
            OdlServer::flow_path("openflow:3", 0, "flow_s3_s6_1"),
            "opendaylight-inventory:nodes/node/openflow:3/flow-node-inventory:table/0/flow/flow_s3_s6_1"
        );
    }
}
