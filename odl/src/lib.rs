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

//! # OpenDaylight RESTCONF API
//!
//! This is a very small crate to manage the flow tables of OpenFlow switches through the RESTCONF
//! interface of an OpenDaylight controller.
//!
//! ```no_run
//! use odl::{Flow, OdlServer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // connect to the controller
//!     let server = OdlServer::new("localhost", 8181).with_credentials("admin", "admin");
//!
//!     // forward all traffic towards 10.0.0.3/24 on switch 1 out of port 2
//!     let flow = Flow::output_to("flow_s1_s3_1", 0, 1000, "dest-ip-flow", "10.0.0.3/24", 2, 65535);
//!     server.put_flow("openflow:1", &flow)?;
//!
//!     // and remove it again
//!     server.delete_flow("openflow:1", 0, "flow_s1_s3_1")?;
//!     Ok(())
//! }
//! ```
#![deny(missing_docs)]

mod server;
mod types;
pub use server::OdlServer;
pub use types::*;

use thiserror::Error;

/// # OpenDaylight Error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error during handling of the HTTP request
    #[allow(clippy::upper_case_acronyms)]
    #[error("HTTP Error: {0}")]
    HTTPError(#[from] isahc::Error),
    /// Cannot build the HTTP request
    #[error("Invalid Request: {0}")]
    RequestError(#[from] isahc::http::Error),
    /// Cannot serialize the request or deserialize the response
    #[error("Cannot handle JSON: {0}")]
    JsonError(#[from] serde_json::error::Error),
    /// IO Error
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    /// HTTP Response Error
    #[error("HTTP Response Error: {0}. Message:\n{1}")]
    ResponseError(u16, String),
}

/// OpenDaylight Result type
type Result<T> = core::result::Result<T, Error>;
