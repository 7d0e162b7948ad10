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

//! Shell access to the nodes of a running Mininet network
//!
//! Every Mininet node is a shell process whose command line ends with `mininet:<name>`. Commands
//! are executed inside the namespaces of that process with `mnexec -a <pid>`, the same way the
//! `m` utility of Mininet does it.

use sdnte::probe::Emulation;
use sdnte::ProcessError;

use log::*;

use std::collections::HashMap;
use std::process::Command;
use std::sync::Mutex;

/// Nodes of a Mininet network running on this machine. The process ids are looked up once per
/// node and cached.
#[derive(Debug, Default)]
pub struct MininetEmulation {
    pids: Mutex<HashMap<String, u32>>,
}

impl MininetEmulation {
    /// Create the handle. No process is looked up yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process id of the shell of `node`.
    pub fn pid(&self, node: &str) -> Result<u32, ProcessError> {
        if let Some(pid) = self.pids.lock().map_err(lock_error)?.get(node) {
            return Ok(*pid);
        }
        let pattern = format!("mininet:{}$", node);
        let output = Command::new("pgrep").args(&["-f", pattern.as_str()]).output().map_err(|e| {
            ProcessError::Exec {
                node: node.to_string(),
                cmd: format!("pgrep -f {}", pattern),
                reason: e.to_string(),
            }
        })?;
        let pid = parse_pgrep(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| ProcessError::UnknownNode(node.to_string()))?;
        debug!("Node {} has pid {}", node, pid);
        self.pids.lock().map_err(lock_error)?.insert(node.to_string(), pid);
        Ok(pid)
    }
}

impl Emulation for MininetEmulation {
    fn exec(&self, node: &str, cmd: &str) -> Result<String, ProcessError> {
        let pid = self.pid(node)?;
        let output = Command::new("mnexec")
            .args(&["-a", pid.to_string().as_str(), "sh", "-c", cmd])
            .output()
            .map_err(|e| ProcessError::Exec {
                node: node.to_string(),
                cmd: cmd.to_string(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            debug!(
                "[{}] {} exited with {}: {}",
                node,
                cmd,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// First process id in the output of `pgrep`.
fn parse_pgrep(output: &str) -> Option<u32> {
    output.lines().find_map(|l| l.trim().parse().ok())
}

fn lock_error<T>(_: T) -> ProcessError {
    ProcessError::Task(String::from("mininet"), String::from("pid cache is poisoned"))
}
