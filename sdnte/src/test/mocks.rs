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

//! Collaborators and fixtures shared by the tests

use crate::error::{InstallError, ProcessError};
use crate::flow::{FlowRule, FlowRuleId, Southbound};
use crate::topology::{SwitchId, TopologyDescriptor};

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Triangle with links (1-2, 5ms), (2-3, 3ms) and (1-3, 10ms). Port on `i` towards `j` is `j`.
pub fn triangle() -> TopologyDescriptor {
    let mut d = TopologyDescriptor::with_switches("triangle", 3);
    d.add_link(1, 2, 5.0);
    d.add_link(2, 3, 3.0);
    d.add_link(1, 3, 10.0);
    d.ports = vec![vec![0, 2, 3], vec![1, 0, 3], vec![1, 2, 0]];
    d
}

/// Decoded report of the traffic generator with the given average delay (in seconds).
pub fn itgdec_report(delay_s: f64) -> String {
    let block = format!(
        "Total time               =      9.990000 s\n\
         Total packets            =           100\n\
         Minimum delay            =      0.000064 s\n\
         Maximum delay            =      0.000410 s\n\
         Average delay            =      {:.6} s\n\
         Average jitter           =      0.000025 s\n\
         Delay standard deviation =      0.000050 s\n\
         Bytes received           =          1000\n\
         Average bitrate          =      0.800801 Kbit/s\n\
         Average packet rate      =     10.010010 pkt/s\n\
         Packets dropped          =             0 (0.00 %)\n\
         Average loss-burst size  =             0 pkt\n",
        delay_s
    );
    format!(
        "----------------------------------------------------------\n\
         Flow number: 1\n\
         From 10.0.0.100:40823\n\
         To    10.0.0.101:8999\n\
         ----------------------------------------------------------\n\
         {block}\
         ----------------------------------------------------------\n\
         \n\
         __________________________________________________________\n\
         ****************  TOTAL RESULTS   ******************\n\
         __________________________________________________________\n\
         Number of flows          =             1\n\
         {block}\
         Error lines              =             0\n\
         ----------------------------------------------------------\n",
        block = block
    )
}

/// Southbound interface recording every request. The status codes of the upserts are scripted;
/// once the script is exhausted, every request succeeds.
#[derive(Default)]
pub struct MockSouthbound {
    pub upserts: RefCell<Vec<FlowRule>>,
    pub deletes: RefCell<Vec<(SwitchId, FlowRuleId)>>,
    pub statuses: RefCell<VecDeque<u16>>,
}

impl MockSouthbound {
    pub fn with_statuses(statuses: Vec<u16>) -> Self {
        Self { statuses: RefCell::new(statuses.into()), ..Default::default() }
    }

    pub fn upserted_ids(&self) -> Vec<String> {
        self.upserts.borrow().iter().map(|r| r.id.to_string()).collect()
    }
}

impl Southbound for MockSouthbound {
    fn upsert_flow(&self, rule: &FlowRule) -> Result<(), InstallError> {
        self.upserts.borrow_mut().push(rule.clone());
        match self.statuses.borrow_mut().pop_front().unwrap_or(201) {
            200 | 201 => Ok(()),
            status => Err(InstallError::Rejected { status, body: String::from("error") }),
        }
    }

    fn delete_flow(&self, node: SwitchId, _table: u8, id: &FlowRuleId) -> Result<(), InstallError> {
        self.deletes.borrow_mut().push((node, id.clone()));
        Ok(())
    }
}

/// Emulated network recording all commands. The output of `ITGDec` on a node is taken from the
/// queue of that node, or from the default report if the queue is empty. Commands on nodes in
/// `broken` fail.
#[derive(Default)]
pub struct MockEmulation {
    pub commands: Mutex<Vec<(String, String)>>,
    pub reports: Mutex<HashMap<String, VecDeque<String>>>,
    pub default_report: String,
    pub broken: Vec<String>,
}

impl MockEmulation {
    pub fn new(default_report: String) -> Self {
        Self { default_report, ..Default::default() }
    }

    /// Queue a report for the receiver `node`
    pub fn push_report(&self, node: &str, report: String) {
        self.reports.lock().unwrap().entry(node.to_string()).or_default().push_back(report);
    }

    pub fn commands(&self) -> Vec<(String, String)> {
        self.commands.lock().unwrap().clone()
    }

    pub fn commands_on(&self, node: &str) -> Vec<String> {
        self.commands().into_iter().filter(|(n, _)| n == node).map(|(_, c)| c).collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.commands().iter().filter(|(_, c)| c.starts_with(prefix)).count()
    }
}

impl crate::probe::Emulation for MockEmulation {
    fn exec(&self, node: &str, cmd: &str) -> Result<String, ProcessError> {
        self.commands.lock().unwrap().push((node.to_string(), cmd.to_string()));
        if self.broken.iter().any(|b| b == node) {
            return Err(ProcessError::Exec {
                node: node.to_string(),
                cmd: cmd.to_string(),
                reason: String::from("node is down"),
            });
        }
        if cmd.starts_with("ITGDec") {
            let queued = self.reports.lock().unwrap().get_mut(node).and_then(|q| q.pop_front());
            Ok(queued.unwrap_or_else(|| self.default_report.clone()))
        } else {
            Ok(String::new())
        }
    }
}
