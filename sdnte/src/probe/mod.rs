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

//! # Delay Probe
//!
//! Measures the delay of physical links by running the traffic generator between both endpoints
//! of a link, and writes the measured delay back into the topology. While measuring, background
//! traffic can be generated on the links of the active path, see [`BackgroundLoad`].

mod report;

pub use report::{parse_report, ProbeReport, ReportParseMode};

use crate::error::{ProbeParseError, ProcessError, TopologyError};
use crate::topology::{LinkWeight, SwitchId, Topology};

use log::*;
use thiserror::Error;

use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Duration;

/// # Emulated Network
///
/// Access to the nodes of the emulated network. Every node (switch or host) is addressed by its
/// name, e.g., `s3` or `h3`. The emulation is shared with the background load tasks, and must
/// therefore be `Sync`.
pub trait Emulation: Sync {
    /// Execute a shell command on the node and return its output. The call blocks until the
    /// command has finished.
    fn exec(&self, node: &str, cmd: &str) -> Result<String, ProcessError>;
}

/// Parameters of the traffic generator
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Temporary address of the sending endpoint
    pub src_addr: String,
    /// Temporary address of the receiving endpoint
    pub dst_addr: String,
    /// Netmask of the temporary addresses
    pub netmask: String,
    /// Time to wait after starting the receiver
    pub receiver_settle: Duration,
    /// Workload of the sender while measuring (without destination and log options)
    pub sender_args: String,
    /// Time to wait after the sender has finished, before decoding the report
    pub sender_wait: Duration,
    /// Log file of the sender
    pub sender_log: String,
    /// Log file of the receiver
    pub receiver_log: String,
    /// Time to wait after starting the receiver of a background load task
    pub load_settle: Duration,
    /// Workload of the background load task
    pub load_args: String,
    /// How to decode the report
    pub parse_mode: ReportParseMode,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            src_addr: String::from("10.0.0.100"),
            dst_addr: String::from("10.0.0.101"),
            netmask: String::from("255.0.0.0"),
            receiver_settle: Duration::from_secs(2),
            sender_args: String::from("-T UDP -c 100 -C 10 -t 10000"),
            sender_wait: Duration::from_secs(0),
            sender_log: String::from("sender.log"),
            receiver_log: String::from("receiver.log"),
            load_settle: Duration::from_secs(1),
            load_args: String::from("-T UDP -c 128 -C 150 -t 60000"),
            parse_mode: ReportParseMode::default(),
        }
    }
}

impl ProbeConfig {
    /// Configuration without any waiting time.
    pub fn without_waiting() -> Self {
        Self {
            receiver_settle: Duration::from_secs(0),
            sender_wait: Duration::from_secs(0),
            load_settle: Duration::from_secs(0),
            ..Default::default()
        }
    }

    /// Set the parsing mode
    pub fn parse_mode(mut self, mode: ReportParseMode) -> Self {
        self.parse_mode = mode;
        self
    }
}

/// Reason why a single link could not be measured. The weight of the link is left unchanged.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum LinkProbeError {
    /// A command failed on one of the endpoints
    #[error("Process Error: {0}")]
    Process(#[from] ProcessError),
    /// The decoded report was malformed
    #[error("Cannot parse the report: {0}")]
    Parse(#[from] ProbeParseError),
    /// The measured delay cannot be written into the topology
    #[error("Cannot update the weight: {0}")]
    Weight(#[from] TopologyError),
}

/// A successful measurement of a single link
#[derive(Debug, Clone, PartialEq)]
pub struct LinkMeasurement {
    /// Sending endpoint
    pub src: SwitchId,
    /// Receiving endpoint
    pub dst: SwitchId,
    /// Extracted values
    pub report: ProbeReport,
    /// Weight of the link before the measurement
    pub previous: LinkWeight,
}

/// Result of a measurement pass
#[derive(Debug, Clone, Default)]
pub struct ProbeOutcome {
    /// All links that were measured successfully, in measurement order
    pub measured: Vec<LinkMeasurement>,
    /// All links that could not be measured
    pub failed: Vec<((SwitchId, SwitchId), LinkProbeError)>,
    /// Background load tasks that failed
    pub load_failures: Vec<ProcessError>,
}

/// # Delay Probe
///
/// Measures links one after the other. For each link `(src, dst)`, the probe
///
/// 1. assigns the temporary addresses to both endpoints,
/// 2. starts the receiver on `dst` and waits for it to settle,
/// 3. runs the bounded sender workload on `src`,
/// 4. decodes the report of the receiver,
/// 5. writes the delay into the topology, and
/// 6. cleans up both endpoints (this step runs even if a previous one failed).
pub struct DelayProbe<'a, E: Emulation> {
    emu: &'a E,
    config: &'a ProbeConfig,
}

impl<'a, E: Emulation> DelayProbe<'a, E> {
    /// Create a new probe
    pub fn new(emu: &'a E, config: &'a ProbeConfig) -> Self {
        Self { emu, config }
    }

    /// Measure all links serially and update their weights. Failures are logged and recorded,
    /// and the weight of the affected link is left untouched.
    pub fn measure(&self, links: &[(SwitchId, SwitchId)], topo: &mut Topology) -> ProbeOutcome {
        let mut outcome = ProbeOutcome::default();
        for &(src, dst) in links {
            if !topo.is_adjacent(src, dst) {
                warn!("Skip probing {} -> {}: {}", src, dst, TopologyError::NoSuchLink(src, dst));
                outcome.failed.push(((src, dst), TopologyError::NoSuchLink(src, dst).into()));
                continue;
            }
            let result = self
                .measure_link(src, dst)
                .and_then(|report| Ok((topo.set_weight(src, dst, report.delay)?, report)));
            match result {
                Ok((previous, report)) => {
                    info!(
                        "Link {} <-> {}: delay {:.6}ms (was {:.6}ms)",
                        src, dst, report.delay, previous
                    );
                    outcome.measured.push(LinkMeasurement { src, dst, report, previous });
                }
                Err(e) => {
                    warn!("Cannot measure link {} <-> {}: {}", src, dst, e);
                    outcome.failed.push(((src, dst), e));
                }
            }
        }
        outcome
    }

    /// Start one background load task per link in `loaded`, measure all `links`, and wait for
    /// all load tasks to complete before returning.
    pub fn measure_with_load(
        &self,
        links: &[(SwitchId, SwitchId)],
        loaded: &[(SwitchId, SwitchId)],
        topo: &mut Topology,
    ) -> ProbeOutcome {
        thread::scope(|s| {
            let load = BackgroundLoad::start(s, self.emu, self.config, loaded);
            let mut outcome = self.measure(links, topo);
            outcome.load_failures = load.join();
            outcome
        })
    }

    /// Measure a single link, without modifying the topology. The endpoints are always cleaned
    /// up, even if the measurement fails.
    pub fn measure_link(
        &self,
        src: SwitchId,
        dst: SwitchId,
    ) -> Result<ProbeReport, LinkProbeError> {
        let result = self.run_generator(src, dst);
        self.cleanup(src, dst);
        let raw = result?;
        parse_report(&raw, self.config.parse_mode).map_err(|e| {
            debug!("Malformed report of {} -> {}:\n{}", src, dst, raw);
            LinkProbeError::Parse(e)
        })
    }

    fn run_generator(&self, src: SwitchId, dst: SwitchId) -> Result<String, ProcessError> {
        let c = self.config;
        let (s, d) = (src.name(), dst.name());
        self.exec(&s, &format!("ifconfig {} {} netmask {}", s, c.src_addr, c.netmask))?;
        self.exec(&d, &format!("ifconfig {} {} netmask {}", d, c.dst_addr, c.netmask))?;
        self.exec(&d, "nohup ITGRecv > /dev/null 2>&1 &")?;
        sleep(c.receiver_settle);
        self.exec(
            &s,
            &format!(
                "ITGSend {} -a {} -l {} -x {}",
                c.sender_args, c.dst_addr, c.sender_log, c.receiver_log
            ),
        )?;
        sleep(c.sender_wait);
        self.exec(&d, &format!("ITGDec {}", c.receiver_log))
    }

    fn cleanup(&self, src: SwitchId, dst: SwitchId) {
        let c = self.config;
        let (s, d) = (src.name(), dst.name());
        let commands = [
            (&s, format!("rm -f {} {}", c.sender_log, c.receiver_log)),
            (&d, format!("rm -f {} {}", c.sender_log, c.receiver_log)),
            (&d, String::from("pkill ITGRecv")),
            (&d, String::from("pkill ITGLog")),
            (&s, format!("ifconfig {} 0.0.0.0", s)),
            (&d, format!("ifconfig {} 0.0.0.0", d)),
        ];
        for (node, cmd) in commands.iter() {
            if let Err(e) = self.exec(node, cmd) {
                warn!("Cleanup failed: {}", e);
            }
        }
    }

    fn exec(&self, node: &str, cmd: &str) -> Result<String, ProcessError> {
        debug!("[{}] {}", node, cmd);
        self.emu.exec(node, cmd)
    }
}

/// # Background Load
///
/// A set of load generation tasks, one per link, running in a thread scope. The tasks do not touch
/// the topology. [`BackgroundLoad::join`] is the barrier at which the measurement pass waits for
/// all tasks to complete.
pub struct BackgroundLoad<'scope> {
    tasks: Vec<(String, ScopedJoinHandle<'scope, Result<(), ProcessError>>)>,
}

impl<'scope> BackgroundLoad<'scope> {
    /// Start one task for every link. Each task starts a receiver on the second endpoint, waits
    /// for it to settle, and starts a detached sender on the first endpoint.
    pub fn start<'env, E: Emulation>(
        scope: &'scope Scope<'scope, 'env>,
        emu: &'env E,
        config: &'env ProbeConfig,
        links: &[(SwitchId, SwitchId)],
    ) -> Self {
        let tasks = links
            .iter()
            .map(|&(src, dst)| {
                let name = format!("{} -> {}", src, dst);
                let handle = scope.spawn(move || -> Result<(), ProcessError> {
                    let (s, d) = (src.name(), dst.name());
                    emu.exec(&d, "nohup ITGRecv > /dev/null 2>&1 &")?;
                    sleep(config.load_settle);
                    emu.exec(
                        &s,
                        &format!(
                            "nohup ITGSend {} -a {} > /dev/null 2>&1 &",
                            config.load_args, config.dst_addr
                        ),
                    )?;
                    Ok(())
                });
                info!("Started background load on {}", name);
                (name, handle)
            })
            .collect();
        Self { tasks }
    }

    /// Number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if no task was started
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for all tasks to complete, and return the errors of all tasks that failed.
    pub fn join(self) -> Vec<ProcessError> {
        let mut errors = Vec::new();
        for (name, handle) in self.tasks {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Background load on {} failed: {}", name, e);
                    errors.push(e);
                }
                Err(_) => {
                    warn!("Background load on {} panicked", name);
                    errors.push(ProcessError::Task(name, String::from("panicked")));
                }
            }
        }
        errors
    }
}

fn sleep(duration: Duration) {
    if duration > Duration::from_secs(0) {
        thread::sleep(duration);
    }
}
