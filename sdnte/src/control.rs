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

//! # Control Loop
//!
//! The control loop sequences the measurement of link delays, the computation of the shortest
//! path, and the installation of the flow rules:
//!
//! ```text
//! Idle -> MeasuringBaseline -> PathComputed -> Installed -> MeasuringAdaptive -> PathRecomputed
//!                                                  ^                                    |
//!                                                  +------------------------------------+
//! ```
//!
//! Besides re-measuring, a scenario may change the delays of the active path on the emulated
//! network ([`ControlLoop::perturb`]), after which the path is recomputed the same way.
//!
//! The loop owns the topology, the port resolver and the active path. Components only borrow
//! them for the duration of a single call.

use crate::error::{DelayChangeError, Error, ProcessError};
use crate::flow::{FlowInstaller, InstallReport, Southbound};
use crate::history::{FallbackRange, HistoricalDelays, MeasurementLog};
use crate::path::{shortest_path, Metric, Path};
use crate::printer;
use crate::probe::{DelayProbe, Emulation, ProbeConfig, ProbeOutcome};
use crate::topology::{LinkWeight, PortResolver, SwitchId, Topology};

use log::*;
use rand::Rng;
use std::io::Write;

/// State of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing has happened yet
    Idle,
    /// The initial weights are being established
    MeasuringBaseline,
    /// A path was computed from the baseline weights
    PathComputed,
    /// The rules of the active path are installed
    Installed,
    /// The links are re-measured
    MeasuringAdaptive,
    /// The delays of the active path are changed on the emulated network
    Perturbing,
    /// A path was computed from the updated weights
    PathRecomputed,
}

/// Which links are re-measured in every adaptive iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptiveScope {
    /// All links of the topology
    All,
    /// Only the links of the active path
    ActivePath,
}

impl Default for AdaptiveScope {
    fn default() -> Self {
        AdaptiveScope::All
    }
}

/// Parameters of the control loop
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    /// Source switch of the route
    pub source: SwitchId,
    /// Destination switch of the route
    pub destination: SwitchId,
    /// Number of adaptive iterations after the initial installation
    pub iterations: usize,
    /// Metric used for the path computation
    pub metric: Metric,
    /// Links re-measured in every adaptive iteration
    pub scope: AdaptiveScope,
    /// Generate background load on the active path while re-measuring
    pub background_load: bool,
    /// Measure all links before computing the first path. If disabled, the weights of the
    /// topology (e.g., seeded from history) are used as baseline.
    pub measure_baseline: bool,
    /// Number of pings from the source host to the destination host after every installation
    pub ping_count: Option<u32>,
}

impl ControlConfig {
    /// Configuration with a single adaptive iteration, using the delay metric.
    pub fn new(source: SwitchId, destination: SwitchId) -> Self {
        Self {
            source,
            destination,
            iterations: 1,
            metric: Metric::default(),
            scope: AdaptiveScope::default(),
            background_load: true,
            measure_baseline: false,
            ping_count: None,
        }
    }
}

/// Outcome of a single pass through the loop. Iteration 0 is the baseline.
#[derive(Debug, Clone)]
pub struct IterationReport {
    /// Iteration number
    pub iteration: usize,
    /// Measurements of this iteration (empty if nothing was measured)
    pub probe: ProbeOutcome,
    /// Computed path, or `None` if the destination was unreachable
    pub path: Option<Path>,
    /// True if the computed path differs from the previously active one
    pub rerouted: bool,
    /// Result of the installation, if a path was installed
    pub install: Option<InstallReport>,
    /// Link delays changed on the emulated network before computing the path
    pub changes: Vec<DelayChange>,
}

/// New delay of a link, applied to the emulated network and to the topology.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayChange {
    /// First endpoint
    pub a: SwitchId,
    /// Second endpoint
    pub b: SwitchId,
    /// Weight before the change
    pub old: LinkWeight,
    /// Delay in milliseconds
    pub delay: LinkWeight,
}

/// # Control Loop
///
/// Drives the measure, compute and install cycle for a single source and destination.
pub struct ControlLoop<E: Emulation, S: Southbound> {
    topo: Topology,
    ports: PortResolver,
    installer: FlowInstaller<S>,
    emu: E,
    probe_config: ProbeConfig,
    config: ControlConfig,
    destination_addr: String,
    state: LoopState,
    active: Option<Path>,
    measurement_log: Option<MeasurementLog<Box<dyn Write>>>,
}

impl<E: Emulation, S: Southbound> ControlLoop<E, S> {
    /// Create a new control loop. Fails if the source or the destination is not part of the
    /// topology.
    pub fn new(
        topo: Topology,
        ports: PortResolver,
        emu: E,
        installer: FlowInstaller<S>,
        probe_config: ProbeConfig,
        config: ControlConfig,
    ) -> Result<Self, Error> {
        for id in [config.source, config.destination].iter() {
            if !topo.contains(*id) {
                return Err(Error::UnknownSwitch(*id));
            }
        }
        let destination_addr = topo.host_addr(config.destination);
        Ok(Self {
            topo,
            ports,
            installer,
            emu,
            probe_config,
            config,
            destination_addr,
            state: LoopState::Idle,
            active: None,
            measurement_log: None,
        })
    }

    /// Append every successful link measurement to the log.
    pub fn with_measurement_log(mut self, log: MeasurementLog<Box<dyn Write>>) -> Self {
        self.measurement_log = Some(log);
        self
    }

    /// Current state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The topology with the current weights
    pub fn topology(&self) -> &Topology {
        &self.topo
    }

    /// The path whose rules were installed last
    pub fn active_path(&self) -> Option<&Path> {
        self.active.as_ref()
    }

    /// The flow installer
    pub fn installer(&self) -> &FlowInstaller<S> {
        &self.installer
    }

    /// The emulated network
    pub fn emulation(&self) -> &E {
        &self.emu
    }

    /// Run the baseline and all adaptive iterations. Returns one report per pass.
    pub fn run(&mut self) -> Vec<IterationReport> {
        let mut reports = Vec::with_capacity(self.config.iterations + 1);
        reports.push(self.baseline());
        for iteration in 1..=self.config.iterations {
            reports.push(self.adapt(iteration));
        }
        reports
    }

    /// Establish the baseline weights, compute the first path and install it.
    pub fn baseline(&mut self) -> IterationReport {
        self.transition(LoopState::MeasuringBaseline);
        let probe = if self.config.measure_baseline {
            let links: Vec<(SwitchId, SwitchId)> =
                self.topo.links().into_iter().map(|(a, b, _)| (a, b)).collect();
            self.measure(&links, &[])
        } else {
            ProbeOutcome::default()
        };
        info!("Cost matrix:\n{}", printer::cost_matrix(&self.topo));
        self.route(0, probe)
    }

    /// Re-measure the links (with background load on the active path, if enabled), recompute the
    /// path and install it.
    pub fn adapt(&mut self, iteration: usize) -> IterationReport {
        info!("Iteration {}", iteration);
        self.transition(LoopState::MeasuringAdaptive);
        let path_links: Vec<(SwitchId, SwitchId)> =
            self.active.as_ref().map(|p| p.hops().collect()).unwrap_or_default();
        let links: Vec<(SwitchId, SwitchId)> = match self.config.scope {
            AdaptiveScope::ActivePath if !path_links.is_empty() => path_links.clone(),
            _ => self.topo.links().into_iter().map(|(a, b, _)| (a, b)).collect(),
        };
        let loaded = if self.config.background_load { path_links } else { Vec::new() };
        let probe = self.measure(&links, &loaded);
        info!("Cost matrix:\n{}", printer::cost_matrix(&self.topo));
        self.route(iteration, probe)
    }

    /// Change the delay of every link of the active path, both on the emulated network and in the
    /// topology, then recompute the path and install it. The new delay of a link is the largest
    /// historical value, or a random value from `fallback`. A link whose delay cannot be changed
    /// on the network keeps its weight.
    pub fn perturb<R: Rng>(
        &mut self,
        iteration: usize,
        history: &HistoricalDelays,
        fallback: &FallbackRange,
        rng: &mut R,
    ) -> IterationReport {
        info!("Iteration {}: changing the delays of the active path", iteration);
        self.transition(LoopState::Perturbing);
        let links: Vec<(SwitchId, SwitchId)> =
            self.active.as_ref().map(|p| p.hops().collect()).unwrap_or_default();

        let mut changes = Vec::with_capacity(links.len());
        for (a, b) in links {
            let delay = history.perturbed_delay(a, b, fallback, rng);
            if let Err(e) = self.apply_delay(a, b, delay) {
                warn!("Cannot change the delay of {} <-> {}: {}", a, b, e);
                continue;
            }
            match self.topo.set_weight(a, b, delay) {
                Ok(old) => {
                    info!("Delay between {} and {} changed from {}ms to {}ms", a, b, old, delay);
                    changes.push(DelayChange { a, b, old, delay });
                }
                Err(e) => warn!("{}", e),
            }
        }

        info!("Cost matrix:\n{}", printer::cost_matrix(&self.topo));
        let mut report = self.route(iteration, ProbeOutcome::default());
        report.changes = changes;
        report
    }

    /// Change the netem delay of both interfaces of the link `a -- b`.
    fn apply_delay(
        &self,
        a: SwitchId,
        b: SwitchId,
        delay: LinkWeight,
    ) -> Result<(), DelayChangeError> {
        for (current, next) in [(a, b), (b, a)].iter() {
            let port = self.ports.resolve_port(*current, *next)?;
            let node = current.to_string();
            let cmd =
                format!("tc qdisc change dev {}-eth{} root netem delay {}ms", node, port, delay);
            self.emu.exec(&node, &cmd)?;
        }
        Ok(())
    }

    /// Measure the links and write the measurements into the log.
    fn measure(
        &mut self,
        links: &[(SwitchId, SwitchId)],
        loaded: &[(SwitchId, SwitchId)],
    ) -> ProbeOutcome {
        let probe = DelayProbe::new(&self.emu, &self.probe_config);
        let outcome = if loaded.is_empty() {
            probe.measure(links, &mut self.topo)
        } else {
            probe.measure_with_load(links, loaded, &mut self.topo)
        };
        if let Some(log) = self.measurement_log.as_mut() {
            for m in outcome.measured.iter() {
                if let Err(e) = log.append(m.src, m.dst, m.report.delay) {
                    warn!("Cannot write measurement of {} <-> {}: {}", m.src, m.dst, e);
                }
            }
        }
        outcome
    }

    /// Compute the path, and install it if one exists.
    fn route(&mut self, iteration: usize, probe: ProbeOutcome) -> IterationReport {
        let (source, destination) = (self.config.source, self.config.destination);
        let path = match shortest_path(&self.topo, source, destination, self.config.metric) {
            Ok(path) => path,
            Err(e) => {
                warn!("{}; keeping the previous path", e);
                return IterationReport {
                    iteration,
                    probe,
                    path: None,
                    rerouted: false,
                    install: None,
                    changes: Vec::new(),
                };
            }
        };

        let rerouted = self.active.as_ref().map(|p| !p.same_route(&path)).unwrap_or(true);
        if iteration == 0 {
            self.transition(LoopState::PathComputed);
        } else {
            self.transition(LoopState::PathRecomputed);
        }
        if rerouted {
            info!("New path ({}): {}", self.config.metric, printer::path(&path));
        } else {
            info!("Path unchanged ({}): {}", self.config.metric, printer::path(&path));
        }

        let report = self.installer.install(&path, &self.ports, &self.destination_addr);
        if !report.is_complete() {
            warn!("Hops {:?} of {} are not installed", report.failed_hops(), path);
        }
        self.active = Some(path.clone());
        self.transition(LoopState::Installed);

        if let Some(count) = self.config.ping_count {
            if let Err(e) = self.ping(count) {
                warn!("Connectivity check failed: {}", e);
            }
        }

        IterationReport {
            iteration,
            probe,
            path: Some(path),
            rerouted,
            install: Some(report),
            changes: Vec::new(),
        }
    }

    /// Ping the destination host from the source host.
    fn ping(&self, count: u32) -> Result<(), ProcessError> {
        let src = self.config.source.host_name();
        let dst_ip = self.destination_addr.split('/').next().unwrap_or_default();
        let output = self.emu.exec(&src, &format!("ping -c {} {}", count, dst_ip))?;
        info!("ping {} -> {}:\n{}", src, dst_ip, output);
        Ok(())
    }

    fn transition(&mut self, next: LoopState) {
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Measure all links of the topology `rounds` times, and write every successful measurement into
/// the log. Returns the number of successful and failed link measurements.
pub fn collect_dataset<E: Emulation, W: Write>(
    topo: &mut Topology,
    emu: &E,
    probe_config: &ProbeConfig,
    rounds: usize,
    log: &mut MeasurementLog<W>,
) -> Result<(usize, usize), Error> {
    let links: Vec<(SwitchId, SwitchId)> =
        topo.links().into_iter().map(|(a, b, _)| (a, b)).collect();
    let probe = DelayProbe::new(emu, probe_config);
    let (mut succeeded, mut failed) = (0, 0);
    for round in 1..=rounds {
        info!("Measurement round {}/{}", round, rounds);
        let outcome = probe.measure(&links, topo);
        for m in outcome.measured.iter() {
            log.append(m.src, m.dst, m.report.delay)?;
        }
        succeeded += outcome.measured.len();
        failed += outcome.failed.len();
    }
    Ok((succeeded, failed))
}
