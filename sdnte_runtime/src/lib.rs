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

//! # Runtime System
//!
//! This crate connects the control loop of [`sdnte`] to a running network: the nodes of a Mininet
//! network ([`mininet_conn`]) or of a GNS3 project ([`telnet_conn`]), and the flow tables of an
//! OpenDaylight controller ([`southbound`]). For simplified usage, check the functions
//! [`perform_adaptive_routing`] and [`perform_dataset_measurement`].

#![deny(missing_docs, missing_debug_implementations)]

pub mod mininet_conn;
pub mod southbound;
pub mod telnet_conn;

use sdnte::control::{collect_dataset, ControlConfig, ControlLoop, IterationReport};
use sdnte::flow::{FlowInstaller, Southbound};
use sdnte::history::{FallbackRange, HistoricalDelays, MeasurementLog};
use sdnte::probe::{Emulation, ProbeConfig};
use sdnte::topology::{PortResolver, Topology, TopologyDescriptor};

use log::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Parameters of [`perform_adaptive_routing`]
#[derive(Debug, Clone)]
pub struct RoutingParams {
    /// Parameters of the control loop
    pub control: ControlConfig,
    /// Parameters of the traffic generator
    pub probe: ProbeConfig,
    /// CSV file with historical delays. If set, the link delays of the descriptor are replaced by
    /// the historical values before the topology is built.
    pub history: Option<PathBuf>,
    /// Range of the random delays for links without history
    pub fallback: FallbackRange,
    /// Accept historical rows recorded in the opposite orientation of a link
    pub either_orientation: bool,
    /// After the last iteration, change the delays of the active path on the emulated network
    /// and recompute the path once more
    pub perturb: bool,
    /// Range of the random delays while perturbing links without history
    pub perturb_fallback: FallbackRange,
    /// Seed for the random delays. If not set, the generator is seeded from the OS.
    pub seed: Option<u64>,
    /// Remove the rules of a previous path after installing a new one
    pub retract_stale: bool,
    /// CSV file to which every link measurement is appended
    pub measurement_log: Option<PathBuf>,
    /// Store the descriptor after seeding it (e.g., to configure the emulator with the same
    /// delays)
    pub seeded_descriptor: Option<PathBuf>,
}

impl RoutingParams {
    /// Parameters without history or measurement log. Stale rules are retracted.
    pub fn new(control: ControlConfig, probe: ProbeConfig) -> Self {
        Self {
            control,
            probe,
            history: None,
            fallback: FallbackRange::default(),
            either_orientation: false,
            perturb: false,
            perturb_fallback: FallbackRange::perturbation(),
            seed: None,
            retract_stale: true,
            measurement_log: None,
            seeded_descriptor: None,
        }
    }
}

/// # Perform adaptive routing
///
/// Route the traffic from the source to the destination along the path with the smallest cost,
/// and adapt the route as the link delays change.
///
/// This function does the following:
///
/// 1. Seed the link delays of the descriptor from the history (if given). Links without history
///    get a random delay from the fallback range.
/// 2. Build the topology and the port resolver from the descriptor.
/// 3. Run the control loop: establish the baseline, compute and install the first path, and then
///    re-measure, recompute and reinstall the path for the configured number of iterations.
///    Without history, the baseline is always measured.
/// 4. If enabled, change the delays of the active path on the emulated network, and recompute
///    and reinstall the path a last time.
///
/// Failures of single links or hops are logged and reported in the returned iteration reports.
/// Only setup failures (e.g., an unreadable history file) are returned as error.
pub fn perform_adaptive_routing<E: Emulation, S: Southbound>(
    mut descriptor: TopologyDescriptor,
    emu: E,
    southbound: S,
    params: &RoutingParams,
) -> Result<Vec<IterationReport>, Box<dyn Error>> {
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let history = match params.history.as_ref() {
        Some(path) => {
            info!("Seeding the link delays from {}", path.display());
            let history = HistoricalDelays::from_path(path)?
                .match_either_orientation(params.either_orientation);
            history.seed_descriptor(&mut descriptor, &params.fallback, &mut rng);
            Some(history)
        }
        None => None,
    };
    if let Some(path) = params.seeded_descriptor.as_ref() {
        descriptor.to_file(path)?;
        info!("Stored the seeded topology in {}", path.display());
    }

    let topo = Topology::build(&descriptor)?;
    let ports = PortResolver::new(&descriptor.port_table(), &topo);
    if !ports.missing().is_empty() {
        warn!("{} directed links have no egress port", ports.missing().len());
    }
    info!(
        "Topology {}: {} switches, {} links",
        topo.name(),
        topo.num_switches(),
        topo.num_links()
    );

    let mut config = params.control.clone();
    if history.is_none() && !config.measure_baseline {
        info!("No history given, measuring the baseline");
        config.measure_baseline = true;
    }

    let installer = FlowInstaller::new(southbound).retract_stale(params.retract_stale);
    let mut control =
        ControlLoop::new(topo, ports, emu, installer, params.probe.clone(), config)?;
    if let Some(path) = params.measurement_log.as_ref() {
        let writer: Box<dyn Write> = Box::new(File::create(path)?);
        control = control.with_measurement_log(MeasurementLog::from_writer(writer)?);
    }

    let mut reports = control.run();
    if params.perturb {
        let history = history.unwrap_or_default();
        let iteration = reports.len();
        reports.push(control.perturb(iteration, &history, &params.perturb_fallback, &mut rng));
    }

    let rerouted = reports.iter().filter(|r| r.iteration > 0 && r.rerouted).count();
    let incomplete = reports
        .iter()
        .filter(|r| r.install.as_ref().map(|i| !i.is_complete()).unwrap_or(true))
        .count();
    info!(
        "Finished {} iterations: rerouted {} times, {} passes without complete installation",
        reports.len() - 1,
        rerouted,
        incomplete
    );
    if let Some(path) = control.active_path() {
        info!("Final path: {}", sdnte::printer::path(path));
    }

    Ok(reports)
}

/// # Perform the dataset measurement
///
/// Measure every link of the topology `rounds` times, and write all successful measurements into
/// the CSV file `output`. No flow rule is installed. Returns the number of successful and failed
/// link measurements.
pub fn perform_dataset_measurement<E: Emulation>(
    descriptor: &TopologyDescriptor,
    emu: &E,
    probe: &ProbeConfig,
    rounds: usize,
    output: impl Into<PathBuf>,
) -> Result<(usize, usize), Box<dyn Error>> {
    let output = output.into();
    let mut topo = Topology::build(descriptor)?;
    let mut log = MeasurementLog::create(&output)?;
    info!("Measuring {} links of {} in {} rounds", topo.num_links(), topo.name(), rounds);
    let (succeeded, failed) = collect_dataset(&mut topo, emu, probe, rounds, &mut log)?;
    info!("Stored {} measurements in {} ({} failed)", log.rows(), output.display(), failed);
    Ok((succeeded, failed))
}
