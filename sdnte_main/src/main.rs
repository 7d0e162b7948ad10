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

use odl::OdlServer;
use sdnte::control::{AdaptiveScope, ControlConfig};
use sdnte::history::FallbackRange;
use sdnte::path::{shortest_path, Metric};
use sdnte::printer;
use sdnte::probe::{ProbeConfig, ReportParseMode};
use sdnte::topology::{SwitchId, Topology};
use sdnte_runtime::mininet_conn::MininetEmulation;
use sdnte_runtime::southbound::OdlSouthbound;
use sdnte_runtime::telnet_conn::TelnetEmulation;
use sdnte_runtime::{perform_adaptive_routing, perform_dataset_measurement, RoutingParams};

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::*;
use std::error::Error;
use std::path::PathBuf;

mod topology_selection;
use topology_selection::get_topo;

fn main() -> Result<(), Box<dyn Error>> {
    // run clap
    let args = CommandLineArguments::parse();

    // match on the action
    match args.cmd {
        MainCommand::Route {
            topology,
            source,
            destination,
            iterations,
            metric,
            scope,
            no_background_load,
            measure_baseline,
            parse_mode,
            keep_stale,
            ping,
            history,
            fallback_low,
            fallback_high,
            either_orientation,
            perturb,
            seed,
            output,
            seeded_topology,
            controller,
            emulation,
        } => {
            // initialize the env logger
            pretty_env_logger::init();
            let descriptor = get_topo(&topology)?;

            let mut control = ControlConfig::new(SwitchId(source), SwitchId(destination));
            control.iterations = iterations;
            control.metric = metric.into();
            control.scope = scope.into();
            control.background_load = !no_background_load;
            control.measure_baseline = measure_baseline;
            control.ping_count = ping;

            let probe = ProbeConfig::default().parse_mode(parse_mode.into());
            let mut params = RoutingParams::new(control, probe);
            params.history = history;
            params.fallback = FallbackRange::new(fallback_low, fallback_high);
            params.either_orientation = either_orientation;
            params.perturb = perturb;
            params.seed = seed;
            params.retract_stale = !keep_stale;
            params.measurement_log = output;
            params.seeded_descriptor = seeded_topology;

            let southbound = OdlSouthbound::new(controller.server());
            info!("Using the controller at {}", southbound.server().address());

            let reports = match emulation.backend {
                Backend::Mininet => perform_adaptive_routing(
                    descriptor,
                    MininetEmulation::new(),
                    southbound,
                    &params,
                )?,
                Backend::Telnet => perform_adaptive_routing(
                    descriptor,
                    emulation.telnet()?,
                    southbound,
                    &params,
                )?,
            };

            for report in reports.iter() {
                let path = report.path.as_ref().map(printer::path).unwrap_or_else(|| "NONE".into());
                let failed = report.install.as_ref().map(|i| i.failed_hops()).unwrap_or_default();
                println!(
                    "[{:>3}] {} (measured: {}, failed: {}, changed: {}, rerouted: {}, failed hops: \
                     {:?})",
                    report.iteration,
                    path,
                    report.probe.measured.len(),
                    report.probe.failed.len(),
                    report.changes.len(),
                    report.rerouted,
                    failed,
                );
            }
        }
        MainCommand::Measure { topology, rounds, output, parse_mode, emulation } => {
            // initialize the env logger
            pretty_env_logger::init();
            let descriptor = get_topo(&topology)?;
            let probe = ProbeConfig::default().parse_mode(parse_mode.into());

            let (succeeded, failed) = match emulation.backend {
                Backend::Mininet => perform_dataset_measurement(
                    &descriptor,
                    &MininetEmulation::new(),
                    &probe,
                    rounds,
                    output,
                )?,
                Backend::Telnet => perform_dataset_measurement(
                    &descriptor,
                    &emulation.telnet()?,
                    &probe,
                    rounds,
                    output,
                )?,
            };
            println!("{} measurements stored, {} failed", succeeded, failed);
        }
        MainCommand::Show { topology, source, destination, metric } => {
            pretty_env_logger::init();
            let descriptor = get_topo(&topology)?;
            let topo = Topology::build(&descriptor)?;
            println!("{}\n", printer::cost_matrix(&topo));
            println!("{}", printer::links(&topo));
            if let (Some(source), Some(destination)) = (source, destination) {
                let path =
                    shortest_path(&topo, SwitchId(source), SwitchId(destination), metric.into())?;
                println!("\n{}", printer::path(&path));
            }
        }
    }

    Ok(())
}

/// This is the binary to run the delay-aware traffic engineering loop. It computes the path with
/// the smallest delay between two switches, installs it on an OpenDaylight controller, and
/// re-routes the traffic as the measured link delays change.
#[derive(Parser, Debug)]
#[clap(name = "SDN-TE", author = "Tibor Schneider")]
struct CommandLineArguments {
    /// Action to perform
    #[clap(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Route the traffic between two switches, and adapt the route to the measured delays
    #[clap(name = "route")]
    Route {
        /// Name of a built-in topology, or path to a JSON topology file
        topology: String,
        /// Source switch (e.g., 3 for s3)
        #[clap(short = 's', long)]
        source: u32,
        /// Destination switch (e.g., 6 for s6)
        #[clap(short = 'd', long)]
        destination: u32,
        /// Number of adaptive iterations after the first installation
        #[clap(short = 'n', long, default_value = "1")]
        iterations: usize,
        /// Metric used to compute the path
        #[clap(short = 'm', long, value_enum, default_value = "delay")]
        metric: MetricArg,
        /// Links that are re-measured in every iteration
        #[clap(long, value_enum, default_value = "all")]
        scope: ScopeArg,
        /// Do not generate background load on the active path while measuring
        #[clap(long)]
        no_background_load: bool,
        /// Measure all links before computing the first path. Always done without history.
        #[clap(short = 'b', long)]
        measure_baseline: bool,
        /// How to read the report of the traffic generator
        #[clap(long, value_enum, default_value = "labeled")]
        parse_mode: ParseModeArg,
        /// Keep the rules of the previous path after re-routing
        #[clap(short = 'k', long)]
        keep_stale: bool,
        /// Ping the destination host from the source host after every installation
        #[clap(long)]
        ping: Option<u32>,
        /// CSV file with historical link delays, used to seed the link weights
        #[clap(long)]
        history: Option<PathBuf>,
        /// Lower bound of the random delay (in ms) for links without history
        #[clap(long, default_value = "0.000119")]
        fallback_low: f64,
        /// Upper bound of the random delay (in ms) for links without history
        #[clap(long, default_value = "0.000152")]
        fallback_high: f64,
        /// Also use historical delays recorded in the opposite orientation of a link
        #[clap(long)]
        either_orientation: bool,
        /// After the last iteration, change the delays of the active path on the emulated network
        /// (largest historical value, or random) and recompute the path
        #[clap(long)]
        perturb: bool,
        /// Seed for the random delays
        #[clap(long)]
        seed: Option<u64>,
        /// Store every link measurement in this CSV file
        #[clap(short = 'o', long)]
        output: Option<PathBuf>,
        /// Store the topology after seeding the link delays in this JSON file
        #[clap(long)]
        seeded_topology: Option<PathBuf>,
        /// Controller
        #[clap(flatten)]
        controller: ControllerArgs,
        /// Emulation backend
        #[clap(flatten)]
        emulation: EmulationArgs,
    },
    /// Measure all links repeatedly and store the delays in a CSV file
    #[clap(name = "measure")]
    Measure {
        /// Name of a built-in topology, or path to a JSON topology file
        topology: String,
        /// Number of measurement rounds
        #[clap(short = 'n', long, default_value = "100")]
        rounds: usize,
        /// Output CSV file
        #[clap(short = 'o', long, default_value = "demo.csv")]
        output: PathBuf,
        /// How to read the report of the traffic generator
        #[clap(long, value_enum, default_value = "labeled")]
        parse_mode: ParseModeArg,
        /// Emulation backend
        #[clap(flatten)]
        emulation: EmulationArgs,
    },
    /// Print the cost matrix and the links of a topology, and optionally the shortest path
    #[clap(name = "show")]
    Show {
        /// Name of a built-in topology, or path to a JSON topology file
        topology: String,
        /// Source switch
        #[clap(short = 's', long)]
        source: Option<u32>,
        /// Destination switch
        #[clap(short = 'd', long)]
        destination: Option<u32>,
        /// Metric used to compute the path
        #[clap(short = 'm', long, value_enum, default_value = "delay")]
        metric: MetricArg,
    },
}

#[derive(Args, Debug)]
struct ControllerArgs {
    /// Hostname of the OpenDaylight controller
    #[clap(long, default_value = "localhost")]
    controller_host: String,
    /// RESTCONF port of the controller
    #[clap(long, default_value = "8181")]
    controller_port: u16,
    /// User name for the controller
    #[clap(long, default_value = "admin")]
    user: String,
    /// Password for the controller
    #[clap(long, default_value = "admin")]
    password: String,
}

impl ControllerArgs {
    fn server(&self) -> OdlServer {
        OdlServer::new(&self.controller_host, self.controller_port)
            .with_credentials(&self.user, &self.password)
    }
}

#[derive(Args, Debug)]
struct EmulationArgs {
    /// How to execute commands on the nodes of the emulated network
    #[clap(long, value_enum, default_value = "mininet")]
    backend: Backend,
    /// JSON file mapping node names to console ports (telnet backend only)
    #[clap(long, required_if_eq("backend", "telnet"))]
    port_map: Option<PathBuf>,
    /// Host of the consoles (telnet backend only)
    #[clap(long, default_value = "localhost")]
    console_host: String,
}

impl EmulationArgs {
    fn telnet(&self) -> Result<TelnetEmulation, Box<dyn Error>> {
        let port_map = self.port_map.as_ref().ok_or("The telnet backend requires --port-map")?;
        TelnetEmulation::from_port_map(self.console_host.as_str(), port_map)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Backend {
    Mininet,
    Telnet,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum MetricArg {
    Delay,
    HopCount,
}

impl From<MetricArg> for Metric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Delay => Metric::Delay,
            MetricArg::HopCount => Metric::HopCount,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ScopeArg {
    All,
    ActivePath,
}

impl From<ScopeArg> for AdaptiveScope {
    fn from(s: ScopeArg) -> Self {
        match s {
            ScopeArg::All => AdaptiveScope::All,
            ScopeArg::ActivePath => AdaptiveScope::ActivePath,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ParseModeArg {
    Labeled,
    TailOffset,
}

impl From<ParseModeArg> for ReportParseMode {
    fn from(p: ParseModeArg) -> Self {
        match p {
            ParseModeArg::Labeled => ReportParseMode::Labeled,
            ParseModeArg::TailOffset => ReportParseMode::TailOffset,
        }
    }
}
