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

use super::mocks::{itgdec_report, triangle, MockEmulation};
use crate::error::{ProbeParseError, ProcessError};
use crate::probe::*;
use crate::topology::{SwitchId, Topology};

use assert_approx_eq::assert_approx_eq;
use std::thread;

fn config() -> ProbeConfig {
    ProbeConfig::without_waiting()
}

#[test]
fn labeled_report() {
    let report = parse_report(&itgdec_report(0.000116), ReportParseMode::Labeled).unwrap();
    assert_approx_eq!(report.delay, 0.116);
    assert_approx_eq!(report.jitter.unwrap(), 0.025);
    assert_approx_eq!(report.bitrate.unwrap(), 0.800801);
}

#[test]
fn tail_offset_report() {
    let report = parse_report(&itgdec_report(0.0025), ReportParseMode::TailOffset).unwrap();
    assert_approx_eq!(report.delay, 2.5);
    assert_approx_eq!(report.jitter.unwrap(), 0.025);
    assert_approx_eq!(report.bitrate.unwrap(), 0.800801);
}

#[test]
fn labeled_uses_total_results() {
    let raw = "Average delay = 1.0 s\nAverage delay = 0.002 s\n";
    let report = parse_report(raw, ReportParseMode::Labeled).unwrap();
    assert_approx_eq!(report.delay, 2.0);
    assert_eq!(report.jitter, None);
    assert_eq!(report.bitrate, None);
}

#[test]
fn labeled_fields_ignore_case() {
    let raw = "  AVERAGE DELAY = 3 ms\nmax average delay = 9 s\nThroughput = 1200 bit/s\n";
    let report = parse_report(raw, ReportParseMode::Labeled).unwrap();
    assert_approx_eq!(report.delay, 3.0);
    assert_eq!(report.jitter, None);
    assert_approx_eq!(report.bitrate.unwrap(), 1.2);
    // the same report is parsed again with the shared patterns
    assert_eq!(parse_report(raw, ReportParseMode::Labeled).unwrap(), report);
}

#[test]
fn labeled_survives_extra_lines() {
    let raw = format!("{}\nsome trailing output\nmore\n", itgdec_report(0.001));
    let labeled = parse_report(&raw, ReportParseMode::Labeled).unwrap();
    assert_approx_eq!(labeled.delay, 1.0);
    // the offset now points at the received bytes
    let tail = parse_report(&raw, ReportParseMode::TailOffset).unwrap();
    assert_approx_eq!(tail.delay, 1000.0);
}

#[test]
fn malformed_reports() {
    assert_eq!(
        parse_report("", ReportParseMode::Labeled),
        Err(ProbeParseError::MissingField("average delay"))
    );
    assert_eq!(
        parse_report("a\nb\n", ReportParseMode::TailOffset),
        Err(ProbeParseError::TooShort(2))
    );
    assert!(matches!(
        parse_report("Average delay = fast s", ReportParseMode::Labeled),
        Err(ProbeParseError::InvalidValue { field: "average delay", .. })
    ));
    assert!(matches!(
        parse_report("Average delay = 0.1 fortnights", ReportParseMode::Labeled),
        Err(ProbeParseError::InvalidValue { .. })
    ));
    assert!(matches!(
        parse_report("Average delay = -0.1 s", ReportParseMode::Labeled),
        Err(ProbeParseError::InvalidValue { .. })
    ));
}

#[test]
fn measurement_updates_weight() {
    let mut topo = Topology::build(&triangle()).unwrap();
    let emu = MockEmulation::new(itgdec_report(0.0042));
    let cfg = config();
    let outcome = DelayProbe::new(&emu, &cfg).measure(&[(SwitchId(1), SwitchId(2))], &mut topo);
    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.measured.len(), 1);
    assert_eq!(outcome.measured[0].previous, 5.0);
    assert_approx_eq!(topo.weight(SwitchId(1), SwitchId(2)).unwrap(), 4.2);
    assert_approx_eq!(topo.cost_matrix().get(SwitchId(2), SwitchId(1)).unwrap(), 4.2);
    assert_eq!(topo.weight(SwitchId(2), SwitchId(3)), Some(3.0));
}

#[test]
fn command_sequence() {
    let emu = MockEmulation::new(itgdec_report(0.001));
    let cfg = config();
    DelayProbe::new(&emu, &cfg).measure_link(SwitchId(1), SwitchId(2)).unwrap();
    assert_eq!(
        emu.commands_on("s1"),
        vec![
            "ifconfig s1 10.0.0.100 netmask 255.0.0.0",
            "ITGSend -T UDP -c 100 -C 10 -t 10000 -a 10.0.0.101 -l sender.log -x receiver.log",
            "rm -f sender.log receiver.log",
            "ifconfig s1 0.0.0.0",
        ]
    );
    assert_eq!(
        emu.commands_on("s2"),
        vec![
            "ifconfig s2 10.0.0.101 netmask 255.0.0.0",
            "nohup ITGRecv > /dev/null 2>&1 &",
            "ITGDec receiver.log",
            "rm -f sender.log receiver.log",
            "pkill ITGRecv",
            "pkill ITGLog",
            "ifconfig s2 0.0.0.0",
        ]
    );
}

#[test]
fn malformed_report_keeps_weight() {
    let mut topo = Topology::build(&triangle()).unwrap();
    let emu = MockEmulation::new(String::from("ITGDec: cannot open receiver.log"));
    let cfg = config();
    let before = topo.cost_matrix().clone();
    let outcome = DelayProbe::new(&emu, &cfg).measure(&[(SwitchId(2), SwitchId(3))], &mut topo);
    assert!(outcome.measured.is_empty());
    assert!(matches!(outcome.failed[0].1, LinkProbeError::Parse(_)));
    assert_eq!(topo.weight(SwitchId(2), SwitchId(3)), Some(3.0));
    assert_eq!(topo.cost_matrix(), &before);
    // the receiver is stopped anyway
    assert_eq!(emu.count("pkill ITGRecv"), 1);
}

#[test]
fn failing_node_is_cleaned_up() {
    let mut topo = Topology::build(&triangle()).unwrap();
    let emu = MockEmulation {
        broken: vec![String::from("s3")],
        ..MockEmulation::new(itgdec_report(0.001))
    };
    let cfg = config();
    let outcome = DelayProbe::new(&emu, &cfg)
        .measure(&[(SwitchId(3), SwitchId(1)), (SwitchId(1), SwitchId(2))], &mut topo);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, (SwitchId(3), SwitchId(1)));
    assert!(matches!(outcome.failed[0].1, LinkProbeError::Process(ProcessError::Exec { .. })));
    assert_eq!(topo.weight(SwitchId(1), SwitchId(3)), Some(10.0));
    // the second link is measured regardless
    assert_approx_eq!(topo.weight(SwitchId(1), SwitchId(2)).unwrap(), 1.0);
    // cleanup on s1 was attempted after the failure on s3
    assert!(emu.commands_on("s1").contains(&String::from("pkill ITGRecv")));
}

#[test]
fn unknown_link_is_not_probed() {
    let mut topo = Topology::build(&triangle()).unwrap();
    let emu = MockEmulation::new(itgdec_report(0.001));
    let cfg = config();
    let outcome = DelayProbe::new(&emu, &cfg).measure(&[(SwitchId(1), SwitchId(7))], &mut topo);
    assert!(matches!(outcome.failed[0].1, LinkProbeError::Weight(_)));
    assert!(emu.commands().is_empty());
}

#[test]
fn background_load_is_joined() {
    let mut topo = Topology::build(&triangle()).unwrap();
    let emu = MockEmulation::new(itgdec_report(0.002));
    let cfg = config();
    let loaded = [(SwitchId(1), SwitchId(2)), (SwitchId(2), SwitchId(3))];
    let outcome = DelayProbe::new(&emu, &cfg).measure_with_load(
        &[(SwitchId(1), SwitchId(3))],
        &loaded,
        &mut topo,
    );
    assert!(outcome.load_failures.is_empty());
    assert_approx_eq!(topo.weight(SwitchId(1), SwitchId(3)).unwrap(), 2.0);
    // both load tasks have completed when the measurement returns
    let senders = emu.count("nohup ITGSend -T UDP -c 128 -C 150 -t 60000 -a 10.0.0.101");
    assert_eq!(senders, 2);
    assert!(emu.commands_on("s2").contains(&String::from("nohup ITGRecv > /dev/null 2>&1 &")));
    assert!(emu.commands_on("s3").contains(&String::from("nohup ITGRecv > /dev/null 2>&1 &")));
}

#[test]
fn background_load_failures_are_reported() {
    let emu = MockEmulation { broken: vec![String::from("s3")], ..Default::default() };
    let cfg = config();
    let errors = thread::scope(|s| {
        let links = [(SwitchId(1), SwitchId(2)), (SwitchId(2), SwitchId(3))];
        let load = BackgroundLoad::start(s, &emu, &cfg, &links);
        assert_eq!(load.len(), 2);
        load.join()
    });
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ProcessError::Exec { node, .. } if node == "s3"));
}
