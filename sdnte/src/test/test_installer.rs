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

use super::mocks::{triangle, MockSouthbound};
use crate::error::InstallError;
use crate::example_topologies::{AboveNet, ExampleTopology};
use crate::flow::*;
use crate::path::{shortest_path, Metric, Path};
use crate::topology::{PortResolver, PortTable, SwitchId, Topology};

use maplit::hashset;
use std::collections::HashSet;

fn setup() -> (Topology, PortResolver) {
    let d = triangle();
    let topo = Topology::build(&d).unwrap();
    let ports = PortResolver::new(&d.port_table(), &topo);
    (topo, ports)
}

fn path(nodes: &[u32], cost: f64) -> Path {
    Path::new(nodes.iter().map(|x| SwitchId(*x)).collect(), cost)
}

#[test]
fn all_hops_accepted() {
    let (_, ports) = setup();
    let mut installer = FlowInstaller::new(MockSouthbound::with_statuses(vec![201, 201]));
    let report = installer.install(&path(&[1, 2, 3], 8.0), &ports, "10.0.0.3/24");
    assert!(report.is_complete());
    assert_eq!(report.succeeded, vec![1, 2]);
    assert!(report.failed_hops().is_empty());

    let upserts = installer.southbound().upserts.borrow();
    assert_eq!(upserts.len(), 2);
    assert_eq!(upserts[0].node, SwitchId(1));
    assert_eq!(upserts[0].output_port, 2);
    assert_eq!(upserts[1].node, SwitchId(2));
    assert_eq!(upserts[1].output_port, 3);
    for rule in upserts.iter() {
        assert_eq!(rule.destination_addr, "10.0.0.3/24");
        assert_eq!(rule.table, 0);
        assert_eq!(rule.priority, 1000);
        assert_eq!(rule.name, "dest-ip-flow");
        assert_eq!(rule.max_length, 65535);
    }
}

#[test]
fn second_hop_rejected() {
    let (_, ports) = setup();
    let mut installer = FlowInstaller::new(MockSouthbound::with_statuses(vec![201, 500]));
    let report = installer.install(&path(&[1, 2, 3], 8.0), &ports, "10.0.0.3/24");
    assert!(!report.is_complete());
    assert_eq!(report.succeeded, vec![1]);
    assert_eq!(report.failed_hops(), vec![2]);
    assert_eq!(report.failed[0].rule.as_str(), "flow_s1_s3_2");
    assert_eq!(
        report.failed[0].error,
        HopError::Install(InstallError::Rejected { status: 500, body: "error".into() })
    );
    // only the successful hop is remembered
    assert_eq!(
        installer.installed_rules(SwitchId(1), SwitchId(3)),
        &[(SwitchId(1), FlowRuleId::new(SwitchId(1), SwitchId(3), 1))]
    );
}

#[test]
fn first_hop_rejected_does_not_abort() {
    let (_, ports) = setup();
    let mut installer = FlowInstaller::new(MockSouthbound::with_statuses(vec![404, 200]));
    let report = installer.install(&path(&[1, 2, 3], 8.0), &ports, "10.0.0.3/24");
    assert_eq!(report.failed_hops(), vec![1]);
    assert_eq!(report.succeeded, vec![2]);
    assert_eq!(installer.southbound().upserts.borrow().len(), 2);
}

#[test]
fn unresolved_port_skips_hop() {
    let d = triangle();
    let topo = Topology::build(&d).unwrap();
    let mut table = d.port_table();
    table.insert(SwitchId(2), SwitchId(3), 0);
    let ports = PortResolver::new(&table, &topo);

    let mut installer = FlowInstaller::new(MockSouthbound::default());
    let report = installer.install(&path(&[1, 2, 3], 8.0), &ports, "10.0.0.3/24");
    assert_eq!(report.succeeded, vec![1]);
    assert_eq!(report.failed_hops(), vec![2]);
    assert!(matches!(report.failed[0].error, HopError::PortUnresolved(_)));
    assert_eq!(installer.southbound().upserts.borrow().len(), 1);
}

#[test]
fn one_rule_per_hop_with_distinct_ids() {
    let d = AboveNet::descriptor();
    let topo = Topology::build(&d).unwrap();
    let ports = PortResolver::new(&d.port_table(), &topo);
    let (s, t) = AboveNet::ROUTE;
    let p = shortest_path(&topo, SwitchId(s), SwitchId(t), Metric::HopCount).unwrap();

    let mut installer = FlowInstaller::new(MockSouthbound::default());
    let report = installer.install(&p, &ports, &topo.host_addr(SwitchId(t)));
    assert!(report.is_complete());
    let ids = installer.southbound().upserted_ids();
    assert_eq!(ids.len(), p.len() - 1);
    let distinct: HashSet<&String> = ids.iter().collect();
    assert_eq!(distinct.len(), ids.len());
    assert_eq!(ids[0], "flow_s4_s15_1");
}

#[test]
fn reinstall_is_idempotent() {
    let (_, ports) = setup();
    let p = path(&[1, 2, 3], 8.0);
    let mut installer = FlowInstaller::new(MockSouthbound::default());
    let first = installer.install(&p, &ports, "10.0.0.3/24");
    let second = installer.install(&p, &ports, "10.0.0.3/24");
    assert_eq!(first.rules, second.rules);
    let ids = installer.southbound().upserted_ids();
    assert_eq!(ids[..2], ids[2..]);
    assert!(installer.southbound().deletes.borrow().is_empty());
    assert!(second.retracted.is_empty());
}

#[test]
fn trivial_path_installs_nothing() {
    let (_, ports) = setup();
    let mut installer = FlowInstaller::new(MockSouthbound::default());
    let report = installer.install(&Path::trivial(SwitchId(2)), &ports, "10.0.0.2/24");
    assert!(report.is_complete());
    assert!(report.rules.is_empty());
    assert!(installer.southbound().upserts.borrow().is_empty());
}

#[test]
fn stale_rules_are_retracted() {
    let (_, ports) = setup();
    let mut installer = FlowInstaller::new(MockSouthbound::default());
    installer.install(&path(&[1, 2, 3], 8.0), &ports, "10.0.0.3/24");
    let report = installer.install(&path(&[1, 3], 10.0), &ports, "10.0.0.3/24");

    // hop 1 now lives on the same switch, hop 2 on s2 is stale
    let deletes: HashSet<(SwitchId, FlowRuleId)> =
        installer.southbound().deletes.borrow().iter().cloned().collect();
    assert_eq!(
        deletes,
        hashset! {(SwitchId(2), FlowRuleId::new(SwitchId(1), SwitchId(3), 2))}
    );
    assert_eq!(report.retracted, vec![FlowRuleId::new(SwitchId(1), SwitchId(3), 2)]);
    assert_eq!(installer.installed_rules(SwitchId(1), SwitchId(3)).len(), 1);
}

#[test]
fn retraction_can_be_disabled() {
    let (_, ports) = setup();
    let mut installer = FlowInstaller::new(MockSouthbound::default()).retract_stale(false);
    installer.install(&path(&[1, 2, 3], 8.0), &ports, "10.0.0.3/24");
    let report = installer.install(&path(&[1, 3], 10.0), &ports, "10.0.0.3/24");
    assert!(report.retracted.is_empty());
    assert!(installer.southbound().deletes.borrow().is_empty());
}

#[test]
fn failed_rewrite_keeps_rules_of_active_path() {
    let (_, ports) = setup();
    let statuses = vec![201, 201, 201, 500];
    let mut installer = FlowInstaller::new(MockSouthbound::with_statuses(statuses));
    let p = path(&[1, 2, 3], 8.0);
    installer.install(&p, &ports, "10.0.0.3/24");
    let report = installer.install(&p, &ports, "10.0.0.3/24");

    // the rejected rule on s2 still belongs to the path, so nothing is removed
    assert_eq!(report.failed_hops(), vec![2]);
    assert!(report.retracted.is_empty());
    assert!(installer.southbound().deletes.borrow().is_empty());
    assert_eq!(installer.installed_rules(SwitchId(1), SwitchId(3)).len(), 2);

    // a later switch to another path still removes the rule on s2
    installer.install(&path(&[1, 3], 10.0), &ports, "10.0.0.3/24");
    assert_eq!(
        *installer.southbound().deletes.borrow(),
        vec![(SwitchId(2), FlowRuleId::new(SwitchId(1), SwitchId(3), 2))]
    );
}

#[test]
fn empty_port_table() {
    let (topo, _) = setup();
    let ports = PortResolver::new(&PortTable::new(), &topo);
    assert_eq!(ports.missing().len(), 6);
    let mut installer = FlowInstaller::new(MockSouthbound::default());
    let report = installer.install(&path(&[1, 2, 3], 8.0), &ports, "10.0.0.3/24");
    assert_eq!(report.failed_hops(), vec![1, 2]);
    assert!(report.succeeded.is_empty());
}
