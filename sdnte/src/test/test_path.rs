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

use super::mocks::triangle;
use crate::error::NoPathFound;
use crate::example_topologies::{Abilene, AbileneDataset, AboveNet, ExampleTopology};
use crate::path::*;
use crate::topology::{LinkWeight, SwitchId, Topology, TopologyDescriptor};

use assert_approx_eq::assert_approx_eq;
use rand::prelude::*;

fn ids(nodes: &[u32]) -> Vec<SwitchId> {
    nodes.iter().map(|x| SwitchId(*x)).collect()
}

#[test]
fn triangle_takes_detour() {
    let topo = Topology::build(&triangle()).unwrap();
    let path = shortest_path(&topo, SwitchId(1), SwitchId(3), Metric::Delay).unwrap();
    assert_eq!(path.nodes(), ids(&[1, 2, 3]).as_slice());
    assert_approx_eq!(path.cost(), 8.0);
    assert_eq!(path.num_hops(), 2);
    assert_eq!(path.to_string(), "s1 -> s2 -> s3");
}

#[test]
fn triangle_hop_count() {
    let topo = Topology::build(&triangle()).unwrap();
    let path = shortest_path(&topo, SwitchId(1), SwitchId(3), Metric::HopCount).unwrap();
    assert_eq!(path.nodes(), ids(&[1, 3]).as_slice());
    assert_approx_eq!(path.cost(), 1.0);
}

#[test]
fn trivial_path() {
    for d in [triangle(), Abilene::descriptor(), AbileneDataset::descriptor()].iter() {
        let topo = Topology::build(d).unwrap();
        for id in topo.switches() {
            let path = shortest_path(&topo, *id, *id, Metric::Delay).unwrap();
            assert_eq!(path.nodes(), &[*id]);
            assert_eq!(path.cost(), 0.0);
            assert_eq!(path.hops().count(), 0);
        }
    }
    // even for switches that do not exist
    let topo = Topology::build(&triangle()).unwrap();
    assert_eq!(
        shortest_path(&topo, SwitchId(42), SwitchId(42), Metric::Delay),
        Ok(Path::trivial(SwitchId(42)))
    );
}

#[test]
fn disconnected() {
    let topo = Topology::build(&AbileneDataset::descriptor()).unwrap();
    let before = topo.cost_matrix().clone();
    let result = shortest_path(&topo, SwitchId(1), SwitchId(12), Metric::Delay);
    assert_eq!(result, Err(NoPathFound { src: SwitchId(1), dst: SwitchId(12) }));
    assert_eq!(result.unwrap_err().to_string(), "No path found between s1 and s12");
    assert_eq!(topo.cost_matrix(), &before);
}

#[test]
fn unknown_switch() {
    let topo = Topology::build(&triangle()).unwrap();
    assert!(shortest_path(&topo, SwitchId(1), SwitchId(9), Metric::Delay).is_err());
    assert!(shortest_path(&topo, SwitchId(9), SwitchId(1), Metric::HopCount).is_err());
}

#[test]
fn ties_are_deterministic() {
    // square 1-2-4 and 1-3-4 with equal cost
    let mut d = TopologyDescriptor::with_switches("square", 4);
    d.add_link(1, 3, 1.0);
    d.add_link(3, 4, 1.0);
    d.add_link(1, 2, 1.0);
    d.add_link(2, 4, 1.0);
    let topo = Topology::build(&d).unwrap();
    let first = shortest_path(&topo, SwitchId(1), SwitchId(4), Metric::Delay).unwrap();
    assert!([ids(&[1, 2, 4]), ids(&[1, 3, 4])].iter().any(|p| p.as_slice() == first.nodes()));
    assert_approx_eq!(first.cost(), 2.0);
    for _ in 0..10 {
        let again = shortest_path(&topo, SwitchId(1), SwitchId(4), Metric::Delay).unwrap();
        assert!(again.same_route(&first));
    }
}

#[test]
fn abilene_route() {
    let topo = Topology::build(&Abilene::descriptor()).unwrap();
    let (s, d) = Abilene::ROUTE;
    let path = shortest_path(&topo, SwitchId(s), SwitchId(d), Metric::HopCount).unwrap();
    assert_eq!(path.source(), SwitchId(3));
    assert_eq!(path.destination(), SwitchId(6));
    assert_valid(&topo, &path, Metric::HopCount);
}

#[test]
fn abovenet_hop_count_route() {
    let topo = Topology::build(&AboveNet::descriptor()).unwrap();
    let (s, d) = AboveNet::ROUTE;
    let path = shortest_path(&topo, SwitchId(s), SwitchId(d), Metric::HopCount).unwrap();
    let best = brute_force(&topo, SwitchId(s), SwitchId(d), Metric::HopCount).unwrap();
    assert_approx_eq!(path.cost(), path.num_hops() as LinkWeight);
    assert_approx_eq!(path.cost(), best);
    assert_valid(&topo, &path, Metric::HopCount);
}

#[test]
fn random_graphs_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let n: u32 = rng.gen_range(2, 8);
        let mut d = TopologyDescriptor::with_switches("random", n);
        let mut pairs: Vec<(u32, u32)> = Vec::new();
        for a in 1..=n {
            for b in (a + 1)..=n {
                if rng.gen_bool(0.5) {
                    pairs.push((a, b));
                }
            }
        }
        // unique, strictly positive weights
        let mut weights: Vec<LinkWeight> = (1..=pairs.len()).map(|i| i as LinkWeight).collect();
        weights.shuffle(&mut rng);
        for ((a, b), w) in pairs.iter().zip(weights.iter()) {
            d.add_link(*a, *b, *w + rng.gen_range(0.0, 0.5));
        }
        let topo = Topology::build(&d).unwrap();

        let src = SwitchId(rng.gen_range(1, n + 1));
        let dst = SwitchId(rng.gen_range(1, n + 1));
        let result = shortest_path(&topo, src, dst, Metric::Delay);
        match (result, brute_force(&topo, src, dst, Metric::Delay)) {
            (Ok(path), Some(best)) => {
                assert_approx_eq!(path.cost(), best);
                assert_valid(&topo, &path, Metric::Delay);
            }
            (Err(_), None) => {}
            (result, best) => panic!("{:?} but brute force found {:?}", result, best),
        }
    }
}

/// Check that the path is connected, simple, and that its cost is the sum of its links.
fn assert_valid(topo: &Topology, path: &Path, metric: Metric) {
    let mut seen = std::collections::HashSet::new();
    assert!(path.nodes().iter().all(|n| seen.insert(*n)), "{} is not simple", path);
    let mut cost = 0.0;
    for (a, b) in path.hops() {
        cost += metric.link_cost(topo.weight(a, b).expect("hop without link"));
    }
    assert_approx_eq!(cost, path.cost());
}

/// Cost of the best path, found by enumerating all simple paths.
fn brute_force(
    topo: &Topology,
    src: SwitchId,
    dst: SwitchId,
    metric: Metric,
) -> Option<LinkWeight> {
    fn visit(
        topo: &Topology,
        node: SwitchId,
        dst: SwitchId,
        metric: Metric,
        cost: LinkWeight,
        visited: &mut Vec<SwitchId>,
        best: &mut Option<LinkWeight>,
    ) {
        if node == dst {
            if best.map(|b| cost < b).unwrap_or(true) {
                *best = Some(cost);
            }
            return;
        }
        for (next, w) in topo.neighbors(node) {
            if !visited.contains(&next) {
                visited.push(next);
                visit(topo, next, dst, metric, cost + metric.link_cost(w), visited, best);
                visited.pop();
            }
        }
    }
    let mut best = None;
    visit(topo, src, dst, metric, 0.0, &mut vec![src], &mut best);
    best
}
