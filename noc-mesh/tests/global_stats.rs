// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use approx::assert_relative_eq;
use noc_mesh::config::NocConfig;
use noc_mesh::coord::Coord;
use noc_mesh::mesh::Mesh;
use noc_mesh::power::PowerConfig;
use noc_mesh::stats::GlobalStats;
use noc_mesh::test_helpers::{build_mesh, deliver_packets, mesh_config, start_test};

/// A 3x1x1 mesh where node 0 received 2 packets from node 1 with a delay of
/// 4 cycles, node 2 received 1 packet from node 0 with a delay of 10 cycles
/// and node 1 received nothing.
fn three_node_line(config: &NocConfig) -> Mesh {
    let top = start_test(file!());
    let mut mesh = build_mesh(&top, config).unwrap();
    deliver_packets(mesh.tile_mut(&Coord::new(0, 0, 0)).unwrap(), 1, 4.0, 2);
    deliver_packets(mesh.tile_mut(&Coord::new(2, 0, 0)).unwrap(), 0, 10.0, 1);
    mesh
}

#[test]
fn empty_mesh_has_no_data() {
    let top = start_test(file!());
    let config = mesh_config(2, 2, 1);
    let mesh = build_mesh(&top, &config).unwrap();
    let stats = GlobalStats::new(&mesh, &config);

    assert_eq!(stats.received_packets(), 0);
    assert_eq!(stats.received_flits(), 0);
    assert_eq!(stats.average_delay(), None);
    assert_eq!(stats.average_throughput(), None);
    assert_eq!(stats.throughput(), None);
    assert_relative_eq!(stats.max_delay(), -1.0);
    assert_relative_eq!(stats.power(), 0.0);

    let matrix = stats.max_delay_matrix();
    assert_eq!(matrix.dims(), mesh.dims());
    assert_eq!(matrix.iter().count(), 4);
    for value in matrix.iter() {
        assert_relative_eq!(*value, -1.0);
    }
}

#[test]
fn packet_weighted_average_delay() {
    let config = mesh_config(3, 1, 1);
    let mesh = three_node_line(&config);
    let stats = GlobalStats::new(&mesh, &config);

    assert_eq!(stats.received_packets(), 3);
    assert_eq!(stats.received_flits(), 3);
    assert_relative_eq!(stats.average_delay().unwrap(), 6.0);
}

#[test]
fn max_delays() {
    let config = mesh_config(3, 1, 1);
    let mesh = three_node_line(&config);
    let stats = GlobalStats::new(&mesh, &config);

    assert_relative_eq!(stats.max_delay(), 10.0);
    assert_relative_eq!(stats.max_delay_of(0).unwrap(), 4.0);
    assert_relative_eq!(stats.max_delay_of(1).unwrap(), -1.0);
    assert_relative_eq!(stats.max_delay_of(2).unwrap(), 10.0);
    assert!(stats.max_delay_of(3).is_err());

    let matrix = stats.max_delay_matrix();
    assert_relative_eq!(matrix[Coord::new(0, 0, 0)], 4.0);
    assert_relative_eq!(matrix[Coord::new(1, 0, 0)], -1.0);
    assert_relative_eq!(*matrix.get(2, 0, 0).unwrap(), 10.0);
}

#[test]
fn between_nodes() {
    let config = mesh_config(3, 1, 1);
    let mesh = three_node_line(&config);
    let stats = GlobalStats::new(&mesh, &config);

    assert_relative_eq!(stats.average_delay_between(1, 0).unwrap(), 4.0);
    assert_relative_eq!(stats.max_delay_between(1, 0).unwrap(), 4.0);
    assert_relative_eq!(stats.max_delay_between(0, 2).unwrap(), 10.0);

    // Sources that never sent anything
    assert_relative_eq!(stats.average_delay_between(2, 0).unwrap(), 0.0);
    assert_relative_eq!(stats.max_delay_between(2, 0).unwrap(), -1.0);
    assert_relative_eq!(stats.average_throughput_between(2, 0).unwrap(), 0.0);

    // Destinations outside the mesh
    assert!(stats.average_delay_between(0, 3).is_err());
    assert!(stats.max_delay_between(0, 3).is_err());
    assert!(stats.average_throughput_between(0, 3).is_err());
}

#[test]
fn throughputs() {
    let config = mesh_config(3, 1, 1);
    let mesh = three_node_line(&config);
    let stats = GlobalStats::new(&mesh, &config);

    // Node 0: 2 flits with the last at cycle 5, node 2: 1 flit at cycle 10
    assert_relative_eq!(stats.average_throughput_between(1, 0).unwrap(), 0.4);
    assert_relative_eq!(stats.average_throughput_between(0, 2).unwrap(), 0.1);
    assert_relative_eq!(stats.average_throughput().unwrap(), 0.25);

    // 3 flits over 100 cycles at the 2 nodes that received flits
    assert_relative_eq!(stats.throughput().unwrap(), 0.015);
}

#[test]
fn routed_flits_and_power() {
    let config = NocConfig {
        power: PowerConfig {
            routing: 1.0,
            selection: 2.0,
            forward: 4.0,
            incoming: 8.0,
            standby: 16.0,
        },
        ..mesh_config(2, 2, 1)
    };
    let top = start_test(file!());
    let mut mesh = build_mesh(&top, &config).unwrap();
    {
        let router = mesh.tile_mut(&Coord::new(1, 0, 0)).unwrap().router_mut();
        router.record_routed_flit();
        router.record_routed_flit();
        router.record_routed_flit();
    }
    mesh.tile_mut(&Coord::new(0, 1, 0))
        .unwrap()
        .router_mut()
        .record_incoming_flit();

    let stats = GlobalStats::new(&mesh, &config);
    let matrix = stats.routed_flits_matrix();
    assert_eq!(matrix[Coord::new(1, 0, 0)], 3);
    assert_eq!(matrix[Coord::new(0, 0, 0)], 0);
    assert_eq!(matrix.iter().sum::<u64>(), 3);
    assert_relative_eq!(stats.power(), 3.0 * 7.0 + 8.0);
}

#[test]
fn drained_total_needs_diagnostics() {
    let config = mesh_config(3, 1, 1);
    let mesh = three_node_line(&config);
    let stats = GlobalStats::new(&mesh, &config);
    stats.received_flits();
    assert_eq!(stats.drained_total(), 0);

    let config = NocConfig {
        diagnostics: true,
        ..mesh_config(3, 1, 1)
    };
    let mesh = three_node_line(&config);
    let stats = GlobalStats::new(&mesh, &config);
    assert_eq!(stats.received_flits(), 3);
    assert_eq!(stats.received_flits(), 3);
    assert_eq!(stats.drained_total(), 6);
}

#[test]
fn summary_report() {
    let top = start_test(file!());
    let config = mesh_config(2, 2, 1);
    let mesh = build_mesh(&top, &config).unwrap();
    let stats = GlobalStats::new(&mesh, &config);

    let mut out = Vec::new();
    stats.report(&mut out, false).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "% Total received packets: 0\n\
         % Total received flits: 0\n\
         % Global average delay (cycles): nan\n\
         % Global average throughput (flits/cycle): nan\n\
         % Throughput (flits/cycle/IP): nan\n\
         % Max delay (cycles): -1\n\
         % Total energy (J): 0\n"
    );
}

#[test]
fn detailed_report() {
    let config = mesh_config(3, 1, 1);
    let mesh = three_node_line(&config);
    let stats = GlobalStats::new(&mesh, &config);

    let mut out = Vec::new();
    stats.report(&mut out, true).unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(report.starts_with("% Total received packets: 3\n"));
    assert!(report.contains("% Global average delay (cycles): 6\n"));
    assert!(report.contains("\n\ndetailed = [\n"));
    assert!(report.contains("\n\nmax_delay = [\n[        4]\n[       -1]\n[       10]\n];\n"));
    assert!(report.ends_with("\n\nrouted_flits = [\n[        0]\n[        0]\n[        0]\n];\n"));

    // One row per source for the nodes that received packets
    let detailed = report
        .split("detailed = [\n")
        .nth(1)
        .and_then(|rest| rest.split("];").next())
        .unwrap();
    let rows: Vec<&str> = detailed
        .lines()
        .filter(|line| !line.starts_with('%'))
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].split_whitespace().take(2).collect::<Vec<_>>(), ["1", "0"]);
    assert_eq!(rows[1].split_whitespace().take(2).collect::<Vec<_>>(), ["0", "2"]);
}

#[test]
fn report_uses_six_significant_digits() {
    let top = start_test(file!());
    let config = NocConfig {
        power: PowerConfig {
            routing: 1.0 / 3.0,
            selection: 0.0,
            forward: 0.0,
            incoming: 0.0,
            standby: 0.0,
        },
        ..mesh_config(2, 1, 1)
    };
    let mut mesh = build_mesh(&top, &config).unwrap();
    let tile = mesh.tile_mut(&Coord::new(0, 0, 0)).unwrap();
    deliver_packets(tile, 1, 3.0, 2);
    deliver_packets(tile, 1, 4.0, 1);
    tile.router_mut().record_routed_flit();

    let stats = GlobalStats::new(&mesh, &config);
    let mut out = Vec::new();
    stats.report(&mut out, true).unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(report.contains("% Global average delay (cycles): 3.33333\n"));
    assert!(report.contains("% Max delay (cycles): 4\n"));
    assert!(report.contains("% Total energy (J): 0.333333\n"));
    assert!(report.contains("\n\nmax_delay = [\n[        4]\n[       -1]\n];\n"));
}
