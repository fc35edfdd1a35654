// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::io;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use noc_mesh::clock::{Clock, Reset};
use noc_mesh::config::NocConfig;
use noc_mesh::mesh::Mesh;
use noc_mesh::stats::GlobalStats;
use noc_mesh::test_helpers::{deliver_packets, mesh_config};
use noc_track::entity::toplevel;
use noc_track::tracker::dev_null_tracker;

fn build(config: &NocConfig) -> Mesh {
    // Avoid any logging overheads
    let top = toplevel(&dev_null_tracker(), "top");
    Mesh::build(&top, "noc", config, &Clock::new(), &Reset::new()).unwrap()
}

fn loaded_mesh(config: &NocConfig) -> Mesh {
    let mut mesh = build(config);
    let num_nodes = mesh.dims().num_nodes();
    for (id, tile) in mesh.tiles_mut().iter_mut().enumerate() {
        let src = (id + 1) % num_nodes;
        deliver_packets(tile, src, (id % 7) as f64 + 1.0, 16);
        for _ in 0..id {
            tile.router_mut().record_routed_flit();
        }
    }
    mesh
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for (x, y, z) in [(8, 8, 1), (8, 8, 4)] {
        let config = mesh_config(x, y, z);
        group.bench_function(format!("{x}x{y}x{z}"), |b| {
            b.iter(|| build(&config));
        });
    }

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");

    let config = mesh_config(8, 8, 4);
    group.bench_function("report", |b| {
        b.iter_batched(
            || loaded_mesh(&config),
            |mesh| {
                let stats = GlobalStats::new(&mesh, &config);
                stats.report(&mut io::sink(), true).unwrap();
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = bench_build, bench_stats
}
criterion_main!(benches);
