// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Helpers shared by the unit tests, integration tests and benchmarks.

use std::path::Path;
use std::sync::Arc;

use noc_track::entity::{Entity, toplevel};
use noc_track::tracker::dev_null_tracker;

use crate::clock::{Clock, Reset};
use crate::config::NocConfig;
use crate::flit::{Flit, FlitType};
use crate::mesh::Mesh;
use crate::tile::Tile;
use crate::types::SimError;

/// Create the top-level entity for a test named after its source file.
#[must_use]
pub fn start_test(full_filepath: &str) -> Arc<Entity> {
    let name = Path::new(full_filepath)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("test");
    toplevel(&dev_null_tracker(), name)
}

/// A valid configuration for an `x` by `y` by `z` mesh with short run times.
#[must_use]
pub fn mesh_config(x: usize, y: usize, z: usize) -> NocConfig {
    NocConfig {
        mesh_dim_x: x,
        mesh_dim_y: y,
        mesh_dim_z: z,
        stats_warm_up_time: 0,
        simulation_time: 100,
        ..Default::default()
    }
}

/// Build a mesh with its own clock and reset.
pub fn build_mesh(top: &Arc<Entity>, config: &NocConfig) -> Result<Mesh, SimError> {
    Mesh::build(top, "noc", config, &Clock::new(), &Reset::new())
}

/// Deliver `num_packets` single flit packets from `src_id` to `tile`, each
/// taking `delay` cycles.
pub fn deliver_packets(tile: &mut Tile, src_id: usize, delay: f64, num_packets: usize) {
    let dst_id = tile.router().local_id();
    for i in 0..num_packets {
        let created = i as f64;
        let flit = Flit::new(src_id, dst_id, FlitType::Head, 0, created);
        tile.router_mut().record_drained(created + delay, &flit);
    }
}
