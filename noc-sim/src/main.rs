// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Build a 3D mesh Network-on-Chip and report its statistics.
//!
//! See `lib.rs` for details.

use std::io;

use clap::Parser;
use noc_mesh::clock::{Clock, Reset};
use noc_mesh::mesh::Mesh;
use noc_mesh::sim_error;
use noc_mesh::stats::GlobalStats;
use noc_mesh::types::SimError;
use noc_sim::cli::Cli;
use noc_sim::tracker_builder::setup_trackers;
use noc_track::entity::toplevel;
use noc_track::{error, info};

fn main() -> Result<(), SimError> {
    let args = Cli::parse();

    let tracker = match setup_trackers(args.stdout, args.stdout_level, &args.stdout_filter_regex)
    {
        Ok(tracker) => tracker,
        Err(e) => return sim_error!(e),
    };
    let top = toplevel(&tracker, "top");

    let config = args.config().inspect_err(|e| {
        error!(top ; "{e}");
    })?;
    info!(top ; "Building {} mesh", config.dims());

    let clock = Clock::new();
    let reset = Reset::new();
    let result = Mesh::build(&top, "noc", &config, &clock, &reset).and_then(|mesh| {
        let stats = GlobalStats::new(&mesh, &config);
        match stats.report(&mut io::stdout().lock(), config.detailed) {
            Ok(()) => Ok(()),
            Err(e) => sim_error!(format!("Failed to write report: {e}")),
        }
    });

    tracker.shutdown();
    result
}
