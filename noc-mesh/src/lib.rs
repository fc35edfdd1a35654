// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A 3D mesh Network-on-Chip.
//!
//! A [`Mesh`](crate::mesh::Mesh) is an `X x Y x Z` grid of
//! [`Tile`](crate::tile::Tile)s. Every tile holds a router and a processing
//! element and has a port in each of the six mesh directions. Ports of
//! neighbouring tiles share a [`Link`](crate::link::Link), while ports on
//! the edge of the mesh are left unconnected.
//!
//! Once a simulation has run, [`GlobalStats`](crate::stats::GlobalStats)
//! reduces the statistics kept by each router into network-wide figures and
//! writes a text report.
//!
//! ```rust
//! use noc_mesh::clock::{Clock, Reset};
//! use noc_mesh::config::NocConfig;
//! use noc_mesh::mesh::Mesh;
//! use noc_mesh::stats::GlobalStats;
//! use noc_track::entity::toplevel;
//! use noc_track::tracker::dev_null_tracker;
//!
//! let top = toplevel(&dev_null_tracker(), "top");
//! let config = NocConfig::default();
//! let mesh = Mesh::build(&top, "noc", &config, &Clock::new(), &Reset::new()).unwrap();
//!
//! let stats = GlobalStats::new(&mesh, &config);
//! assert_eq!(stats.received_packets(), 0);
//! assert_eq!(stats.average_delay(), None);
//! ```

pub mod clock;
pub mod config;
pub mod coord;
pub mod flit;
pub mod link;
pub mod mesh;
pub mod pe;
pub mod power;
pub mod router;
pub mod stats;
pub mod tables;
pub mod test_helpers;
pub mod tile;
pub mod types;
