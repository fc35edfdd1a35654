// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Build a 3D mesh Network-on-Chip and report its statistics.
//!
//! The configuration is assembled from the built-in defaults, an optional
//! TOML file (`--conf-file`), `NOC_` environment variables and finally the
//! command-line options.
//!
//! # Examples
//!
//! Build a 4x4x2 mesh with TSVs on two tiles of the upper layer and show
//! the build log:
//! ```txt
//! cargo run --bin noc-sim -- --mesh-dim-z 2 --tsv-placement listed --tsv-nodes 16,21 --stdout
//! ```
//!
//! Print the detailed report for a mesh described in a file:
//! ```txt
//! NOC_BUFFER_DEPTH=8 cargo run --bin noc-sim -- --conf-file noc.toml --detailed
//! ```

pub mod cli;
pub mod tracker_builder;
