// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use figment::providers::Serialized;
use noc_mesh::config::{NocConfig, RoutingAlgorithm, TrafficDistribution, TsvPlacement};
use noc_mesh::types::SimError;
use serde::Serialize;

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Build a 3D mesh Network-on-Chip and report its statistics")]
pub struct Cli {
    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    pub stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    pub stdout_level: log::Level,

    /// Set a regular expression for which entites should have logging level set
    /// to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    pub stdout_filter_regex: String,

    /// TOML file overriding the default configuration.
    #[arg(long)]
    pub conf_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

/// Configuration values given on the command line. These take priority over
/// every other source.
#[derive(clap::Args, Debug, Default, Serialize)]
pub struct Overrides {
    /// Number of tiles along X.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_dim_x: Option<usize>,

    /// Number of tiles along Y.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_dim_y: Option<usize>,

    /// Number of layers.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_dim_z: Option<usize>,

    /// Depth of the router input buffers, in flits.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_depth: Option<usize>,

    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_algorithm: Option<RoutingAlgorithm>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_table_filename: Option<PathBuf>,

    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_distribution: Option<TrafficDistribution>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_table_filename: Option<PathBuf>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet_injection_rate: Option<f64>,

    /// Cycles before statistics are collected.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_warm_up_time: Option<u64>,

    /// Total cycles simulated.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation_time: Option<u64>,

    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsv_placement: Option<TsvPlacement>,

    /// Comma separated node ids with a TSV, used with `--tsv-placement listed`.
    #[arg(long, value_delimiter = ',')]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tsv_nodes: Vec<usize>,

    /// Print per-node tables and matrices in the report.
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub detailed: bool,

    /// Track extra counters used to check the statistics.
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub diagnostics: bool,
}

impl Cli {
    /// Assemble and validate the configuration from all sources.
    pub fn config(&self) -> Result<NocConfig, SimError> {
        let figment = NocConfig::figment(self.conf_file.as_deref())
            .merge(Serialized::defaults(&self.overrides));
        let config = NocConfig::from_figment(&figment)?;
        config.validate()?;
        Ok(config)
    }
}
