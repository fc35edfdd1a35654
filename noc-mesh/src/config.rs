// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Configuration of a mesh.
//!
//! A [`NocConfig`] is assembled from several sources, each overriding the
//! previous one:
//!
//!  1. the built-in defaults
//!  2. an optional TOML file
//!  3. environment variables prefixed with [`ENV_PREFIX`], with `__`
//!     separating nested keys (`NOC_POWER__ROUTING=1e-12`)
//!
//! Command-line options are merged on top by the application.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::coord::MeshDims;
use crate::power::PowerConfig;
use crate::sim_error;
use crate::types::{SimError, SimResult};

pub const ENV_PREFIX: &str = "NOC_";

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingAlgorithm {
    #[default]
    /// Route along X then Y then Z
    Xy,

    WestFirst,
    NorthLast,
    NegativeFirst,
    OddEven,
    Dyad,

    /// Use the routing table file
    TableBased,
}

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrafficDistribution {
    #[default]
    Uniform,

    Random,
    Transpose1,
    Transpose2,
    BitReversal,
    Butterfly,
    Shuffle,

    /// Use the traffic table file
    TableBased,
}

/// Which tiles have a through-silicon via to the layer below.
#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TsvPlacement {
    #[default]
    /// Every tile
    All,

    /// No tile, the layers are not connected
    #[serde(rename = "none")]
    #[value(name = "none")]
    Disabled,

    /// Only the tiles named in `tsv_nodes`
    Listed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NocConfig {
    pub mesh_dim_x: usize,
    pub mesh_dim_y: usize,
    pub mesh_dim_z: usize,

    /// Depth of each router input buffer, in flits.
    pub buffer_depth: usize,

    pub routing_algorithm: RoutingAlgorithm,
    pub routing_table_filename: Option<PathBuf>,

    pub traffic_distribution: TrafficDistribution,
    pub traffic_table_filename: Option<PathBuf>,

    pub packet_injection_rate: f64,

    /// Cycles before statistics are collected.
    pub stats_warm_up_time: u64,

    /// Total cycles simulated.
    pub simulation_time: u64,

    pub tsv_placement: TsvPlacement,

    /// Node ids with a TSV when `tsv_placement` is `listed`.
    pub tsv_nodes: Vec<usize>,

    /// Print per-node tables and matrices in the report.
    pub detailed: bool,

    /// Track extra counters used to check the statistics.
    pub diagnostics: bool,

    pub power: PowerConfig,
}

impl Default for NocConfig {
    fn default() -> Self {
        Self {
            mesh_dim_x: 4,
            mesh_dim_y: 4,
            mesh_dim_z: 1,
            buffer_depth: 4,
            routing_algorithm: RoutingAlgorithm::default(),
            routing_table_filename: None,
            traffic_distribution: TrafficDistribution::default(),
            traffic_table_filename: None,
            packet_injection_rate: 0.01,
            stats_warm_up_time: 1000,
            simulation_time: 10000,
            tsv_placement: TsvPlacement::default(),
            tsv_nodes: Vec::new(),
            detailed: false,
            diagnostics: false,
            power: PowerConfig::default(),
        }
    }
}

impl NocConfig {
    /// The defaults, the optional `conf_file` and the environment, in
    /// increasing order of priority.
    #[must_use]
    pub fn figment(conf_file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(NocConfig::default()));
        if let Some(conf_file) = conf_file {
            figment = figment.merge(Toml::file(conf_file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: &Figment) -> Result<NocConfig, SimError> {
        figment
            .extract()
            .or_else(|e| sim_error!(format!("Invalid configuration: {e}")))
    }

    /// Load and validate the configuration.
    pub fn load(conf_file: Option<&Path>) -> Result<NocConfig, SimError> {
        let config = Self::from_figment(&Self::figment(conf_file))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn dims(&self) -> MeshDims {
        MeshDims::new(self.mesh_dim_x, self.mesh_dim_y, self.mesh_dim_z)
    }

    pub fn validate(&self) -> SimResult {
        let dims = self.dims();
        let Some(num_nodes) = dims.checked_num_nodes() else {
            return sim_error!(format!("Mesh {dims} has too many nodes"));
        };
        if num_nodes == 0 {
            return sim_error!(format!("Mesh dimensions must all be at least 1, got {dims}"));
        }
        if self.buffer_depth == 0 {
            return sim_error!("Buffer depth must be at least 1");
        }
        if self.stats_warm_up_time >= self.simulation_time {
            return sim_error!(format!(
                "Warm-up time ({}) must be less than the simulation time ({})",
                self.stats_warm_up_time, self.simulation_time
            ));
        }
        if !(0.0..=1.0).contains(&self.packet_injection_rate) {
            return sim_error!(format!(
                "Packet injection rate {} is not in [0, 1]",
                self.packet_injection_rate
            ));
        }
        if self.routing_algorithm == RoutingAlgorithm::TableBased
            && self.routing_table_filename.is_none()
        {
            return sim_error!("Table based routing needs a routing table file");
        }
        if self.traffic_distribution == TrafficDistribution::TableBased
            && self.traffic_table_filename.is_none()
        {
            return sim_error!("Table based traffic needs a traffic table file");
        }
        if self.tsv_placement == TsvPlacement::Listed {
            if let Some(bad) = self.tsv_nodes.iter().find(|id| **id >= num_nodes) {
                return sim_error!(format!("TSV node {bad} is not in the {dims} mesh"));
            }
        }
        Ok(())
    }

    /// Resolve which nodes have a TSV, indexed by node id.
    #[must_use]
    pub fn has_tsv(&self) -> Vec<bool> {
        let num_nodes = self.dims().num_nodes();
        match self.tsv_placement {
            TsvPlacement::All => vec![true; num_nodes],
            TsvPlacement::Disabled => vec![false; num_nodes],
            TsvPlacement::Listed => {
                let mut has_tsv = vec![false; num_nodes];
                for id in &self.tsv_nodes {
                    if let Some(flag) = has_tsv.get_mut(*id) {
                        *flag = true;
                    }
                }
                has_tsv
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = NocConfig::default();
        config.validate().unwrap();
        assert_eq!(config.dims(), MeshDims::new(4, 4, 1));
        assert_eq!(config.has_tsv(), vec![true; 16]);
    }

    #[test]
    fn invalid_configs() {
        let config = NocConfig {
            mesh_dim_y: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = NocConfig {
            stats_warm_up_time: 100,
            simulation_time: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = NocConfig {
            routing_algorithm: RoutingAlgorithm::TableBased,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = NocConfig {
            tsv_placement: TsvPlacement::Listed,
            tsv_nodes: vec![3, 16],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_mesh_is_rejected() {
        let config = NocConfig {
            mesh_dim_x: usize::MAX,
            mesh_dim_y: 2,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.0.contains("too many nodes"));
    }

    #[test]
    fn listed_tsvs() {
        let config = NocConfig {
            mesh_dim_x: 2,
            mesh_dim_y: 1,
            mesh_dim_z: 2,
            tsv_placement: TsvPlacement::Listed,
            tsv_nodes: vec![3],
            ..Default::default()
        };
        assert_eq!(config.has_tsv(), vec![false, false, false, true]);
    }

    #[test]
    fn file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "noc.toml",
                r#"
                mesh_dim_x = 8
                mesh_dim_y = 2
                routing_algorithm = "west-first"
                tsv_placement = "listed"
                tsv_nodes = [1, 2]

                [power]
                routing = 2.0
                "#,
            )?;
            jail.set_env("NOC_MESH_DIM_Y", "3");
            jail.set_env("NOC_POWER__FORWARD", "5.0");

            let config = NocConfig::load(Some(Path::new("noc.toml"))).unwrap();
            assert_eq!(config.mesh_dim_x, 8);
            assert_eq!(config.mesh_dim_y, 3);
            assert_eq!(config.mesh_dim_z, 1);
            assert_eq!(config.routing_algorithm, RoutingAlgorithm::WestFirst);
            assert_eq!(config.tsv_placement, TsvPlacement::Listed);
            assert_eq!(config.tsv_nodes, vec![1, 2]);
            assert_eq!(config.power.routing, 2.0);
            assert_eq!(config.power.forward, 5.0);
            assert_eq!(config.power.incoming, PowerConfig::default().incoming);
            Ok(())
        });
    }

    #[test]
    fn bad_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("noc.toml", "routing_algorithm = \"sideways\"")?;
            assert!(NocConfig::load(Some(Path::new("noc.toml"))).is_err());
            Ok(())
        });
    }
}
