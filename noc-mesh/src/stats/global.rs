// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Network-wide statistics.
//!
//! [`GlobalStats`] borrows a built [`Mesh`] and reduces the statistics kept
//! by every router. Reductions that have no data to work with return `None`
//! and are printed as `nan` in the report. Other floating point values are
//! printed with six significant digits.

use std::cell::Cell;
use std::fmt::Display;
use std::io::{self, Write};

use crate::config::NocConfig;
use crate::coord::Coord;
use crate::mesh::Mesh;
use crate::sim_error;
use crate::stats::{Matrix, Significant};
use crate::tile::Tile;
use crate::types::SimError;

pub struct GlobalStats<'a> {
    mesh: &'a Mesh,
    config: &'a NocConfig,

    /// Flits drained by all routers, accumulated by
    /// [`received_flits`](Self::received_flits) when diagnostics are enabled.
    drained_total: Cell<u64>,
}

fn tile_max_delay(tile: &Tile) -> f64 {
    let stats = tile.router().stats();
    if stats.received_packets() > 0 {
        stats.max_delay()
    } else {
        -1.0
    }
}

impl<'a> GlobalStats<'a> {
    #[must_use]
    pub fn new(mesh: &'a Mesh, config: &'a NocConfig) -> Self {
        Self {
            mesh,
            config,
            drained_total: Cell::new(0),
        }
    }

    fn destination(&self, dst_id: usize) -> Result<&'a Tile, SimError> {
        match self.mesh.search_node(dst_id) {
            Some(tile) => Ok(tile),
            None => sim_error!(format!(
                "Node {dst_id} is not in the {} mesh",
                self.mesh.dims()
            )),
        }
    }

    /// Mean packet delay weighted by the packets each tile received.
    #[must_use]
    pub fn average_delay(&self) -> Option<f64> {
        let (total_packets, weighted) = self
            .mesh
            .tiles()
            .iter()
            .map(|t| t.router().stats())
            .filter(|s| s.received_packets() > 0)
            .fold((0, 0.0), |(packets, delay), s| {
                (
                    packets + s.received_packets(),
                    delay + s.received_packets() as f64 * s.average_delay(),
                )
            });
        (total_packets > 0).then(|| weighted / total_packets as f64)
    }

    /// Mean delay of packets from `src_id` delivered to `dst_id`.
    pub fn average_delay_between(&self, src_id: usize, dst_id: usize) -> Result<f64, SimError> {
        Ok(self
            .destination(dst_id)?
            .router()
            .stats()
            .average_delay_from(src_id))
    }

    /// The largest delay seen anywhere, `-1.0` if nothing was received.
    #[must_use]
    pub fn max_delay(&self) -> f64 {
        self.mesh
            .tiles()
            .iter()
            .map(tile_max_delay)
            .fold(-1.0, f64::max)
    }

    /// The largest delay seen by node `node_id`, `-1.0` if it received
    /// nothing.
    pub fn max_delay_of(&self, node_id: usize) -> Result<f64, SimError> {
        let dims = self.mesh.dims();
        match dims.id_to_coord(node_id).and_then(|c| self.mesh.tile(&c)) {
            Some(tile) => Ok(tile_max_delay(tile)),
            None => sim_error!(format!("Node {node_id} is not in the {dims} mesh")),
        }
    }

    pub fn max_delay_between(&self, src_id: usize, dst_id: usize) -> Result<f64, SimError> {
        Ok(self
            .destination(dst_id)?
            .router()
            .stats()
            .max_delay_from(src_id))
    }

    #[must_use]
    pub fn max_delay_matrix(&self) -> Matrix<f64> {
        self.matrix(tile_max_delay)
    }

    /// Mean throughput weighted by the number of communications each tile
    /// received.
    #[must_use]
    pub fn average_throughput(&self) -> Option<f64> {
        let (total_comms, weighted) = self
            .mesh
            .tiles()
            .iter()
            .map(|t| t.router().stats())
            .filter(|s| s.total_communications() > 0)
            .fold((0, 0.0), |(comms, throughput), s| {
                (
                    comms + s.total_communications(),
                    throughput + s.total_communications() as f64 * s.average_throughput(),
                )
            });
        (total_comms > 0).then(|| weighted / total_comms as f64)
    }

    pub fn average_throughput_between(
        &self,
        src_id: usize,
        dst_id: usize,
    ) -> Result<f64, SimError> {
        Ok(self
            .destination(dst_id)?
            .router()
            .stats()
            .average_throughput_from(src_id))
    }

    #[must_use]
    pub fn received_packets(&self) -> u64 {
        self.mesh
            .tiles()
            .iter()
            .map(|t| t.router().stats().received_packets())
            .sum()
    }

    #[must_use]
    pub fn received_flits(&self) -> u64 {
        if self.config.diagnostics {
            let drained: u64 = self.mesh.tiles().iter().map(|t| t.router().drained()).sum();
            self.drained_total.set(self.drained_total.get() + drained);
        }
        self.mesh
            .tiles()
            .iter()
            .map(|t| t.router().stats().received_flits())
            .sum()
    }

    /// Drained flits accumulated so far. Always zero unless diagnostics are
    /// enabled.
    #[must_use]
    pub fn drained_total(&self) -> u64 {
        self.drained_total.get()
    }

    /// Received flits per cycle per tile that received any flits.
    #[must_use]
    pub fn throughput(&self) -> Option<f64> {
        let total_cycles = self
            .config
            .simulation_time
            .saturating_sub(self.config.stats_warm_up_time);
        let (tiles_with_flits, total_flits) = self
            .mesh
            .tiles()
            .iter()
            .map(|t| t.router().stats().received_flits())
            .filter(|flits| *flits > 0)
            .fold((0u64, 0u64), |(n, total), flits| (n + 1, total + flits));

        let divisor = total_cycles * tiles_with_flits;
        (divisor > 0).then(|| total_flits as f64 / divisor as f64)
    }

    #[must_use]
    pub fn routed_flits_matrix(&self) -> Matrix<u64> {
        self.matrix(|tile| tile.router().routed_flits())
    }

    /// Total energy consumed by all routers, in Joules.
    #[must_use]
    pub fn power(&self) -> f64 {
        self.mesh.tiles().iter().map(|t| t.router().power()).sum()
    }

    fn matrix<T>(&self, f: impl Fn(&Tile) -> T) -> Matrix<T> {
        let dims = self.mesh.dims();
        Matrix::from_fn(dims, |coord: Coord| {
            f(&self.mesh.tiles()[dims.coord_to_id(&coord)])
        })
    }

    /// Write the summary and, when `detailed`, the per-node tables and the
    /// max delay and routed flits matrices.
    pub fn report(&self, w: &mut dyn Write, detailed: bool) -> io::Result<()> {
        writeln!(w, "% Total received packets: {}", self.received_packets())?;
        writeln!(w, "% Total received flits: {}", self.received_flits())?;
        writeln!(
            w,
            "% Global average delay (cycles): {}",
            NoData(self.average_delay().map(Significant))
        )?;
        writeln!(
            w,
            "% Global average throughput (flits/cycle): {}",
            NoData(self.average_throughput().map(Significant))
        )?;
        writeln!(
            w,
            "% Throughput (flits/cycle/IP): {}",
            NoData(self.throughput().map(Significant))
        )?;
        writeln!(w, "% Max delay (cycles): {}", Significant(self.max_delay()))?;
        writeln!(w, "% Total energy (J): {}", Significant(self.power()))?;

        if !detailed {
            return Ok(());
        }

        writeln!(w)?;
        writeln!(w, "detailed = [")?;
        for coord in self.mesh.dims().coords() {
            if let Some(tile) = self.mesh.tile(&coord) {
                tile.router().stats().write_detailed(w, true)?;
            }
        }
        writeln!(w, "];")?;

        writeln!(w)?;
        writeln!(w, "max_delay = [")?;
        self.max_delay_matrix().map(|v| Significant(*v)).write_rows(w)?;
        writeln!(w, "];")?;

        writeln!(w)?;
        writeln!(w, "routed_flits = [")?;
        self.routed_flits_matrix().write_rows(w)?;
        writeln!(w, "];")
    }
}

/// Prints a missing value as `nan`.
struct NoData<T>(Option<T>);

impl<T: Display> Display for NoData<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.0 {
            Some(value) => value.fmt(f),
            None => write!(f, "nan"),
        }
    }
}
