// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Statistics collected by each router about the flits it delivers.

use std::io::{self, Write};

use crate::flit::Flit;

/// Everything received from one source.
#[derive(Clone, Debug)]
struct CommHistory {
    src_id: usize,
    delays: Vec<f64>,
    total_received_flits: u64,
    last_received_flit_time: f64,
}

impl CommHistory {
    fn new(src_id: usize) -> Self {
        Self {
            src_id,
            delays: Vec::new(),
            total_received_flits: 0,
            last_received_flit_time: 0.0,
        }
    }

    fn average_delay(&self) -> f64 {
        if self.delays.is_empty() {
            return 0.0;
        }
        self.delays.iter().sum::<f64>() / self.delays.len() as f64
    }

    fn max_delay(&self) -> f64 {
        self.delays.iter().copied().fold(-1.0, f64::max)
    }

    fn average_throughput(&self, warm_up_time: f64) -> f64 {
        let elapsed = self.last_received_flit_time - warm_up_time;
        if self.total_received_flits == 0 || elapsed <= 0.0 {
            return 0.0;
        }
        self.total_received_flits as f64 / elapsed
    }
}

/// Per-router record of received packets and flits, kept per source.
#[derive(Clone, Debug, Default)]
pub struct RouterStats {
    id: usize,
    warm_up_time: f64,
    history: Vec<CommHistory>,
}

impl RouterStats {
    pub fn configure(&mut self, id: usize, warm_up_time: f64) {
        self.id = id;
        self.warm_up_time = warm_up_time;
        self.history.clear();
    }

    fn comm(&self, src_id: usize) -> Option<&CommHistory> {
        self.history.iter().find(|c| c.src_id == src_id)
    }

    /// Record a flit delivered to the local PE at `arrival_time`.
    ///
    /// Flits arriving during warm-up are ignored. A delay is recorded for
    /// each head flit.
    pub fn received_flit(&mut self, arrival_time: f64, flit: &Flit) {
        if arrival_time < self.warm_up_time {
            return;
        }

        let index = match self.history.iter().position(|c| c.src_id == flit.src_id) {
            Some(index) => index,
            None => {
                self.history.push(CommHistory::new(flit.src_id));
                self.history.len() - 1
            }
        };

        let comm = &mut self.history[index];
        if flit.is_head() {
            comm.delays.push(arrival_time - flit.timestamp);
        }
        comm.total_received_flits += 1;
        comm.last_received_flit_time = arrival_time;
    }

    /// Packet-weighted mean delay over all sources.
    #[must_use]
    pub fn average_delay(&self) -> f64 {
        let packets = self.received_packets();
        if packets == 0 {
            return 0.0;
        }
        let total: f64 = self.history.iter().flat_map(|c| c.delays.iter()).sum();
        total / packets as f64
    }

    #[must_use]
    pub fn average_delay_from(&self, src_id: usize) -> f64 {
        self.comm(src_id).map_or(0.0, CommHistory::average_delay)
    }

    /// The largest delay seen, or `-1.0` if nothing was received.
    #[must_use]
    pub fn max_delay(&self) -> f64 {
        self.history
            .iter()
            .map(CommHistory::max_delay)
            .fold(-1.0, f64::max)
    }

    #[must_use]
    pub fn max_delay_from(&self, src_id: usize) -> f64 {
        self.comm(src_id).map_or(-1.0, CommHistory::max_delay)
    }

    /// Mean of the per-source throughputs.
    #[must_use]
    pub fn average_throughput(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .history
            .iter()
            .map(|c| c.average_throughput(self.warm_up_time))
            .sum();
        total / self.history.len() as f64
    }

    #[must_use]
    pub fn average_throughput_from(&self, src_id: usize) -> f64 {
        self.comm(src_id)
            .map_or(0.0, |c| c.average_throughput(self.warm_up_time))
    }

    #[must_use]
    pub fn received_packets(&self) -> u64 {
        self.history.iter().map(|c| c.delays.len() as u64).sum()
    }

    #[must_use]
    pub fn received_flits(&self) -> u64 {
        self.history.iter().map(|c| c.total_received_flits).sum()
    }

    /// Number of distinct sources this router has received from.
    #[must_use]
    pub fn total_communications(&self) -> usize {
        self.history.len()
    }

    /// Write one row per source received from, optionally preceded by a
    /// header.
    pub fn write_detailed(&self, w: &mut dyn Write, header: bool) -> io::Result<()> {
        if header {
            writeln!(
                w,
                "%{:>7}{:>8}{:>12}{:>12}{:>16}{:>18}{:>16}",
                "src", "dst", "avg_delay", "max_delay", "avg_throughput", "received_packets",
                "received_flits"
            )?;
        }
        for c in &self.history {
            writeln!(
                w,
                "{:>8}{:>8}{:>12.3}{:>12.3}{:>16.6}{:>18}{:>16}",
                c.src_id,
                self.id,
                c.average_delay(),
                c.max_delay(),
                c.average_throughput(self.warm_up_time),
                c.delays.len(),
                c.total_received_flits
            )?;
        }
        Ok(())
    }
}
