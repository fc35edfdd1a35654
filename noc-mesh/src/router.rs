// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The router of each tile.
//!
//! The routing and arbitration state machine runs in the simulation engine.
//! This holds what the mesh configures and what the statistics read back.

use std::fmt;
use std::sync::Arc;

use noc_track::entity::Entity;
use noc_track::trace;

use crate::coord::{DIRECTIONS, Direction, RoutePort};
use crate::flit::Flit;
use crate::power::{Power, PowerConfig};
use crate::sim_error;
use crate::stats::RouterStats;
use crate::tables::{LocalRoutingTable, RoutingTable};
use crate::types::SimResult;

const NUM_PORTS: usize = DIRECTIONS + 1;

fn port_index(port: RoutePort) -> usize {
    match port {
        RoutePort::Mesh(direction) => direction.index(),
        RoutePort::Local => DIRECTIONS,
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Reservation {
    #[default]
    Free,

    /// Held by the given input port.
    Reserved(RoutePort),

    /// The output has no neighbour and can never be reserved.
    Invalid,
}

/// Tracks which input port holds each output port.
#[derive(Clone, Debug, Default)]
pub struct ReservationTable {
    outputs: [Reservation; NUM_PORTS],
}

impl ReservationTable {
    /// Permanently remove an output direction.
    pub fn invalidate(&mut self, direction: Direction) {
        self.outputs[direction.index()] = Reservation::Invalid;
    }

    #[must_use]
    pub fn is_invalidated(&self, direction: Direction) -> bool {
        self.outputs[direction.index()] == Reservation::Invalid
    }

    #[must_use]
    pub fn is_available(&self, out_port: RoutePort) -> bool {
        self.outputs[port_index(out_port)] == Reservation::Free
    }

    pub fn reserve(&mut self, in_port: RoutePort, out_port: RoutePort) -> SimResult {
        match self.outputs[port_index(out_port)] {
            Reservation::Free => {
                self.outputs[port_index(out_port)] = Reservation::Reserved(in_port);
                Ok(())
            }
            Reservation::Reserved(holder) => sim_error!(format!(
                "Output {out_port} already reserved by {holder}"
            )),
            Reservation::Invalid => sim_error!(format!("Output {out_port} is invalid")),
        }
    }

    pub fn release(&mut self, out_port: RoutePort) {
        let entry = &mut self.outputs[port_index(out_port)];
        if matches!(entry, Reservation::Reserved(_)) {
            *entry = Reservation::Free;
        }
    }

    /// The output held by `in_port`, if any.
    #[must_use]
    pub fn output_port(&self, in_port: RoutePort) -> Option<RoutePort> {
        Direction::ALL
            .into_iter()
            .map(RoutePort::Mesh)
            .chain(std::iter::once(RoutePort::Local))
            .find(|out| self.outputs[port_index(*out)] == Reservation::Reserved(in_port))
    }
}

pub struct Router {
    pub entity: Arc<Entity>,
    local_id: usize,
    buffer_depth: usize,
    routing_table: Option<LocalRoutingTable>,
    pub reservation_table: ReservationTable,
    stats: RouterStats,
    power: Power,
    routed_flits: u64,
    local_drained: u64,
}

impl Router {
    #[must_use]
    pub fn new(parent: &Arc<Entity>, power_config: PowerConfig) -> Self {
        Self {
            entity: Arc::new(Entity::new(parent, "router")),
            local_id: 0,
            buffer_depth: 0,
            routing_table: None,
            reservation_table: ReservationTable::default(),
            stats: RouterStats::default(),
            power: Power::new(power_config),
            routed_flits: 0,
            local_drained: 0,
        }
    }

    /// Set the identity of this router. A local routing table is only kept
    /// when `routing_table` is valid.
    pub fn configure(
        &mut self,
        local_id: usize,
        warm_up_time: f64,
        buffer_depth: usize,
        routing_table: &RoutingTable,
    ) {
        self.local_id = local_id;
        self.buffer_depth = buffer_depth;
        self.stats.configure(local_id, warm_up_time);
        self.routing_table = routing_table
            .is_valid()
            .then(|| routing_table.local_table(local_id));
        trace!(self.entity ; "configured as node {local_id}, buffer depth {buffer_depth}");
    }

    #[must_use]
    pub fn local_id(&self) -> usize {
        self.local_id
    }

    #[must_use]
    pub fn buffer_depth(&self) -> usize {
        self.buffer_depth
    }

    #[must_use]
    pub fn routing_table(&self) -> Option<&LocalRoutingTable> {
        self.routing_table.as_ref()
    }

    #[must_use]
    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Account for a flit read into an input buffer.
    pub fn record_incoming_flit(&mut self) {
        self.power.incoming();
    }

    /// Account for a flit that was routed and forwarded through the crossbar.
    pub fn record_routed_flit(&mut self) {
        self.routed_flits += 1;
        self.power.routing();
        self.power.selection();
        self.power.forward();
    }

    /// Account for an idle cycle.
    pub fn record_standby(&mut self) {
        self.power.standby();
    }

    /// Account for a flit delivered to the local PE.
    pub fn record_drained(&mut self, arrival_time: f64, flit: &Flit) {
        self.local_drained += 1;
        self.stats.received_flit(arrival_time, flit);
    }

    #[must_use]
    pub fn routed_flits(&self) -> u64 {
        self.routed_flits
    }

    #[must_use]
    pub fn drained(&self) -> u64 {
        self.local_drained
    }

    /// Energy consumed so far, in Joules.
    #[must_use]
    pub fn power(&self) -> f64 {
        self.power.total()
    }
}

impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.entity)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use noc_track::entity::toplevel;
    use noc_track::tracker::dev_null_tracker;

    use super::*;
    use crate::flit::FlitType;

    #[test]
    fn reservations() {
        let mut table = ReservationTable::default();
        let east = RoutePort::Mesh(Direction::East);
        let north = RoutePort::Mesh(Direction::North);

        assert!(table.is_available(east));
        table.reserve(RoutePort::Local, east).unwrap();
        assert!(!table.is_available(east));
        assert!(table.reserve(north, east).is_err());
        assert_eq!(table.output_port(RoutePort::Local), Some(east));

        table.release(east);
        assert!(table.is_available(east));
        assert_eq!(table.output_port(RoutePort::Local), None);

        table.invalidate(Direction::North);
        assert!(table.is_invalidated(Direction::North));
        assert!(!table.is_available(north));
        assert!(table.reserve(RoutePort::Local, north).is_err());
        table.release(north);
        assert!(table.is_invalidated(Direction::North));
    }

    #[test]
    fn configure_keeps_table_only_when_valid() {
        let top = toplevel(&dev_null_tracker(), "top");
        let mut router = Router::new(&top, PowerConfig::default());

        router.configure(3, 0.0, 4, &RoutingTable::default());
        assert_eq!(router.local_id(), 3);
        assert_eq!(router.buffer_depth(), 4);
        assert!(router.routing_table().is_none());

        let table = RoutingTable::parse("3 L 0 W").unwrap();
        router.configure(3, 0.0, 4, &table);
        assert_eq!(router.routing_table().map(LocalRoutingTable::len), Some(1));
    }

    #[test]
    fn counters() {
        let top = toplevel(&dev_null_tracker(), "top");
        let mut router = Router::new(&top, PowerConfig::default());
        router.configure(0, 0.0, 4, &RoutingTable::default());

        router.record_incoming_flit();
        router.record_routed_flit();
        router.record_routed_flit();
        router.record_drained(5.0, &Flit::new(1, 0, FlitType::Head, 0, 1.0));

        assert_eq!(router.routed_flits(), 2);
        assert_eq!(router.drained(), 1);
        assert_eq!(router.stats().received_packets(), 1);
        assert!(router.power() > 0.0);
    }

    #[test]
    fn idle_cycles_use_standby_energy() {
        let top = toplevel(&dev_null_tracker(), "top");
        let config = PowerConfig::default();
        let mut router = Router::new(&top, config);

        for _ in 0..10 {
            router.record_standby();
        }
        assert_relative_eq!(router.power(), 10.0 * config.standby);
        assert_eq!(router.routed_flits(), 0);
    }
}
