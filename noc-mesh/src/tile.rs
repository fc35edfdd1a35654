// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A tile of the mesh: one router, one processing element and a port per
//! direction.
//!
//! Ports refer to links by [`LinkId`]. Reading or writing a port goes through
//! a [`PortView`] obtained from the [`Mesh`](crate::mesh::Mesh), which maps
//! each signal onto the correct half of the link:
//!
//! | signal                                        | half     |
//! |-----------------------------------------------|----------|
//! | `req_tx`, `flit_tx`, `free_slots`, `nop_data_out` | outgoing |
//! | `req_rx`, `flit_rx`, `free_slots_neighbor`, `nop_data_in` | incoming |
//! | `ack_rx`                                      | outgoing |
//! | `ack_tx`                                      | incoming |

use std::fmt;
use std::sync::Arc;

use noc_track::entity::Entity;

use crate::clock::{Clock, Reset};
use crate::coord::{Coord, DIRECTIONS, Direction};
use crate::flit::Flit;
use crate::link::{Channel, Half, Link, LinkId, NopData};
use crate::pe::ProcessingElement;
use crate::power::PowerConfig;
use crate::router::Router;

/// How a tile port is attached to a link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PortBinding {
    pub link: LinkId,

    /// The half of the link carrying traffic out of this tile.
    pub outgoing: Half,

    /// False when the port is bound to a private placeholder.
    pub connected: bool,
}

impl PortBinding {
    /// Traffic leaving in an increasing direction travels forward.
    #[must_use]
    pub fn new(link: LinkId, direction: Direction, connected: bool) -> Self {
        let outgoing = if direction.is_increasing() {
            Half::Forward
        } else {
            Half::Backward
        };
        Self {
            link,
            outgoing,
            connected,
        }
    }
}

pub struct Tile {
    pub entity: Arc<Entity>,
    coord: Coord,
    router: Router,
    pe: ProcessingElement,
    clock: Clock,
    reset: Reset,
    ports: [Option<PortBinding>; DIRECTIONS],
}

impl Tile {
    #[must_use]
    pub fn new(
        parent: &Arc<Entity>,
        coord: Coord,
        power_config: PowerConfig,
        clock: &Clock,
        reset: &Reset,
    ) -> Self {
        let name = format!("Tile[{:02}][{:02}][{:02}]", coord.x, coord.y, coord.z);
        let entity = Arc::new(Entity::new(parent, &name));
        Self {
            router: Router::new(&entity, power_config),
            pe: ProcessingElement::new(&entity),
            entity,
            coord,
            clock: clock.clone(),
            reset: reset.clone(),
            ports: [None; DIRECTIONS],
        }
    }

    #[must_use]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    #[must_use]
    pub fn pe(&self) -> &ProcessingElement {
        &self.pe
    }

    pub fn pe_mut(&mut self) -> &mut ProcessingElement {
        &mut self.pe
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[must_use]
    pub fn reset(&self) -> &Reset {
        &self.reset
    }

    pub(crate) fn bind(&mut self, direction: Direction, binding: PortBinding) {
        self.ports[direction.index()] = Some(binding);
    }

    /// The binding of the port in `direction`. Every port is bound once the
    /// mesh is built.
    #[must_use]
    pub fn binding(&self, direction: Direction) -> Option<PortBinding> {
        self.ports[direction.index()]
    }

    #[must_use]
    pub fn is_connected(&self, direction: Direction) -> bool {
        self.binding(direction).is_some_and(|b| b.connected)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.entity)
    }
}

/// The signals of one tile port.
///
/// Each setter drives a field that only this side of the link writes.
pub struct PortView<'a> {
    link: &'a Link,
    outgoing: Half,
    connected: bool,
}

impl<'a> PortView<'a> {
    #[must_use]
    pub fn new(link: &'a Link, binding: PortBinding) -> Self {
        Self {
            link,
            outgoing: binding.outgoing,
            connected: binding.connected,
        }
    }

    fn tx(&self) -> &'a Channel {
        self.link.half(self.outgoing)
    }

    fn rx(&self) -> &'a Channel {
        self.link.half(self.outgoing.other())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn set_req_tx(&self, req: bool) {
        self.tx().req.set(req);
    }

    #[must_use]
    pub fn req_tx(&self) -> bool {
        self.tx().req.get()
    }

    #[must_use]
    pub fn req_rx(&self) -> bool {
        self.rx().req.get()
    }

    pub fn set_flit_tx(&self, flit: Flit) {
        self.tx().flit.set(flit);
    }

    #[must_use]
    pub fn flit_rx(&self) -> Flit {
        self.rx().flit.get()
    }

    /// Acknowledge the flit received on this port.
    pub fn set_ack_tx(&self, ack: bool) {
        self.rx().ack.set(ack);
    }

    #[must_use]
    pub fn ack_tx(&self) -> bool {
        self.rx().ack.get()
    }

    /// The acknowledge for the flit sent from this port.
    #[must_use]
    pub fn ack_rx(&self) -> bool {
        self.tx().ack.get()
    }

    /// Advertise the free slots of this tile's input buffer.
    pub fn set_free_slots(&self, free_slots: i32) {
        self.tx().free_slots.set(free_slots);
    }

    #[must_use]
    pub fn free_slots(&self) -> i32 {
        self.tx().free_slots.get()
    }

    #[must_use]
    pub fn free_slots_neighbor(&self) -> i32 {
        self.rx().free_slots.get()
    }

    pub fn set_nop_data_out(&self, nop_data: NopData) {
        self.tx().nop_data.set(nop_data);
    }

    #[must_use]
    pub fn nop_data_out(&self) -> NopData {
        self.tx().nop_data.get()
    }

    #[must_use]
    pub fn nop_data_in(&self) -> NopData {
        self.rx().nop_data.get()
    }

    /// Drop every handshake on the port and mark the data it receives as
    /// invalid.
    pub(crate) fn clear_boundary(&self) {
        self.tx().clear_handshake();
        self.rx().clear_handshake();
        self.rx().invalidate();
    }
}
