// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Links between neighbouring tiles.
//!
//! A [`Link`] is a pair of half-channels, one travelling towards the higher
//! coordinate ([`Half::Forward`]) and one towards the lower
//! ([`Half::Backward`]). Every half-channel carries a request flag, a flit,
//! a free slot counter and a NoP record written by the upstream tile, and an
//! acknowledge flag written by the downstream tile.
//!
//! All links live in a [`LinkRegistry`] and tiles refer to them by
//! [`LinkId`]. Neighbouring tiles share one link. Ports with no neighbour are
//! given a private placeholder link so every port can be read and written in
//! the same way.

use std::cell::Cell;
use std::fmt;

use crate::coord::{Axis, Coord, DIRECTIONS, MeshDims};
use crate::flit::Flit;
use crate::types::NOT_VALID;

/// Buffer status a router advertises for one of its input directions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ChannelStatus {
    pub free_slots: i32,
    pub available: bool,
}

/// Neighbour-on-Path data exchanged between adjacent routers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NopData {
    pub sender_id: i32,
    pub channel_status_neighbor: [ChannelStatus; DIRECTIONS],
}

impl NopData {
    /// The record carried by a link with no sender.
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            sender_id: NOT_VALID,
            channel_status_neighbor: [ChannelStatus {
                free_slots: NOT_VALID,
                available: false,
            }; DIRECTIONS],
        }
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        *self == Self::invalid()
    }
}

impl Default for NopData {
    fn default() -> Self {
        Self::invalid()
    }
}

/// One direction of a link.
#[derive(Debug, Default)]
pub struct Channel {
    pub req: Cell<bool>,
    pub ack: Cell<bool>,
    pub flit: Cell<Flit>,
    pub free_slots: Cell<i32>,
    pub nop_data: Cell<NopData>,
}

impl Channel {
    fn placeholder() -> Self {
        Self {
            free_slots: Cell::new(NOT_VALID),
            ..Default::default()
        }
    }

    /// Drop any handshake in flight.
    pub fn clear_handshake(&self) {
        self.req.set(false);
        self.ack.set(false);
    }

    /// Mark the channel as carrying no valid flow control data.
    pub fn invalidate(&self) {
        self.free_slots.set(NOT_VALID);
        self.nop_data.set(NopData::invalid());
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Half {
    /// Travels towards the higher coordinate.
    Forward,

    /// Travels towards the lower coordinate.
    Backward,
}

impl Half {
    #[must_use]
    pub fn other(self) -> Half {
        match self {
            Half::Forward => Half::Backward,
            Half::Backward => Half::Forward,
        }
    }
}

#[derive(Debug, Default)]
pub struct Link {
    pub forward: Channel,
    pub backward: Channel,
}

impl Link {
    /// A link bound to a port with no neighbour.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            forward: Channel::placeholder(),
            backward: Channel::placeholder(),
        }
    }

    #[must_use]
    pub fn half(&self, half: Half) -> &Channel {
        match half {
            Half::Forward => &self.forward,
            Half::Backward => &self.backward,
        }
    }
}

/// Index of a [`Link`] in a [`LinkRegistry`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LinkId(usize);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "link{}", self.0)
    }
}

/// Arena of every link in a mesh.
///
/// Shared links are addressed by the axis they run along and the coordinate
/// of their lower end. Each axis owns a block of slots sized by the mesh
/// dimensions with that axis shortened by one.
pub struct LinkRegistry {
    dims: MeshDims,
    links: Vec<Link>,
    shared: Vec<Option<LinkId>>,
    block_offsets: [usize; 3],
    num_shared: usize,
}

fn block_dims(dims: &MeshDims, axis: Axis) -> MeshDims {
    let mut block = *dims;
    match axis {
        Axis::X => block.x = block.x.saturating_sub(1),
        Axis::Y => block.y = block.y.saturating_sub(1),
        Axis::Z => block.z = block.z.saturating_sub(1),
    }
    block
}

impl LinkRegistry {
    #[must_use]
    pub fn new(dims: MeshDims) -> Self {
        let mut block_offsets = [0; 3];
        let mut num_slots = 0;
        for axis in Axis::ALL {
            block_offsets[axis.index()] = num_slots;
            num_slots += block_dims(&dims, axis).num_nodes();
        }
        Self {
            dims,
            links: Vec::new(),
            shared: vec![None; num_slots],
            block_offsets,
            num_shared: 0,
        }
    }

    fn slot(&self, axis: Axis, lower: &Coord) -> Option<usize> {
        let block = block_dims(&self.dims, axis);
        block
            .contains(lower)
            .then(|| self.block_offsets[axis.index()] + block.coord_to_id(lower))
    }

    /// Return the link running along `axis` from `lower` to its neighbour,
    /// creating it on first use. Returns `None` when `lower` has no
    /// neighbour along `axis`.
    pub fn shared_link(&mut self, axis: Axis, lower: &Coord) -> Option<LinkId> {
        let slot = self.slot(axis, lower)?;
        if let Some(id) = self.shared[slot] {
            return Some(id);
        }
        let id = self.push(Link::default());
        self.shared[slot] = Some(id);
        self.num_shared += 1;
        Some(id)
    }

    /// Look up an existing shared link without creating it.
    #[must_use]
    pub fn find_shared_link(&self, axis: Axis, lower: &Coord) -> Option<LinkId> {
        self.slot(axis, lower).and_then(|slot| self.shared[slot])
    }

    /// Allocate a private link for a port with no neighbour.
    pub fn add_placeholder(&mut self) -> LinkId {
        self.push(Link::placeholder())
    }

    fn push(&mut self, link: Link) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(link);
        id
    }

    /// Ids are only handed out by this registry so they are always in range.
    #[must_use]
    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    #[must_use]
    pub fn num_shared(&self) -> usize {
        self.num_shared
    }

    #[must_use]
    pub fn num_placeholders(&self) -> usize {
        self.links.len() - self.num_shared
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
