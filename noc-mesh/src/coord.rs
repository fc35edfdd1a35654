// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Mesh coordinates, node ids and directions.
//!
//! Node ids are assigned with `x` varying fastest:
//!
//! ```text
//! id = x + y * X + z * X * Y
//! ```
//!
//! Going North decrements `y`, South increments `y`, East increments `x`,
//! West decrements `x`, Up increments `z` and Down decrements `z`.

use std::fmt;

use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// Number of mesh directions a tile can be connected in.
pub const DIRECTIONS: usize = 6;

/// A position in the mesh.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Coord {
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// The adjacent coordinate in `direction`, or `None` when it lies off the
    /// mesh.
    #[must_use]
    pub fn neighbour(&self, direction: Direction, dims: &MeshDims) -> Option<Coord> {
        let Coord { x, y, z } = *self;
        let neighbour = match direction {
            Direction::North => Coord::new(x, y.checked_sub(1)?, z),
            Direction::South => Coord::new(x, y + 1, z),
            Direction::East => Coord::new(x + 1, y, z),
            Direction::West => Coord::new(x.checked_sub(1)?, y, z),
            Direction::Up => Coord::new(x, y, z + 1),
            Direction::Down => Coord::new(x, y, z.checked_sub(1)?),
        };
        dims.contains(&neighbour).then_some(neighbour)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The dimensions of a mesh.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MeshDims {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl MeshDims {
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Number of nodes. Only meaningful once
    /// [`checked_num_nodes`](Self::checked_num_nodes) has been checked.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Number of nodes, or `None` if it does not fit in a `usize`.
    #[must_use]
    pub fn checked_num_nodes(&self) -> Option<usize> {
        self.x.checked_mul(self.y)?.checked_mul(self.z)
    }

    /// A mesh is three dimensional when it has more than one layer.
    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.z > 1
    }

    #[must_use]
    pub fn contains(&self, coord: &Coord) -> bool {
        coord.x < self.x && coord.y < self.y && coord.z < self.z
    }

    #[must_use]
    pub fn coord_to_id(&self, coord: &Coord) -> usize {
        coord.x + coord.y * self.x + coord.z * self.x * self.y
    }

    /// Inverse of [`coord_to_id`](Self::coord_to_id). Returns `None` for ids
    /// outside the mesh.
    #[must_use]
    pub fn id_to_coord(&self, id: usize) -> Option<Coord> {
        if id >= self.num_nodes() {
            return None;
        }
        let layer = self.x * self.y;
        Some(Coord::new(id % self.x, (id % layer) / self.x, id / layer))
    }

    /// Iterate over every coordinate with `x` outermost and `z` innermost.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        iproduct!(0..self.x, 0..self.y, 0..self.z).map(|(x, y, z)| Coord::new(x, y, z))
    }
}

impl fmt::Display for MeshDims {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One of the six directions a tile can be connected in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum Direction {
    North = 0,
    East,
    South,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; DIRECTIONS] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    #[must_use]
    pub fn axis(self) -> Axis {
        match self {
            Direction::East | Direction::West => Axis::X,
            Direction::North | Direction::South => Axis::Y,
            Direction::Up | Direction::Down => Axis::Z,
        }
    }

    /// True for the directions that move to a higher coordinate.
    #[must_use]
    pub fn is_increasing(self) -> bool {
        matches!(self, Direction::East | Direction::South | Direction::Up)
    }

    #[must_use]
    pub fn is_vertical(self) -> bool {
        self.axis() == Axis::Z
    }

    /// Single letter used in routing table files.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
            Direction::Up => 'U',
            Direction::Down => 'D',
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| d.symbol() == symbol.to_ascii_uppercase())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Direction::North => "North",
            Direction::East => "East",
            Direction::South => "South",
            Direction::West => "West",
            Direction::Up => "Up",
            Direction::Down => "Down",
        };
        write!(f, "{name}")
    }
}

/// A router port: one of the mesh directions or the local PE.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum RoutePort {
    Mesh(Direction),
    Local,
}

impl RoutePort {
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            RoutePort::Mesh(direction) => direction.symbol(),
            RoutePort::Local => 'L',
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<RoutePort> {
        if symbol.eq_ignore_ascii_case(&'L') {
            Some(RoutePort::Local)
        } else {
            Direction::from_symbol(symbol).map(RoutePort::Mesh)
        }
    }
}

impl fmt::Display for RoutePort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RoutePort::Mesh(direction) => direction.fmt(f),
            RoutePort::Local => write!(f, "Local"),
        }
    }
}
