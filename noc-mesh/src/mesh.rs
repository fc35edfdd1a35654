// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Construction of a 3D mesh of tiles.
//!
//! Building a [`Mesh`] goes through the following steps:
//!
//!  1. validate the configuration and load the routing and traffic tables
//!  2. create one [`Tile`] per node, stored by node id
//!  3. configure the router and PE of every tile
//!  4. bind every port either to the link shared with its neighbour or to a
//!     private placeholder link
//!  5. clear the ports facing off the mesh
//!  6. invalidate the reservation table entries of those ports
//!
//! Vertical links need a through-silicon via (TSV). The link between
//! `(x, y, z)` and `(x, y, z + 1)` exists when the upper tile has a TSV, so
//! the Down port of a tile and the Up port of the tile below always agree.
//! A tile's own flag only gates its Down port. Its Up port follows the flag
//! of the tile above.

use std::sync::Arc;

use noc_track::entity::Entity;
use noc_track::{debug, error, info, trace};

use crate::clock::{Clock, Reset};
use crate::config::{NocConfig, RoutingAlgorithm, TrafficDistribution};
use crate::coord::{Axis, Coord, Direction, MeshDims};
use crate::link::{LinkId, LinkRegistry};
use crate::sim_error;
use crate::tables::{RoutingTable, TrafficTable};
use crate::tile::{PortBinding, PortView, Tile};
use crate::types::SimError;

pub struct Mesh {
    pub entity: Arc<Entity>,
    dims: MeshDims,
    tiles: Vec<Tile>,
    links: LinkRegistry,
    routing_table: Arc<RoutingTable>,
    traffic_table: Arc<TrafficTable>,
    clock: Clock,
    reset: Reset,
}

fn load_routing_table(entity: &Arc<Entity>, config: &NocConfig) -> Result<RoutingTable, SimError> {
    if config.routing_algorithm != RoutingAlgorithm::TableBased {
        return Ok(RoutingTable::default());
    }
    let Some(path) = &config.routing_table_filename else {
        return sim_error!("Table based routing needs a routing table file");
    };
    let table = RoutingTable::load(path).inspect_err(|e| {
        error!(entity ; "{e}");
    })?;
    info!(entity ; "Loaded routing table {} for {} nodes", path.display(), table.num_nodes());
    Ok(table)
}

fn load_traffic_table(entity: &Arc<Entity>, config: &NocConfig) -> Result<TrafficTable, SimError> {
    if config.traffic_distribution != TrafficDistribution::TableBased {
        return Ok(TrafficTable::default());
    }
    let Some(path) = &config.traffic_table_filename else {
        return sim_error!("Table based traffic needs a traffic table file");
    };
    let table = TrafficTable::load(path, config.packet_injection_rate, config.simulation_time)
        .inspect_err(|e| {
            error!(entity ; "{e}");
        })?;
    info!(entity ; "Loaded traffic table {} with {} communications", path.display(), table.size());
    Ok(table)
}

/// The link shared with the neighbour in `direction`, if there is one.
fn shared_link(
    links: &mut LinkRegistry,
    dims: &MeshDims,
    has_tsv: &[bool],
    coord: Coord,
    direction: Direction,
) -> Option<LinkId> {
    let neighbour = coord.neighbour(direction, dims)?;
    let (lower, upper) = if direction.is_increasing() {
        (coord, neighbour)
    } else {
        (neighbour, coord)
    };
    if direction.is_vertical() {
        let tsv = has_tsv.get(dims.coord_to_id(&upper)).copied();
        if tsv != Some(true) {
            return None;
        }
    }
    links.shared_link(direction.axis(), &lower)
}

/// Directions in which `coord` has no neighbour.
fn boundary_directions(coord: Coord, dims: MeshDims) -> impl Iterator<Item = Direction> {
    Direction::ALL
        .into_iter()
        .filter(move |d| coord.neighbour(*d, &dims).is_none())
}

impl Mesh {
    /// Build and wire a mesh as described by `config`.
    ///
    /// Nothing is built if the configuration is invalid or a table cannot
    /// be loaded.
    pub fn build(
        parent: &Arc<Entity>,
        name: &str,
        config: &NocConfig,
        clock: &Clock,
        reset: &Reset,
    ) -> Result<Mesh, SimError> {
        let entity = Arc::new(Entity::new(parent, name));
        config.validate().inspect_err(|e| {
            error!(entity ; "{e}");
        })?;

        let routing_table = Arc::new(load_routing_table(&entity, config)?);
        let traffic_table = Arc::new(load_traffic_table(&entity, config)?);
        let dims = config.dims();
        let has_tsv = config.has_tsv();

        let mut tiles: Vec<Tile> = (0..dims.num_nodes())
            .filter_map(|id| dims.id_to_coord(id))
            .map(|coord| Tile::new(&entity, coord, config.power, clock, reset))
            .collect();

        for (id, tile) in tiles.iter_mut().enumerate() {
            tile.router_mut().configure(
                id,
                config.stats_warm_up_time as f64,
                config.buffer_depth,
                &routing_table,
            );
            tile.pe_mut().configure(id, &traffic_table);
            trace!(tile.entity ; "never transmit: {}", tile.pe().never_transmit());
        }

        let mut links = LinkRegistry::new(dims);
        for tile in &mut tiles {
            for direction in Direction::ALL {
                let link = shared_link(&mut links, &dims, &has_tsv, tile.coord(), direction);
                let binding = match link {
                    Some(link) => {
                        debug!(tile.entity ; "{direction} connected to {link}");
                        PortBinding::new(link, direction, true)
                    }
                    None => PortBinding::new(links.add_placeholder(), direction, false),
                };
                tile.bind(direction, binding);
            }
        }

        if dims.is_3d() {
            let vertical = dims
                .coords()
                .filter(|lower| links.find_shared_link(Axis::Z, lower).is_some())
                .count();
            debug!(entity ; "{vertical} of {} vertical links have a TSV",
                dims.x * dims.y * (dims.z - 1)
            );
        }

        let mut mesh = Mesh {
            entity,
            dims,
            tiles,
            links,
            routing_table,
            traffic_table,
            clock: clock.clone(),
            reset: reset.clone(),
        };
        mesh.clear_boundaries();
        mesh.invalidate_boundary_reservations();

        info!(mesh.entity ; "Built {} mesh: {} tiles, {} links, {} unconnected ports",
            dims,
            mesh.tiles.len(),
            mesh.links.num_shared(),
            mesh.links.num_placeholders()
        );
        Ok(mesh)
    }

    /// Reset the handshakes of every port facing off the mesh and mark the
    /// flow control data it receives as invalid.
    fn clear_boundaries(&self) {
        for tile in &self.tiles {
            for direction in boundary_directions(tile.coord(), self.dims) {
                if let Some(port) = self.port(tile.coord(), direction) {
                    port.clear_boundary();
                }
            }
        }
    }

    /// Stop routers reserving outputs that face off the mesh.
    fn invalidate_boundary_reservations(&mut self) {
        let dims = self.dims;
        for tile in &mut self.tiles {
            for direction in boundary_directions(tile.coord(), dims) {
                tile.router_mut().reservation_table.invalidate(direction);
            }
        }
    }

    #[must_use]
    pub fn dims(&self) -> MeshDims {
        self.dims
    }

    /// Find the tile whose router has `local_id`.
    #[must_use]
    pub fn search_node(&self, local_id: usize) -> Option<&Tile> {
        self.tiles
            .iter()
            .find(|tile| tile.router().local_id() == local_id)
    }

    #[must_use]
    pub fn tile(&self, coord: &Coord) -> Option<&Tile> {
        self.dims
            .contains(coord)
            .then(|| &self.tiles[self.dims.coord_to_id(coord)])
    }

    pub fn tile_mut(&mut self, coord: &Coord) -> Option<&mut Tile> {
        if self.dims.contains(coord) {
            let id = self.dims.coord_to_id(coord);
            self.tiles.get_mut(id)
        } else {
            None
        }
    }

    /// All tiles, indexed by node id.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// The signals of the port of the tile at `coord` facing `direction`.
    #[must_use]
    pub fn port(&self, coord: Coord, direction: Direction) -> Option<PortView<'_>> {
        let binding = self.tile(&coord)?.binding(direction)?;
        Some(PortView::new(self.links.link(binding.link), binding))
    }

    #[must_use]
    pub fn links(&self) -> &LinkRegistry {
        &self.links
    }

    #[must_use]
    pub fn routing_table(&self) -> &Arc<RoutingTable> {
        &self.routing_table
    }

    #[must_use]
    pub fn traffic_table(&self) -> &Arc<TrafficTable> {
        &self.traffic_table
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[must_use]
    pub fn reset(&self) -> &Reset {
        &self.reset
    }
}
