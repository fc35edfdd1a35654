// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The processing element attached to each router.
//!
//! Traffic generation itself is driven by the simulation engine. The mesh
//! only configures the identity and traffic source of each PE.

use std::sync::Arc;

use noc_track::entity::Entity;

use crate::tables::TrafficTable;

pub struct ProcessingElement {
    pub entity: Arc<Entity>,
    local_id: usize,
    traffic_table: Option<Arc<TrafficTable>>,
    never_transmit: bool,
}

impl ProcessingElement {
    #[must_use]
    pub fn new(parent: &Arc<Entity>) -> Self {
        Self {
            entity: Arc::new(Entity::new(parent, "pe")),
            local_id: 0,
            traffic_table: None,
            never_transmit: false,
        }
    }

    /// Bind this PE to node `local_id`. The PE never transmits when the
    /// traffic table holds no communication from this node.
    pub fn configure(&mut self, local_id: usize, traffic_table: &Arc<TrafficTable>) {
        self.local_id = local_id;
        self.never_transmit = traffic_table.occurrences_as_source(local_id) == 0;
        self.traffic_table = Some(traffic_table.clone());
    }

    #[must_use]
    pub fn local_id(&self) -> usize {
        self.local_id
    }

    #[must_use]
    pub fn traffic_table(&self) -> Option<&Arc<TrafficTable>> {
        self.traffic_table.as_ref()
    }

    #[must_use]
    pub fn never_transmit(&self) -> bool {
        self.never_transmit
    }
}
