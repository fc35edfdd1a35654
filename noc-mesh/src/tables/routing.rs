// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Table-based routing.
//!
//! Each line reads `node in_dir dst out_dir [out_dir ...]`: a flit arriving
//! at `node` through `in_dir` and heading for `dst` may leave through any of
//! the listed output directions. Directions are written as one of
//! `N E S W U D` or `L` for the local PE.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::coord::RoutePort;
use crate::sim_error;
use crate::tables::{parse_field, read_table, table_lines};
use crate::types::SimError;

/// The routing entries of a single node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalRoutingTable {
    node_id: usize,
    entries: HashMap<(RoutePort, usize), Vec<RoutePort>>,
}

impl LocalRoutingTable {
    #[must_use]
    pub fn node_id(&self) -> usize {
        self.node_id
    }

    /// The output ports a flit from `in_port` to `dst` may take.
    #[must_use]
    pub fn admissible_outputs(&self, in_port: RoutePort, dst: usize) -> Option<&[RoutePort]> {
        self.entries.get(&(in_port, dst)).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The routing table for the whole network.
///
/// A default table is invalid. It is used when the routing algorithm is not
/// table based.
#[derive(Clone, Debug, Default)]
pub struct RoutingTable {
    nodes: BTreeMap<usize, LocalRoutingTable>,
    valid: bool,
}

impl RoutingTable {
    pub fn load(path: &Path) -> Result<RoutingTable, SimError> {
        let text = read_table(path, "routing")?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<RoutingTable, SimError> {
        let mut nodes: BTreeMap<usize, LocalRoutingTable> = BTreeMap::new();
        for (line_no, fields) in table_lines(text) {
            if fields.len() < 4 {
                return sim_error!(format!(
                    "Line {line_no}: expected 'node in_dir dst out_dir...', found {} fields",
                    fields.len()
                ));
            }
            let node: usize = parse_field(fields[0], line_no, "node id")?;
            let in_port = parse_port(fields[1], line_no)?;
            let dst: usize = parse_field(fields[2], line_no, "destination id")?;
            let outputs = fields[3..]
                .iter()
                .map(|f| parse_port(f, line_no))
                .collect::<Result<Vec<_>, _>>()?;

            let local = nodes.entry(node).or_insert_with(|| LocalRoutingTable {
                node_id: node,
                ..Default::default()
            });
            local
                .entries
                .entry((in_port, dst))
                .or_default()
                .extend(outputs);
        }
        Ok(RoutingTable { nodes, valid: true })
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The entries of `node`. Nodes with no entries get an empty table.
    #[must_use]
    pub fn local_table(&self, node: usize) -> LocalRoutingTable {
        self.nodes
            .get(&node)
            .cloned()
            .unwrap_or_else(|| LocalRoutingTable {
                node_id: node,
                ..Default::default()
            })
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}

fn parse_port(field: &str, line_no: usize) -> Result<RoutePort, SimError> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => match RoutePort::from_symbol(symbol) {
            Some(port) => Ok(port),
            None => sim_error!(format!("Line {line_no}: invalid direction '{field}'")),
        },
        _ => sim_error!(format!("Line {line_no}: invalid direction '{field}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Direction;

    #[test]
    fn parse_entries_and_comments() {
        let table = RoutingTable::parse(
            "% node in dst out\n\
             0 L 1 E\n\
             0 L 2 E S   % two choices\n\
             \n\
             1 W 1 L\n",
        )
        .unwrap();
        assert!(table.is_valid());
        assert_eq!(table.num_nodes(), 2);

        let node0 = table.local_table(0);
        assert_eq!(node0.len(), 2);
        assert_eq!(
            node0.admissible_outputs(RoutePort::Local, 2),
            Some(
                &[
                    RoutePort::Mesh(Direction::East),
                    RoutePort::Mesh(Direction::South)
                ][..]
            )
        );
        assert_eq!(
            table
                .local_table(1)
                .admissible_outputs(RoutePort::Mesh(Direction::West), 1),
            Some(&[RoutePort::Local][..])
        );
        assert!(table.local_table(7).is_empty());
    }

    #[test]
    fn default_table_is_invalid() {
        assert!(!RoutingTable::default().is_valid());
    }

    #[test]
    fn malformed_lines() {
        assert!(RoutingTable::parse("0 L 1").is_err());
        assert!(RoutingTable::parse("0 X 1 E").is_err());
        assert!(RoutingTable::parse("a L 1 E").is_err());
        assert!(RoutingTable::parse("0 L 1 EE").is_err());
    }
}
