// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Table-based traffic.
//!
//! Each line reads `src dst [pir [por [t_on t_off t_period]]]`. Missing
//! fields take the defaults given to [`TrafficTable::parse`].

use std::path::Path;

use crate::sim_error;
use crate::tables::{parse_field, read_table, table_lines};
use crate::types::SimError;

/// One source to destination communication.
#[derive(Clone, Debug, PartialEq)]
pub struct Communication {
    pub src: usize,
    pub dst: usize,

    /// Packet injection rate.
    pub pir: f64,

    /// Probability of retransmission.
    pub por: f64,

    pub t_on: u64,
    pub t_off: u64,
    pub t_period: u64,
}

#[derive(Clone, Debug, Default)]
pub struct TrafficTable {
    communications: Vec<Communication>,
}

impl TrafficTable {
    /// Load a table from a file. Lines without a rate use `pir` and lines
    /// without timing are active for `0..horizon`.
    pub fn load(path: &Path, pir: f64, horizon: u64) -> Result<TrafficTable, SimError> {
        let text = read_table(path, "traffic")?;
        Self::parse(&text, pir, horizon)
    }

    pub fn parse(text: &str, pir: f64, horizon: u64) -> Result<TrafficTable, SimError> {
        let mut communications = Vec::new();
        for (line_no, fields) in table_lines(text) {
            if !matches!(fields.len(), 2 | 3 | 4 | 7) {
                return sim_error!(format!(
                    "Line {line_no}: expected 2, 3, 4 or 7 fields, found {}",
                    fields.len()
                ));
            }

            let mut communication = Communication {
                src: parse_field(fields[0], line_no, "source id")?,
                dst: parse_field(fields[1], line_no, "destination id")?,
                pir,
                por: pir,
                t_on: 0,
                t_off: horizon,
                t_period: horizon,
            };
            if fields.len() >= 3 {
                communication.pir = parse_field(fields[2], line_no, "injection rate")?;
                communication.por = communication.pir;
            }
            if fields.len() >= 4 {
                communication.por = parse_field(fields[3], line_no, "retransmission rate")?;
            }
            if fields.len() == 7 {
                communication.t_on = parse_field(fields[4], line_no, "t_on")?;
                communication.t_off = parse_field(fields[5], line_no, "t_off")?;
                communication.t_period = parse_field(fields[6], line_no, "t_period")?;
            }
            communications.push(communication);
        }
        Ok(TrafficTable { communications })
    }

    /// Number of communications with `node_id` as their source.
    #[must_use]
    pub fn occurrences_as_source(&self, node_id: usize) -> usize {
        self.communications
            .iter()
            .filter(|c| c.src == node_id)
            .count()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.communications.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[Communication] {
        &self.communications
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn optional_fields_take_defaults() {
        let table = TrafficTable::parse(
            "% src dst pir por t_on t_off t_period\n\
             0 1\n\
             0 2 0.5\n\
             3 1 0.2 0.1\n\
             2 3 0.3 0.3 10 20 40\n",
            0.01,
            1000,
        )
        .unwrap();
        assert_eq!(table.size(), 4);

        let entries = table.entries();
        assert_relative_eq!(entries[0].pir, 0.01);
        assert_relative_eq!(entries[0].por, 0.01);
        assert_eq!((entries[0].t_on, entries[0].t_off), (0, 1000));
        assert_relative_eq!(entries[1].por, 0.5);
        assert_relative_eq!(entries[2].pir, 0.2);
        assert_relative_eq!(entries[2].por, 0.1);
        assert_eq!(
            (entries[3].t_on, entries[3].t_off, entries[3].t_period),
            (10, 20, 40)
        );

        assert_eq!(table.occurrences_as_source(0), 2);
        assert_eq!(table.occurrences_as_source(1), 0);
        assert_eq!(table.occurrences_as_source(3), 1);
    }

    #[test]
    fn malformed_lines() {
        assert!(TrafficTable::parse("0", 0.01, 100).is_err());
        assert!(TrafficTable::parse("0 1 0.1 0.1 5", 0.01, 100).is_err());
        assert!(TrafficTable::parse("0 x", 0.01, 100).is_err());
        assert!(TrafficTable::parse("0 1 fast", 0.01, 100).is_err());
    }
}
