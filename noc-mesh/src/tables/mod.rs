// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Routing and traffic tables loaded from text files.
//!
//! Both formats are whitespace separated with one entry per line. Anything
//! following a `%` is a comment and blank lines are ignored.

use std::fs;
use std::path::Path;

use crate::sim_error;
use crate::types::SimError;

pub mod routing;
pub mod traffic;

pub use routing::{LocalRoutingTable, RoutingTable};
pub use traffic::{Communication, TrafficTable};

fn read_table(path: &Path, kind: &str) -> Result<String, SimError> {
    fs::read_to_string(path)
        .or_else(|e| sim_error!(format!("Unable to read {kind} table {}: {e}", path.display())))
}

/// Iterate over the non-empty lines of a table with comments removed,
/// yielding the 1-based line number and the remaining fields.
fn table_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let content = line.split('%').next().unwrap_or_default();
        let fields: Vec<&str> = content.split_whitespace().collect();
        (!fields.is_empty()).then_some((i + 1, fields))
    })
}

fn parse_field<T: std::str::FromStr>(field: &str, line_no: usize, what: &str) -> Result<T, SimError> {
    field
        .parse()
        .or_else(|_| sim_error!(format!("Line {line_no}: invalid {what} '{field}'")))
}
