// Copyright (c) 2025 Graphcore Ltd. All rights reserved.
//
//! Library functions to build trackers as defined by the user.

use std::io;
use std::sync::Arc;

use noc_track::Tracker;
use noc_track::tracker::{EntityManager, TextTracker, TrackConfigError};

/// Create a tracker that prints to stdout
///
/// The user can pass a filter regular expression which will set the level only
/// for matching Entities and set all other Entities to only emit errors.
fn build_stdout_tracker(
    level: log::Level,
    filter_regex: &str,
) -> Result<Tracker, TrackConfigError> {
    let default_level = if filter_regex.is_empty() {
        level
    } else {
        log::Level::Error
    };
    let mut entity_manager = EntityManager::new(default_level);
    if !filter_regex.is_empty() {
        entity_manager.add_entity_level_filter(filter_regex, level)?;
    }
    let stdout_writer = Box::new(io::BufWriter::new(io::stdout()));
    Ok(Arc::new(TextTracker::new(entity_manager, stdout_writer)))
}

/// Set up the tracker according to the command-line arguments. Without
/// `--stdout` only warnings and errors are shown.
pub fn setup_trackers(
    enable_stdout: bool,
    stdout_level: log::Level,
    stdout_filter_regex: &str,
) -> Result<Tracker, TrackConfigError> {
    if enable_stdout {
        build_stdout_tracker(stdout_level, stdout_filter_regex)
    } else {
        build_stdout_tracker(log::Level::Warn, "")
    }
}
