// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Define the [`Track`] trait and a number of [`Tracker`]s.

/// Include the /dev/null tracker.
pub mod dev_null;
/// Include the text-based tracker.
pub mod text;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub use dev_null::DevNullTracker;
use regex::Regex;
pub use text::TextTracker;

use crate::{Id, ROOT};

/// This is the interface that is supported by all [`Tracker`]s.
pub trait Track {
    /// Allocate a new global id
    fn unique_id(&self) -> Id;

    /// Determine whether an entity has a log level enabled.
    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool;

    /// Register a new entity by its full hierarchical name.
    fn add_entity(&self, id: Id, entity_name: &str);

    /// Track a log message of the given level.
    fn log(&self, msg_by: Id, level: log::Level, msg: std::fmt::Arguments);

    /// Flush any buffered output.
    fn shutdown(&self);
}

/// The type of a [`Tracker`] that is shared across entities.
pub type Tracker = Arc<dyn Track + Send + Sync>;

/// Error returned when a tracker is given an invalid configuration.
#[derive(Debug)]
pub struct TrackConfigError(pub String);

impl fmt::Display for TrackConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {}", self.0)
    }
}

impl std::error::Error for TrackConfigError {}

/// Create a [`Tracker`] that suppresses all events.
pub fn dev_null_tracker() -> Tracker {
    Arc::new(DevNullTracker {})
}

/// The [`EntityManager`] is responsible for determining entity log levels.
///
/// This manager is also used to allocate unique [`Id`] values.
pub struct EntityManager {
    /// Level of _log_ events to output when no filter matches.
    default_log_level: log::Level,

    /// List of regular expressions mapping entity names to log levels.
    regex_to_log_level: Vec<(Regex, log::Level)>,

    /// Level resolved for each registered entity.
    entity_levels: Mutex<HashMap<Id, log::Level>>,

    /// Full name of each registered entity.
    entity_names: Mutex<HashMap<Id, String>>,

    /// Used to assign unique ids.
    unique_id: AtomicU64,
}

impl EntityManager {
    /// Constructor with a default [`log::Level`]
    #[must_use]
    pub fn new(default_log_level: log::Level) -> Self {
        Self {
            default_log_level,
            regex_to_log_level: Vec::new(),
            entity_levels: Mutex::new(HashMap::new()),
            entity_names: Mutex::new(HashMap::new()),
            unique_id: AtomicU64::new(ROOT.0 + 1),
        }
    }

    /// Add a log filter regular expression.
    ///
    /// The first filter added that matches an entity name wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// use noc_track::tracker::EntityManager;
    /// let mut manager = EntityManager::new(log::Level::Warn);
    /// manager.add_entity_level_filter(".*Tile.*router", log::Level::Trace).unwrap();
    /// ```
    pub fn add_entity_level_filter(
        &mut self,
        regex_str: &str,
        level: log::Level,
    ) -> Result<(), TrackConfigError> {
        match Regex::new(regex_str) {
            Ok(regex) => {
                self.regex_to_log_level.push((regex, level));
                Ok(())
            }
            Err(e) => Err(TrackConfigError(format!(
                "Failed to parse regex {regex_str}:\n{e}\n"
            ))),
        }
    }

    pub(crate) fn unique_id(&self) -> Id {
        Id(self.unique_id.fetch_add(1, Ordering::SeqCst))
    }

    fn log_level_for(&self, entity_name: &str) -> log::Level {
        for (regex, level) in self.regex_to_log_level.iter() {
            if regex.is_match(entity_name) {
                return *level;
            }
        }
        self.default_log_level
    }

    pub(crate) fn add_entity(&self, id: Id, entity_name: &str) {
        let level = self.log_level_for(entity_name);
        self.entity_levels.lock().unwrap().insert(id, level);
        self.entity_names
            .lock()
            .unwrap()
            .insert(id, entity_name.to_string());
    }

    pub(crate) fn is_enabled(&self, id: Id, level: log::Level) -> bool {
        let entity_level = self
            .entity_levels
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or(self.default_log_level);
        level <= entity_level
    }

    pub(crate) fn entity_name(&self, id: Id) -> String {
        self.entity_names
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}
