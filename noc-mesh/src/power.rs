// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Router energy accounting.

use serde::{Deserialize, Serialize};

/// Energy in Joules consumed by each router event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub routing: f64,
    pub selection: f64,
    pub forward: f64,
    pub incoming: f64,
    pub standby: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            routing: 4.8e-12,
            selection: 1.3e-12,
            forward: 6.2e-11,
            incoming: 2.4e-11,
            standby: 1.1e-13,
        }
    }
}

/// Accumulates the energy used by one router.
#[derive(Clone, Debug, Default)]
pub struct Power {
    config: PowerConfig,
    total: f64,
}

impl Power {
    #[must_use]
    pub fn new(config: PowerConfig) -> Self {
        Self { config, total: 0.0 }
    }

    pub fn routing(&mut self) {
        self.total += self.config.routing;
    }

    pub fn selection(&mut self) {
        self.total += self.config.selection;
    }

    pub fn forward(&mut self) {
        self.total += self.config.forward;
    }

    pub fn incoming(&mut self) {
        self.total += self.config.incoming;
    }

    pub fn standby(&mut self) {
        self.total += self.config.standby;
    }

    /// Total energy consumed so far, in Joules.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn accumulates_per_event() {
        let config = PowerConfig {
            routing: 1.0,
            selection: 2.0,
            forward: 4.0,
            incoming: 8.0,
            standby: 16.0,
        };
        let mut power = Power::new(config);
        assert_relative_eq!(power.total(), 0.0);

        power.routing();
        power.selection();
        power.forward();
        power.forward();
        power.incoming();
        power.standby();
        assert_relative_eq!(power.total(), 35.0);
    }
}
