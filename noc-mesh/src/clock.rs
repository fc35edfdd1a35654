// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The global clock and reset signals.
//!
//! One [`Clock`] and one [`Reset`] are created at the top level. Cloning a
//! handle shares the underlying signal so every tile sees the same values.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub struct Clock {
    tick: Rc<Cell<u64>>,
}

impl Clock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current cycle.
    #[must_use]
    pub fn tick_now(&self) -> u64 {
        self.tick.get()
    }

    /// Move on to the next cycle.
    pub fn advance(&self) {
        self.tick.set(self.tick.get() + 1);
    }

    /// True when both handles drive the same signal.
    #[must_use]
    pub fn shares_with(&self, other: &Clock) -> bool {
        Rc::ptr_eq(&self.tick, &other.tick)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Reset {
    asserted: Rc<Cell<bool>>,
}

impl Reset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, asserted: bool) {
        self.asserted.set(asserted);
    }

    #[must_use]
    pub fn is_asserted(&self) -> bool {
        self.asserted.get()
    }

    #[must_use]
    pub fn shares_with(&self, other: &Reset) -> bool {
        Rc::ptr_eq(&self.asserted, &other.asserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_signal() {
        let clock = Clock::new();
        let reset = Reset::new();
        let tile_clock = clock.clone();
        let tile_reset = reset.clone();

        clock.advance();
        clock.advance();
        reset.set(true);

        assert_eq!(tile_clock.tick_now(), 2);
        assert!(tile_reset.is_asserted());
        assert!(tile_clock.shares_with(&clock));
        assert!(!Clock::new().shares_with(&clock));
    }
}
