// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Statistics gathered per router and reduced over the whole mesh.

pub mod format;
pub mod global;
pub mod matrix;
pub mod router;

pub use format::Significant;
pub use global::GlobalStats;
pub use matrix::Matrix;
pub use router::RouterStats;
