// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The unit of data carried over a link.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FlitType {
    #[default]
    Head,
    Body,
    Tail,
}

/// A flow control unit. Packets are a Head flit followed by Body flits and a
/// closing Tail flit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Flit {
    pub src_id: usize,
    pub dst_id: usize,
    pub flit_type: FlitType,
    pub sequence_no: usize,

    /// Cycle at which the packet was created.
    pub timestamp: f64,

    pub hop_no: usize,
}

impl Flit {
    #[must_use]
    pub fn new(
        src_id: usize,
        dst_id: usize,
        flit_type: FlitType,
        sequence_no: usize,
        timestamp: f64,
    ) -> Self {
        Self {
            src_id,
            dst_id,
            flit_type,
            sequence_no,
            timestamp,
            hop_no: 0,
        }
    }

    #[must_use]
    pub fn is_head(&self) -> bool {
        self.flit_type == FlitType::Head
    }
}

impl fmt::Display for Flit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:?} {}->{} seq={} ts={} hops={}",
            self.flit_type, self.src_id, self.dst_id, self.sequence_no, self.timestamp, self.hop_no
        )
    }
}
