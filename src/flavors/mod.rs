//! Channel flavors.
//!
//! There are two kinds of channels:
//!
//! 1. `array` - Bounded channel backed by a FIFO queue.
//! 2. `zero`  - Zero-capacity rendezvous channel.

pub(crate) mod array;
pub(crate) mod zero;
