//! Experience replay.

mod buffer;

pub use buffer::{
    Batch, BatchTensors, Buffer, BufferConfig, ReplayError, Transitions,
    DEFAULT_BATCH_ITERATIONS,
};
