//! # Catalog Worker
//!
//! Background thumbnail generation: the processor (idempotent, retry-safe),
//! an explicit retry policy, and the worker pool consuming the dispatcher
//! queue.

pub mod error;
pub mod pool;
pub mod processor;
pub mod retry;

pub use error::WorkerError;
pub use pool::{DeadLetter, WorkerPool, WorkerPoolHandle, WorkerPoolProbe};
pub use processor::{JobProcessor, ThumbnailConfig, ThumbnailOutcome, ThumbnailProcessor};
pub use retry::RetryPolicy;
