//! Async building blocks shared by the content engine.
//!
//! - [`Debouncer`]: a cancellable, re-schedulable timer. Scheduling always
//!   cancels whatever was pending first, so there is never more than one
//!   pending callback per debouncer.
//! - [`run_chunked`]: drive a list of futures in sequential chunks, polling
//!   every future inside a chunk concurrently, with cooperative cancellation
//!   between chunks.

mod chunked;
mod debounce;

pub use self::chunked::{ChunkedRun, run_chunked};
pub use self::debounce::Debouncer;
pub use tokio_util::sync::CancellationToken;
