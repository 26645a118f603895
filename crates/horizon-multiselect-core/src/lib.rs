//! Core systems for Horizon MultiSelect.
//!
//! This crate provides the host-side plumbing the widget crate builds on:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Task Queue**: Deferred work that runs on the host's next turn
//! - **Logging**: `tracing` targets and the `PerfSpan` guard shared across the
//!   workspace
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_multiselect_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Deferred Task Example
//!
//! ```
//! use horizon_multiselect_core::SharedTaskQueue;
//!
//! let queue = SharedTaskQueue::new();
//! queue.post(|| println!("runs on the next turn"));
//! assert_eq!(queue.process_all(), 1);
//! ```

pub mod logging;
pub mod signal;
pub mod task;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use task::{SharedTaskQueue, TaskId, TaskQueue, defer};
