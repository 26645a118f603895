//! Signal/slot system for Horizon MultiSelect.
//!
//! Widgets publish state changes through typed [`Signal`]s. Interested parties
//! connect slots (closures) and are invoked whenever the signal is emitted.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type used for notifications
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//!
//! Slots run synchronously inside `emit()`. Work that must wait for the
//! host's next turn is posted explicitly with [`crate::defer`].
//!
//! # Example
//!
//! ```
//! use horizon_multiselect_core::Signal;
//!
//! let selection_changed = Signal::<Vec<String>>::new();
//!
//! let conn_id = selection_changed.connect(|values| {
//!     println!("Selected: {:?}", values);
//! });
//!
//! selection_changed.emit(vec!["en".to_string()]);
//! selection_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// Emission snapshots the connected slots before invoking them, so a slot may
/// freely connect or disconnect other slots on the same signal.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connect a slot; it is invoked on every emission.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Emit the signal, invoking all connected slots.
    #[tracing::instrument(skip_all, target = "horizon_multiselect_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        // Release the lock before running slots.
        let snapshot: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        for slot in snapshot {
            slot(&args);
        }
    }
}

static_assertions::assert_impl_all!(Signal<Vec<String>>: Send, Sync);
