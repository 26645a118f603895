//! Data model: the options a dropdown offers and the values it has selected.

mod option;
mod selection;

pub use option::{OptionEntry, OptionGroup, OptionItem, OptionModel};
pub use selection::{InsertOutcome, SelectionState};
