//! Standard widgets for Horizon MultiSelect.
//!
//! - [`MultiSelect`]: Searchable, checkbox-based multi-select dropdown

mod multi_select;

pub use multi_select::{MultiSelect, MultiSelectBuilder, PopupState, ToggleOutcome};
