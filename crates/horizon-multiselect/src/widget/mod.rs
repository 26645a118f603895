//! Widget system for Horizon MultiSelect.
//!
//! This module provides the dropdown widget and everything it is built from:
//!
//! - [`Control`] and [`Form`]: the host form field the widget enhances
//! - [`MultiSelectConfig`]: layered configuration (defaults, `data-*`
//!   attributes, caller overrides, language bundle)
//! - [`DropdownRenderer`] and [`Element`]: the detached element tree
//! - [`SearchFilter`] and [`Paginator`]: what the menu currently shows
//! - [`ValidationProvider`]: the bridge to a host validation engine
//! - [`MultiSelect`]: the widget itself
//! - [`InstanceRegistry`]: one widget per control
//!
//! # Overview
//!
//! A widget never owns its control. The control keeps its name, its kind and
//! its value; the widget hides it, renders a dropdown next to it, and writes
//! every selection change back onto it so the surrounding form submits the
//! right value.
//!
//! ```ignore
//! use horizon_multiselect::widget::*;
//!
//! let form = Form::new();
//! let control = Control::native_select("Tags")
//!     .with_attribute("data-toggle", "bootstrap-multiselect")
//!     .with_attribute("data-max-selection", "3")
//!     .with_entries(vec![
//!         NativeOption::new("rust", "Rust").into(),
//!         NativeOption::new("go", "Go").into(),
//!     ])
//!     .into_handle();
//! form.add_control(&control);
//!
//! let registry = InstanceRegistry::new();
//! for widget in registry.attach_all(&form) {
//!     widget.handle_event(MultiSelectEvent::OptionToggled("rust".into()));
//! }
//! assert_eq!(form.value_of("Tags"), Some(ControlValue::Many(vec!["rust".into()])));
//! ```
//!
//! # Deferred Work
//!
//! Form resets and validation verdict reads run on the next turn of a
//! [`SharedTaskQueue`](horizon_multiselect_core::SharedTaskQueue) when one is
//! supplied, so they observe the form after it has finished its own work.
//! Without a queue they run immediately.

mod config;
mod control;
mod element;
mod events;
mod filter;
mod instances;
mod pagination;
mod renderer;
mod sync;
mod validation;
pub mod widgets;

pub use config::{
    ConfigOverrides, DEFAULT_ITEMS_PER_PAGE, DataAttributes, MultiSelectConfig, OptionData,
    PaginationPosition,
};
pub use control::{
    Control, ControlHandle, ControlId, ControlKind, ControlValue, Form, NativeEntry, NativeOption,
};
pub use element::Element;
pub use events::{Key, MultiSelectEvent};
pub use filter::{FilterResult, SearchFilter};
pub use instances::{AUTO_ATTACH_ATTR, AUTO_ATTACH_VALUE, InstanceRegistry};
pub use pagination::Paginator;
pub use renderer::{
    CHECKBOX_CLASS, DropdownRenderer, ElementIds, GROUP_CLASS, MAX_LISTED_ITEMS,
    ORIGINAL_DISABLED_ATTR, ROW_CLASS, RowView, summary_text,
};
pub use sync::{decode_text_value, encode_text_value, synchronize};
pub use validation::{FieldRules, NoValidation, Rule, ValidationProvider};
pub use widgets::{MultiSelect, MultiSelectBuilder, PopupState, ToggleOutcome};
