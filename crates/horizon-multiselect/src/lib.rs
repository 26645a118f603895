//! Horizon MultiSelect - a searchable, checkbox-based multi-select dropdown.
//!
//! The widget upgrades a native multi-value selection control, or a text
//! control holding a JSON array, into a dropdown with search, select-all,
//! a selection cap, optional pagination and localised texts. It builds a
//! detached element tree rather than touching a real DOM, and it is driven
//! by explicit [`MultiSelectEvent`](widget::MultiSelectEvent) values.
//!
//! This is the main crate; it re-exports the core crate's signal and task
//! types.
//!
//! # Example
//!
//! ```ignore
//! use horizon_multiselect::prelude::*;
//!
//! let control = Control::text_input("Tags", r#"["rust"]"#)
//!     .with_attribute("data-lang", "fr")
//!     .into_handle();
//! let widget = MultiSelect::new(
//!     control.clone(),
//!     ConfigOverrides::new().with_data(vec![
//!         OptionItem::new("rust", "Rust").into(),
//!         OptionItem::new("go", "Go").into(),
//!     ]),
//! );
//!
//! widget.toggle("go");
//! assert_eq!(control.text(), r#"["rust","go"]"#);
//! ```

pub use horizon_multiselect_core::*;

pub mod error;
#[cfg(feature = "markup")]
pub mod markup;
pub mod model;
pub mod platform;
pub mod prelude;
pub mod widget;

pub use error::{Error, Result};
