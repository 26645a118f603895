//! Server-side markup emitters.
//!
//! [`MultiSelectMarkup`] writes a native `<select multiple>` element carrying
//! the widget's `data-*` configuration and unobtrusive-validation attributes,
//! so a page rendered on the server upgrades itself once
//! [`InstanceRegistry::attach_all`](crate::widget::InstanceRegistry::attach_all)
//! runs. Every attribute value and option text is HTML-escaped.
//!
//! The same builder can produce the equivalent in-memory
//! [`Control`](crate::widget::Control) for hosts that skip the HTML round trip.

mod select;
mod validation;

pub use select::{MarkupItem, MultiSelectMarkup, field_id};
pub use validation::{MarkupRule, validation_attributes};
