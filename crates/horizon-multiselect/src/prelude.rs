//! Prelude module for Horizon MultiSelect.
//!
//! ```ignore
//! use horizon_multiselect::prelude::*;
//! ```
//!
//! This provides access to:
//! - Signal and task plumbing (`Signal`, `SharedTaskQueue`)
//! - The data model (`OptionItem`, `OptionGroup`, `OptionModel`)
//! - The widget and its host types (`MultiSelect`, `Control`, `Form`)
//! - Localisation (`LanguageBundle`, `LocalizationRegistry`)

// ============================================================================
// Signal/Slot and Deferred Work
// ============================================================================

pub use crate::signal::{ConnectionId, Signal};
pub use crate::task::{SharedTaskQueue, defer};

// ============================================================================
// Data Model
// ============================================================================

pub use crate::model::{OptionEntry, OptionGroup, OptionItem, OptionModel, SelectionState};

// ============================================================================
// Widget
// ============================================================================

pub use crate::widget::{
    ConfigOverrides, Control, ControlHandle, ControlValue, FieldRules, Form, InstanceRegistry, Key,
    MultiSelect, MultiSelectConfig, MultiSelectEvent, NativeEntry, NativeOption, PopupState, Rule,
    ToggleOutcome, ValidationProvider,
};

// ============================================================================
// Localization
// ============================================================================

pub use crate::platform::{LanguageBundle, LocalizationRegistry};

// ============================================================================
// Markup
// ============================================================================

#[cfg(feature = "markup")]
pub use crate::markup::{MarkupItem, MarkupRule, MultiSelectMarkup};

pub use crate::{Error, Result};
