//! Host-facing services shared by every widget instance.
//!
//! Currently this is the localization registry:
//!
//! ```ignore
//! use horizon_multiselect::platform::{current_language, language_bundle};
//!
//! let bundle = language_bundle(&current_language()).unwrap_or_default();
//! println!("{}", bundle.placeholder);
//! ```

mod localization;

pub use localization::{
    DEFAULT_LANGUAGE, LanguageBundle, LocalizationRegistry, current_language, global_registry,
    language_bundle, normalize_tag, primary_language, register_language, set_current_language,
};
