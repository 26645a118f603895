//! Localization of the widget's user-visible strings.
//!
//! Each language is a [`LanguageBundle`] of display strings. Bundles live in a
//! [`LocalizationRegistry`] together with the current language. A process-wide
//! registry is available through the free functions in this module; widgets
//! copy the resolved bundle into their configuration when they are created, so
//! later registry changes never affect live widgets.
//!
//! # Registering a Language
//!
//! ```ignore
//! use horizon_multiselect::platform::{LanguageBundle, register_language, set_current_language};
//!
//! let bundle = LanguageBundle::from_json_str(r#"{
//!     "placeholder": "Kies items...",
//!     "searchPlaceholder": "Zoeken...",
//!     "selectAllText": "Alles selecteren",
//!     "deselectAllText": "Alles deselecteren",
//!     "noResultsText": "Geen resultaten",
//!     "itemsSelectedText": "items geselecteerd"
//! }"#)?;
//!
//! register_language("nl", bundle);
//! set_current_language("nl");
//! ```
//!
//! # Tag Fallback
//!
//! Tags are case-insensitive and accept `-` or `_` separators. A region tag
//! with no bundle of its own falls back to its primary language, so `fr-CA`
//! resolves to the `fr` bundle.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use horizon_multiselect_core::logging::targets;

use crate::error::{Error, Result};

/// The language used when nothing else is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Display strings for one language.
///
/// Empty fields mean "not provided": configuration resolution keeps the
/// built-in default for them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageBundle {
    pub placeholder: String,
    pub search_placeholder: String,
    pub select_all_text: String,
    pub deselect_all_text: String,
    pub no_results_text: String,
    /// Suffix of the summary shown when more than three items are selected.
    pub items_selected_text: String,
    pub pagination_previous_text: String,
    pub pagination_next_text: String,
    /// Page indicator; `{current}` and `{total}` are interpolated.
    pub pagination_info_text: String,
}

impl LanguageBundle {
    /// Parse a bundle from JSON text with camelCase keys.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a bundle from TOML text with camelCase keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a bundle from a `.json` or `.toml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Self::from_json_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Fill every empty field of `self` from `fallback`.
    pub fn or(mut self, fallback: &LanguageBundle) -> Self {
        let pairs = [
            (&mut self.placeholder, &fallback.placeholder),
            (&mut self.search_placeholder, &fallback.search_placeholder),
            (&mut self.select_all_text, &fallback.select_all_text),
            (&mut self.deselect_all_text, &fallback.deselect_all_text),
            (&mut self.no_results_text, &fallback.no_results_text),
            (&mut self.items_selected_text, &fallback.items_selected_text),
            (&mut self.pagination_previous_text, &fallback.pagination_previous_text),
            (&mut self.pagination_next_text, &fallback.pagination_next_text),
            (&mut self.pagination_info_text, &fallback.pagination_info_text),
        ];
        for (field, fallback) in pairs {
            if field.is_empty() {
                field.clone_from(fallback);
            }
        }
        self
    }

    fn builtin(strings: [&str; 9]) -> Self {
        let [
            placeholder,
            search_placeholder,
            select_all_text,
            deselect_all_text,
            no_results_text,
            items_selected_text,
            pagination_previous_text,
            pagination_next_text,
            pagination_info_text,
        ] = strings.map(str::to_string);
        Self {
            placeholder,
            search_placeholder,
            select_all_text,
            deselect_all_text,
            no_results_text,
            items_selected_text,
            pagination_previous_text,
            pagination_next_text,
            pagination_info_text,
        }
    }

    /// The built-in English bundle.
    pub fn english() -> Self {
        Self::builtin([
            "Select items...",
            "Search...",
            "Select All",
            "Deselect All",
            "No results found",
            "items selected",
            "Previous",
            "Next",
            "Page {current} of {total}",
        ])
    }

    fn french() -> Self {
        Self::builtin([
            "Sélectionner des éléments...",
            "Rechercher...",
            "Tout Sélectionner",
            "Tout Désélectionner",
            "Aucun résultat trouvé",
            "éléments sélectionnés",
            "Précédent",
            "Suivant",
            "Page {current} sur {total}",
        ])
    }

    fn german() -> Self {
        Self::builtin([
            "Elemente auswählen...",
            "Suchen...",
            "Alle Auswählen",
            "Alle Abwählen",
            "Keine Ergebnisse gefunden",
            "Elemente ausgewählt",
            "Zurück",
            "Weiter",
            "Seite {current} von {total}",
        ])
    }

    fn spanish() -> Self {
        Self::builtin([
            "Seleccionar elementos...",
            "Buscar...",
            "Seleccionar Todo",
            "Deseleccionar Todo",
            "No se encontraron resultados",
            "elementos seleccionados",
            "Anterior",
            "Siguiente",
            "Página {current} de {total}",
        ])
    }

    fn italian() -> Self {
        Self::builtin([
            "Seleziona elementi...",
            "Cerca...",
            "Seleziona Tutto",
            "Deseleziona Tutto",
            "Nessun risultato trovato",
            "elementi selezionati",
            "Precedente",
            "Successivo",
            "Pagina {current} di {total}",
        ])
    }
}

/// Normalize a language tag: lower-case, `_` replaced by `-`, trimmed.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_lowercase()
}

/// The primary language subtag of a tag (`"fr-CA"` → `"fr"`).
pub fn primary_language(tag: &str) -> String {
    normalize_tag(tag)
        .split('-')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// A set of language bundles plus the current language.
#[derive(Debug, Clone)]
pub struct LocalizationRegistry {
    bundles: HashMap<String, LanguageBundle>,
    current: String,
}

impl LocalizationRegistry {
    /// Create an empty registry whose current language is English.
    pub fn empty() -> Self {
        Self {
            bundles: HashMap::new(),
            current: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Create a registry with the built-in bundles (en, fr, de, es, it).
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_language("en", LanguageBundle::english());
        registry.register_language("fr", LanguageBundle::french());
        registry.register_language("de", LanguageBundle::german());
        registry.register_language("es", LanguageBundle::spanish());
        registry.register_language("it", LanguageBundle::italian());
        registry
    }

    /// Add or replace the bundle for `tag`.
    pub fn register_language(&mut self, tag: &str, bundle: LanguageBundle) {
        let tag = normalize_tag(tag);
        tracing::debug!(target: targets::LOCALIZATION, tag = %tag, "registered language bundle");
        self.bundles.insert(tag, bundle);
    }

    /// Load a bundle file and register it under `tag`.
    pub fn register_language_file(&mut self, tag: &str, path: impl AsRef<Path>) -> Result<()> {
        let bundle = LanguageBundle::from_file(path)?;
        self.register_language(tag, bundle);
        Ok(())
    }

    /// Set the language used by widgets that do not name one.
    ///
    /// The tag need not be registered yet; lookups fall back to the built-in
    /// defaults until it is.
    pub fn set_current_language(&mut self, tag: &str) {
        self.current = normalize_tag(tag);
        tracing::debug!(target: targets::LOCALIZATION, tag = %self.current, "current language changed");
    }

    /// The current language tag.
    pub fn current_language(&self) -> &str {
        &self.current
    }

    /// The bundle for `tag`, falling back to its primary language.
    pub fn language_bundle(&self, tag: &str) -> Option<&LanguageBundle> {
        let tag = normalize_tag(tag);
        if let Some(bundle) = self.bundles.get(&tag) {
            return Some(bundle);
        }
        let primary = primary_language(&tag);
        let bundle = self.bundles.get(&primary);
        if bundle.is_none() {
            tracing::debug!(target: targets::LOCALIZATION, tag = %tag, "no bundle registered for language");
        }
        bundle
    }

    /// The bundle a widget should use: its explicit language when given and
    /// non-empty, otherwise the current language.
    pub fn resolve(&self, lang: Option<&str>) -> Option<&LanguageBundle> {
        match lang.filter(|tag| !tag.trim().is_empty()) {
            Some(tag) => self.language_bundle(tag),
            None => self.language_bundle(&self.current),
        }
    }

    /// Whether a bundle is registered for exactly this tag.
    pub fn has_language(&self, tag: &str) -> bool {
        self.bundles.contains_key(&normalize_tag(tag))
    }

    /// Registered tags, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.bundles.keys().cloned().collect();
        tags.sort();
        tags
    }
}

impl Default for LocalizationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: LazyLock<RwLock<LocalizationRegistry>> =
    LazyLock::new(|| RwLock::new(LocalizationRegistry::new()));

/// Register a bundle on the process-wide registry.
pub fn register_language(tag: &str, bundle: LanguageBundle) {
    GLOBAL_REGISTRY.write().register_language(tag, bundle);
}

/// Set the process-wide current language.
pub fn set_current_language(tag: &str) {
    GLOBAL_REGISTRY.write().set_current_language(tag);
}

/// The process-wide current language.
pub fn current_language() -> String {
    GLOBAL_REGISTRY.read().current_language().to_string()
}

/// A copy of the process-wide bundle for `tag`.
pub fn language_bundle(tag: &str) -> Option<LanguageBundle> {
    GLOBAL_REGISTRY.read().language_bundle(tag).cloned()
}

/// A snapshot of the process-wide registry.
pub fn global_registry() -> LocalizationRegistry {
    GLOBAL_REGISTRY.read().clone()
}
