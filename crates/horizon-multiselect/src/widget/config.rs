//! Widget configuration and its resolution.
//!
//! A [`MultiSelectConfig`] is assembled once per widget from four layers, in
//! increasing priority:
//!
//! 1. built-in defaults ([`MultiSelectConfig::default`])
//! 2. markup attributes on the bound control ([`DataAttributes`])
//! 3. caller overrides ([`ConfigOverrides`])
//! 4. the language bundle, for display strings that neither layer 2 nor
//!    layer 3 set to a non-empty value
//!
//! Resolution is the pure function [`MultiSelectConfig::resolve`].
//!
//! # Example
//!
//! ```ignore
//! use horizon_multiselect::widget::{ConfigOverrides, DataAttributes, MultiSelectConfig};
//! use horizon_multiselect::platform::LocalizationRegistry;
//!
//! let attrs = DataAttributes::from_attributes([("data-lang", "fr"), ("data-max-selection", "3")]);
//! let overrides: ConfigOverrides = serde_json::from_str(r#"{"theme": "success"}"#)?;
//!
//! let config = MultiSelectConfig::resolve(&attrs, &overrides, &LocalizationRegistry::new());
//! assert_eq!(config.max_selection, 3);
//! assert_eq!(config.search_placeholder, "Rechercher...");
//! assert_eq!(config.effective_button_class(), "btn-outline-secondary");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use horizon_multiselect_core::logging::targets;

use crate::model::{OptionEntry, OptionModel};
use crate::platform::{LanguageBundle, LocalizationRegistry};

// ============================================================================
// Option Data
// ============================================================================

/// Caller-supplied option data.
///
/// Rust callers usually pass typed entries; data deserialized from a JSON
/// options object stays raw until the value/text field names are known.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionData {
    /// Typed entries, used as-is.
    Entries(Vec<OptionEntry>),
    /// Raw JSON objects, mapped through `value_field`/`text_field`.
    Json(Vec<Value>),
}

impl OptionData {
    /// Whether no entries were supplied.
    pub fn is_empty(&self) -> bool {
        match self {
            OptionData::Entries(entries) => entries.is_empty(),
            OptionData::Json(values) => values.is_empty(),
        }
    }

    fn into_entries(self, value_field: &str, text_field: &str) -> Vec<OptionEntry> {
        match self {
            OptionData::Entries(entries) => entries,
            OptionData::Json(values) => OptionModel::from_json(&values, value_field, text_field)
                .entries()
                .to_vec(),
        }
    }
}

impl From<Vec<OptionEntry>> for OptionData {
    fn from(entries: Vec<OptionEntry>) -> Self {
        OptionData::Entries(entries)
    }
}

impl From<Vec<Value>> for OptionData {
    fn from(values: Vec<Value>) -> Self {
        OptionData::Json(values)
    }
}

impl<'de> Deserialize<'de> for OptionData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<Value>::deserialize(deserializer).map(OptionData::Json)
    }
}

// ============================================================================
// Pagination Position
// ============================================================================

/// Where pagination controls render inside the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationPosition {
    Top,
    #[default]
    Bottom,
    Both,
}

impl PaginationPosition {
    /// Parse `top`, `bottom` or `both`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Both => "both",
        }
    }

    pub fn shows_top(self) -> bool {
        matches!(self, Self::Top | Self::Both)
    }

    pub fn shows_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::Both)
    }
}

// ============================================================================
// Data Attributes
// ============================================================================

/// Configuration read from the bound control's `data-*` attributes.
///
/// Unparsable values are dropped (with a debug log) so the default applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataAttributes {
    pub placeholder: Option<String>,
    pub max_selection: Option<usize>,
    pub select_all: Option<bool>,
    pub search: Option<bool>,
    pub width: Option<String>,
    pub theme: Option<String>,
    pub close_on_select: Option<bool>,
    pub button_class: Option<String>,
    pub dropdown_class: Option<String>,
    pub search_placeholder: Option<String>,
    pub select_all_text: Option<String>,
    pub deselect_all_text: Option<String>,
    pub no_results_text: Option<String>,
    pub max_height: Option<String>,
    pub items_selected_text: Option<String>,
    pub lang: Option<String>,
    pub value_field: Option<String>,
    pub text_field: Option<String>,
    pub enable_pagination: Option<bool>,
    pub items_per_page: Option<usize>,
    pub pagination_position: Option<PaginationPosition>,
}

fn parse_bool(name: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => {
            tracing::debug!(target: targets::CONFIG, attribute = name, value, "ignoring non-boolean attribute");
            None
        }
    }
}

fn parse_count(name: &str, value: &str) -> Option<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::debug!(target: targets::CONFIG, attribute = name, value, "ignoring non-numeric attribute");
            None
        }
    }
}

impl DataAttributes {
    /// Parse the recognised `data-*` attributes out of an attribute list.
    ///
    /// Names are matched case-insensitively; unknown attributes are ignored.
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut attrs = Self::default();
        for (name, value) in attributes {
            let lower = name.to_ascii_lowercase();
            let Some(key) = lower.strip_prefix("data-") else {
                continue;
            };
            let text = || Some(value.to_string());
            match key {
                "placeholder" => attrs.placeholder = text(),
                "max-selection" => attrs.max_selection = parse_count(name, value),
                "select-all" => attrs.select_all = parse_bool(name, value),
                "search" => attrs.search = parse_bool(name, value),
                "width" => attrs.width = text(),
                "theme" => attrs.theme = text(),
                "close-on-select" => attrs.close_on_select = parse_bool(name, value),
                "button-class" => attrs.button_class = text(),
                "dropdown-class" => attrs.dropdown_class = text(),
                "search-placeholder" => attrs.search_placeholder = text(),
                "select-all-text" => attrs.select_all_text = text(),
                "deselect-all-text" => attrs.deselect_all_text = text(),
                "no-results-text" => attrs.no_results_text = text(),
                "max-height" => attrs.max_height = text(),
                "items-selected-text" => attrs.items_selected_text = text(),
                "lang" => attrs.lang = text(),
                "value-field" => attrs.value_field = text(),
                "text-field" => attrs.text_field = text(),
                "enable-pagination" => attrs.enable_pagination = parse_bool(name, value),
                "items-per-page" => attrs.items_per_page = parse_count(name, value),
                "pagination-position" => {
                    attrs.pagination_position = PaginationPosition::parse(value);
                }
                _ => {}
            }
        }
        attrs
    }
}

// ============================================================================
// Caller Overrides
// ============================================================================

/// Caller-supplied configuration. Every field is optional.
///
/// Deserializes from a camelCase JSON options object, so
/// `{"maxSelection": 2, "closeOnSelect": true}` maps directly.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub placeholder: Option<String>,
    pub max_selection: Option<usize>,
    pub select_all: Option<bool>,
    pub search: Option<bool>,
    pub width: Option<String>,
    pub theme: Option<String>,
    pub close_on_select: Option<bool>,
    pub button_class: Option<String>,
    pub dropdown_class: Option<String>,
    pub search_placeholder: Option<String>,
    pub select_all_text: Option<String>,
    pub deselect_all_text: Option<String>,
    pub no_results_text: Option<String>,
    pub max_height: Option<String>,
    pub items_selected_text: Option<String>,
    pub lang: Option<String>,
    pub value_field: Option<String>,
    pub text_field: Option<String>,
    pub data: Option<OptionData>,
    pub selected_values: Option<Vec<String>>,
    pub enable_pagination: Option<bool>,
    pub items_per_page: Option<usize>,
    pub pagination_previous_text: Option<String>,
    pub pagination_next_text: Option<String>,
    pub pagination_info_text: Option<String>,
    pub pagination_position: Option<PaginationPosition>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides from a JSON options object.
    pub fn from_json_str(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Supply option data using builder pattern.
    pub fn with_data(mut self, data: impl Into<OptionData>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Supply initially selected values using builder pattern.
    pub fn with_selected_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the maximum selection count using builder pattern.
    pub fn with_max_selection(mut self, max: usize) -> Self {
        self.max_selection = Some(max);
        self
    }

    /// Set the language using builder pattern.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Set close-on-select using builder pattern.
    pub fn with_close_on_select(mut self, close: bool) -> Self {
        self.close_on_select = Some(close);
        self
    }

    /// Enable pagination with the given page size using builder pattern.
    pub fn with_pagination(mut self, items_per_page: usize) -> Self {
        self.enable_pagination = Some(true);
        self.items_per_page = Some(items_per_page);
        self
    }

    /// Whether these overrides carry non-empty option data.
    pub fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|data| !data.is_empty())
    }
}

// ============================================================================
// Resolved Configuration
// ============================================================================

/// Fully resolved widget configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSelectConfig {
    pub placeholder: String,
    /// `0` means unlimited.
    pub max_selection: usize,
    pub select_all: bool,
    pub search: bool,
    pub width: String,
    pub theme: String,
    pub close_on_select: bool,
    /// Empty means `btn-outline-{theme}`.
    pub button_class: String,
    pub dropdown_class: String,
    pub search_placeholder: String,
    pub select_all_text: String,
    pub deselect_all_text: String,
    pub no_results_text: String,
    pub max_height: String,
    pub items_selected_text: String,
    pub lang: Option<String>,
    pub value_field: String,
    pub text_field: String,
    pub data: Vec<OptionEntry>,
    pub selected_values: Vec<String>,
    pub enable_pagination: bool,
    pub items_per_page: usize,
    pub pagination_previous_text: String,
    pub pagination_next_text: String,
    pub pagination_info_text: String,
    pub pagination_position: PaginationPosition,
}

/// Default page size when pagination is enabled.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

impl Default for MultiSelectConfig {
    fn default() -> Self {
        let english = LanguageBundle::english();
        Self {
            placeholder: english.placeholder,
            max_selection: 0,
            select_all: true,
            search: true,
            width: "100%".into(),
            theme: "primary".into(),
            close_on_select: false,
            button_class: "btn-outline-secondary".into(),
            dropdown_class: String::new(),
            search_placeholder: english.search_placeholder,
            select_all_text: english.select_all_text,
            deselect_all_text: english.deselect_all_text,
            no_results_text: english.no_results_text,
            max_height: "300px".into(),
            items_selected_text: english.items_selected_text,
            lang: None,
            value_field: "id".into(),
            text_field: "text".into(),
            data: Vec::new(),
            selected_values: Vec::new(),
            enable_pagination: false,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            pagination_previous_text: english.pagination_previous_text,
            pagination_next_text: english.pagination_next_text,
            pagination_info_text: english.pagination_info_text,
            pagination_position: PaginationPosition::Bottom,
        }
    }
}

/// Later layers win; `None` keeps the earlier value.
fn layer<T: Clone>(target: &mut T, attr: Option<&T>, over: Option<&T>) {
    if let Some(value) = over.or(attr) {
        *target = value.clone();
    }
}

/// Text layer: an explicit non-empty value wins, then the bundle, then the
/// default.
fn text_layer(target: &mut String, attr: Option<&String>, over: Option<&String>, bundle: Option<&str>) {
    let explicit = over
        .filter(|s| !s.is_empty())
        .or(attr.filter(|s| !s.is_empty()));
    match (explicit, bundle.filter(|s| !s.is_empty())) {
        (Some(value), _) => target.clone_from(value),
        (None, Some(localized)) => *target = localized.to_string(),
        (None, None) => {}
    }
}

impl MultiSelectConfig {
    /// Resolve a configuration from its layers.
    pub fn resolve(
        attrs: &DataAttributes,
        overrides: &ConfigOverrides,
        registry: &LocalizationRegistry,
    ) -> Self {
        let mut config = Self::default();

        layer(&mut config.max_selection, attrs.max_selection.as_ref(), overrides.max_selection.as_ref());
        layer(&mut config.select_all, attrs.select_all.as_ref(), overrides.select_all.as_ref());
        layer(&mut config.search, attrs.search.as_ref(), overrides.search.as_ref());
        layer(&mut config.width, attrs.width.as_ref(), overrides.width.as_ref());
        layer(&mut config.theme, attrs.theme.as_ref(), overrides.theme.as_ref());
        layer(&mut config.close_on_select, attrs.close_on_select.as_ref(), overrides.close_on_select.as_ref());
        layer(&mut config.button_class, attrs.button_class.as_ref(), overrides.button_class.as_ref());
        layer(&mut config.dropdown_class, attrs.dropdown_class.as_ref(), overrides.dropdown_class.as_ref());
        layer(&mut config.max_height, attrs.max_height.as_ref(), overrides.max_height.as_ref());
        layer(&mut config.value_field, attrs.value_field.as_ref(), overrides.value_field.as_ref());
        layer(&mut config.text_field, attrs.text_field.as_ref(), overrides.text_field.as_ref());
        layer(&mut config.enable_pagination, attrs.enable_pagination.as_ref(), overrides.enable_pagination.as_ref());
        layer(&mut config.items_per_page, attrs.items_per_page.as_ref(), overrides.items_per_page.as_ref());
        layer(
            &mut config.pagination_position,
            attrs.pagination_position.as_ref(),
            overrides.pagination_position.as_ref(),
        );

        if config.items_per_page == 0 {
            tracing::debug!(target: targets::CONFIG, "items per page of 0 replaced by default");
            config.items_per_page = DEFAULT_ITEMS_PER_PAGE;
        }

        config.lang = overrides
            .lang
            .as_ref()
            .or(attrs.lang.as_ref())
            .filter(|tag| !tag.trim().is_empty())
            .cloned();

        let bundle = registry.resolve(config.lang.as_deref());
        let localized = |pick: fn(&LanguageBundle) -> &String| bundle.map(|b| pick(b).as_str());

        text_layer(
            &mut config.placeholder,
            attrs.placeholder.as_ref(),
            overrides.placeholder.as_ref(),
            localized(|b| &b.placeholder),
        );
        text_layer(
            &mut config.search_placeholder,
            attrs.search_placeholder.as_ref(),
            overrides.search_placeholder.as_ref(),
            localized(|b| &b.search_placeholder),
        );
        text_layer(
            &mut config.select_all_text,
            attrs.select_all_text.as_ref(),
            overrides.select_all_text.as_ref(),
            localized(|b| &b.select_all_text),
        );
        text_layer(
            &mut config.deselect_all_text,
            attrs.deselect_all_text.as_ref(),
            overrides.deselect_all_text.as_ref(),
            localized(|b| &b.deselect_all_text),
        );
        text_layer(
            &mut config.no_results_text,
            attrs.no_results_text.as_ref(),
            overrides.no_results_text.as_ref(),
            localized(|b| &b.no_results_text),
        );
        text_layer(
            &mut config.items_selected_text,
            attrs.items_selected_text.as_ref(),
            overrides.items_selected_text.as_ref(),
            localized(|b| &b.items_selected_text),
        );
        text_layer(
            &mut config.pagination_previous_text,
            None,
            overrides.pagination_previous_text.as_ref(),
            localized(|b| &b.pagination_previous_text),
        );
        text_layer(
            &mut config.pagination_next_text,
            None,
            overrides.pagination_next_text.as_ref(),
            localized(|b| &b.pagination_next_text),
        );
        text_layer(
            &mut config.pagination_info_text,
            None,
            overrides.pagination_info_text.as_ref(),
            localized(|b| &b.pagination_info_text),
        );

        if let Some(data) = overrides.data.clone() {
            config.data = data.into_entries(&config.value_field, &config.text_field);
        }
        if let Some(values) = &overrides.selected_values {
            config.selected_values = values.clone();
        }

        tracing::trace!(target: targets::CONFIG, lang = ?config.lang, max = config.max_selection, "resolved configuration");
        config
    }

    /// The toggle button's variant class.
    pub fn effective_button_class(&self) -> String {
        if self.button_class.is_empty() {
            format!("btn-outline-{}", self.theme)
        } else {
            self.button_class.clone()
        }
    }

    /// The page indicator text for a 1-based page.
    pub fn pagination_info(&self, current: usize, total: usize) -> String {
        self.pagination_info_text
            .replace("{current}", &current.to_string())
            .replace("{total}", &total.to_string())
    }
}
