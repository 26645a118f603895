//! Option model for the multi-select dropdown.
//!
//! An [`OptionModel`] is the ordered list of entries the dropdown displays:
//! plain [`OptionItem`]s and labelled [`OptionGroup`]s of items. Groups do not
//! nest.
//!
//! # Example
//!
//! ```ignore
//! use horizon_multiselect::model::{OptionEntry, OptionGroup, OptionItem, OptionModel};
//!
//! let model = OptionModel::new(vec![
//!     OptionItem::new("en", "English").with_selected(true).into(),
//!     OptionGroup::new("Romance", vec![
//!         OptionItem::new("fr", "French"),
//!         OptionItem::new("it", "Italian").with_disabled(true),
//!     ])
//!     .into(),
//! ]);
//!
//! assert_eq!(model.option_count(), 3);
//! assert!(model.is_disabled("it"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use horizon_multiselect_core::logging::targets;

/// One selectable leaf item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionItem {
    /// The value written to the bound control when selected.
    pub value: String,
    /// The display text, also used for search filtering.
    pub text: String,
    /// Load-time selection hint. The widget's selection state is authoritative.
    #[serde(default)]
    pub selected: bool,
    /// Originally disabled. Permanent for the lifetime of the model.
    #[serde(default)]
    pub disabled: bool,
}

impl OptionItem {
    /// Create an enabled, unselected item.
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            selected: false,
            disabled: false,
        }
    }

    /// Set the load-time selection hint using builder pattern.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Mark the item as originally disabled using builder pattern.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// A labelled cluster of items rendered together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionGroup {
    /// Group heading.
    pub label: String,
    /// Items in display order.
    pub children: Vec<OptionItem>,
}

impl OptionGroup {
    /// Create a group from its label and children.
    pub fn new(label: impl Into<String>, children: Vec<OptionItem>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

/// A top-level entry of the option model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionEntry {
    /// A group of items.
    Group(OptionGroup),
    /// A standalone item.
    Item(OptionItem),
}

impl From<OptionItem> for OptionEntry {
    fn from(item: OptionItem) -> Self {
        OptionEntry::Item(item)
    }
}

impl From<OptionGroup> for OptionEntry {
    fn from(group: OptionGroup) -> Self {
        OptionEntry::Group(group)
    }
}

/// The ordered option model shown by the dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionModel {
    entries: Vec<OptionEntry>,
}

impl OptionModel {
    /// Create a model from entries, preserving their order.
    pub fn new(entries: Vec<OptionEntry>) -> Self {
        Self { entries }
    }

    /// Create an empty model.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a model from caller-supplied JSON objects.
    ///
    /// Objects with a `label` and a `children` array are groups; every other
    /// object is an item whose value and text are read from `value_field` and
    /// `text_field`. Numbers and booleans are stringified, missing fields
    /// become empty strings, and non-object entries are skipped.
    pub fn from_json(items: &[Value], value_field: &str, text_field: &str) -> Self {
        let mut entries = Vec::with_capacity(items.len());
        for raw in items {
            let Some(object) = raw.as_object() else {
                tracing::debug!(target: targets::CONFIG, entry = %raw, "skipping non-object option data");
                continue;
            };
            match (object.get("label"), object.get("children")) {
                (Some(label), Some(Value::Array(children))) => {
                    let children = children
                        .iter()
                        .filter_map(|child| json_item(child, value_field, text_field))
                        .collect();
                    entries.push(OptionEntry::Group(OptionGroup::new(
                        json_string(label),
                        children,
                    )));
                }
                _ => {
                    if let Some(item) = json_item(raw, value_field, text_field) {
                        entries.push(OptionEntry::Item(item));
                    }
                }
            }
        }
        Self { entries }
    }

    /// The top-level entries in display order.
    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    /// Whether the model has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate every item (group children included) in display order.
    pub fn options(&self) -> impl Iterator<Item = &OptionItem> {
        self.entries.iter().flat_map(|entry| match entry {
            OptionEntry::Item(item) => std::slice::from_ref(item).iter(),
            OptionEntry::Group(group) => group.children.iter(),
        })
    }

    /// Number of items, group children included.
    pub fn option_count(&self) -> usize {
        self.options().count()
    }

    /// Find an item by value. The first occurrence wins for duplicated values.
    pub fn find(&self, value: &str) -> Option<&OptionItem> {
        self.options().find(|item| item.value == value)
    }

    /// Whether an item with this value exists.
    pub fn contains(&self, value: &str) -> bool {
        self.find(value).is_some()
    }

    /// Whether the item with this value is originally disabled.
    ///
    /// Unknown values report `false`.
    pub fn is_disabled(&self, value: &str) -> bool {
        self.find(value).is_some_and(|item| item.disabled)
    }

    /// Display text for a value.
    pub fn text_of(&self, value: &str) -> Option<&str> {
        self.find(value).map(|item| item.text.as_str())
    }

    /// Values of items flagged `selected`, in display order, without
    /// duplicates or empty values.
    pub fn preselected_values(&self) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for item in self.options() {
            if item.selected && !item.value.is_empty() && !values.contains(&item.value) {
                values.push(item.value.clone());
            }
        }
        values
    }
}

impl From<Vec<OptionEntry>> for OptionModel {
    fn from(entries: Vec<OptionEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<Vec<OptionItem>> for OptionModel {
    fn from(items: Vec<OptionItem>) -> Self {
        Self::new(items.into_iter().map(OptionEntry::Item).collect())
    }
}

fn json_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_item(raw: &Value, value_field: &str, text_field: &str) -> Option<OptionItem> {
    let object = raw.as_object()?;
    let field = |name: &str| object.get(name).map(json_string).unwrap_or_default();
    let flag = |name: &str| object.get(name).and_then(Value::as_bool).unwrap_or(false);
    Some(OptionItem {
        value: field(value_field),
        text: field(text_field),
        selected: flag("selected"),
        disabled: flag("disabled"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_model() -> OptionModel {
        OptionModel::new(vec![
            OptionItem::new("en", "English").with_selected(true).into(),
            OptionGroup::new(
                "Romance",
                vec![
                    OptionItem::new("fr", "French"),
                    OptionItem::new("it", "Italian").with_disabled(true),
                ],
            )
            .into(),
            OptionItem::new("de", "German").into(),
        ])
    }

    #[test]
    fn test_options_in_display_order() {
        let model = sample_model();
        let values: Vec<&str> = model.options().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["en", "fr", "it", "de"]);
        assert_eq!(model.option_count(), 4);
        assert_eq!(model.entries().len(), 3);
    }

    #[test]
    fn test_lookup() {
        let model = sample_model();
        assert!(model.contains("fr"));
        assert!(!model.contains("es"));
        assert!(model.is_disabled("it"));
        assert!(!model.is_disabled("fr"));
        assert!(!model.is_disabled("missing"));
        assert_eq!(model.text_of("de"), Some("German"));
    }

    #[test]
    fn test_preselected_values() {
        let model = sample_model();
        assert_eq!(model.preselected_values(), vec!["en".to_string()]);
    }

    #[test]
    fn test_empty_model() {
        let model = OptionModel::empty();
        assert!(model.is_empty());
        assert_eq!(model.option_count(), 0);
        assert!(model.preselected_values().is_empty());
    }

    #[test]
    fn test_from_json_with_custom_fields() {
        let data = vec![
            json!({"code": "1", "name": "One", "selected": true}),
            json!({"label": "More", "children": [
                {"code": 2, "name": "Two"},
                {"code": "3", "name": "Three", "disabled": true}
            ]}),
            json!("not an object"),
        ];
        let model = OptionModel::from_json(&data, "code", "name");

        assert_eq!(model.entries().len(), 2);
        assert_eq!(model.text_of("2"), Some("Two"));
        assert!(model.is_disabled("3"));
        assert_eq!(model.preselected_values(), vec!["1".to_string()]);
    }

    #[test]
    fn test_from_json_missing_fields_are_empty() {
        let data = vec![json!({"id": "x"})];
        let model = OptionModel::from_json(&data, "id", "text");
        assert_eq!(model.text_of("x"), Some(""));
    }

    #[test]
    fn test_entry_deserializes_untagged() {
        let entries: Vec<OptionEntry> = serde_json::from_value(json!([
            {"value": "a", "text": "A"},
            {"label": "G", "children": [{"value": "b", "text": "B", "disabled": true}]}
        ]))
        .unwrap();
        let model = OptionModel::new(entries);
        assert_eq!(model.option_count(), 2);
        assert!(model.is_disabled("b"));
    }
}
