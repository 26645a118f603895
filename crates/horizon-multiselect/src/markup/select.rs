//! The `<select>` emitter.

use std::fmt::Write;

use horizon_multiselect_core::logging::targets;

use super::validation::{MarkupRule, validation_attributes};
use crate::widget::{
    AUTO_ATTACH_ATTR, AUTO_ATTACH_VALUE, Control, ControlHandle, MultiSelectConfig, NativeEntry,
    NativeOption,
};

/// One option of an emitted control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupItem {
    pub value: String,
    pub text: String,
    pub selected: bool,
    pub disabled: bool,
    /// Items sharing a group name are emitted inside one `<optgroup>`.
    pub group: Option<String>,
}

impl MarkupItem {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set selected state using builder pattern.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Set disabled state using builder pattern.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the group name using builder pattern.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Element id derived from a field name: `.`, `[` and `]` become `_`.
pub fn field_id(name: &str) -> String {
    name.replace(['.', '[', ']'], "_")
}

/// Builder for a multi-select `<select>` element.
///
/// # Example
///
/// ```ignore
/// use horizon_multiselect::markup::{MarkupItem, MarkupRule, MultiSelectMarkup};
///
/// let html = MultiSelectMarkup::new("Order.Tags")
///     .with_item(MarkupItem::new("a", "Alpha").with_group("Letters"))
///     .with_item(MarkupItem::new("1", "One"))
///     .with_rule(MarkupRule::required())
///     .to_html();
/// assert!(html.starts_with("<select id=\"Order_Tags\" name=\"Order.Tags\""));
/// ```
#[derive(Debug, Clone)]
pub struct MultiSelectMarkup {
    name: String,
    display_name: Option<String>,
    items: Vec<MarkupItem>,
    config: MultiSelectConfig,
    rules: Vec<MarkupRule>,
}

impl MultiSelectMarkup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            items: Vec::new(),
            config: MultiSelectConfig::default(),
            rules: Vec::new(),
        }
    }

    /// Set the name used in validation messages using builder pattern.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_item(mut self, item: MarkupItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = MarkupItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Set the widget configuration written as `data-*` attributes.
    pub fn with_config(mut self, config: MultiSelectConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_rule(mut self, rule: MarkupRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> String {
        field_id(&self.name)
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// The `<select>` attributes, unescaped, in emission order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        let config = &self.config;
        let mut attrs: Vec<(String, String)> = vec![
            ("id".into(), self.id()),
            ("name".into(), self.name.clone()),
            ("multiple".into(), "multiple".into()),
        ];
        attrs.extend(validation_attributes(&self.rules, self.display_name()));

        let mut push = |name: &str, value: String| attrs.push((name.to_string(), value));
        push(AUTO_ATTACH_ATTR, AUTO_ATTACH_VALUE.to_string());
        push("data-placeholder", config.placeholder.clone());
        if config.max_selection > 0 {
            push("data-max-selection", config.max_selection.to_string());
        }
        push("data-select-all", config.select_all.to_string());
        push("data-search", config.search.to_string());
        push("data-width", config.width.clone());
        push("data-theme", config.theme.clone());
        push("data-close-on-select", config.close_on_select.to_string());
        if !config.button_class.is_empty() {
            push("data-button-class", config.button_class.clone());
        }
        if !config.dropdown_class.is_empty() {
            push("data-dropdown-class", config.dropdown_class.clone());
        }
        push("data-search-placeholder", config.search_placeholder.clone());
        push("data-select-all-text", config.select_all_text.clone());
        push("data-deselect-all-text", config.deselect_all_text.clone());
        push("data-no-results-text", config.no_results_text.clone());
        push("data-max-height", config.max_height.clone());
        push("data-items-selected-text", config.items_selected_text.clone());
        if let Some(lang) = config.lang.as_ref().filter(|l| !l.is_empty()) {
            push("data-lang", lang.clone());
        }
        if config.enable_pagination {
            push("data-enable-pagination", "true".to_string());
            push("data-items-per-page", config.items_per_page.to_string());
            push("data-pagination-position", config.pagination_position.as_str().to_string());
        }
        attrs
    }

    /// Items bucketed by group name, buckets in first-appearance order.
    /// Ungrouped items share the `None` bucket.
    fn buckets(&self) -> Vec<(Option<&str>, Vec<&MarkupItem>)> {
        let mut buckets: Vec<(Option<&str>, Vec<&MarkupItem>)> = Vec::new();
        for item in &self.items {
            let key = item.group.as_deref().filter(|g| !g.is_empty());
            match buckets.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(item),
                None => buckets.push((key, vec![item])),
            }
        }
        buckets
    }

    /// Render the `<select>` element.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<select");
        for (name, value) in self.attributes() {
            let _ = write!(out, " {}=\"{}\"", name, v_htmlescape::escape(&value));
        }
        out.push_str(">\n");

        for (group, items) in self.buckets() {
            match group {
                Some(label) => {
                    let _ = writeln!(out, "    <optgroup label=\"{}\">", v_htmlescape::escape(label));
                    for item in items {
                        let _ = writeln!(out, "        {}", option_html(item));
                    }
                    out.push_str("    </optgroup>\n");
                }
                None => {
                    for item in items {
                        let _ = writeln!(out, "    {}", option_html(item));
                    }
                }
            }
        }
        out.push_str("</select>\n");
        tracing::trace!(target: targets::WIDGET, name = %self.name, items = self.items.len(), "emitted select markup");
        out
    }

    /// The in-memory native control this markup describes.
    pub fn to_control(&self) -> ControlHandle {
        let entries = self
            .buckets()
            .into_iter()
            .flat_map(|(group, items)| {
                let options: Vec<NativeOption> = items.into_iter().map(native_option).collect();
                match group {
                    Some(label) => vec![NativeEntry::group(label, options)],
                    None => options.into_iter().map(NativeEntry::from).collect(),
                }
            })
            .collect();
        self.attributes()
            .into_iter()
            .filter(|(name, _)| name != "name")
            .fold(Control::native_select(self.name.clone()), |control, (name, value)| {
                control.with_attribute(name, value)
            })
            .with_entries(entries)
            .into_handle()
    }
}

fn native_option(item: &MarkupItem) -> NativeOption {
    NativeOption::new(item.value.clone(), item.text.clone())
        .with_default_selected(item.selected)
        .with_disabled(item.disabled)
}

fn option_html(item: &MarkupItem) -> String {
    format!(
        "<option value=\"{}\"{}{}>{}</option>",
        v_htmlescape::escape(&item.value),
        if item.selected { " selected" } else { "" },
        if item.disabled { " disabled" } else { "" },
        v_htmlescape::escape(&item.text),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::ControlValue;

    fn sample() -> MultiSelectMarkup {
        MultiSelectMarkup::new("Order.Tags[0]")
            .with_display_name("Tags")
            .with_item(MarkupItem::new("1", "One"))
            .with_item(MarkupItem::new("a", "Alpha").with_group("Letters").with_selected(true))
            .with_item(MarkupItem::new("2", "Two").with_disabled(true))
            .with_item(MarkupItem::new("b", "B & C").with_group("Letters"))
    }

    #[test]
    fn test_field_id() {
        assert_eq!(field_id("Order.Tags[0]"), "Order_Tags_0_");
    }

    #[test]
    fn test_html_layout() {
        let html = sample().to_html();
        assert!(html.starts_with(
            "<select id=\"Order_Tags_0_\" name=\"Order.Tags[0]\" multiple=\"multiple\" data-toggle=\"bootstrap-multiselect\""
        ));
        assert!(!html.contains("data-max-selection"));
        assert!(!html.contains("data-lang"));
        assert!(!html.contains("data-val"));

        let one = html.find("value=\"1\"").unwrap();
        let two = html.find("value=\"2\"").unwrap();
        let group = html.find("<optgroup label=\"Letters\">").unwrap();
        assert!(one < two && two < group);
        assert!(html.contains("<option value=\"a\" selected>Alpha</option>"));
        assert!(html.contains("<option value=\"2\" disabled>Two</option>"));
        assert!(html.contains(">B &amp; C</option>"));
        assert!(html.ends_with("</select>\n"));
    }

    #[test]
    fn test_conditional_attributes() {
        let config = MultiSelectConfig {
            max_selection: 3,
            lang: Some("fr".into()),
            dropdown_class: "wide".into(),
            ..MultiSelectConfig::default()
        };
        let html = MultiSelectMarkup::new("Tags")
            .with_config(config)
            .with_rule(MarkupRule::required())
            .to_html();
        assert!(html.contains("data-max-selection=\"3\""));
        assert!(html.contains("data-lang=\"fr\""));
        assert!(html.contains("data-dropdown-class=\"wide\""));
        assert!(html.contains("data-val-required=\"The Tags field is required.\""));
        assert!(html.contains("data-val=\"true\""));
    }

    #[test]
    fn test_to_control() {
        let control = sample().to_control();
        assert_eq!(control.name(), "Order.Tags[0]");
        assert_eq!(control.attribute("data-toggle").as_deref(), Some("bootstrap-multiselect"));
        assert_eq!(control.attribute("id").as_deref(), Some("Order_Tags_0_"));
        assert_eq!(control.entries().len(), 3);
        assert_eq!(control.value(), ControlValue::Many(vec!["a".to_string()]));
    }
}
