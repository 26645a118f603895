//! Dropdown structure and its incremental updates.
//!
//! [`DropdownRenderer::build`] creates the element tree once per
//! initialisation. Everything after that mutates the existing tree in place:
//! the summary label and badge, row check/visibility state, the transient
//! capacity affordance, pagination, popup and validation styling.
//!
//! Rows and checkboxes carry `data-index` (display-order option index);
//! groups carry `data-group-index`.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::{OptionEntry, OptionItem, OptionModel, SelectionState};

use super::config::MultiSelectConfig;
use super::element::Element;

/// Up to this many selected items are listed by name in the summary.
pub const MAX_LISTED_ITEMS: usize = 3;

pub const ROW_CLASS: &str = "multiselect-option";
pub const GROUP_CLASS: &str = "multiselect-optgroup";
pub const CHECKBOX_CLASS: &str = "form-check-input";
pub const ORIGINAL_DISABLED_ATTR: &str = "data-original-disabled";

const VALID_CLASSES: &str = "is-valid";
const INVALID_CLASSES: &str = "is-invalid border-danger";

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// Element Ids
// ============================================================================

/// Element ids of one widget instance, derived from a per-process counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    base: String,
}

impl ElementIds {
    /// Allocate ids for a new instance (`multiselect-{n}`).
    pub fn allocate() -> Self {
        let n = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        Self {
            base: format!("multiselect-{n}"),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn part(&self, name: &str) -> String {
        format!("{}-{}", self.base, name)
    }

    pub fn button(&self) -> String {
        self.part("button")
    }

    pub fn label(&self) -> String {
        self.part("label")
    }

    pub fn badge(&self) -> String {
        self.part("badge")
    }

    pub fn menu(&self) -> String {
        self.part("menu")
    }

    pub fn search(&self) -> String {
        self.part("search")
    }

    pub fn select_all(&self) -> String {
        self.part("select-all")
    }

    pub fn deselect_all(&self) -> String {
        self.part("deselect-all")
    }

    pub fn options(&self) -> String {
        self.part("options")
    }

    pub fn no_results(&self) -> String {
        self.part("no-results")
    }

    /// Checkbox id of the option at display-order `index`.
    pub fn checkbox(&self, index: usize) -> String {
        self.part(&format!("option-{index}"))
    }

    pub fn pagination(&self, position: &str) -> String {
        self.part(&format!("pagination-{position}"))
    }
}

// ============================================================================
// Row View
// ============================================================================

/// Per-row view state computed by the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowView {
    /// Per option, in display order: shown under the filter and current page.
    pub option_shown: Vec<bool>,
    /// Per group, in display order.
    pub group_shown: Vec<bool>,
    pub show_no_results: bool,
}

/// The summary shown on the toggle button.
pub fn summary_text(config: &MultiSelectConfig, model: &OptionModel, selection: &SelectionState) -> String {
    match selection.len() {
        0 => config.placeholder.clone(),
        n if n <= MAX_LISTED_ITEMS => selection
            .values()
            .iter()
            .map(|value| model.text_of(value).unwrap_or(value.as_str()))
            .collect::<Vec<_>>()
            .join(", "),
        n => format!("{n} {}", config.items_selected_text),
    }
}

fn row_index(element: &Element) -> Option<usize> {
    element.attr("data-index").and_then(|i| i.parse().ok())
}

// ============================================================================
// Renderer
// ============================================================================

/// Builds and updates one widget's element tree.
#[derive(Debug, Clone)]
pub struct DropdownRenderer {
    ids: ElementIds,
}

impl DropdownRenderer {
    pub fn new(ids: ElementIds) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &ElementIds {
        &self.ids
    }

    /// Build the full detached tree.
    pub fn build(&self, config: &MultiSelectConfig, model: &OptionModel) -> Element {
        let ids = &self.ids;
        let button = Element::new("button")
            .with_attr("type", "button")
            .with_attr("id", ids.button())
            .with_attr("aria-expanded", "false")
            .with_class("btn")
            .with_class(&config.effective_button_class())
            .with_class("dropdown-toggle w-100 text-start d-flex justify-content-between align-items-center")
            .with_child(
                Element::new("span")
                    .with_attr("id", ids.label())
                    .with_class("multiselect-placeholder")
                    .with_text(config.placeholder.clone()),
            )
            .with_child(
                Element::new("span")
                    .with_attr("id", ids.badge())
                    .with_class(&format!("multiselect-badge badge bg-{} ms-2", config.theme))
                    .with_text("0")
                    .with_hidden(true),
            );

        let mut body = Element::new("div").with_class("p-2");
        if config.enable_pagination && config.pagination_position.shows_top() {
            body.push_child(self.build_pagination(config, "top"));
        }
        if config.search {
            body.push_child(
                Element::new("div").with_class("mb-2").with_child(
                    Element::new("input")
                        .with_attr("type", "text")
                        .with_attr("id", ids.search())
                        .with_attr("placeholder", config.search_placeholder.clone())
                        .with_attr("value", "")
                        .with_class("form-control form-control-sm multiselect-search"),
                ),
            );
        }
        if config.select_all {
            body.push_child(
                Element::new("div")
                    .with_class("mb-2 d-flex gap-2")
                    .with_child(
                        Element::new("button")
                            .with_attr("type", "button")
                            .with_attr("id", ids.select_all())
                            .with_class("btn btn-sm btn-outline-primary multiselect-select-all flex-fill")
                            .with_text(config.select_all_text.clone()),
                    )
                    .with_child(
                        Element::new("button")
                            .with_attr("type", "button")
                            .with_attr("id", ids.deselect_all())
                            .with_class("btn btn-sm btn-outline-secondary multiselect-deselect-all flex-fill")
                            .with_text(config.deselect_all_text.clone()),
                    ),
            );
        }
        body.push_child(Element::new("hr").with_class("my-2"));
        body.push_child(self.build_options(model));
        body.push_child(
            Element::new("div")
                .with_attr("id", ids.no_results())
                .with_class("multiselect-no-results text-muted text-center py-2")
                .with_hidden(true)
                .with_child(Element::new("small").with_text(config.no_results_text.clone())),
        );
        if config.enable_pagination && config.pagination_position.shows_bottom() {
            body.push_child(self.build_pagination(config, "bottom"));
        }

        let menu = Element::new("div")
            .with_attr("id", ids.menu())
            .with_attr("aria-labelledby", ids.button())
            .with_class("dropdown-menu w-100")
            .with_class(&config.dropdown_class)
            .with_style("max-height", config.max_height.clone())
            .with_style("overflow-y", "auto")
            .with_child(body);

        Element::new("div")
            .with_attr("id", ids.base())
            .with_class("multiselect-container dropdown")
            .with_style("width", config.width.clone())
            .with_child(button)
            .with_child(menu)
    }

    fn build_options(&self, model: &OptionModel) -> Element {
        let mut list = Element::new("div")
            .with_attr("id", self.ids.options())
            .with_class("multiselect-options");
        let mut index = 0;
        for (group_index, entry) in model.entries().iter().enumerate() {
            match entry {
                OptionEntry::Item(item) => {
                    list.push_child(self.build_row(item, index));
                    index += 1;
                }
                OptionEntry::Group(group) => {
                    let mut children = Element::new("div").with_class("ps-3");
                    for item in &group.children {
                        children.push_child(self.build_row(item, index));
                        index += 1;
                    }
                    list.push_child(
                        Element::new("div")
                            .with_class(GROUP_CLASS)
                            .with_attr("data-group-index", group_index.to_string())
                            .with_child(
                                Element::new("div")
                                    .with_class("fw-bold text-muted small px-2 py-1")
                                    .with_text(group.label.clone()),
                            )
                            .with_child(children),
                    );
                }
            }
        }
        list
    }

    fn build_row(&self, item: &OptionItem, index: usize) -> Element {
        let checkbox_id = self.ids.checkbox(index);
        let mut checkbox = Element::new("input")
            .with_class(CHECKBOX_CLASS)
            .with_attr("type", "checkbox")
            .with_attr("value", item.value.clone())
            .with_attr("id", checkbox_id.clone())
            .with_attr("data-index", index.to_string());
        if item.disabled {
            checkbox.set_flag("disabled", true);
            checkbox.set_attr(ORIGINAL_DISABLED_ATTR, "true");
        }
        Element::new("div")
            .with_class("form-check")
            .with_class(ROW_CLASS)
            .with_attr("data-value", item.value.clone())
            .with_attr("data-index", index.to_string())
            .with_child(checkbox)
            .with_child(
                Element::new("label")
                    .with_class("form-check-label w-100")
                    .with_attr("for", checkbox_id)
                    .with_text(item.text.clone()),
            )
    }

    fn build_pagination(&self, config: &MultiSelectConfig, position: &str) -> Element {
        Element::new("div")
            .with_attr("id", self.ids.pagination(position))
            .with_class("multiselect-pagination d-flex justify-content-between align-items-center my-2")
            .with_child(
                Element::new("button")
                    .with_attr("type", "button")
                    .with_class("btn btn-sm btn-outline-secondary multiselect-page-prev")
                    .with_text(config.pagination_previous_text.clone()),
            )
            .with_child(
                Element::new("span")
                    .with_class("multiselect-page-info small text-muted")
                    .with_text(config.pagination_info(1, 1)),
            )
            .with_child(
                Element::new("button")
                    .with_attr("type", "button")
                    .with_class("btn btn-sm btn-outline-secondary multiselect-page-next")
                    .with_text(config.pagination_next_text.clone()),
            )
    }

    // Updates

    /// Refresh the summary label and count badge.
    pub fn update_display(
        &self,
        tree: &mut Element,
        config: &MultiSelectConfig,
        model: &OptionModel,
        selection: &SelectionState,
    ) {
        let text = summary_text(config, model, selection);
        if let Some(label) = tree.find_by_id_mut(&self.ids.label()) {
            label.set_text(text);
        }
        if let Some(badge) = tree.find_by_id_mut(&self.ids.badge()) {
            badge.set_text(selection.len().to_string());
            badge.set_hidden(selection.is_empty());
        }
    }

    /// Refresh check marks, row/group visibility and the no-results note.
    pub fn update_rows(&self, tree: &mut Element, selection: &SelectionState, view: &RowView) {
        let no_results_id = self.ids.no_results();
        let mut group_ordinal = 0;
        tree.for_each_mut(&mut |element| {
            if element.has_class(CHECKBOX_CLASS) {
                if let Some(value) = element.attr("value").map(str::to_string) {
                    element.set_flag("checked", selection.contains(&value));
                }
            } else if element.has_class(ROW_CLASS) {
                if let Some(index) = row_index(element) {
                    let shown = view.option_shown.get(index).copied().unwrap_or(true);
                    element.set_hidden(!shown);
                }
            } else if element.has_class(GROUP_CLASS) {
                // Groups appear in document order, matching `group_shown`.
                let shown = view.group_shown.get(group_ordinal).copied().unwrap_or(true);
                element.set_hidden(!shown);
                group_ordinal += 1;
            } else if element.id() == Some(no_results_id.as_str()) {
                element.set_hidden(!view.show_no_results);
            }
        });
    }

    /// Re-evaluate the transient capacity affordance.
    ///
    /// At capacity every unchecked row that is not originally disabled gets
    /// the `disabled` flag and class, and the select-all button is disabled.
    /// Below capacity both are lifted. Originally-disabled rows are never
    /// touched.
    pub fn update_capacity(&self, tree: &mut Element, selection: &SelectionState) {
        let full = selection.is_full();
        tree.for_each_mut(&mut |element| {
            if !element.has_class(ROW_CLASS) {
                return;
            }
            let value = element.attr("data-value").map(str::to_string);
            let Some(checkbox) = element
                .children_mut()
                .iter_mut()
                .find(|child| child.has_class(CHECKBOX_CLASS))
            else {
                return;
            };
            if checkbox.has_attr(ORIGINAL_DISABLED_ATTR) {
                return;
            }
            let checked = value.as_deref().is_some_and(|v| selection.contains(v));
            let disable = full && !checked;
            checkbox.set_flag("disabled", disable);
            element.toggle_class("disabled", disable);
        });
        if let Some(select_all) = tree.find_by_id_mut(&self.ids.select_all()) {
            select_all.set_flag("disabled", full);
            select_all.toggle_class("disabled", full);
        }
    }

    /// Refresh pagination info and button states. `current` is 0-based.
    pub fn update_pagination(&self, tree: &mut Element, config: &MultiSelectConfig, current: usize, total: usize) {
        let info = config.pagination_info(current + 1, total);
        for position in ["top", "bottom"] {
            let Some(bar) = tree.find_by_id_mut(&self.ids.pagination(position)) else {
                continue;
            };
            for child in bar.children_mut() {
                if child.has_class("multiselect-page-prev") {
                    child.set_flag("disabled", current == 0);
                } else if child.has_class("multiselect-page-next") {
                    child.set_flag("disabled", current + 1 >= total);
                } else if child.has_class("multiselect-page-info") {
                    child.set_text(info.clone());
                }
            }
        }
    }

    /// Reflect the popup state on the menu and toggle button.
    pub fn set_expanded(&self, tree: &mut Element, open: bool) {
        if let Some(button) = tree.find_by_id_mut(&self.ids.button()) {
            button.set_attr("aria-expanded", if open { "true" } else { "false" });
        }
        if let Some(menu) = tree.find_by_id_mut(&self.ids.menu()) {
            menu.toggle_class("show", open);
        }
    }

    /// Mirror the search query into the search input.
    pub fn set_search_text(&self, tree: &mut Element, text: &str) {
        if let Some(input) = tree.find_by_id_mut(&self.ids.search()) {
            input.set_attr("value", text);
        }
    }

    /// Enable or disable the toggle button.
    pub fn set_enabled(&self, tree: &mut Element, enabled: bool) {
        if let Some(button) = tree.find_by_id_mut(&self.ids.button()) {
            button.set_flag("disabled", !enabled);
        }
    }

    /// Style the toggle button with a validation verdict.
    pub fn set_validation(&self, tree: &mut Element, valid: bool) {
        if let Some(button) = tree.find_by_id_mut(&self.ids.button()) {
            if valid {
                button.remove_class(INVALID_CLASSES);
                button.add_class(VALID_CLASSES);
            } else {
                button.remove_class(VALID_CLASSES);
                button.add_class(INVALID_CLASSES);
            }
        }
    }
}
