//! MultiSelect widget implementation.
//!
//! [`MultiSelect`] upgrades a bound [`Control`](crate::widget::Control) into a
//! searchable, checkbox-based dropdown. It owns the option model, the
//! selection state and a detached element tree, and keeps the control's value
//! in step with the selection.
//!
//! # Mutation Protocol
//!
//! Every accepted selection change runs, in order:
//!
//! 1. display update (summary label, badge, check marks)
//! 2. value synchronisation onto the control
//! 3. [`MultiSelect::selection_changed`] with the new snapshot
//! 4. the validation bridge (only if the provider has rules for the control)
//! 5. capacity re-evaluation
//!
//! Rejected changes (over the configured maximum) emit
//! [`MultiSelect::capacity_warning`] and leave everything else untouched.
//!
//! # Example
//!
//! ```ignore
//! use horizon_multiselect::widget::{Control, ConfigOverrides, MultiSelect, NativeOption};
//!
//! let control = Control::native_select("Languages")
//!     .with_attribute("data-max-selection", "2")
//!     .with_entries(vec![
//!         NativeOption::new("en", "English").with_default_selected(true).into(),
//!         NativeOption::new("fr", "French").into(),
//!         NativeOption::new("de", "German").into(),
//!     ])
//!     .into_handle();
//!
//! let widget = MultiSelect::new(control.clone(), ConfigOverrides::new());
//! widget.selection_changed.connect(|values| println!("selected: {:?}", values));
//!
//! widget.toggle("fr");
//! assert_eq!(widget.selected_values(), vec!["en", "fr"]);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use horizon_multiselect_core::logging::targets;
use horizon_multiselect_core::{ConnectionId, PerfSpan, SharedTaskQueue, Signal, defer};

use crate::model::{InsertOutcome, OptionEntry, OptionGroup, OptionItem, OptionModel, SelectionState};
use crate::platform::{LocalizationRegistry, global_registry};
use crate::widget::config::{ConfigOverrides, DataAttributes, MultiSelectConfig, OptionData};
use crate::widget::control::{ControlHandle, ControlKind, Form, NativeEntry, NativeOption};
use crate::widget::element::Element;
use crate::widget::events::{Key, MultiSelectEvent};
use crate::widget::filter::SearchFilter;
use crate::widget::pagination::Paginator;
use crate::widget::renderer::{DropdownRenderer, ElementIds, RowView};
use crate::widget::sync::{decode_text_value, synchronize};
use crate::widget::validation::{NoValidation, ValidationProvider};

// ============================================================================
// Public State Types
// ============================================================================

/// Whether the dropdown menu is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PopupState {
    #[default]
    Closed,
    Open,
}

/// Result of [`MultiSelect::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleOutcome {
    /// The value was added to the selection.
    Selected,
    /// The value was removed from the selection.
    Deselected,
    /// The selection is full; nothing changed.
    Rejected,
    /// Unknown or originally-disabled value, or the widget is destroyed.
    Ignored,
}

// ============================================================================
// Internal State
// ============================================================================

struct FormBinding {
    form: Weak<Form>,
    reset: ConnectionId,
    submitted: ConnectionId,
    changed: ConnectionId,
    invalid: ConnectionId,
}

struct State {
    overrides: ConfigOverrides,
    localization: LocalizationRegistry,
    config: MultiSelectConfig,
    model: OptionModel,
    selection: SelectionState,
    initial: Vec<String>,
    renderer: DropdownRenderer,
    tree: Element,
    query: String,
    filter: SearchFilter,
    pager: Paginator,
    popup: PopupState,
    focused: Option<String>,
    enabled: bool,
    validity: Option<bool>,
    destroyed: bool,
    form_binding: Option<FormBinding>,
}

fn native_item(option: NativeOption) -> OptionItem {
    OptionItem {
        value: option.value,
        text: option.text,
        selected: option.selected,
        disabled: option.disabled,
    }
}

/// Caller data when present, otherwise the native control's options.
fn load_model(control: &ControlHandle, config: &MultiSelectConfig) -> OptionModel {
    if !config.data.is_empty() {
        return OptionModel::new(config.data.clone());
    }
    match control.kind() {
        ControlKind::NativeSelect => OptionModel::new(
            control
                .entries()
                .into_iter()
                .map(|entry| match entry {
                    NativeEntry::Option(option) => OptionEntry::Item(native_item(option)),
                    NativeEntry::Group { label, options } => OptionEntry::Group(OptionGroup::new(
                        label,
                        options.into_iter().map(native_item).collect(),
                    )),
                })
                .collect(),
        ),
        ControlKind::TextInput => OptionModel::empty(),
    }
}

/// Initial selection sources.
///
/// A selection list reads only its markup-selected options; configured values
/// and flagged caller data never apply to it. A text field takes the first
/// non-empty source of: configured values, flagged caller data, then its own
/// stored JSON array.
fn initial_selection(control: &ControlHandle, config: &MultiSelectConfig, model: &OptionModel) -> Vec<String> {
    let candidates = match control.kind() {
        ControlKind::NativeSelect => control.default_selected_values(),
        ControlKind::TextInput => {
            let flagged = OptionModel::new(config.data.clone()).preselected_values();
            if !config.selected_values.is_empty() {
                config.selected_values.clone()
            } else if !flagged.is_empty() {
                flagged
            } else {
                decode_text_value(&control.text())
            }
        }
    };

    let mut values: Vec<String> = Vec::with_capacity(candidates.len());
    for value in candidates {
        if value.is_empty() || !model.contains(&value) {
            tracing::debug!(target: targets::SELECTION, value = %value, "dropping unknown initial value");
            continue;
        }
        if !values.contains(&value) {
            values.push(value);
        }
    }
    let max = config.max_selection;
    if max > 0 && values.len() > max {
        tracing::warn!(target: targets::SELECTION, max, count = values.len(), "initial selection exceeds maximum, truncating");
        values.truncate(max);
    }
    values
}

/// A group is shown iff any of its children is shown.
fn group_visibility(model: &OptionModel, option_shown: &[bool]) -> Vec<bool> {
    let mut shown = Vec::new();
    let mut index = 0;
    for entry in model.entries() {
        match entry {
            OptionEntry::Item(_) => index += 1,
            OptionEntry::Group(group) => {
                let end = index + group.children.len();
                shown.push(option_shown[index..end].iter().any(|v| *v));
                index = end;
            }
        }
    }
    shown
}

impl State {
    fn build(
        control: &ControlHandle,
        overrides: ConfigOverrides,
        localization: LocalizationRegistry,
        ids: ElementIds,
    ) -> Self {
        let renderer = DropdownRenderer::new(ids);
        let mut state = Self {
            overrides,
            localization,
            config: MultiSelectConfig::default(),
            model: OptionModel::empty(),
            selection: SelectionState::new(0),
            initial: Vec::new(),
            tree: Element::default(),
            renderer,
            query: String::new(),
            filter: SearchFilter::default(),
            pager: Paginator::new(1),
            popup: PopupState::Closed,
            focused: None,
            enabled: true,
            validity: None,
            destroyed: false,
            form_binding: None,
        };
        state.rebuild(control);
        state.initial = initial_selection(control, &state.config, &state.model);
        for value in &state.initial {
            state.selection.insert(value.clone());
        }
        state.render_all();
        state
    }

    /// Re-resolve the configuration and rebuild model and tree. The
    /// selection is emptied.
    fn rebuild(&mut self, control: &ControlHandle) {
        let _span = PerfSpan::new("multiselect_rebuild");
        let attributes = control.attributes();
        let attrs = DataAttributes::from_attributes(attributes.iter().map(|(n, v)| (n.as_str(), v.as_str())));
        self.config = MultiSelectConfig::resolve(&attrs, &self.overrides, &self.localization);
        self.model = load_model(control, &self.config);
        self.selection = SelectionState::new(self.config.max_selection);
        self.tree = self.renderer.build(&self.config, &self.model);
        self.query.clear();
        self.filter = SearchFilter::default();
        self.pager = Paginator::new(self.config.items_per_page);
        self.popup = PopupState::Closed;
        self.focused = None;
        tracing::debug!(
            target: targets::WIDGET,
            id = self.renderer.ids().base(),
            options = self.model.option_count(),
            "built dropdown"
        );
    }

    fn view(&self) -> (RowView, usize) {
        let result = self.filter.apply(&self.model);
        if !self.config.enable_pagination {
            let view = RowView {
                option_shown: result.option_visible,
                group_shown: result.group_visible,
                show_no_results: result.show_no_results,
            };
            return (view, 1);
        }
        let visible = result.visible_indices();
        let total = self.pager.total_pages(visible.len());
        let mut option_shown = vec![false; result.option_visible.len()];
        for &index in &visible[self.pager.page_range(visible.len())] {
            option_shown[index] = true;
        }
        let group_shown = group_visibility(&self.model, &option_shown);
        let view = RowView {
            option_shown,
            group_shown,
            show_no_results: result.show_no_results,
        };
        (view, total)
    }

    fn update_display(&mut self) {
        self.renderer
            .update_display(&mut self.tree, &self.config, &self.model, &self.selection);
    }

    fn update_rows(&mut self) {
        let (view, total) = self.view();
        self.renderer.update_rows(&mut self.tree, &self.selection, &view);
        if self.config.enable_pagination {
            self.renderer
                .update_pagination(&mut self.tree, &self.config, self.pager.current_page(), total);
        }
    }

    fn update_capacity(&mut self) {
        self.renderer.update_capacity(&mut self.tree, &self.selection);
    }

    fn render_all(&mut self) {
        self.update_display();
        self.update_rows();
        self.update_capacity();
        self.renderer.set_search_text(&mut self.tree, &self.query);
        self.renderer
            .set_expanded(&mut self.tree, self.popup == PopupState::Open);
        self.renderer.set_enabled(&mut self.tree, self.enabled);
        if let Some(valid) = self.validity {
            self.renderer.set_validation(&mut self.tree, valid);
        }
    }

    /// Visible-candidate values for select-all, in display order.
    fn select_all_candidates(&self) -> Vec<String> {
        let (view, _) = self.view();
        let mut candidates: Vec<String> = Vec::new();
        for (index, item) in self.model.options().enumerate() {
            let shown = view.option_shown.get(index).copied().unwrap_or(false);
            if shown
                && !item.disabled
                && !self.selection.contains(&item.value)
                && !candidates.contains(&item.value)
            {
                candidates.push(item.value.clone());
            }
        }
        candidates
    }

    fn visible_count(&self) -> usize {
        self.filter.apply(&self.model).visible_count
    }
}

// ============================================================================
// MultiSelect
// ============================================================================

/// A searchable, checkbox-based multi-select dropdown bound to a control.
pub struct MultiSelect {
    control: ControlHandle,
    queue: Option<Arc<SharedTaskQueue>>,
    validation: Arc<dyn ValidationProvider>,
    weak_self: Weak<MultiSelect>,
    state: Mutex<State>,
    /// Set while the widget writes its own selection onto the control.
    synchronizing: AtomicBool,

    /// Emitted with the selection snapshot after every accepted mutation.
    pub selection_changed: Signal<Vec<String>>,
    /// Emitted with the configured maximum when a selection is rejected or
    /// truncated.
    pub capacity_warning: Signal<usize>,
    /// Emitted when the menu opens.
    pub opened: Signal<()>,
    /// Emitted when the menu closes.
    pub closed: Signal<()>,
}

/// Builder for [`MultiSelect`].
pub struct MultiSelectBuilder {
    control: ControlHandle,
    overrides: ConfigOverrides,
    queue: Option<Arc<SharedTaskQueue>>,
    validation: Arc<dyn ValidationProvider>,
    localization: Option<LocalizationRegistry>,
}

impl MultiSelectBuilder {
    /// Caller configuration overrides.
    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Queue for deferred work. Without one, deferred work runs immediately.
    pub fn task_queue(mut self, queue: Arc<SharedTaskQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn validation(mut self, provider: Arc<dyn ValidationProvider>) -> Self {
        self.validation = provider;
        self
    }

    /// Localization registry to resolve against instead of the process-wide
    /// one.
    pub fn localization(mut self, registry: LocalizationRegistry) -> Self {
        self.localization = Some(registry);
        self
    }

    /// Build the widget, hide the control and bind to its form.
    pub fn build(self) -> Arc<MultiSelect> {
        let localization = self.localization.unwrap_or_else(global_registry);
        let state = State::build(&self.control, self.overrides, localization, ElementIds::allocate());
        let initial = state.selection.snapshot();
        let widget = Arc::new_cyclic(|weak| MultiSelect {
            control: self.control,
            queue: self.queue,
            validation: self.validation,
            weak_self: weak.clone(),
            state: Mutex::new(state),
            synchronizing: AtomicBool::new(false),
            selection_changed: Signal::new(),
            capacity_warning: Signal::new(),
            opened: Signal::new(),
            closed: Signal::new(),
        });
        widget.control.set_hidden(true);
        widget.sync_control(&initial);
        widget.bind_form();
        tracing::info!(
            target: targets::WIDGET,
            control = widget.control.name(),
            selected = initial.len(),
            "multiselect attached"
        );
        widget
    }
}

impl MultiSelect {
    /// Start building a widget for `control`.
    pub fn builder(control: ControlHandle) -> MultiSelectBuilder {
        MultiSelectBuilder {
            control,
            overrides: ConfigOverrides::default(),
            queue: None,
            validation: Arc::new(NoValidation),
            localization: None,
        }
    }

    /// Build a widget with no task queue and no validation provider.
    pub fn new(control: ControlHandle, overrides: ConfigOverrides) -> Arc<Self> {
        Self::builder(control).overrides(overrides).build()
    }

    fn bind_form(&self) {
        let Some(form) = self.control.form() else {
            return;
        };
        let weak = self.weak_self.clone();
        let reset = form.reset_triggered.connect(move |_| {
            if let Some(widget) = weak.upgrade() {
                widget.schedule_reset();
            }
        });
        let weak = self.weak_self.clone();
        let submitted = form.submitted.connect(move |_| {
            if let Some(widget) = weak.upgrade() {
                widget.run_validation();
            }
        });
        let weak = self.weak_self.clone();
        let changed = form.changed.connect(move |field: &String| {
            if let Some(widget) = weak.upgrade()
                && field == widget.control.name()
                && !widget.synchronizing.load(Ordering::SeqCst)
                && widget.validation.has_rules(field)
            {
                widget.schedule_validation_read();
            }
        });
        let weak = self.weak_self.clone();
        let invalid = form.invalid.connect(move |_| {
            if let Some(widget) = weak.upgrade() {
                widget.set_validation_state(false);
            }
        });
        self.state.lock().form_binding = Some(FormBinding {
            form: Arc::downgrade(&form),
            reset,
            submitted,
            changed,
            invalid,
        });
    }

    // Deferred work

    fn schedule_reset(&self) {
        let weak = self.weak_self.clone();
        defer(self.queue.as_ref(), move || {
            if let Some(widget) = weak.upgrade() {
                widget.reset();
            }
        });
    }

    fn schedule_validation_read(&self) {
        let weak = self.weak_self.clone();
        defer(self.queue.as_ref(), move || {
            if let Some(widget) = weak.upgrade() {
                widget.apply_validation_verdict();
            }
        });
    }

    fn run_validation(&self) {
        let field = self.control.name();
        if !self.validation.has_rules(field) {
            return;
        }
        let valid = self.validation.validate(field, &self.control.value());
        tracing::trace!(target: targets::VALIDATION, field, valid, "requested validation");
        self.schedule_validation_read();
    }

    fn apply_validation_verdict(&self) {
        if let Some(valid) = self.validation.is_valid(self.control.name()) {
            self.set_validation_state(valid);
        }
    }

    fn set_validation_state(&self, valid: bool) {
        let mut state = self.state.lock();
        if state.destroyed {
            return;
        }
        state.validity = Some(valid);
        let state = &mut *state;
        state.renderer.set_validation(&mut state.tree, valid);
    }

    // Mutation protocol

    fn warn_capacity(&self, max: usize) {
        tracing::warn!(target: targets::SELECTION, max, "maximum selection limit reached");
        self.capacity_warning.emit(max);
    }

    /// Write `selection` onto the control. The form's change notification
    /// for this write is left to the mutation protocol's own validation step.
    fn sync_control(&self, selection: &[String]) {
        self.synchronizing.store(true, Ordering::SeqCst);
        synchronize(&self.control, selection);
        self.synchronizing.store(false, Ordering::SeqCst);
    }

    /// Steps 2-5 of the mutation protocol; step 1 ran under the lock.
    fn finish_mutation(&self, snapshot: Vec<String>) {
        self.sync_control(&snapshot);
        self.selection_changed.emit(snapshot);
        self.run_validation();
        let mut state = self.state.lock();
        if !state.destroyed {
            state.update_capacity();
        }
    }

    /// Flip one option.
    pub fn toggle(&self, value: &str) -> ToggleOutcome {
        let (outcome, snapshot, max) = {
            let mut state = self.state.lock();
            if state.destroyed {
                return ToggleOutcome::Ignored;
            }
            match state.model.find(value).map(|item| item.disabled) {
                None => {
                    tracing::debug!(target: targets::SELECTION, value, "ignoring toggle of unknown value");
                    return ToggleOutcome::Ignored;
                }
                Some(true) => {
                    tracing::debug!(target: targets::SELECTION, value, "ignoring toggle of disabled option");
                    return ToggleOutcome::Ignored;
                }
                Some(false) => {}
            }
            let outcome = if state.selection.remove(value) {
                ToggleOutcome::Deselected
            } else {
                match state.selection.insert(value) {
                    InsertOutcome::Inserted => ToggleOutcome::Selected,
                    InsertOutcome::AtCapacity => ToggleOutcome::Rejected,
                    InsertOutcome::AlreadySelected => ToggleOutcome::Ignored,
                }
            };
            // A rejected check mark is rolled back here as well.
            state.update_rows();
            if outcome == ToggleOutcome::Selected || outcome == ToggleOutcome::Deselected {
                state.update_display();
            }
            (outcome, state.selection.snapshot(), state.config.max_selection)
        };

        match outcome {
            ToggleOutcome::Selected | ToggleOutcome::Deselected => {
                tracing::debug!(target: targets::SELECTION, value, ?outcome, "toggled option");
                self.finish_mutation(snapshot);
            }
            ToggleOutcome::Rejected => self.warn_capacity(max),
            ToggleOutcome::Ignored => {}
        }
        outcome
    }

    /// Select every visible, enabled, unselected option, up to capacity.
    ///
    /// Returns the number of values added. With no free slot nothing changes
    /// and only a capacity warning is emitted.
    pub fn select_all(&self) -> usize {
        let (added, overflow, snapshot, max) = {
            let mut state = self.state.lock();
            if state.destroyed {
                return 0;
            }
            let max = state.config.max_selection;
            let mut candidates = state.select_all_candidates();
            let free = state.selection.free_slots();
            let overflow = match free {
                Some(0) => {
                    drop(state);
                    self.warn_capacity(max);
                    return 0;
                }
                Some(slots) if candidates.len() > slots => {
                    candidates.truncate(slots);
                    true
                }
                _ => false,
            };
            let mut added = 0;
            for value in candidates {
                if state.selection.insert(value) == InsertOutcome::Inserted {
                    added += 1;
                }
            }
            state.update_display();
            state.update_rows();
            (added, overflow, state.selection.snapshot(), max)
        };
        tracing::debug!(target: targets::SELECTION, added, "selected all visible options");
        if overflow {
            self.warn_capacity(max);
        }
        self.finish_mutation(snapshot);
        added
    }

    /// Clear the selection. Always notifies.
    pub fn deselect_all(&self) {
        let snapshot = {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            state.selection.clear();
            state.update_display();
            state.update_rows();
            state.selection.snapshot()
        };
        tracing::debug!(target: targets::SELECTION, "deselected all options");
        self.finish_mutation(snapshot);
    }

    /// Replace the selection.
    ///
    /// Unknown, originally-disabled and repeated values are dropped. Values
    /// beyond capacity are dropped with a capacity warning. One change
    /// notification is emitted for the whole call.
    pub fn set_selected_values<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (overflow, snapshot, max) = {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            state.selection.clear();
            let mut overflow = false;
            for value in values {
                let value = value.as_ref();
                match state.model.find(value) {
                    Some(item) if !item.disabled => {}
                    _ => {
                        tracing::debug!(target: targets::SELECTION, value, "dropping unselectable value");
                        continue;
                    }
                }
                if state.selection.insert(value) == InsertOutcome::AtCapacity {
                    overflow = true;
                    break;
                }
            }
            state.update_display();
            state.update_rows();
            (overflow, state.selection.snapshot(), state.config.max_selection)
        };
        if overflow {
            self.warn_capacity(max);
        }
        self.finish_mutation(snapshot);
    }

    /// Restore the selection captured at initialisation.
    pub fn reset(&self) {
        let snapshot = {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            let initial = state.initial.clone();
            state.selection.clear();
            for value in initial {
                if state.model.contains(&value) {
                    state.selection.insert(value);
                }
            }
            state.update_display();
            state.update_rows();
            state.selection.snapshot()
        };
        tracing::debug!(target: targets::SELECTION, count = snapshot.len(), "reset selection");
        self.finish_mutation(snapshot);
    }

    /// Rebuild from the control (or caller data) and carry the current
    /// selection forward. Values that no longer exist are dropped.
    pub fn refresh(&self) {
        let current = {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            let current = state.selection.snapshot();
            state.rebuild(&self.control);
            state.render_all();
            current
        };
        self.set_selected_values(current);
    }

    /// Replace the caller data and refresh.
    pub fn set_data(&self, data: impl Into<OptionData>) {
        {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            state.overrides.data = Some(data.into());
        }
        self.refresh();
    }

    // Search

    /// Filter the visible options. Never changes the selection.
    pub fn set_search_query(&self, query: &str) {
        let mut state = self.state.lock();
        if state.destroyed {
            return;
        }
        state.query = query.to_string();
        state.filter = SearchFilter::new(query);
        state.pager.reset();
        let state = &mut *state;
        state.renderer.set_search_text(&mut state.tree, &state.query);
        state.update_rows();
        tracing::trace!(target: targets::FILTER, query = state.filter.query(), "filtered options");
    }

    pub fn search_query(&self) -> String {
        self.state.lock().query.clone()
    }

    // Popup

    /// Open the menu. Ignored while disabled or already open.
    pub fn open(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.destroyed || !state.enabled || state.popup == PopupState::Open {
                return false;
            }
            state.popup = PopupState::Open;
            let focused = state.config.search.then(|| state.renderer.ids().search());
            state.focused = focused;
            let state = &mut *state;
            state.renderer.set_expanded(&mut state.tree, true);
        }
        self.opened.emit(());
        true
    }

    /// Close the menu and clear the search. The selection is untouched.
    pub fn close(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.destroyed || state.popup == PopupState::Closed {
                return false;
            }
            state.popup = PopupState::Closed;
            state.focused = None;
            state.query.clear();
            state.filter = SearchFilter::default();
            state.pager.reset();
            let state = &mut *state;
            state.renderer.set_expanded(&mut state.tree, false);
            state.renderer.set_search_text(&mut state.tree, "");
            state.update_rows();
        }
        self.closed.emit(());
        true
    }

    pub fn popup_state(&self) -> PopupState {
        self.state.lock().popup
    }

    pub fn is_open(&self) -> bool {
        self.popup_state() == PopupState::Open
    }

    /// Id of the element holding focus inside the widget, if any.
    pub fn focused_element(&self) -> Option<String> {
        self.state.lock().focused.clone()
    }

    // Pagination

    /// Move to the next page. Returns `false` on the last page or when
    /// pagination is off.
    pub fn next_page(&self) -> bool {
        let mut state = self.state.lock();
        if state.destroyed || !state.config.enable_pagination {
            return false;
        }
        let visible = state.visible_count();
        let moved = state.pager.next(visible);
        if moved {
            state.update_rows();
        }
        moved
    }

    /// Move to the previous page. Returns `false` on the first page or when
    /// pagination is off.
    pub fn previous_page(&self) -> bool {
        let mut state = self.state.lock();
        if state.destroyed || !state.config.enable_pagination {
            return false;
        }
        let moved = state.pager.previous();
        if moved {
            state.update_rows();
        }
        moved
    }

    /// Jump to a 0-based page, clamped into range.
    pub fn go_to_page(&self, page: usize) {
        let mut state = self.state.lock();
        if state.destroyed || !state.config.enable_pagination {
            return;
        }
        let visible = state.visible_count();
        state.pager.go_to(page, visible);
        state.update_rows();
    }

    /// The 0-based current page.
    pub fn current_page(&self) -> usize {
        self.state.lock().pager.current_page()
    }

    /// Number of pages over the filter-visible options (1 when pagination
    /// is off).
    pub fn page_count(&self) -> usize {
        let state = self.state.lock();
        if !state.config.enable_pagination {
            return 1;
        }
        state.pager.total_pages(state.visible_count())
    }

    // Events

    /// Dispatch a host event. Returns `true` if the event was handled.
    pub fn handle_event(&self, event: MultiSelectEvent) -> bool {
        if self.is_destroyed() {
            return false;
        }
        tracing::trace!(target: targets::WIDGET, ?event, "handling event");
        match event {
            MultiSelectEvent::ToggleButtonClicked | MultiSelectEvent::KeyPressed(Key::Enter | Key::Space) => {
                if !self.is_enabled() {
                    return false;
                }
                if self.is_open() { self.close() } else { self.open() }
            }
            MultiSelectEvent::OptionToggled(value) => {
                let outcome = self.toggle(&value);
                if self.config_flag(|c| c.close_on_select) {
                    self.close();
                }
                outcome != ToggleOutcome::Ignored
            }
            MultiSelectEvent::SelectAllClicked => {
                if !self.config_flag(|c| c.select_all) {
                    return false;
                }
                self.select_all();
                true
            }
            MultiSelectEvent::DeselectAllClicked => {
                if !self.config_flag(|c| c.select_all) {
                    return false;
                }
                self.deselect_all();
                true
            }
            MultiSelectEvent::SearchInput(query) => {
                if !self.config_flag(|c| c.search) {
                    return false;
                }
                self.set_search_query(&query);
                true
            }
            MultiSelectEvent::OutsideClick | MultiSelectEvent::KeyPressed(Key::Escape) => self.close(),
            MultiSelectEvent::KeyPressed(Key::Other) => false,
            MultiSelectEvent::NextPageClicked => self.next_page(),
            MultiSelectEvent::PreviousPageClicked => self.previous_page(),
        }
    }

    fn config_flag(&self, pick: fn(&MultiSelectConfig) -> bool) -> bool {
        pick(&self.state.lock().config)
    }

    // Lifecycle

    /// Enable the toggle button.
    pub fn enable(&self) {
        self.set_enabled(true);
    }

    /// Disable the toggle button. The selection API keeps working.
    pub fn disable(&self) {
        self.set_enabled(false);
    }

    fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        if state.destroyed {
            return;
        }
        state.enabled = enabled;
        let state = &mut *state;
        state.renderer.set_enabled(&mut state.tree, enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Tear the widget down: unbind form handlers, drop the element tree and
    /// show the control again. Every later call is a no-op.
    pub fn destroy(&self) {
        let binding = {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.popup = PopupState::Closed;
            state.focused = None;
            state.tree = Element::default();
            state.form_binding.take()
        };
        if let Some(binding) = binding
            && let Some(form) = binding.form.upgrade()
        {
            form.reset_triggered.disconnect(binding.reset);
            form.submitted.disconnect(binding.submitted);
            form.changed.disconnect(binding.changed);
            form.invalid.disconnect(binding.invalid);
        }
        self.control.set_hidden(false);
        tracing::info!(target: targets::WIDGET, control = self.control.name(), "multiselect destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    // Accessors

    /// The current selection, in selection order.
    pub fn selected_values(&self) -> Vec<String> {
        self.state.lock().selection.snapshot()
    }

    /// The selection captured at initialisation.
    pub fn initial_values(&self) -> Vec<String> {
        self.state.lock().initial.clone()
    }

    pub fn config(&self) -> MultiSelectConfig {
        self.state.lock().config.clone()
    }

    pub fn option_model(&self) -> OptionModel {
        self.state.lock().model.clone()
    }

    /// A copy of the element tree, or `None` once destroyed.
    pub fn element_tree(&self) -> Option<Element> {
        let state = self.state.lock();
        (!state.destroyed).then(|| state.tree.clone())
    }

    /// The element tree as HTML (empty once destroyed).
    pub fn to_html(&self) -> String {
        self.element_tree().map(|tree| tree.to_html()).unwrap_or_default()
    }

    pub fn element_ids(&self) -> ElementIds {
        self.state.lock().renderer.ids().clone()
    }

    /// The last validation verdict shown on the toggle button.
    pub fn validation_state(&self) -> Option<bool> {
        self.state.lock().validity
    }

    pub fn control(&self) -> &ControlHandle {
        &self.control
    }
}

impl std::fmt::Debug for MultiSelect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MultiSelect")
            .field("control", &self.control.name())
            .field("id", &state.renderer.ids().base())
            .field("selection", &state.selection.values())
            .field("popup", &state.popup)
            .field("destroyed", &state.destroyed)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(MultiSelect: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::control::{Control, ControlValue};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> LocalizationRegistry {
        LocalizationRegistry::new()
    }

    fn five_options() -> ControlHandle {
        Control::native_select("Items")
            .with_attribute("data-max-selection", "3")
            .with_entries(
                (1..=5)
                    .map(|n| NativeOption::new(format!("opt{n}"), format!("Option {n}")).into())
                    .collect(),
            )
            .into_handle()
    }

    fn build(control: ControlHandle, overrides: ConfigOverrides) -> Arc<MultiSelect> {
        MultiSelect::builder(control)
            .overrides(overrides)
            .localization(setup())
            .build()
    }

    #[test]
    fn test_attach_hides_control_and_builds_tree() {
        let control = five_options();
        let widget = build(control.clone(), ConfigOverrides::new());
        assert!(control.is_hidden());
        assert_eq!(widget.option_model().option_count(), 5);
        assert!(widget.selected_values().is_empty());
        assert_eq!(widget.config().max_selection, 3);
        assert!(widget.to_html().contains("multiselect-container"));
    }

    #[test]
    fn test_toggle_and_capacity() {
        let widget = build(five_options(), ConfigOverrides::new());
        let changes = Arc::new(AtomicUsize::new(0));
        let warnings = Arc::new(AtomicUsize::new(0));
        let changes_clone = changes.clone();
        widget.selection_changed.connect(move |_| {
            changes_clone.fetch_add(1, Ordering::SeqCst);
        });
        let warnings_clone = warnings.clone();
        widget.capacity_warning.connect(move |&max| {
            assert_eq!(max, 3);
            warnings_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(widget.toggle("opt1"), ToggleOutcome::Selected);
        assert_eq!(widget.toggle("opt2"), ToggleOutcome::Selected);
        assert_eq!(widget.toggle("opt3"), ToggleOutcome::Selected);
        assert_eq!(widget.toggle("opt4"), ToggleOutcome::Rejected);

        assert_eq!(widget.selected_values(), vec!["opt1", "opt2", "opt3"]);
        assert_eq!(changes.load(Ordering::SeqCst), 3);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);

        let tree = widget.element_tree().unwrap();
        let ids = widget.element_ids();
        let opt4 = tree.find_by_id(&ids.checkbox(3)).unwrap();
        assert!(!opt4.has_attr("checked"));
        assert!(opt4.has_attr("disabled"));

        assert_eq!(widget.toggle("opt2"), ToggleOutcome::Deselected);
        let tree = widget.element_tree().unwrap();
        assert!(!tree.find_by_id(&ids.checkbox(3)).unwrap().has_attr("disabled"));
    }

    #[test]
    fn test_toggle_ignores_unknown_and_disabled() {
        let control = Control::native_select("x")
            .with_entries(vec![
                NativeOption::new("a", "A").into(),
                NativeOption::new("b", "B").with_disabled(true).into(),
            ])
            .into_handle();
        let widget = build(control, ConfigOverrides::new());
        assert_eq!(widget.toggle("zzz"), ToggleOutcome::Ignored);
        assert_eq!(widget.toggle("b"), ToggleOutcome::Ignored);
        assert!(widget.selected_values().is_empty());
    }

    #[test]
    fn test_control_value_follows_selection() {
        let control = five_options();
        let widget = build(control.clone(), ConfigOverrides::new());
        widget.toggle("opt2");
        assert_eq!(control.value(), ControlValue::Many(vec!["opt2".to_string()]));
        widget.deselect_all();
        assert_eq!(control.value(), ControlValue::None);
    }

    #[test]
    fn test_select_all_partial_fill() {
        let widget = build(five_options(), ConfigOverrides::new());
        let warnings = Arc::new(AtomicUsize::new(0));
        let warnings_clone = warnings.clone();
        widget.capacity_warning.connect(move |_| {
            warnings_clone.fetch_add(1, Ordering::SeqCst);
        });

        widget.toggle("opt5");
        assert_eq!(widget.select_all(), 2);
        assert_eq!(widget.selected_values(), vec!["opt5", "opt1", "opt2"]);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);

        assert_eq!(widget.select_all(), 0);
        assert_eq!(warnings.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_select_all_respects_filter() {
        let widget = build(five_options(), ConfigOverrides::new().with_max_selection(0));
        widget.set_search_query("option 4");
        assert_eq!(widget.select_all(), 1);
        assert_eq!(widget.selected_values(), vec!["opt4"]);
    }

    #[test]
    fn test_set_selected_values_single_notification() {
        let widget = build(five_options(), ConfigOverrides::new());
        let changes = Arc::new(AtomicUsize::new(0));
        let changes_clone = changes.clone();
        widget.selection_changed.connect(move |_| {
            changes_clone.fetch_add(1, Ordering::SeqCst);
        });

        widget.set_selected_values(["opt3", "missing", "opt3", "opt1", "opt2", "opt4"]);
        assert_eq!(widget.selected_values(), vec!["opt3", "opt1", "opt2"]);
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_restores_initial() {
        let control = Control::native_select("Langs")
            .with_entries(vec![
                NativeOption::new("en", "English").with_default_selected(true).into(),
                NativeOption::new("fr", "French").into(),
            ])
            .into_handle();
        let widget = build(control, ConfigOverrides::new());
        assert_eq!(widget.initial_values(), vec!["en"]);

        widget.set_selected_values(["fr"]);
        assert_eq!(widget.selected_values(), vec!["fr"]);
        widget.reset();
        assert_eq!(widget.selected_values(), vec!["en"]);
    }

    #[test]
    fn test_initial_selection_sources_by_control_kind() {
        let native = build(five_options(), ConfigOverrides::new().with_selected_values(["opt1"]));
        assert!(native.initial_values().is_empty());

        let data = vec![
            OptionEntry::Item(OptionItem::new("a", "A")),
            OptionEntry::Item(OptionItem::new("b", "B").with_selected(true)),
            OptionEntry::Item(OptionItem::new("c", "C")),
        ];
        let stored = r#"["c"]"#;
        let configured = build(
            Control::text_input("t", stored).into_handle(),
            ConfigOverrides::new().with_data(data.clone()).with_selected_values(["a"]),
        );
        assert_eq!(configured.initial_values(), vec!["a"]);

        let flagged = build(
            Control::text_input("t", stored).into_handle(),
            ConfigOverrides::new().with_data(data.clone()),
        );
        assert_eq!(flagged.initial_values(), vec!["b"]);

        let unflagged: Vec<OptionEntry> = ["a", "b", "c"]
            .into_iter()
            .map(|v| OptionEntry::Item(OptionItem::new(v, v)))
            .collect();
        let from_text = build(
            Control::text_input("t", stored).into_handle(),
            ConfigOverrides::new().with_data(unflagged),
        );
        assert_eq!(from_text.initial_values(), vec!["c"]);
    }

    #[test]
    fn test_popup_state_machine() {
        let widget = build(five_options(), ConfigOverrides::new());
        let opened = Arc::new(AtomicUsize::new(0));
        let opened_clone = opened.clone();
        widget.opened.connect(move |_| {
            opened_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(widget.handle_event(MultiSelectEvent::ToggleButtonClicked));
        assert!(widget.is_open());
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(widget.focused_element(), Some(widget.element_ids().search()));

        widget.handle_event(MultiSelectEvent::SearchInput("3".into()));
        widget.toggle("opt1");
        assert!(widget.handle_event(MultiSelectEvent::KeyPressed(Key::Escape)));
        assert!(!widget.is_open());
        assert_eq!(widget.search_query(), "");
        assert_eq!(widget.selected_values(), vec!["opt1"]);

        widget.disable();
        assert!(!widget.handle_event(MultiSelectEvent::ToggleButtonClicked));
        assert!(!widget.is_open());
        widget.enable();
        assert!(widget.handle_event(MultiSelectEvent::ToggleButtonClicked));
        assert!(widget.handle_event(MultiSelectEvent::OutsideClick));
        assert!(!widget.is_open());
    }

    #[test]
    fn test_close_on_select() {
        let widget = build(five_options(), ConfigOverrides::new().with_close_on_select(true));
        widget.open();
        assert!(widget.handle_event(MultiSelectEvent::OptionToggled("opt1".into())));
        assert!(!widget.is_open());
        assert_eq!(widget.selected_values(), vec!["opt1"]);
    }

    #[test]
    fn test_destroy_restores_control() {
        let control = five_options();
        let widget = build(control.clone(), ConfigOverrides::new());
        widget.destroy();
        assert!(!control.is_hidden());
        assert!(widget.is_destroyed());
        assert!(widget.element_tree().is_none());
        assert_eq!(widget.toggle("opt1"), ToggleOutcome::Ignored);
        assert!(!widget.handle_event(MultiSelectEvent::ToggleButtonClicked));
    }

    #[test]
    fn test_refresh_carries_selection_forward() {
        let widget = build(
            Control::native_select("x").into_handle(),
            ConfigOverrides::new().with_data(vec![
                OptionEntry::Item(OptionItem::new("a", "A")),
                OptionEntry::Item(OptionItem::new("b", "B")),
            ]),
        );
        widget.set_selected_values(["a", "b"]);
        widget.set_data(vec![
            OptionEntry::Item(OptionItem::new("b", "B")),
            OptionEntry::Item(OptionItem::new("c", "C")),
        ]);
        assert_eq!(widget.selected_values(), vec!["b"]);
        assert_eq!(widget.option_model().option_count(), 2);
    }

    #[test]
    fn test_pagination() {
        let control = Control::native_select("Pages")
            .with_entries(
                (0..25)
                    .map(|n| NativeOption::new(n.to_string(), format!("Item {n}")).into())
                    .collect(),
            )
            .into_handle();
        let widget = build(control, ConfigOverrides::new().with_pagination(10));
        assert_eq!(widget.page_count(), 3);
        assert!(widget.next_page());
        assert!(widget.next_page());
        assert!(!widget.next_page());
        assert_eq!(widget.current_page(), 2);

        assert_eq!(widget.select_all(), 5);
        widget.set_search_query("item 1");
        assert_eq!(widget.current_page(), 0);
        assert_eq!(widget.page_count(), 2);
        assert!(!widget.previous_page());
    }
}
