//! The form controls a dropdown binds to.
//!
//! A [`Control`] stands in for the host page's native input: either a
//! multi-valued selection list ([`ControlKind::NativeSelect`]) or a text field
//! holding a JSON array of strings ([`ControlKind::TextInput`]). Controls
//! belong to at most one [`Form`], which publishes reset, submit, change and
//! invalid notifications.
//!
//! # Example
//!
//! ```ignore
//! use horizon_multiselect::widget::{Control, Form, NativeEntry, NativeOption};
//!
//! let form = Form::new();
//! let control = Control::native_select("Languages")
//!     .with_attribute("data-toggle", "bootstrap-multiselect")
//!     .with_entries(vec![
//!         NativeOption::new("en", "English").with_default_selected(true).into(),
//!         NativeOption::new("fr", "French").into(),
//!     ])
//!     .into_handle();
//! form.add_control(&control);
//!
//! control.value_changed.connect(|value| println!("now {:?}", value));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use horizon_multiselect_core::Signal;
use horizon_multiselect_core::logging::targets;

// ============================================================================
// Values
// ============================================================================

/// The submitted value of a control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControlValue {
    /// A selection list with nothing selected.
    #[default]
    None,
    /// A selection list's selected values.
    Many(Vec<String>),
    /// A text field's contents.
    Text(String),
}

impl ControlValue {
    /// Whether the value counts as "not provided".
    pub fn is_empty(&self) -> bool {
        match self {
            ControlValue::None => true,
            ControlValue::Many(values) => values.is_empty(),
            ControlValue::Text(text) => text.trim().is_empty(),
        }
    }

    /// Length for min/max length rules: item count or character count.
    pub fn len(&self) -> usize {
        match self {
            ControlValue::None => 0,
            ControlValue::Many(values) => values.len(),
            ControlValue::Text(text) => text.chars().count(),
        }
    }

    /// Textual form used by pattern, range and equality rules.
    pub fn as_text(&self) -> String {
        match self {
            ControlValue::None => String::new(),
            ControlValue::Many(values) => values.join(","),
            ControlValue::Text(text) => text.clone(),
        }
    }
}

// ============================================================================
// Native Options
// ============================================================================

/// One option of a native selection list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeOption {
    pub value: String,
    pub text: String,
    /// The markup `selected` attribute; restored by a form reset.
    pub default_selected: bool,
    /// The live selected flag.
    pub selected: bool,
    pub disabled: bool,
}

impl NativeOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Mark as selected in markup (and therefore live) using builder pattern.
    pub fn with_default_selected(mut self, selected: bool) -> Self {
        self.default_selected = selected;
        self.selected = selected;
        self
    }

    /// Mark as disabled using builder pattern.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// A top-level entry of a native selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEntry {
    Option(NativeOption),
    Group {
        label: String,
        options: Vec<NativeOption>,
    },
}

impl From<NativeOption> for NativeEntry {
    fn from(option: NativeOption) -> Self {
        NativeEntry::Option(option)
    }
}

impl NativeEntry {
    /// Create a group entry.
    pub fn group(label: impl Into<String>, options: Vec<NativeOption>) -> Self {
        NativeEntry::Group {
            label: label.into(),
            options,
        }
    }

    fn options_mut(&mut self) -> &mut [NativeOption] {
        match self {
            NativeEntry::Option(option) => std::slice::from_mut(option),
            NativeEntry::Group { options, .. } => options,
        }
    }

    fn options(&self) -> &[NativeOption] {
        match self {
            NativeEntry::Option(option) => std::slice::from_ref(option),
            NativeEntry::Group { options, .. } => options,
        }
    }
}

// ============================================================================
// Control
// ============================================================================

/// A unique identifier for a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(u64);

impl ControlId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

static NEXT_CONTROL_ID: AtomicU64 = AtomicU64::new(1);

/// The two kinds of bindable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    NativeSelect,
    TextInput,
}

#[derive(Debug)]
struct ControlState {
    attributes: Vec<(String, String)>,
    entries: Vec<NativeEntry>,
    text: String,
    default_text: String,
    hidden: bool,
}

/// A bindable form control.
pub struct Control {
    id: ControlId,
    name: String,
    kind: ControlKind,
    state: Mutex<ControlState>,
    form: Mutex<Weak<Form>>,

    /// Emitted with the new value whenever the control reports a change.
    pub value_changed: Signal<ControlValue>,
}

/// Shared handle to a [`Control`].
pub type ControlHandle = Arc<Control>;

impl Control {
    fn with_kind(name: impl Into<String>, kind: ControlKind) -> Self {
        Self {
            id: ControlId(NEXT_CONTROL_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            kind,
            state: Mutex::new(ControlState {
                attributes: Vec::new(),
                entries: Vec::new(),
                text: String::new(),
                default_text: String::new(),
                hidden: false,
            }),
            form: Mutex::new(Weak::new()),
            value_changed: Signal::new(),
        }
    }

    /// Create an empty multi-valued selection list.
    pub fn native_select(name: impl Into<String>) -> Self {
        Self::with_kind(name, ControlKind::NativeSelect)
    }

    /// Create a text field with an initial (and default) value.
    pub fn text_input(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut control = Self::with_kind(name, ControlKind::TextInput);
        let value = value.into();
        let state = control.state.get_mut();
        state.default_text.clone_from(&value);
        state.text = value;
        control
    }

    /// Set an attribute using builder pattern.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_attribute(&mut self.state.get_mut().attributes, name.into(), value.into());
        self
    }

    /// Set the native options using builder pattern.
    pub fn with_entries(mut self, entries: Vec<NativeEntry>) -> Self {
        self.state.get_mut().entries = entries;
        self
    }

    /// Wrap in a shared handle.
    pub fn into_handle(self) -> ControlHandle {
        Arc::new(self)
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    // Attributes

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        self.state.lock().attributes.clone()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        set_attribute(&mut self.state.lock().attributes, name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.state
            .lock()
            .attributes
            .retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    // Visibility

    pub fn is_hidden(&self) -> bool {
        self.state.lock().hidden
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.state.lock().hidden = hidden;
    }

    // Options

    /// A copy of the native entries in document order.
    pub fn entries(&self) -> Vec<NativeEntry> {
        self.state.lock().entries.clone()
    }

    /// Replace the native entries.
    pub fn set_entries(&self, entries: Vec<NativeEntry>) {
        self.state.lock().entries = entries;
    }

    /// Values of options carrying the markup `selected` attribute, in
    /// document order, empty values skipped.
    pub fn default_selected_values(&self) -> Vec<String> {
        let state = self.state.lock();
        state
            .entries
            .iter()
            .flat_map(NativeEntry::options)
            .filter(|o| o.default_selected && !o.value.is_empty())
            .map(|o| o.value.clone())
            .collect()
    }

    // Values

    /// The control's current value.
    pub fn value(&self) -> ControlValue {
        let state = self.state.lock();
        match self.kind {
            ControlKind::TextInput => ControlValue::Text(state.text.clone()),
            ControlKind::NativeSelect => {
                let selected: Vec<String> = state
                    .entries
                    .iter()
                    .flat_map(NativeEntry::options)
                    .filter(|o| o.selected)
                    .map(|o| o.value.clone())
                    .collect();
                if selected.is_empty() {
                    ControlValue::None
                } else {
                    ControlValue::Many(selected)
                }
            }
        }
    }

    /// The raw text of a text field (empty for selection lists).
    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    /// Set the live selected flags: exactly the options whose value is in
    /// `values`. No-op for text fields.
    pub fn set_selected_values(&self, values: &[String]) {
        if self.kind != ControlKind::NativeSelect {
            return;
        }
        let mut state = self.state.lock();
        for entry in &mut state.entries {
            for option in entry.options_mut() {
                option.selected = values.contains(&option.value);
            }
        }
    }

    /// Set a text field's contents. No-op for selection lists.
    pub fn set_text(&self, text: impl Into<String>) {
        if self.kind == ControlKind::TextInput {
            self.state.lock().text = text.into();
        }
    }

    /// Restore the markup defaults, as a native form reset does.
    pub fn restore_defaults(&self) {
        let mut state = self.state.lock();
        for entry in &mut state.entries {
            for option in entry.options_mut() {
                option.selected = option.default_selected;
            }
        }
        state.text = state.default_text.clone();
    }

    /// Report a change: emits [`Control::value_changed`] and the owning
    /// form's `changed` signal.
    pub fn notify_changed(&self) {
        let value = self.value();
        tracing::trace!(target: targets::SYNC, control = %self.name, ?value, "control value changed");
        self.value_changed.emit(value);
        if let Some(form) = self.form() {
            form.changed.emit(self.name.clone());
        }
    }

    /// The form this control belongs to, if it is still alive.
    pub fn form(&self) -> Option<Arc<Form>> {
        self.form.lock().upgrade()
    }
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

fn set_attribute(attributes: &mut Vec<(String, String)>, name: String, value: String) {
    match attributes
        .iter_mut()
        .find(|(n, _)| n.eq_ignore_ascii_case(&name))
    {
        Some(slot) => slot.1 = value,
        None => attributes.push((name, value)),
    }
}

// ============================================================================
// Form
// ============================================================================

/// A group of controls with form-level notifications.
pub struct Form {
    controls: Mutex<Vec<ControlHandle>>,

    /// Emitted after a reset has restored every control's defaults.
    pub reset_triggered: Signal<()>,
    /// Emitted when the form is submitted.
    pub submitted: Signal<()>,
    /// Emitted with a control's name when that control reports a change.
    pub changed: Signal<String>,
    /// Emitted when the host's validation marks the form invalid.
    pub invalid: Signal<()>,
}

impl Form {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            controls: Mutex::new(Vec::new()),
            reset_triggered: Signal::new(),
            submitted: Signal::new(),
            changed: Signal::new(),
            invalid: Signal::new(),
        })
    }

    /// Add a control to this form.
    pub fn add_control(self: &Arc<Self>, control: &ControlHandle) {
        *control.form.lock() = Arc::downgrade(self);
        self.controls.lock().push(control.clone());
    }

    /// Every control, in insertion order.
    pub fn controls(&self) -> Vec<ControlHandle> {
        self.controls.lock().clone()
    }

    /// The first control with this name.
    pub fn control(&self, name: &str) -> Option<ControlHandle> {
        self.controls
            .lock()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    /// The current value of the named control.
    pub fn value_of(&self, name: &str) -> Option<ControlValue> {
        self.control(name).map(|c| c.value())
    }

    /// Reset the form: restore every control's defaults, then notify
    /// listeners.
    pub fn reset(&self) {
        for control in self.controls() {
            control.restore_defaults();
        }
        self.reset_triggered.emit(());
    }

    pub fn submit(&self) {
        self.submitted.emit(());
    }

    /// Report that validation failed for this form.
    pub fn mark_invalid(&self) {
        self.invalid.emit(());
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("controls", &self.controls.lock().len())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Control: Send, Sync);
static_assertions::assert_impl_all!(Form: Send, Sync);
