//! Writing the selection back onto the bound control.

use serde_json::Value;

use horizon_multiselect_core::logging::targets;

use super::control::{Control, ControlKind};

/// Mirror `selection` onto `control` and report the change.
///
/// A selection list gets exactly the selected options flagged (value `None`
/// when empty). A text field gets a compact JSON array, or `""` when empty.
/// The control's `value_changed` signal fires before this returns.
pub fn synchronize(control: &Control, selection: &[String]) {
    match control.kind() {
        ControlKind::NativeSelect => control.set_selected_values(selection),
        ControlKind::TextInput => control.set_text(encode_text_value(selection)),
    }
    tracing::debug!(target: targets::SYNC, control = control.name(), count = selection.len(), "synchronized control value");
    control.notify_changed();
}

/// Text-field encoding of a selection.
pub fn encode_text_value(selection: &[String]) -> String {
    if selection.is_empty() {
        return String::new();
    }
    serde_json::to_string(selection).unwrap_or_default()
}

/// Parse a text field's stored selection.
///
/// Anything other than a JSON array means "no prior selection". Numbers and
/// booleans inside the array are stringified; nested values are skipped.
pub fn decode_text_value(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        Ok(other) => {
            tracing::debug!(target: targets::SYNC, value = %other, "stored value is not an array, ignoring");
            Vec::new()
        }
        Err(err) => {
            tracing::debug!(target: targets::SYNC, error = %err, "stored value is not valid JSON, ignoring");
            Vec::new()
        }
    }
}
