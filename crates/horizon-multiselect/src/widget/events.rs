//! Input events a host forwards to a [`MultiSelect`](super::MultiSelect).
//!
//! The widget has no event loop of its own. A host translates its native
//! input (clicks, key presses, text input) into these values and passes them
//! to [`MultiSelect::handle_event`](super::MultiSelect::handle_event).

/// Keys the dropdown reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Other,
}

/// A user interaction with the dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiSelectEvent {
    /// The toggle button was activated.
    ToggleButtonClicked,
    /// The checkbox of the option with this value changed.
    OptionToggled(String),
    /// The select-all button was clicked.
    SelectAllClicked,
    /// The deselect-all button was clicked.
    DeselectAllClicked,
    /// The search input's text changed.
    SearchInput(String),
    /// A click landed outside the widget.
    OutsideClick,
    /// A key was pressed while the widget had focus.
    KeyPressed(Key),
    /// The next-page control was clicked.
    NextPageClicked,
    /// The previous-page control was clicked.
    PreviousPageClicked,
}

impl MultiSelectEvent {
    /// Whether this event originates inside the open menu.
    pub fn is_inside_menu(&self) -> bool {
        matches!(
            self,
            MultiSelectEvent::OptionToggled(_)
                | MultiSelectEvent::SelectAllClicked
                | MultiSelectEvent::DeselectAllClicked
                | MultiSelectEvent::SearchInput(_)
                | MultiSelectEvent::NextPageClicked
                | MultiSelectEvent::PreviousPageClicked
        )
    }
}
