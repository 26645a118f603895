//! Property-based invariant tests for selection state.
//!
//! Verifies structural guarantees of the widget under arbitrary operation
//! sequences:
//!
//! 1. The selection never holds duplicates
//! 2. Every selected value is known and not originally disabled
//! 3. The selection never exceeds a positive maximum
//! 4. select_all followed by deselect_all always leaves the selection empty
//! 5. reset restores exactly the initial selection
//! 6. Clearing the search shows every row and never touches the selection
//! 7. The control's value always mirrors the selection

use std::sync::Arc;

use horizon_multiselect::prelude::*;
use proptest::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────

const OPTION_COUNT: usize = 6;
const DISABLED: usize = 5;

fn value(index: usize) -> String {
    if index < OPTION_COUNT {
        format!("opt{index}")
    } else {
        format!("unknown{index}")
    }
}

fn control(max: usize, preselected: &[usize]) -> ControlHandle {
    Control::native_select("Items")
        .with_attribute("data-max-selection", max.to_string())
        .with_entries(
            (0..OPTION_COUNT)
                .map(|i| {
                    NativeOption::new(value(i), format!("Option {i}"))
                        .with_default_selected(preselected.contains(&i))
                        .with_disabled(i == DISABLED)
                        .into()
                })
                .collect(),
        )
        .into_handle()
}

fn build_widget(max: usize, preselected: &[usize]) -> (ControlHandle, Arc<MultiSelect>) {
    let control = control(max, preselected);
    let widget = MultiSelect::builder(control.clone())
        .localization(LocalizationRegistry::new())
        .build();
    (control, widget)
}

#[derive(Debug, Clone)]
enum Op {
    Toggle(usize),
    SelectAll,
    DeselectAll,
    Set(Vec<usize>),
    Search(String),
    Reset,
    Close,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..OPTION_COUNT + 2).prop_map(Op::Toggle),
        1 => Just(Op::SelectAll),
        1 => Just(Op::DeselectAll),
        1 => prop::collection::vec(0..OPTION_COUNT + 2, 0..8).prop_map(Op::Set),
        2 => "[a-z0-9 ]{0,4}".prop_map(Op::Search),
        1 => Just(Op::Reset),
        1 => Just(Op::Close),
    ]
}

fn apply(widget: &MultiSelect, op: &Op) {
    match op {
        Op::Toggle(i) => {
            widget.toggle(&value(*i));
        }
        Op::SelectAll => {
            widget.select_all();
        }
        Op::DeselectAll => widget.deselect_all(),
        Op::Set(indices) => widget.set_selected_values(indices.iter().map(|i| value(*i))),
        Op::Search(query) => widget.set_search_query(query),
        Op::Reset => widget.reset(),
        Op::Close => {
            widget.close();
        }
    }
}

fn check_invariants(widget: &MultiSelect, control: &Control, max: usize) -> std::result::Result<(), TestCaseError> {
    let selected = widget.selected_values();
    let mut sorted = selected.clone();
    sorted.sort();
    sorted.dedup();
    prop_assert_eq!(sorted.len(), selected.len(), "duplicates in {:?}", selected);

    let model = widget.option_model();
    for v in &selected {
        prop_assert!(model.contains(v), "unknown value {} selected", v);
        prop_assert!(!model.is_disabled(v), "disabled value {} selected", v);
    }
    if max > 0 {
        prop_assert!(selected.len() <= max, "{} selected with max {}", selected.len(), max);
    }

    let mut expected: Vec<String> = (0..OPTION_COUNT).map(value).filter(|v| selected.contains(v)).collect();
    let actual = match control.value() {
        ControlValue::None => Vec::new(),
        ControlValue::Many(values) => values,
        ControlValue::Text(text) => vec![text],
    };
    expected.sort();
    let mut actual_sorted = actual.clone();
    actual_sorted.sort();
    prop_assert_eq!(actual_sorted, expected);
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3, 7. Structural invariants hold after every operation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn selection_invariants_hold(
        max in 0usize..5,
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let (control, widget) = build_widget(max, &[]);
        for op in &ops {
            apply(&widget, op);
            check_invariants(&widget, &control, max)?;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. select_all + deselect_all is always empty
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn select_all_then_deselect_all_is_empty(
        max in 0usize..5,
        ops in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let (_, widget) = build_widget(max, &[]);
        for op in &ops {
            apply(&widget, op);
        }
        widget.select_all();
        widget.deselect_all();
        prop_assert!(widget.selected_values().is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. reset restores the initial selection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reset_restores_initial(
        preselected in prop::collection::btree_set(0..DISABLED, 0..3),
        ops in prop::collection::vec(op_strategy(), 0..30),
    ) {
        let preselected: Vec<usize> = preselected.into_iter().collect();
        let (_, widget) = build_widget(0, &preselected);
        let initial = widget.selected_values();
        let expected: Vec<String> = preselected.iter().map(|i| value(*i)).collect();
        prop_assert_eq!(&initial, &expected);

        for op in &ops {
            apply(&widget, op);
        }
        widget.reset();
        prop_assert_eq!(widget.selected_values(), initial);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Clearing the search restores every row
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn empty_query_shows_everything(
        queries in prop::collection::vec("[a-z0-9 ]{0,4}", 1..6),
        picks in prop::collection::vec(0..DISABLED, 0..4),
    ) {
        let (_, widget) = build_widget(0, &[]);
        widget.set_selected_values(picks.iter().map(|i| value(*i)));
        let before = widget.selected_values();

        for query in &queries {
            widget.set_search_query(query);
            prop_assert_eq!(&widget.selected_values(), &before);
        }
        widget.set_search_query("");

        let tree = widget.element_tree().unwrap();
        let rows = tree.find_all(&|e| e.has_class("multiselect-option"));
        prop_assert_eq!(rows.len(), OPTION_COUNT);
        prop_assert!(rows.iter().all(|row| !row.is_hidden()));
        prop_assert_eq!(widget.selected_values(), before);
    }
}
