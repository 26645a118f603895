//! End-to-end scenarios for the dropdown widget.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_multiselect::prelude::*;
use horizon_multiselect::widget::ORIGINAL_DISABLED_ATTR;
use parking_lot::Mutex;

fn localization() -> LocalizationRegistry {
    LocalizationRegistry::new()
}

fn attach(control: &ControlHandle, overrides: ConfigOverrides) -> Arc<MultiSelect> {
    MultiSelect::builder(control.clone())
        .overrides(overrides)
        .localization(localization())
        .build()
}

fn five_options(max: &str) -> ControlHandle {
    Control::native_select("Items")
        .with_attribute("data-max-selection", max)
        .with_entries(
            (1..=5)
                .map(|n| NativeOption::new(format!("opt{n}"), format!("Option {n}")).into())
                .collect(),
        )
        .into_handle()
}

#[test]
fn capacity_rejects_fourth_toggle_and_disables_rest() {
    let control = five_options("3");
    let widget = attach(&control, ConfigOverrides::new());
    let warnings = Arc::new(AtomicUsize::new(0));
    let warnings_clone = warnings.clone();
    widget.capacity_warning.connect(move |_| {
        warnings_clone.fetch_add(1, Ordering::SeqCst);
    });

    for value in ["opt1", "opt2", "opt3"] {
        assert_eq!(widget.toggle(value), ToggleOutcome::Selected);
    }
    assert_eq!(widget.toggle("opt4"), ToggleOutcome::Rejected);
    assert_eq!(widget.selected_values(), vec!["opt1", "opt2", "opt3"]);
    assert_eq!(warnings.load(Ordering::SeqCst), 1);

    let tree = widget.element_tree().unwrap();
    let ids = widget.element_ids();
    for index in 3..5 {
        let checkbox = tree.find_by_id(&ids.checkbox(index)).unwrap();
        assert!(!checkbox.has_attr("checked"));
        assert!(checkbox.has_attr("disabled"));
        assert!(!checkbox.has_attr(ORIGINAL_DISABLED_ATTR));
    }
    for index in 0..3 {
        let checkbox = tree.find_by_id(&ids.checkbox(index)).unwrap();
        assert!(checkbox.has_attr("checked"));
        assert!(!checkbox.has_attr("disabled"));
    }
    let label = tree.find_by_id(&ids.label()).unwrap();
    assert_eq!(label.text(), "Option 1, Option 2, Option 3");
}

#[test]
fn reset_restores_markup_selection() {
    let control = Control::native_select("Langs")
        .with_entries(vec![
            NativeOption::new("en", "English").with_default_selected(true).into(),
            NativeOption::new("fr", "French").into(),
        ])
        .into_handle();
    let widget = attach(&control, ConfigOverrides::new());
    assert_eq!(widget.selected_values(), vec!["en"]);

    widget.set_selected_values(["fr"]);
    assert_eq!(widget.selected_values(), vec!["fr"]);

    widget.reset();
    assert_eq!(widget.selected_values(), vec!["en"]);
    assert_eq!(control.value(), ControlValue::Many(vec!["en".to_string()]));
}

#[test]
fn empty_native_selection_is_no_value() {
    let control = five_options("0");
    let rules = Arc::new(FieldRules::new());
    rules.add_rule("Items", Rule::Required);
    let widget = MultiSelect::builder(control.clone())
        .validation(rules.clone())
        .localization(localization())
        .build();

    widget.toggle("opt2");
    assert_eq!(rules.is_valid("Items"), Some(true));
    widget.deselect_all();
    assert_eq!(control.value(), ControlValue::None);
    assert_eq!(rules.is_valid("Items"), Some(false));
    assert_eq!(rules.failed_rules("Items"), vec!["required"]);
    assert_eq!(widget.validation_state(), Some(false));
}

#[test]
fn text_control_holds_compact_json() {
    let control = Control::text_input("Tags", "").into_handle();
    let widget = attach(
        &control,
        ConfigOverrides::new().with_data(vec![
            OptionEntry::from(OptionItem::new("a", "A")),
            OptionEntry::from(OptionItem::new("b", "B")),
        ]),
    );

    widget.set_selected_values(["a", "b"]);
    assert_eq!(control.text(), r#"["a","b"]"#);
    widget.deselect_all();
    assert_eq!(control.text(), "");
}

#[test]
fn text_control_initial_selection_from_stored_json() {
    let control = Control::text_input("Tags", r#"["b","zzz"]"#).into_handle();
    let widget = attach(
        &control,
        ConfigOverrides::new().with_data(vec![
            OptionEntry::from(OptionItem::new("a", "A")),
            OptionEntry::from(OptionItem::new("b", "B")),
        ]),
    );
    assert_eq!(widget.selected_values(), vec!["b"]);
    assert_eq!(control.text(), r#"["b"]"#);

    let broken = Control::text_input("Broken", "{not json").into_handle();
    let widget = attach(
        &broken,
        ConfigOverrides::new().with_data(vec![OptionEntry::from(OptionItem::new("a", "A"))]),
    );
    assert!(widget.selected_values().is_empty());
    assert_eq!(broken.text(), "");
}

#[test]
fn selection_changed_carries_snapshot() {
    let control = five_options("0");
    let widget = attach(&control, ConfigOverrides::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    widget.selection_changed.connect(move |values| seen_clone.lock().push(values.clone()));

    widget.toggle("opt3");
    widget.toggle("opt1");
    widget.toggle("opt3");
    widget.deselect_all();

    assert_eq!(
        *seen.lock(),
        vec![
            vec!["opt3".to_string()],
            vec!["opt3".to_string(), "opt1".to_string()],
            vec!["opt1".to_string()],
            vec![],
        ]
    );
}

#[test]
fn control_value_is_synced_before_notification() {
    let control = five_options("0");
    let widget = attach(&control, ConfigOverrides::new());
    let observed = Arc::new(Mutex::new(None));
    let observed_clone = observed.clone();
    let control_clone = control.clone();
    widget.selection_changed.connect(move |_| {
        *observed_clone.lock() = Some(control_clone.value());
    });

    widget.toggle("opt5");
    assert_eq!(*observed.lock(), Some(ControlValue::Many(vec!["opt5".to_string()])));
}

#[test]
fn filter_hides_rows_but_keeps_selection() {
    let control = Control::native_select("Fruit")
        .with_entries(vec![
            NativeEntry::group(
                "Red",
                vec![NativeOption::new("apple", "Apple"), NativeOption::new("cherry", "Cherry")],
            ),
            NativeEntry::group("Yellow", vec![NativeOption::new("banana", "Banana")]),
        ])
        .into_handle();
    let widget = attach(&control, ConfigOverrides::new());
    widget.toggle("cherry");

    widget.set_search_query("  BAN ");
    let tree = widget.element_tree().unwrap();
    let ids = widget.element_ids();
    let row_hidden = |index: usize| {
        let index = index.to_string();
        tree.find(&|e| e.has_class("multiselect-option") && e.attr("data-index") == Some(index.as_str()))
            .unwrap()
            .is_hidden()
    };
    assert!(row_hidden(0));
    assert!(row_hidden(1));
    assert!(!row_hidden(2));
    let groups = tree.find_all(&|e| e.has_class("multiselect-optgroup"));
    assert!(groups[0].is_hidden());
    assert!(!groups[1].is_hidden());
    assert!(tree.find_by_id(&ids.no_results()).unwrap().is_hidden());
    assert_eq!(widget.selected_values(), vec!["cherry"]);

    widget.set_search_query("kiwi");
    let tree = widget.element_tree().unwrap();
    assert!(!tree.find_by_id(&ids.no_results()).unwrap().is_hidden());

    widget.set_search_query("");
    let tree = widget.element_tree().unwrap();
    assert!(tree.find_by_id(&ids.no_results()).unwrap().is_hidden());
    assert!(
        tree.find_all(&|e| e.has_class("multiselect-option"))
            .iter()
            .all(|row| !row.is_hidden())
    );
    assert_eq!(widget.selected_values(), vec!["cherry"]);
}

#[test]
fn originally_disabled_options_stay_disabled() {
    let control = Control::native_select("x")
        .with_attribute("data-max-selection", "1")
        .with_entries(vec![
            NativeOption::new("a", "A").into(),
            NativeOption::new("b", "B").with_disabled(true).into(),
        ])
        .into_handle();
    let widget = attach(&control, ConfigOverrides::new());
    let ids = widget.element_ids();

    widget.toggle("a");
    widget.toggle("a");
    let tree = widget.element_tree().unwrap();
    let disabled = tree.find_by_id(&ids.checkbox(1)).unwrap();
    assert!(disabled.has_attr("disabled"));
    assert!(disabled.has_attr(ORIGINAL_DISABLED_ATTR));

    widget.set_selected_values(["b"]);
    assert!(widget.selected_values().is_empty());
    assert_eq!(widget.select_all(), 1);
    assert_eq!(widget.selected_values(), vec!["a"]);
}

#[test]
fn localized_texts_follow_instance_language() {
    let control = five_options("0");
    let widget = attach(&control, ConfigOverrides::new().with_lang("fr-CA"));
    let config = widget.config();
    assert_eq!(config.placeholder, "Sélectionner des éléments...");
    assert_eq!(config.search_placeholder, "Rechercher...");

    let explicit = Control::native_select("y")
        .with_attribute("data-lang", "de")
        .with_attribute("data-placeholder", "Pick")
        .into_handle();
    let widget = attach(&explicit, ConfigOverrides::new());
    let config = widget.config();
    assert_eq!(config.placeholder, "Pick");
    assert_eq!(config.select_all_text, "Alle Auswählen");
}

#[test]
fn summary_switches_to_count_past_three() {
    let control = five_options("0");
    let widget = attach(&control, ConfigOverrides::new());
    widget.set_selected_values(["opt1", "opt2", "opt3", "opt4"]);
    let tree = widget.element_tree().unwrap();
    let ids = widget.element_ids();
    assert_eq!(tree.find_by_id(&ids.label()).unwrap().text(), "4 items selected");
    assert_eq!(tree.find_by_id(&ids.badge()).unwrap().text(), "4");
}
