//! Loading language bundles from files and resolving widget texts with them.

use std::fs;

use horizon_multiselect::prelude::*;
use horizon_multiselect::Error;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn json_and_toml_bundles_register() {
    let dir = TempDir::new().unwrap();
    let json = write(
        &dir,
        "nl.json",
        r#"{ "placeholder": "Kies items...", "selectAllText": "Alles selecteren" }"#,
    );
    let toml = write(
        &dir,
        "pt.toml",
        "placeholder = \"Selecionar itens...\"\nnoResultsText = \"Nenhum resultado\"\n",
    );

    let mut registry = LocalizationRegistry::new();
    registry.register_language_file("nl", &json).unwrap();
    registry.register_language_file("pt-BR", &toml).unwrap();

    assert!(registry.has_language("nl"));
    assert!(registry.has_language("pt-br"));
    let nl = registry.language_bundle("nl-BE").unwrap();
    assert_eq!(nl.placeholder, "Kies items...");
    assert_eq!(nl.search_placeholder, "");
}

#[test]
fn partial_bundle_keeps_defaults_for_missing_texts() {
    let dir = TempDir::new().unwrap();
    let json = write(&dir, "nl.json", r#"{ "placeholder": "Kies items..." }"#);
    let mut registry = LocalizationRegistry::new();
    registry.register_language_file("nl", &json).unwrap();

    let control = Control::native_select("Tags")
        .with_attribute("data-lang", "nl")
        .with_entries(vec![NativeOption::new("a", "A").into()])
        .into_handle();
    let widget = MultiSelect::builder(control).localization(registry).build();
    let config = widget.config();
    assert_eq!(config.placeholder, "Kies items...");
    assert_eq!(config.search_placeholder, "Search...");
    assert_eq!(config.select_all_text, "Select All");
}

#[test]
fn current_language_applies_when_instance_names_none() {
    let mut registry = LocalizationRegistry::new();
    registry.set_current_language("es");
    let control = Control::native_select("Tags").into_handle();
    let widget = MultiSelect::builder(control).localization(registry).build();
    assert_eq!(widget.config().placeholder, "Seleccionar elementos...");
}

#[test]
fn bad_bundle_files_report_errors() {
    let dir = TempDir::new().unwrap();
    let mut registry = LocalizationRegistry::new();

    let broken = write(&dir, "broken.json", "{ not json");
    assert!(matches!(
        registry.register_language_file("xx", &broken),
        Err(Error::Json(_))
    ));

    let yaml = write(&dir, "bundle.yaml", "placeholder: nope");
    assert!(matches!(
        registry.register_language_file("xx", &yaml),
        Err(Error::UnsupportedFormat { .. })
    ));

    let missing = dir.path().join("missing.toml");
    let err = registry.register_language_file("xx", &missing).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("missing.toml"));
    assert!(!registry.has_language("xx"));
}
