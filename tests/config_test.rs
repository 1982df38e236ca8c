//! Layered settings: defaults and local TOML overrides

use std::io::Write;

use tempfile::NamedTempFile;

use tabtree::Settings;

#[test]
fn given_no_config_files_when_loading_then_defaults_apply() {
    let missing = std::path::Path::new("does-not-exist-tabtree.toml");
    let settings = Settings::load(Some(missing)).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_toml_when_loading_then_specified_fields_override_defaults() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "amount_column = 4").unwrap();
    writeln!(file, "formula_column = \"E\"").unwrap();
    file.flush().unwrap();

    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.amount_column, 4);
    assert_eq!(settings.formula_column, "E");
    // Unspecified fields keep their defaults
    assert_eq!(settings.start_column, 1);
    assert_eq!(settings.max_levels, 9);
    assert_eq!(settings.delimiter, " > ");
}

#[test]
fn given_delimiter_override_when_loading_then_it_is_used() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "delimiter = \" / \"").unwrap();
    file.flush().unwrap();

    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.delimiter, " / ");
}
