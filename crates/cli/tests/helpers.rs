use std::path::PathBuf;

use one_gadget::{canonicalize_or_current, default_home_from, resolve_home, DEFAULT_HOME_DIR};
use tempfile::tempdir;

#[test]
fn explicit_home_is_canonicalized_when_it_exists() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path().to_string_lossy().to_string();

    let resolved = resolve_home(Some(&home)).expect("resolve home");
    assert_eq!(resolved, tmp.path().canonicalize().expect("canon tmp"));
}

#[test]
fn missing_absolute_home_is_kept_as_is() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("not-yet-created");

    let resolved = canonicalize_or_current(&missing.to_string_lossy()).expect("resolve");
    assert_eq!(resolved, missing);
}

#[test]
fn missing_relative_home_is_joined_to_cwd() {
    let resolved = canonicalize_or_current("surely-missing-home-dir").expect("resolve");
    assert!(resolved.is_absolute());
    assert!(resolved.ends_with("surely-missing-home-dir"));
}

#[test]
fn default_home_lives_under_user_home() {
    let home = default_home_from(Some(PathBuf::from("/home/alice"))).expect("default");
    assert_eq!(home, PathBuf::from("/home/alice").join(DEFAULT_HOME_DIR));
}

#[test]
fn default_home_errors_without_user_home() {
    let err = default_home_from(None).unwrap_err();
    assert!(err.to_string().contains("Failed to determine home directory"), "unexpected: {err}");
    assert!(default_home_from(Some(PathBuf::new())).is_err());
}

#[test]
fn implicit_home_is_under_the_user_home_directory() {
    if let Some(user_home) = dirs::home_dir() {
        assert_eq!(resolve_home(None).expect("resolve home"), user_home.join(DEFAULT_HOME_DIR));
    }
}
