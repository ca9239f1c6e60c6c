use gadget_core::db::HomeLayout;
use gadget_core::services::ResolveError;
use one_gadget::commands::{import_build_command, open_context, resolve_command, ResolveArgs};
use tempfile::tempdir;

const ID: &str = "60131540dadc6796cab33388349e6e4e68692053";

#[test]
fn open_context_errors_when_config_corrupt() {
    let temp = tempdir().unwrap();
    let layout = HomeLayout::new(temp.path());
    std::fs::write(&layout.config_path, "not-json").unwrap();

    let err = open_context(temp.path(), None).err().expect("corrupt config must fail");
    assert!(err.to_string().contains("Failed to parse resolver config JSON"), "unexpected: {err}");
}

#[test]
fn import_build_errors_when_file_missing() {
    let temp = tempdir().unwrap();
    let ctx = open_context(temp.path(), None).unwrap();
    let missing = temp.path().join("missing.json");

    let err = import_build_command(&ctx, &missing.to_string_lossy()).unwrap_err();
    assert!(err.to_string().contains("Build file does not exist"), "unexpected: {err}");
}

#[test]
fn import_build_errors_when_file_corrupt() {
    let temp = tempdir().unwrap();
    let ctx = open_context(temp.path(), None).unwrap();
    let path = temp.path().join(format!("libc-{ID}.json"));
    std::fs::write(&path, r#"{"build_id": "not-a-build-id", "gadgets": []}"#).unwrap();

    let err = import_build_command(&ctx, &path.to_string_lossy()).unwrap_err();
    assert!(err.to_string().contains("Failed to read build file"), "unexpected: {err}");
    assert!(ctx.cache.list_builds().unwrap().is_empty());
}

#[test]
fn resolve_without_target_is_missing_target() {
    let temp = tempdir().unwrap();
    let ctx = open_context(temp.path(), None).unwrap();

    let err = resolve_command(&ctx, &ResolveArgs::default()).unwrap_err();
    assert!(matches!(err.downcast_ref::<ResolveError>(), Some(ResolveError::MissingTarget)));
}

#[test]
fn resolve_rejects_malformed_build_id() {
    let temp = tempdir().unwrap();
    let ctx = open_context(temp.path(), None).unwrap();
    let args = ResolveArgs { build_id: Some("ABCDEF".into()), ..Default::default() };

    let err = resolve_command(&ctx, &args).unwrap_err();
    assert!(matches!(err.downcast_ref::<ResolveError>(), Some(ResolveError::InvalidBuildId(_))));
}

#[test]
fn resolve_not_found_names_the_key() {
    let temp = tempdir().unwrap();
    let ctx = open_context(temp.path(), None).unwrap();
    let args = ResolveArgs { target: Some(ID.into()), ..Default::default() };

    let err = resolve_command(&ctx, &args).unwrap_err();
    assert_eq!(err.to_string(), format!("No gadgets found for build id {ID}"));
}

#[test]
fn resolve_file_without_entry_is_not_found() {
    let temp = tempdir().unwrap();
    let ctx = open_context(temp.path(), None).unwrap();
    let lib = temp.path().join("libc.so.6");
    std::fs::write(&lib, b"\x7fELF but not really").unwrap();

    let args = ResolveArgs { file: Some(lib.to_string_lossy().into()), ..Default::default() };
    let err = resolve_command(&ctx, &args).unwrap_err();
    assert!(matches!(err.downcast_ref::<ResolveError>(), Some(ResolveError::NotFound(_))));
}
