// crates/core/tests/gadget_cache.rs

use gadget_core::db::{DbError, GadgetCache, HomeLayout, CURRENT_SCHEMA_VERSION};
use gadget_core::model::{BuildId, BuildRecord, Gadget};
use gadget_core::services::GadgetSource;
use rusqlite::Connection;
use tempfile::tempdir;

const ID: &str = "60131540dadc6796cab33388349e6e4e68692053";

fn libc_227() -> BuildRecord {
    BuildRecord::new(
        BuildId::parse(ID).unwrap(),
        vec![
            Gadget::new(0x4f2c5, ["rsp & 0xf == 0", "rcx == NULL"])
                .with_effect("execve(\"/bin/sh\", rsp+0x40, environ)"),
            Gadget::new(0x4f322, ["[rsp+0x40] == NULL"]),
            Gadget::new(0x10a38c, Vec::<String>::new()),
        ],
    )
    .with_name(Some("libc-2.27".into()))
}

#[test]
fn cache_initializes_and_round_trips_builds() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("gadgets.db");

    // First open should create schema and allow inserts.
    {
        let cache = GadgetCache::open(&db_path).expect("open cache");
        assert_eq!(cache.schema_version().expect("schema version"), CURRENT_SCHEMA_VERSION);

        cache.insert_build(&libc_227()).expect("insert build");
        let loaded = cache.load_build(&libc_227().build_id).expect("load").expect("present");
        assert_eq!(loaded, libc_227());
    }

    // Second open should see existing schema and data.
    {
        let cache = GadgetCache::open(&db_path).expect("re-open cache");
        let builds = cache.list_builds().expect("list builds");
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].build_id.as_str(), ID);
        assert_eq!(builds[0].name.as_deref(), Some("libc-2.27"));
        assert_eq!(builds[0].gadget_count, 3);
        assert!(!builds[0].imported_at.is_empty());
    }
}

#[test]
fn reinserting_a_build_replaces_its_gadgets() {
    let cache = GadgetCache::open_in_memory().expect("cache");
    cache.insert_build(&libc_227()).unwrap();

    let smaller = BuildRecord::new(libc_227().build_id, vec![Gadget::new(0x1, ["only"])]);
    cache.insert_build(&smaller).unwrap();

    let loaded = cache.load_build(&smaller.build_id).unwrap().unwrap();
    assert_eq!(loaded.gadgets, smaller.gadgets);
    assert_eq!(loaded.name, None);
    assert_eq!(cache.list_builds().unwrap().len(), 1);
}

#[test]
fn missing_build_is_absent_not_an_error() {
    let cache = GadgetCache::open_in_memory().expect("cache");
    let id = BuildId::parse(ID).unwrap();
    assert!(cache.load_build(&id).unwrap().is_none());
    assert!(cache.lookup_build_id(&id).unwrap().is_none());
}

#[test]
fn remove_build_reports_whether_anything_was_deleted() {
    let cache = GadgetCache::open_in_memory().expect("cache");
    let id = libc_227().build_id;
    cache.insert_build(&libc_227()).unwrap();

    assert!(cache.remove_build(&id).unwrap());
    assert!(!cache.remove_build(&id).unwrap());
    assert!(cache.load_build(&id).unwrap().is_none());
}

#[test]
fn cache_source_is_local_and_returns_stored_order() {
    let cache = GadgetCache::open_in_memory().expect("cache");
    cache.insert_build(&libc_227()).unwrap();

    assert_eq!(cache.locality(), gadget_core::services::Locality::Local);
    let set = cache.lookup_build_id(&libc_227().build_id).unwrap().unwrap();
    let offsets: Vec<u64> = set.iter().map(Gadget::offset).collect();
    assert_eq!(offsets, vec![0x4f2c5, 0x4f322, 0x10a38c]);
}

#[test]
fn cache_open_errors_on_unsupported_schema_version() {
    // Arrange: DB with an unsupported user_version.
    let tmp = tempdir().expect("temp dir");
    let layout = HomeLayout::new(tmp.path());
    {
        let conn = Connection::open(&layout.cache_db_path).expect("open raw sqlite db");
        conn.pragma_update(None, "user_version", 99_i32).expect("set user_version pragma");
    }

    // Act: attempt to open via GadgetCache::open.
    match GadgetCache::open(&layout.cache_db_path) {
        Err(DbError::UnsupportedSchemaVersion { found, min_supported, max_supported }) => {
            assert_eq!(found, 99, "unexpected found schema version");
            assert_eq!(min_supported, 0, "unexpected min_supported schema version");
            assert_eq!(max_supported, CURRENT_SCHEMA_VERSION);
        }
        Err(err) => panic!("expected UnsupportedSchemaVersion error, got different DbError: {err}"),
        Ok(_) => panic!("expected UnsupportedSchemaVersion error, got Ok(_)"),
    }
}

#[test]
fn version_one_schema_is_migrated_in_place() {
    let tmp = tempdir().expect("temp dir");
    let db_path = tmp.path().join("gadgets.db");
    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE builds (build_id TEXT PRIMARY KEY, name TEXT, imported_at TEXT NOT NULL);
            CREATE TABLE gadgets (
                build_id TEXT NOT NULL, idx INTEGER NOT NULL, address INTEGER NOT NULL,
                PRIMARY KEY(build_id, idx)
            );
            CREATE TABLE gadget_constraints (
                build_id TEXT NOT NULL, gadget_idx INTEGER NOT NULL, idx INTEGER NOT NULL,
                text TEXT NOT NULL, PRIMARY KEY(build_id, gadget_idx, idx)
            );
            INSERT INTO builds VALUES ('60131540dadc6796cab33388349e6e4e68692053', NULL, 'then');
            INSERT INTO gadgets VALUES ('60131540dadc6796cab33388349e6e4e68692053', 0, 4096);
            INSERT INTO gadget_constraints
                VALUES ('60131540dadc6796cab33388349e6e4e68692053', 0, 0, 'rax == NULL');
            PRAGMA user_version = 1;
            "#,
        )
        .unwrap();
    }

    let cache = GadgetCache::open(&db_path).expect("migrate");
    assert_eq!(cache.schema_version().unwrap(), 2);
    let record = cache.load_build(&BuildId::parse(ID).unwrap()).unwrap().unwrap();
    assert_eq!(record.gadgets, vec![Gadget::new(4096, ["rax == NULL"])]);
}

#[test]
fn cache_is_shareable_across_threads() {
    let cache = GadgetCache::open_in_memory().expect("cache");
    cache.insert_build(&libc_227()).unwrap();
    let id = libc_227().build_id;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            let id = id.clone();
            std::thread::spawn(move || cache.lookup_build_id(&id).unwrap().unwrap().len())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 3);
    }
}
