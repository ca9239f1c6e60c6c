use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::db::BuildSummary;
use crate::model::{BuildId, BuildRecord, Gadget};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for gadget cache operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// A stored row cannot be turned back into gadget data.
    #[error("Corrupt cache row: {0}")]
    Corrupt(String),
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed cache of imported gadget builds.
///
/// Clones share one connection. Access is serialized behind a mutex so the
/// cache can be read from several resolution calls at once; no network work
/// ever happens while the lock is held.
#[derive(Debug, Clone)]
pub struct GadgetCache {
    conn: Arc<Mutex<Connection>>,
}

impl GadgetCache {
    /// Open (or create) a cache database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory cache.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        apply_migrations(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the schema version recorded in the database.
    pub fn schema_version(&self) -> DbResult<i32> {
        current_schema_version(&self.lock())
    }

    /// Insert a build and its gadgets, replacing any previous copy of the same build.
    pub fn insert_build(&self, record: &BuildRecord) -> DbResult<()> {
        let conn = self.lock();
        let tx = conn.unchecked_transaction()?;
        let id = record.build_id.as_str();

        delete_build_rows(&tx, id)?;
        tx.execute(
            r#"
            INSERT INTO builds (build_id, name, imported_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![id, record.name, Utc::now().to_rfc3339()],
        )?;

        {
            let mut gadget_stmt = tx.prepare(
                r#"
                INSERT INTO gadgets (build_id, idx, address, effect)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            let mut constraint_stmt = tx.prepare(
                r#"
                INSERT INTO gadget_constraints (build_id, gadget_idx, idx, text)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for (g_idx, gadget) in record.gadgets.iter().enumerate() {
                gadget_stmt.execute(params![
                    id,
                    g_idx as i64,
                    gadget.offset() as i64,
                    gadget.effect()
                ])?;
                for (c_idx, text) in gadget.constraints().iter().enumerate() {
                    constraint_stmt.execute(params![id, g_idx as i64, c_idx as i64, text])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Load a build with its gadgets in stored order, if present.
    pub fn load_build(&self, build_id: &BuildId) -> DbResult<Option<BuildRecord>> {
        let conn = self.lock();
        let id = build_id.as_str();

        let name: Option<Option<String>> = conn
            .query_row("SELECT name FROM builds WHERE build_id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(name) = name else {
            return Ok(None);
        };

        // (address, effect) per gadget index.
        let mut rows = Vec::new();
        {
            let mut stmt = conn.prepare(
                r#"
                SELECT address, effect FROM gadgets
                WHERE build_id = ?1
                ORDER BY idx
                "#,
            )?;
            let mapped = stmt.query_map(params![id], |row| {
                Ok((row.get::<_, i64>(0)? as u64, row.get::<_, Option<String>>(1)?))
            })?;
            for r in mapped {
                rows.push(r?);
            }
        }

        let mut constraints: Vec<Vec<String>> = vec![Vec::new(); rows.len()];
        {
            let mut stmt = conn.prepare(
                r#"
                SELECT gadget_idx, text FROM gadget_constraints
                WHERE build_id = ?1
                ORDER BY gadget_idx, idx
                "#,
            )?;
            let mapped = stmt.query_map(params![id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;
            for r in mapped {
                let (g_idx, text) = r?;
                let slot = usize::try_from(g_idx)
                    .ok()
                    .and_then(|i| constraints.get_mut(i))
                    .ok_or_else(|| {
                        DbError::Corrupt(format!(
                            "constraint for missing gadget {g_idx} in build {id}"
                        ))
                    })?;
                slot.push(text);
            }
        }

        let gadgets = rows
            .into_iter()
            .zip(constraints)
            .map(|((address, effect), cs)| {
                let gadget = Gadget::new(address, cs);
                match effect {
                    Some(e) => gadget.with_effect(e),
                    None => gadget,
                }
            })
            .collect();

        Ok(Some(BuildRecord::new(build_id.clone(), gadgets).with_name(name)))
    }

    /// List all cached builds (ordered by build id).
    pub fn list_builds(&self) -> DbResult<Vec<BuildSummary>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT b.build_id, b.name, b.imported_at,
                   (SELECT COUNT(*) FROM gadgets g WHERE g.build_id = b.build_id)
            FROM builds b
            ORDER BY b.build_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (raw_id, name, imported_at, count) = row?;
            let build_id = BuildId::parse(&raw_id).map_err(|e| DbError::Corrupt(e.to_string()))?;
            out.push(BuildSummary {
                build_id,
                name,
                gadget_count: count.max(0) as usize,
                imported_at,
            });
        }
        Ok(out)
    }

    /// Remove a build. Returns whether anything was deleted.
    pub fn remove_build(&self, build_id: &BuildId) -> DbResult<bool> {
        let conn = self.lock();
        let tx = conn.unchecked_transaction()?;
        let removed = delete_build_rows(&tx, build_id.as_str())?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

fn delete_build_rows(conn: &Connection, id: &str) -> DbResult<usize> {
    conn.execute("DELETE FROM gadget_constraints WHERE build_id = ?1", params![id])?;
    conn.execute("DELETE FROM gadgets WHERE build_id = ?1", params![id])?;
    Ok(conn.execute("DELETE FROM builds WHERE build_id = ?1", params![id])?)
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (builds, gadgets, gadget_constraints)
/// - 2: add effect column to gadgets
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS builds (
                build_id    TEXT PRIMARY KEY,
                name        TEXT,
                imported_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS gadgets (
                build_id TEXT NOT NULL,
                idx      INTEGER NOT NULL,
                address  INTEGER NOT NULL,
                PRIMARY KEY(build_id, idx)
            );

            CREATE TABLE IF NOT EXISTS gadget_constraints (
                build_id   TEXT NOT NULL,
                gadget_idx INTEGER NOT NULL,
                idx        INTEGER NOT NULL,
                text       TEXT NOT NULL,
                PRIMARY KEY(build_id, gadget_idx, idx)
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        if !column_exists(conn, "gadgets", "effect")? {
            conn.execute("ALTER TABLE gadgets ADD COLUMN effect TEXT;", [])?;
        }
        conn.execute("PRAGMA user_version = 2;", [])?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let pragma = format!("PRAGMA table_info({table});");
    let mut stmt = conn.prepare(&pragma)?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in rows {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
