//! Local SQLite store for component records.
//!
//! Components are persisted in their compact form, one row per record keyed
//! by id. Saving mirrors the caller's in-memory collection:
//! - Present records are inserted or updated; removed ids are deleted.
//! - `created_at` is set once on first insert, never changed.
//! - `modified_at` only advances when the stored body actually changed.
//! - An explicit schema version lives in `schema_meta`, so older snapshots
//!   are recognized without shape-sniffing individual rows.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::codec::compact;
use crate::error::Result;
use crate::migrate::normalize_loaded;
use crate::models::Component;

/// Current layout of the `components` table body (compact single-letter
/// form with cell lists). Version 1 snapshots may carry scalar cell ids;
/// they are normalized on load.
const SCHEMA_VERSION: i64 = 2;

/// Statistics from a save operation
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SaveStats {
    /// Number of records inserted or updated
    pub upserted: usize,
    /// Number of rows removed because their id was no longer present
    pub deleted: usize,
}

/// Returns the default path of the component database file.
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parts_inventory")
        .join("components.db")
}

/// Returns the current timestamp as RFC 3339.
fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Handle to the component database.
pub struct ComponentStore {
    conn: Connection,
}

impl ComponentStore {
    /// Opens (or creates) the store at the default platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(default_db_path())
    }

    /// Opens (or creates) the store at an explicit path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        log::info!("Component store: {}", path.display());
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(ComponentStore { conn })
    }

    /// In-memory store, used in tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(ComponentStore { conn })
    }

    /// Saves the full component collection, mirroring it into the store.
    ///
    /// Records are compacted and upserted; rows whose id is absent from
    /// `components` are deleted. All writes happen in one transaction.
    pub fn save_components(&mut self, components: &[Component]) -> Result<SaveStats> {
        self.save_components_at(components, &now_timestamp())
    }

    /// Inner save that accepts an explicit timestamp, used in tests.
    fn save_components_at(&mut self, components: &[Component], now: &str) -> Result<SaveStats> {
        log::debug!("Saving {} components ({})", components.len(), now);
        let tx = self.conn.transaction()?;
        let mut stats = SaveStats::default();

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO components (id, body, created_at, modified_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                     body = excluded.body,
                     modified_at = CASE
                         WHEN components.body = excluded.body THEN components.modified_at
                         ELSE excluded.modified_at
                     END
                     -- created_at is intentionally excluded: preserved from the original INSERT",
            )?;

            for component in components {
                let body = serde_json::to_string(&compact(component))?;
                stmt.execute(params![component.id, body, now])?;
                stats.upserted += 1;
            }
        }

        // Remove rows whose id is no longer part of the collection.
        let kept_ids: HashSet<&str> = components.iter().map(|c| c.id.as_str()).collect();
        let db_ids: Vec<String> = tx
            .prepare("SELECT id FROM components")?
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for id in &db_ids {
            if !kept_ids.contains(id.as_str()) {
                tx.execute("DELETE FROM components WHERE id = ?1", params![id])?;
                stats.deleted += 1;
            }
        }

        tx.commit()?;
        if stats.deleted > 0 {
            log::info!(
                "Component store save: {} upserted, {} deleted",
                stats.upserted,
                stats.deleted
            );
        } else {
            log::debug!("Component store save: {} upserted", stats.upserted);
        }
        Ok(stats)
    }

    /// Loads every component, normalized to the expanded form.
    ///
    /// Unreadable rows are skipped with a warning rather than failing the
    /// whole load.
    pub fn load_components(&self) -> Result<Vec<Component>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, body FROM components ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut components = Vec::new();
        for row in rows {
            let (id, body) = row?;
            let value = match serde_json::from_str(&body) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Skipping unreadable component row '{}': {}", id, e);
                    continue;
                }
            };
            let component = normalize_loaded(value);
            if component.id.is_empty() {
                log::warn!("Skipping component row '{}' that decoded to an empty id", id);
                continue;
            }
            components.push(component);
        }
        log::debug!("Loaded {} components", components.len());
        Ok(components)
    }

    /// Returns the schema version recorded in the store.
    pub fn schema_version(&self) -> Result<i64> {
        let version: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM schema_meta WHERE key = 'version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version.and_then(|v| v.parse().ok()).unwrap_or(0))
    }
}

/// Creates the tables if they do not already exist and records the schema
/// version, upgrading the marker when an older snapshot is opened.
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS components (
            id          TEXT NOT NULL PRIMARY KEY,
            body        TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            modified_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schema_meta (
            key   TEXT NOT NULL PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    let recorded: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_meta WHERE key = 'version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match recorded.and_then(|v| v.parse::<i64>().ok()) {
        None => {
            conn.execute(
                "INSERT INTO schema_meta (key, value) VALUES ('version', ?1)",
                params![SCHEMA_VERSION.to_string()],
            )?;
        }
        Some(version) if version < SCHEMA_VERSION => {
            log::info!(
                "Component store schema v{} found, upgrading marker to v{} (rows normalize on load)",
                version,
                SCHEMA_VERSION
            );
            conn.execute(
                "UPDATE schema_meta SET value = ?1 WHERE key = 'version'",
                params![SCHEMA_VERSION.to_string()],
            )?;
        }
        Some(version) if version > SCHEMA_VERSION => {
            log::warn!(
                "Component store schema v{} is newer than supported v{}",
                version,
                SCHEMA_VERSION
            );
        }
        Some(_) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StorageInfo;
    use serde_json::json;

    fn test_store() -> ComponentStore {
        ComponentStore::open_in_memory().unwrap()
    }

    fn make_component(id: &str, name: &str, quantity: u32) -> Component {
        Component {
            id: id.to_string(),
            name: name.to_string(),
            category: "Resistor".to_string(),
            quantity,
            ..Default::default()
        }
    }

    fn get_row(store: &ComponentStore, id: &str) -> Option<(String, String, String)> {
        store
            .conn
            .query_row(
                "SELECT body, created_at, modified_at FROM components WHERE id = ?1",
                params![id],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .ok()
    }

    fn count_rows(store: &ComponentStore) -> i64 {
        store
            .conn
            .query_row("SELECT COUNT(*) FROM components", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn schema_creates_tables_and_version() {
        let store = test_store();
        assert_eq!(count_rows(&store), 0);
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn save_inserts_new_components() {
        let mut store = test_store();
        let components = vec![make_component("1", "R1", 4), make_component("2", "R2", 2)];
        let stats = store
            .save_components_at(&components, "2026-01-01T00:00:00+00:00")
            .unwrap();
        assert_eq!(stats, SaveStats { upserted: 2, deleted: 0 });
        assert_eq!(count_rows(&store), 2);
    }

    #[test]
    fn rows_store_compact_bodies() {
        let mut store = test_store();
        store
            .save_components_at(
                &[make_component("1", "R1", 0)],
                "2026-01-01T00:00:00+00:00",
            )
            .unwrap();
        let (body, _, _) = get_row(&store, "1").unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["n"], "R1");
        assert!(value.get("name").is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut store = test_store();
        let mut component = make_component("1", "ATmega328P", 12);
        component.storage_info = StorageInfo {
            location_id: "locA".to_string(),
            drawer_id: "drw1".to_string(),
            cells: vec!["A1".to_string()],
        };
        component.extra.insert("Voltage".to_string(), json!("5V"));

        store.save_components(&[component.clone()]).unwrap();
        let loaded = store.load_components().unwrap();
        assert_eq!(loaded, vec![component]);
    }

    #[test]
    fn save_preserves_created_at_on_update() {
        let mut store = test_store();
        let components = vec![make_component("1", "R1", 4)];
        store
            .save_components_at(&components, "2026-01-01T00:00:00+00:00")
            .unwrap();

        let updated = vec![make_component("1", "R1 new", 4)];
        store
            .save_components_at(&updated, "2026-01-02T00:00:00+00:00")
            .unwrap();

        let (_, created, modified) = get_row(&store, "1").unwrap();
        assert_eq!(created, "2026-01-01T00:00:00+00:00");
        assert_eq!(modified, "2026-01-02T00:00:00+00:00");
    }

    #[test]
    fn save_keeps_modified_at_when_body_unchanged() {
        let mut store = test_store();
        let components = vec![make_component("1", "R1", 4)];
        store
            .save_components_at(&components, "2026-01-01T00:00:00+00:00")
            .unwrap();
        store
            .save_components_at(&components, "2026-01-05T00:00:00+00:00")
            .unwrap();

        let (_, _, modified) = get_row(&store, "1").unwrap();
        assert_eq!(modified, "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn save_deletes_removed_ids() {
        let mut store = test_store();
        let components = vec![make_component("1", "R1", 4), make_component("2", "R2", 2)];
        store.save_components(&components).unwrap();

        let remaining = vec![make_component("1", "R1", 4)];
        let stats = store.save_components(&remaining).unwrap();
        assert_eq!(stats.deleted, 1);
        assert_eq!(count_rows(&store), 1);
        assert!(get_row(&store, "2").is_none());
    }

    #[test]
    fn load_skips_unreadable_rows() {
        let mut store = test_store();
        store.save_components(&[make_component("1", "R1", 4)]).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO components (id, body, created_at, modified_at)
                 VALUES ('bad', 'not json', '', '')",
                [],
            )
            .unwrap();

        let loaded = store.load_components().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "1");
    }

    #[test]
    fn load_normalizes_legacy_scalar_cells() {
        let store = test_store();
        store
            .conn
            .execute(
                "INSERT INTO components (id, body, created_at, modified_at)
                 VALUES ('1', ?1, '', '')",
                params![r#"{"i":"1","n":"R1","c":"Resistor","l":{"i":"locA","w":"drw1","e":"A1"}}"#],
            )
            .unwrap();

        let loaded = store.load_components().unwrap();
        assert_eq!(loaded[0].storage_info.cells, vec!["A1".to_string()]);
    }

    #[test]
    fn load_accepts_legacy_verbose_rows() {
        let store = test_store();
        store
            .conn
            .execute(
                "INSERT INTO components (id, body, created_at, modified_at)
                 VALUES ('1', ?1, '', '')",
                params![
                    r#"{"id":"1","name":"R1","category":"Resistor","locationInfo":{"locationId":"shelf","details":""}}"#
                ],
            )
            .unwrap();

        let loaded = store.load_components().unwrap();
        assert_eq!(loaded[0].location_info.location_id, "shelf");
    }

    #[test]
    fn old_version_marker_is_upgraded() {
        let store = test_store();
        store
            .conn
            .execute(
                "UPDATE schema_meta SET value = '1' WHERE key = 'version'",
                [],
            )
            .unwrap();
        init_schema(&store.conn).unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn empty_save_clears_store() {
        let mut store = test_store();
        store.save_components(&[make_component("1", "R1", 4)]).unwrap();
        let stats = store.save_components(&[]).unwrap();
        assert_eq!(stats, SaveStats { upserted: 0, deleted: 1 });
        assert_eq!(count_rows(&store), 0);
    }
}
