use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::catalog::{CatalogStore, Upserted};
use crate::error::Result;
use crate::model::{CatalogEntry, ComparisonSummary, MessageSet};

use super::migrations::MIGRATIONS;

const ENTRY_COLUMNS: &str =
    "name, readings, timestamp, photo, messages, comparison_results, added_manually";

/// A database connection holding the IC catalog.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CatalogEntry> {
        let readings_json: String = row.get(1)?;
        let timestamp_str: String = row.get(2)?;
        let messages_json: Option<String> = row.get(4)?;
        let comparisons_json: String = row.get(5)?;

        let readings: Vec<f64> =
            serde_json::from_str(&readings_json).map_err(|e| conversion_error(1, e))?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(|e| conversion_error(2, e))?
            .with_timezone(&Utc);
        let name: String = row.get(0)?;

        // Unreadable history columns load as empty.
        let messages: Option<MessageSet> = messages_json.and_then(|json| {
            serde_json::from_str(&json)
                .map_err(|e| log::warn!("Ignoring stored messages for {name}: {e}"))
                .ok()
        });
        let comparison_results: Vec<ComparisonSummary> = serde_json::from_str(&comparisons_json)
            .unwrap_or_else(|e| {
                log::warn!("Ignoring stored comparison results for {name}: {e}");
                Vec::new()
            });

        Ok(CatalogEntry {
            name,
            readings,
            timestamp,
            photo: row.get(3)?,
            messages,
            comparison_results,
            added_manually: row.get(6)?,
        })
    }
}

fn conversion_error<E>(index: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

impl CatalogStore for Database {
    fn find_by_name(&self, name: &str) -> Result<Option<CatalogEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM catalog_entries WHERE name = ?1"),
                [name],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn upsert(&self, entry: &CatalogEntry) -> Result<Upserted> {
        entry.validate()?;

        let messages = entry
            .messages
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let readings = serde_json::to_string(&entry.readings)?;
        let comparisons = serde_json::to_string(&entry.comparison_results)?;

        let tx = self.conn.unchecked_transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM catalog_entries WHERE name = ?1)",
            [&entry.name],
            |row| row.get(0),
        )?;
        tx.execute(
            &format!(
                "INSERT INTO catalog_entries ({ENTRY_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(name) DO UPDATE SET
                    readings = excluded.readings,
                    timestamp = excluded.timestamp,
                    photo = excluded.photo,
                    messages = excluded.messages,
                    comparison_results = excluded.comparison_results,
                    added_manually = excluded.added_manually"
            ),
            rusqlite::params![
                entry.name,
                readings,
                entry.timestamp.to_rfc3339(),
                entry.photo,
                messages,
                comparisons,
                entry.added_manually,
            ],
        )?;
        tx.commit()?;

        let outcome = if exists {
            Upserted::Updated
        } else {
            Upserted::Inserted
        };
        log::debug!("{:?} catalog entry {}", outcome, entry.name);
        Ok(outcome)
    }

    fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM catalog_entries ORDER BY name"
        ))?;

        let mut entries = Vec::new();
        for row in stmt.query_map([], Self::row_to_entry)? {
            match row {
                Ok(entry) => entries.push(entry),
                Err(e @ rusqlite::Error::FromSqlConversionFailure(..)) => {
                    log::warn!("Skipping unreadable catalog row: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(entries)
    }

    fn delete_by_name(&self, name: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM catalog_entries WHERE name = ?1", [name])?;
        Ok(removed > 0)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM catalog_entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{ReadingVector, CHANNELS, MESSAGES_PER_SET};
    use tempfile::TempDir;

    fn reading(first: f64) -> ReadingVector {
        let mut values = [1.0; CHANNELS];
        values[0] = first;
        ReadingVector::new(values)
    }

    #[test]
    fn test_database_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_reopen_does_not_reapply_migrations() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.db");

        Database::open(&path)
            .unwrap()
            .upsert(&CatalogEntry::manual("74HC00", reading(1.0)))
            .unwrap();

        let db = Database::open(&path).unwrap();
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_inserts_then_updates() {
        let db = Database::open_in_memory().unwrap();

        let first = CatalogEntry::manual("NE555", reading(1.0));
        assert_eq!(db.upsert(&first).unwrap(), Upserted::Inserted);

        let second = CatalogEntry::manual("NE555", reading(3.5));
        assert_eq!(db.upsert(&second).unwrap(), Upserted::Updated);

        assert_eq!(db.count().unwrap(), 1);
        let stored = db.find_by_name("NE555").unwrap().unwrap();
        assert_eq!(stored.readings[0], 3.5);
    }

    #[test]
    fn test_upsert_is_full_replace() {
        let db = Database::open_in_memory().unwrap();

        let with_photo = CatalogEntry::manual("LM358", reading(1.0)).with_photo("cGhvdG8=");
        db.upsert(&with_photo).unwrap();

        let without_photo = CatalogEntry::manual("LM358", reading(1.0));
        db.upsert(&without_photo).unwrap();

        let stored = db.find_by_name("LM358").unwrap().unwrap();
        assert!(stored.photo.is_none());
    }

    #[test]
    fn test_entry_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let messages = MessageSet::new(vec![reading(2.0); MESSAGES_PER_SET]).unwrap();
        let summary = vec![ComparisonSummary {
            name: "CD4001".to_string(),
            sse: 0.125,
        }];
        let entry = CatalogEntry::measured("mystery", reading(2.0), messages, summary)
            .with_photo("aGVsbG8=");

        db.upsert(&entry).unwrap();

        let stored = db.find_by_name("mystery").unwrap().unwrap();
        assert_eq!(stored, entry);
    }

    #[test]
    fn test_find_missing_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.find_by_name("nothing").unwrap().is_none());
    }

    #[test]
    fn test_get_by_name_reports_not_found() {
        let db = Database::open_in_memory().unwrap();
        db.upsert(&CatalogEntry::manual("LM741", reading(0.5))).unwrap();

        assert_eq!(db.get_by_name("LM741").unwrap().name, "LM741");
        let err = db.get_by_name("LM742").unwrap_err();
        assert!(matches!(err, crate::Error::NotFound { entity: "IC", ref name } if name == "LM742"));
        assert_eq!(err.to_string(), "IC not found: LM742");
    }

    #[test]
    fn test_upsert_rejects_wrong_length() {
        let db = Database::open_in_memory().unwrap();
        let mut entry = CatalogEntry::manual("bad", reading(0.0));
        entry.readings.truncate(5);

        assert!(matches!(db.upsert(&entry), Err(Error::InvalidData(_))));
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_list_all_is_ordered_by_name() {
        let db = Database::open_in_memory().unwrap();
        for name in ["TL072", "74LS04", "LM741"] {
            db.upsert(&CatalogEntry::manual(name, reading(0.0))).unwrap();
        }

        let names: Vec<String> = db.list_all().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["74LS04", "LM741", "TL072"]);
    }

    #[test]
    fn test_list_all_loads_malformed_rows() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO catalog_entries (name, readings, timestamp)
                 VALUES ('legacy', '[1.0, 2.0, 3.0]', '2024-03-01T12:00:00+00:00')",
                [],
            )
            .unwrap();

        let entries = db.list_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].readings.len(), 3);
        assert!(entries[0].reading_vector().is_none());
        assert!(!entries[0].added_manually);
    }

    #[test]
    fn test_list_all_tolerates_bad_history_columns() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO catalog_entries (name, readings, timestamp, messages, comparison_results)
                 VALUES ('short-history', '[1,1,1,1,1,1,1,1]', '2024-03-01T12:00:00+00:00',
                         '[[1,1,1,1,1,1,1,1]]', 'not json')",
                [],
            )
            .unwrap();

        let entries = db.list_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].messages.is_none());
        assert!(entries[0].comparison_results.is_empty());
        assert!(entries[0].reading_vector().is_some());
    }

    #[test]
    fn test_list_all_skips_unreadable_rows() {
        let db = Database::open_in_memory().unwrap();
        db.upsert(&CatalogEntry::manual("good", reading(1.0))).unwrap();
        db.conn()
            .execute(
                "INSERT INTO catalog_entries (name, readings, timestamp)
                 VALUES ('bad-readings', '[\"a\", \"b\"]', '2024-03-01T12:00:00+00:00'),
                        ('bad-time', '[1,1,1,1,1,1,1,1]', 'yesterday')",
                [],
            )
            .unwrap();

        let entries = db.list_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "good");
    }

    #[test]
    fn test_delete_by_name() {
        let db = Database::open_in_memory().unwrap();
        db.upsert(&CatalogEntry::manual("CD4011", reading(0.0))).unwrap();

        assert!(db.delete_by_name("CD4011").unwrap());
        assert!(!db.delete_by_name("CD4011").unwrap());
        assert_eq!(db.count().unwrap(), 0);
    }
}
