use anyhow::{Context, Result};
use icsig_core::{CatalogStore, Database, Session, Upserted};
use std::path::Path;

use super::load_session;

pub fn run_save(db: &Database, session_path: &Path, name: &str) -> Result<()> {
    let session = load_session(session_path)?;
    save_session(db, &session, name)
}

/// Write the session's measurement to the catalog.
///
/// An existing entry's photo is kept; everything else is replaced.
pub fn save_session(db: &Database, session: &Session, name: &str) -> Result<()> {
    let mut entry = session
        .to_catalog_entry(name)
        .context("No data to save")?;

    if let Some(existing) = db.find_by_name(&entry.name)? {
        entry.photo = existing.photo;
    }

    match db.upsert(&entry)? {
        Upserted::Inserted => println!("✓ Added new IC to database: {}", entry.name),
        Upserted::Updated => println!("✓ Updated IC in database: {}", entry.name),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use icsig_core::{
        AveragedVector, CatalogEntry, MessageSet, ReadingVector, CHANNELS, MESSAGES_PER_SET,
    };

    fn collected_session() -> Session {
        let mut session = Session::new();
        let set = MessageSet::new(vec![ReadingVector::new([2.0; CHANNELS]); MESSAGES_PER_SET])
            .unwrap();
        session.record_collection(set, AveragedVector::new([2.0; CHANNELS]));
        session
    }

    #[test]
    fn test_save_without_data_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(save_session(&db, &Session::new(), "LM358").is_err());
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_save_keeps_existing_photo() {
        let db = Database::open_in_memory().unwrap();
        let original =
            CatalogEntry::manual("LM358", ReadingVector::new([0.0; CHANNELS])).with_photo("cGhvdG8=");
        db.upsert(&original).unwrap();

        save_session(&db, &collected_session(), "LM358").unwrap();

        let stored = db.find_by_name("LM358").unwrap().unwrap();
        assert_eq!(stored.readings, vec![2.0; CHANNELS]);
        assert_eq!(stored.photo.as_deref(), Some("cGhvdG8="));
        assert!(!stored.added_manually);
    }
}
