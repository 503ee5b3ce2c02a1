//! The catalog collaborator used by the matcher and the CLI.

use crate::error::{Error, Result};
use crate::model::CatalogEntry;

/// What an [`CatalogStore::upsert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Updated,
}

/// Name-keyed storage for reference ICs.
///
/// Only equality-on-name lookups are ever needed.
pub trait CatalogStore {
    /// Look up a single entry by its unique name.
    fn find_by_name(&self, name: &str) -> Result<Option<CatalogEntry>>;

    /// Like [`CatalogStore::find_by_name`], but a missing entry is
    /// [`Error::NotFound`].
    fn get_by_name(&self, name: &str) -> Result<CatalogEntry> {
        self.find_by_name(name)?.ok_or_else(|| Error::NotFound {
            entity: "IC",
            name: name.to_string(),
        })
    }

    /// Insert the entry, or fully replace the existing one with the same name.
    fn upsert(&self, entry: &CatalogEntry) -> Result<Upserted>;

    /// Every entry, ordered by name.
    fn list_all(&self) -> Result<Vec<CatalogEntry>>;

    /// Remove an entry; returns `false` when no entry had that name.
    fn delete_by_name(&self, name: &str) -> Result<bool>;

    fn count(&self) -> Result<usize>;
}
