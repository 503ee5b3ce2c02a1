//! Core domain model for icsig.
//!
//! This crate defines the signature data model (reading vectors, message
//! sets, averaged vectors, catalog entries, match results), the explicit
//! collection session, and the SQLite-backed IC catalog.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod model;
pub mod schema;
pub mod session;

pub use catalog::{CatalogStore, Upserted};
pub use error::{Error, Result};
pub use model::{
    AveragedVector, CatalogEntry, ComparisonSummary, MatchResult, MessageSet, ReadingVector,
    CHANNELS, MESSAGES_PER_SET,
};
pub use schema::Database;
pub use session::Session;
