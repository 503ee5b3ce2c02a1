pub mod entry;
pub mod reading;
pub mod result;

pub use entry::{CatalogEntry, ComparisonSummary};
pub use reading::{AveragedVector, MessageSet, ReadingVector, CHANNELS, MESSAGES_PER_SET};
pub use result::MatchResult;
