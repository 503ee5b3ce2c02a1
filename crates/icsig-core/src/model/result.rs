use serde::{Deserialize, Serialize};

use crate::model::reading::ReadingVector;

/// One ranked catalog entry from a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Catalog name of the compared entry.
    pub name: String,

    /// Sum of squared per-channel differences to the averaged vector.
    pub distance: f64,

    /// Similarity percentage derived from `distance`.
    pub similarity: f64,

    /// The entry's reference readings.
    pub readings: ReadingVector,
}

impl MatchResult {
    /// Whether the measured average and the entry are identical.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.distance == 0.0
    }
}
