use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::reading::{MessageSet, ReadingVector, CHANNELS};
use crate::model::result::MatchResult;

/// One row of a stored comparison history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub name: String,
    pub sse: f64,
}

impl From<&MatchResult> for ComparisonSummary {
    fn from(result: &MatchResult) -> Self {
        Self {
            name: result.name.clone(),
            sse: result.distance,
        }
    }
}

/// A named reference IC in the catalog.
///
/// `readings` is kept as a plain list so that rows written out of band
/// with the wrong number of channels still load; such entries are skipped
/// when ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique key.
    pub name: String,

    /// Reference signature, one value per channel.
    pub readings: Vec<f64>,

    /// When the entry was last written.
    pub timestamp: DateTime<Utc>,

    /// Base64-encoded reference photo.
    pub photo: Option<String>,

    /// The raw message set the readings were averaged from, for entries
    /// saved from a measurement.
    pub messages: Option<MessageSet>,

    /// The best matches found when this measurement was saved.
    pub comparison_results: Vec<ComparisonSummary>,

    /// Whether the readings were typed in rather than measured.
    pub added_manually: bool,
}

impl CatalogEntry {
    /// A manually entered reference IC.
    #[must_use]
    pub fn manual(name: impl Into<String>, readings: ReadingVector) -> Self {
        Self {
            name: name.into(),
            readings: readings.to_vec(),
            timestamp: Utc::now(),
            photo: None,
            messages: None,
            comparison_results: Vec::new(),
            added_manually: true,
        }
    }

    /// An entry recorded from a completed collection session.
    #[must_use]
    pub fn measured(
        name: impl Into<String>,
        readings: ReadingVector,
        messages: MessageSet,
        comparison_results: Vec<ComparisonSummary>,
    ) -> Self {
        Self {
            name: name.into(),
            readings: readings.to_vec(),
            timestamp: Utc::now(),
            photo: None,
            messages: Some(messages),
            comparison_results,
            added_manually: false,
        }
    }

    #[must_use]
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    #[must_use]
    pub const fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    /// The readings as a fixed-size vector, or `None` when the stored list
    /// does not have one value per channel.
    #[must_use]
    pub fn reading_vector(&self) -> Option<ReadingVector> {
        ReadingVector::try_from(self.readings.as_slice()).ok()
    }

    /// Check the entry is fit to be written to the catalog.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidData("IC name required".to_string()));
        }
        if self.readings.len() != CHANNELS {
            return Err(Error::InvalidData(format!(
                "must provide exactly {CHANNELS} readings, got {}",
                self.readings.len()
            )));
        }
        if self.readings.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "readings must be finite numbers".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(first: f64) -> ReadingVector {
        let mut values = [1.0; CHANNELS];
        values[0] = first;
        ReadingVector::new(values)
    }

    #[test]
    fn test_manual_entry() {
        let entry = CatalogEntry::manual("74HC00", reading(2.0));
        assert!(entry.added_manually);
        assert!(!entry.has_photo());
        assert_eq!(entry.reading_vector(), Some(reading(2.0)));
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_measured_entry_keeps_history() {
        let messages = MessageSet::new(vec![reading(1.0); 5]).unwrap();
        let summary = vec![ComparisonSummary {
            name: "LM358".to_string(),
            sse: 0.25,
        }];
        let entry = CatalogEntry::measured("unknown-1", reading(1.0), messages, summary.clone());

        assert!(!entry.added_manually);
        assert!(entry.messages.is_some());
        assert_eq!(entry.comparison_results, summary);
    }

    #[test]
    fn test_with_photo() {
        let entry = CatalogEntry::manual("NE555", reading(0.0)).with_photo("aGVsbG8=");
        assert!(entry.has_photo());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let entry = CatalogEntry::manual("   ", reading(0.0));
        assert!(matches!(entry.validate(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_validate_rejects_wrong_length() {
        let mut entry = CatalogEntry::manual("CD4011", reading(0.0));
        entry.readings.push(4.2);
        assert!(entry.validate().is_err());
        assert!(entry.reading_vector().is_none());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut entry = CatalogEntry::manual("CD4011", reading(0.0));
        entry.readings[5] = f64::NAN;
        assert!(entry.validate().is_err());
    }
}
