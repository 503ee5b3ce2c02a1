use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

use crate::error::{Error, Result};

/// Number of analog channels the fixture reports per message.
pub const CHANNELS: usize = 8;

/// Number of messages collected before a session is averaged.
pub const MESSAGES_PER_SET: usize = 5;

fn fmt_values(values: &[f64], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{value:.3}")?;
    }
    write!(f, "]")
}

/// One fixed-size sample from the test fixture, one value per channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingVector([f64; CHANNELS]);

impl ReadingVector {
    #[must_use]
    pub const fn new(values: [f64; CHANNELS]) -> Self {
        Self(values)
    }

    #[must_use]
    pub const fn values(&self) -> &[f64; CHANNELS] {
        &self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }
}

impl TryFrom<&[f64]> for ReadingVector {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self> {
        let array: [f64; CHANNELS] = values.try_into().map_err(|_| {
            Error::InvalidData(format!(
                "expected {CHANNELS} readings, got {}",
                values.len()
            ))
        })?;
        Ok(Self(array))
    }
}

impl TryFrom<Vec<f64>> for ReadingVector {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::try_from(values.as_slice())
    }
}

impl Index<usize> for ReadingVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl fmt::Display for ReadingVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_values(&self.0, f)
    }
}

/// The reading vectors collected in one session.
///
/// Always holds exactly [`MESSAGES_PER_SET`] vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ReadingVector>", into = "Vec<ReadingVector>")]
pub struct MessageSet(Vec<ReadingVector>);

impl MessageSet {
    pub fn new(vectors: Vec<ReadingVector>) -> Result<Self> {
        if vectors.len() != MESSAGES_PER_SET {
            return Err(Error::InvalidData(format!(
                "a message set needs {MESSAGES_PER_SET} vectors, got {}",
                vectors.len()
            )));
        }
        Ok(Self(vectors))
    }

    #[must_use]
    pub fn vectors(&self) -> &[ReadingVector] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<ReadingVector>> for MessageSet {
    type Error = Error;

    fn try_from(vectors: Vec<ReadingVector>) -> Result<Self> {
        Self::new(vectors)
    }
}

impl TryFrom<Vec<Vec<f64>>> for MessageSet {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        let vectors = rows
            .into_iter()
            .map(ReadingVector::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(vectors)
    }
}

impl From<MessageSet> for Vec<ReadingVector> {
    fn from(set: MessageSet) -> Self {
        set.0
    }
}

/// Per-channel mean of a [`MessageSet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AveragedVector([f64; CHANNELS]);

impl AveragedVector {
    #[must_use]
    pub const fn new(values: [f64; CHANNELS]) -> Self {
        Self(values)
    }

    #[must_use]
    pub const fn values(&self) -> &[f64; CHANNELS] {
        &self.0
    }

    /// The average as a plain reading vector, as stored in the catalog.
    #[must_use]
    pub const fn as_reading(&self) -> ReadingVector {
        ReadingVector(self.0)
    }
}

impl Index<usize> for AveragedVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl fmt::Display for AveragedVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_values(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_vector_from_slice() {
        let values = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];
        let reading = ReadingVector::try_from(&values[..]).unwrap();
        assert_eq!(reading.values(), &values);
        assert_eq!(reading[3], 2.0);
    }

    #[test]
    fn test_reading_vector_rejects_wrong_length() {
        let result = ReadingVector::try_from(vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_reading_vector_display() {
        let reading = ReadingVector::new([1.0; CHANNELS]);
        assert_eq!(
            reading.to_string(),
            "[1.000, 1.000, 1.000, 1.000, 1.000, 1.000, 1.000, 1.000]"
        );
    }

    #[test]
    fn test_message_set_requires_five_vectors() {
        let four = vec![ReadingVector::new([0.0; CHANNELS]); 4];
        assert!(MessageSet::new(four).is_err());

        let five = vec![ReadingVector::new([0.0; CHANNELS]); 5];
        let set = MessageSet::new(five).unwrap();
        assert_eq!(set.len(), MESSAGES_PER_SET);
    }

    #[test]
    fn test_message_set_from_rows_checks_every_row() {
        let mut rows = vec![vec![1.0; CHANNELS]; MESSAGES_PER_SET];
        rows[2].pop();
        assert!(MessageSet::try_from(rows).is_err());
    }

    #[test]
    fn test_message_set_json_rejects_short_set() {
        let json = serde_json::to_string(&vec![[1.0; CHANNELS]; 3]).unwrap();
        let parsed: std::result::Result<MessageSet, _> = serde_json::from_str(&json);
        assert!(parsed.is_err());
    }
}
