//! Accumulates fixture output into reading vectors.
//!
//! The fixture prints one decimal value per line. Every [`CHANNELS`]
//! values form a reading vector, and collection is complete once the
//! quota ([`MESSAGES_PER_SET`] by default) of vectors has been gathered.

use icsig_core::{MessageSet, ReadingVector, Result, CHANNELS, MESSAGES_PER_SET};

/// What a single line did to the collector.
#[derive(Debug, Clone, PartialEq)]
pub enum Feed {
    /// Blank line, or input after the quota was reached.
    Ignored,
    /// Not a finite number; dropped.
    Rejected(String),
    /// Stored at `index` within the current vector.
    Value { index: usize, value: f64 },
    /// The value completed vector number `count` (1-based).
    MessageComplete { count: usize, vector: ReadingVector },
}

#[derive(Debug, Clone)]
pub struct SampleCollector {
    buffer: Vec<f64>,
    messages: Vec<ReadingVector>,
    quota: usize,
}

impl Default for SampleCollector {
    fn default() -> Self {
        Self::with_quota(MESSAGES_PER_SET)
    }
}

impl SampleCollector {
    /// A collector for one full message set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A collector that stops after `quota` vectors (at least one).
    ///
    /// Only a collector with the default quota can produce a
    /// [`MessageSet`]; other quotas are read back with
    /// [`SampleCollector::into_messages`].
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(CHANNELS),
            messages: Vec::with_capacity(quota.max(1)),
            quota: quota.max(1),
        }
    }

    #[must_use]
    pub const fn quota(&self) -> usize {
        self.quota
    }

    /// Feed one line of fixture output.
    pub fn push_line(&mut self, line: &str) -> Feed {
        let token = line.trim();
        if token.is_empty() || self.is_complete() {
            return Feed::Ignored;
        }

        let value = match token.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                log::warn!("Invalid value: {token}");
                return Feed::Rejected(token.to_string());
            }
        };

        let index = self.buffer.len();
        self.buffer.push(value);

        if self.buffer.len() < CHANNELS {
            return Feed::Value { index, value };
        }

        let mut values = [0.0; CHANNELS];
        values.copy_from_slice(&self.buffer);
        self.buffer.clear();

        let vector = ReadingVector::new(values);
        self.messages.push(vector);
        let count = self.messages.len();
        log::info!("Message #{count} complete");

        Feed::MessageComplete { count, vector }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.messages.len() >= self.quota
    }

    /// Completed vectors so far.
    #[must_use]
    pub fn messages(&self) -> &[ReadingVector] {
        &self.messages
    }

    /// Values of the vector currently being filled.
    #[must_use]
    pub fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    /// The finished message set; fails if collection is incomplete.
    pub fn into_message_set(self) -> Result<MessageSet> {
        MessageSet::new(self.messages)
    }

    /// Completed vectors, discarding any partial one.
    #[must_use]
    pub fn into_messages(self) -> Vec<ReadingVector> {
        self.messages
    }
}
