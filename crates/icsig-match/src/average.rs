use icsig_core::{AveragedVector, MessageSet, CHANNELS};

/// Per-channel arithmetic mean of a message set.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average(set: &MessageSet) -> AveragedVector {
    let mut sums = [0.0; CHANNELS];
    for vector in set.vectors() {
        for (sum, value) in sums.iter_mut().zip(vector.iter()) {
            *sum += value;
        }
    }

    let count = set.len() as f64;
    AveragedVector::new(sums.map(|sum| sum / count))
}
