use icsig_core::{AveragedVector, CatalogEntry, Error, MatchResult, Result, Session};

use crate::distance::{similarity, sse};

/// Rank catalog entries by distance to `averaged`, best match first.
///
/// Entries whose readings do not have one value per channel are skipped.
/// Ties keep their catalog order.
pub fn rank(averaged: &AveragedVector, entries: &[CatalogEntry]) -> Result<Vec<MatchResult>> {
    if entries.is_empty() {
        return Err(Error::EmptyCatalog);
    }

    let mut results: Vec<MatchResult> = entries
        .iter()
        .filter_map(|entry| {
            let Some(readings) = entry.reading_vector() else {
                log::debug!(
                    "Skipping {}: {} readings stored",
                    entry.name,
                    entry.readings.len()
                );
                return None;
            };
            let distance = sse(averaged.values(), readings.values());
            Some(MatchResult {
                name: entry.name.clone(),
                distance,
                similarity: similarity(distance),
                readings,
            })
        })
        .collect();

    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    Ok(results)
}

/// Compare the session's average against the catalog and keep the ranking
/// in the session.
pub fn compare<'s>(session: &'s mut Session, entries: &[CatalogEntry]) -> Result<&'s [MatchResult]> {
    let averaged = *session.require_average()?;
    let results = rank(&averaged, entries)?;

    if let Some(best) = results.first() {
        log::info!("Best match: {} (SSE: {:.4})", best.name, best.distance);
    }

    session.record_results(results);
    Ok(session.results())
}
