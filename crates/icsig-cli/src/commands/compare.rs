use anyhow::{Context, Result};
use icsig_core::{CatalogStore, Database, Session, CHANNELS};
use std::path::Path;

use super::{display, load_session};

pub fn run_compare(db: &Database, session_path: &Path) -> Result<()> {
    let mut session = load_session(session_path)?;
    compare_and_report(db, &mut session)?;
    session.save(session_path)?;
    Ok(())
}

/// Rank the catalog against the session's average and print the results.
pub fn compare_and_report(db: &Database, session: &mut Session) -> Result<()> {
    let averaged = *session
        .require_average()
        .context("Cannot compare")?;

    println!("\nComparing with database...");
    let entries = db.list_all()?;
    let results = icsig_match::compare(session, &entries).context("Comparison failed")?;

    let Some(best) = results.first() else {
        println!(
            "No catalog entry has {CHANNELS} readings; {} entries skipped",
            entries.len()
        );
        return Ok(());
    };

    display::print_results(results);
    display::print_best_match(&averaged, best);

    println!("\nBest match: {} (SSE: {:.4})", best.name, best.distance);
    match db.find_by_name(&best.name)? {
        Some(entry) if entry.has_photo() => {
            println!(
                "Photo available: icsig photo \"{}\" --output <file.png>",
                best.name
            );
        }
        _ => println!("No photo found for: {}", best.name),
    }

    Ok(())
}
