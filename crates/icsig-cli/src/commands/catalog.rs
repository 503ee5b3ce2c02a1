use anyhow::{bail, Context, Result};
use icsig_acquire::photo::encode_photo_file;
use icsig_core::{CatalogEntry, CatalogStore, Database, ReadingVector, Upserted, CHANNELS};
use std::io::{BufRead, Write};
use std::path::Path;

use super::display::format_readings;

/// Parse a comma-separated list of exactly [`CHANNELS`] readings.
pub fn parse_readings(input: &str) -> Result<ReadingVector> {
    let values = input
        .split(',')
        .map(str::trim)
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("Invalid reading: {token:?}"))
        })
        .collect::<Result<Vec<_>>>()?;

    if values.len() != CHANNELS {
        bail!("Must provide exactly {CHANNELS} readings, got {}", values.len());
    }
    Ok(ReadingVector::try_from(values)?)
}

pub fn add_ic(db: &Database, name: &str, readings: &str, photo: Option<&Path>) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("IC name required");
    }

    let mut entry = CatalogEntry::manual(name, parse_readings(readings)?);

    if let Some(path) = photo {
        if !path.exists() {
            bail!("Photo file not found: {}", path.display());
        }
        let encoded = encode_photo_file(path)
            .with_context(|| format!("Failed to read photo {}", path.display()))?;
        entry = entry.with_photo(encoded);
    }

    match db.upsert(&entry)? {
        Upserted::Inserted => println!("✓ Added IC: {name}"),
        Upserted::Updated => println!("✓ Updated IC: {name}"),
    }
    Ok(())
}

pub fn list_ics(db: &Database) -> Result<()> {
    let entries = db.list_all()?;
    if entries.is_empty() {
        println!("Database is empty");
        return Ok(());
    }

    println!(
        "{:<20} {:<56} {:<16} {}",
        "IC Name", "Readings", "Timestamp", "Has Photo"
    );
    println!("{}", "-".repeat(104));
    for entry in &entries {
        let readings = if entry.readings.is_empty() {
            "N/A".to_string()
        } else {
            format_readings(&entry.readings, 2)
        };
        println!(
            "{:<20} {:<56} {:<16} {}",
            entry.name,
            readings,
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            if entry.has_photo() { "Yes" } else { "No" }
        );
    }
    println!("\n{} ICs in database", entries.len());
    Ok(())
}

pub fn show_ic(db: &Database, name: &str) -> Result<()> {
    let entry = db.get_by_name(name)?;

    println!("IC: {}", entry.name);
    println!("  Readings:  {}", format_readings(&entry.readings, 3));
    if entry.reading_vector().is_none() {
        println!(
            "  ⚠ {} readings stored; this entry is skipped when comparing",
            entry.readings.len()
        );
    }
    println!(
        "  Timestamp: {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Source:    {}",
        if entry.added_manually { "manual entry" } else { "measurement" }
    );
    println!(
        "  Photo:     {}",
        if entry.has_photo() { "yes" } else { "no photo found" }
    );

    if let Some(messages) = &entry.messages {
        println!("\n  Messages:");
        for (i, vector) in messages.vectors().iter().enumerate() {
            println!("    {}: {vector}", i + 1);
        }
    }

    if !entry.comparison_results.is_empty() {
        println!("\n  Best matches when saved:");
        for (i, summary) in entry.comparison_results.iter().enumerate() {
            println!("    {}. {} (SSE: {:.4})", i + 1, summary.name, summary.sse);
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn delete_ic(db: &Database, name: &str, yes: bool) -> Result<()> {
    db.get_by_name(name)?;

    if !yes && !confirm(&format!("Delete IC: {name}?"))? {
        println!("Cancelled");
        return Ok(());
    }

    db.delete_by_name(name)?;
    println!("✓ Deleted IC: {name}");
    Ok(())
}
