use anyhow::{Context, Result};
use icsig_core::{CatalogStore, Database};
use std::path::Path;

pub fn export_photo(db: &Database, name: &str, output: &Path, max_size: u32) -> Result<()> {
    let entry = db.get_by_name(name)?;

    let written = icsig_acquire::photo::export_photo(&entry, output, max_size)
        .with_context(|| format!("Error loading photo for {name}"))?;

    match written {
        Some((width, height)) => println!(
            "✓ Photo for {name} written to {} ({width}x{height})",
            output.display()
        ),
        None => println!("No photo found for: {name}"),
    }
    Ok(())
}
