use anyhow::Result;
use icsig_acquire::Config;
use icsig_core::{CatalogStore, Database};

use super::load_session;

pub fn show_status(config: &Config, db: &Database) -> Result<()> {
    let count = db.count()?;
    let session = load_session(&config.session_path)?;

    println!("\n📊 icsig Status\n");
    println!("  Database: {}", config.database_path.display());
    println!("  ICs in database: {}", count);
    println!("  Serial port: {} @ {} baud", config.serial_port, config.baud_rate);

    match (session.averaged(), session.collected_at()) {
        (Some(averaged), Some(at)) => {
            println!("\n  Current session: collected {}", at.format("%Y-%m-%d %H:%M"));
            println!("  Averaged: {averaged}");
            match session.best_match() {
                Some(best) => println!(
                    "  Best match: {} (SSE: {:.4}, {:.1}%)",
                    best.name, best.distance, best.similarity
                ),
                None => println!("\n  Run `icsig compare` to match it against the catalog"),
            }
        }
        _ => println!("\n  No current session. Run `icsig collect` to take a measurement"),
    }

    if count == 0 {
        println!("\n  Run `icsig add` to enter reference ICs");
    }

    Ok(())
}
