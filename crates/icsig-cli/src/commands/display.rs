//! Plain-text rendering of readings and comparison tables.

use icsig_acquire::Progress;
use icsig_core::{AveragedVector, MatchResult, MessageSet, CHANNELS};

/// Format readings as a comma-separated list with the given precision.
pub fn format_readings(values: &[f64], precision: usize) -> String {
    values
        .iter()
        .map(|v| format!("{v:.precision$}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_progress(event: &Progress) {
    match event {
        Progress::Connected { port } => println!("Connected to {port}. Reading values..."),
        Progress::Value { index, value } => println!("  V{} = {value:.3}", index + 1),
        Progress::MessageComplete { count, vector } => {
            println!("  V{CHANNELS} = {:.3}", vector[CHANNELS - 1]);
            println!("✓ Message #{count} complete: {vector}");
        }
        Progress::Rejected { token } => eprintln!("  ⚠ Invalid value: {token}"),
    }
}

pub fn print_messages(set: &MessageSet, averaged: &AveragedVector) {
    print!("\n{:<10}", "");
    for channel in 1..=CHANNELS {
        print!("{:>9}", format!("V{channel}"));
    }
    println!();

    for (i, vector) in set.vectors().iter().enumerate() {
        print!("{:<10}", format!("Message {}", i + 1));
        for value in vector.iter() {
            print!("{value:>9.3}");
        }
        println!();
    }

    print!("{:<10}", "Average");
    for value in averaged.values() {
        print!("{value:>9.3}");
    }
    println!();
}

pub fn print_results(results: &[MatchResult]) {
    println!(
        "\n{:>4}  {:<24} {:>12} {:>11}",
        "Rank", "IC Name", "SSE", "Similarity"
    );
    println!("{}", "-".repeat(54));
    for (i, result) in results.iter().enumerate() {
        println!(
            "{:>4}  {:<24} {:>12.4} {:>10.1}%",
            i + 1,
            result.name,
            result.distance,
            result.similarity
        );
    }
}

/// Channel-by-channel view of the measurement against its best match.
pub fn print_best_match(averaged: &AveragedVector, best: &MatchResult) {
    println!(
        "\nMeasured vs best match: {} (SSE: {:.4})",
        best.name, best.distance
    );
    println!(
        "{:>7} {:>10} {:>10} {:>10}",
        "Channel", "Measured", "Best", "Diff"
    );
    for channel in 0..CHANNELS {
        let measured = averaged[channel];
        let reference = best.readings[channel];
        println!(
            "{:>7} {measured:>10.3} {reference:>10.3} {:>+10.3}",
            format!("V{}", channel + 1),
            measured - reference
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_readings() {
        assert_eq!(format_readings(&[1.0, 2.346, 0.0], 2), "1.00, 2.35, 0.00");
        assert_eq!(format_readings(&[], 2), "");
    }
}
