use anyhow::{bail, Context, Result};
use icsig_acquire::{config, Config};
use toml_edit::{value, DocumentMut};

const VALID_KEYS: &str = "serial_port, baud_rate, line_timeout_secs, settle_delay_ms, \
database_path, session_path, photo_max_size, logging.level, logging.coloured";

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    let path = config::config_file_path();
    println!("Config file: {}", path.display());
    println!(
        "File exists: {}\n",
        if path.exists() { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    for key in VALID_KEYS.split(", ") {
        if let Some(current) = lookup(&config, key) {
            println!("  {key}: {current}");
        }
    }

    println!("\nPriority: CLI args > ENV vars (ICSIG_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value, or print the whole file when no key is given.
pub fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;
        match lookup(&config, &key) {
            Some(current) => println!("{current}"),
            None => bail!("Unknown config key: {key}\n\nValid keys: {VALID_KEYS}"),
        }
    } else {
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            print!("{contents}");
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'icsig config init' to create it.");
        }
    }

    Ok(())
}

/// Set a config value, keeping the rest of the file's layout and comments.
pub fn set_config(key: String, value: String) -> Result<()> {
    let config_path = config::config_file_path();
    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path)
        .context("Failed to read config file")?;
    let mut doc: DocumentMut = contents
        .parse()
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    set_value(&mut doc, &key, &value)?;

    std::fs::write(&config_path, doc.to_string())
        .context("Failed to write config file")?;

    println!("✓ Updated {key} = {value}");
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to set the serial port and catalog location.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

fn lookup(config: &Config, key: &str) -> Option<String> {
    let current = match key {
        "serial_port" => config.serial_port.clone(),
        "baud_rate" => config.baud_rate.to_string(),
        "line_timeout_secs" => config.line_timeout_secs.to_string(),
        "settle_delay_ms" => config.settle_delay_ms.to_string(),
        "database_path" => config.database_path.display().to_string(),
        "session_path" => config.session_path.display().to_string(),
        "photo_max_size" => config.photo_max_size.to_string(),
        "logging.level" => config.logging.level.clone(),
        "logging.coloured" => config.logging.coloured.to_string(),
        _ => return None,
    };
    Some(current)
}

fn set_value(doc: &mut DocumentMut, key: &str, raw: &str) -> Result<()> {
    let item = match key {
        "serial_port" | "database_path" | "session_path" => value(raw),
        "baud_rate" | "photo_max_size" => value(i64::from(parse_number::<u32>(key, raw)?)),
        "line_timeout_secs" | "settle_delay_ms" => {
            let n = parse_number::<u64>(key, raw)?;
            value(i64::try_from(n).with_context(|| format!("{key} is too large"))?)
        }
        "logging.level" => {
            icsig_acquire::logging::parse_level(raw)?;
            value(raw.to_lowercase())
        }
        "logging.coloured" => value(
            raw.parse::<bool>()
                .with_context(|| format!("{key} must be true or false"))?,
        ),
        _ => bail!("Unknown config key: {key}\n\nValid keys: {VALID_KEYS}"),
    };

    match key.split_once('.') {
        Some((table, field)) => {
            if !doc.contains_table(table) {
                doc[table] = toml_edit::table();
            }
            doc[table][field] = item;
        }
        None => doc[key] = item,
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow::anyhow!("{key} must be a non-negative integer, got {raw:?}"))
}
