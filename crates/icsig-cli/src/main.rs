use anyhow::{Context, Result};
use clap::Parser;
use icsig_acquire::{logging, Config};
use icsig_core::Database;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "icsig", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the catalog database (default: ~/.local/share/icsig/icsig.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Collect readings from the IC test fixture
    ///
    /// Opens the serial port, waits for the fixture to reset, then reads one
    /// value per line until 5 messages of 8 values have arrived. Values that
    /// are not numbers are skipped with a warning. Press Ctrl-C to stop early;
    /// a stopped session keeps nothing.
    ///
    /// A completed session is averaged channel by channel, kept as the current
    /// session for `compare` and `save`, and compared against the catalog.
    Collect {
        /// Serial device (overrides config)
        #[arg(long)]
        port: Option<String>,

        /// Baud rate (overrides config)
        #[arg(long)]
        baud: Option<u32>,

        /// Seconds to wait for each line before giving up (overrides config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Skip the comparison after collecting
        #[arg(long)]
        no_compare: bool,

        /// Save the measurement to the catalog under this name
        #[arg(long, value_name = "NAME")]
        save: Option<String>,
    },
    /// Compare the current session against every IC in the catalog
    Compare,
    /// Save the current session's average to the catalog
    Save {
        /// IC name for this measurement
        name: String,
    },
    /// Add or replace a reference IC by hand
    Add {
        /// IC name
        name: String,

        /// 8 comma-separated readings, e.g. "4.98, 0.01, 2.48, 4.99, 0, 1.25, 3.3, 4.99"
        #[arg(long, allow_hyphen_values = true)]
        readings: String,

        /// Reference photo (jpg, png, bmp)
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// List all ICs in the catalog
    List,
    /// Show one catalog entry in detail
    Show {
        /// IC name
        name: String,
    },
    /// Delete an IC from the catalog
    Delete {
        /// IC name
        name: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Export an IC's reference photo, resized to fit
    Photo {
        /// IC name
        name: String,

        /// Output image file; the format follows the extension
        #[arg(short, long)]
        output: PathBuf,

        /// Largest edge in pixels (overrides config)
        #[arg(long)]
        max_size: Option<u32>,
    },
    /// List serial ports on this machine
    Ports,
    /// Show catalog and session status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole config file
    Get { key: Option<String> },
    /// Set a value in the config file
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

fn open_database(config: &Config) -> Result<Database> {
    let db_path = &config.database_path;

    // Ensure database directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Database::open(db_path)
        .with_context(|| format!("Failed to open catalog at {}", db_path.display()))
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => commands::config::show_config(),
        ConfigAction::Get { key } => commands::config::get_config(key),
        ConfigAction::Set { key, value } => commands::config::set_config(key, value),
        ConfigAction::Path => commands::config::show_path(),
        ConfigAction::Example => commands::config::show_example(),
        ConfigAction::Init => commands::config::init_config(),
    }
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Collect {
            port,
            baud,
            timeout,
            no_compare,
            save,
        } => {
            let args = commands::collect::CollectArgs {
                port,
                baud,
                timeout,
                compare: !no_compare,
                save,
            };
            let db = open_database(config)?;
            commands::run_collect(config, &db, args).await?;
        }
        Commands::Compare => {
            let db = open_database(config)?;
            commands::run_compare(&db, &config.session_path)?;
        }
        Commands::Save { name } => {
            let db = open_database(config)?;
            commands::run_save(&db, &config.session_path, &name)?;
        }
        Commands::Add {
            name,
            readings,
            photo,
        } => {
            let db = open_database(config)?;
            commands::catalog::add_ic(&db, &name, &readings, photo.as_deref())?;
        }
        Commands::List => {
            let db = open_database(config)?;
            commands::catalog::list_ics(&db)?;
        }
        Commands::Show { name } => {
            let db = open_database(config)?;
            commands::catalog::show_ic(&db, &name)?;
        }
        Commands::Delete { name, yes } => {
            let db = open_database(config)?;
            commands::catalog::delete_ic(&db, &name, yes)?;
        }
        Commands::Photo {
            name,
            output,
            max_size,
        } => {
            let db = open_database(config)?;
            let max_size = max_size.unwrap_or(config.photo_max_size);
            commands::export_photo(&db, &name, &output, max_size)?;
        }
        Commands::Ports => {
            commands::list_ports(config)?;
        }
        Commands::Status => {
            let db = open_database(config)?;
            commands::show_status(config, &db)?;
        }
        Commands::Config { action } => {
            run_config(action)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Config commands never load the config file.
        Commands::Config { action } => {
            logging::init(&Config::default().logging, cli.verbose)?;
            run_config(action)
        }
        command => {
            let config = match cli.db {
                Some(db) => Config::load_with_db_path(db)?,
                None => Config::load()?,
            };
            logging::init(&config.logging, cli.verbose)?;
            run(command, &config).await
        }
    }
}
