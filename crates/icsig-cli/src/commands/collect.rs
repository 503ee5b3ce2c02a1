use anyhow::Result;
use icsig_acquire::{spawn_collection, AcquireError, CollectOutcome, Config};
use icsig_core::{Database, Error as CoreError, Session, MESSAGES_PER_SET};
use std::path::Path;
use std::time::Duration;

use super::display;

#[derive(Debug, Default)]
pub struct CollectArgs {
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub timeout: Option<u64>,
    pub compare: bool,
    pub save: Option<String>,
}

pub async fn run_collect(config: &Config, db: &Database, args: CollectArgs) -> Result<()> {
    let mut settings = config.serial_settings();
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(baud) = args.baud {
        settings.baud_rate = baud;
    }

    let mut options = config.collect_options();
    if let Some(secs) = args.timeout {
        options.line_timeout = Duration::from_secs(secs.max(1));
    }

    // A new collection discards the previous session.
    let mut session = Session::new();
    session.save(&config.session_path)?;

    println!(
        "Connecting to {} ({} baud)... press Ctrl-C to stop",
        settings.port, settings.baud_rate
    );
    log::info!("Starting collection on {}", settings.port);

    let mut handle = spawn_collection(settings, options);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stopping = false;

    loop {
        tokio::select! {
            event = handle.next_progress() => match event {
                Some(event) => display::print_progress(&event),
                None => break,
            },
            _ = &mut ctrl_c, if !stopping => {
                println!("\nStopping...");
                handle.stop();
                stopping = true;
            }
        }
    }

    let outcome = handle.finish().await.map_err(|e| {
        let hint = failure_hint(&e);
        anyhow::Error::new(e).context(hint)
    })?;
    let set = match outcome {
        CollectOutcome::Complete(set) => set,
        CollectOutcome::Stopped { messages } => {
            println!(
                "Collection stopped after {} of {} messages; nothing kept",
                messages.len(),
                MESSAGES_PER_SET
            );
            return Ok(());
        }
    };

    let averaged = icsig_match::average(&set);
    display::print_messages(&set, &averaged);
    println!("\n✓ Data collection complete. Averaged: {averaged}");

    session.record_collection(set, averaged);
    session.save(&config.session_path)?;

    compare_and_save(
        db,
        &mut session,
        &config.session_path,
        args.compare,
        args.save.as_deref(),
    )
}

/// Compare a freshly collected session and optionally store it.
///
/// An empty catalog does not stop `--save`: the first IC has nothing to be
/// compared against.
fn compare_and_save(
    db: &Database,
    session: &mut Session,
    session_path: &Path,
    compare: bool,
    save: Option<&str>,
) -> Result<()> {
    if compare {
        match super::compare::compare_and_report(db, session) {
            Ok(()) => session.save(session_path)?,
            Err(e) if save.is_some() && is_empty_catalog(&e) => {
                println!("\n⚠ {e:#}; saving without comparison");
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(name) = save {
        super::save::save_session(db, session, name)?;
    }

    Ok(())
}

fn failure_hint(err: &AcquireError) -> &'static str {
    if err.is_resource_failure() {
        "Data collection failed; check the fixture connection and --port"
    } else {
        "Data collection failed"
    }
}

fn is_empty_catalog(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<CoreError>(), Some(CoreError::EmptyCatalog))
}
