pub mod catalog;
pub mod collect;
pub mod compare;
pub mod config;
pub mod display;
pub mod photo;
pub mod ports;
pub mod save;
pub mod status;

pub use collect::run_collect;
pub use compare::run_compare;
pub use photo::export_photo;
pub use ports::list_ports;
pub use save::run_save;
pub use status::show_status;

use anyhow::{Context, Result};
use icsig_core::Session;
use std::path::Path;

/// Load the current session, or an empty one if nothing was collected yet.
pub fn load_session(path: &Path) -> Result<Session> {
    let session = Session::load(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    Ok(session.unwrap_or_default())
}
