use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use log::info;
use crate::config::SessionConfig;
use crate::session::{Flow, Session};

/// Executes a source file block by block with one shared store.
pub fn run(path: &Path, settings: SessionConfig) -> Result<Flow, Box<dyn std::error::Error>> {
    let file = File::open(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    info!("running {}", path.display());

    let mut session = Session::new(settings, false);
    let flow = session.run(&mut BufReader::new(file), &mut io::stdout().lock(), &mut io::stderr())?;
    Ok(flow)
}
