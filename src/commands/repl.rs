use std::io::{self, IsTerminal};
use crate::config::SessionConfig;
use crate::session::{Flow, Session};

/// Interactive read loop on stdin. Prompts appear only when stdin is a terminal.
pub fn repl(settings: SessionConfig) -> Result<Flow, Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut session = Session::new(settings, interactive);

    let flow = session.run(&mut stdin.lock(), &mut io::stdout().lock(), &mut io::stderr())?;
    if interactive {
        eprintln!();
    }
    Ok(flow)
}
