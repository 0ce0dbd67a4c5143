use std::io::{self, BufRead, Write};
use log::{debug, info};
use tinybasic_core::Interpreter;
use crate::config::{ErrorPolicy, SessionConfig};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Input was exhausted.
    Finished,
    /// An error hit an `exit` policy.
    Exited,
}

/// Reads blank-line separated blocks and runs each one against a single
/// interpreter, so bindings carry over from block to block.
pub struct Session {
    interpreter: Interpreter,
    settings: SessionConfig,
    interactive: bool,
    blocks: usize,
}

impl Session {
    pub fn new(settings: SessionConfig, interactive: bool) -> Self {
        Session {
            interpreter: Interpreter::new(),
            settings,
            interactive,
            blocks: 0,
        }
    }

    /// Runs blocks until end of input. Program output goes to `out`,
    /// prompts and diagnostics to `err`.
    pub fn run(&mut self, input: &mut dyn BufRead, out: &mut dyn Write, err: &mut dyn Write) -> io::Result<Flow> {
        info!("session started");
        while let Some(block) = self.read_block(input, err)? {
            if self.execute_block(&block, out, err)? == Flow::Exited {
                info!("session stopped after {} blocks", self.blocks);
                return Ok(Flow::Exited);
            }
        }
        info!("session finished after {} blocks", self.blocks);
        Ok(Flow::Finished)
    }

    /// Collects lines up to the next blank line. Returns `None` once input is
    /// exhausted with nothing collected.
    fn read_block(&self, input: &mut dyn BufRead, err: &mut dyn Write) -> io::Result<Option<String>> {
        let mut lines: Vec<String> = Vec::new();

        loop {
            if self.interactive {
                let prompt = if lines.is_empty() { &self.settings.prompt } else { &self.settings.continuation_prompt };
                write!(err, "{}", prompt)?;
                err.flush()?;
            }

            // Undecodable bytes become U+FFFD and are rejected by the lexer.
            let mut raw = Vec::new();
            if input.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                if lines.is_empty() {
                    continue;
                }
                break;
            }
            lines.push(line.to_string());
        }

        if lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(lines.join("\n")))
        }
    }

    fn execute_block(&mut self, block: &str, out: &mut dyn Write, err: &mut dyn Write) -> io::Result<Flow> {
        self.blocks += 1;
        debug!("block {}: {} lines", self.blocks, block.lines().count());

        let outcome = self.interpreter.run(block, out);
        out.flush()?;

        if self.settings.echo_store {
            for (name, value) in self.interpreter.variables().sorted() {
                debug!("{} = {}", name, value);
            }
        }

        let mut flow = Flow::Finished;
        for error in outcome.diagnostics.iter().chain(&outcome.error) {
            writeln!(err, "{}", error.report())?;
            if !error.is_fatal_for_block() {
                continue;
            }
            let policy = if error.kind.is_runtime() {
                self.settings.on_runtime_error
            } else {
                self.settings.on_syntax_error
            };
            if let ErrorPolicy::Exit = policy {
                flow = Flow::Exited;
            }
        }
        Ok(flow)
    }
}
