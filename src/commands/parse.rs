use std::fs;
use std::path::Path;
use clap::ValueEnum;
use tinybasic_core::{AstNode, parse as parse_source};
use crate::session::Flow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Indented node tree.
    #[default]
    Tree,
    /// Pretty-printed JSON.
    Json,
    /// Normalised BASIC source.
    Source,
}

pub fn render(ast: &AstNode, format: Format) -> Result<String, Box<dyn std::error::Error>> {
    let text = match format {
        Format::Tree => ast.tree(),
        Format::Json => format!("{}\n", ast.to_json()?),
        Format::Source => ast.to_string(),
    };
    Ok(text)
}

/// Parses a whole file without running it and prints the tree.
pub fn parse(path: &Path, format: Format) -> Result<Flow, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    match parse_source(&source) {
        Ok(ast) => {
            print!("{}", render(&ast, format)?);
            Ok(Flow::Finished)
        }
        Err(e) => {
            eprintln!("{}", e.report());
            Ok(Flow::Exited)
        }
    }
}
