mod context;
mod evaluator;
mod executor;
mod value;

use std::io::Write;
use log::debug;
use crate::language::ast::AstNode;
use crate::language::error::{Error, Result};
use crate::language::lexer::Lexer;
use crate::language::parser::Parser;
use executor::Executor;

pub use context::VariableStore;
pub use evaluator::Evaluator;
pub use value::Value;

/// What happened to one block of source.
#[derive(Debug, Default, PartialEq)]
pub struct BlockOutcome {
    /// Lexical errors; the block still ran without the offending characters.
    pub diagnostics: Vec<Error>,
    /// The syntax or runtime error that stopped the block, if any.
    pub error: Option<Error>,
}

impl BlockOutcome {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.error.is_none()
    }
}

/// Owns the variable store shared by every block it runs.
#[derive(Debug, Default)]
pub struct Interpreter {
    variables: VariableStore,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            variables: VariableStore::new(),
        }
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// Executes an already parsed tree against the store.
    pub fn execute(&mut self, ast: &AstNode, out: &mut dyn Write) -> Result<Option<Value>> {
        let mut executor = Executor::new(&mut self.variables, out);
        executor.execute(ast)
    }

    /// Tokenizes, parses and executes one block.
    ///
    /// A syntax error stops the block before anything runs. A runtime error
    /// stops it where it happened; bindings made up to that point are kept.
    pub fn run(&mut self, source: &str, out: &mut dyn Write) -> BlockOutcome {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();
        let diagnostics = lexer.take_diagnostics();
        debug!("block: {} tokens, {} lexical errors", tokens.len(), diagnostics.len());

        let ast = match Parser::with_lines(tokens, lexer.lines().to_vec()).parse() {
            Ok(ast) => ast,
            Err(e) => {
                debug!("block rejected: {}", e);
                return BlockOutcome { diagnostics, error: Some(e) };
            }
        };

        let error = match self.execute(&ast, out) {
            Ok(_) => None,
            Err(e) => {
                debug!("block aborted: {}", e);
                Some(e)
            }
        };
        debug!("store holds {} bindings", self.variables.len());
        BlockOutcome { diagnostics, error }
    }
}
