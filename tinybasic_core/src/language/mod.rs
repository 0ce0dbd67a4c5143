pub mod token;
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod operators;
pub mod error;
pub mod interpreter;

pub use error::{Error, ErrorKind, Result};
pub use ast::{AstNode, Factor, FactorKind};
pub use lexer::{Lexer, tokenize};
pub use operators::Operator;
pub use parser::{Parser, parse};
pub use interpreter::{BlockOutcome, Interpreter, Value, VariableStore};
