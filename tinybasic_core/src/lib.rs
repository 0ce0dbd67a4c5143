//! Core of the tinybasic interpreter: lexer, parser, AST and a tree-walking
//! executor over a variable store that persists between blocks.

pub mod language;

pub use language::{
    AstNode, BlockOutcome, Error, ErrorKind, Factor, FactorKind, Interpreter, Lexer, Operator, Parser, Result,
    Value, VariableStore, parse, tokenize,
};
pub use language::token::{Token, TokenType};
