pub mod parse;
pub mod repl;
pub mod run;
