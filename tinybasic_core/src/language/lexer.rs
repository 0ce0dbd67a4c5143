use log::{debug, trace};
use logos::Logos;
use crate::language::token::{LexerExtras, Token, TokenType};
use crate::language::error::Error;
use crate::lexer_error;

/// Scans one block of source text.
///
/// Unrecognised characters never abort the scan: each one is recorded as a
/// lexical diagnostic and scanning resumes right after it.
pub struct Lexer<'a> {
    source: &'a str,
    lines: Vec<String>,
    diagnostics: Vec<Error>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            lines: source.lines().map(str::to_string).collect(),
            diagnostics: Vec::new(),
        }
    }

    /// Verbatim text of a 1-based source line.
    pub fn source_line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn diagnostics(&self) -> &[Error] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Produces every token of the block followed by a single `EOF` token.
    ///
    /// Calling it again rescans from the start and replaces the diagnostics.
    pub fn tokenize(&mut self) -> Vec<Token> {
        self.diagnostics.clear();

        let mut scanner = TokenType::lexer_with_extras(self.source, LexerExtras { line: 1 });
        let mut tokens = Vec::new();

        while let Some(result) = scanner.next() {
            let line = scanner.extras.line;
            let lexeme = scanner.slice();

            match result {
                Ok(token_type) => {
                    trace!("token {:?} at line {}", token_type, line);
                    tokens.push(Token { token_type, lexeme: lexeme.to_string(), line });
                }
                Err(()) => {
                    let error = if lexeme.bytes().all(|b| b.is_ascii_digit()) && !lexeme.is_empty() {
                        lexer_error!(format!("Integer literal out of range: '{}'", lexeme), line)
                    } else {
                        let ch = lexeme.chars().next().unwrap_or('?');
                        lexer_error!(format!("Invalid token: '{}'", ch), line)
                    };
                    debug!("{}", error.report());
                    self.diagnostics.push(error);
                }
            }
        }

        let line = scanner.extras.line;
        tokens.push(Token { token_type: TokenType::EOF, lexeme: String::new(), line });
        tokens
    }
}

/// Tokenizes `source`, returning the tokens and the lexical diagnostics.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Error>) {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    (tokens, lexer.take_diagnostics())
}
