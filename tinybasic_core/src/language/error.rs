use std::fmt;
use derive_more::{Display, Error as DeriveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    #[display("LexError")]
    Lexer,
    #[display("SyntaxError")]
    Syntax,
    #[display("UnexpectedEof")]
    UnexpectedEof,
    #[display("AssignToConstant")]
    AssignToConstant,
    #[display("ZeroStep")]
    ZeroStep,
    #[display("UndefinedSymbol")]
    UndefinedSymbol,
    #[display("DivisionByZero")]
    DivisionByZero,
    #[display("TypeMismatch")]
    TypeMismatch,
    #[display("Overflow")]
    Overflow,
    #[display("OutputError")]
    Output,
}

impl ErrorKind {
    pub fn is_syntax(self) -> bool {
        matches!(self, ErrorKind::Syntax | ErrorKind::UnexpectedEof)
    }

    pub fn is_runtime(self) -> bool {
        !matches!(self, ErrorKind::Lexer | ErrorKind::Syntax | ErrorKind::UnexpectedEof)
    }
}

#[derive(Debug, Clone, PartialEq, DeriveError)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<usize>,
    /// Verbatim text of `line`, kept for syntax diagnostics.
    pub source_line: Option<String>,
}

impl Error {
    /// Lexical errors are reported and skipped; everything else stops the block.
    pub fn is_fatal_for_block(&self) -> bool {
        self.kind.is_syntax() || self.kind.is_runtime()
    }

    /// Renders the user-facing diagnostic written by the host.
    pub fn report(&self) -> String {
        match self.kind {
            ErrorKind::Lexer => match self.line {
                Some(line) => format!("{} at line {}", self.message, line),
                None => self.message.clone(),
            },
            ErrorKind::Syntax => {
                let mut out = match self.line {
                    Some(line) => format!("Syntax error at line {}: {}", line, self.message),
                    None => format!("Syntax error: {}", self.message),
                };
                if let Some(text) = &self.source_line {
                    out.push('\n');
                    out.push_str(text);
                }
                out
            }
            ErrorKind::UnexpectedEof => {
                format!("Syntax error: unexpected end of input ({})", self.message)
            }
            _ => format!("Runtime error: {}", self.message),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.line {
            Some(line) => write!(f, "{}: {} (line {})", self.kind, self.message, line),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! lexer_error {
    ($msg:expr, $line:expr) => {
        $crate::language::error::Error {
            kind: $crate::language::error::ErrorKind::Lexer,
            message: $msg.to_string(),
            line: Some($line),
            source_line: None,
        }
    };
}

#[macro_export]
macro_rules! syntax_error {
    ($msg:expr, $line:expr, $source_line:expr) => {
        Err($crate::language::error::Error {
            kind: $crate::language::error::ErrorKind::Syntax,
            message: $msg.to_string(),
            line: Some($line),
            source_line: $source_line,
        })
    };
}

#[macro_export]
macro_rules! eof_error {
    ($msg:expr) => {
        Err($crate::language::error::Error {
            kind: $crate::language::error::ErrorKind::UnexpectedEof,
            message: $msg.to_string(),
            line: None,
            source_line: None,
        })
    };
}

#[macro_export]
macro_rules! runtime_error {
    ($kind:ident, $msg:expr) => {
        Err($crate::language::error::Error {
            kind: $crate::language::error::ErrorKind::$kind,
            message: $msg.to_string(),
            line: None,
            source_line: None,
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime(kind: ErrorKind, message: &str) -> Error {
        Error { kind, message: message.to_string(), line: None, source_line: None }
    }

    #[test]
    fn syntax_report_carries_line_and_source() {
        let err: Result<()> = syntax_error!("expected THEN, found NEXT", 3, Some("IF x NEXT".to_string()));
        let report = err.unwrap_err().report();
        assert_eq!(report, "Syntax error at line 3: expected THEN, found NEXT\nIF x NEXT");
    }

    #[test]
    fn eof_report_names_no_line() {
        let err: Result<()> = eof_error!("expected WEND");
        let report = err.unwrap_err().report();
        assert_eq!(report, "Syntax error: unexpected end of input (expected WEND)");
    }

    #[test]
    fn lexer_errors_are_not_fatal() {
        let err = lexer_error!("Invalid token: '@'", 2);
        assert!(!err.is_fatal_for_block());
        assert_eq!(err.report(), "Invalid token: '@' at line 2");
        assert!(runtime(ErrorKind::ZeroStep, "step is zero").is_fatal_for_block());
    }

    #[test]
    fn display_uses_kind_names() {
        let err = runtime(ErrorKind::UndefinedSymbol, "undefined symbol 'x'");
        assert_eq!(err.to_string(), "UndefinedSymbol: undefined symbol 'x'");
        assert_eq!(err.report(), "Runtime error: undefined symbol 'x'");
    }

    #[test]
    fn kind_classification() {
        assert!(ErrorKind::UnexpectedEof.is_syntax());
        assert!(!ErrorKind::Lexer.is_runtime());
        assert!(ErrorKind::DivisionByZero.is_runtime());
    }
}
