use std::fmt;
use logos::Logos;

#[derive(Default, Debug, Clone)]
pub struct LexerExtras {
    pub line: usize,
}

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum TokenType {
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Times,
    #[token("/")]
    Divide,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("=")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Mark,
    // -------- //
    #[token("AND")]
    And,
    #[token("OR")]
    Or,
    #[token("XOR")]
    Xor,
    #[token("NOT")]
    Not,
    // -------- //
    #[token("IF")]
    If,
    #[token("THEN")]
    Then,
    #[token("ELSEIF")]
    ElseIf,
    #[token("ELSE")]
    Else,
    #[token("END")]
    End,
    #[token("FOR")]
    For,
    #[token("TO")]
    To,
    #[token("STEP")]
    Step,
    #[token("NEXT")]
    Next,
    #[token("DO")]
    Do,
    #[token("WHILE")]
    While,
    #[token("WEND")]
    Wend,
    #[token("LET")]
    Let,
    // -------- //
    #[token("PRINT")]
    Print,
    #[token("INPUT")]
    Input,
    #[token("DIM")]
    Dim,
    #[token("GOTO")]
    Goto,
    #[token("RETURN")]
    Return,
    #[token("STOP")]
    Stop,
    // -------- //
    /// `REM` to end of line; carries the comment text.
    #[token("REM", rem_comment)]
    Rem(String),
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Number(i64),
    // -------- //
    #[token("#", line_comment)]
    Comment,
    #[token("\n", newline)]
    Newline,
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
    /// Appended by the lexer; never produced by the scanner itself.
    EOF,
}

fn rest_of_line(lex: &logos::Lexer<TokenType>) -> usize {
    lex.remainder().find('\n').unwrap_or(lex.remainder().len())
}

fn rem_comment(lex: &mut logos::Lexer<TokenType>) -> String {
    let len = rest_of_line(lex);
    let text = lex.remainder()[..len].trim().to_string();
    lex.bump(len);
    text
}

fn line_comment(lex: &mut logos::Lexer<TokenType>) -> logos::Skip {
    let len = rest_of_line(lex);
    lex.bump(len);
    logos::Skip
}

fn newline(lex: &mut logos::Lexer<TokenType>) -> logos::Skip {
    lex.extras.line += 1;
    logos::Skip
}

impl TokenType {
    /// Keywords reserved by the language that have no statement form.
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            TokenType::Print
                | TokenType::Input
                | TokenType::Dim
                | TokenType::Goto
                | TokenType::Return
                | TokenType::Stop
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub(crate) token_type: TokenType,
    pub(crate) lexeme: String,
    pub(crate) line: usize,
}

impl Token {
    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenType::Plus => write!(f, "+"),
            TokenType::Minus => write!(f, "-"),
            TokenType::Times => write!(f, "*"),
            TokenType::Divide => write!(f, "/"),
            TokenType::Lt => write!(f, "<"),
            TokenType::Le => write!(f, "<="),
            TokenType::Gt => write!(f, ">"),
            TokenType::Ge => write!(f, ">="),
            TokenType::Eq => write!(f, "="),
            TokenType::Ne => write!(f, "!="),
            TokenType::LParen => write!(f, "("),
            TokenType::RParen => write!(f, ")"),
            TokenType::Mark => write!(f, ":"),
            TokenType::And => write!(f, "AND"),
            TokenType::Or => write!(f, "OR"),
            TokenType::Xor => write!(f, "XOR"),
            TokenType::Not => write!(f, "NOT"),
            TokenType::If => write!(f, "IF"),
            TokenType::Then => write!(f, "THEN"),
            TokenType::ElseIf => write!(f, "ELSEIF"),
            TokenType::Else => write!(f, "ELSE"),
            TokenType::End => write!(f, "END"),
            TokenType::For => write!(f, "FOR"),
            TokenType::To => write!(f, "TO"),
            TokenType::Step => write!(f, "STEP"),
            TokenType::Next => write!(f, "NEXT"),
            TokenType::Do => write!(f, "DO"),
            TokenType::While => write!(f, "WHILE"),
            TokenType::Wend => write!(f, "WEND"),
            TokenType::Let => write!(f, "LET"),
            TokenType::Print => write!(f, "PRINT"),
            TokenType::Input => write!(f, "INPUT"),
            TokenType::Dim => write!(f, "DIM"),
            TokenType::Goto => write!(f, "GOTO"),
            TokenType::Return => write!(f, "RETURN"),
            TokenType::Stop => write!(f, "STOP"),
            TokenType::Rem(text) if text.is_empty() => write!(f, "REM"),
            TokenType::Rem(text) => write!(f, "REM {}", text),
            TokenType::Identifier(name) => write!(f, "{}", name),
            TokenType::Number(n) => write!(f, "{}", n),
            TokenType::Comment => write!(f, "#"),
            TokenType::Newline => write!(f, "newline"),
            TokenType::Ignored => write!(f, "whitespace"),
            TokenType::EOF => write!(f, "end of input"),
        }
    }
}
