use log::debug;
use crate::language::token::{Token, TokenType};
use crate::language::ast::AstNode;
use crate::language::lexer::Lexer;
use crate::language::operators::{Associativity, Operator, NOT_PRECEDENCE};
use crate::language::error::Result;
use crate::{eof_error, syntax_error};

/// Deepest recursion the parser allows, counting parentheses, unary
/// operators and IF/WHILE/FOR bodies together.
pub const MAX_NESTING: usize = 128;

/// Tallest expression tree the parser builds; long operator chains grow
/// the tree without recursing in the parser.
pub const MAX_EXPRESSION_HEIGHT: usize = 1024;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    lines: Vec<String>,
    depth: usize,
    // Height of the expression tree most recently returned.
    height: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser::with_lines(tokens, Vec::new())
    }

    /// `lines` is the block's source text, used to quote the failing line.
    pub fn with_lines(mut tokens: Vec<Token>, lines: Vec<String>) -> Self {
        if !matches!(tokens.last(), Some(Token { token_type: TokenType::EOF, .. })) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token { token_type: TokenType::EOF, lexeme: String::new(), line });
        }
        Parser {
            tokens,
            current: 0,
            lines,
            depth: 0,
            height: 0,
        }
    }

    /// Parses the whole block into `Function("main", ...)`.
    pub fn parse(&mut self) -> Result<AstNode> {
        let body = self.statement_list(|_| false)?;
        debug!("parsed {} top-level statements", body.len());
        Ok(AstNode::main(body))
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            std::mem::discriminant(&self.peek().token_type) == std::mem::discriminant(token_type)
        }
    }

    fn match_token(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, token_type: &TokenType, expected: &str) -> Result<&Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            self.unexpected(expected)
        }
    }

    /// Error for the current token; end of input is reported without a line.
    fn unexpected<T>(&self, expected: &str) -> Result<T> {
        let token = self.peek();
        if matches!(token.token_type, TokenType::EOF) {
            eof_error!(format!("expected {}", expected))
        } else {
            syntax_error!(
                format!("expected {}, found {}", expected, token.token_type),
                token.line,
                self.source_line(token.line)
            )
        }
    }

    fn too_deep<T>(&self, what: &str, limit: usize) -> Result<T> {
        let token = self.peek();
        syntax_error!(
            format!("{} nested deeper than {} levels", what, limit),
            token.line,
            self.source_line(token.line)
        )
    }

    fn nested<T>(&mut self, what: &str, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return self.too_deep(what, MAX_NESTING);
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn source_line(&self, line: usize) -> Option<String> {
        line.checked_sub(1).and_then(|index| self.lines.get(index)).cloned()
    }

    fn statement_list(&mut self, stop: fn(&TokenType) -> bool) -> Result<Vec<AstNode>> {
        let mut statements = Vec::new();

        loop {
            while self.match_token(&TokenType::Mark) {}
            if self.is_at_end() || stop(&self.peek().token_type) {
                break;
            }
            statements.push(self.statement()?);
        }

        Ok(statements)
    }

    fn statement(&mut self) -> Result<AstNode> {
        match &self.peek().token_type {
            TokenType::Rem(_) => {
                self.advance();
                Ok(AstNode::Noop)
            }
            TokenType::Let => {
                self.advance();
                self.assignment()
            }
            TokenType::Identifier(_)
                if matches!(self.peek_next(), Some(Token { token_type: TokenType::Eq, .. })) =>
            {
                self.assignment()
            }
            TokenType::If => self.nested("block", Self::if_statement),
            TokenType::While => self.nested("block", Self::while_statement),
            TokenType::For => self.nested("block", Self::for_statement),
            reserved if reserved.is_reserved() => {
                let token = self.peek();
                syntax_error!(
                    format!("{} is reserved and has no statement form", token.token_type),
                    token.line,
                    self.source_line(token.line)
                )
            }
            TokenType::Then
            | TokenType::ElseIf
            | TokenType::Else
            | TokenType::End
            | TokenType::To
            | TokenType::Step
            | TokenType::Next
            | TokenType::Do
            | TokenType::Wend => self.unexpected("a statement"),
            _ => self.expression(),
        }
    }

    fn identifier(&mut self, expected: &str) -> Result<String> {
        match &self.peek().token_type {
            TokenType::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => self.unexpected(expected),
        }
    }

    fn assignment(&mut self) -> Result<AstNode> {
        let name = self.identifier("a variable name")?;
        self.consume(&TokenType::Eq, "'=' after the variable name")?;
        let expression = self.expression()?;

        Ok(AstNode::assignment(AstNode::symbol(name), expression))
    }

    fn if_statement(&mut self) -> Result<AstNode> {
        self.consume(&TokenType::If, "IF")?;
        let condition = self.expression()?;
        self.consume(&TokenType::Then, "THEN after the IF condition")?;
        let then_branch = self.statement_list(ends_if_branch)?;
        let else_branch = self.else_tail()?;
        self.consume(&TokenType::End, "END IF")?;
        self.consume(&TokenType::If, "IF after END")?;

        Ok(AstNode::If {
            condition: Box::new(condition),
            then_branch,
            else_branch: Box::new(else_branch),
        })
    }

    fn else_tail(&mut self) -> Result<AstNode> {
        if self.match_token(&TokenType::ElseIf) {
            let condition = self.expression()?;
            self.consume(&TokenType::Then, "THEN after the ELSEIF condition")?;
            let then_branch = self.statement_list(ends_if_branch)?;
            let else_branch = self.else_tail()?;

            Ok(AstNode::If {
                condition: Box::new(condition),
                then_branch,
                else_branch: Box::new(else_branch),
            })
        } else if self.match_token(&TokenType::Else) {
            let statements = self.statement_list(|t| matches!(t, TokenType::End))?;
            Ok(AstNode::Statements(statements))
        } else {
            Ok(AstNode::Noop)
        }
    }

    fn while_statement(&mut self) -> Result<AstNode> {
        self.consume(&TokenType::While, "WHILE")?;
        let condition = self.expression()?;
        self.match_token(&TokenType::Do);
        let body = self.statement_list(|t| matches!(t, TokenType::Wend))?;
        self.consume(&TokenType::Wend, "WEND to close WHILE")?;

        Ok(AstNode::While {
            condition: Box::new(condition),
            body,
        })
    }

    fn for_statement(&mut self) -> Result<AstNode> {
        self.consume(&TokenType::For, "FOR")?;
        let name = self.identifier("a loop variable after FOR")?;
        self.consume(&TokenType::Eq, "'=' after the loop variable")?;
        let start = self.expression()?;
        self.consume(&TokenType::To, "TO")?;
        let end = self.expression()?;
        let step = if self.match_token(&TokenType::Step) {
            self.expression()?
        } else {
            AstNode::constant(1)
        };
        let body = self.statement_list(|t| matches!(t, TokenType::Next))?;
        let next_line = self.consume(&TokenType::Next, "NEXT to close FOR")?.line;
        self.skip_next_variable(&name, next_line);

        Ok(AstNode::for_loop(name, start, end, step, body))
    }

    /// Accepts the optional `NEXT i` spelling when it names the loop variable
    /// on the same line and is not the start of an assignment.
    fn skip_next_variable(&mut self, name: &str, next_line: usize) {
        let names_loop_variable = matches!(
            &self.peek().token_type,
            TokenType::Identifier(ident) if ident == name
        ) && self.peek().line == next_line;
        let starts_assignment = matches!(self.peek_next(), Some(Token { token_type: TokenType::Eq, .. }));

        if names_loop_variable && !starts_assignment {
            self.advance();
        }
    }

    fn expression(&mut self) -> Result<AstNode> {
        self.binary(0)
    }

    /// Precedence climbing: only operators binding tighter than
    /// `min_precedence` are folded into the current operand.
    fn binary(&mut self, min_precedence: u8) -> Result<AstNode> {
        let mut left = self.unary()?;
        let mut height = self.height;

        while let Some(operator) = Operator::from_token(&self.peek().token_type) {
            if operator.precedence() <= min_precedence {
                break;
            }
            self.advance();
            let right = self.binary(operator.precedence())?;
            height = height.max(self.height) + 1;
            if height > MAX_EXPRESSION_HEIGHT {
                return self.too_deep("expression", MAX_EXPRESSION_HEIGHT);
            }
            left = AstNode::operation(left, operator, right);

            let chained = Operator::from_token(&self.peek().token_type)
                .is_some_and(|next| next.precedence() == operator.precedence());
            if chained && operator.associativity() == Associativity::NonAssoc {
                return self.unexpected("an operator other than a comparison; comparisons do not chain");
            }
        }

        self.height = height;
        Ok(left)
    }

    // NOT and unary minus both desugar to one extra operation node.
    fn unary(&mut self) -> Result<AstNode> {
        self.nested("expression", |parser| {
            if parser.match_token(&TokenType::Not) {
                let operand = parser.binary(NOT_PRECEDENCE)?;
                parser.height += 1;
                Ok(AstNode::not(operand))
            } else if parser.match_token(&TokenType::Minus) {
                let operand = parser.unary()?;
                parser.height += 1;
                Ok(AstNode::negate(operand))
            } else {
                parser.primary()
            }
        })
    }

    fn primary(&mut self) -> Result<AstNode> {
        match &self.peek().token_type {
            TokenType::Number(value) => {
                let value = *value;
                self.advance();
                self.height = 1;
                Ok(AstNode::constant(value))
            }
            TokenType::Identifier(name) => {
                let name = name.clone();
                self.advance();
                self.height = 1;
                Ok(AstNode::symbol(name))
            }
            TokenType::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(&TokenType::RParen, "')' to close the parenthesis")?;
                Ok(expr)
            }
            _ => self.unexpected("an expression"),
        }
    }
}

fn ends_if_branch(token_type: &TokenType) -> bool {
    matches!(token_type, TokenType::ElseIf | TokenType::Else | TokenType::End)
}

/// Tokenizes and parses one block.
///
/// Lexical diagnostics are logged and otherwise dropped; use
/// [`crate::Interpreter::run`] to receive them.
pub fn parse(input: &str) -> Result<AstNode> {
    let mut lexer = Lexer::new(input);
    let tokens = lexer.tokenize();
    for diagnostic in lexer.diagnostics() {
        debug!("{}", diagnostic.report());
    }
    debug!("tokenized {} tokens", tokens.len());

    let mut parser = Parser::with_lines(tokens, lexer.lines().to_vec());

    match parser.parse() {
        Ok(ast) => Ok(ast),
        Err(e) => {
            debug!("parse failed: {}", e);
            Err(e)
        }
    }
}
