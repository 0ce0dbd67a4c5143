use std::fmt;
use serde::Serialize;
use crate::language::token::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Add,        // +
    Sub,        // -
    Mul,        // *
    Div,        // /
    Lt,         // <
    Le,         // <=
    Gt,         // >
    Ge,         // >=
    Eq,         // =
    Ne,         // !=
    And,        // AND
    Or,         // OR
    Xor,        // XOR
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    NonAssoc,
}

/// Binding power of `NOT`; its operand is parsed above this level.
pub const NOT_PRECEDENCE: u8 = 3;

impl Operator {
    pub fn from_token(token_type: &TokenType) -> Option<Operator> {
        let operator = match token_type {
            TokenType::Plus => Operator::Add,
            TokenType::Minus => Operator::Sub,
            TokenType::Times => Operator::Mul,
            TokenType::Divide => Operator::Div,
            TokenType::Lt => Operator::Lt,
            TokenType::Le => Operator::Le,
            TokenType::Gt => Operator::Gt,
            TokenType::Ge => Operator::Ge,
            TokenType::Eq => Operator::Eq,
            TokenType::Ne => Operator::Ne,
            TokenType::And => Operator::And,
            TokenType::Or => Operator::Or,
            TokenType::Xor => Operator::Xor,
            _ => return None,
        };
        Some(operator)
    }

    /// Lowest to highest: OR, AND, (NOT), relational, additive, multiplicative.
    ///
    /// `XOR` shares the `OR` level since it only appears through `NOT`
    /// desugaring or as an explicit infix operator.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Or | Operator::Xor => 1,
            Operator::And => 2,
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge | Operator::Eq | Operator::Ne => 4,
            Operator::Add | Operator::Sub => 5,
            Operator::Mul | Operator::Div => 6,
        }
    }

    pub fn associativity(self) -> Associativity {
        if self.is_relational() {
            Associativity::NonAssoc
        } else {
            Associativity::Left
        }
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge | Operator::Eq | Operator::Ne
        )
    }

    /// `AND` and `OR` may skip their right operand.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Xor => "XOR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_ladder() {
        assert!(Operator::Or.precedence() < Operator::And.precedence());
        assert!(Operator::And.precedence() < NOT_PRECEDENCE);
        assert!(NOT_PRECEDENCE < Operator::Lt.precedence());
        assert!(Operator::Eq.precedence() < Operator::Add.precedence());
        assert!(Operator::Sub.precedence() < Operator::Div.precedence());
    }

    #[test]
    fn only_relations_are_non_associative() {
        assert_eq!(Operator::Ne.associativity(), Associativity::NonAssoc);
        assert_eq!(Operator::Sub.associativity(), Associativity::Left);
        assert_eq!(Operator::Or.associativity(), Associativity::Left);
    }

    #[test]
    fn maps_tokens_to_operators() {
        assert_eq!(Operator::from_token(&TokenType::Le), Some(Operator::Le));
        assert_eq!(Operator::from_token(&TokenType::Xor), Some(Operator::Xor));
        assert_eq!(Operator::from_token(&TokenType::Not), None);
        assert_eq!(Operator::from_token(&TokenType::LParen), None);
    }

    #[test]
    fn symbols_match_source_spelling() {
        assert_eq!(Operator::Ne.to_string(), "!=");
        assert_eq!(Operator::And.to_string(), "AND");
    }
}
