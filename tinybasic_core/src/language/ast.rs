use std::fmt::{self, Write as _};
use serde::Serialize;
use crate::language::operators::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    ConstantInt,
    Symbol,
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FactorKind::ConstantInt => write!(f, "constant_int"),
            FactorKind::Symbol => write!(f, "symbol"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Constant(i64),
    Symbol(String),
}

impl Factor {
    pub fn kind(&self) -> FactorKind {
        match self {
            Factor::Constant(_) => FactorKind::ConstantInt,
            Factor::Symbol(_) => FactorKind::Symbol,
        }
    }

    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            Factor::Symbol(name) => Some(name),
            Factor::Constant(_) => None,
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Factor::Constant(value) if *value < 0 => write!(f, "(0 - {})", value.unsigned_abs()),
            Factor::Constant(value) => write!(f, "{}", value),
            Factor::Symbol(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AstNode {
    Factor(Factor),
    Operation {
        left: Box<AstNode>,
        operator: Operator,
        right: Box<AstNode>,
    },
    Assignment {
        target: Box<AstNode>,
        expression: Box<AstNode>,
    },
    If {
        condition: Box<AstNode>,
        then_branch: Vec<AstNode>,
        /// Another `If` for `ELSEIF`, `Statements` for `ELSE`, `Noop` when absent.
        else_branch: Box<AstNode>,
    },
    While {
        condition: Box<AstNode>,
        body: Vec<AstNode>,
    },
    For {
        variable: Factor,
        init: Box<AstNode>,
        end: Box<AstNode>,
        step: Box<AstNode>,
        body: Vec<AstNode>,
    },
    Statements(Vec<AstNode>),
    Function {
        name: String,
        body: Vec<AstNode>,
    },
    Noop,
}

impl AstNode {
    pub fn constant(value: i64) -> Self {
        AstNode::Factor(Factor::Constant(value))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        AstNode::Factor(Factor::Symbol(name.into()))
    }

    pub fn operation(left: AstNode, operator: Operator, right: AstNode) -> Self {
        AstNode::Operation {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn assignment(target: AstNode, expression: AstNode) -> Self {
        AstNode::Assignment {
            target: Box::new(target),
            expression: Box::new(expression),
        }
    }

    /// `NOT e` has no node of its own: it is `e XOR 0`.
    pub fn not(operand: AstNode) -> Self {
        AstNode::operation(operand, Operator::Xor, AstNode::constant(0))
    }

    /// Unary minus is `0 - e`.
    pub fn negate(operand: AstNode) -> Self {
        AstNode::operation(AstNode::constant(0), Operator::Sub, operand)
    }

    /// Builds a `FOR` node; the init assignment targets the loop variable.
    pub fn for_loop(name: impl Into<String>, start: AstNode, end: AstNode, step: AstNode, body: Vec<AstNode>) -> Self {
        let variable = Factor::Symbol(name.into());
        AstNode::For {
            init: Box::new(AstNode::assignment(AstNode::Factor(variable.clone()), start)),
            variable,
            end: Box::new(end),
            step: Box::new(step),
            body,
        }
    }

    pub fn main(body: Vec<AstNode>) -> Self {
        AstNode::Function { name: "main".to_string(), body }
    }

    /// Expression nodes produce a value; everything else is a statement.
    pub fn is_expression(&self) -> bool {
        matches!(self, AstNode::Factor(_) | AstNode::Operation { .. })
    }

    pub fn as_factor(&self) -> Option<&Factor> {
        match self {
            AstNode::Factor(factor) => Some(factor),
            _ => None,
        }
    }

    /// Top-level statements of a `Function` or `Statements` node.
    pub fn statements(&self) -> &[AstNode] {
        match self {
            AstNode::Function { body, .. } => body,
            AstNode::Statements(statements) => statements,
            _ => &[],
        }
    }

    /// Indented debug tree, two spaces per level.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn write_tree(&self, out: &mut String, level: usize) {
        let pad = " ".repeat(level * 2);
        match self {
            AstNode::Factor(factor) => {
                let value = match factor {
                    Factor::Constant(value) => value.to_string(),
                    Factor::Symbol(name) => name.clone(),
                };
                let _ = writeln!(out, "{}{}({})", pad, value, factor.kind());
            }
            AstNode::Operation { left, operator, right } => {
                left.write_tree(out, level + 1);
                let _ = writeln!(out, "{}{}", pad, operator);
                right.write_tree(out, level + 1);
            }
            AstNode::Assignment { target, expression } => {
                let name = match target.as_factor() {
                    Some(factor) => factor.to_string(),
                    None => target.to_string(),
                };
                let _ = writeln!(out, "{}{}->", pad, name);
                expression.write_tree(out, level + 1);
            }
            AstNode::If { condition, then_branch, else_branch } => {
                let _ = writeln!(out, "{}IF", pad);
                condition.write_tree(out, level + 1);
                let _ = writeln!(out, "{}THEN", pad);
                write_tree_list(then_branch, out, level + 1);
                if !matches!(**else_branch, AstNode::Noop) {
                    let _ = writeln!(out, "{}ELSE", pad);
                    else_branch.write_tree(out, level + 1);
                }
            }
            AstNode::While { condition, body } => {
                let _ = writeln!(out, "{}WHILE", pad);
                condition.write_tree(out, level + 1);
                let _ = writeln!(out, "{}DO", pad);
                write_tree_list(body, out, level + 1);
            }
            AstNode::For { init, end, step, body, .. } => {
                let _ = writeln!(out, "{}FOR", pad);
                init.write_tree(out, level + 1);
                let _ = writeln!(out, "{}TO", pad);
                end.write_tree(out, level + 1);
                let _ = writeln!(out, "{}STEP", pad);
                step.write_tree(out, level + 1);
                let _ = writeln!(out, "{}DO", pad);
                write_tree_list(body, out, level + 1);
            }
            AstNode::Statements(statements) => write_tree_list(statements, out, level),
            AstNode::Function { name, body } => {
                let _ = writeln!(out, "{}{}", pad, name);
                write_tree_list(body, out, level + 1);
            }
            AstNode::Noop => {
                let _ = writeln!(out, "{}NOOP", pad);
            }
        }
    }

    fn write_source(&self, f: &mut fmt::Formatter, level: usize) -> fmt::Result {
        let pad = "    ".repeat(level);
        match self {
            AstNode::Factor(factor) => write!(f, "{}", factor),
            AstNode::Operation { left, operator, right } => write!(f, "({} {} {})", left, operator, right),
            AstNode::Assignment { target, expression } => {
                writeln!(f, "{}LET {} = {}", pad, target, expression)
            }
            AstNode::If { condition, then_branch, else_branch } => {
                writeln!(f, "{}IF {} THEN", pad, condition)?;
                write_source_list(then_branch, f, level + 1)?;
                write_else_source(else_branch, f, level)?;
                writeln!(f, "{}END IF", pad)
            }
            AstNode::While { condition, body } => {
                writeln!(f, "{}WHILE {}", pad, condition)?;
                write_source_list(body, f, level + 1)?;
                writeln!(f, "{}WEND", pad)
            }
            AstNode::For { variable, init, end, step, body } => {
                let start = match &**init {
                    AstNode::Assignment { expression, .. } => expression.to_string(),
                    other => other.to_string(),
                };
                writeln!(f, "{}FOR {} = {} TO {} STEP {}", pad, variable, start, end, step)?;
                write_source_list(body, f, level + 1)?;
                writeln!(f, "{}NEXT", pad)
            }
            AstNode::Statements(statements) => write_source_list(statements, f, level),
            AstNode::Function { body, .. } => write_source_list(body, f, level),
            AstNode::Noop => writeln!(f, "{}REM", pad),
        }
    }
}

fn write_tree_list(nodes: &[AstNode], out: &mut String, level: usize) {
    for node in nodes {
        node.write_tree(out, level);
    }
}

fn write_source_list(nodes: &[AstNode], f: &mut fmt::Formatter, level: usize) -> fmt::Result {
    for node in nodes {
        if node.is_expression() {
            writeln!(f, "{}{}", "    ".repeat(level), node)?;
        } else {
            node.write_source(f, level)?;
        }
    }
    Ok(())
}

fn write_else_source(node: &AstNode, f: &mut fmt::Formatter, level: usize) -> fmt::Result {
    let pad = "    ".repeat(level);
    match node {
        AstNode::Noop => Ok(()),
        AstNode::If { condition, then_branch, else_branch } => {
            writeln!(f, "{}ELSEIF {} THEN", pad, condition)?;
            write_source_list(then_branch, f, level + 1)?;
            write_else_source(else_branch, f, level)
        }
        AstNode::Statements(statements) => {
            writeln!(f, "{}ELSE", pad)?;
            write_source_list(statements, f, level + 1)
        }
        other => {
            writeln!(f, "{}ELSE", pad)?;
            write_source_list(std::slice::from_ref(other), f, level + 1)
        }
    }
}

/// Renders BASIC source that parses back to an equivalent tree.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_source(f, 0)
    }
}
