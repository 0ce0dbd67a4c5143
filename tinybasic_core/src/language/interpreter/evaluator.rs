use log::trace;
use crate::language::ast::{AstNode, Factor};
use crate::language::error::Result;
use crate::language::operators::Operator;
use crate::runtime_error;
use super::context::VariableStore;
use super::value::Value;

/// Evaluates expression nodes against a read-only view of the store.
pub struct Evaluator<'a> {
    context: &'a VariableStore,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a VariableStore) -> Self {
        Evaluator { context }
    }

    pub fn evaluate(&self, expr: &AstNode) -> Result<Value> {
        trace!("evaluating {:?}", expr);
        match expr {
            AstNode::Factor(factor) => self.evaluate_factor(factor),
            AstNode::Operation { left, operator, right } => self.evaluate_operation(left, *operator, right),
            other => runtime_error!(
                TypeMismatch,
                format!("statement used where a value is expected: {}", other.to_string().trim_end())
            ),
        }
    }

    fn evaluate_factor(&self, factor: &Factor) -> Result<Value> {
        match factor {
            Factor::Constant(value) => Ok(Value::Int(*value)),
            Factor::Symbol(name) => match self.context.get_variable(name) {
                Some(value) => Ok(value),
                None => runtime_error!(UndefinedSymbol, format!("undefined symbol '{}'", name)),
            },
        }
    }

    fn evaluate_operation(&self, left: &AstNode, operator: Operator, right: &AstNode) -> Result<Value> {
        let lhs = self.evaluate(left)?;

        // AND/OR leave the right operand unevaluated once the left decides.
        if operator.is_short_circuit() && lhs.is_truthy() == (operator == Operator::Or) {
            return Ok(lhs);
        }

        let rhs = self.evaluate(right)?;
        let result = lhs.apply(operator, rhs)?;
        trace!("{} {} {} => {}", lhs, operator, rhs, result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::error::ErrorKind;

    fn eval(expr: &AstNode) -> Result<Value> {
        Evaluator::new(&VariableStore::new()).evaluate(expr)
    }

    fn op(a: i64, operator: Operator, b: i64) -> AstNode {
        AstNode::operation(AstNode::constant(a), operator, AstNode::constant(b))
    }

    #[test]
    fn arithmetic_on_constants() {
        assert_eq!(eval(&op(2, Operator::Add, 3)), Ok(Value::Int(5)));
        assert_eq!(eval(&op(2, Operator::Sub, 3)), Ok(Value::Int(-1)));
        assert_eq!(eval(&op(2, Operator::Mul, 3)), Ok(Value::Int(6)));
        assert_eq!(eval(&op(3, Operator::Div, 2)), Ok(Value::Real(1.5)));
    }

    #[test]
    fn relations_yield_booleans() {
        assert_eq!(eval(&op(1, Operator::Lt, 2)), Ok(Value::Bool(true)));
        assert_eq!(eval(&op(2, Operator::Le, 2)), Ok(Value::Bool(true)));
        assert_eq!(eval(&op(1, Operator::Gt, 2)), Ok(Value::Bool(false)));
        assert_eq!(eval(&op(1, Operator::Ge, 2)), Ok(Value::Bool(false)));
        assert_eq!(eval(&op(4, Operator::Eq, 4)), Ok(Value::Bool(true)));
        assert_eq!(eval(&op(4, Operator::Ne, 4)), Ok(Value::Bool(false)));
    }

    #[test]
    fn and_or_return_the_deciding_operand() {
        assert_eq!(eval(&op(0, Operator::And, 5)), Ok(Value::Int(0)));
        assert_eq!(eval(&op(3, Operator::And, 5)), Ok(Value::Int(5)));
        assert_eq!(eval(&op(3, Operator::Or, 0)), Ok(Value::Int(3)));
        assert_eq!(eval(&op(0, Operator::Or, 7)), Ok(Value::Int(7)));
    }

    #[test]
    fn short_circuit_skips_the_right_operand() {
        let guarded = AstNode::operation(AstNode::constant(0), Operator::And, AstNode::symbol("missing"));
        assert_eq!(eval(&guarded), Ok(Value::Int(0)));
        let guarded = AstNode::operation(AstNode::constant(1), Operator::Or, op(1, Operator::Div, 0));
        assert_eq!(eval(&guarded), Ok(Value::Int(1)));
    }

    #[test]
    fn not_is_xor_zero() {
        assert_eq!(eval(&AstNode::not(op(1, Operator::Lt, 2))), Ok(Value::Int(1)));
        assert_eq!(eval(&AstNode::not(AstNode::constant(6))), Ok(Value::Int(6)));
    }

    #[test]
    fn symbols_read_the_store() {
        let mut store = VariableStore::new();
        store.set_variable("x", Value::Int(10));
        let evaluator = Evaluator::new(&store);
        let expr = AstNode::operation(AstNode::symbol("x"), Operator::Mul, AstNode::constant(2));
        assert_eq!(evaluator.evaluate(&expr), Ok(Value::Int(20)));
    }

    #[test]
    fn undefined_symbol_fails() {
        let err = eval(&AstNode::symbol("y")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedSymbol);
        assert_eq!(err.message, "undefined symbol 'y'");
    }

    #[test]
    fn division_by_zero_fails() {
        assert_eq!(eval(&op(1, Operator::Div, 0)).unwrap_err().kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn statements_have_no_value() {
        assert_eq!(eval(&AstNode::Noop).unwrap_err().kind, ErrorKind::TypeMismatch);
    }
}
