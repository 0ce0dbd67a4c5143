use std::io::Write;
use log::{debug, trace};
use crate::language::ast::{AstNode, Factor};
use crate::language::error::{Error, ErrorKind, Result};
use crate::language::operators::Operator;
use crate::runtime_error;
use super::context::VariableStore;
use super::evaluator::Evaluator;
use super::value::Value;

/// Executes statements, mutating the store and writing the value of every
/// expression statement to `out`.
pub struct Executor<'a> {
    context: &'a mut VariableStore,
    out: &'a mut dyn Write,
}

impl<'a> Executor<'a> {
    pub fn new(context: &'a mut VariableStore, out: &'a mut dyn Write) -> Self {
        Executor { context, out }
    }

    /// Runs one node. Expression nodes return their value; statements return `None`.
    pub fn execute(&mut self, node: &AstNode) -> Result<Option<Value>> {
        match node {
            AstNode::Factor(_) | AstNode::Operation { .. } => self.evaluate(node).map(Some),
            AstNode::Assignment { target, expression } => {
                self.execute_assignment(target, expression)?;
                Ok(None)
            }
            AstNode::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_block(then_branch)?;
                } else {
                    self.execute(else_branch)?;
                }
                Ok(None)
            }
            AstNode::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute_block(body)?;
                }
                Ok(None)
            }
            AstNode::For { variable, init, end, step, body } => {
                self.execute_for(variable, init, end, step, body)?;
                Ok(None)
            }
            AstNode::Statements(statements) => {
                self.execute_block(statements)?;
                Ok(None)
            }
            AstNode::Function { name, body } => {
                debug!("executing {} with {} statements", name, body.len());
                self.execute_block(body)?;
                Ok(None)
            }
            AstNode::Noop => Ok(None),
        }
    }

    fn evaluate(&self, expr: &AstNode) -> Result<Value> {
        Evaluator::new(&*self.context).evaluate(expr)
    }

    /// Runs statements in order, printing each produced value on its own line.
    fn execute_block(&mut self, statements: &[AstNode]) -> Result<()> {
        for statement in statements {
            if let Some(value) = self.execute(statement)? {
                writeln!(self.out, "{}", value).map_err(|e| Error {
                    kind: ErrorKind::Output,
                    message: format!("failed to write output: {}", e),
                    line: None,
                    source_line: None,
                })?;
            }
        }
        Ok(())
    }

    fn execute_assignment(&mut self, target: &AstNode, expression: &AstNode) -> Result<()> {
        let name = match target.as_factor() {
            Some(Factor::Symbol(name)) => name,
            _ => {
                return runtime_error!(
                    AssignToConstant,
                    format!("cannot assign to constant {}", target)
                );
            }
        };
        let value = self.evaluate(expression)?;
        trace!("{} := {}", name, value);
        self.context.set_variable(name, value);
        Ok(())
    }

    /// Bounds and step are re-read on every pass; the loop stops once the
    /// variable has moved past `end` in the direction of `step`.
    fn execute_for(
        &mut self,
        variable: &Factor,
        init: &AstNode,
        end: &AstNode,
        step: &AstNode,
        body: &[AstNode],
    ) -> Result<()> {
        let name = match variable.symbol_name() {
            Some(name) => name,
            None => {
                return runtime_error!(AssignToConstant, format!("cannot use constant {} as a loop variable", variable));
            }
        };
        let counter = AstNode::Factor(variable.clone());

        self.execute(init)?;
        loop {
            let step_value = self.evaluate(step)?;
            let ascending = step_value.compare(Operator::Gt, Value::Int(0));
            let descending = step_value.compare(Operator::Lt, Value::Int(0));
            if !ascending && !descending {
                return runtime_error!(ZeroStep, format!("FOR {} has a step of zero", name));
            }

            let end_value = self.evaluate(end)?;
            let current = self.evaluate(&counter)?;
            if (ascending && current.compare(Operator::Gt, end_value))
                || (descending && current.compare(Operator::Lt, end_value))
            {
                break;
            }

            self.execute_block(body)?;

            let current = self.evaluate(&counter)?;
            let next = match current.apply(Operator::Add, self.evaluate(step)?) {
                Ok(next) => next,
                // The exact sum lies outside i64, so it is past any integer bound.
                Err(e) if e.kind == ErrorKind::Overflow => {
                    if let Value::Real(_) = self.evaluate(end)? {
                        return Err(e);
                    }
                    break;
                }
                Err(e) => return Err(e),
            };
            self.context.set_variable(name, next);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(node: &AstNode, store: &mut VariableStore) -> (Result<Option<Value>>, String) {
        let mut out = Vec::new();
        let result = Executor::new(store, &mut out).execute(node);
        (result, String::from_utf8_lossy(&out).into_owned())
    }

    fn assign(name: &str, value: AstNode) -> AstNode {
        AstNode::assignment(AstNode::symbol(name), value)
    }

    #[test]
    fn statements_run_in_order_and_print_values() {
        let mut store = VariableStore::new();
        let node = AstNode::Statements(vec![
            assign("a", AstNode::constant(1)),
            AstNode::symbol("a"),
            assign("a", AstNode::constant(2)),
            AstNode::symbol("a"),
        ]);
        let (result, out) = run(&node, &mut store);
        assert_eq!(result, Ok(None));
        assert_eq!(out, "1\n2\n");
    }

    #[test]
    fn expression_returns_its_value_without_printing() {
        let mut store = VariableStore::new();
        let (result, out) = run(&AstNode::constant(4), &mut store);
        assert_eq!(result, Ok(Some(Value::Int(4))));
        assert!(out.is_empty());
    }

    #[test]
    fn assignment_to_constant_fails_before_evaluating() {
        let mut store = VariableStore::new();
        let node = AstNode::assignment(AstNode::constant(5), AstNode::symbol("missing"));
        let (result, _) = run(&node, &mut store);
        assert_eq!(result.unwrap_err().kind, ErrorKind::AssignToConstant);
    }

    #[test]
    fn if_takes_else_branch_when_falsy() {
        let mut store = VariableStore::new();
        let node = AstNode::If {
            condition: Box::new(AstNode::constant(0)),
            then_branch: vec![assign("r", AstNode::constant(1))],
            else_branch: Box::new(AstNode::Statements(vec![assign("r", AstNode::constant(2))])),
        };
        run(&node, &mut store).0.unwrap();
        assert_eq!(store.get_variable("r"), Some(Value::Int(2)));
    }

    #[test]
    fn for_loop_counts_up_with_step() {
        let mut store = VariableStore::new();
        let node = AstNode::for_loop(
            "i",
            AstNode::constant(1),
            AstNode::constant(5),
            AstNode::constant(2),
            vec![AstNode::symbol("i")],
        );
        let (result, out) = run(&node, &mut store);
        assert_eq!(result, Ok(None));
        assert_eq!(out, "1\n3\n5\n");
        assert_eq!(store.get_variable("i"), Some(Value::Int(7)));
    }

    #[test]
    fn for_loop_counts_down() {
        let mut store = VariableStore::new();
        let node = AstNode::for_loop(
            "i",
            AstNode::constant(5),
            AstNode::constant(1),
            AstNode::negate(AstNode::constant(1)),
            vec![AstNode::symbol("i")],
        );
        let (_, out) = run(&node, &mut store);
        assert_eq!(out, "5\n4\n3\n2\n1\n");
    }

    #[test]
    fn for_loop_ends_at_the_integer_limits() {
        let mut store = VariableStore::new();
        let node = AstNode::for_loop(
            "i",
            AstNode::constant(i64::MAX - 1),
            AstNode::constant(i64::MAX),
            AstNode::constant(1),
            vec![AstNode::symbol("i")],
        );
        let (result, out) = run(&node, &mut store);
        assert_eq!(result, Ok(None));
        assert_eq!(out, "9223372036854775806\n9223372036854775807\n");
        assert_eq!(store.get_variable("i"), Some(Value::Int(i64::MAX)));

        let node = AstNode::for_loop(
            "j",
            AstNode::constant(i64::MIN + 1),
            AstNode::constant(i64::MIN),
            AstNode::negate(AstNode::constant(1)),
            vec![],
        );
        assert_eq!(run(&node, &mut store).0, Ok(None));
        assert_eq!(store.get_variable("j"), Some(Value::Int(i64::MIN)));
    }

    #[test]
    fn for_loop_overflow_below_a_real_bound_fails() {
        let mut store = VariableStore::new();
        let real_end = AstNode::operation(AstNode::constant(i64::MAX), Operator::Div, AstNode::constant(1));
        let node = AstNode::for_loop("i", AstNode::constant(i64::MAX), real_end, AstNode::constant(1), vec![]);
        let (result, _) = run(&node, &mut store);
        assert_eq!(result.unwrap_err().kind, ErrorKind::Overflow);
    }

    #[test]
    fn zero_step_fails_on_first_check() {
        let mut store = VariableStore::new();
        let node = AstNode::for_loop(
            "i",
            AstNode::constant(1),
            AstNode::constant(3),
            AstNode::constant(0),
            vec![AstNode::symbol("i")],
        );
        let (result, out) = run(&node, &mut store);
        assert_eq!(result.unwrap_err().kind, ErrorKind::ZeroStep);
        assert!(out.is_empty());
        assert_eq!(store.get_variable("i"), Some(Value::Int(1)));
    }

    #[test]
    fn while_reevaluates_condition() {
        let mut store = VariableStore::new();
        store.set_variable("n", Value::Int(3));
        let node = AstNode::While {
            condition: Box::new(AstNode::operation(AstNode::symbol("n"), Operator::Gt, AstNode::constant(0))),
            body: vec![
                AstNode::symbol("n"),
                assign("n", AstNode::operation(AstNode::symbol("n"), Operator::Sub, AstNode::constant(1))),
            ],
        };
        let (_, out) = run(&node, &mut store);
        assert_eq!(out, "3\n2\n1\n");
    }

    #[test]
    fn failure_keeps_earlier_mutations() {
        let mut store = VariableStore::new();
        let node = AstNode::Statements(vec![
            assign("a", AstNode::constant(1)),
            AstNode::symbol("nope"),
            assign("b", AstNode::constant(2)),
        ]);
        let (result, _) = run(&node, &mut store);
        assert_eq!(result.unwrap_err().kind, ErrorKind::UndefinedSymbol);
        assert!(store.has_variable("a"));
        assert!(!store.has_variable("b"));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_surface_as_output_errors() {
        let mut store = VariableStore::new();
        let mut out = Broken;
        let node = AstNode::main(vec![AstNode::constant(1)]);
        let err = Executor::new(&mut store, &mut out).execute(&node).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Output);
    }
}
