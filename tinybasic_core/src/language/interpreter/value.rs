use std::cmp::Ordering;
use std::fmt;
use crate::language::error::Result;
use crate::language::operators::Operator;
use crate::runtime_error;

/// A runtime value held in the variable store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
}

/// Numeric view of a value; booleans count as 0 and 1.
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Real(f64),
}

impl Number {
    fn as_real(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Real(value) => value,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(value) => value == 0,
            Number::Real(value) => value == 0.0,
        }
    }
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Real(value) => *value != 0.0,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Real(_) => "real",
            Value::Bool(_) => "boolean",
        }
    }

    fn number(self) -> Number {
        match self {
            Value::Int(value) => Number::Int(value),
            Value::Real(value) => Number::Real(value),
            Value::Bool(value) => Number::Int(value as i64),
        }
    }

    /// Applies a binary operator to two evaluated operands. `AND`/`OR` return
    /// whichever operand decides the result; the evaluator only gets here
    /// for them when the right operand was needed.
    pub fn apply(self, operator: Operator, rhs: Value) -> Result<Value> {
        match operator {
            Operator::Add | Operator::Sub | Operator::Mul => self.arithmetic(operator, rhs),
            Operator::Div => self.div(rhs),
            Operator::Xor => self.xor(rhs),
            Operator::And => Ok(if self.is_truthy() { rhs } else { self }),
            Operator::Or => Ok(if self.is_truthy() { self } else { rhs }),
            _ => Ok(Value::Bool(self.compare(operator, rhs))),
        }
    }

    fn arithmetic(self, operator: Operator, rhs: Value) -> Result<Value> {
        match (self.number(), rhs.number()) {
            (Number::Int(a), Number::Int(b)) => {
                let result = match operator {
                    Operator::Add => a.checked_add(b),
                    Operator::Sub => a.checked_sub(b),
                    _ => a.checked_mul(b),
                };
                match result {
                    Some(value) => Ok(Value::Int(value)),
                    None => runtime_error!(Overflow, format!("integer overflow in {} {} {}", a, operator, b)),
                }
            }
            (a, b) => {
                let (a, b) = (a.as_real(), b.as_real());
                let result = match operator {
                    Operator::Add => a + b,
                    Operator::Sub => a - b,
                    _ => a * b,
                };
                Ok(Value::Real(result))
            }
        }
    }

    /// True division; the result is always real.
    pub fn div(self, rhs: Value) -> Result<Value> {
        let divisor = rhs.number();
        if divisor.is_zero() {
            return runtime_error!(DivisionByZero, "division by zero");
        }
        Ok(Value::Real(self.number().as_real() / divisor.as_real()))
    }

    pub fn xor(self, rhs: Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a ^ b)),
            (Value::Real(_), _) | (_, Value::Real(_)) => runtime_error!(
                TypeMismatch,
                format!("XOR needs integer or boolean operands, found {} and {}", self.type_name(), rhs.type_name())
            ),
            _ => match (self.number(), rhs.number()) {
                (Number::Int(a), Number::Int(b)) => Ok(Value::Int(a ^ b)),
                _ => runtime_error!(TypeMismatch, "XOR needs integer or boolean operands"),
            },
        }
    }

    /// Relational comparison across kinds. Unordered reals compare unequal.
    pub fn compare(self, operator: Operator, rhs: Value) -> bool {
        let ordering = match (self.number(), rhs.number()) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_real().partial_cmp(&b.as_real()),
        };
        match ordering {
            Some(ordering) => match operator {
                Operator::Lt => ordering == Ordering::Less,
                Operator::Le => ordering != Ordering::Greater,
                Operator::Gt => ordering == Ordering::Greater,
                Operator::Ge => ordering != Ordering::Less,
                Operator::Eq => ordering == Ordering::Equal,
                Operator::Ne => ordering != Ordering::Equal,
                _ => false,
            },
            None => operator == Operator::Ne,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Real(value) => write!(f, "{}", format_real(*value)),
        }
    }
}

/// Shortest round-trip text for a real, switching to exponent form below
/// 1e-4 and from 1e16 upward. Whole numbers keep a trailing `.0`.
fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let text = format!("{:e}", value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => text,
        };
    }

    let text = format!("{}", value);
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::error::ErrorKind;

    #[test]
    fn truthiness() {
        assert!(Value::Int(-2).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Real(0.0).is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }

    #[test]
    fn integer_arithmetic_stays_integer() {
        assert_eq!(Value::Int(2).apply(Operator::Add, Value::Int(3)), Ok(Value::Int(5)));
        assert_eq!(Value::Int(2).apply(Operator::Sub, Value::Int(3)), Ok(Value::Int(-1)));
        assert_eq!(Value::Int(4).apply(Operator::Mul, Value::Int(3)), Ok(Value::Int(12)));
    }

    #[test]
    fn booleans_count_as_zero_and_one() {
        assert_eq!(Value::Bool(true).apply(Operator::Add, Value::Int(1)), Ok(Value::Int(2)));
        assert_eq!(Value::Bool(true).apply(Operator::Eq, Value::Int(1)), Ok(Value::Bool(true)));
    }

    #[test]
    fn division_is_true_division() {
        assert_eq!(Value::Int(7).div(Value::Int(2)), Ok(Value::Real(3.5)));
        assert_eq!(Value::Int(6).div(Value::Int(3)), Ok(Value::Real(2.0)));
        let err = Value::Int(1).div(Value::Real(0.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        let err = Value::Int(1).div(Value::Bool(false)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn overflow_is_reported() {
        let err = Value::Int(i64::MAX).apply(Operator::Add, Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Overflow);
    }

    #[test]
    fn mixed_arithmetic_promotes_to_real() {
        assert_eq!(Value::Real(0.5).apply(Operator::Add, Value::Int(1)), Ok(Value::Real(1.5)));
        assert_eq!(Value::Real(2.0).apply(Operator::Eq, Value::Int(2)), Ok(Value::Bool(true)));
        assert_eq!(Value::Int(3).apply(Operator::Lt, Value::Real(3.5)), Ok(Value::Bool(true)));
    }

    #[test]
    fn xor_rules() {
        assert_eq!(Value::Bool(true).xor(Value::Bool(true)), Ok(Value::Bool(false)));
        assert_eq!(Value::Int(6).xor(Value::Int(3)), Ok(Value::Int(5)));
        assert_eq!(Value::Bool(true).xor(Value::Int(0)), Ok(Value::Int(1)));
        assert_eq!(Value::Real(1.0).xor(Value::Int(0)).unwrap_err().kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn and_or_pick_an_operand() {
        assert_eq!(Value::Int(3).apply(Operator::And, Value::Int(5)), Ok(Value::Int(5)));
        assert_eq!(Value::Int(0).apply(Operator::And, Value::Int(5)), Ok(Value::Int(0)));
        assert_eq!(Value::Bool(false).apply(Operator::Or, Value::Real(2.5)), Ok(Value::Real(2.5)));
        assert_eq!(Value::Int(4).apply(Operator::Or, Value::Int(0)), Ok(Value::Int(4)));
    }

    #[test]
    fn nan_is_only_unequal() {
        let nan = Value::Real(f64::NAN);
        assert!(!nan.compare(Operator::Eq, nan));
        assert!(!nan.compare(Operator::Le, Value::Int(1)));
        assert!(nan.compare(Operator::Ne, nan));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Bool(false).to_string(), "False");
        assert_eq!(Value::Real(3.5).to_string(), "3.5");
        assert_eq!(Value::Real(2.0).to_string(), "2.0");
        assert_eq!(Value::Real(0.1).to_string(), "0.1");
        assert_eq!(Value::Real(-0.0).to_string(), "-0.0");
        assert_eq!(Value::Real(1e16).to_string(), "1e+16");
        assert_eq!(Value::Real(1.5e-5).to_string(), "1.5e-05");
        assert_eq!(Value::Real(1e100).to_string(), "1e+100");
        assert_eq!(Value::Real(f64::INFINITY).to_string(), "inf");
    }
}
