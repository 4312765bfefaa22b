use std::{collections::VecDeque, fmt::Formatter};

use crate::runtime::Value::{InfiniteListValue, IntValue, ListValue, RealValue};

/// Absolute tolerance used whenever a real takes part in an equality test.
pub const EPS: f64 = 1.0 / (1u64 << 30) as f64;

/// How many terms of an infinite list are shown when it is rendered.
pub const INFINITE_PREVIEW: usize = 8;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    IntValue(i64),
    RealValue(f64),
    ListValue(VecDeque<Value>),
    /// The arithmetic progression `first, first + step, ...`.
    InfiniteListValue { first: f64, step: f64 },
}

/// A numeric operand after stripping the list cases away.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Real(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Real(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(v) => v == 0,
            Number::Real(v) => v == 0.0,
        }
    }

    /// Applies `int` when both operands are ints, `real` otherwise.
    pub fn combine(
        self,
        rhs: Number,
        int: fn(i64, i64) -> i64,
        real: fn(f64, f64) -> f64,
    ) -> Value {
        match (self, rhs) {
            (Number::Int(lhs), Number::Int(rhs)) => IntValue(int(lhs, rhs)),
            (lhs, rhs) => RealValue(real(lhs.as_f64(), rhs.as_f64())),
        }
    }
}

fn approx_eq(lhs: f64, rhs: f64) -> bool {
    (lhs - rhs).abs() < EPS
}

impl Value {
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Value {
        ListValue(items.into_iter().collect())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            IntValue(_) => "int",
            RealValue(_) => "real",
            ListValue(_) => "list",
            InfiniteListValue { .. } => "infinite list",
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            IntValue(v) => Some(Number::Int(*v)),
            RealValue(v) => Some(Number::Real(*v)),
            _ => None,
        }
    }

    /// Nonzero numbers, nonempty lists and every infinite list are true.
    pub fn truthy(&self) -> bool {
        match self {
            IntValue(v) => *v != 0,
            RealValue(v) => *v != 0.0,
            ListValue(items) => !items.is_empty(),
            InfiniteListValue { .. } => true,
        }
    }

    /// The `index`-th term of an infinite list, computed on demand.
    pub fn term(first: f64, step: f64, index: usize) -> f64 {
        first + index as f64 * step
    }

    /// Equality as seen by the language's `eq`: numbers compare across
    /// int/real within [`EPS`], and a one-element list equals its element.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (IntValue(lhs), IntValue(rhs)) => lhs == rhs,
            (RealValue(lhs), RealValue(rhs)) => approx_eq(*lhs, *rhs),
            (IntValue(i), RealValue(r)) | (RealValue(r), IntValue(i)) => approx_eq(*i as f64, *r),
            (ListValue(lhs), ListValue(rhs)) => {
                lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(l, r)| l.structural_eq(r))
            }
            (
                InfiniteListValue {
                    first: lhs_first,
                    step: lhs_step,
                },
                InfiniteListValue {
                    first: rhs_first,
                    step: rhs_step,
                },
            ) => approx_eq(*lhs_first, *rhs_first) && approx_eq(*lhs_step, *rhs_step),
            (InfiniteListValue { .. }, _) | (_, InfiniteListValue { .. }) => false,
            (ListValue(items), scalar) | (scalar, ListValue(items)) => match items.front() {
                Some(only) if items.len() == 1 => only.structural_eq(scalar),
                _ => false,
            },
        }
    }
}

fn write_real(f: &mut Formatter<'_>, v: f64) -> std::fmt::Result {
    let text = v.to_string();
    if v.is_finite() && !text.contains('.') {
        write!(f, "{}.0", text)
    } else {
        write!(f, "{}", text)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IntValue(v) => write!(f, "{}", v),
            RealValue(v) => write_real(f, *v),
            ListValue(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            InfiniteListValue { first, step } => {
                write!(f, "[")?;
                for idx in 0..INFINITE_PREVIEW {
                    write_real(f, Value::term(*first, *step, idx))?;
                    write!(f, " ")?;
                }
                write!(f, "...]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Number, Value, Value::*, EPS};
    use pretty_assertions::assert_eq;

    fn ints(items: &[i64]) -> Value {
        Value::list(items.iter().map(|i| IntValue(*i)))
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(IntValue(-12).to_string(), "-12");
        assert_eq!(RealValue(3.0).to_string(), "3.0");
        assert_eq!(RealValue(0.25).to_string(), "0.25");
        assert_eq!(RealValue(-1.5).to_string(), "-1.5");
    }

    #[test]
    fn test_render_lists() {
        assert_eq!(ints(&[]).to_string(), "[]");
        assert_eq!(ints(&[1, 2, 3]).to_string(), "[1 2 3]");
        assert_eq!(
            Value::list(vec![ints(&[1]), RealValue(2.5), ints(&[])]).to_string(),
            "[[1] 2.5 []]"
        );
    }

    #[test]
    fn test_render_infinite_list() {
        let v = InfiniteListValue {
            first: 5.0,
            step: 0.5,
        };
        assert_eq!(v.to_string(), "[5.0 5.5 6.0 6.5 7.0 7.5 8.0 8.5 ...]");
    }

    #[test]
    fn test_numeric_equality() {
        assert!(IntValue(3).structural_eq(&IntValue(3)));
        assert!(!IntValue(3).structural_eq(&IntValue(4)));
        assert!(RealValue(0.1 + 0.2).structural_eq(&RealValue(0.3)));
        assert!(IntValue(1).structural_eq(&RealValue(1.0 + EPS / 2.0)));
        assert!(!IntValue(1).structural_eq(&RealValue(1.0000001)));
    }

    #[test]
    fn test_tolerance_is_strict() {
        assert!(!RealValue(0.0).structural_eq(&RealValue(EPS)));
        assert!(RealValue(0.0).structural_eq(&RealValue(EPS * 0.999)));
    }

    #[test]
    fn test_list_equality() {
        assert!(ints(&[1, 2]).structural_eq(&ints(&[1, 2])));
        assert!(!ints(&[1, 2]).structural_eq(&ints(&[1])));
        assert!(ints(&[]).structural_eq(&ints(&[])));
        assert!(Value::list(vec![RealValue(1.0)]).structural_eq(&ints(&[1])));
    }

    #[test]
    fn test_singleton_list_equals_scalar() {
        assert!(ints(&[7]).structural_eq(&IntValue(7)));
        assert!(IntValue(7).structural_eq(&ints(&[7])));
        assert!(!ints(&[7, 7]).structural_eq(&IntValue(7)));
        assert!(!ints(&[]).structural_eq(&IntValue(0)));
    }

    #[test]
    fn test_infinite_equality() {
        let a = InfiniteListValue {
            first: 1.0,
            step: 2.0,
        };
        let b = InfiniteListValue {
            first: 1.0,
            step: 2.0,
        };
        let c = InfiniteListValue {
            first: 1.0,
            step: 3.0,
        };
        assert!(a.structural_eq(&b));
        assert!(!a.structural_eq(&c));
        assert!(!a.structural_eq(&IntValue(1)));
        assert!(!ints(&[1]).structural_eq(&a));
    }

    #[test]
    fn test_truthiness() {
        assert!(IntValue(-1).truthy());
        assert!(!IntValue(0).truthy());
        assert!(!RealValue(0.0).truthy());
        assert!(ints(&[0]).truthy());
        assert!(!ints(&[]).truthy());
        assert!(InfiniteListValue {
            first: 0.0,
            step: 0.0
        }
        .truthy());
    }

    #[test]
    fn test_number_combine() {
        let add = |a: Number, b: Number| a.combine(b, i64::wrapping_add, |x, y| x + y);
        assert_eq!(add(Number::Int(1), Number::Int(2)), IntValue(3));
        assert_eq!(add(Number::Int(1), Number::Real(2.0)), RealValue(3.0));
        assert_eq!(add(Number::Real(0.5), Number::Int(2)), RealValue(2.5));
    }
}
