use crate::runtime::Context;

pub struct Builtins {}

impl Builtins {
    pub fn init(ctx: &Context) {
        prelude_ffi::entrance()
            .into_iter()
            .chain(list_ffi::entrance())
            .chain(math_ffi::entrance())
            .for_each(|closure| {
                ctx.ffi(closure);
            });
    }
}

mod prelude_ffi {
    use tracing::warn;

    use crate::{
        ffi::*,
        runtime::{eval::Frame, RuntimeError, Value, Value::IntValue},
    };

    pub(super) fn entrance() -> Vec<FFIClosure> {
        vec![
            FFIClosure::new("eq", 2, eq),
            FFIClosure::new("le", 2, le),
            FFIClosure::new("nand", 2, nand),
            FFIClosure::new("if", 3, if_),
            FFIClosure::new("read", 0, read),
            FFIClosure::new("write", 1, write),
        ]
    }

    fn flag(b: bool) -> FFIResult {
        Ok(IntValue(b as i64))
    }

    fn eq(frame: &Frame<'_>) -> FFIResult {
        let lhs = frame.nth(0)?;
        let rhs = frame.nth(1)?;
        flag(lhs.structural_eq(&rhs))
    }

    // Strictly less than, on two numbers of the same kind.
    fn le(frame: &Frame<'_>) -> FFIResult {
        let lhs = frame.nth(0)?;
        let rhs = frame.nth(1)?;
        match (&lhs, &rhs) {
            (Value::IntValue(l), Value::IntValue(r)) => flag(l < r),
            (Value::RealValue(l), Value::RealValue(r)) => flag(l < r),
            _ => Err(RuntimeError::TypeMismatch {
                op: "le",
                expected: "two numbers of the same type",
                got: match lhs.as_number() {
                    Some(_) => rhs.type_name(),
                    None => lhs.type_name(),
                },
            }),
        }
    }

    fn nand(frame: &Frame<'_>) -> FFIResult {
        if !frame.nth(0)?.truthy() {
            return flag(true);
        }
        flag(!frame.nth(1)?.truthy())
    }

    fn if_(frame: &Frame<'_>) -> FFIResult {
        match frame.nth(0)?.truthy() {
            true => frame.nth(1),
            false => frame.nth(2),
        }
    }

    fn read(frame: &Frame<'_>) -> FFIResult {
        let line = frame.context().read_line("> read(): ")?;
        scan_number(line.trim()).ok_or(RuntimeError::MalformedInput(line))
    }

    // Never fails: any error while rendering or printing yields 1.
    fn write(frame: &Frame<'_>) -> FFIResult {
        let text = match frame.nth(0) {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!("write() could not evaluate its operand: {}", e);
                return flag(true);
            }
        };

        match frame.context().write_line(&text) {
            Ok(()) => flag(false),
            Err(e) => {
                warn!("write() failed: {}", e);
                flag(true)
            }
        }
    }

    /// Reads an optional sign, a digit run and an optional fraction from the
    /// start of `text`; anything after the number is ignored.
    pub(super) fn scan_number(text: &str) -> Option<Value> {
        let bytes = text.as_bytes();
        let digits_from = |start: usize| {
            bytes[start..]
                .iter()
                .position(|b| !b.is_ascii_digit())
                .map_or(bytes.len(), |len| start + len)
        };

        let sign = match bytes.first() {
            Some(b'+') | Some(b'-') => 1,
            _ => 0,
        };
        let int_end = digits_from(sign);
        if int_end == sign {
            return None;
        }

        match bytes.get(int_end) {
            Some(b'.') => {
                let end = digits_from(int_end + 1);
                text[..end].parse::<f64>().ok().map(Value::RealValue)
            }
            _ => text[..int_end].parse::<i64>().ok().map(Value::IntValue),
        }
    }
}

mod list_ffi {
    use std::collections::VecDeque;

    use crate::{
        ffi::*,
        runtime::{
            eval::{Eval, Frame},
            Number, RuntimeError,
            Value::{self, InfiniteListValue, IntValue, ListValue, RealValue},
        },
        syntax::tree::Expr::ListExpr,
    };

    pub(super) fn entrance() -> Vec<FFIClosure> {
        vec![
            FFIClosure::new("length", 1, length),
            FFIClosure::new("head", 1, head),
            FFIClosure::new("tail", 1, tail),
            FFIClosure::new("concat", 2, concat),
            FFIClosure::new("list", 1, list_from),
            FFIClosure::new("list", 2, list_step),
            FFIClosure::new("list", 3, list_take),
        ]
    }

    fn length(frame: &Frame<'_>) -> FFIResult {
        match frame.nth(0)? {
            ListValue(items) => Ok(IntValue(items.len() as i64)),
            InfiniteListValue { .. } => Err(RuntimeError::UndefinedOnInfinite("length")),
            other => Err(RuntimeError::TypeMismatch {
                op: "length",
                expected: "a list",
                got: other.type_name(),
            }),
        }
    }

    // A list literal argument is not evaluated as a whole: only its first
    // element is forced.
    fn head(frame: &Frame<'_>) -> FFIResult {
        let (arg, caller) = frame.raw_nth(0)?;
        if let ListExpr(exprs) = arg {
            return match exprs.first() {
                Some(first) => first.eval_in(caller),
                None => Err(RuntimeError::EmptyListHead),
            };
        }

        match arg.eval_in(caller)? {
            ListValue(mut items) => items.pop_front().ok_or(RuntimeError::EmptyListHead),
            InfiniteListValue { first, .. } => Ok(RealValue(first)),
            other => Err(RuntimeError::TypeMismatch {
                op: "head",
                expected: "a list",
                got: other.type_name(),
            }),
        }
    }

    // A list literal argument never has its first element evaluated.
    fn tail(frame: &Frame<'_>) -> FFIResult {
        let (arg, caller) = frame.raw_nth(0)?;
        if let ListExpr(exprs) = arg {
            return exprs.get(1..).unwrap_or(&[]).eval_in(caller);
        }

        match arg.eval_in(caller)? {
            ListValue(mut items) => {
                items.pop_front();
                Ok(ListValue(items))
            }
            InfiniteListValue { first, step } => Ok(InfiniteListValue {
                first: first + step,
                step,
            }),
            other => Err(RuntimeError::TypeMismatch {
                op: "tail",
                expected: "a list",
                got: other.type_name(),
            }),
        }
    }

    /// Extends the first list's storage in place with the second's
    /// elements and returns it.
    fn concat(frame: &Frame<'_>) -> FFIResult {
        let mut lhs: VecDeque<Value> = frame.nth_as(0, "concat")?;
        let mut rhs: VecDeque<Value> = frame.nth_as(1, "concat")?;
        lhs.append(&mut rhs);
        Ok(ListValue(lhs))
    }

    fn list_from(frame: &Frame<'_>) -> FFIResult {
        let first: Number = frame.nth_as(0, "list")?;
        Ok(InfiniteListValue {
            first: first.as_f64(),
            step: 1.0,
        })
    }

    fn list_step(frame: &Frame<'_>) -> FFIResult {
        let first: Number = frame.nth_as(0, "list")?;
        let step: Number = frame.nth_as(1, "list")?;
        Ok(InfiniteListValue {
            first: first.as_f64(),
            step: step.as_f64(),
        })
    }

    fn list_take(frame: &Frame<'_>) -> FFIResult {
        let first: Number = frame.nth_as(0, "list")?;
        let step: Number = frame.nth_as(1, "list")?;
        let count: i64 = frame.nth_as(2, "list")?;

        let terms = (0..count.max(0)).map(|idx| match (first, step) {
            (Number::Int(first), Number::Int(step)) => {
                IntValue(first.wrapping_add(step.wrapping_mul(idx)))
            }
            _ => RealValue(Value::term(first.as_f64(), step.as_f64(), idx as usize)),
        });
        Ok(Value::list(terms))
    }
}

mod math_ffi {
    use crate::{
        ffi::*,
        runtime::{
            eval::Frame,
            Number, RuntimeError,
            Value::{IntValue, RealValue},
        },
    };

    pub(super) fn entrance() -> Vec<FFIClosure> {
        vec![
            FFIClosure::new("int", 1, int),
            FFIClosure::new("add", 2, add),
            FFIClosure::new("sub", 2, sub),
            FFIClosure::new("mul", 2, mul),
            FFIClosure::new("div", 2, div),
            FFIClosure::new("mod", 2, mod_),
            FFIClosure::new("sqrt", 1, sqrt),
        ]
    }

    fn operands(frame: &Frame<'_>, op: &'static str) -> Result<(Number, Number), RuntimeError> {
        Ok((frame.nth_as(0, op)?, frame.nth_as(1, op)?))
    }

    fn int(frame: &Frame<'_>) -> FFIResult {
        match frame.nth_as::<Number>(0, "int")? {
            Number::Int(v) => Ok(IntValue(v)),
            Number::Real(v) => Ok(IntValue(v.trunc() as i64)),
        }
    }

    fn add(frame: &Frame<'_>) -> FFIResult {
        let (lhs, rhs) = operands(frame, "add")?;
        Ok(lhs.combine(rhs, i64::wrapping_add, |l, r| l + r))
    }

    fn sub(frame: &Frame<'_>) -> FFIResult {
        let (lhs, rhs) = operands(frame, "sub")?;
        Ok(lhs.combine(rhs, i64::wrapping_sub, |l, r| l - r))
    }

    fn mul(frame: &Frame<'_>) -> FFIResult {
        let (lhs, rhs) = operands(frame, "mul")?;
        Ok(lhs.combine(rhs, i64::wrapping_mul, |l, r| l * r))
    }

    // The zero test is exact and happens before any coercion.
    fn div(frame: &Frame<'_>) -> FFIResult {
        let (lhs, rhs) = operands(frame, "div")?;
        if rhs.is_zero() {
            return Err(RuntimeError::DivisionByZero("div"));
        }
        Ok(lhs.combine(rhs, i64::wrapping_div, |l, r| l / r))
    }

    fn mod_(frame: &Frame<'_>) -> FFIResult {
        let lhs: i64 = frame.nth_as(0, "mod")?;
        let rhs: i64 = frame.nth_as(1, "mod")?;
        if rhs == 0 {
            return Err(RuntimeError::DivisionByZero("mod"));
        }
        Ok(IntValue(lhs.wrapping_rem(rhs)))
    }

    fn sqrt(frame: &Frame<'_>) -> FFIResult {
        let operand: Number = frame.nth_as(0, "sqrt")?;
        Ok(RealValue(operand.as_f64().sqrt()))
    }
}
