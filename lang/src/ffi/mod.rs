use crate::{
    runtime::{eval::Frame, value::Number, RuntimeError, Value},
    syntax::tree::Argc,
};
use std::{
    collections::VecDeque,
    fmt::{Debug, Formatter},
};

pub type FFIResult = Result<Value, RuntimeError>;
pub type FFIFn = fn(&Frame<'_>) -> FFIResult;

/// A built-in implemented in Rust. It receives the callee frame and pulls
/// its operands through [`Frame::nth`], so unused operands are never
/// evaluated.
#[derive(Copy, Clone)]
pub struct FFIClosure {
    pub name: &'static str,
    pub argc: Argc,
    pub closure: FFIFn,
}

impl FFIClosure {
    pub fn new(name: &'static str, argc: Argc, closure: FFIFn) -> Self {
        Self {
            name,
            argc,
            closure,
        }
    }

    pub fn call(&self, frame: &Frame<'_>) -> FFIResult {
        (self.closure)(frame)
    }
}

impl Debug for FFIClosure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native {}/{}>", self.name, self.argc)
    }
}

impl PartialEq for FFIClosure {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.argc == other.argc
    }
}

/// Operand conversion used by built-ins; `EXPECTED` names the accepted
/// shape in type errors.
pub trait FromValue
where
    Self: Sized,
{
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Number {
    const EXPECTED: &'static str = "a number";

    fn from_value(value: Value) -> Option<Self> {
        value.as_number()
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "an int";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::IntValue(v) => Some(v),
            _ => None,
        }
    }
}

impl FromValue for VecDeque<Value> {
    const EXPECTED: &'static str = "a finite list";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::ListValue(items) => Some(items),
            _ => None,
        }
    }
}

impl<'a> Frame<'a> {
    /// Evaluates the `index`-th argument and converts it, reporting a
    /// type mismatch against `op` on failure.
    pub fn nth_as<T: FromValue>(&self, index: usize, op: &'static str) -> Result<T, RuntimeError> {
        let value = self.nth(index)?;
        let got = value.type_name();
        T::from_value(value).ok_or(RuntimeError::TypeMismatch {
            op,
            expected: T::EXPECTED,
            got,
        })
    }
}
