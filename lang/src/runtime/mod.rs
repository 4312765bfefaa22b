use std::{
    cell::RefCell,
    collections::HashMap,
    io,
    rc::Rc,
};

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ffi::FFIClosure,
    runtime::{
        builtins::Builtins,
        console::{Console, StdConsole},
        eval::{Eval, Frame},
    },
    syntax::{
        parse::LfParser,
        tree::{Argc, Expr, Ident, DBI},
    },
    Error as LineError,
};

pub mod builtins;
pub mod console;
pub mod eval;
pub mod value;

pub use value::{Number, Value};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("NameError: function '{name}' taking {argc} argument(s) is not defined")]
    UndefinedFunction { name: Ident, argc: Argc },
    #[error("TypeError: {op}() expects {expected}, but got {got}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    #[error("IndexError: parameter #{index} cited, but only {argc} argument(s) were given")]
    ArgumentIndexOutOfRange { index: DBI, argc: Argc },
    #[error("RuntimeError: head() of an empty list")]
    EmptyListHead,
    #[error("RuntimeError: {0}() is undefined on infinite lists")]
    UndefinedOnInfinite(&'static str),
    #[error("ArithmeticError: division by zero in {0}()")]
    DivisionByZero(&'static str),
    #[error("InputError: '{0}' is not a number")]
    MalformedInput(String),
    #[error("IOError: {0}")]
    Io(String),
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e.to_string())
    }
}

/// Global function table, keyed by name and then by arity.
type Functions = HashMap<Ident, HashMap<Argc, Rc<Expr>>>;

/// Session state shared by every line: the function table and the
/// console used by `read()`/`write()`.
pub struct Context {
    functions: RefCell<Functions>,
    console: RefCell<Box<dyn Console>>,
}

impl Context {
    pub fn new() -> Context {
        Context::with_console(Box::new(StdConsole))
    }

    pub fn with_console(console: Box<dyn Console>) -> Context {
        Context {
            functions: Default::default(),
            console: RefCell::new(console),
        }
    }

    pub fn load_builtins(&self) {
        Builtins::init(self)
    }

    /// Evaluates one top-level expression in a fresh frame without
    /// arguments.
    pub fn source(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        debug!(arity = expr.arity(), "evaluating top-level expression");
        expr.eval_in(&Frame::top_level(self))
    }

    /// Tokenizes, parses and evaluates a single line.
    pub fn run(&self, line: &str) -> Result<Value, LineError> {
        let expr = LfParser::ast(line)?;
        Ok(self.source(&expr)?)
    }

    /// Inserts or replaces `(name, argc)`. Returns `true` on replacement.
    pub fn define(&self, name: &str, argc: Argc, body: Expr) -> bool {
        let replaced = self
            .functions
            .borrow_mut()
            .entry(name.to_owned())
            .or_default()
            .insert(argc, Rc::new(body))
            .is_some();

        debug!(name, argc, replaced, "function defined");
        replaced
    }

    pub fn ffi(&self, closure: FFIClosure) -> bool {
        trace!(name = closure.name, argc = closure.argc, "registering builtin");
        self.define(closure.name, closure.argc, Expr::NativeExpr(closure))
    }

    pub fn is_defined(&self, name: &str, argc: Argc) -> bool {
        self.lookup(name, argc).is_some()
    }

    fn lookup(&self, name: &str, argc: Argc) -> Option<Rc<Expr>> {
        self.functions
            .borrow()
            .get(name)
            .and_then(|overloads| overloads.get(&argc))
            .cloned()
    }

    /// Dispatches on `(name, frame.argc())` and runs the body in `frame`.
    pub fn call(&self, name: &str, frame: &Frame<'_>) -> Result<Value, RuntimeError> {
        let argc = frame.argc();
        trace!(name, argc, "call");

        // The table borrow ends here, so the body may define functions.
        let body = self
            .lookup(name, argc)
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_owned(),
                argc,
            })?;
        body.eval_in(frame)
    }

    /// Every registered function sorted by name, then arity.
    pub fn definitions(&self) -> Vec<(Ident, Argc, Rc<Expr>)> {
        let mut defs: Vec<_> = self
            .functions
            .borrow()
            .iter()
            .flat_map(|(name, overloads)| {
                overloads
                    .iter()
                    .map(move |(argc, body)| (name.clone(), *argc, body.clone()))
            })
            .collect();
        defs.sort_by(|lhs, rhs| (&lhs.0, lhs.1).cmp(&(&rhs.0, rhs.1)));
        defs
    }

    pub fn read_line(&self, prompt: &str) -> Result<String, RuntimeError> {
        Ok(self.console.borrow_mut().read_line(prompt)?)
    }

    pub fn write_line(&self, text: &str) -> io::Result<()> {
        self.console.borrow_mut().write_line(text)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Context, RuntimeError, Value::*};
    use crate::syntax::tree::Expr::{IntExpr, ParamExpr};

    #[test]
    fn test_define_reports_replacement() {
        let ctx = Context::new();
        assert!(!ctx.define("f", 1, ParamExpr(0)));
        assert!(ctx.define("f", 1, IntExpr(2)));
        assert!(!ctx.define("f", 2, ParamExpr(1)));
        assert!(ctx.is_defined("f", 1));
        assert!(ctx.is_defined("f", 2));
        assert!(!ctx.is_defined("f", 0));
    }

    #[test]
    fn test_undefined_function() {
        let ctx = Context::new();
        ctx.define("f", 1, ParamExpr(0));
        assert_eq!(
            ctx.run("f(1, 2)").map_err(|e| e.to_string()),
            Err(RuntimeError::UndefinedFunction {
                name: "f".to_string(),
                argc: 2
            }
            .to_string())
        );
        assert_eq!(ctx.run("f(5)").ok(), Some(IntValue(5)));
    }

    #[test]
    fn test_definitions_are_sorted() {
        let ctx = Context::new();
        ctx.define("g", 0, IntExpr(1));
        ctx.define("f", 2, ParamExpr(1));
        ctx.define("f", 1, ParamExpr(0));
        let listed: Vec<_> = ctx
            .definitions()
            .into_iter()
            .map(|(name, argc, _)| (name, argc))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("f".to_string(), 1),
                ("f".to_string(), 2),
                ("g".to_string(), 0)
            ]
        );
    }

    #[test]
    fn test_builtins_are_registered_by_arity() {
        let ctx = Context::new();
        ctx.load_builtins();
        assert!(ctx.is_defined("list", 1));
        assert!(ctx.is_defined("list", 2));
        assert!(ctx.is_defined("list", 3));
        assert!(!ctx.is_defined("list", 0));
        assert!(ctx.is_defined("read", 0));
        assert!(ctx.is_defined("if", 3));
    }
}
