use std::collections::VecDeque;

use crate::{
    runtime::{
        Context, RuntimeError,
        RuntimeError::ArgumentIndexOutOfRange,
        Value,
        Value::{IntValue, ListValue, RealValue},
    },
    syntax::tree::{
        Argc, Expr,
        Expr::{ApplyExpr, DefineExpr, IntExpr, ListExpr, NativeExpr, ParamExpr, RealExpr},
    },
};

pub trait Eval {
    fn eval_in(&self, frame: &Frame<'_>) -> Result<Value, RuntimeError>;
}

impl<T: Eval + ?Sized> Eval for Box<T> {
    fn eval_in(&self, frame: &Frame<'_>) -> Result<Value, RuntimeError> {
        (**self).eval_in(frame)
    }
}

impl Eval for [Expr] {
    fn eval_in(&self, frame: &Frame<'_>) -> Result<Value, RuntimeError> {
        self.iter()
            .map(|expr| expr.eval_in(frame))
            .collect::<Result<VecDeque<_>, _>>()
            .map(ListValue)
    }
}

impl Eval for Expr {
    fn eval_in(&self, frame: &Frame<'_>) -> Result<Value, RuntimeError> {
        match self {
            IntExpr(v) => Ok(IntValue(*v)),
            RealExpr(v) => Ok(RealValue(*v)),
            ParamExpr(dbi) => frame.nth(*dbi),
            ListExpr(exprs) => exprs.eval_in(frame),
            DefineExpr(name, body) => {
                let ctx = frame.context();
                let replaced = ctx.define(name, body.arity(), (**body).clone());
                Ok(IntValue(replaced as i64))
            }
            ApplyExpr(name, args) => {
                let callee = Frame::new(frame.context(), frame, args);
                frame.context().call(name, &callee)
            }
            NativeExpr(closure) => closure.call(frame),
        }
    }
}

/// One live function application. Arguments stay unevaluated; each
/// citation re-evaluates the argument expression in the caller's frame.
pub struct Frame<'a> {
    ctx: &'a Context,
    caller: Option<&'a Frame<'a>>,
    args: &'a [Expr],
}

impl<'a> Frame<'a> {
    pub fn top_level(ctx: &'a Context) -> Frame<'a> {
        Frame {
            ctx,
            caller: None,
            args: &[],
        }
    }

    pub fn new(ctx: &'a Context, caller: &'a Frame<'a>, args: &'a [Expr]) -> Frame<'a> {
        Frame {
            ctx,
            caller: Some(caller),
            args,
        }
    }

    pub fn context(&self) -> &'a Context {
        self.ctx
    }

    pub fn argc(&self) -> Argc {
        self.args.len()
    }

    /// The `index`-th argument expression together with the frame it must
    /// be evaluated in, without evaluating it.
    pub fn raw_nth(&self, index: usize) -> Result<(&'a Expr, &'a Frame<'a>), RuntimeError> {
        match (self.args.get(index), self.caller) {
            (Some(expr), Some(caller)) => Ok((expr, caller)),
            _ => Err(ArgumentIndexOutOfRange {
                index,
                argc: self.argc(),
            }),
        }
    }

    pub fn nth(&self, index: usize) -> Result<Value, RuntimeError> {
        let (expr, caller) = self.raw_nth(index)?;
        expr.eval_in(caller)
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        console::BufferConsole,
        Context, RuntimeError,
        Value::{self, *},
    };
    use pretty_assertions::assert_eq;

    fn context() -> (Context, BufferConsole) {
        let console = BufferConsole::new();
        let ctx = Context::with_console(Box::new(console.clone()));
        ctx.load_builtins();
        (ctx, console)
    }

    fn run(ctx: &Context, line: &str) -> Value {
        ctx.run(line).unwrap()
    }

    #[test]
    fn test_definition_returns_redefinition_flag() {
        let (ctx, _) = context();
        assert_eq!(run(&ctx, "f -> add(#0, 1)"), IntValue(0));
        assert_eq!(run(&ctx, "f(1)"), IntValue(2));
        assert_eq!(run(&ctx, "f -> mul(#0, 10)"), IntValue(1));
        assert_eq!(run(&ctx, "f(1)"), IntValue(10));
    }

    #[test]
    fn test_arity_overloads_coexist() {
        let (ctx, _) = context();
        assert_eq!(run(&ctx, "f -> #0"), IntValue(0));
        assert_eq!(run(&ctx, "f -> add(#0, #1)"), IntValue(0));
        assert_eq!(run(&ctx, "f(1)"), IntValue(1));
        assert_eq!(run(&ctx, "f(1, 2)"), IntValue(3));
    }

    #[test]
    fn test_nullary_function() {
        let (ctx, _) = context();
        run(&ctx, "five -> 5");
        assert_eq!(run(&ctx, "five()"), IntValue(5));
    }

    #[test]
    fn test_parameter_out_of_range() {
        let (ctx, _) = context();
        assert_eq!(
            ctx.source(&crate::syntax::tree::Expr::ParamExpr(0)),
            Err(RuntimeError::ArgumentIndexOutOfRange { index: 0, argc: 0 })
        );
        run(&ctx, "g -> #1");
        assert!(ctx.run("g(1)").is_err());
        assert_eq!(run(&ctx, "g(1, 2)"), IntValue(2));
    }

    #[test]
    fn test_arguments_are_passed_by_name() {
        let (ctx, console) = context();
        run(&ctx, "twice -> [#0 #0]");
        assert_eq!(
            run(&ctx, "twice(write(7))"),
            Value::list(vec![IntValue(0), IntValue(0)])
        );
        assert_eq!(console.output(), vec!["7", "7"]);
    }

    #[test]
    fn test_unused_arguments_are_never_evaluated() {
        let (ctx, console) = context();
        run(&ctx, "second -> if(0, #0, #1)");
        assert_eq!(run(&ctx, "second(write(1), 2)"), IntValue(2));
        assert!(console.output().is_empty());
        assert_eq!(run(&ctx, "second(undefined_fn(), 3)"), IntValue(3));
    }

    #[test]
    fn test_citations_resolve_in_the_callers_frame() {
        let (ctx, _) = context();
        run(&ctx, "inner -> sub(#0, #1)");
        run(&ctx, "outer -> inner(#1, #0)");
        assert_eq!(run(&ctx, "outer(1, 10)"), IntValue(9));
    }

    #[test]
    fn test_definition_inside_a_body() {
        let (ctx, _) = context();
        run(&ctx, "setup -> helper -> mul(#0, 3)");
        assert_eq!(run(&ctx, "setup(0)"), IntValue(0));
        assert_eq!(run(&ctx, "helper(4)"), IntValue(12));
    }

    #[test]
    fn test_failed_line_leaves_table_untouched() {
        let (ctx, _) = context();
        assert!(ctx.run("broken -> add(1,").is_err());
        assert!(!ctx.is_defined("broken", 0));
        assert!(ctx.run("div(1, 0)").is_err());
        assert_eq!(run(&ctx, "add(1, 1)"), IntValue(2));
    }

    #[test]
    fn test_recursion() {
        let (ctx, _) = context();
        run(&ctx, "fact -> if(eq(#0, 1), 1, mul(#0, fact(sub(#0, 1))))");
        assert_eq!(run(&ctx, "fact(5)"), IntValue(120));
    }
}
