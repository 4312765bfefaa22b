use std::fmt::Formatter;

use crate::{
    codegen::PartialCodeGenerator,
    syntax::tree::{
        Argc, Expr,
        Expr::{ApplyExpr, DefineExpr, IntExpr, ListExpr, NativeExpr, ParamExpr, RealExpr},
    },
};

pub struct LfCodeGenerator;

impl LfCodeGenerator {
    pub fn new() -> LfCodeGenerator {
        LfCodeGenerator {}
    }
}

impl PartialCodeGenerator for LfCodeGenerator {
    type Output = String;

    fn partial_codegen_expr(&self, expr: &Expr) -> String {
        expr.codegen_to_lf()
    }

    fn partial_codegen_definition(&self, name: &str, argc: Argc, body: &Expr) -> String {
        match body {
            NativeExpr(_) => format!("{} -> <builtin/{}>", name, argc),
            _ => format!("{} -> {}", name, body.codegen_to_lf()),
        }
    }
}

trait TargetLf {
    fn codegen_to_lf(&self) -> String;
}

impl<T: TargetLf> TargetLf for Box<T> {
    fn codegen_to_lf(&self) -> String {
        (**self).codegen_to_lf()
    }
}

impl TargetLf for f64 {
    fn codegen_to_lf(&self) -> String {
        let text = self.to_string();
        match text.contains('.') {
            true => text,
            false => text + ".0",
        }
    }
}

impl TargetLf for Expr {
    fn codegen_to_lf(&self) -> String {
        match self {
            IntExpr(v) => v.to_string(),
            RealExpr(v) => v.codegen_to_lf(),
            ParamExpr(dbi) => format!("#{}", dbi),
            ListExpr(exprs) => format!(
                "[{}]",
                exprs
                    .iter()
                    .map(|e| e.codegen_to_lf())
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            DefineExpr(name, body) => format!("{} -> {}", name, body.codegen_to_lf()),
            ApplyExpr(name, args) => format!(
                "{}({})",
                name,
                args.iter()
                    .map(|e| e.codegen_to_lf())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            NativeExpr(closure) => format!("<builtin {}/{}>", closure.name, closure.argc),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.codegen_to_lf())
    }
}
