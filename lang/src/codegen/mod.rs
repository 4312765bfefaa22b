use crate::syntax::tree::{Argc, Expr};

pub mod lf;

pub trait PartialCodeGenerator {
    type Output;

    fn partial_codegen_expr(&self, expr: &Expr) -> Self::Output;

    /// Renders a stored definition back as `name -> body`.
    fn partial_codegen_definition(&self, name: &str, argc: Argc, body: &Expr) -> Self::Output;
}
