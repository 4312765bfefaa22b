use crate::ffi::FFIClosure;

pub type Ident = String;

pub type DBI = usize;
pub type Argc = DBI;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntExpr(i64),
    RealExpr(f64),
    /// A parameter citation `#N`, resolved positionally against the
    /// arguments of the innermost application.
    ParamExpr(DBI),
    ListExpr(Vec<Expr>),
    /// `name -> body`. Evaluating it registers `body` under
    /// `(name, body.arity())` instead of evaluating the body.
    DefineExpr(Ident, Box<Expr>),
    ApplyExpr(Ident, Vec<Expr>),
    NativeExpr(FFIClosure),
}

impl Expr {
    /// Number of arguments this expression needs: one more than the
    /// highest parameter index it cites.
    pub fn arity(&self) -> Argc {
        match self {
            Expr::IntExpr(_) | Expr::RealExpr(_) => 0,
            Expr::ParamExpr(dbi) => dbi.saturating_add(1),
            Expr::ListExpr(exprs) | Expr::ApplyExpr(_, exprs) => {
                exprs.iter().map(Expr::arity).max().unwrap_or(0)
            }
            Expr::DefineExpr(_, body) => body.arity(),
            Expr::NativeExpr(closure) => closure.argc,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::parse::LfParser;

    fn arity(input: &str) -> usize {
        LfParser::ast(input).unwrap().arity()
    }

    #[test]
    fn test_literal_arity() {
        assert_eq!(arity("1"), 0);
        assert_eq!(arity("2.5"), 0);
        assert_eq!(arity("[]"), 0);
    }

    #[test]
    fn test_param_arity() {
        assert_eq!(arity("#0"), 1);
        assert_eq!(arity("#3"), 4);
    }

    #[test]
    fn test_nested_arity() {
        assert_eq!(arity("add(#0, [1 #2 mul(#1, 3)])"), 3);
        assert_eq!(arity("f -> if(#0, #1, #0)"), 2);
        assert_eq!(arity("five -> 5"), 0);
    }
}
