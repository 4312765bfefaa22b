use thiserror::Error;

use crate::{runtime::RuntimeError, syntax::parse::CompileError};

pub mod codegen;
pub mod ffi;
pub mod runtime;
pub mod syntax;

/// Failure of a whole line: either it did not compile, or evaluating it
/// failed. Both leave the session usable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
