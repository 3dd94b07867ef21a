#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CombinatoricsError {
    #[error("cannot evaluate power set of size {size} (limit is {limit})")]
    #[diagnostic(
        code(quantor::values::capacity_exceeded),
        help("raise `powerset_limit` in the engine configuration or shrink the domain")
    )]
    CapacityExceeded { size: usize, limit: usize },

    #[error("interrupted power set of size {size}")]
    #[diagnostic(code(quantor::values::cancelled))]
    Cancelled { size: usize },
}
