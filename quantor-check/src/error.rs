#![allow(unused_assignments)]

use miette::Diagnostic;
use quantor_values::CombinatoricsError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CheckError {
    #[error("range for `{bind}` did not evaluate to a set (found {found})")]
    #[diagnostic(code(quantor::check::range_not_a_set))]
    RangeNotASet { bind: String, found: &'static str },

    #[error("PO# {number} unknown. Must be between 1 and {total}")]
    #[diagnostic(code(quantor::check::unknown_obligation))]
    UnknownObligation { number: usize, total: usize },

    #[error("no default range for type `{ty}`")]
    #[diagnostic(
        code(quantor::check::no_default_range),
        help("add an explicit range for this binding")
    )]
    NoDefaultRange { ty: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Combinatorics(#[from] CombinatoricsError),
}
