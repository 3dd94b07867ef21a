#![allow(unused_assignments)]

use miette::Diagnostic;
use quantor_values::CombinatoricsError;
use thiserror::Error;

use crate::context::Name;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Diagnostic)]
pub enum QuantError {
    #[error("`{domain}` is not enumerable (found {found})")]
    #[diagnostic(code(quantor::eval::domain_not_enumerable))]
    DomainNotEnumerable { domain: String, found: &'static str },

    #[error("name `{name}` has no value")]
    #[diagnostic(code(quantor::eval::unresolved_name))]
    UnresolvedName { name: Name },

    #[error("cannot initialize binding `{binding}`: {source}")]
    #[diagnostic(code(quantor::eval::binding))]
    BindingError {
        binding: String,
        #[source]
        source: Box<QuantError>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Combinatorics(#[from] CombinatoricsError),

    #[error("evaluation interrupted")]
    #[diagnostic(code(quantor::eval::cancelled))]
    Cancelled,

    #[error("predicate returned a {found}, expected a bool")]
    #[diagnostic(code(quantor::eval::predicate_not_boolean))]
    PredicateNotBoolean { found: &'static str },

    #[error(transparent)]
    #[diagnostic(code(quantor::eval::predicate))]
    Predicate(BoxError),

    #[error("quantifier advanced past its last value")]
    #[diagnostic(
        code(quantor::eval::exhausted_iterator),
        help("this is an internal defect, please report it")
    )]
    ExhaustedIterator,
}

impl QuantError {
    /// Wraps an error raised by the external predicate evaluator.
    pub fn predicate(err: impl Into<BoxError>) -> Self {
        QuantError::Predicate(err.into())
    }

    pub(crate) fn binding(binding: String, source: QuantError) -> Self {
        if source.is_cancelled() {
            return QuantError::Cancelled;
        }
        QuantError::BindingError {
            binding,
            source: Box::new(source),
        }
    }

    /// True for interruption requests, however deeply wrapped.
    pub fn is_cancelled(&self) -> bool {
        match self {
            QuantError::Cancelled => true,
            QuantError::Combinatorics(CombinatoricsError::Cancelled { .. }) => true,
            QuantError::BindingError { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}
