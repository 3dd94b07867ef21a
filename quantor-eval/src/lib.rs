#![forbid(unsafe_code)]

pub mod binding;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod group;
pub mod pattern;
pub mod quantified;
pub mod quantifier;

pub use binding::{BindKind, Binding};
pub use config::{ConfigError, EngineConfig};
pub use context::{Context, Frame, Name, NameValues};
pub use domain::DomainExpr;
pub use error::{BoxError, QuantError};
pub use evaluation::{CounterexamplePath, EvalCx, FnPredicate, Predicate, from_fn};
pub use group::QuantifierGroup;
pub use pattern::Pattern;
pub use quantified::{QuantKind, QuantifiedExpr};
pub use quantifier::Quantifier;
