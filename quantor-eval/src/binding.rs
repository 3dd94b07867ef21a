use std::fmt;

use quantor_values::{Value, ValueSet};

use crate::context::Context;
use crate::domain::DomainExpr;
use crate::error::QuantError;
use crate::evaluation::EvalCx;
use crate::pattern::Pattern;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindKind {
    /// `p in set S`
    Set,
    /// `p in seq S`
    Seq,
    /// `p : T`
    Type,
}

/// One or more patterns drawing values from a shared domain, as in
/// `a, b in set S`.
///
/// The domain can be overridden with a concrete set for one evaluation; the
/// override holds until [`Binding::clear_override`].
#[derive(Clone, Debug)]
pub struct Binding {
    patterns: Vec<Pattern>,
    kind: BindKind,
    domain: DomainExpr,
    override_values: Option<ValueSet>,
}

impl Binding {
    pub fn new(patterns: Vec<Pattern>, kind: BindKind, domain: DomainExpr) -> Self {
        Self {
            patterns,
            kind,
            domain,
            override_values: None,
        }
    }

    pub fn set(patterns: Vec<Pattern>, domain: impl Into<DomainExpr>) -> Self {
        Self::new(patterns, BindKind::Set, domain.into())
    }

    pub fn seq(patterns: Vec<Pattern>, domain: impl Into<DomainExpr>) -> Self {
        Self::new(patterns, BindKind::Seq, domain.into())
    }

    pub fn typed(patterns: Vec<Pattern>, type_name: impl Into<String>) -> Self {
        Self::new(patterns, BindKind::Type, DomainExpr::Type(type_name.into()))
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn kind(&self) -> BindKind {
        self.kind
    }

    pub fn domain(&self) -> &DomainExpr {
        &self.domain
    }

    pub fn override_domain(&mut self, values: ValueSet) {
        self.override_values = Some(values);
    }

    pub fn clear_override(&mut self) {
        self.override_values = None;
    }

    pub fn overridden(&self) -> Option<&ValueSet> {
        self.override_values.as_ref()
    }

    /// The values this binding ranges over, in enumeration order.
    ///
    /// An override wins over the domain expression. Sequence domains keep
    /// their duplicates.
    pub fn resolve_values(
        &self,
        env: &Context<'_>,
        cx: &mut EvalCx<'_>,
        allow_unresolved: bool,
    ) -> Result<Vec<Value>, QuantError> {
        if let Some(values) = &self.override_values {
            return Ok(values.values().to_vec());
        }
        let Some(value) = self.domain.resolve(env, cx, allow_unresolved)? else {
            return Ok(Vec::new());
        };
        match (self.kind, value) {
            (BindKind::Set, Value::Set(set)) => Ok(set.into_vec()),
            (BindKind::Seq, Value::Seq(items)) => Ok(items),
            (_, other) => Err(QuantError::DomainNotEnumerable {
                domain: self.domain.to_string(),
                found: other.kind(),
            }),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.patterns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        match self.kind {
            BindKind::Set => write!(f, " in set {}", self.domain),
            BindKind::Seq => write!(f, " in seq {}", self.domain),
            BindKind::Type => write!(f, " : {}", self.domain),
        }
    }
}
