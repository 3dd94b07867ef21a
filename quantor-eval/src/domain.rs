use std::fmt;
use std::sync::Arc;

use quantor_values::{Value, ValueSet, power_set_value};

use crate::context::{Context, Name};
use crate::error::QuantError;
use crate::evaluation::EvalCx;

pub type ComputeFn =
    Arc<dyn Fn(&Context<'_>, &mut EvalCx<'_>) -> Result<Value, QuantError> + Send + Sync>;

/// The right-hand side of a binding: an expression producing the domain.
#[derive(Clone)]
pub enum DomainExpr {
    Value(Value),
    Name(Name),
    /// `{lo, ..., hi}`, empty when `lo > hi`.
    Range { lo: i64, hi: i64 },
    Power(Box<DomainExpr>),
    Dom(Box<DomainExpr>),
    Rng(Box<DomainExpr>),
    /// A type; never enumerable by itself.
    Type(String),
    /// Evaluated by the host interpreter.
    Computed { label: String, eval: ComputeFn },
}

impl DomainExpr {
    pub fn name(name: impl Into<Name>) -> Self {
        DomainExpr::Name(name.into())
    }

    pub fn power(inner: DomainExpr) -> Self {
        DomainExpr::Power(Box::new(inner))
    }

    pub fn computed<F>(label: impl Into<String>, eval: F) -> Self
    where
        F: Fn(&Context<'_>, &mut EvalCx<'_>) -> Result<Value, QuantError> + Send + Sync + 'static,
    {
        DomainExpr::Computed {
            label: label.into(),
            eval: Arc::new(eval),
        }
    }

    /// Evaluates the domain in `env`.
    ///
    /// `Ok(None)` means a referenced name was unbound and `allow_unresolved`
    /// let it through; callers treat that as an empty domain.
    pub fn resolve(
        &self,
        env: &Context<'_>,
        cx: &mut EvalCx<'_>,
        allow_unresolved: bool,
    ) -> Result<Option<Value>, QuantError> {
        match self {
            DomainExpr::Value(v) => Ok(Some(v.clone())),
            DomainExpr::Name(name) => match env.lookup(name.as_str()) {
                Some(v) => Ok(Some(v.clone())),
                None if allow_unresolved => {
                    log::debug!("unresolved domain `{name}` treated as empty");
                    Ok(None)
                }
                None => Err(QuantError::UnresolvedName { name: name.clone() }),
            },
            DomainExpr::Range { lo, hi } => {
                let values = if lo <= hi {
                    (*lo..=*hi).map(Value::Int).collect()
                } else {
                    Vec::new()
                };
                Ok(Some(Value::Set(ValueSet::from_distinct(values))))
            }
            DomainExpr::Power(inner) => {
                let Some(v) = inner.resolve(env, cx, allow_unresolved)? else {
                    return Ok(None);
                };
                let set = expect_set(inner, &v)?;
                let limit = cx.config().powerset_limit;
                Ok(Some(power_set_value(set, limit, cx.interrupter())?))
            }
            DomainExpr::Dom(inner) | DomainExpr::Rng(inner) => {
                let Some(v) = inner.resolve(env, cx, allow_unresolved)? else {
                    return Ok(None);
                };
                let Value::Map(map) = &v else {
                    return Err(QuantError::DomainNotEnumerable {
                        domain: inner.to_string(),
                        found: v.kind(),
                    });
                };
                let set = if matches!(self, DomainExpr::Dom(_)) {
                    map.dom()
                } else {
                    map.rng()
                };
                Ok(Some(Value::Set(set)))
            }
            DomainExpr::Type(t) => Err(QuantError::DomainNotEnumerable {
                domain: t.clone(),
                found: "type",
            }),
            DomainExpr::Computed { eval, .. } => (**eval)(env, cx).map(Some),
        }
    }
}

fn expect_set<'v>(expr: &DomainExpr, v: &'v Value) -> Result<&'v ValueSet, QuantError> {
    v.as_set().ok_or_else(|| QuantError::DomainNotEnumerable {
        domain: expr.to_string(),
        found: v.kind(),
    })
}

impl From<Value> for DomainExpr {
    fn from(v: Value) -> Self {
        DomainExpr::Value(v)
    }
}

impl fmt::Display for DomainExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainExpr::Value(v) => write!(f, "{v}"),
            DomainExpr::Name(n) => write!(f, "{n}"),
            DomainExpr::Range { lo, hi } => write!(f, "{{{lo}, ..., {hi}}}"),
            DomainExpr::Power(inner) => write!(f, "power {inner}"),
            DomainExpr::Dom(inner) => write!(f, "dom {inner}"),
            DomainExpr::Rng(inner) => write!(f, "rng {inner}"),
            DomainExpr::Type(t) => f.write_str(t),
            DomainExpr::Computed { label, .. } => f.write_str(label),
        }
    }
}

impl fmt::Debug for DomainExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainExpr::Computed { label, .. } => {
                f.debug_struct("Computed").field("label", label).finish()
            }
            other => write!(f, "DomainExpr({other})"),
        }
    }
}
