use std::fmt;
use std::ops::ControlFlow;

use quantor_values::Value;

use crate::binding::Binding;
use crate::context::{Context, Frame};
use crate::error::QuantError;
use crate::evaluation::{EvalCx, Predicate};
use crate::group::QuantifierGroup;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantKind {
    ForAll,
    Exists,
    /// `exists1`: exactly one consistent combination satisfies the predicate.
    ExistsUnique,
}

impl QuantKind {
    pub fn keyword(self) -> &'static str {
        match self {
            QuantKind::ForAll => "forall",
            QuantKind::Exists => "exists",
            QuantKind::ExistsUnique => "exists1",
        }
    }
}

/// `forall`/`exists`/`exists1` over a list of bindings.
///
/// The bindings are owned here so that a checker can override their domains
/// between evaluations.
#[derive(Clone, Debug)]
pub struct QuantifiedExpr<P> {
    kind: QuantKind,
    bindings: Vec<Binding>,
    predicate: P,
}

impl<P: Predicate> QuantifiedExpr<P> {
    pub fn new(kind: QuantKind, bindings: Vec<Binding>, predicate: P) -> Self {
        Self {
            kind,
            bindings,
            predicate,
        }
    }

    pub fn forall(bindings: Vec<Binding>, predicate: P) -> Self {
        Self::new(QuantKind::ForAll, bindings, predicate)
    }

    pub fn exists(bindings: Vec<Binding>, predicate: P) -> Self {
        Self::new(QuantKind::Exists, bindings, predicate)
    }

    pub fn exists_unique(bindings: Vec<Binding>, predicate: P) -> Self {
        Self::new(QuantKind::ExistsUnique, bindings, predicate)
    }

    pub fn kind(&self) -> QuantKind {
        self.kind
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut [Binding] {
        &mut self.bindings
    }

    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    /// Evaluates the quantification in `env`.
    ///
    /// A false universal pushes the failing combination's frame to the
    /// counterexample sink (cleared on entry) before returning, and a true one
    /// leaves the sink empty. Existentials leave the sink as they found it.
    pub fn evaluate(&self, env: &Context<'_>, cx: &mut EvalCx<'_>) -> Result<bool, QuantError> {
        match self.kind {
            QuantKind::ForAll => {
                let mut holds = true;
                self.scan(env, cx, true, |ok, frame, cx| {
                    let sink = cx.counterexample_sink();
                    if ok {
                        // frames pushed by nested universals in a satisfied combination
                        if let Some(sink) = sink {
                            sink.clear();
                        }
                        return ControlFlow::Continue(());
                    }
                    log::debug!("{} counterexample: {frame}", self.kind.keyword());
                    if let Some(sink) = sink {
                        sink.push(frame);
                    }
                    holds = false;
                    ControlFlow::Break(())
                })?;
                if holds {
                    if let Some(sink) = cx.counterexample_sink() {
                        sink.clear();
                    }
                }
                Ok(holds)
            }
            QuantKind::Exists => {
                let mark = sink_len(cx);
                let mut found = false;
                self.scan(env, cx, false, |ok, _, _| {
                    if ok {
                        found = true;
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                })?;
                restore_sink(cx, mark);
                Ok(found)
            }
            QuantKind::ExistsUnique => {
                let mark = sink_len(cx);
                let mut witnesses = 0usize;
                self.scan(env, cx, false, |ok, _, _| {
                    if ok {
                        witnesses += 1;
                    }
                    if witnesses > 1 {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                })?;
                restore_sink(cx, mark);
                Ok(witnesses == 1)
            }
        }
    }

    /// Feeds every consistent combination's predicate result to `visit` until
    /// it breaks or the group is exhausted.
    fn scan<F>(
        &self,
        env: &Context<'_>,
        cx: &mut EvalCx<'_>,
        clear_sink: bool,
        mut visit: F,
    ) -> Result<(), QuantError>
    where
        F: FnMut(bool, Frame, &mut EvalCx<'_>) -> ControlFlow<()>,
    {
        let allow_unresolved = cx.config().allow_unresolved;
        let mut group = QuantifierGroup::from_bindings(&self.bindings);
        group.initialize(env, cx, allow_unresolved)?;

        if clear_sink {
            if let Some(sink) = cx.counterexample_sink() {
                sink.clear();
            }
        }

        let mut visited = 0usize;
        while group.has_next() {
            if cx.interrupter().terminate_requested() {
                log::debug!("{self} interrupted after {visited} combinations");
                return Err(QuantError::Cancelled);
            }
            let combination = group.next()?;
            let Some(frame) = combination.to_frame() else {
                log::trace!("skipping inconsistent combination {combination:?}");
                continue;
            };
            visited += 1;

            let scope = env.extend(self.kind.keyword(), frame);
            let result = self.predicate.evaluate(&scope, cx)?;
            let Some(ok) = result.as_bool() else {
                return Err(QuantError::PredicateNotBoolean {
                    found: result.kind(),
                });
            };
            if visit(ok, scope.into_frame(), cx).is_break() {
                return Ok(());
            }
        }
        log::trace!("{self}: {visited} combinations evaluated");
        Ok(())
    }
}

fn sink_len(cx: &mut EvalCx<'_>) -> Option<usize> {
    cx.counterexample_sink().map(|sink| sink.len())
}

fn restore_sink(cx: &mut EvalCx<'_>, mark: Option<usize>) {
    if let (Some(len), Some(sink)) = (mark, cx.counterexample_sink()) {
        sink.truncate(len);
    }
}

/// Quantifications are themselves predicates, so they nest.
impl<P: Predicate> Predicate for QuantifiedExpr<P> {
    fn evaluate(&self, env: &Context<'_>, cx: &mut EvalCx<'_>) -> Result<Value, QuantError> {
        QuantifiedExpr::evaluate(self, env, cx).map(Value::Bool)
    }

    fn all_bindings(&self) -> Vec<&Binding> {
        let mut out: Vec<&Binding> = self.bindings.iter().collect();
        out.extend(self.predicate.all_bindings());
        out
    }

    fn all_bindings_mut(&mut self) -> Vec<&mut Binding> {
        let mut out: Vec<&mut Binding> = self.bindings.iter_mut().collect();
        out.extend(self.predicate.all_bindings_mut());
        out
    }
}

impl<P> fmt::Display for QuantifiedExpr<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind.keyword())?;
        for (i, b) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{b}")?;
        }
        f.write_str(" & ...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::from_fn;
    use crate::pattern::Pattern;

    fn x_in(xs: &[i64]) -> Vec<Binding> {
        vec![Binding::set(
            vec![Pattern::ident("x")],
            Value::set(xs.iter().map(|&i| Value::Int(i))),
        )]
    }

    fn x_is(n: i64) -> impl Predicate {
        from_fn(move |env: &Context<'_>, _: &mut EvalCx<'_>| {
            Ok(Value::Bool(env.lookup("x") == Some(&Value::Int(n))))
        })
    }

    #[test]
    fn exists_unique_counts_witnesses() {
        let mut cx = EvalCx::default();
        let env = Context::root();
        assert!(QuantifiedExpr::exists_unique(x_in(&[1, 2, 3]), x_is(2)).evaluate(&env, &mut cx).expect("eval"));
        assert!(!QuantifiedExpr::exists_unique(x_in(&[1, 2, 3]), x_is(4)).evaluate(&env, &mut cx).expect("eval"));

        let any = from_fn(|_: &Context<'_>, _: &mut EvalCx<'_>| Ok(Value::Bool(true)));
        assert!(!QuantifiedExpr::exists_unique(x_in(&[1, 2]), any).evaluate(&env, &mut cx).expect("eval"));
    }

    #[test]
    fn non_boolean_predicate_is_rejected() {
        let mut cx = EvalCx::default();
        let p = from_fn(|_: &Context<'_>, _: &mut EvalCx<'_>| Ok(Value::Int(1)));
        let err = QuantifiedExpr::forall(x_in(&[1]), p)
            .evaluate(&Context::root(), &mut cx)
            .expect_err("int");
        assert!(matches!(err, QuantError::PredicateNotBoolean { found: "int" }));
    }

    #[test]
    fn display_lists_bindings() {
        let q = QuantifiedExpr::forall(x_in(&[1, 2]), x_is(1));
        assert_eq!(q.to_string(), "forall x in set {1, 2} & ...");
    }
}
