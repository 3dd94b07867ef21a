use std::fmt;

use quantor_values::{Interrupter, Value};

use crate::binding::Binding;
use crate::config::EngineConfig;
use crate::context::{Context, Frame};
use crate::error::QuantError;

/// Frames recorded while a universal quantification was false, innermost
/// quantifier first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterexamplePath {
    frames: Vec<Frame>,
}

impl CounterexamplePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Drops every frame past the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Every binding on the path, flattened in recording order.
    pub fn bindings(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.frames
            .iter()
            .flat_map(|f| f.iter().map(|(n, v)| (n.to_string(), v.to_string())))
    }
}

impl fmt::Display for CounterexamplePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for frame in &self.frames {
            if frame.is_empty() {
                continue;
            }
            write!(f, "{sep}{frame}")?;
            sep = ", ";
        }
        Ok(())
    }
}

/// Per-evaluation state threaded through quantifier evaluation and into
/// predicates: configuration, the interruption controller and the optional
/// counterexample sink.
pub struct EvalCx<'s> {
    config: EngineConfig,
    interrupter: Interrupter,
    sink: Option<&'s mut CounterexamplePath>,
}

impl fmt::Debug for EvalCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalCx")
            .field("config", &self.config)
            .field("interrupter", &self.interrupter)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Default for EvalCx<'_> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<'s> EvalCx<'s> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            interrupter: Interrupter::detached(),
            sink: None,
        }
    }

    pub fn with_interrupter(mut self, interrupter: Interrupter) -> Self {
        self.interrupter = interrupter;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn interrupter(&self) -> &Interrupter {
        &self.interrupter
    }

    /// Installs (or with `None`, withdraws) the counterexample sink, returning
    /// the previous one.
    pub fn set_counterexample_sink(
        &mut self,
        sink: Option<&'s mut CounterexamplePath>,
    ) -> Option<&'s mut CounterexamplePath> {
        std::mem::replace(&mut self.sink, sink)
    }

    pub fn counterexample_sink(&mut self) -> Option<&mut CounterexamplePath> {
        self.sink.as_deref_mut()
    }
}

/// The external expression evaluator, as seen by the quantifier machinery.
///
/// Implementations must produce a `Value::Bool` or fail; anything else is
/// reported as [`QuantError::PredicateNotBoolean`].
pub trait Predicate {
    fn evaluate(&self, env: &Context<'_>, cx: &mut EvalCx<'_>) -> Result<Value, QuantError>;

    /// Every binding reachable inside this expression, outermost first.
    ///
    /// Host expressions that embed quantifications should forward to them so
    /// that checkers can range nested binds.
    fn all_bindings(&self) -> Vec<&Binding> {
        Vec::new()
    }

    fn all_bindings_mut(&mut self) -> Vec<&mut Binding> {
        Vec::new()
    }
}

impl<P: Predicate + ?Sized> Predicate for Box<P> {
    fn evaluate(&self, env: &Context<'_>, cx: &mut EvalCx<'_>) -> Result<Value, QuantError> {
        (**self).evaluate(env, cx)
    }

    fn all_bindings(&self) -> Vec<&Binding> {
        (**self).all_bindings()
    }

    fn all_bindings_mut(&mut self) -> Vec<&mut Binding> {
        (**self).all_bindings_mut()
    }
}

/// Shared references can be read but never overridden through.
impl<P: Predicate + ?Sized> Predicate for &P {
    fn evaluate(&self, env: &Context<'_>, cx: &mut EvalCx<'_>) -> Result<Value, QuantError> {
        (**self).evaluate(env, cx)
    }

    fn all_bindings(&self) -> Vec<&Binding> {
        (**self).all_bindings()
    }
}

/// Adapter turning a closure into a [`Predicate`]; see [`from_fn`].
#[derive(Clone)]
pub struct FnPredicate<F>(F);

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Context<'_>, &mut EvalCx<'_>) -> Result<Value, QuantError>,
{
    fn evaluate(&self, env: &Context<'_>, cx: &mut EvalCx<'_>) -> Result<Value, QuantError> {
        (self.0)(env, cx)
    }
}

pub fn from_fn<F>(f: F) -> FnPredicate<F>
where
    F: Fn(&Context<'_>, &mut EvalCx<'_>) -> Result<Value, QuantError>,
{
    FnPredicate(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_display_flattens_frames() {
        let mut path = CounterexamplePath::new();
        path.push(Frame::from_iter([("y", Value::Int(20))]));
        path.push(Frame::from_iter([("x", Value::Int(1))]));
        assert_eq!(path.to_string(), "y = 20, x = 1");
        assert_eq!(path.bindings().count(), 2);
    }

    #[test]
    fn sink_can_be_swapped_out() {
        let mut first = CounterexamplePath::new();
        {
            let mut cx = EvalCx::default();
            assert!(cx.set_counterexample_sink(Some(&mut first)).is_none());
            if let Some(sink) = cx.counterexample_sink() {
                sink.push(Frame::from_iter([("x", Value::Int(1))]));
            }
            assert!(cx.set_counterexample_sink(None).is_some());
            assert!(cx.counterexample_sink().is_none());
        }
        assert_eq!(first.len(), 1);
    }
}
