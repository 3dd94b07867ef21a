use quantor_values::Value;

use crate::binding::Binding;
use crate::context::{Context, NameValues};
use crate::error::QuantError;
use crate::evaluation::EvalCx;
use crate::pattern::Pattern;

/// Cursor over the matches of one pattern of a [`Binding`].
///
/// Values of the domain that do not match the pattern are dropped when the
/// quantifier is loaded; a value matching in several ways contributes each
/// way in turn.
#[derive(Debug)]
pub struct Quantifier<'b> {
    binding: &'b Binding,
    pattern: &'b Pattern,
    matches: Vec<NameValues>,
    index: usize,
}

impl<'b> Quantifier<'b> {
    pub fn new(binding: &'b Binding, pattern: &'b Pattern) -> Self {
        Self {
            binding,
            pattern,
            matches: Vec::new(),
            index: 0,
        }
    }

    pub fn binding(&self) -> &'b Binding {
        self.binding
    }

    pub fn pattern(&self) -> &'b Pattern {
        self.pattern
    }

    /// Resolves the binding's domain and loads the pattern's matches.
    pub fn initialize(
        &mut self,
        env: &Context<'_>,
        cx: &mut EvalCx<'_>,
        allow_unresolved: bool,
    ) -> Result<(), QuantError> {
        let values = self.binding.resolve_values(env, cx, allow_unresolved)?;
        let all = cx.config().all_possibilities;
        self.load(&values, all);
        Ok(())
    }

    /// Loads matches from already-resolved domain values and rewinds.
    pub fn load(&mut self, values: &[Value], all_possibilities: bool) {
        self.matches = values
            .iter()
            .flat_map(|v| self.pattern.matches(v, all_possibilities))
            .collect();
        self.index = 0;
        log::trace!(
            "quantifier `{}`: {} of {} values match",
            self.pattern,
            self.matches.len(),
            values.len()
        );
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.index < self.matches.len()
    }

    pub fn next(&mut self) -> Result<&NameValues, QuantError> {
        let found = self
            .matches
            .get(self.index)
            .ok_or(QuantError::ExhaustedIterator)?;
        self.index += 1;
        Ok(found)
    }

    pub fn get(&self, index: usize) -> Option<&NameValues> {
        self.matches.get(index)
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_past_the_end_is_an_error() {
        let b = Binding::set(
            vec![Pattern::ident("x")],
            Value::set([Value::Int(1), Value::Int(2)]),
        );
        let mut q = Quantifier::new(&b, &b.patterns()[0]);
        let mut cx = EvalCx::default();
        q.initialize(&Context::root(), &mut cx, false).expect("init");

        assert_eq!(q.len(), 2);
        assert_eq!(q.next().expect("first").get("x"), Some(&Value::Int(1)));
        assert_eq!(q.next().expect("second").get("x"), Some(&Value::Int(2)));
        assert!(!q.has_next());
        assert!(matches!(q.next(), Err(QuantError::ExhaustedIterator)));

        q.reset();
        assert!(q.has_next());
    }

    #[test]
    fn non_matching_values_are_dropped() {
        let b = Binding::set(
            vec![Pattern::Tuple(vec![Pattern::ident("a"), Pattern::ident("b")])],
            Value::set([
                Value::tuple([Value::Int(1), Value::Int(2)]),
                Value::Int(3),
            ]),
        );
        let mut q = Quantifier::new(&b, &b.patterns()[0]);
        let mut cx = EvalCx::default();
        q.initialize(&Context::root(), &mut cx, false).expect("init");
        assert_eq!(q.len(), 1);
    }
}
