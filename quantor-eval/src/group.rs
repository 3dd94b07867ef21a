use std::collections::{BTreeMap, BTreeSet};

use quantor_values::Value;

use crate::binding::Binding;
use crate::context::{Context, Name, NameValues};
use crate::error::QuantError;
use crate::evaluation::EvalCx;
use crate::quantifier::Quantifier;

/// The quantifiers of one quantification, enumerated as a cross product.
///
/// Combinations come out in lexicographic order with the last quantifier
/// varying fastest. Consistency of shared names is left to the caller.
#[derive(Debug)]
pub struct QuantifierGroup<'b> {
    quantifiers: Vec<Quantifier<'b>>,
    current: Vec<NameValues>,
    done: bool,
    shared: BTreeSet<Name>,
}

impl<'b> QuantifierGroup<'b> {
    /// One quantifier per pattern, in declaration order.
    pub fn from_bindings(bindings: &'b [Binding]) -> Self {
        let quantifiers: Vec<Quantifier<'b>> = bindings
            .iter()
            .flat_map(|b| b.patterns().iter().map(move |p| Quantifier::new(b, p)))
            .collect();

        let mut owners: BTreeMap<Name, usize> = BTreeMap::new();
        for q in &quantifiers {
            for name in q.pattern().names() {
                *owners.entry(name).or_default() += 1;
            }
        }
        let shared = owners
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect();

        Self {
            quantifiers,
            current: Vec::new(),
            done: true,
            shared,
        }
    }

    /// Names bound by more than one quantifier.
    pub fn shared_names(&self) -> &BTreeSet<Name> {
        &self.shared
    }

    pub fn len(&self) -> usize {
        self.quantifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantifiers.is_empty()
    }

    /// Resolves every binding once, in declaration order, and rewinds.
    ///
    /// The first failure is returned, wrapped with the text of the binding
    /// that raised it.
    pub fn initialize(
        &mut self,
        env: &Context<'_>,
        cx: &mut EvalCx<'_>,
        allow_unresolved: bool,
    ) -> Result<(), QuantError> {
        let all = cx.config().all_possibilities;
        let mut resolved: Option<(&'b Binding, Vec<Value>)> = None;

        for q in &mut self.quantifiers {
            let binding = q.binding();
            let reuse = matches!(&resolved, Some((b, _)) if std::ptr::eq(*b, binding));
            if !reuse {
                let values = binding
                    .resolve_values(env, cx, allow_unresolved)
                    .map_err(|e| QuantError::binding(binding.to_string(), e))?;
                resolved = Some((binding, values));
            }
            if let Some((_, values)) = &resolved {
                q.load(values, all);
            }
        }

        self.current.clear();
        self.done = false;
        for q in &mut self.quantifiers {
            if !q.has_next() {
                self.done = true;
                break;
            }
            let first = q.next()?.clone();
            self.current.push(first);
        }

        log::debug!(
            "quantifier group: {} quantifiers, sizes {:?}",
            self.quantifiers.len(),
            self.quantifiers.iter().map(Quantifier::len).collect::<Vec<_>>()
        );
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        !self.done
    }

    /// The current combination's bindings in quantifier order; advances the
    /// odometer.
    pub fn next(&mut self) -> Result<NameValues, QuantError> {
        if self.done {
            return Err(QuantError::ExhaustedIterator);
        }
        let mut combination = NameValues::new();
        for part in &self.current {
            combination.append(part);
        }
        self.advance()?;
        Ok(combination)
    }

    fn advance(&mut self) -> Result<(), QuantError> {
        for i in (0..self.quantifiers.len()).rev() {
            let q = &mut self.quantifiers[i];
            if q.has_next() {
                self.current[i] = q.next()?.clone();
                return Ok(());
            }
            q.reset();
            self.current[i] = q.next()?.clone();
        }
        self.done = true;
        Ok(())
    }
}
