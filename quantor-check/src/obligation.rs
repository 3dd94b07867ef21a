use std::fmt;

use quantor_eval::{Binding, Predicate, QuantifiedExpr};

/// A numbered proof obligation whose root is a quantification.
#[derive(Debug)]
pub struct ProofObligation<P> {
    pub number: usize,
    /// Obligation kind, e.g. "subtype" or "map compatible".
    pub kind: String,
    /// Unchecked obligations are reported but never evaluated.
    pub checkable: bool,
    pub expr: QuantifiedExpr<P>,
}

impl<P: Predicate> ProofObligation<P> {
    pub fn new(number: usize, kind: impl Into<String>, expr: QuantifiedExpr<P>) -> Self {
        Self {
            number,
            kind: kind.into(),
            checkable: true,
            expr,
        }
    }

    pub fn unchecked(mut self) -> Self {
        self.checkable = false;
        self
    }

    /// Every binding in the obligation, nested quantifications included.
    /// Ranges apply to all of them.
    pub fn bindings(&self) -> Vec<&Binding> {
        self.expr.all_bindings()
    }

    pub fn bindings_mut(&mut self) -> Vec<&mut Binding> {
        self.expr.all_bindings_mut()
    }
}

impl<P> fmt::Display for ProofObligation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proof Obligation {}: ({})\n{}", self.number, self.kind, self.expr)
    }
}
