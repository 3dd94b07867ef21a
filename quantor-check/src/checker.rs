use std::time::Instant;

use quantor_eval::{Context, CounterexamplePath, EvalCx, Frame, Predicate};
use quantor_values::Interrupter;
use rayon::prelude::*;

use crate::config::CheckerConfig;
use crate::error::CheckError;
use crate::obligation::ProofObligation;
use crate::ranges::RangeTable;
use crate::report::{CheckOutcome, CheckSummary, ObligationReport};

/// Brute-force checker: evaluates each obligation with its bindings narrowed
/// to the ranges in a [`RangeTable`].
#[derive(Debug)]
pub struct Checker {
    config: CheckerConfig,
    ranges: RangeTable,
    globals: Frame,
    interrupter: Interrupter,
}

impl Checker {
    pub fn new(config: CheckerConfig, ranges: RangeTable) -> Self {
        Self {
            config,
            ranges,
            globals: Frame::new(),
            interrupter: Interrupter::detached(),
        }
    }

    /// Values visible to every obligation, such as state or constants.
    pub fn with_globals(mut self, globals: Frame) -> Self {
        self.globals = globals;
        self
    }

    pub fn with_interrupter(mut self, interrupter: Interrupter) -> Self {
        self.interrupter = interrupter;
        self
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn ranges(&self) -> &RangeTable {
        &self.ranges
    }

    /// Checks one obligation. Overrides applied to its bindings are always
    /// removed before returning.
    pub fn check<P: Predicate>(&self, po: &mut ProofObligation<P>) -> ObligationReport {
        if !po.checkable {
            log::debug!("PO# {}: unchecked", po.number);
            return ObligationReport::new(po.number, po.kind.clone(), CheckOutcome::Unchecked);
        }

        let number = po.number;
        let mut missing = Vec::new();
        for binding in po.bindings_mut() {
            let text = binding.to_string();
            match self.ranges.get(&text) {
                Some(range) => binding.override_domain(range.clone()),
                None if missing.contains(&text) => {}
                None => {
                    log::warn!("PO# {number}: No range defined for {text}");
                    missing.push(text);
                }
            }
        }

        let env = Context::with_frame("global", self.globals.clone());
        let mut path = CounterexamplePath::new();
        let started = Instant::now();
        let result = {
            let mut cx = EvalCx::new(self.config.engine.clone())
                .with_interrupter(self.interrupter.clone());
            cx.set_counterexample_sink(Some(&mut path));
            po.expr.evaluate(&env, &mut cx)
        };
        let elapsed = started.elapsed();

        for binding in po.bindings_mut() {
            binding.clear_override();
        }

        let outcome = match result {
            Ok(true) => CheckOutcome::Passed,
            Ok(false) => CheckOutcome::failed(&path),
            Err(e) if e.is_cancelled() => CheckOutcome::Interrupted,
            Err(e) => CheckOutcome::Error {
                message: e.to_string(),
            },
        };

        let mut report = ObligationReport::new(po.number, po.kind.clone(), outcome)
            .with_elapsed(elapsed);
        report.missing_ranges = missing;
        log::info!("{report}");
        report
    }

    /// Checks every obligation in order. A failing or erroring obligation
    /// never stops the batch.
    pub fn check_all<P: Predicate + Send>(
        &self,
        obligations: &mut [ProofObligation<P>],
    ) -> CheckSummary {
        if self.config.parallel {
            return self.check_all_parallel(obligations);
        }
        let reports = obligations.iter_mut().map(|po| self.check(po)).collect();
        CheckSummary::from_reports(reports)
    }

    /// Like [`Checker::check_all`], spreading obligations over the rayon pool.
    /// Reports keep the input order.
    pub fn check_all_parallel<P: Predicate + Send>(
        &self,
        obligations: &mut [ProofObligation<P>],
    ) -> CheckSummary {
        let reports = obligations.par_iter_mut().map(|po| self.check(po)).collect();
        CheckSummary::from_reports(reports)
    }

    /// Checks only the obligations with the given numbers, in obligation
    /// order. Every number is validated before anything runs.
    pub fn check_selected<P: Predicate>(
        &self,
        obligations: &mut [ProofObligation<P>],
        numbers: &[usize],
    ) -> Result<CheckSummary, CheckError> {
        let total = obligations.len();
        if let Some(&number) = numbers
            .iter()
            .find(|&&n| !obligations.iter().any(|po| po.number == n))
        {
            return Err(CheckError::UnknownObligation { number, total });
        }
        let reports = obligations
            .iter_mut()
            .filter(|po| numbers.contains(&po.number))
            .map(|po| self.check(po))
            .collect();
        Ok(CheckSummary::from_reports(reports))
    }
}
