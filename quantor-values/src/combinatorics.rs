//! Power set and permutation generation over [`ValueSet`]s.

use itertools::Itertools;

use crate::error::CombinatoricsError;
use crate::interrupt::Interrupter;
use crate::set::ValueSet;
use crate::value::Value;

/// Default bound on the cardinality of a power set's input.
pub const DEFAULT_POWERSET_LIMIT: usize = 30;

/// All 2ⁿ subsets of `set`.
///
/// Subset `k` contains element `i` (in the input's current order) iff bit `i`
/// of `k` is set, so the empty set comes first and `set` itself last. The size
/// check happens before anything is allocated. `interrupter` is polled once per
/// emitted subset; a pause blocks in place and a terminate yields
/// [`CombinatoricsError::Cancelled`].
pub fn power_set(
    set: &ValueSet,
    limit: usize,
    interrupter: &Interrupter,
) -> Result<Vec<ValueSet>, CombinatoricsError> {
    let n = set.len();
    if n > limit || n >= usize::BITS as usize {
        return Err(CombinatoricsError::CapacityExceeded { size: n, limit });
    }

    let total: usize = 1 << n;
    log::debug!("power set: {n} elements, {total} subsets");
    let mut subsets = Vec::with_capacity(total);

    for k in 0..total {
        let mut subset = ValueSet::with_capacity(k.count_ones() as usize);
        for (i, v) in set.iter().enumerate() {
            if k & (1 << i) != 0 {
                subset.add_unchecked(v.clone());
            }
        }
        subsets.push(subset);

        if interrupter.should_terminate("power set") {
            log::debug!("power set of size {n} interrupted after {} subsets", k + 1);
            return Err(CombinatoricsError::Cancelled { size: n });
        }
    }

    Ok(subsets)
}

/// [`power_set`] packaged as a set-of-sets value.
pub fn power_set_value(
    set: &ValueSet,
    limit: usize,
    interrupter: &Interrupter,
) -> Result<Value, CombinatoricsError> {
    let subsets = power_set(set, limit, interrupter)?;
    let mut out = ValueSet::with_capacity(subsets.len());
    for s in subsets {
        // distinct by construction
        out.add_unchecked(Value::Set(s));
    }
    Ok(Value::Set(out))
}

/// All n! orderings of `set`, in lexicographic order of element positions.
///
/// The empty set has exactly one (empty) ordering. There is no size guard:
/// only call this on small sets.
pub fn permutations(set: &ValueSet) -> Vec<ValueSet> {
    let n = set.len();
    if n == 0 {
        return vec![ValueSet::new()];
    }
    (0..n)
        .permutations(n)
        .map(|perm| {
            let mut ordered = ValueSet::with_capacity(n);
            for i in perm {
                ordered.add_unchecked(set.values()[i].clone());
            }
            ordered
        })
        .collect()
}
