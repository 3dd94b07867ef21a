use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use itertools::Itertools;

use crate::value::Value;

/// A set of values.
///
/// Backed by a vector rather than a hash set: the insertion order is kept so
/// that enumeration (and the orderings produced for set patterns) is
/// deterministic. Uniqueness is structural. A canonical sorted order is
/// computed on demand and dropped whenever the set is mutated.
#[derive(Clone, Default)]
pub struct ValueSet {
    values: Vec<Value>,
    canonical: OnceLock<Vec<usize>>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            canonical: OnceLock::new(),
        }
    }

    /// Adds `value` unless a structurally equal value is already present.
    ///
    /// Returns `true` when the value was inserted. Adding a present value is a
    /// no-op and returns `false`.
    pub fn add(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.add_unchecked(value);
        true
    }

    /// Appends without the uniqueness check; callers guarantee distinctness.
    pub(crate) fn add_unchecked(&mut self, value: Value) {
        self.canonical = OnceLock::new();
        self.values.push(value);
    }

    /// Builds a set from values already known to be pairwise distinct.
    pub fn from_distinct(values: Vec<Value>) -> Self {
        debug_assert!(
            values.iter().all_unique(),
            "ValueSet::from_distinct given duplicates"
        );
        Self {
            values,
            canonical: OnceLock::new(),
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        match self.canonical.get() {
            Some(order) => order
                .binary_search_by(|&i| self.values[i].cmp(value))
                .is_ok(),
            None => self.values.iter().any(|v| v == value),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Elements in their current (insertion or sorted) order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    fn canonical_order(&self) -> &[usize] {
        self.canonical.get_or_init(|| {
            let mut order: Vec<usize> = (0..self.values.len()).collect();
            order.sort_by(|&a, &b| self.values[a].cmp(&self.values[b]));
            order
        })
    }

    /// Elements in canonical (sorted) order, independent of insertion order.
    pub fn sorted(&self) -> impl Iterator<Item = &Value> + '_ {
        self.canonical_order().iter().map(|&i| &self.values[i])
    }

    /// Rearranges the elements into canonical order.
    pub fn sort(&mut self) {
        let order = self.canonical_order().to_vec();
        if order.iter().enumerate().all(|(pos, &i)| pos == i) {
            return;
        }
        let mut slots: Vec<Option<Value>> = self.values.drain(..).map(Some).collect();
        self.values = order.iter().filter_map(|&i| slots[i].take()).collect();
        let identity: Vec<usize> = (0..self.values.len()).collect();
        self.canonical = OnceLock::from(identity);
    }

    pub fn is_subset(&self, other: &ValueSet) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    pub fn union(&self, other: &ValueSet) -> ValueSet {
        let mut out = self.clone();
        out.extend(other.iter().cloned());
        out
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.iter()).finish()
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("}")
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.sorted().eq(other.sorted())
    }
}

impl Eq for ValueSet {}

impl Ord for ValueSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sorted().cmp(other.sorted())
    }
}

impl PartialOrd for ValueSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for ValueSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for v in self.sorted() {
            v.hash(state);
        }
    }
}

impl Extend<Value> for ValueSet {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        for v in iter {
            self.add(v);
        }
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = ValueSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ValueSet {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
