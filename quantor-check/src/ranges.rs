//! Finite ranges substituted for binding domains while checking.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use quantor_eval::{BindKind, DomainExpr, Predicate};
use quantor_values::{Interrupter, Value, ValueSet, permutations, power_set};

use crate::config::CheckerConfig;
use crate::error::CheckError;
use crate::obligation::ProofObligation;

/// Ranges keyed by the text of the binding they replace (`x : nat`,
/// `s in set S`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeTable {
    ranges: BTreeMap<String, ValueSet>,
}

impl RangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a range from an evaluated range expression, which must be a set.
    pub fn insert(&mut self, bind: impl Into<String>, value: Value) -> Result<(), CheckError> {
        let bind = bind.into();
        match value {
            Value::Set(set) => {
                self.insert_set(bind, set);
                Ok(())
            }
            other => Err(CheckError::RangeNotASet {
                bind,
                found: other.kind(),
            }),
        }
    }

    pub fn insert_set(&mut self, bind: impl Into<String>, set: ValueSet) {
        self.ranges.insert(bind.into(), set);
    }

    pub fn get(&self, bind: &str) -> Option<&ValueSet> {
        self.ranges.get(bind)
    }

    pub fn contains(&self, bind: &str) -> bool {
        self.ranges.contains_key(bind)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueSet)> + '_ {
        self.ranges.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Type shapes that have a default finite range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDesc {
    Bool,
    Nat,
    Nat1,
    Int,
    Char,
    /// `<A> | <B> | ...`
    Quotes(Vec<String>),
    /// `[T]`
    Optional(Box<TypeDesc>),
    /// `T1 * T2 * ...`
    Product(Vec<TypeDesc>),
    SetOf(Box<TypeDesc>),
    SeqOf(Box<TypeDesc>),
    /// Anything else; there is no default for it.
    Named(String),
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Bool => f.write_str("bool"),
            TypeDesc::Nat => f.write_str("nat"),
            TypeDesc::Nat1 => f.write_str("nat1"),
            TypeDesc::Int => f.write_str("int"),
            TypeDesc::Char => f.write_str("char"),
            TypeDesc::Quotes(qs) => {
                for (i, q) in qs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "<{q}>")?;
                }
                Ok(())
            }
            TypeDesc::Optional(t) => write!(f, "[{t}]"),
            TypeDesc::Product(ts) => {
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" * ")?;
                    }
                    write!(f, "{t}")?;
                }
                Ok(())
            }
            TypeDesc::SetOf(t) => write!(f, "set of {t}"),
            TypeDesc::SeqOf(t) => write!(f, "seq of {t}"),
            TypeDesc::Named(n) => f.write_str(n),
        }
    }
}

/// Proposes small ranges for type binds that have none.
#[derive(Clone, Debug)]
pub struct DefaultRanges {
    nat_limit: i64,
    int_limit: i64,
    char_sample: String,
    collection_limit: usize,
}

impl Default for DefaultRanges {
    fn default() -> Self {
        Self::new(&CheckerConfig::default())
    }
}

impl DefaultRanges {
    pub fn new(config: &CheckerConfig) -> Self {
        Self {
            nat_limit: i64::from(config.nat_limit),
            int_limit: i64::from(config.int_limit),
            char_sample: config.char_sample.clone(),
            collection_limit: config.collection_limit,
        }
    }

    pub fn range_for(&self, ty: &TypeDesc) -> Result<ValueSet, CheckError> {
        let set = match ty {
            TypeDesc::Bool => ValueSet::from_distinct(vec![Value::Bool(false), Value::Bool(true)]),
            TypeDesc::Nat => int_range(0, self.nat_limit),
            TypeDesc::Nat1 => int_range(1, self.nat_limit.max(1)),
            TypeDesc::Int => int_range(-self.int_limit, self.int_limit),
            TypeDesc::Char => self.char_sample.chars().map(Value::Char).collect(),
            TypeDesc::Quotes(qs) => qs.iter().map(|q| Value::quote(q.as_str())).collect(),
            TypeDesc::Optional(inner) => {
                let mut set = self.range_for(inner)?;
                set.add(Value::Nil);
                set
            }
            TypeDesc::Product(parts) => {
                let mut tuples: Vec<Vec<Value>> = vec![Vec::new()];
                for part in parts {
                    let range = self.range_for(part)?;
                    tuples = tuples
                        .iter()
                        .flat_map(|prefix| {
                            range.iter().map(move |v| {
                                let mut t = prefix.clone();
                                t.push(v.clone());
                                t
                            })
                        })
                        .collect();
                }
                ValueSet::from_distinct(tuples.into_iter().map(Value::Tuple).collect())
            }
            TypeDesc::SetOf(inner) => {
                let elements = self.range_for(inner)?;
                let subsets = power_set(&elements, self.collection_limit, &Interrupter::detached())?;
                ValueSet::from_distinct(subsets.into_iter().map(Value::Set).collect())
            }
            TypeDesc::SeqOf(inner) => {
                let elements = self.range_for(inner)?;
                let subsets = power_set(&elements, self.collection_limit, &Interrupter::detached())?;
                let seqs = subsets
                    .iter()
                    .flat_map(permutations)
                    .map(|ordering| Value::Seq(ordering.into_vec()))
                    .collect();
                ValueSet::from_distinct(seqs)
            }
            TypeDesc::Named(name) => {
                return Err(CheckError::NoDefaultRange { ty: name.clone() });
            }
        };
        Ok(set)
    }

    /// Default ranges for every distinct type bind in `obligations`, nested
    /// quantifications included.
    ///
    /// `type_of` maps a bind's type name to its shape. Binds whose type is
    /// unknown or has no default are returned by text alongside the table.
    pub fn create<P: Predicate>(
        &self,
        obligations: &[ProofObligation<P>],
        type_of: impl Fn(&str) -> Option<TypeDesc>,
    ) -> (RangeTable, Vec<String>) {
        let mut table = RangeTable::new();
        let mut skipped = Vec::new();
        let mut done = BTreeSet::new();

        for po in obligations {
            for binding in po.bindings() {
                let text = binding.to_string();
                if binding.kind() != BindKind::Type || !done.insert(text.clone()) {
                    continue;
                }
                let DomainExpr::Type(type_name) = binding.domain() else {
                    continue;
                };
                let range = type_of(type_name)
                    .ok_or_else(|| CheckError::NoDefaultRange {
                        ty: type_name.clone(),
                    })
                    .and_then(|ty| self.range_for(&ty));
                match range {
                    Ok(set) => table.insert_set(text, set),
                    Err(e) => {
                        log::warn!("no default range for `{text}`: {e}");
                        skipped.push(text);
                    }
                }
            }
        }

        log::debug!("created {} default ranges", table.len());
        (table, skipped)
    }
}

fn int_range(lo: i64, hi: i64) -> ValueSet {
    let values = if lo <= hi {
        (lo..=hi).map(Value::Int).collect()
    } else {
        Vec::new()
    };
    ValueSet::from_distinct(values)
}
