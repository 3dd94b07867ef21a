use std::collections::BTreeMap;
use std::fmt;

use crate::set::ValueSet;
use crate::value::Value;

/// Finite map with structurally unique keys, iterated in key order.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueMap {
    entries: BTreeMap<Value, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a maplet, returning the previous range value for `key`.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.entries.iter()
    }

    pub fn dom(&self) -> ValueSet {
        let mut out = ValueSet::with_capacity(self.entries.len());
        for k in self.entries.keys() {
            out.add_unchecked(k.clone());
        }
        out
    }

    pub fn rng(&self) -> ValueSet {
        self.entries.values().cloned().collect()
    }
}

impl FromIterator<(Value, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValueMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("{|->}");
        }
        f.write_str("{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k} |-> {v}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_and_rng() {
        let m: ValueMap = [
            (Value::Int(2), Value::quote("A")),
            (Value::Int(1), Value::quote("A")),
        ]
        .into_iter()
        .collect();
        assert_eq!(m.dom(), ValueSet::from_iter([Value::Int(1), Value::Int(2)]));
        assert_eq!(m.rng().len(), 1);
        assert_eq!(m.to_string(), "{1 |-> <A>, 2 |-> <A>}");
    }
}
