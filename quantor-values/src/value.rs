use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::map::ValueMap;
use crate::set::ValueSet;

/// A value of the modelling language.
///
/// Equality, ordering and hashing are structural and total: any two values can
/// be compared, mismatched variants are simply unequal and ordered by variant.
/// `Int` and `Real` share one numeric rank and compare by magnitude, so
/// `Int(1) == Real(1.0)`.
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Real(f64),
    Char(char),
    Quote(String),
    Token(Box<Value>),
    Tuple(Vec<Value>),
    Record(RecordValue),
    Set(ValueSet),
    Seq(Vec<Value>),
    Map(ValueMap),
    Function(FunctionValue),
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordValue {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

/// Opaque function value. Functions compare by name and arity only.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionValue {
    pub name: String,
    pub arity: usize,
}

impl Value {
    pub fn int(i: i64) -> Self {
        Value::Int(i)
    }

    pub fn real(r: f64) -> Self {
        // -0.0 and 0.0 must be one value
        Value::Real(if r == 0.0 { 0.0 } else { r })
    }

    pub fn quote(name: impl Into<String>) -> Self {
        Value::Quote(name.into())
    }

    pub fn token(inner: Value) -> Self {
        Value::Token(Box::new(inner))
    }

    /// A string is a sequence of characters.
    pub fn string(s: &str) -> Self {
        Value::Seq(s.chars().map(Value::Char).collect())
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn seq(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Seq(items.into_iter().collect())
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(items.into_iter().collect())
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(entries.into_iter().collect())
    }

    pub fn record<N>(name: impl Into<String>, fields: impl IntoIterator<Item = (N, Value)>) -> Self
    where
        N: Into<String>,
    {
        Value::Record(RecordValue {
            name: name.into(),
            fields: fields.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        })
    }

    pub fn function(name: impl Into<String>, arity: usize) -> Self {
        Value::Function(FunctionValue {
            name: name.into(),
            arity,
        })
    }

    /// Short variant name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Char(_) => "char",
            Value::Quote(_) => "quote",
            Value::Token(_) => "token",
            Value::Tuple(_) => "tuple",
            Value::Record(_) => "record",
            Value::Set(_) => "set",
            Value::Seq(_) => "seq",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Real(_) => 2,
            Value::Char(_) => 3,
            Value::Quote(_) => 4,
            Value::Token(_) => 5,
            Value::Tuple(_) => 6,
            Value::Record(_) => 7,
            Value::Set(_) => 8,
            Value::Seq(_) => 9,
            Value::Map(_) => 10,
            Value::Function(_) => 11,
        }
    }
}

fn zero_normalized(r: f64) -> f64 {
    if r == 0.0 { 0.0 } else { r }
}

// 2^63 as f64: the first double above every i64.
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn cmp_int_real(i: i64, r: f64) -> Ordering {
    if r.is_nan() {
        // total_cmp puts negative NaNs below everything, positive NaNs above.
        return if r.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    let f = i as f64;
    match f.partial_cmp(&r) {
        Some(Ordering::Equal) => {
            if r >= I64_UPPER {
                Ordering::Less
            } else {
                // r is integral and in range here, the cast is exact.
                i.cmp(&(r as i64))
            }
        }
        Some(ord) => ord,
        None => Ordering::Less,
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Real(a), Value::Real(b)) => zero_normalized(*a).total_cmp(&zero_normalized(*b)),
            (Value::Int(a), Value::Real(b)) => cmp_int_real(*a, zero_normalized(*b)),
            (Value::Real(a), Value::Int(b)) => cmp_int_real(*b, zero_normalized(*a)).reverse(),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::Quote(a), Value::Quote(b)) => a.cmp(b),
            (Value::Token(a), Value::Token(b)) => a.cmp(b),
            (Value::Tuple(a), Value::Tuple(b)) => a.cmp(b),
            (Value::Record(a), Value::Record(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => a.cmp(b),
            (Value::Seq(a), Value::Seq(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            (Value::Function(a), Value::Function(b)) => a.cmp(b),
            _ => {
                debug_assert_ne!(self.rank(), other.rank(), "unhandled same-variant pair");
                self.rank().cmp(&other.rank())
            }
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

fn hash_real<H: Hasher>(r: f64, state: &mut H) {
    let r = zero_normalized(r);
    if r.fract() == 0.0 && r >= -I64_UPPER && r < I64_UPPER {
        // Must agree with the Int hash for numerically equal values.
        (r as i64).hash(state);
    } else {
        r.to_bits().hash(state);
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Real(r) => hash_real(*r, state),
            Value::Char(c) => c.hash(state),
            Value::Quote(q) => q.hash(state),
            Value::Token(t) => t.hash(state),
            Value::Tuple(items) => items.hash(state),
            Value::Record(r) => r.hash(state),
            Value::Set(s) => s.hash(state),
            Value::Seq(items) => items.hash(state),
            Value::Map(m) => m.hash(state),
            Value::Function(f) => f.hash(state),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Char(c) => write!(f, "'{c}'"),
            Value::Quote(q) => write!(f, "<{q}>"),
            Value::Token(t) => write!(f, "mk_token({t})"),
            Value::Tuple(items) => {
                f.write_str("mk_(")?;
                write_list(f, items)?;
                f.write_str(")")
            }
            Value::Record(r) => {
                write!(f, "mk_{}(", r.name)?;
                for (i, (_, v)) in r.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
            Value::Set(s) => write!(f, "{s}"),
            Value::Seq(items) => {
                if !items.is_empty() && items.iter().all(|v| matches!(v, Value::Char(_))) {
                    f.write_str("\"")?;
                    for v in items {
                        if let Value::Char(c) = v {
                            write!(f, "{c}")?;
                        }
                    }
                    f.write_str("\"")
                } else {
                    f.write_str("[")?;
                    write_list(f, items)?;
                    f.write_str("]")
                }
            }
            Value::Map(m) => write!(f, "{m}"),
            Value::Function(func) => write!(f, "{}", func.name),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<ValueSet> for Value {
    fn from(s: ValueSet) -> Self {
        Value::Set(s)
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Value::Map(m)
    }
}
