use std::fmt;

use quantor_values::{Value, ValueSet, permutations};

use crate::context::{Name, NameValues};

/// Destructuring pattern on the left of a binding.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    Identifier(Name),
    /// `-`: matches anything, binds nothing.
    Ignore,
    Literal(Value),
    Tuple(Vec<Pattern>),
    Record { name: String, fields: Vec<Pattern> },
    /// `{p1, ..., pn}`: matches a set of exactly n elements.
    Set(Vec<Pattern>),
    /// `[p1, ..., pn]`: matches a sequence of exactly n elements.
    Seq(Vec<Pattern>),
}

impl Pattern {
    pub fn ident(name: impl Into<Name>) -> Self {
        Pattern::Identifier(name.into())
    }

    /// Names bound by this pattern, first occurrence order, without repeats.
    pub fn names(&self) -> Vec<Name> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut Vec<Name>) {
        match self {
            Pattern::Identifier(n) => {
                if !out.contains(n) {
                    out.push(n.clone());
                }
            }
            Pattern::Ignore | Pattern::Literal(_) => {}
            Pattern::Tuple(ps) | Pattern::Set(ps) | Pattern::Seq(ps) => {
                for p in ps {
                    p.collect_names(out);
                }
            }
            Pattern::Record { fields, .. } => {
                for p in fields {
                    p.collect_names(out);
                }
            }
        }
    }

    /// Every way `value` matches this pattern; empty when it does not match.
    ///
    /// Only set patterns can match in more than one way. Without
    /// `all_possibilities` a set value is matched in its current element order
    /// only; with it, every ordering is tried.
    pub fn matches(&self, value: &Value, all_possibilities: bool) -> Vec<NameValues> {
        match (self, value) {
            (Pattern::Identifier(n), v) => vec![NameValues::single(n.clone(), v.clone())],
            (Pattern::Ignore, _) => vec![NameValues::new()],
            (Pattern::Literal(l), v) => {
                if l == v {
                    vec![NameValues::new()]
                } else {
                    Vec::new()
                }
            }
            (Pattern::Tuple(ps), Value::Tuple(items)) => match_all(ps, items, all_possibilities),
            (Pattern::Seq(ps), Value::Seq(items)) => match_all(ps, items, all_possibilities),
            (Pattern::Record { name, fields }, Value::Record(r)) => {
                if *name != r.name {
                    return Vec::new();
                }
                let items: Vec<Value> = r.fields.iter().map(|(_, v)| v.clone()).collect();
                match_all(fields, &items, all_possibilities)
            }
            (Pattern::Set(ps), Value::Set(set)) => {
                if ps.len() != set.len() {
                    return Vec::new();
                }
                let orderings: Vec<ValueSet> = if all_possibilities {
                    permutations(set)
                } else {
                    vec![set.clone()]
                };
                orderings
                    .iter()
                    .flat_map(|ordering| match_all(ps, ordering.values(), all_possibilities))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Matches patterns pairwise against `items`, returning the consistent cross
/// product of the per-position matches.
fn match_all(patterns: &[Pattern], items: &[Value], all_possibilities: bool) -> Vec<NameValues> {
    if patterns.len() != items.len() {
        return Vec::new();
    }
    let mut acc = vec![NameValues::new()];
    for (p, v) in patterns.iter().zip(items) {
        let options = p.matches(v, all_possibilities);
        if options.is_empty() {
            return Vec::new();
        }
        let mut next = Vec::with_capacity(acc.len() * options.len());
        for prefix in &acc {
            for opt in &options {
                let mut combined = prefix.clone();
                combined.append(opt);
                // mk_(a, a) must see the same value twice
                if combined.to_frame().is_some() {
                    next.push(combined);
                }
            }
        }
        acc = next;
    }
    acc
}

fn write_list(f: &mut fmt::Formatter<'_>, ps: &[Pattern]) -> fmt::Result {
    for (i, p) in ps.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{p}")?;
    }
    Ok(())
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Identifier(n) => write!(f, "{n}"),
            Pattern::Ignore => f.write_str("-"),
            Pattern::Literal(v) => write!(f, "{v}"),
            Pattern::Tuple(ps) => {
                f.write_str("mk_(")?;
                write_list(f, ps)?;
                f.write_str(")")
            }
            Pattern::Record { name, fields } => {
                write!(f, "mk_{name}(")?;
                write_list(f, fields)?;
                f.write_str(")")
            }
            Pattern::Set(ps) => {
                f.write_str("{")?;
                write_list(f, ps)?;
                f.write_str("}")
            }
            Pattern::Seq(ps) => {
                f.write_str("[")?;
                write_list(f, ps)?;
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: i64, b: i64) -> Value {
        Value::tuple([Value::Int(a), Value::Int(b)])
    }

    #[test]
    fn tuple_pattern_destructures() {
        let p = Pattern::Tuple(vec![Pattern::ident("a"), Pattern::Ignore]);
        let m = p.matches(&pair(1, 2), false);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].get("a"), Some(&Value::Int(1)));
        assert_eq!(m[0].len(), 1);
        assert!(p.matches(&Value::Int(3), false).is_empty());
    }

    #[test]
    fn repeated_name_in_pattern_must_agree() {
        let p = Pattern::Tuple(vec![Pattern::ident("a"), Pattern::ident("a")]);
        assert_eq!(p.matches(&pair(4, 4), false).len(), 1);
        assert!(p.matches(&pair(4, 5), false).is_empty());
        assert_eq!(p.names(), vec![Name::from("a")]);
    }

    #[test]
    fn set_pattern_tries_every_ordering_when_asked() {
        let p = Pattern::Set(vec![Pattern::ident("a"), Pattern::ident("b")]);
        let v = Value::set([Value::Int(1), Value::Int(2)]);
        assert_eq!(p.matches(&v, false).len(), 1);
        let all = p.matches(&v, true);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].get("a"), Some(&Value::Int(2)));
        assert!(p.matches(&Value::set([Value::Int(1)]), true).is_empty());
    }

    #[test]
    fn literal_and_record_patterns() {
        let p = Pattern::Record {
            name: "R".into(),
            fields: vec![Pattern::Literal(Value::Int(0)), Pattern::ident("y")],
        };
        let hit = Value::record("R", [("x", Value::Int(0)), ("y", Value::Int(9))]);
        let miss = Value::record("R", [("x", Value::Int(1)), ("y", Value::Int(9))]);
        assert_eq!(p.matches(&hit, false)[0].get("y"), Some(&Value::Int(9)));
        assert!(p.matches(&miss, false).is_empty());
        assert_eq!(p.to_string(), "mk_R(0, y)");
    }
}
