use std::borrow::Borrow;
use std::fmt;

use quantor_values::Value;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Name/value pairs produced by matching patterns, in binding order.
///
/// The same name may appear more than once (a name bound by two quantifiers, or
/// twice inside one pattern); [`NameValues::to_frame`] decides whether such
/// repeats agree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameValues(Vec<(Name, Value)>);

impl NameValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(name: Name, value: Value) -> Self {
        Self(vec![(name, value)])
    }

    pub fn push(&mut self, name: Name, value: Value) {
        self.0.push((name, value));
    }

    pub fn append(&mut self, other: &NameValues) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> + '_ {
        self.0.iter().map(|(n, v)| (n, v))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n.as_str() == name).map(|(_, v)| v)
    }

    /// Collapses repeated names into one frame entry.
    ///
    /// Returns `None` when some name is paired with two different values; such a
    /// combination is inconsistent and must not reach a predicate.
    pub fn to_frame(&self) -> Option<Frame> {
        let mut frame = Frame::new();
        for (name, value) in &self.0 {
            match frame.get(name.as_str()) {
                Some(existing) if existing != value => return None,
                Some(_) => {}
                None => frame.bind(name.clone(), value.clone()),
            }
        }
        Some(frame)
    }
}

/// One scope's worth of bindings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    entries: Vec<(Name, Value)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any earlier binding of the same name.
    pub fn bind(&mut self, name: Name, value: Value) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> + '_ {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (n, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{n} = {v}")?;
        }
        Ok(())
    }
}

impl<N: Into<Name>> FromIterator<(N, Value)> for Frame {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        let mut frame = Frame::new();
        for (n, v) in iter {
            frame.bind(n.into(), v);
        }
        frame
    }
}

/// A chain of scopes. Extending never mutates the parent; lookups fall through
/// to outer scopes.
#[derive(Debug)]
pub struct Context<'p> {
    title: &'static str,
    frame: Frame,
    parent: Option<&'p Context<'p>>,
}

impl Context<'static> {
    pub fn root() -> Self {
        Self::with_frame("root", Frame::new())
    }

    pub fn with_frame(title: &'static str, frame: Frame) -> Self {
        Self {
            title,
            frame,
            parent: None,
        }
    }
}

impl<'p> Context<'p> {
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frame
            .get(name)
            .or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }

    pub fn extend<'a>(&'a self, title: &'static str, frame: Frame) -> Context<'a> {
        Context {
            title,
            frame,
            parent: Some(self),
        }
    }

    /// Binds into this scope only.
    pub fn bind(&mut self, name: impl Into<Name>, value: Value) {
        self.frame.bind(name.into(), value);
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |p| p.depth() + 1)
    }
}
