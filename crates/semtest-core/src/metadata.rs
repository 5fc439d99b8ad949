//! Member metadata values attached to program-unit members

use std::fmt;

/// A metadata value as produced by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    /// A symbol such as `` `test ``
    Symbol(String),
    /// A tuple of values
    Tuple(Vec<MetaValue>),
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl MetaValue {
    /// Shorthand for a symbol value
    pub fn symbol(name: impl Into<String>) -> Self {
        MetaValue::Symbol(name.into())
    }

    /// Check whether this value is the given symbol
    pub fn is_symbol(&self, name: &str) -> bool {
        matches!(self, MetaValue::Symbol(s) if s == name)
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Symbol(s) => write!(f, "`{}", s),
            MetaValue::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            MetaValue::String(s) => write!(f, "{:?}", s),
            MetaValue::Integer(n) => write!(f, "{}", n),
            MetaValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// The metadata record attached to a member.
///
/// Fields are kept in loader order. The `outer` field carries the member's
/// own annotation; other fields belong to the loader and are ignored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberMetadata {
    fields: Vec<(String, MetaValue)>,
}

impl MemberMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata whose `outer` annotation is `value`
    pub fn annotated(value: MetaValue) -> Self {
        Self::new().with_field("outer", value)
    }

    /// Add a named field
    pub fn with_field(mut self, name: impl Into<String>, value: MetaValue) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&MetaValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// The member's own annotation, if any
    pub fn outer(&self) -> Option<&MetaValue> {
        self.field("outer")
    }
}
