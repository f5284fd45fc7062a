//! The key-value argument bag passed into `initialize` (spec §6).
//!
//! The reference design takes a variadic `(name, type, value, ..., NULL)`
//! list; Rust has no variadic parameters, so this is a small
//! builder instead. It is a real, if narrow, implementation rather than a
//! stub — `initialize` can't be exercised meaningfully without one.

use rustc_hash::FxHashMap;
use thiserror::Error;

/// A single constructor argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Signed integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Owned string.
    Str(String),
    /// Opaque pointer, passed through without interpretation.
    Pointer(*const ()),
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(v.into())
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<*const ()> for ArgValue {
    fn from(v: *const ()) -> Self {
        ArgValue::Pointer(v)
    }
}

/// Errors building an [`Args`] bag.
#[derive(Debug, Error, PartialEq)]
pub enum ArgsError {
    /// The same argument name was set twice.
    #[error("duplicate argument name: {0}")]
    DuplicateName(&'static str),
}

/// An immutable name -> value mapping, passed unmodified into
/// `initialize`.
#[derive(Debug, Default)]
pub struct Args {
    values: FxHashMap<&'static str, ArgValue>,
}

impl Args {
    /// Look up a named argument.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Number of arguments in the bag.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the bag has no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds an [`Args`] bag.
#[derive(Debug, Default)]
pub struct ArgsBuilder {
    values: FxHashMap<&'static str, ArgValue>,
    duplicate: Option<&'static str>,
}

impl ArgsBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named argument. Builder-style; a duplicate name is recorded
    /// but only surfaced by [`Self::build`].
    pub fn set(mut self, name: &'static str, value: impl Into<ArgValue>) -> Self {
        if self.values.insert(name, value.into()).is_some() {
            self.duplicate.get_or_insert(name);
        }
        self
    }

    /// Finish building, rejecting a builder that had a duplicate name
    /// set.
    pub fn build(self) -> Result<Args, ArgsError> {
        match self.duplicate {
            Some(name) => Err(ArgsError::DuplicateName(name)),
            None => Ok(Args { values: self.values }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_reads_back_values() {
        let args = ArgsBuilder::new().set("speed", 88).set("name", "delorean").build().unwrap();
        assert_eq!(args.get("speed"), Some(&ArgValue::Int(88)));
        assert_eq!(args.get("name"), Some(&ArgValue::Str("delorean".into())));
        assert_eq!(args.get("missing"), None);
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn duplicate_name_is_a_recoverable_error() {
        let err = ArgsBuilder::new().set("speed", 1).set("speed", 2).build().unwrap_err();
        assert_eq!(err, ArgsError::DuplicateName("speed"));
    }

    #[test]
    fn empty_builder_yields_empty_bag() {
        let args = ArgsBuilder::new().build().unwrap();
        assert!(args.is_empty());
    }
}
