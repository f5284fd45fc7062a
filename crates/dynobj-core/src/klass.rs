//! Klass bootstrap (spec §4.7): constructing a root klass object and
//! convenience constructors for objects that delegate to it.

use crate::args::{Args, ArgsBuilder, ArgsError};
use crate::lifecycle::{self, initialize};
use crate::object::Object;

/// `klass_new`: allocate a fresh object pre-populated with the default
/// `is_type`/`finalize`/`write` entries, then `initialize` it. Other
/// objects delegate to the result to inherit this base behavior.
pub fn klass_new() -> Object {
    let o = Object::alloc();
    lifecycle::register_base_methods(o);
    initialize(o, None);
    o
}

/// `new_from_klass`: allocate a new object, push `d` as its sole
/// delegate, then `initialize` it with `args`.
pub fn new_from_klass(d: Object, args: Option<&Args>) -> Object {
    let o = Object::alloc();
    o.push_delegate(d);
    initialize(o, args);
    o
}

/// Convenience over [`new_from_klass`]: builds an [`Args`] bag from a
/// closure before constructing. The ergonomic replacement for the
/// reference design's variadic `new_from_klassf`/`new_from_klassv`
/// constructors, which Rust's lack of variadic parameters rules out
/// directly.
pub fn new_from_klass_with(d: Object, build: impl FnOnce(ArgsBuilder) -> ArgsBuilder) -> Result<Object, ArgsError> {
    let args = build(ArgsBuilder::new()).build()?;
    Ok(new_from_klass(d, Some(&args)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{is_type, BASE_TYPE_NAME};

    #[test]
    fn klass_new_objects_answer_is_type_for_the_base_name() {
        let k = klass_new();
        assert!(is_type(k, BASE_TYPE_NAME));
        k.unref();
    }

    #[test]
    fn new_from_klass_delegates_to_its_klass() {
        let k = klass_new();
        let o = new_from_klass(k, None);
        assert!(is_type(o, BASE_TYPE_NAME));
        assert_eq!(o.delegate_count(), 1);
        o.unref();
        k.unref();
    }

    #[test]
    fn new_from_klass_with_rejects_duplicate_argument_names() {
        let k = klass_new();
        let err = new_from_klass_with(k, |b| b.set("x", 1).set("x", 2)).unwrap_err();
        assert_eq!(err, ArgsError::DuplicateName("x"));
        k.unref();
    }
}
