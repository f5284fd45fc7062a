//! The framework hooks (spec §4.5, §4.6): `is_type`, `initialize`,
//! `finalize`, `copy`, `write`.
//!
//! Every one of these is dispatched the same way a subclass's own
//! methods are — through [`crate::search`] over an object's delegation
//! graph — rather than being special-cased trait methods. A type
//! implementing one of these hooks calls [`method_register`] with the
//! hook's key exactly as it would for any operation of its own.

use std::cell::RefCell;
use std::sync::OnceLock;

use dynobj_gc::{Entry, Key};

use crate::args::Args;
use crate::object::Object;
use crate::registry::method_register;
use crate::search::{search, SearchOptions};

/// The type name every object built from [`crate::klass_new`] answers
/// `true` for under `is_type`.
pub const BASE_TYPE_NAME: &str = "dynobj_object";

/// `(top_o, match_o, typestr) -> bool`.
pub type IsTypeFn = fn(Object, Object, &str) -> bool;
/// `(top_o, match_o, args)`.
pub type InitializeFn = fn(Object, Object, Option<&Args>);
/// `(top_o, match_o)`.
pub type FinalizeFn = fn(Object, Object);
/// `(src_top_o, match_o, dst_o)`.
pub type CopyFn = fn(Object, Object, Object);
/// `(top_o, match_o, sink) -> fmt::Result`.
pub type WriteFn = fn(Object, Object, &mut dyn std::fmt::Write) -> std::fmt::Result;

macro_rules! dispatcher_key {
    ($fn_name:ident, $key_fn:ident) => {
        /// Process-wide key for this dispatcher, derived from its own
        /// address.
        pub fn $key_fn() -> Key {
            static KEY: OnceLock<Key> = OnceLock::new();
            *KEY.get_or_init(|| Key::of_fn($fn_name as *const ()))
        }
    };
}

dispatcher_key!(is_type, is_type_key);
dispatcher_key!(initialize, initialize_key);
dispatcher_key!(finalize, finalize_key);
dispatcher_key!(copy, copy_key);
dispatcher_key!(write, write_key);

/// `is_type`: search the delegation graph for an `is_type` entry and
/// invoke each one found, in search order, short-circuiting the moment
/// one returns `true`.
pub fn is_type(o: Object, typestr: &str) -> bool {
    let mut visit = |match_o: Object, entry: &Entry| {
        let raw = entry.as_method().expect("is_type entry must be a method");
        // SAFETY: registered under is_type_key() with IsTypeFn's signature.
        let f: IsTypeFn = unsafe { raw.cast() };
        f(o, match_o, typestr)
    };
    let mut opts = SearchOptions::new(is_type_key()).visit_with(&mut visit);
    search(o, &mut opts).matched
}

/// `initialize`: collect every `initialize` entry in the graph and
/// invoke them in reverse (base-first) order — the root's own
/// constructor runs last, after every delegate it depends on has been
/// set up.
pub fn initialize(o: Object, args: Option<&Args>) {
    assert!(is_type(o, BASE_TYPE_NAME), "initialize: object does not delegate to a dynobj base klass");
    let collected = RefCell::new(Vec::new());
    let mut opts = SearchOptions::new(initialize_key()).collect_into(&collected);
    search(o, &mut opts);
    for m in collected.into_inner().into_iter().rev() {
        // SAFETY: registered under initialize_key() with InitializeFn's signature.
        let f: InitializeFn = unsafe { m.method.cast() };
        f(o, m.object, args);
    }
}

/// `finalize`: collect every `finalize` entry and invoke them in forward
/// (pre-order, root-first) order, the mirror image of `initialize` — the
/// root gets to run its own teardown before a delegate it depends on is
/// torn down underneath it.
///
/// Called automatically by [`Object::unref`](crate::object::Object::unref)
/// the moment an object's refcount reaches zero.
pub fn finalize(o: Object) {
    assert!(is_type(o, BASE_TYPE_NAME), "finalize: object does not delegate to a dynobj base klass");
    let collected = RefCell::new(Vec::new());
    let mut opts = SearchOptions::new(finalize_key()).collect_into(&collected);
    search(o, &mut opts);
    for m in collected.into_inner() {
        // SAFETY: registered under finalize_key() with FinalizeFn's signature.
        let f: FinalizeFn = unsafe { m.method.cast() };
        f(o, m.object);
    }
}

/// `copy`: allocate a new object sharing `o`'s delegates, then invoke
/// every `copy` entry in reverse order so each level can copy its own
/// state into the new object after its delegates' state has already
/// been copied.
pub fn copy(o: Object) -> Object {
    assert!(is_type(o, BASE_TYPE_NAME), "copy: object does not delegate to a dynobj base klass");
    let dst = Object::alloc();
    for i in 0..o.delegate_count() {
        if let Some(d) = o.delegate_at(i) {
            dst.push_delegate(d);
        }
    }
    let collected = RefCell::new(Vec::new());
    let mut opts = SearchOptions::new(copy_key()).collect_into(&collected);
    search(o, &mut opts);
    for m in collected.into_inner().into_iter().rev() {
        // SAFETY: registered under copy_key() with CopyFn's signature.
        let f: CopyFn = unsafe { m.method.cast() };
        f(o, m.object, dst);
    }
    dst
}

/// `write`: find the first `write` entry in the graph and invoke it,
/// doing nothing if none is registered anywhere.
pub fn write(o: Object, sink: &mut dyn std::fmt::Write) -> std::fmt::Result {
    let found: RefCell<Option<(Object, dynobj_gc::RawMethod)>> = RefCell::new(None);
    let mut visit = |match_o: Object, entry: &Entry| {
        if let Some(m) = entry.as_method() {
            *found.borrow_mut() = Some((match_o, m));
        }
        true
    };
    let mut opts = SearchOptions::new(write_key()).visit_with(&mut visit);
    search(o, &mut opts);
    match found.into_inner() {
        Some((match_o, raw)) => {
            // SAFETY: registered under write_key() with WriteFn's signature.
            let f: WriteFn = unsafe { raw.cast() };
            f(o, match_o, sink)
        }
        None => Ok(()),
    }
}

/// The default `is_type` entry installed by [`crate::klass_new`]: answers
/// `true` only for [`BASE_TYPE_NAME`] itself.
pub fn default_is_type_fn(_top_o: Object, _match_o: Object, typestr: &str) -> bool {
    typestr == BASE_TYPE_NAME
}

/// The default `finalize` entry installed by [`crate::klass_new`].
///
/// Note this always tears down `top_o` — the object [`finalize`] was
/// originally called on — never `match_o`, the object whose table
/// actually held this entry (typically a shared klass reached through a
/// chain of delegates). There is exactly one teardown per `finalize`
/// call, and it is always of the object being destroyed, not of the
/// klass that happened to supply the default behavior.
pub fn default_finalize_fn(top_o: Object, _match_o: Object) {
    top_o.pop_all_delegates();
    top_o.table().clear();
}

/// The default `write` entry installed by [`crate::klass_new`].
///
/// Reports `top_o` — the object [`write`] was originally called on —
/// not `match_o`, the (often shared) klass that happened to supply this
/// entry: otherwise every instance delegating to the same klass would
/// print the klass's own refcount and data pointer instead of its own.
pub fn default_write_fn(top_o: Object, _match_o: Object, sink: &mut dyn std::fmt::Write) -> std::fmt::Result {
    write!(sink, "{} refcount={} data={:p}", BASE_TYPE_NAME, top_o.refcount(), top_o.data())
}

pub(crate) fn register_base_methods(o: Object) {
    let a = method_register(o, is_type_key(), default_is_type_fn as IsTypeFn);
    let b = method_register(o, finalize_key(), default_finalize_fn as FinalizeFn);
    let c = method_register(o, write_key(), default_write_fn as WriteFn);
    assert!(a && b && c, "register_base_methods: expected fresh registrations on a new object");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::klass::klass_new;
    use crate::registry::method_register;

    #[test]
    fn is_type_answers_true_only_for_registered_typestr() {
        let o = klass_new();
        assert!(is_type(o, BASE_TYPE_NAME));
        assert!(!is_type(o, "something_else"));
        o.unref();
    }

    #[test]
    fn initialize_runs_base_before_derived() {
        thread_local! {
            static ORDER: RefCell<Vec<&'static str>> = RefCell::new(Vec::new());
        }
        fn init_base(_top: Object, _match_o: Object, _args: Option<&Args>) {
            ORDER.with(|o| o.borrow_mut().push("base"));
        }
        fn init_mid(_top: Object, _match_o: Object, _args: Option<&Args>) {
            ORDER.with(|o| o.borrow_mut().push("mid"));
        }
        // `base` is a proper klass (carries is_type/finalize/write); `mid` is
        // a bare handle delegating to it, built by hand so its own
        // `initialize` call can be driven directly rather than through
        // `new_from_klass`.
        let base = klass_new();
        method_register(base, initialize_key(), init_base as InitializeFn);
        let mid = Object::alloc();
        mid.push_delegate(base);
        method_register(mid, initialize_key(), init_mid as InitializeFn);

        initialize(mid, None);
        ORDER.with(|o| assert_eq!(*o.borrow(), vec!["base", "mid"]));

        mid.unref();
        base.unref();
    }

    #[test]
    fn finalize_runs_registered_entries_root_first_then_cleans_up() {
        thread_local! {
            static ORDER: RefCell<Vec<&'static str>> = RefCell::new(Vec::new());
        }
        fn fin_top(top: Object, match_o: Object) {
            ORDER.with(|o| o.borrow_mut().push("top"));
            default_finalize_fn(top, match_o);
        }
        fn fin_base(top: Object, match_o: Object) {
            ORDER.with(|o| o.borrow_mut().push("base"));
            default_finalize_fn(top, match_o);
        }
        let base = klass_new();
        method_register(base, finalize_key(), fin_base as FinalizeFn);
        let top = Object::alloc();
        top.push_delegate(base);
        method_register(top, finalize_key(), fin_top as FinalizeFn);

        top.unref();
        ORDER.with(|o| assert_eq!(*o.borrow(), vec!["top", "base"]));
        base.unref();
    }

    #[test]
    fn write_falls_back_to_nothing_when_unregistered() {
        let o = Object::alloc();
        let mut s = String::new();
        assert!(write(o, &mut s).is_ok());
        assert!(s.is_empty());
    }
}
