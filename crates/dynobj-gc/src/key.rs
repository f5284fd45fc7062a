//! Opaque, equality-comparable method-key identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

/// A runtime-unique opaque identifier naming a slot in an object's entry
/// table.
///
/// Conventionally the address of a framework dispatcher function (see
/// `dynobj_macros::dispatcher`), but [`Key::fresh`] mints one from a
/// process-wide counter for callers with no natural function to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u64);

static NEXT_FRESH: AtomicU64 = AtomicU64::new(1);

impl Key {
    /// Derive a key from a dispatcher function's address.
    ///
    /// Two calls with the same function yield equal keys; a function's
    /// address is stable for the life of the process.
    pub fn of_fn(addr: *const ()) -> Self {
        Self(addr as u64)
    }

    /// Mint a fresh key from a process-wide counter.
    ///
    /// Use this when there is no dispatcher function to take the address
    /// of — e.g. a plain per-field data key.
    pub fn fresh() -> Self {
        Self(NEXT_FRESH.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_fn_is_stable_and_distinct() {
        fn a() {}
        fn b() {}
        assert_eq!(Key::of_fn(a as *const ()), Key::of_fn(a as *const ()));
        assert_ne!(Key::of_fn(a as *const ()), Key::of_fn(b as *const ()));
    }

    #[test]
    fn fresh_keys_are_distinct() {
        let k1 = Key::fresh();
        let k2 = Key::fresh();
        assert_ne!(k1, k2);
    }
}
