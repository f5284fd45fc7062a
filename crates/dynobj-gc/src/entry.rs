//! The per-object entry table (C2): method-or-data slots keyed by `Key`.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

use crate::key::Key;

/// A type-erased dispatcher function pointer (`oinmi` in the reference
/// design).
///
/// The registry never calls through a `RawMethod` itself: `dynobj-core`
/// casts it back to the documented `(top_o, match_o, ...)` signature for
/// the key in question at the call site. This is the one place in the
/// runtime where an untyped cast is unavoidable (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMethod(pub *const ());

// SAFETY: a RawMethod is just an address; it carries no borrowed data and
// is never dereferenced except by a cast back to a fn pointer.
unsafe impl Send for RawMethod {}
unsafe impl Sync for RawMethod {}

impl RawMethod {
    /// Erase a concrete dispatcher function pointer.
    pub fn erase<F: Copy>(f: F) -> Self {
        assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<*const ()>(),
            "RawMethod::erase requires a bare fn pointer"
        );
        // SAFETY: size checked above; `F` is a fn pointer (Copy, no niches
        // we rely on), so reinterpreting its bytes as `*const ()` is valid.
        let addr = unsafe { std::mem::transmute_copy::<F, *const ()>(&f) };
        Self(addr)
    }

    /// Cast back to a concrete dispatcher signature.
    ///
    /// # Safety
    /// The caller must ensure `F` matches the signature the entry was
    /// registered under for this key — the runtime has no way to check
    /// this itself (spec §6, §7).
    pub unsafe fn cast<F: Copy>(self) -> F {
        assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<*const ()>(),
            "RawMethod::cast requires a bare fn pointer"
        );
        // SAFETY: delegated to the caller via this function's contract.
        unsafe { std::mem::transmute_copy::<*const (), F>(&self.0) }
    }
}

/// An owned, zero-initialized data buffer (`odata` in the reference
/// design).
pub type DataBuffer = Box<[u8]>;

/// Exactly one of a method pointer or an owned data buffer.
///
/// Unlike the reference design's hand-checked `oinmi == NULL xor odata ==
/// NULL` invariant, this is unrepresentable here: the enum has no state
/// for "both" or "neither".
#[derive(Debug)]
pub enum Entry {
    /// A registered method.
    Method(RawMethod),
    /// A registered data buffer.
    Data(DataBuffer),
}

impl Entry {
    /// The method pointer, if this is a method entry.
    pub fn as_method(&self) -> Option<RawMethod> {
        match self {
            Entry::Method(m) => Some(*m),
            Entry::Data(_) => None,
        }
    }

    /// The data buffer, if this is a data entry.
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Entry::Data(d) => Some(d),
            Entry::Method(_) => None,
        }
    }

    /// The data buffer, mutably, if this is a data entry.
    pub fn as_data_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Entry::Data(d) => Some(d),
            Entry::Method(_) => None,
        }
    }
}

/// The per-object method/data table.
///
/// Absent (not merely empty) until the first registration, matching the
/// reference design's lazily-allocated hash table.
#[derive(Debug, Default)]
pub struct EntryTable {
    inner: RefCell<Option<FxHashMap<Key, Entry>>>,
}

impl EntryTable {
    /// A table with no backing map allocated yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// `insert_unique`: `false` (entry left untouched) if `key` is
    /// already present.
    pub fn insert_unique(&self, key: Key, entry: Entry) -> bool {
        let mut slot = self.inner.borrow_mut();
        let map = slot.get_or_insert_with(FxHashMap::default);
        if map.contains_key(&key) {
            false
        } else {
            map.insert(key, entry);
            true
        }
    }

    /// Overwrite (or insert) the entry for `key`, returning whether one
    /// already existed.
    pub fn replace(&self, key: Key, entry: Entry) -> bool {
        let mut slot = self.inner.borrow_mut();
        let map = slot.get_or_insert_with(FxHashMap::default);
        map.insert(key, entry).is_some()
    }

    /// `remove`.
    pub fn remove(&self, key: Key) -> Option<Entry> {
        self.inner.borrow_mut().as_mut()?.remove(&key)
    }

    /// The method pointer for `key`, if an entry exists and it's a method
    /// entry.
    pub fn lookup_method(&self, key: Key) -> Option<RawMethod> {
        self.inner.borrow().as_ref()?.get(&key)?.as_method()
    }

    /// True if a table exists and holds any entry for `key`.
    pub fn contains(&self, key: Key) -> bool {
        self.inner
            .borrow()
            .as_ref()
            .is_some_and(|m| m.contains_key(&key))
    }

    /// Run `f` with the data buffer for `key`, if a data entry exists.
    pub fn with_data<R>(&self, key: Key, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        self.inner.borrow().as_ref()?.get(&key)?.as_data().map(f)
    }

    /// Run `f` with whichever entry (method or data) is stored for `key`.
    pub fn with_entry<R>(&self, key: Key, f: impl FnOnce(&Entry) -> R) -> Option<R> {
        self.inner.borrow().as_ref()?.get(&key).map(f)
    }

    /// Destroy the backing map, dropping every owned entry.
    pub fn clear(&self) {
        *self.inner.borrow_mut() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k() -> Key {
        Key::fresh()
    }

    #[test]
    fn insert_unique_rejects_duplicate_key() {
        let t = EntryTable::new();
        let key = k();
        assert!(t.insert_unique(key, Entry::Data(Box::new([0u8; 4]))));
        assert!(!t.insert_unique(key, Entry::Data(Box::new([0u8; 4]))));
    }

    #[test]
    fn replace_overwrites_and_reports_prior_presence() {
        let t = EntryTable::new();
        let key = k();
        fn dummy() {}
        assert!(!t.replace(key, Entry::Method(RawMethod::erase(dummy as fn()))));
        assert!(t.replace(key, Entry::Method(RawMethod::erase(dummy as fn()))));
    }

    #[test]
    fn remove_returns_owned_entry() {
        let t = EntryTable::new();
        let key = k();
        t.insert_unique(key, Entry::Data(Box::new([1, 2, 3])));
        let e = t.remove(key).unwrap();
        assert_eq!(e.as_data(), Some(&[1u8, 2, 3][..]));
        assert!(t.remove(key).is_none());
    }

    #[test]
    fn method_roundtrips_through_raw() {
        fn accelerate(n: i32) -> i32 {
            n + 1
        }
        let raw = RawMethod::erase(accelerate as fn(i32) -> i32);
        // SAFETY: the signature matches what was erased above.
        let f: fn(i32) -> i32 = unsafe { raw.cast() };
        assert_eq!(f(41), 42);
    }
}
