//! Method / data registration and lookup (spec §4.2, §4.3).

use std::cell::RefCell;

use dynobj_gc::{DataBuffer, Entry, Key, RawMethod};

use crate::object::Object;
use crate::search::{search, SearchOptions};

/// `method_register`: `true` if this was a fresh registration, `false`
/// if an existing method entry for `key` was overwritten.
///
/// Panics if `key` already names a data entry on `o` — method and data
/// share one table, but never the same key.
pub fn method_register<F: Copy>(o: Object, key: Key, f: F) -> bool {
    let raw = RawMethod::erase(f);
    if o.table().contains(key) {
        let is_method = o
            .table()
            .with_entry(key, |e| matches!(e, Entry::Method(_)))
            .unwrap_or(false);
        assert!(is_method, "method_register: key already holds a data entry");
        o.table().replace(key, Entry::Method(raw));
        false
    } else {
        let inserted = o.table().insert_unique(key, Entry::Method(raw));
        debug_assert!(inserted);
        true
    }
}

/// `method_unregister`: requires a method entry for `key` on `o`'s own
/// table (not a delegate's).
pub fn method_unregister(o: Object, key: Key) {
    let entry = o
        .table()
        .remove(key)
        .expect("method_unregister: no entry registered for this key");
    assert!(matches!(entry, Entry::Method(_)), "method_unregister: entry is not a method");
}

/// `method_lookup`: `o`'s own entry only, never walks delegates.
pub fn method_lookup(o: Object, key: Key) -> Option<RawMethod> {
    o.table().lookup_method(key)
}

/// `method_search`: the delegation search restricted to method entries,
/// returning the first one found and the object that owns it.
pub fn method_search(o: Object, key: Key, skip_top: bool) -> (Option<RawMethod>, Option<Object>) {
    let found: RefCell<Option<RawMethod>> = RefCell::new(None);
    let mut visit = |_obj: Object, entry: &Entry| {
        *found.borrow_mut() = entry.as_method();
        true
    };
    let mut opts = SearchOptions::new(key).skip_top(skip_top).visit_with(&mut visit);
    let result = search(o, &mut opts);
    (found.into_inner(), result.last_match)
}

/// `data_register`: requires no existing entry for `key` on `o`.
/// Allocates a zero-initialized buffer of `size` bytes and returns a
/// stable pointer into it — stable because relocating the owning
/// `Entry`/`Box` (e.g. on a hash table rehash) moves only the fat
/// pointer, never the heap bytes it addresses.
pub fn data_register(o: Object, key: Key, size: usize) -> *mut u8 {
    let mut buf: DataBuffer = vec![0u8; size].into_boxed_slice();
    let ptr = buf.as_mut_ptr();
    let inserted = o.table().insert_unique(key, Entry::Data(buf));
    assert!(inserted, "data_register: key already has an entry");
    ptr
}

/// `data_lookup`: requires a data entry for `key` on `o`'s own table.
pub fn data_lookup(o: Object, key: Key) -> *mut u8 {
    o.table()
        .with_data(key, |d| d.as_ptr() as *mut u8)
        .expect("data_lookup: no data entry registered for this key")
}

/// `data_search`: the delegation search restricted to data entries.
/// Asserts that at least one match exists, matching the reference
/// design's precondition that this is only called for keys known to
/// resolve somewhere in the graph.
pub fn data_search(o: Object, key: Key, skip_top: bool) -> (*mut u8, Object) {
    let found: RefCell<Option<*mut u8>> = RefCell::new(None);
    let mut visit = |_obj: Object, entry: &Entry| {
        if let Some(d) = entry.as_data() {
            *found.borrow_mut() = Some(d.as_ptr() as *mut u8);
        }
        true
    };
    let mut opts = SearchOptions::new(key)
        .data_entries()
        .skip_top(skip_top)
        .visit_with(&mut visit);
    let result = search(o, &mut opts);
    assert!(result.matched, "data_search: no match found for this key");
    let owner = result
        .last_match
        .expect("data_search: a matched search always sets last_match");
    (
        found
            .into_inner()
            .expect("data_search: the visitor must have captured a buffer pointer"),
        owner,
    )
}
