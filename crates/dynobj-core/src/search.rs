//! The cycle-protected delegation search (spec §4.4) that every other
//! dispatch operation in this crate is built from.

use std::cell::{Cell, RefCell};

use dynobj_gc::{Entry, Key, RawMethod};
use rustc_hash::FxHashSet;

use crate::object::Object;

/// A match recorded while collecting (spec §4.4's `found` sequence).
/// Only ever produced for method entries: the three operations that
/// collect (`initialize`/`finalize`/`copy`) are all method-dispatched.
#[derive(Debug, Clone, Copy)]
pub struct Match {
    /// The object whose table held the matching entry.
    pub object: Object,
    /// The entry's method pointer.
    pub method: RawMethod,
}

/// Parameters for [`search`].
pub struct SearchOptions<'a> {
    pub(crate) key: Key,
    pub(crate) allow_method: bool,
    pub(crate) allow_data: bool,
    pub(crate) skip_top: bool,
    pub(crate) accept_self: bool,
    pub(crate) accept_delegate: bool,
    pub(crate) collect: Option<&'a RefCell<Vec<Match>>>,
    pub(crate) visit: Option<&'a mut dyn FnMut(Object, &Entry) -> bool>,
}

impl<'a> SearchOptions<'a> {
    /// Defaults: method entries only, no skipping, no short-circuit
    /// policy, no collection, no visitor — callers opt into what they
    /// need.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            allow_method: true,
            allow_data: false,
            skip_top: false,
            accept_self: false,
            accept_delegate: false,
            collect: None,
            visit: None,
        }
    }

    /// Don't consider the root object's own table, only its delegates.
    pub fn skip_top(mut self, v: bool) -> Self {
        self.skip_top = v;
        self
    }

    /// Stop descending into delegates once the root object itself
    /// answers.
    pub fn accept_self(mut self, v: bool) -> Self {
        self.accept_self = v;
        self
    }

    /// Stop checking sibling delegates once one of them answers.
    pub fn accept_delegate(mut self, v: bool) -> Self {
        self.accept_delegate = v;
        self
    }

    /// Restrict to data entries instead of method entries.
    pub fn data_entries(mut self) -> Self {
        self.allow_method = false;
        self.allow_data = true;
        self
    }

    /// Collect every method match, in pre-order, into `sink`.
    pub fn collect_into(mut self, sink: &'a RefCell<Vec<Match>>) -> Self {
        self.collect = Some(sink);
        self
    }

    /// Run `visitor` at each match; a `true` return short-circuits the
    /// whole search.
    pub fn visit_with(mut self, visitor: &'a mut dyn FnMut(Object, &Entry) -> bool) -> Self {
        self.visit = Some(visitor);
        self
    }
}

/// Outcome of [`search`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchResult {
    /// Whether the search found (and, if a visitor was set, accepted) a
    /// match anywhere in the graph.
    pub matched: bool,
    /// The deepest object whose entry was the last one accepted.
    pub last_match: Option<Object>,
}

/// Run the depth-first, cycle-protected delegation search.
///
/// Each object is visited at most once per call, tracked by pointer
/// identity; a delegation cycle simply stops recursing instead of
/// looping forever (logged at debug level for diagnosis).
pub fn search(root: Object, opts: &mut SearchOptions<'_>) -> SearchResult {
    let mut visited = FxHashSet::default();
    let last_match = Cell::new(None);
    let matched = search_inner(root, opts, &mut visited, &last_match, true);
    SearchResult {
        matched,
        last_match: last_match.get(),
    }
}

fn search_inner(
    o: Object,
    opts: &mut SearchOptions<'_>,
    visited: &mut FxHashSet<Object>,
    last_match: &Cell<Option<Object>>,
    top_level: bool,
) -> bool {
    if !visited.insert(o) {
        tracing::debug!(object = ?o, "search: avoiding double recursion over a delegation cycle");
        return false;
    }

    let mut found_self = false;
    let mut answered = false;

    if !top_level || !opts.skip_top {
        let probe = o.table().with_entry(opts.key, |entry| {
            match entry {
                Entry::Method(_) => debug_assert!(opts.allow_method, "found a method entry where a data entry was expected"),
                Entry::Data(_) => debug_assert!(opts.allow_data, "found a data entry where a method entry was expected"),
            }
            if let (Some(collect), Entry::Method(m)) = (&opts.collect, entry) {
                collect.borrow_mut().push(Match { object: o, method: *m });
            }
            match opts.visit.as_mut() {
                Some(visit) => (*visit)(o, entry),
                None => false,
            }
        });
        if let Some(visit_verdict) = probe {
            found_self = true;
            last_match.set(Some(o));
            if opts.visit.is_some() {
                answered = visit_verdict;
            }
        }
    }

    let mut found_delegate = false;
    if !answered && !(found_self && opts.accept_self) {
        for d in o.delegates_top_down() {
            let sub_answered = search_inner(d, opts, visited, last_match, false);
            if sub_answered {
                found_delegate = true;
                answered = true;
                if opts.visit.is_some() || opts.accept_delegate {
                    break;
                }
            }
        }
    }

    if opts.visit.is_some() {
        answered
    } else {
        found_self || found_delegate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynobj_gc::RawMethod;

    fn key() -> Key {
        Key::fresh()
    }

    fn register(o: Object, key: Key) {
        fn marker() {}
        assert!(o.table().insert_unique(key, Entry::Method(RawMethod::erase(marker as fn()))));
    }

    // `unref()` is deliberately not exercised here: these objects never
    // delegate to a klass, and `finalize` (which `unref` dispatches to at
    // refcount zero) requires that. See `lifecycle::tests` for that path.

    #[test]
    fn finds_entry_on_root_without_descending() {
        let o = Object::alloc();
        let k = key();
        register(o, k);
        let mut opts = SearchOptions::new(k);
        let result = search(o, &mut opts);
        assert!(result.matched);
        assert_eq!(result.last_match, Some(o));
    }

    #[test]
    fn finds_entry_through_a_delegate() {
        let top = Object::alloc();
        let base = Object::alloc();
        let k = key();
        register(base, k);
        top.push_delegate(base);
        let mut opts = SearchOptions::new(k);
        let result = search(top, &mut opts);
        assert!(result.matched);
        assert_eq!(result.last_match, Some(base));
    }

    #[test]
    fn skip_top_ignores_the_root_entry() {
        let o = Object::alloc();
        let k = key();
        register(o, k);
        let mut opts = SearchOptions::new(k).skip_top(true);
        let result = search(o, &mut opts);
        assert!(!result.matched);
    }

    #[test]
    fn tolerates_a_delegation_cycle() {
        let a = Object::alloc();
        let b = Object::alloc();
        // a -> b -> a, a cycle. Neither registers the key we search for.
        a.push_delegate(b);
        b.push_delegate(a);
        let k = key();
        let mut opts = SearchOptions::new(k);
        let result = search(a, &mut opts);
        assert!(!result.matched);
    }

    #[test]
    fn accept_delegate_stops_after_first_match() {
        let top = Object::alloc();
        let first = Object::alloc();
        let second = Object::alloc();
        let k = key();
        register(first, k);
        register(second, k);
        top.push_delegate(first);
        top.push_delegate(second);
        let visited_objects = RefCell::new(Vec::new());
        let mut visit = |obj: Object, _entry: &Entry| {
            visited_objects.borrow_mut().push(obj);
            true
        };
        let mut opts = SearchOptions::new(k).accept_delegate(true).visit_with(&mut visit);
        let result = search(top, &mut opts);
        assert!(result.matched);
        drop(opts);
        assert_eq!(visited_objects.borrow().len(), 1);
        assert_eq!(visited_objects.borrow()[0], second);
    }

    #[test]
    fn collect_gathers_every_match_in_pre_order() {
        let top = Object::alloc();
        let mid = Object::alloc();
        let base = Object::alloc();
        let k = key();
        register(top, k);
        register(mid, k);
        register(base, k);
        mid.push_delegate(base);
        top.push_delegate(mid);
        let sink = RefCell::new(Vec::new());
        let mut opts = SearchOptions::new(k).collect_into(&sink);
        search(top, &mut opts);
        let matches = sink.into_inner();
        let objects: Vec<Object> = matches.iter().map(|m| m.object).collect();
        assert_eq!(objects, vec![top, mid, base]);
    }
}
