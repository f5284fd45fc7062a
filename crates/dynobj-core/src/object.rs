//! The object handle (spec §3, §4.1).

use std::cell::Cell;
use std::fmt;
use std::ptr::NonNull;

use dynobj_gc::{DelegateStack, EntryTable, ObjectHeader};

struct ObjectInner {
    header: ObjectHeader,
    delegates: DelegateStack<Object>,
    table: EntryTable,
    data: Cell<*mut ()>,
}

/// A handle to a runtime object.
///
/// `Object` is a thin, `Copy` pointer over a manually refcounted heap
/// allocation — deliberately not an `Rc`. There is no `Drop` impl (a type
/// cannot be both `Copy` and `Drop`, which is exactly the point): a
/// handle going out of scope without an explicit [`Object::unref`] leaks
/// rather than silently double-freeing or needing to resurrect itself
/// mid-drop to hand to a dispatched finalizer. Lifetime is managed
/// entirely through [`Object::alloc`]/[`Object::ref_`]/[`Object::unref`]/
/// [`Object::dup`], mirroring the reference design's `sc_object_t *` and
/// the teacher's hand-managed `GcHeader`.
#[derive(Clone, Copy)]
pub struct Object(NonNull<ObjectInner>);

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:p})", self.0.as_ptr())
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Object {}

impl std::hash::Hash for Object {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.as_ptr().hash(state);
    }
}

impl Object {
    /// `alloc`: a fresh object, refcount 1, no delegates, no table, a
    /// null data slot.
    pub fn alloc() -> Self {
        let inner = ObjectInner {
            header: ObjectHeader::new(),
            delegates: DelegateStack::new(),
            table: EntryTable::new(),
            data: Cell::new(std::ptr::null_mut()),
        };
        let boxed = Box::new(inner);
        Object(NonNull::from(Box::leak(boxed)))
    }

    fn inner(&self) -> &ObjectInner {
        // SAFETY: a live Object handle always points at a still-allocated
        // ObjectInner. The last unref is required to be the last use of
        // any handle copy, per the refcount discipline this type enforces.
        unsafe { self.0.as_ref() }
    }

    /// `ref`: increment this object's refcount.
    pub fn ref_(&self) {
        self.inner().header.incr();
    }

    /// `dup`: `ref` and return the same handle, for the common
    /// "store another copy" pattern.
    pub fn dup(&self) -> Self {
        self.ref_();
        *self
    }

    /// `unref`: decrement the refcount; on reaching zero, dispatch
    /// `finalize` and free the allocation. The handle (and any copies of
    /// it) must not be used again afterwards.
    pub fn unref(self) {
        if self.inner().header.decr() {
            crate::lifecycle::finalize(self);
            // SAFETY: refcount just reached 0 and finalize has run. By
            // this type's ownership discipline nothing else holds a copy
            // of this handle.
            unsafe {
                drop(Box::from_raw(self.0.as_ptr()));
            }
        }
    }

    /// Current refcount.
    pub fn refcount(&self) -> usize {
        self.inner().header.count()
    }

    /// `push`: acquire a reference on `d` and append it as the new
    /// topmost delegate.
    pub fn push_delegate(&self, d: Object) {
        d.ref_();
        self.inner().delegates.push(d);
    }

    /// `pop`: remove the topmost delegate, releasing the reference this
    /// object held on it.
    pub fn pop_delegate(&self) {
        if let Some(d) = self.inner().delegates.pop() {
            d.unref();
        }
    }

    /// `pop_all`: release references to every delegate, top-down, then
    /// clear the sequence.
    pub fn pop_all_delegates(&self) {
        for d in self.inner().delegates.pop_all() {
            d.unref();
        }
    }

    /// `index`: the `i`-th delegate, 0 being the bottom (oldest-pushed).
    pub fn delegate_at(&self, i: usize) -> Option<Object> {
        self.inner().delegates.index(i)
    }

    /// Number of delegates currently pushed.
    pub fn delegate_count(&self) -> usize {
        self.inner().delegates.len()
    }

    /// Snapshot of delegates in search order (most recently pushed
    /// first).
    pub(crate) fn delegates_top_down(&self) -> Vec<Object> {
        self.inner().delegates.iter_top_down()
    }

    pub(crate) fn table(&self) -> &EntryTable {
        &self.inner().table
    }

    /// The object's opaque data slot. The runtime never reads through
    /// this pointer itself; it is a convenience for subclasses to stash
    /// their own state.
    pub fn data(&self) -> *mut () {
        self.inner().data.get()
    }

    /// Set the object's opaque data slot.
    pub fn set_data(&self, ptr: *mut ()) {
        self.inner().data.set(ptr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests exercise the raw handle (refcount/delegate/data-slot
    // mechanics) in isolation from the lifecycle layer, so they never
    // call `unref()` to zero on a bare `Object::alloc()` — doing so would
    // dispatch through `finalize`, which requires the object to delegate
    // to a klass (see `lifecycle::tests` and `klass::tests` for that).
    // The allocations below are intentionally leaked.

    #[test]
    fn alloc_starts_with_refcount_one_and_no_delegates() {
        let o = Object::alloc();
        assert_eq!(o.refcount(), 1);
        assert_eq!(o.delegate_count(), 0);
    }

    #[test]
    fn dup_increments_and_returns_same_identity() {
        let o = Object::alloc();
        let d = o.dup();
        assert_eq!(o, d);
        assert_eq!(o.refcount(), 2);
    }

    #[test]
    fn push_delegate_acquires_a_reference() {
        let parent = Object::alloc();
        let child = Object::alloc();
        parent.push_delegate(child);
        assert_eq!(child.refcount(), 2);
        assert_eq!(parent.delegate_at(0), Some(child));
        parent.pop_delegate();
        assert_eq!(child.refcount(), 1);
    }

    #[test]
    fn data_slot_round_trips_a_pointer() {
        let o = Object::alloc();
        let mut x = 42i32;
        o.set_data((&mut x) as *mut i32 as *mut ());
        assert_eq!(o.data() as *mut i32, &mut x as *mut i32);
    }
}
