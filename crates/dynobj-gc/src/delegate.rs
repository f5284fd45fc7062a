//! The delegate stack (C3): an ordered sequence of parent objects.
//!
//! This module is deliberately refcount-agnostic — it is the "resizable
//! array" collaborator of spec §6, not the ref-acquiring `push`/`pop` of
//! spec §4.3. `dynobj-core::object` wraps it with the actual `ref`/`unref`
//! calls, the way the reference design layers `sc_array_t` underneath
//! `sc_object_delegate_push`/`pop`.

use std::cell::RefCell;

/// An ordered, LIFO-searched sequence of delegate handles.
#[derive(Debug)]
pub struct DelegateStack<T> {
    inner: RefCell<Vec<T>>,
}

impl<T> Default for DelegateStack<T> {
    fn default() -> Self {
        Self {
            inner: RefCell::new(Vec::new()),
        }
    }
}

impl<T: Copy> DelegateStack<T> {
    /// An empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the top.
    pub fn push(&self, d: T) {
        self.inner.borrow_mut().push(d);
    }

    /// Remove and return the top, if any.
    pub fn pop(&self) -> Option<T> {
        self.inner.borrow_mut().pop()
    }

    /// Drain every delegate, top-down (index `n-1` down to `0`) — the
    /// order the caller must release references in.
    pub fn pop_all(&self) -> Vec<T> {
        let mut v = self.inner.borrow_mut();
        let mut drained: Vec<T> = v.drain(..).collect();
        drained.reverse();
        drained
    }

    /// The `i`-th delegate (0 is the bottom / oldest).
    pub fn index(&self, i: usize) -> Option<T> {
        self.inner.borrow().get(i).copied()
    }

    /// Number of delegates currently pushed.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// True if no delegates are pushed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot in search order: most-recently pushed first.
    pub fn iter_top_down(&self) -> Vec<T> {
        let mut v = self.inner.borrow().clone();
        v.reverse();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_restores_empty_stack() {
        let s: DelegateStack<u32> = DelegateStack::new();
        s.push(1);
        s.push(2);
        assert_eq!(s.len(), 2);
        assert_eq!(s.pop(), Some(2));
        assert_eq!(s.pop(), Some(1));
        assert!(s.is_empty());
    }

    #[test]
    fn iter_top_down_is_lifo() {
        let s: DelegateStack<u32> = DelegateStack::new();
        s.push(1);
        s.push(2);
        s.push(3);
        assert_eq!(s.iter_top_down(), vec![3, 2, 1]);
    }

    #[test]
    fn index_zero_is_the_oldest() {
        let s: DelegateStack<u32> = DelegateStack::new();
        s.push(10);
        s.push(20);
        assert_eq!(s.index(0), Some(10));
        assert_eq!(s.index(1), Some(20));
        assert_eq!(s.index(2), None);
    }

    #[test]
    fn pop_all_drains_top_down() {
        let s: DelegateStack<u32> = DelegateStack::new();
        s.push(1);
        s.push(2);
        s.push(3);
        assert_eq!(s.pop_all(), vec![3, 2, 1]);
        assert!(s.is_empty());
    }
}
