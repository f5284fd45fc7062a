#![warn(clippy::all)]
#![warn(missing_docs)]

//! Low-level primitives backing the dynobj object runtime.
//!
//! This crate knows about refcount headers, entry tables, and delegate
//! stacks — and nothing else. It does not know what a "klass" is, how
//! search works, or what order `initialize`/`finalize` run their matches
//! in; `dynobj-core` builds all of that on top. The split mirrors the
//! teacher workspace's separation between `otter-vm-gc` (headers,
//! allocation) and `otter-vm-core` (the object model built on it).

pub mod delegate;
pub mod entry;
pub mod header;
pub mod key;

pub use delegate::DelegateStack;
pub use entry::{DataBuffer, Entry, EntryTable, RawMethod};
pub use header::ObjectHeader;
pub use key::Key;
