#![warn(clippy::all)]
#![warn(missing_docs)]

//! A small prototype-based object runtime: per-instance method/data
//! tables, a directed delegation graph searched depth-first with cycle
//! protection, and a handful of framework hooks (`is_type`, `initialize`,
//! `finalize`, `copy`, `write`) dispatched through that same search
//! rather than built into the language as trait methods.
//!
//! Layering mirrors the teacher workspace: [`dynobj_gc`] is the
//! allocation-and-headers layer (refcounts, entry tables, delegate
//! stacks), this crate is the object model and dispatch semantics built
//! on top of it.

pub mod args;
pub mod klass;
pub mod lifecycle;
pub mod object;
pub mod registry;
pub mod search;

pub use args::{ArgValue, Args, ArgsBuilder, ArgsError};
pub use dynobj_gc::Key;
pub use klass::{klass_new, new_from_klass, new_from_klass_with};
pub use lifecycle::{copy, finalize, initialize, is_type, write, BASE_TYPE_NAME};
pub use object::Object;
pub use registry::{data_lookup, data_register, data_search, method_lookup, method_register, method_search, method_unregister};
pub use search::{search, Match, SearchOptions, SearchResult};
