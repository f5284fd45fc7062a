//! Proc-macro sugar for declaring dynobj dispatcher keys.
//!
//! A dispatcher's key is, by convention, the address of the function
//! that defines it — two calls to the same function always produce the
//! same `dynobj_core::Key`, with no registry or central allocator
//! involved. `#[dispatcher]` saves writing that `OnceLock` boilerplate
//! by hand for every operation a subclass introduces.
//!
//! ```ignore
//! #[dynobj_macros::dispatcher]
//! fn vehicle_accelerate(top_o: Object, match_o: Object, delta: f64) {
//!     // ...
//! }
//!
//! // generated alongside it:
//! fn vehicle_accelerate_key() -> dynobj_core::Key { .. }
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, ItemFn};

/// Generate a `<name>_key() -> dynobj_core::Key` sibling function for the
/// annotated dispatcher, backed by a `OnceLock` seeded from the
/// function's own address.
///
/// The annotated item is left untouched; this only adds a sibling item,
/// so it composes with any other attribute on the function.
#[proc_macro_attribute]
pub fn dispatcher(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);
    let name = &func.sig.ident;
    let vis = &func.vis;
    let key_fn = format_ident!("{}_key", name);

    let expanded = quote! {
        #func

        #vis fn #key_fn() -> ::dynobj_core::Key {
            static KEY: ::std::sync::OnceLock<::dynobj_core::Key> = ::std::sync::OnceLock::new();
            *KEY.get_or_init(|| ::dynobj_core::Key::of_fn((#name as usize) as *const ()))
        }
    };

    expanded.into()
}
