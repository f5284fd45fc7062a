//! A "vehicle" subtype layered on the base object runtime, after the
//! reference design's `vehicle_accelerate`: a public entry point that
//! asserts its type and forwards the call to whatever implementation is
//! actually registered somewhere in the instance's delegation graph,
//! rather than hard-coding a single vehicle-wide behavior.

use dynobj_core::{is_type, klass_new, method_register, method_search, new_from_klass, Object};

/// The type string a vehicle instance answers `true` for under `is_type`.
pub const VEHICLE_TYPE: &str = "vehicle";

type AccelerateFn = fn(Object, Object, f64);

#[dynobj_macros::dispatcher]
pub(crate) fn default_accelerate(top_o: Object, _match_o: Object, delta: f64) {
    println!("vehicle {top_o:?}: accelerating by {delta} (base vehicle behavior)");
}

fn vehicle_is_type(_top_o: Object, _match_o: Object, typestr: &str) -> bool {
    typestr == VEHICLE_TYPE
}

/// Build the root "vehicle" klass: delegates to a base `dynobj` klass for
/// `is_type`/`finalize`/`write`, answers `true` for [`VEHICLE_TYPE`], and
/// carries the default acceleration behavior.
pub fn vehicle_klass_new() -> Object {
    let base = klass_new();
    let kl = Object::alloc();
    kl.push_delegate(base);
    method_register(kl, dynobj_core::lifecycle::is_type_key(), vehicle_is_type as dynobj_core::lifecycle::IsTypeFn);
    method_register(kl, default_accelerate_key(), default_accelerate as AccelerateFn);
    dynobj_core::initialize(kl, None);
    base.unref();
    kl
}

/// Build a new vehicle instance delegating to `klass`.
pub fn vehicle_new(klass: Object) -> Object {
    new_from_klass(klass, None)
}

/// The public, polymorphic entry point: find whatever acceleration
/// behavior is registered on `o`'s delegation graph and invoke it. A
/// subtype overrides this by registering its own fn under
/// [`default_accelerate_key`] closer to `o` than the base vehicle klass.
pub fn accelerate(o: Object, delta: f64) {
    assert!(is_type(o, VEHICLE_TYPE), "accelerate: object is not a vehicle");
    let (found, owner) = method_search(o, default_accelerate_key(), false);
    if let Some(raw) = found {
        // SAFETY: only ever registered under default_accelerate_key()
        // with AccelerateFn's signature, here or by a vehicle subtype.
        let f: AccelerateFn = unsafe { raw.cast() };
        f(o, owner.expect("method_search: a match always reports its owner"), delta);
    }
}
