use dynobj_core::Object;

#[dynobj_macros::dispatcher]
fn accelerate(_top_o: Object, _match_o: Object, _delta: f64) {}

#[dynobj_macros::dispatcher]
fn brake(_top_o: Object, _match_o: Object) {}

#[test]
fn key_is_stable_across_calls() {
    assert_eq!(accelerate_key(), accelerate_key());
}

#[test]
fn distinct_dispatchers_get_distinct_keys() {
    assert_ne!(accelerate_key(), brake_key());
}
