//! Builds a vehicle klass, a "car" subtype that overrides acceleration,
//! and an instance of each, to show delegation precedence end to end.

mod vehicle;

use anyhow::Result;
use dynobj_core::{method_register, Object};

fn car_accelerate(top_o: Object, _match_o: Object, delta: f64) {
    println!("car {top_o:?}: accelerating by {delta} (car override, faster pickup)");
}

fn main() -> Result<()> {
    let vehicle_klass = vehicle::vehicle_klass_new();

    let car_klass = Object::alloc();
    car_klass.push_delegate(vehicle_klass);
    // Registered under vehicle's own dispatcher key, not a key of its
    // own, so `vehicle::accelerate`'s search finds this entry first and
    // never reaches the vehicle klass's default behavior.
    method_register(car_klass, vehicle::default_accelerate_key(), car_accelerate as fn(Object, Object, f64));
    dynobj_core::initialize(car_klass, None);
    vehicle_klass.unref();

    let plain = vehicle::vehicle_new(vehicle_klass);
    let car = vehicle::vehicle_new(car_klass);

    vehicle::accelerate(plain, 5.0);
    vehicle::accelerate(car, 5.0);

    plain.unref();
    car.unref();
    car_klass.unref();

    Ok(())
}
