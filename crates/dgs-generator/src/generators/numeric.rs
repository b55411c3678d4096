//! Numeric value generators.
//!
//! Ranges are half-open `[min, max)`. Equal bounds return `min` and
//! reversed bounds are swapped.

use dgs_core::Value;
use rand::Rng;

/// Generate a random integer in `[min, max)`.
pub fn generate_int_range<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> Value {
    let (min, max) = if min > max { (max, min) } else { (min, max) };
    if min == max {
        return Value::Int(min);
    }
    Value::Int(rng.random_range(min..max))
}

/// Generate a random float in `[min, max)`.
///
/// Returns `None` when the bounds are not finite or their span overflows.
pub fn generate_float_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> Option<Value> {
    if !(max - min).is_finite() {
        return None;
    }
    let (min, max) = if min > max { (max, min) } else { (min, max) };
    if min == max {
        return Some(Value::Float(min));
    }
    Some(Value::Float(rng.random_range(min..max)))
}
