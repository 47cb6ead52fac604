//! Structural equality of JSON values.
//!
//! `enum`, `const`, `uniqueItems` and `multipleOf` all compare numbers with
//! the same policy: integers that fit in `i64`/`u64` are compared exactly,
//! anything else is compared as `f64` within a relative tolerance of
//! [`FLOAT_TOLERANCE`](constant.FLOAT_TOLERANCE.html).

use serde_json::{Number, Value};

/// Relative tolerance for floating point comparisons: `a` and `b` are equal
/// when `|a - b| <= FLOAT_TOLERANCE * max(1, |a|, |b|)`.
pub const FLOAT_TOLERANCE: f64 = 1e-9;

/// Deep equality. `1` and `1.0` are equal; object key order is irrelevant.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, a)| b.get(key).map_or(false, |b| json_equal(a, b)))
        }
        _ => false,
    }
}

pub fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => floats_equal(a, b),
        _ => false,
    }
}

pub fn floats_equal(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= FLOAT_TOLERANCE * scale
}

/// Whether `n` is an integer multiple of `divisor`. `divisor` must be > 0.
pub fn is_multiple_of(n: &Number, divisor: f64) -> bool {
    if divisor.fract() == 0.0 && divisor <= i64::MAX as f64 {
        if let Some(i) = n.as_i64() {
            return i % (divisor as i64) == 0;
        }
    }

    match n.as_f64() {
        Some(value) => {
            let quotient = value / divisor;
            quotient.is_finite() && floats_equal(quotient, quotient.round())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_and_floats_compare_numerically() {
        assert!(json_equal(&json!(1), &json!(1.0)));
        assert!(json_equal(&json!([1, { "a": 2 }]), &json!([1.0, { "a": 2.0 }])));
        assert!(!json_equal(&json!(1), &json!(2)));
        assert!(!json_equal(&json!(1), &json!("1")));
    }

    #[test]
    fn object_key_order_is_irrelevant() {
        let a: Value = serde_json::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b": 2, "a": 1}"#).unwrap();
        assert!(json_equal(&a, &b));
        assert!(!json_equal(&a, &json!({ "a": 1 })));
    }

    #[test]
    fn float_tolerance() {
        assert!(floats_equal(0.1 + 0.2, 0.3));
        assert!(!floats_equal(0.3, 0.31));
    }

    #[test]
    fn multiple_of() {
        let n = |v: Value| match v {
            Value::Number(n) => n,
            _ => unreachable!(),
        };

        assert!(is_multiple_of(&n(json!(10)), 5.0));
        assert!(!is_multiple_of(&n(json!(7)), 5.0));
        assert!(is_multiple_of(&n(json!(0.3)), 0.1));
        assert!(is_multiple_of(&n(json!(4.5)), 1.5));
        assert!(!is_multiple_of(&n(json!(4.6)), 1.5));
        assert!(is_multiple_of(&n(json!(-9)), 3.0));
    }
}
