/*!
 * Numeric Protocol Tests
 */

use super::support::{proxy, public_checker, Counter};
use pretty_assertions::assert_eq;
use security_proxy::{get_object, BinaryOp, UnaryOp, Value};

#[test]
fn test_binary_left_operand() {
    let p = proxy(Counter::value(5), public_checker(&["__add__"]));

    let sum = p.binary(BinaryOp::Add, &Value::Int(2)).unwrap();
    assert!(sum.is_proxy());
    assert_eq!(Counter::get(&get_object(&sum)), 7);

    let err = p.binary(BinaryOp::Sub, &Value::Int(2)).unwrap_err();
    assert_eq!(err.checked_name(), Some("__sub__"));
}

#[test]
fn test_binary_right_operand_checks_reflected_name() {
    let p = proxy(Counter::value(5), public_checker(&["__rsub__"]));

    let difference = Value::Int(10).binary(BinaryOp::Sub, &p).unwrap();
    assert_eq!(Counter::get(&get_object(&difference)), 5);

    let forward_only = proxy(Counter::value(5), public_checker(&["__sub__"]));
    let err = Value::Int(10).binary(BinaryOp::Sub, &forward_only).unwrap_err();
    assert_eq!(err.checked_name(), Some("__rsub__"));
}

#[test]
fn test_ternary_pow_with_proxied_modulus() {
    let modulus = proxy(Value::Int(5), public_checker(&["__3pow__"]));

    let result = Value::Int(2).pow(&Value::Int(10), Some(&modulus)).unwrap();
    assert_eq!(result, Value::Int(4), "Integer results are never proxied");

    let guarded = proxy(Value::Int(5), public_checker(&["__pow__", "__rpow__"]));
    let err = Value::Int(2).pow(&Value::Int(10), Some(&guarded)).unwrap_err();
    assert_eq!(err.checked_name(), Some("__3pow__"));
}

#[test]
fn test_ternary_pow_with_proxied_base_and_exponent() {
    let base = proxy(Counter::value(3), public_checker(&["__pow__"]));
    assert_eq!(
        base.pow(&Value::Int(2), Some(&Value::Int(5))).unwrap(),
        Value::Int(4)
    );

    let exp = proxy(Value::Int(3), public_checker(&["__rpow__"]));
    assert_eq!(
        Value::Int(2).pow(&exp, Some(&Value::Int(5))).unwrap(),
        Value::Int(3)
    );
}

#[test]
fn test_inplace_returns_same_proxy() {
    let target = Counter::value(1);
    let p = proxy(target.clone(), public_checker(&["__iadd__"]));

    let result = p.inplace(BinaryOp::Add, &Value::Int(4)).unwrap();
    assert!(result.is(&p), "In-place mutation must keep the proxy identity");
    assert_eq!(Counter::get(&target), 5);
}

#[test]
fn test_inplace_new_result_is_proxied() {
    let target = Counter::value(10);
    let p = proxy(target.clone(), public_checker(&["__isub__"]));

    let result = p.inplace(BinaryOp::Sub, &Value::Int(4)).unwrap();
    assert!(result.is_proxy());
    assert!(!result.is(&p));
    assert_eq!(Counter::get(&get_object(&result)), 6);
    assert_eq!(Counter::get(&target), 10);
}

#[test]
fn test_inplace_denied() {
    let p = proxy(Counter::value(1), public_checker(&["__add__"]));

    let err = p.inplace(BinaryOp::Add, &Value::Int(1)).unwrap_err();
    assert_eq!(err.checked_name(), Some("__iadd__"));

    // No in-place form: checked as the plain operator
    let err = p.inplace(BinaryOp::DivMod, &Value::Int(1)).unwrap_err();
    assert_eq!(err.checked_name(), Some("__divmod__"));
}

#[test]
fn test_unary() {
    let p = proxy(Counter::value(5), public_checker(&["__neg__", "__int__"]));

    let negated = p.unary(UnaryOp::Neg).unwrap();
    assert_eq!(Counter::get(&get_object(&negated)), -5);
    assert_eq!(p.unary(UnaryOp::Int).unwrap(), Value::Int(5));

    let err = p.unary(UnaryOp::Abs).unwrap_err();
    assert_eq!(err.checked_name(), Some("__abs__"));
}

#[test]
fn test_coerce_keeps_identities() {
    let p = proxy(Counter::value(5), public_checker(&["__coerce__"]));

    let (left, right) = p.coerce(&Value::Int(3)).unwrap().unwrap();
    assert!(left.is(&p), "Left result that is the target stays this proxy");
    assert!(right.is_proxy(), "New right result is proxied");
    assert_eq!(Counter::get(&get_object(&right)), 3);

    let other = Counter::value(8);
    let (_, right) = p.coerce(&other).unwrap().unwrap();
    assert!(right.is(&other), "Right result that is the operand is returned as is");

    assert!(p.coerce(&Value::str("text")).unwrap().is_none());
}

#[test]
fn test_coerce_with_proxy_on_the_right() {
    let p = proxy(Counter::value(5), public_checker(&["__coerce__"]));

    let (left, right) = Value::Int(3).coerce(&p).unwrap().unwrap();
    assert!(right.is(&p));
    assert_eq!(Counter::get(&get_object(&left)), 3);
}

#[test]
fn test_coerce_denied() {
    let p = proxy(Counter::value(5), public_checker(&[]));

    let err = p.coerce(&Value::Int(3)).unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(err.checked_name(), Some("__coerce__"));
}
