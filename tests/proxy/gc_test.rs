/*!
 * Cycle Traversal and Clearing Tests
 */

use super::support::public_checker;
use pretty_assertions::assert_eq;
use security_proxy::checker::{names_checker, same_checker, Checker};
use security_proxy::object::Namespace;
use security_proxy::{
    get_object, Permission, Referent, SecurityChecker, SecurityError, SecurityProxy, Traverse,
    Value,
};
use std::sync::Arc;

#[test]
fn test_traverse_reports_target_and_checker() {
    let target = Value::object(Namespace::new());
    let checker = public_checker(&["a"]);
    let p = SecurityProxy::wrap(target.clone(), checker.clone());

    let mut values = Vec::new();
    let mut checkers = Vec::new();
    p.traverse(&mut |referent| match referent {
        Referent::Value(value) => values.push(value.clone()),
        Referent::Checker(found) => checkers.push(found.clone()),
    });

    assert_eq!(values.len(), 1);
    assert!(values[0].is(&target));
    assert_eq!(checkers.len(), 1);
    assert!(same_checker(&checkers[0], &checker));
}

#[test]
fn test_clear_breaks_self_cycle() {
    let namespace = Value::object(Namespace::new());
    let weak = match &namespace {
        Value::Object(object) => Arc::downgrade(object),
        _ => unreachable!(),
    };
    let p = SecurityProxy::wrap(namespace.clone(), public_checker(&["me"]));
    // The target holds its own proxy
    namespace.set_attr("me", Value::Proxy(p.clone())).unwrap();
    drop(namespace);

    assert!(weak.upgrade().is_some(), "Cycle keeps the target alive");

    p.clear();

    assert!(weak.upgrade().is_none(), "Clearing must release the target");
    assert!(p.is_cleared());
}

#[test]
fn test_cleared_proxy_fails_cleanly() {
    let p = SecurityProxy::wrap(Value::object(Namespace::new()), public_checker(&["a"]));
    let value = Value::Proxy(p.clone());
    p.clear();

    assert!(matches!(p.get_attr("a"), Err(SecurityError::ProxyCleared)));
    assert!(matches!(p.to_str(), Err(SecurityError::ProxyCleared)));
    assert!(matches!(p.checker(), Err(SecurityError::ProxyCleared)));
    assert!(get_object(&value).is_none());
    assert!(p.default_repr().contains("(cleared)"));

    // Clearing twice is harmless
    p.clear();
    let mut visited = 0;
    p.traverse(&mut |_| visited += 1);
    assert_eq!(visited, 0);
}

#[test]
fn test_checker_clear_drops_permissions() {
    let checker = names_checker(["a"], Permission::Public);
    let target = Value::object(Namespace::new());
    checker.check(&target, "a").unwrap();

    checker.clear();

    assert!(checker.read_permissions().is_empty());
    assert!(checker.check(&target, "a").unwrap_err().is_forbidden());
}

#[test]
fn test_checker_without_references() {
    let checker = Checker::empty();
    let mut visited = 0;
    checker.traverse(&mut |_| visited += 1);
    assert_eq!(visited, 0);
}
