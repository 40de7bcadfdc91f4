/*!
 * Access Query Tests
 */

use security_proxy::checker::{proxy_value, Checker};
use security_proxy::core::types::permission_map;
use security_proxy::object::Namespace;
use security_proxy::{
    can_access, can_write, CheckerSlot, InteractionGuard, Permission, PermissionSet, Value,
};
use std::sync::Arc;

/// Record with a public title, a guarded owner and an editable title
fn record() -> Value {
    let checker = Checker::new(
        permission_map([("title", Permission::Public), ("owner", Permission::named("View"))]),
        Some(permission_map([("title", "Edit")])),
    );
    Value::object(
        Namespace::with_attrs([("title", Value::str("t")), ("owner", Value::str("o"))])
            .with_checker(CheckerSlot::Checker(checker.into_ref())),
    )
}

#[test]
fn test_can_access() {
    let _guard = InteractionGuard::enter(Arc::new(PermissionSet::empty())).unwrap();
    let value = record();

    assert!(can_access(&value, "title").unwrap());
    assert!(!can_access(&value, "owner").unwrap());
    assert!(can_access(&value, "missing").unwrap_err().is_forbidden());
}

#[test]
fn test_can_access_with_permission() {
    let _guard = InteractionGuard::enter(Arc::new(PermissionSet::new(["View"]))).unwrap();

    assert!(can_access(&record(), "owner").unwrap());
}

#[test]
fn test_can_write() {
    let _guard = InteractionGuard::enter(Arc::new(PermissionSet::empty())).unwrap();
    let value = record();

    assert!(!can_write(&value, "title").unwrap(), "Edit is not held");
    assert!(
        !can_write(&value, "owner").unwrap(),
        "Readable but not writable is read-only"
    );
    assert!(can_write(&value, "missing").unwrap_err().is_forbidden());
}

#[test]
fn test_can_write_with_permission() {
    let _guard = InteractionGuard::enter(Arc::new(PermissionSet::new(["Edit"]))).unwrap();

    assert!(can_write(&record(), "title").unwrap());
}

#[test]
fn test_unproxied_values_fully_accessible() {
    assert!(can_access(&Value::Int(1), "anything").unwrap());
    assert!(can_write(&Value::str("s"), "anything").unwrap());
}

#[test]
fn test_queries_see_through_existing_proxy() {
    let _guard = InteractionGuard::enter(Arc::new(PermissionSet::empty())).unwrap();
    let proxied = proxy_value(record()).unwrap();

    assert!(proxied.is_proxy());
    assert!(can_access(&proxied, "title").unwrap());
    assert!(!can_access(&proxied, "owner").unwrap());
}
