/*!
 * Interaction Tests
 */

use security_proxy::checker::names_checker;
use security_proxy::object::Namespace;
use security_proxy::{
    check_permission, end_interaction, new_interaction, query_interaction, Interaction,
    InteractionGuard, Permission, PermissionSet, SecurityError, SecurityProxy, Value,
};
use std::sync::Arc;
use std::thread;

#[test]
fn test_guard_lifecycle() {
    assert!(query_interaction().is_none());
    {
        let _guard = InteractionGuard::enter(Arc::new(PermissionSet::empty())).unwrap();
        assert!(query_interaction().is_some());

        let err = InteractionGuard::enter(Arc::new(PermissionSet::empty())).unwrap_err();
        assert!(matches!(err, SecurityError::ExistingInteraction));
    }
    assert!(query_interaction().is_none(), "Dropping the guard ends the interaction");
}

#[test]
fn test_explicit_lifecycle() {
    new_interaction(Arc::new(PermissionSet::new(["View"]))).unwrap();
    assert!(check_permission(&Permission::named("View"), &Value::None).unwrap());
    assert!(end_interaction().is_some());
    assert!(end_interaction().is_none());
}

#[test]
fn test_public_without_interaction() {
    assert!(check_permission(&Permission::Public, &Value::None).unwrap());
    assert!(matches!(
        check_permission(&Permission::named("View"), &Value::None),
        Err(SecurityError::NoInteraction)
    ));
}

#[test]
fn test_interaction_is_thread_local() {
    let _guard = InteractionGuard::enter(Arc::new(PermissionSet::new(["View"]))).unwrap();
    let proxy = SecurityProxy::wrap(
        Value::object(Namespace::with_attrs([("a", Value::Int(1))])),
        names_checker(["a"], Permission::named("View")).into_ref(),
    );
    assert!(proxy.get_attr("a").is_ok());

    let handle = thread::spawn(move || {
        assert!(query_interaction().is_none());
        matches!(proxy.get_attr("a"), Err(SecurityError::NoInteraction))
    });
    assert!(
        handle.join().unwrap(),
        "Another thread must not see this thread's interaction"
    );
}

/// Grants everything on one object only
struct OwnerOnly {
    owned: Value,
}

impl Interaction for OwnerOnly {
    fn check_permission(&self, _permission: &Permission, object: &Value) -> bool {
        object.is(&self.owned)
    }
}

#[test]
fn test_interaction_sees_raw_target() {
    let mine = Value::object(Namespace::with_attrs([("a", Value::Int(1))]));
    let theirs = Value::object(Namespace::with_attrs([("a", Value::Int(2))]));
    let checker = names_checker(["a"], Permission::named("Own")).into_ref();
    let _guard = InteractionGuard::enter(Arc::new(OwnerOnly {
        owned: mine.clone(),
    }))
    .unwrap();

    let my_proxy = SecurityProxy::wrap(mine, checker.clone());
    let their_proxy = SecurityProxy::wrap(theirs, checker);

    assert_eq!(my_proxy.get_attr("a").unwrap(), Value::Int(1));
    assert!(their_proxy.get_attr("a").unwrap_err().is_unauthorized());
}
