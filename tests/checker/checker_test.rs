/*!
 * Checker Integration Tests
 */

use pretty_assertions::assert_eq;
use security_proxy::checker::{Checker, CheckerRef};
use security_proxy::core::types::permission_map;
use security_proxy::object::{List, Namespace};
use security_proxy::{
    multi_checker, names_checker, CheckerSpec, CombinedChecker, InteractionGuard, NamesChecker,
    Permission, PermissionSet, SecurityChecker, SecurityError, SecurityProxy, SecurityResult,
    Value,
};
use std::sync::Arc;

fn document() -> Value {
    Value::object(Namespace::with_attrs([
        ("title", Value::str("Report")),
        ("body", Value::str("...")),
        ("owner", Value::str("alice")),
    ]))
}

#[test]
fn test_public_check_without_interaction() {
    let checker = names_checker(["title"], Permission::Public);

    assert!(checker.check(&document(), "title").is_ok());
    assert!(checker.check(&document(), "body").unwrap_err().is_forbidden());
}

#[test]
fn test_allow_list_applies_to_reads_only() {
    let checker = Checker::empty();
    let doc = document();

    assert!(checker.check(&doc, "__repr__").is_ok());
    assert!(checker.check(&doc, "__eq__").is_ok());
    assert!(checker.check(&doc, "__getitem__").unwrap_err().is_forbidden());
    assert!(checker.check_setattr(&doc, "__repr__").unwrap_err().is_forbidden());
}

#[test]
fn test_iter_rule() {
    let checker = Checker::empty();

    assert!(
        checker.check(&document(), "__iter__").is_ok(),
        "Objects without __iter__ may be asked to iterate"
    );
    let err = checker.check(&List::value([]), "__iter__").unwrap_err();
    assert!(err.is_forbidden());
}

#[test]
fn test_grants_after_construction() {
    let checker = Checker::empty();
    let doc = document();

    checker.grant_read("title", Permission::Public);
    checker.grant_write("title", Permission::named("Edit"));

    assert!(checker.check_getattr(&doc, "title").is_ok());
    assert_eq!(checker.permission_id("title"), Some(Permission::Public));
    assert_eq!(
        checker.setattr_permission_id("title"),
        Some(Permission::named("Edit"))
    );
    assert_eq!(checker.setattr_permission_id("body"), None);
}

#[test]
fn test_separate_write_map() {
    let checker = Checker::new(
        permission_map([("title", Permission::Public)]),
        Some(permission_map([("title", "Edit")])),
    );
    let doc = document();
    let _guard = InteractionGuard::enter(Arc::new(PermissionSet::new(["Edit"]))).unwrap();

    assert!(checker.check_setattr(&doc, "title").is_ok());
    assert!(checker.check_setattr(&doc, "body").unwrap_err().is_forbidden());
}

#[test]
fn test_names_checker_builder() {
    let checker = NamesChecker::new(["title", "body"], Permission::Public)
        .with("owner", "View")
        .build()
        .unwrap();

    assert_eq!(checker.permission_id("body"), Some(Permission::Public));
    assert_eq!(checker.permission_id("owner"), Some(Permission::named("View")));

    let err = NamesChecker::new(["title"], Permission::Public)
        .with("title", "View")
        .build()
        .unwrap_err();
    assert!(matches!(err, SecurityError::Duplication(name) if name == "title"));
}

#[test]
fn test_multi_checker_merges_specs() {
    let checker = multi_checker([
        CheckerSpec::names(["title", "body"], Permission::Public),
        CheckerSpec::Map(permission_map([("owner", "View")])),
        // Repeating a name with the same permission is not a conflict
        CheckerSpec::names(["title"], Permission::Public),
    ])
    .unwrap();

    assert_eq!(checker.read_permissions().len(), 3);

    let err = multi_checker([
        CheckerSpec::names(["owner"], Permission::Public),
        CheckerSpec::Map(permission_map([("owner", "View")])),
    ])
    .unwrap_err();
    assert!(matches!(err, SecurityError::Duplication(_)));
}

fn combined() -> CombinedChecker {
    CombinedChecker::new(
        names_checker(["title"], Permission::Public).into_ref(),
        names_checker(["owner"], Permission::named("View")).into_ref(),
    )
}

#[test]
fn test_combined_grants_when_either_grants() {
    let checker = combined();
    let doc = document();
    let _guard = InteractionGuard::enter(Arc::new(PermissionSet::new(["View"]))).unwrap();

    assert!(checker.check(&doc, "title").is_ok());
    assert!(checker.check(&doc, "owner").is_ok());
    assert_eq!(checker.permission_id("owner"), Some(Permission::named("View")));
}

#[test]
fn test_combined_prefers_unauthorized() {
    let checker = combined();
    let doc = document();
    let _guard = InteractionGuard::enter(Arc::new(PermissionSet::empty())).unwrap();

    // First half forbids, second half knows the name
    let err = checker.check(&doc, "owner").unwrap_err();
    assert!(err.is_unauthorized(), "Got {:?}", err);

    let err = checker.check(&doc, "body").unwrap_err();
    assert!(err.is_forbidden());
}

#[test]
fn test_combined_propagates_runtime_errors() {
    let checker = combined();

    // No interaction: the second half cannot decide
    let err = checker.check(&document(), "owner").unwrap_err();
    assert!(matches!(err, SecurityError::NoInteraction));
}

#[test]
fn test_combined_checker_on_proxy() {
    let proxy = SecurityProxy::wrap(document(), Arc::new(combined()));

    assert_eq!(proxy.get_attr("title").unwrap(), Value::str("Report"));
    assert!(proxy.get_attr("body").unwrap_err().is_forbidden());
}

/// Checker that hands results back unwrapped
struct Unwrapping {
    inner: Checker,
}

impl SecurityChecker for Unwrapping {
    fn permission_id(&self, name: &str) -> Option<Permission> {
        self.inner.permission_id(name)
    }

    fn setattr_permission_id(&self, name: &str) -> Option<Permission> {
        self.inner.setattr_permission_id(name)
    }

    fn check(&self, object: &Value, name: &str) -> SecurityResult<()> {
        self.inner.check(object, name)
    }

    fn check_setattr(&self, object: &Value, name: &str) -> SecurityResult<()> {
        self.inner.check_setattr(object, name)
    }

    fn proxy(&self, value: Value) -> SecurityResult<Value> {
        Ok(value)
    }
}

#[test]
fn test_custom_proxy_step() {
    let child = Value::object(Namespace::new());
    let parent = Value::object(Namespace::with_attrs([("child", child.clone())]));
    let checker: CheckerRef = Arc::new(Unwrapping {
        inner: names_checker(["child"], Permission::Public),
    });
    let proxy = SecurityProxy::wrap(parent, checker);

    let result = proxy.get_attr("child").unwrap();
    assert!(!result.is_proxy());
    assert!(result.is(&child));
}
