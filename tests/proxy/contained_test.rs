/*!
 * Contained Proxy Tests
 */

use pretty_assertions::assert_eq;
use security_proxy::checker::proxy_value;
use security_proxy::object::{List, Namespace};
use security_proxy::{ContainedProxy, SecurityError, Traverse, Value};

fn folder() -> Value {
    Value::object(Namespace::with_attrs([("title", Value::str("root"))]))
}

#[test]
fn test_location_lives_on_the_proxy() {
    let parent = folder();
    let target = Value::object(Namespace::with_attrs([("size", Value::Int(3))]));
    let contained = ContainedProxy::value(target.clone(), parent.clone(), Value::str("child"));

    assert!(contained.get_attr("__parent__").unwrap().is(&parent));
    assert_eq!(contained.get_attr("__name__").unwrap(), Value::str("child"));
    assert_eq!(contained.get_attr("size").unwrap(), Value::Int(3));

    contained.set_attr("__name__", Value::str("renamed")).unwrap();
    assert_eq!(contained.get_attr("__name__").unwrap(), Value::str("renamed"));
    assert!(
        !target.has_attr("__name__"),
        "Location attributes must not reach the target"
    );

    contained.del_attr("__parent__").unwrap();
    assert!(contained.get_attr("__parent__").unwrap().is_none());
}

#[test]
fn test_other_attributes_forwarded() {
    let target = Value::object(Namespace::new());
    let contained = ContainedProxy::value(target.clone(), Value::None, Value::None);

    contained.set_attr("color", Value::str("red")).unwrap();
    assert_eq!(target.get_attr("color").unwrap(), Value::str("red"));
    contained.del_attr("color").unwrap();
    assert!(!target.has_attr("color"));
}

#[test]
fn test_reports_target_type() {
    let list = List::value([Value::Int(1), Value::Int(2)]);
    let contained = ContainedProxy::value(list, folder(), Value::str("items"));

    assert_eq!(contained.object_type(), List::object_type());
    assert_eq!(contained.length().unwrap(), 2);

    // Security applies through the list's registered checker
    let secured = proxy_value(contained).unwrap();
    assert!(secured.is_proxy());
    assert_eq!(secured.length().unwrap(), 2);
    assert!(secured.get_attr("append").unwrap_err().is_forbidden());
}

#[test]
fn test_cleared_contained_proxy() {
    let contained = ContainedProxy::value(folder(), folder(), Value::str("x"));
    let inner = contained.downcast_ref::<ContainedProxy>().unwrap();

    let mut visited = 0;
    Traverse::traverse(inner, &mut |_| visited += 1);
    assert_eq!(visited, 3);

    Traverse::clear(inner);
    assert!(matches!(
        contained.get_attr("title"),
        Err(SecurityError::ProxyCleared)
    ));
    assert!(matches!(inner.parent(), Err(SecurityError::ProxyCleared)));
}
