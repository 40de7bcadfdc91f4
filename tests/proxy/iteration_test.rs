/*!
 * Iteration Tests
 */

use super::support::{proxy, public_checker, Counter};
use pretty_assertions::assert_eq;
use security_proxy::object::{List, SequenceIterator};
use security_proxy::{get_object, HostError, Operation, SecurityError, Value};

#[test]
fn test_iterate_proxied_list() {
    let list = List::value([Value::Int(1), Value::Int(2), Value::Int(3)]);
    let p = proxy(list, public_checker(&["__iter__"]));

    let iterator = p.iterate().unwrap();
    assert!(iterator.is_proxy(), "Iterators are proxied by their registered checker");

    let items: Vec<Value> = p
        .try_iter()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(items, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_iterated_objects_are_proxied() {
    let list = List::value([Counter::value(1), Counter::value(2)]);
    let p = proxy(list, public_checker(&["__iter__"]));

    for item in p.try_iter().unwrap() {
        let item = item.unwrap();
        assert!(item.is_proxy());
        assert!(item.get_attr("x").unwrap_err().is_forbidden());
    }
}

#[test]
fn test_iter_forbidden_when_target_iterable() {
    let p = proxy(List::value([Value::Int(1)]), public_checker(&["__len__"]));

    let err = p.iterate().unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(err.checked_name(), Some("__iter__"));
}

#[test]
fn test_iter_allowed_when_target_not_iterable() {
    // The check passes so the caller sees the target's own failure
    let p = proxy(Counter::value(1), public_checker(&[]));

    let err = p.iterate().unwrap_err();
    assert!(
        matches!(err, SecurityError::Host(HostError::Type(_))),
        "Expected the target's type error, got {:?}",
        err
    );
}

#[test]
fn test_next_checked_as_attribute() {
    let tuple = Value::tuple([Value::Int(7)]);
    let iterator = Value::object(SequenceIterator::new(tuple));

    let denied = proxy(iterator.clone(), public_checker(&["__iter__"]));
    let err = denied.next_item().unwrap_err();
    assert_eq!(err.checked_name(), Some("__next__"));

    let allowed = proxy(iterator, public_checker(&["__next__"]));
    assert_eq!(allowed.next_item().unwrap(), Some(Value::Int(7)));
    assert_eq!(allowed.next_item().unwrap(), None);
}

#[test]
fn test_dispatch_next_exhausted() {
    let iterator = Value::object(SequenceIterator::new(Value::tuple([])));
    let p = proxy(iterator, public_checker(&["__next__"]));

    let err = p.as_proxy().unwrap().dispatch(Operation::Next, &[]).unwrap_err();
    assert!(matches!(err, SecurityError::Host(HostError::StopIteration)));
}

#[test]
fn test_iterator_of_proxied_tuple() {
    let tuple = Value::tuple([Value::str("a"), Value::str("b")]);
    let p = proxy(tuple.clone(), public_checker(&["__iter__"]));

    let iterator = p.iterate().unwrap();
    let raw = get_object(&iterator);
    assert!(raw.downcast_ref::<SequenceIterator>().is_some());
    assert_eq!(iterator.next_item().unwrap(), Some(Value::str("a")));
}
