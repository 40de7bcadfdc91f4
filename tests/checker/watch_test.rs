/*!
 * Checker Watching Tests
 *
 * These switch the global watch level, so they run serially.
 */

use security_proxy::checker::names_checker;
use security_proxy::monitoring::{audit, AuditSeverity, CheckDecision, CheckEvent, CheckKind};
use security_proxy::object::Namespace;
use security_proxy::{
    config, configure, Permission, SecurityChecker, SecurityConfig, Value, WatchLevel,
};
use serial_test::serial;

/// Run `f` with the given watch level, restoring the previous configuration
fn watching<F: FnOnce()>(level: WatchLevel, f: F) {
    let previous = configure(SecurityConfig {
        watch_checkers: level,
        ..(*config()).clone()
    });
    f();
    configure((*previous).clone());
}

fn events_named(name: &str) -> Vec<CheckEvent> {
    audit()
        .recent(audit().capacity())
        .into_iter()
        .filter(|event| event.name == name)
        .collect()
}

#[test]
#[serial]
fn test_watch_all_records_grants_and_denials() {
    let checker = names_checker(["watch_all_granted"], Permission::Public);
    let target = Value::object(Namespace::new());

    watching(WatchLevel::All, || {
        checker.check(&target, "watch_all_granted").unwrap();
        checker.check(&target, "watch_all_denied").unwrap_err();
    });

    let granted = events_named("watch_all_granted");
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].decision, CheckDecision::Public);
    assert_eq!(granted[0].severity, AuditSeverity::Info);

    let denied = events_named("watch_all_denied");
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].decision, CheckDecision::Forbidden);
    assert_eq!(denied[0].severity, AuditSeverity::Warning);
    assert!(audit().denial_count("watch_all_denied") >= 1);
}

#[test]
#[serial]
fn test_watch_denials_skips_grants() {
    let checker = names_checker(["watch_denials_granted"], Permission::Public);
    let target = Value::object(Namespace::new());

    watching(WatchLevel::Denials, || {
        checker.check(&target, "watch_denials_granted").unwrap();
        checker.check_setattr(&target, "watch_denials_write").unwrap_err();
    });

    assert!(events_named("watch_denials_granted").is_empty());
    let denied = events_named("watch_denials_write");
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].kind, CheckKind::Write);
    assert_eq!(
        denied[0].severity,
        AuditSeverity::Critical,
        "Refused writes are critical"
    );
}

#[test]
#[serial]
fn test_watch_off_records_nothing() {
    let checker = names_checker(Vec::<String>::new(), Permission::Public);
    let target = Value::object(Namespace::new());

    watching(WatchLevel::Off, || {
        checker.check(&target, "watch_off_denied").unwrap_err();
    });

    assert!(events_named("watch_off_denied").is_empty());
    assert_eq!(audit().denial_count("watch_off_denied"), 0);
}

#[test]
fn test_event_serializes_with_timestamp() {
    let event = CheckEvent::new(
        "builtins.list",
        "append",
        CheckKind::Read,
        CheckDecision::Unauthorized,
        Some(Permission::named("Edit")),
    );

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["decision"], "unauthorized");
    assert_eq!(json["permission"]["id"], "Edit");
    assert!(json["logged_at"].is_i64());
}
