/*!
 * Configuration and Tracing Setup Tests
 */

use pretty_assertions::assert_eq;
use security_proxy::core::limits::{
    DEFAULT_MAX_RESOLUTION_DEPTH, ENV_AUDIT_CAPACITY, ENV_MAX_RESOLUTION_DEPTH,
    ENV_WATCH_CHECKERS, MAX_AUDIT_CAPACITY,
};
use security_proxy::monitoring::audit;
use security_proxy::{config, configure, init_tracing, SecurityConfig, WatchLevel};
use serial_test::serial;

#[test]
fn test_config_from_lookup() {
    let loaded = SecurityConfig::from_lookup(|key| match key {
        ENV_WATCH_CHECKERS => Some("2".to_string()),
        ENV_MAX_RESOLUTION_DEPTH => Some("0".to_string()),
        ENV_AUDIT_CAPACITY => Some("lots".to_string()),
        _ => None,
    });

    assert_eq!(loaded.watch_checkers, WatchLevel::All);
    assert_eq!(
        loaded.max_resolution_depth, DEFAULT_MAX_RESOLUTION_DEPTH,
        "A zero depth falls back to the default"
    );
    assert_eq!(loaded.audit_capacity, SecurityConfig::default().audit_capacity);

    let clamped = SecurityConfig::from_lookup(|key| match key {
        ENV_AUDIT_CAPACITY => Some((MAX_AUDIT_CAPACITY * 10).to_string()),
        _ => None,
    });
    assert_eq!(clamped.audit_capacity, MAX_AUDIT_CAPACITY);
}

#[test]
fn test_watch_level_verbosity() {
    assert_eq!(WatchLevel::parse(""), WatchLevel::Off);
    assert_eq!(WatchLevel::parse("1"), WatchLevel::Denials);
    assert_eq!(WatchLevel::parse("yes"), WatchLevel::Denials);
    assert_eq!(WatchLevel::from_verbosity(5), WatchLevel::All);
}

#[test]
#[serial]
fn test_configure_swaps_global() {
    let previous = configure(SecurityConfig::watching());
    assert_eq!(config().watch_checkers, WatchLevel::All);

    let replaced = configure((*previous).clone());
    assert_eq!(*replaced, SecurityConfig::watching());
    assert_eq!(*config(), *previous);
}

#[test]
#[serial]
fn test_configure_resizes_audit() {
    let previous = configure(SecurityConfig {
        audit_capacity: 7,
        ..(*config()).clone()
    });
    assert_eq!(audit().capacity(), 7);

    configure((*previous).clone());
    assert_eq!(audit().capacity(), previous.audit_capacity);
}

#[test]
fn test_tracing_installs_once() {
    init_tracing();
    assert!(!init_tracing(), "A second subscriber must not replace the first");
}
