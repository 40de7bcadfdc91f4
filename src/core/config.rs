/*!
 * Security Configuration
 *
 * Runtime configuration for checker watching, resolution bounds and the
 * audit trail. Loaded from the environment on first use and replaceable
 * at runtime through `configure()`.
 */

use super::limits::{
    DEFAULT_AUDIT_CAPACITY, DEFAULT_MAX_RESOLUTION_DEPTH, ENV_AUDIT_CAPACITY,
    ENV_MAX_RESOLUTION_DEPTH, ENV_WATCH_CHECKERS, MAX_AUDIT_CAPACITY,
};
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

/// How much checker activity is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchLevel {
    /// Nothing is reported
    Off,
    /// Unauthorized and forbidden checks are reported
    Denials,
    /// Every check is reported, including grants
    All,
}

impl WatchLevel {
    /// Interpret a verbosity number (0 = off, 1 = denials, >1 = all)
    pub fn from_verbosity(verbosity: i64) -> Self {
        match verbosity {
            i64::MIN..=0 => WatchLevel::Off,
            1 => WatchLevel::Denials,
            _ => WatchLevel::All,
        }
    }

    /// Parse an environment value; anything non-numeric means denials
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return WatchLevel::Off;
        }
        raw.parse::<i64>()
            .map(Self::from_verbosity)
            .unwrap_or(WatchLevel::Denials)
    }

    #[inline]
    pub fn is_enabled(self) -> bool {
        self != WatchLevel::Off
    }
}

/// Security configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Checker watch level
    pub watch_checkers: WatchLevel,
    /// Maximum factory calls during checker resolution
    pub max_resolution_depth: usize,
    /// Events retained by the audit trail
    pub audit_capacity: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            watch_checkers: WatchLevel::Off,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }
}

impl SecurityConfig {
    /// Configuration with every check reported
    pub fn watching() -> Self {
        Self {
            watch_checkers: WatchLevel::All,
            ..Self::default()
        }
    }

    /// Load configuration from the process environment
    ///
    /// Environment variables:
    /// - SECURITY_WATCH_CHECKERS: 0/1/N watch level (default: 0)
    /// - SECURITY_MAX_RESOLUTION_DEPTH: factory chain bound (default: 32)
    /// - SECURITY_AUDIT_CAPACITY: audit ring buffer size (default: 1000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let watch_checkers = lookup(ENV_WATCH_CHECKERS)
            .map(|raw| WatchLevel::parse(&raw))
            .unwrap_or(defaults.watch_checkers);

        let max_resolution_depth = lookup(ENV_MAX_RESOLUTION_DEPTH)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|depth| *depth > 0)
            .unwrap_or(defaults.max_resolution_depth);

        let audit_capacity = lookup(ENV_AUDIT_CAPACITY)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .map(|capacity| capacity.min(MAX_AUDIT_CAPACITY))
            .unwrap_or(defaults.audit_capacity);

        Self {
            watch_checkers,
            max_resolution_depth,
            audit_capacity,
        }
    }
}

static GLOBAL_CONFIG: LazyLock<ArcSwap<SecurityConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(SecurityConfig::from_env()));

/// Current global configuration
#[inline]
pub fn config() -> Arc<SecurityConfig> {
    GLOBAL_CONFIG.load_full()
}

/// Current watch level, read without cloning the configuration
#[inline]
pub fn watch_level() -> WatchLevel {
    GLOBAL_CONFIG.load().watch_checkers
}

/// Replace the global configuration, returning the previous one
///
/// The global audit ring is resized when `audit_capacity` changes.
pub fn configure(config: SecurityConfig) -> Arc<SecurityConfig> {
    log::debug!("Security configuration updated: {:?}", config);
    let capacity = config.audit_capacity;
    let previous = GLOBAL_CONFIG.swap(Arc::new(config));
    if previous.audit_capacity != capacity {
        crate::monitoring::audit().resize(capacity);
    }
    previous
}
