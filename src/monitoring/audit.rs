/*!
 * Check Audit Trail
 * Bounded record of watched checker decisions
 */

use crate::core::config::config;
use crate::core::types::Permission;
use ahash::RandomState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;
use std::time::SystemTime;

/// Which permission map a check consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Read,
    Write,
}

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckDecision {
    /// Public permission
    Public,
    /// Named permission held by the interaction
    Granted,
    /// No entry, but the name is on the allow-list
    AvailableByDefault,
    /// `__iter__` on an object that cannot iterate
    NotIterable,
    Unauthorized,
    Forbidden,
}

impl CheckDecision {
    #[inline]
    pub fn is_allowed(self) -> bool {
        !matches!(self, CheckDecision::Unauthorized | CheckDecision::Forbidden)
    }
}

impl fmt::Display for CheckDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckDecision::Public => "Public",
            CheckDecision::Granted => "Granted",
            CheckDecision::AvailableByDefault => "Always available",
            CheckDecision::NotIterable => "Iteration of non-iterable",
            CheckDecision::Unauthorized => "Unauthorized",
            CheckDecision::Forbidden => "Forbidden",
        })
    }
}

/// Audit event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

/// Watched check
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckEvent {
    pub object_type: String,
    pub name: String,
    pub kind: CheckKind,
    pub decision: CheckDecision,
    pub permission: Option<Permission>,
    pub severity: AuditSeverity,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub logged_at: SystemTime,
}

impl CheckEvent {
    pub fn new(
        object_type: impl Into<String>,
        name: impl Into<String>,
        kind: CheckKind,
        decision: CheckDecision,
        permission: Option<Permission>,
    ) -> Self {
        // Refused writes are more severe than refused reads
        let severity = match (decision.is_allowed(), kind) {
            (true, _) => AuditSeverity::Info,
            (false, CheckKind::Read) => AuditSeverity::Warning,
            (false, CheckKind::Write) => AuditSeverity::Critical,
        };
        Self {
            object_type: object_type.into(),
            name: name.into(),
            kind,
            decision,
            permission,
            severity,
            logged_at: SystemTime::now(),
        }
    }

    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }
}

/// Ring buffer of check events with per-name denial counters
pub struct CheckAudit {
    capacity: AtomicUsize,
    events: parking_lot::RwLock<VecDeque<CheckEvent>>,
    denial_counts: DashMap<String, u64, RandomState>,
}

impl CheckAudit {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: AtomicUsize::new(capacity),
            events: parking_lot::RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            denial_counts: DashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// Change the ring size, dropping the oldest events that no longer fit
    pub fn resize(&self, capacity: usize) {
        let mut events = self.events.write();
        self.capacity.store(capacity, Ordering::Relaxed);
        let excess = events.len().saturating_sub(capacity);
        events.drain(..excess);
    }

    /// Record an event, evicting the oldest when full
    pub fn log(&self, event: CheckEvent) {
        if !event.decision.is_allowed() {
            self.denial_counts
                .entry(event.name.clone())
                .and_modify(|count| *count += 1)
                .or_insert(1);
        }
        let mut events = self.events.write();
        let capacity = self.capacity.load(Ordering::Relaxed);
        if capacity == 0 {
            return;
        }
        while events.len() >= capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Most recent events first
    pub fn recent(&self, limit: usize) -> Vec<CheckEvent> {
        let events = self.events.read();
        events.iter().rev().take(limit).cloned().collect()
    }

    /// Recent denials only
    pub fn denials(&self, limit: usize) -> Vec<CheckEvent> {
        let events = self.events.read();
        events
            .iter()
            .rev()
            .filter(|event| !event.decision.is_allowed())
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn denial_count(&self, name: &str) -> u64 {
        self.denial_counts.get(name).map(|e| *e).unwrap_or(0)
    }

    /// Names with at least one denial
    pub fn names_with_denials(&self) -> Vec<(String, u64)> {
        self.denial_counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn clear_all(&self) {
        self.events.write().clear();
        self.denial_counts.clear();
    }

    pub fn stats(&self) -> AuditStats {
        let total_events = self.events.read().len();
        let total_denials: u64 = self.denial_counts.iter().map(|e| *e.value()).sum();
        AuditStats {
            total_events,
            total_denials,
            names_denied: self.denial_counts.len(),
        }
    }
}

impl Default for CheckAudit {
    fn default() -> Self {
        Self::new(config().audit_capacity)
    }
}

/// Audit statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_events: usize,
    pub total_denials: u64,
    pub names_denied: usize,
}

static GLOBAL_AUDIT: LazyLock<CheckAudit> = LazyLock::new(CheckAudit::default);

/// Process-wide audit trail fed by checker watching
pub fn audit() -> &'static CheckAudit {
    &GLOBAL_AUDIT
}
