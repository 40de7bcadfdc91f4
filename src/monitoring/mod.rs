/*!
 * Monitoring
 * Checker audit trail and structured tracing
 */

mod audit;
mod tracer;

pub use audit::{
    audit, AuditSeverity, AuditStats, CheckAudit, CheckDecision, CheckEvent, CheckKind,
};
pub use tracer::init_tracing;
