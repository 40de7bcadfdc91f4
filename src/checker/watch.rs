/*!
 * Checker Watching
 * Reports check decisions to the log and the audit trail when enabled
 */

use crate::core::config::{watch_level, WatchLevel};
use crate::core::errors::{SecurityError, SecurityResult};
use crate::monitoring::{audit, CheckDecision, CheckEvent, CheckKind};
use crate::object::Value;
use log::{info, warn};

/// Report one check outcome according to the configured watch level
///
/// Denials are reported from `Denials` up, grants only at `All`. Failures
/// that are not denials (no interaction, target errors) are not reported.
pub(crate) fn observe(
    object: &Value,
    name: &str,
    kind: CheckKind,
    outcome: &SecurityResult<CheckDecision>,
) {
    let level = watch_level();
    if !level.is_enabled() {
        return;
    }

    let (decision, permission) = match outcome {
        Ok(decision) if level >= WatchLevel::All => (*decision, None),
        Ok(_) => return,
        Err(SecurityError::Unauthorized { permission, .. }) => {
            (CheckDecision::Unauthorized, Some(permission.clone()))
        }
        Err(SecurityError::ForbiddenAttribute { .. }) => (CheckDecision::Forbidden, None),
        Err(_) => return,
    };

    let object_type = object.object_type();
    if decision.is_allowed() {
        info!("[CHK] + {}: {} on {}", decision, name, object_type);
    } else {
        warn!("[CHK] - {}: {} on {}", decision, name, object_type);
    }

    audit().log(CheckEvent::new(
        object_type.to_string(),
        name,
        kind,
        decision,
        permission,
    ));
}
