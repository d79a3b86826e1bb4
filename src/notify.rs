use async_trait::async_trait;
use tracing::info;

use crate::model::employee::Employee;

/// The two daily attendance transitions, rendered lowercase in notification
/// payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceEvent {
    Arrival,
    Departure,
}

/// Fire-and-forget notification sink. Implementations swallow their own
/// failures; callers never observe a result, so a broken sink cannot roll
/// back the state transition that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, employee: &Employee, event: AttendanceEvent);
}

/// Records the notification that a mail integration would deliver.
pub struct EmailNotifier;

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, employee: &Employee, event: AttendanceEvent) {
        // Queued mail dispatch (AttendanceNotification) hooks in here.
        info!(
            employee_id = employee.id,
            email = %employee.email,
            event = %event,
            "attendance notification"
        );
    }
}
