use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One attendance row. `arrival_date` is the calendar day of `arrival_time`,
/// persisted explicitly and covered by a unique key per employee so a second
/// same-day arrival fails at insert time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(value_type = String, format = "date-time")]
    pub arrival_time: DateTime<Utc>,

    #[schema(value_type = String, format = "date")]
    pub arrival_date: NaiveDate,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub departure_time: Option<DateTime<Utc>>,
}
