use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;

use crate::model::attendance::AttendanceRecord;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Insert-if-absent for the employee's calendar day. Returns `None` when
    /// the unique `(employee_id, arrival_date)` key rejects a second same-day
    /// arrival.
    async fn insert_arrival(
        &self,
        employee_id: u64,
        at: DateTime<Utc>,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error>;

    /// Whether any of the employee's records departed on `day`.
    async fn has_departure_on(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<bool, sqlx::Error>;

    /// Record by id, scoped to the employee.
    async fn find_for_employee(
        &self,
        employee_id: u64,
        attendance_id: u64,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error>;

    /// The employee's most recent record still missing a departure.
    async fn latest_open(&self, employee_id: u64)
    -> Result<Option<AttendanceRecord>, sqlx::Error>;

    /// Conditional close: sets the departure only on a still-open record.
    /// Returns `None` when the record was already closed.
    async fn close(
        &self,
        attendance_id: u64,
        at: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error>;
}

pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const SELECT_RECORD: &str = r#"
    SELECT id, employee_id, arrival_time, arrival_date, departure_time
    FROM attendance_records
"#;

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn insert_arrival(
        &self,
        employee_id: u64,
        at: DateTime<Utc>,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records (employee_id, arrival_time, arrival_date)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(at)
        .bind(day)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(Some(AttendanceRecord {
                id: done.last_insert_id(),
                employee_id,
                arrival_time: at,
                arrival_date: day,
                departure_time: None,
            })),

            Err(e) => {
                // Duplicate arrival for the same day
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code().as_deref() == Some("23000") {
                        return Ok(None);
                    }
                }

                Err(e)
            }
        }
    }

    async fn has_departure_on(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM attendance_records
                WHERE employee_id = ? AND DATE(departure_time) = ?
                LIMIT 1
            )
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_for_employee(
        &self,
        employee_id: u64,
        attendance_id: u64,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(&format!(
            "{SELECT_RECORD} WHERE id = ? AND employee_id = ?"
        ))
        .bind(attendance_id)
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn latest_open(
        &self,
        employee_id: u64,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(&format!(
            "{SELECT_RECORD} WHERE employee_id = ? AND departure_time IS NULL
             ORDER BY arrival_time DESC, id DESC
             LIMIT 1"
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn close(
        &self,
        attendance_id: u64,
        at: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET departure_time = ?
            WHERE id = ?
            AND departure_time IS NULL
            "#,
        )
        .bind(at)
        .bind(attendance_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query_as::<_, AttendanceRecord>(&format!("{SELECT_RECORD} WHERE id = ?"))
            .bind(attendance_id)
            .fetch_optional(&self.pool)
            .await
    }
}
