use std::sync::Arc;

use tracing::{info, instrument};

use crate::clock::Clock;
use crate::error::ApiError;
use crate::model::attendance::AttendanceRecord;
use crate::notify::{AttendanceEvent, Notifier};
use crate::store::attendance::AttendanceStore;
use crate::store::employees::EmployeeLookup;

/// Per-employee per-day attendance state machine:
/// no record -> arrival recorded -> departure recorded (terminal for the
/// day). The duplicate-arrival and double-close guards live in the store's
/// atomic operations, not in a preceding read.
pub struct Attendance {
    employees: Arc<dyn EmployeeLookup>,
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl Attendance {
    pub fn new(
        employees: Arc<dyn EmployeeLookup>,
        store: Arc<dyn AttendanceStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            employees,
            store,
            clock,
            notifier,
        }
    }

    #[instrument(skip(self))]
    pub async fn record_arrival(&self, employee_id: u64) -> Result<AttendanceRecord, ApiError> {
        let employee = self
            .employees
            .by_id(employee_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

        // Day boundary fixed once for the whole operation.
        let now = self.clock.now();
        let day = now.date_naive();

        let record = self
            .store
            .insert_arrival(employee_id, now, day)
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Arrival already recorded for the employee today".into())
            })?;

        self.notifier.send(&employee, AttendanceEvent::Arrival).await;
        info!(employee_id, record_id = record.id, "arrival recorded");

        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn record_departure(
        &self,
        employee_id: u64,
        attendance_id: Option<u64>,
    ) -> Result<AttendanceRecord, ApiError> {
        let employee = self
            .employees
            .by_id(employee_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

        let now = self.clock.now();
        let day = now.date_naive();

        if self.store.has_departure_on(employee_id, day).await? {
            return Err(ApiError::Conflict(
                "Departure already recorded for the employee today".into(),
            ));
        }

        let target = match attendance_id {
            Some(id) => self.store.find_for_employee(employee_id, id).await?,
            None => self.store.latest_open(employee_id).await?,
        };

        let target = target.ok_or_else(|| {
            ApiError::Conflict("No arrival recorded for the employee".into())
        })?;

        // Zero affected rows here means a concurrent request (or an
        // explicitly addressed, already-closed record) got there first.
        let record = self.store.close(target.id, now).await?.ok_or_else(|| {
            ApiError::Conflict("Departure already recorded for the employee today".into())
        })?;

        self.notifier
            .send(&employee, AttendanceEvent::Departure)
            .await;
        info!(employee_id, record_id = record.id, "departure recorded");

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::clock::test::FixedClock;
    use crate::model::employee::Employee;

    struct MemEmployees(Vec<Employee>);

    #[async_trait]
    impl EmployeeLookup for MemEmployees {
        async fn by_id(&self, id: u64) -> Result<Option<Employee>, sqlx::Error> {
            Ok(self.0.iter().find(|e| e.id == id).cloned())
        }
    }

    #[derive(Default)]
    struct MemAttendanceStore {
        rows: Mutex<Vec<AttendanceRecord>>,
    }

    #[async_trait]
    impl AttendanceStore for MemAttendanceStore {
        async fn insert_arrival(
            &self,
            employee_id: u64,
            at: DateTime<Utc>,
            day: NaiveDate,
        ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();

            // mirrors the unique (employee_id, arrival_date) key
            if rows
                .iter()
                .any(|r| r.employee_id == employee_id && r.arrival_date == day)
            {
                return Ok(None);
            }

            let record = AttendanceRecord {
                id: rows.len() as u64 + 1,
                employee_id,
                arrival_time: at,
                arrival_date: day,
                departure_time: None,
            };
            rows.push(record.clone());
            Ok(Some(record))
        }

        async fn has_departure_on(
            &self,
            employee_id: u64,
            day: NaiveDate,
        ) -> Result<bool, sqlx::Error> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().any(|r| {
                r.employee_id == employee_id
                    && r.departure_time.map(|t| t.date_naive()) == Some(day)
            }))
        }

        async fn find_for_employee(
            &self,
            employee_id: u64,
            attendance_id: u64,
        ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|r| r.id == attendance_id && r.employee_id == employee_id)
                .cloned())
        }

        async fn latest_open(
            &self,
            employee_id: u64,
        ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.employee_id == employee_id && r.departure_time.is_none())
                .max_by_key(|r| (r.arrival_time, r.id))
                .cloned())
        }

        async fn close(
            &self,
            attendance_id: u64,
            at: DateTime<Utc>,
        ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows
                .iter_mut()
                .find(|r| r.id == attendance_id && r.departure_time.is_none())
            else {
                return Ok(None);
            };

            row.departure_time = Some(at);
            Ok(Some(row.clone()))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(u64, AttendanceEvent)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, employee: &Employee, event: AttendanceEvent) {
            self.sent.lock().unwrap().push((employee.id, event));
        }
    }

    fn employee(id: u64) -> Employee {
        Employee {
            id,
            names: "Jane Smith".into(),
            email: format!("jane{id}@company.com"),
            phone_number: None,
            badge_id: Some("10042".into()),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0).unwrap()
    }

    struct Harness {
        service: Attendance,
        clock: Arc<FixedClock>,
        notifier: Arc<RecordingNotifier>,
    }

    fn setup(employees: Vec<Employee>) -> Harness {
        let clock = Arc::new(FixedClock::at(t0()));
        let notifier = Arc::new(RecordingNotifier::default());
        let service = Attendance::new(
            Arc::new(MemEmployees(employees)),
            Arc::new(MemAttendanceStore::default()),
            clock.clone(),
            notifier.clone(),
        );
        Harness {
            service,
            clock,
            notifier,
        }
    }

    #[actix_web::test]
    async fn arrival_creates_an_open_record() {
        let h = setup(vec![employee(7)]);

        let record = h.service.record_arrival(7).await.unwrap();

        assert_eq!(record.employee_id, 7);
        assert_eq!(record.arrival_time, t0());
        assert_eq!(record.arrival_date, t0().date_naive());
        assert!(record.departure_time.is_none());
        assert_eq!(
            *h.notifier.sent.lock().unwrap(),
            vec![(7, AttendanceEvent::Arrival)]
        );
    }

    #[actix_web::test]
    async fn second_arrival_same_day_conflicts() {
        let h = setup(vec![employee(7)]);
        h.service.record_arrival(7).await.unwrap();

        h.clock.advance(Duration::hours(1));
        let err = h.service.record_arrival(7).await.unwrap_err();

        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(
            err.to_string(),
            "Arrival already recorded for the employee today"
        );
        // the rejected attempt must not notify
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn arrival_for_unknown_employee_is_not_found() {
        let h = setup(vec![]);

        let err = h.service.record_arrival(99).await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(h.notifier.sent.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn departure_without_arrival_conflicts() {
        let h = setup(vec![employee(7)]);

        let err = h.service.record_departure(7, None).await.unwrap_err();

        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.to_string(), "No arrival recorded for the employee");
    }

    #[actix_web::test]
    async fn departure_for_unknown_employee_is_not_found() {
        let h = setup(vec![]);

        let err = h.service.record_departure(99, None).await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn arrival_then_departure_closes_the_day() {
        let h = setup(vec![employee(7)]);

        let opened = h.service.record_arrival(7).await.unwrap();
        h.clock.advance(Duration::hours(8));
        let closed = h.service.record_departure(7, None).await.unwrap();

        assert_eq!(closed.id, opened.id);
        assert_eq!(closed.arrival_time, t0());
        assert_eq!(closed.departure_time, Some(t0() + Duration::hours(8)));
        assert_eq!(
            *h.notifier.sent.lock().unwrap(),
            vec![
                (7, AttendanceEvent::Arrival),
                (7, AttendanceEvent::Departure)
            ]
        );
    }

    #[actix_web::test]
    async fn second_departure_same_day_conflicts() {
        let h = setup(vec![employee(7)]);
        h.service.record_arrival(7).await.unwrap();
        h.clock.advance(Duration::hours(8));
        h.service.record_departure(7, None).await.unwrap();

        h.clock.advance(Duration::minutes(5));
        let err = h.service.record_departure(7, None).await.unwrap_err();

        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(
            err.to_string(),
            "Departure already recorded for the employee today"
        );
    }

    #[actix_web::test]
    async fn departure_closes_an_open_record_from_a_previous_day() {
        let h = setup(vec![employee(7)]);
        h.service.record_arrival(7).await.unwrap();

        // never departed yesterday; today's departure closes that record
        h.clock.advance(Duration::days(1));
        let closed = h.service.record_departure(7, None).await.unwrap();

        assert_eq!(closed.arrival_time, t0());
        assert_eq!(closed.departure_time, Some(t0() + Duration::days(1)));
    }

    #[actix_web::test]
    async fn explicit_attendance_id_selects_that_record() {
        let h = setup(vec![employee(7)]);

        let day_one = h.service.record_arrival(7).await.unwrap();
        h.clock.advance(Duration::days(1));
        let day_two = h.service.record_arrival(7).await.unwrap();

        // day_two is the latest open record, but the caller addresses day_one
        let closed = h
            .service
            .record_departure(7, Some(day_one.id))
            .await
            .unwrap();

        assert_eq!(closed.id, day_one.id);

        let still_open = h
            .service
            .record_departure(7, Some(day_two.id))
            .await
            .unwrap_err();
        // day_one departed today already
        assert_eq!(
            still_open.to_string(),
            "Departure already recorded for the employee today"
        );
    }

    #[actix_web::test]
    async fn attendance_id_of_another_employee_is_rejected() {
        let h = setup(vec![employee(7), employee(8)]);

        let other = h.service.record_arrival(8).await.unwrap();

        let err = h
            .service
            .record_departure(7, Some(other.id))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No arrival recorded for the employee");
    }
}
