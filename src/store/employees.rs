use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::model::employee::Employee;

/// The only view of employees the lifecycle services consume; the CRUD
/// surface works on the pool directly.
#[async_trait]
pub trait EmployeeLookup: Send + Sync {
    async fn by_id(&self, id: u64) -> Result<Option<Employee>, sqlx::Error>;
}

pub struct MySqlEmployeeStore {
    pool: MySqlPool,
}

impl MySqlEmployeeStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeLookup for MySqlEmployeeStore {
    async fn by_id(&self, id: u64) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, names, email, phone_number, badge_id
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
