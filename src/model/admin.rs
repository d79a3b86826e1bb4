use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
}
