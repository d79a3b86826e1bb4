use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "names": "John Doe",
        "email": "john.doe@company.com",
        "phone_number": "+250781234567",
        "badge_id": "73510"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub names: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+250781234567", nullable = true)]
    pub phone_number: Option<String>,

    #[schema(example = "73510", nullable = true)]
    pub badge_id: Option<String>,
}
