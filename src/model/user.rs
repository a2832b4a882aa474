use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::datetime_format;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "John Doe",
        "email": "john.doe@company.com",
        "employee_id": "EMP-001",
        "created_at": "2026-01-05 09:00:00"
    })
)]
pub struct User {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,

    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[serde(with = "datetime_format")]
    #[schema(example = "2026-01-05 09:00:00", value_type = String)]
    pub created_at: NaiveDateTime,
}
