use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::{datetime_format, datetime_format_opt};

/// Daily attendance status. Only `present` is ever assigned by the
/// check-in flow; the other values are reserved for manual record edits
/// and are counted by the summary endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Leave,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": 1,
        "check_in": "2026-01-05 09:00:00",
        "check_out": "2026-01-05 17:30:00",
        "date": "2026-01-05",
        "status": "present"
    })
)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1)]
    pub user_id: i64,

    #[serde(with = "datetime_format")]
    #[schema(example = "2026-01-05 09:00:00", value_type = String)]
    pub check_in: NaiveDateTime,

    /// Set at most once, by check-out; never overwritten.
    #[serde(with = "datetime_format_opt")]
    #[schema(example = "2026-01-05 17:30:00", value_type = Option<String>)]
    pub check_out: Option<NaiveDateTime>,

    /// UTC calendar day of `check_in`.
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "present")]
    pub status: AttendanceStatus,
}
