use crate::api::attendance::{
    AttendanceMessage, AttendanceQuery, AttendanceSummary, CheckInRequest,
};
use crate::api::user::{CreateUser, UpdateUser};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::user::User;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

JSON API for managing employee records and daily attendance.

### Key Features
- **User Directory**
  - Create, update, list, view, and delete users
  - Email and employee ID are unique across all users
- **Attendance Ledger**
  - One check-in per user per UTC calendar day
  - Check-out closes the day's record exactly once
  - Filterable record listing and per-status summaries

### Response Format
- JSON-based RESTful responses
- Timestamps as `YYYY-MM-DD HH:MM:SS` (UTC), dates as `YYYY-MM-DD`
- Errors as `{"error": "<text>"}`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::user::list_users,
        crate::api::user::create_user,
        crate::api::user::get_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,

        crate::api::attendance::list_attendance,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::attendance_summary
    ),
    components(
        schemas(
            User,
            CreateUser,
            UpdateUser,
            Attendance,
            AttendanceStatus,
            AttendanceQuery,
            CheckInRequest,
            AttendanceMessage,
            AttendanceSummary
        )
    ),
    tags(
        (name = "Users", description = "User directory APIs"),
        (name = "Attendance", description = "Attendance tracking APIs"),
    )
)]
pub struct ApiDoc;
