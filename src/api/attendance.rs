use crate::{
    error::ApiError,
    model::{
        attendance::{Attendance, AttendanceStatus},
        user::User,
    },
};
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceQuery {
    pub user_id: Option<i64>,
    /// Calendar date filter, `YYYY-MM-DD`.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 1)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceMessage {
    #[schema(example = "John Doe checked in successfully")]
    pub message: String,
    pub attendance: Attendance,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummary {
    pub user: User,
    #[schema(example = 3)]
    pub total_records: i64,
    #[schema(example = 2)]
    pub present: i64,
    #[schema(example = 0)]
    pub absent: i64,
    #[schema(example = 0)]
    pub late: i64,
    #[schema(example = 1)]
    pub leave: i64,
    pub records: Vec<Attendance>,
}

/// List Attendance
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(
        ("user_id", Query, description = "Filter by user"),
        ("date", Query, description = "Filter by calendar date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Matching attendance records", body = [Attendance]),
        (status = 400, description = "Malformed date filter")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<SqlitePool>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let mut conditions = Vec::new();

    if query.user_id.is_some() {
        conditions.push("user_id = ?");
    }
    if query.date.is_some() {
        conditions.push("date = ?");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!("SELECT * FROM attendance {} ORDER BY id", where_clause);
    debug!(sql = %sql, "Fetching attendance");

    let mut data_query = sqlx::query_as::<_, Attendance>(&sql);
    if let Some(user_id) = query.user_id {
        data_query = data_query.bind(user_id);
    }
    if let Some(date) = &query.date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            ApiError::Validation("Invalid date format, expected YYYY-MM-DD".into())
        })?;
        data_query = data_query.bind(date);
    }

    let records = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(records))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Checked in", body = AttendanceMessage),
        (status = 400, description = "Missing user_id or already checked in today", body = Object, example = json!({
            "error": "Already checked in today"
        })),
        (status = 404, description = "User not found")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CheckInRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::Validation("Missing user_id".into()))?;

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound)?;

    let now = Utc::now().naive_utc();
    let today = now.date();

    // One record per user per UTC calendar day; UNIQUE (user_id, date)
    // backs this check up under concurrent requests.
    let already = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE user_id = ? AND date = ?",
    )
    .bind(user_id)
    .bind(today)
    .fetch_one(&mut *tx)
    .await?;
    if already > 0 {
        return Err(ApiError::Conflict("Already checked in today".into()));
    }

    let id =
        sqlx::query("INSERT INTO attendance (user_id, check_in, date, status) VALUES (?, ?, ?, ?)")
            .bind(user_id)
            .bind(now)
            .bind(today)
            .bind(AttendanceStatus::Present)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

    let attendance = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(HttpResponse::Created().json(AttendanceMessage {
        message: format!("{} checked in successfully", user.name),
        attendance,
    }))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/{id}/check-out",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Checked out", body = AttendanceMessage),
        (status = 400, description = "Already checked out", body = Object, example = json!({
            "error": "Already checked out"
        })),
        (status = 404, description = "Attendance record not found")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let attendance_id = path.into_inner();

    let mut tx = pool.begin().await?;

    let record = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(attendance_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound)?;

    // check_out is written once and never overwritten
    if record.check_out.is_some() {
        return Err(ApiError::Conflict("Already checked out".into()));
    }

    sqlx::query("UPDATE attendance SET check_out = ? WHERE id = ?")
        .bind(Utc::now().naive_utc())
        .bind(attendance_id)
        .execute(&mut *tx)
        .await?;

    let attendance = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(attendance_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(HttpResponse::Ok().json(AttendanceMessage {
        message: "Checked out successfully".to_string(),
        attendance,
    }))
}

/// Attendance summary for one user
#[utoipa::path(
    get,
    path = "/api/attendance/user/{id}/summary",
    params(
        ("id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Record counts by status plus the full record list", body = AttendanceSummary),
        (status = 404, description = "User not found")
    ),
    tag = "Attendance"
)]
pub async fn attendance_summary(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound)?;

    let records =
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool.get_ref())
            .await?;

    let count =
        |status: AttendanceStatus| records.iter().filter(|r| r.status == status).count() as i64;

    let present = count(AttendanceStatus::Present);
    let absent = count(AttendanceStatus::Absent);
    let late = count(AttendanceStatus::Late);
    let leave = count(AttendanceStatus::Leave);

    Ok(HttpResponse::Ok().json(AttendanceSummary {
        user,
        total_records: records.len() as i64,
        present,
        absent,
        late,
        leave,
        records,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, db, routes};
    use actix_web::{App, test, web::Data};
    use serde_json::{Value, json};

    macro_rules! test_app {
        ($pool:expr) => {
            test::init_service(
                App::new()
                    .app_data(Data::new($pool.clone()))
                    .configure(|cfg| routes::configure(cfg, Config::for_tests()))
                    .default_service(actix_web::web::route().to(routes::not_found)),
            )
            .await
        };
    }

    async fn seed_user(pool: &SqlitePool, name: &str, email: &str, employee_id: &str) -> i64 {
        sqlx::query("INSERT INTO users (name, email, employee_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(employee_id)
            .bind(Utc::now().naive_utc())
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn seed_record(
        pool: &SqlitePool,
        user_id: i64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> i64 {
        sqlx::query("INSERT INTO attendance (user_id, check_in, date, status) VALUES (?, ?, ?, ?)")
            .bind(user_id)
            .bind(date.and_hms_opt(9, 0, 0).unwrap())
            .bind(date)
            .bind(status)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    #[actix_web::test]
    async fn check_in_creates_present_record_for_today() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);
        let user_id = seed_user(&pool, "Ada", "a@x.com", "E1").await;

        let req = test::TestRequest::post()
            .uri("/api/attendance/check-in")
            .set_json(json!({"user_id": user_id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: AttendanceMessage = test::read_body_json(resp).await;
        assert_eq!(body.message, "Ada checked in successfully");
        assert_eq!(body.attendance.user_id, user_id);
        assert_eq!(body.attendance.status, AttendanceStatus::Present);
        assert_eq!(body.attendance.date, Utc::now().date_naive());
        assert!(body.attendance.check_out.is_none());
    }

    #[actix_web::test]
    async fn check_in_rejects_missing_user_id() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post()
            .uri("/api/attendance/check-in")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing user_id");
    }

    #[actix_web::test]
    async fn check_in_unknown_user_is_404() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post()
            .uri("/api/attendance/check-in")
            .set_json(json!({"user_id": 99}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn second_check_in_same_day_conflicts() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);
        let user_id = seed_user(&pool, "Ada", "a@x.com", "E1").await;

        let req = test::TestRequest::post()
            .uri("/api/attendance/check-in")
            .set_json(json!({"user_id": user_id}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let req = test::TestRequest::post()
            .uri("/api/attendance/check-in")
            .set_json(json!({"user_id": user_id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Already checked in today");

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance WHERE user_id = ? AND date = ?",
        )
        .bind(user_id)
        .bind(Utc::now().date_naive())
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[actix_web::test]
    async fn check_out_closes_record_and_rejects_a_second_attempt() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);
        let user_id = seed_user(&pool, "Ada", "a@x.com", "E1").await;

        let req = test::TestRequest::post()
            .uri("/api/attendance/check-in")
            .set_json(json!({"user_id": user_id}))
            .to_request();
        let created: AttendanceMessage =
            test::read_body_json(test::call_service(&app, req).await).await;
        let id = created.attendance.id;

        let req = test::TestRequest::post()
            .uri(&format!("/api/attendance/{}/check-out", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let closed: AttendanceMessage = test::read_body_json(resp).await;
        assert_eq!(closed.message, "Checked out successfully");
        let first_check_out = closed.attendance.check_out.expect("check_out set");

        let req = test::TestRequest::post()
            .uri(&format!("/api/attendance/{}/check-out", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Already checked out");

        // first check_out value preserved
        let record = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(
            record.check_out.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            Some(first_check_out.format("%Y-%m-%d %H:%M:%S").to_string())
        );
    }

    #[actix_web::test]
    async fn non_integer_attendance_id_in_path_is_404() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post()
            .uri("/api/attendance/abc/check-out")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Not found");
    }

    #[actix_web::test]
    async fn check_out_unknown_record_is_404() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post()
            .uri("/api/attendance/77/check-out")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn list_filters_by_user_and_date() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);
        let ada = seed_user(&pool, "Ada", "a@x.com", "E1").await;
        let bob = seed_user(&pool, "Bob", "b@x.com", "E2").await;

        let d1 = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
        seed_record(&pool, ada, d1, AttendanceStatus::Present).await;
        seed_record(&pool, ada, d2, AttendanceStatus::Present).await;
        seed_record(&pool, bob, d1, AttendanceStatus::Present).await;

        let req = test::TestRequest::get().uri("/api/attendance").to_request();
        let all: Vec<Attendance> = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(all.len(), 3);

        let req = test::TestRequest::get()
            .uri(&format!("/api/attendance?user_id={}", ada))
            .to_request();
        let for_ada: Vec<Attendance> =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(for_ada.len(), 2);
        assert!(for_ada.iter().all(|r| r.user_id == ada));

        let req = test::TestRequest::get()
            .uri("/api/attendance?date=2026-01-05")
            .to_request();
        let on_d1: Vec<Attendance> =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(on_d1.len(), 2);

        let req = test::TestRequest::get()
            .uri(&format!("/api/attendance?user_id={}&date=2026-01-05", ada))
            .to_request();
        let both: Vec<Attendance> =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].user_id, ada);
        assert_eq!(both[0].date, d1);
    }

    #[actix_web::test]
    async fn list_rejects_malformed_date() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);

        let req = test::TestRequest::get()
            .uri("/api/attendance?date=05-01-2026")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn summary_counts_records_by_status() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);
        let user_id = seed_user(&pool, "Ada", "a@x.com", "E1").await;

        let base = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        seed_record(&pool, user_id, base, AttendanceStatus::Present).await;
        seed_record(&pool, user_id, base.succ_opt().unwrap(), AttendanceStatus::Present).await;
        seed_record(
            &pool,
            user_id,
            base.succ_opt().unwrap().succ_opt().unwrap(),
            AttendanceStatus::Leave,
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/attendance/user/{}/summary", user_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let summary: AttendanceSummary = test::read_body_json(resp).await;
        assert_eq!(summary.user.name, "Ada");
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.leave, 1);
        assert_eq!(summary.absent, 0);
        assert_eq!(summary.late, 0);
        assert_eq!(summary.records.len(), 3);
    }

    #[actix_web::test]
    async fn summary_unknown_user_is_404() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);

        let req = test::TestRequest::get()
            .uri("/api/attendance/user/42/summary")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    // Create Ada, check in, check out, then try to check in again the same day.
    #[actix_web::test]
    async fn full_day_scenario() {
        let pool = db::init_test_db().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({"name": "Ada", "email": "a@x.com", "employee_id": "E1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let user: User = test::read_body_json(resp).await;

        let req = test::TestRequest::post()
            .uri("/api/attendance/check-in")
            .set_json(json!({"user_id": user.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let checked_in: AttendanceMessage = test::read_body_json(resp).await;
        assert_eq!(checked_in.attendance.date, Utc::now().date_naive());
        assert_eq!(checked_in.attendance.status, AttendanceStatus::Present);

        let req = test::TestRequest::post()
            .uri(&format!(
                "/api/attendance/{}/check-out",
                checked_in.attendance.id
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let closed: AttendanceMessage = test::read_body_json(resp).await;
        assert!(closed.attendance.check_out.is_some());

        let req = test::TestRequest::post()
            .uri("/api/attendance/check-in")
            .set_json(json!({"user_id": user.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Already checked in today");
    }
}
