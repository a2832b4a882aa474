use crate::{error::ApiError, model::user::User};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "John Doe")]
    pub name: Option<String>,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "EMP-001")]
    pub employee_id: Option<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUser {
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[schema(example = "jane.doe@company.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "EMP-002")]
    pub employee_id: Option<String>,
}

/// List Users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users in id order", body = [User])
    ),
    tag = "Users"
)]
pub async fn list_users(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(users))
}

/// Create User
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing fields or duplicate email/employee id", body = Object, example = json!({
            "error": "Email already exists"
        }))
    ),
    tag = "Users"
)]
pub async fn create_user(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();

    let (Some(name), Some(email), Some(employee_id)) =
        (payload.name, payload.email, payload.employee_id)
    else {
        return Err(ApiError::Validation("Missing required fields".into()));
    };

    // Uniqueness checks and the insert share one transaction; the UNIQUE
    // constraints in the schema catch anything that races past them.
    let mut tx = pool.begin().await?;

    let email_taken = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(&mut *tx)
        .await?;
    if email_taken > 0 {
        return Err(ApiError::Conflict("Email already exists".into()));
    }

    let employee_id_taken =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE employee_id = ?")
            .bind(&employee_id)
            .fetch_one(&mut *tx)
            .await?;
    if employee_id_taken > 0 {
        return Err(ApiError::Conflict("Employee ID already exists".into()));
    }

    let id = sqlx::query(
        "INSERT INTO users (name, email, employee_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&name)
    .bind(&email)
    .bind(&employee_id)
    .bind(Utc::now().naive_utc())
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(HttpResponse::Created().json(user))
}

/// Get User by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = Object, example = json!({
            "error": "Not found"
        }))
    ),
    tag = "Users"
)]
pub async fn get_user(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(path.into_inner())
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(user))
}

/// Update User
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id", Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Duplicate email/employee id", body = Object, example = json!({
            "error": "Employee ID already exists"
        })),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn update_user(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<UpdateUser>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let payload = payload.into_inner();

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound)?;

    // Conflicts only against *other* users, so a no-op update to one's own
    // current email or employee id goes through.
    if let Some(email) = &payload.email {
        let taken =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ? AND id != ?")
                .bind(email)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if taken > 0 {
            return Err(ApiError::Conflict("Email already exists".into()));
        }
    }

    if let Some(employee_id) = &payload.employee_id {
        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE employee_id = ? AND id != ?",
        )
        .bind(employee_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if taken > 0 {
            return Err(ApiError::Conflict("Employee ID already exists".into()));
        }
    }

    let name = payload.name.unwrap_or(user.name);
    let email = payload.email.unwrap_or(user.email);
    let employee_id = payload.employee_id.unwrap_or(user.employee_id);

    sqlx::query("UPDATE users SET name = ?, email = ?, employee_id = ? WHERE id = ?")
        .bind(&name)
        .bind(&email)
        .bind(&employee_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Delete User
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id", Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User and owned attendance deleted"),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn delete_user(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    if exists == 0 {
        return Err(ApiError::NotFound);
    }

    // Application-level cascade, in the same transaction as the user row.
    sqlx::query("DELETE FROM attendance WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}
