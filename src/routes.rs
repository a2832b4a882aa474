use crate::{
    api::{attendance, user},
    config::Config,
    error::ApiError,
};
use actix_web::{HttpResponse, web};

/// Fallback for unmatched routes, wired as the app's default service.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Not found" }))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Body-parse failures use the same {"error": ...} shape as everything else
    let json_cfg = web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into());

    // A non-integer id segment never matches an entity, so it reads as 404
    let path_cfg =
        web::PathConfig::default().error_handler(|_err, _req| ApiError::NotFound.into());

    cfg.service(
        web::scope(&config.api_prefix)
            .app_data(json_cfg)
            .app_data(path_cfg)
            .service(
                web::scope("/users")
                    // /users
                    .service(
                        web::resource("")
                            .route(web::get().to(user::list_users))
                            .route(web::post().to(user::create_user)),
                    )
                    // /users/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    // /attendance/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/{id}/check-out
                    .service(
                        web::resource("/{id}/check-out")
                            .route(web::post().to(attendance::check_out)),
                    )
                    // /attendance/user/{id}/summary
                    .service(
                        web::resource("/user/{id}/summary")
                            .route(web::get().to(attendance::attendance_summary)),
                    ),
            ),
    );
}
