pub mod health;
pub mod payments;
pub mod swagger;
pub mod trips;
pub mod upload;
pub mod users;

use actix_files::Files;
use actix_web::{web, HttpResponse, ResponseError};
use mongodb::bson::oid::ObjectId;

use crate::config::Config;
use crate::middleware::auth::Claims;
use crate::middleware::AuthMiddleware;
use crate::utils::AppError;

/// Logs a failed request (warn for 4xx, error for 5xx) and renders it.
pub(crate) fn failure(context: &str, e: AppError) -> HttpResponse {
    if e.is_server_error() {
        log::error!("❌ {}: {}", context, e);
    } else {
        log::warn!("⚠️  {}: {}", context, e);
    }
    e.error_response()
}

pub(crate) fn caller_id(claims: &Claims) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Not authorized, token failed".to_string()))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(format!("Invalid JSON body: {}", err)).into()
    })
}

/// Registers every route of the API.
pub fn routes(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.app_data(json_config())
        .route("/", web::get().to(health::root))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/users")
                .route("/register", web::post().to(users::register))
                .route("/login", web::post().to(users::login))
                .service(
                    web::resource("/profile")
                        .wrap(AuthMiddleware::required())
                        .route(web::get().to(users::get_profile)),
                )
                .service(
                    web::resource("/increment-trip-count")
                        .wrap(AuthMiddleware::required())
                        .route(web::post().to(users::increment_trip_count)),
                )
                .route("/{user_id}/trips", web::get().to(users::get_user_trips)),
        )
        .service(
            // Browsing is public, creating and joining need a token
            web::scope("/api/trips")
                .wrap(AuthMiddleware::public_reads())
                .route("", web::get().to(trips::get_trips))
                .route("", web::post().to(trips::create_trip))
                .route("/{id}", web::get().to(trips::get_trip))
                .route("/{id}/join", web::post().to(trips::join_trip)),
        )
        .service(
            web::scope("/api/upload")
                .wrap(AuthMiddleware::required())
                .route("", web::post().to(upload::upload_image)),
        )
        .service(
            web::scope("/api/payments")
                .wrap(AuthMiddleware::required())
                .route("/process", web::post().to(payments::process_payment)),
        )
        .service(Files::new("/uploads", &config.upload_dir));
}
