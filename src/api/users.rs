use actix_web::{web, HttpResponse};

use super::{caller_id, failure};
use crate::database::parse_object_id;
use crate::middleware::auth::Claims;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, TripResponse, UserProfile};
use crate::services::user_service;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields or user already exists")
    )
)]
pub async fn register(state: web::Data<AppState>, request: web::Json<RegisterRequest>) -> HttpResponse {
    log::info!("📝 POST /users/register - email: {}", request.email);

    match user_service::register(state.users.as_ref(), &state.config, &request).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => failure("Registration failed", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(state: web::Data<AppState>, request: web::Json<LoginRequest>) -> HttpResponse {
    log::info!("🔐 POST /users/login - email: {}", request.email);

    match user_service::login(state.users.as_ref(), &state.config, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", response.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => failure("Login failed", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(user: web::ReqData<Claims>, state: web::Data<AppState>) -> HttpResponse {
    log::info!("👤 GET /users/profile - user {}", user.sub);

    let result = async {
        let user_id = caller_id(&user)?;
        user_service::get_profile(state.users.as_ref(), &user_id).await
    }
    .await;

    match result {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => failure("Profile lookup failed", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/trips",
    tag = "Users",
    params(("user_id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "Trips organized or joined by the user", body = [TripResponse]),
        (status = 400, description = "Invalid user ID")
    )
)]
pub async fn get_user_trips(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let user_id = path.into_inner();
    log::info!("🧳 GET /users/{}/trips", user_id);

    let result = async {
        let user_id = parse_object_id(&user_id, "user")?;
        user_service::get_user_trips(state.trips.as_ref(), &user_id).await
    }
    .await;

    match result {
        Ok(trips) => {
            let trips: Vec<TripResponse> = trips.into_iter().map(TripResponse::from).collect();
            HttpResponse::Ok().json(trips)
        }
        Err(e) => failure("User trips lookup failed", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/users/increment-trip-count",
    tag = "Users",
    responses(
        (status = 200, description = "Trip counted and one free trip spent", body = UserProfile),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn increment_trip_count(user: web::ReqData<Claims>, state: web::Data<AppState>) -> HttpResponse {
    log::info!("➕ POST /users/increment-trip-count - user {}", user.sub);

    let result = async {
        let user_id = caller_id(&user)?;
        user_service::increment_trip_count(state.users.as_ref(), &user_id).await
    }
    .await;

    match result {
        Ok(profile) => {
            log::info!(
                "✅ tripCount={} freeTripsLeft={} for {}",
                profile.trip_count,
                profile.free_trips_left,
                profile.id
            );
            HttpResponse::Ok().json(profile)
        }
        Err(e) => failure("Trip count update failed", e),
    }
}
