use std::collections::HashSet;

use mongodb::bson::oid::ObjectId;

use crate::config::Config;
use crate::database::{TripRepository, UserRepository};
use crate::models::{normalize_email, AuthResponse, LoginRequest, RegisterRequest, Trip, User, UserProfile};
use crate::services::auth_service;
use crate::utils::AppError;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn register(
    users: &dyn UserRepository,
    config: &Config,
    request: &RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let name = request.name.trim();
    let email = normalize_email(&request.email);

    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidRequest(
            "Name, email and password are required".to_string(),
        ));
    }

    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::InvalidRequest("User already exists".to_string()));
    }

    let hashed = auth_service::hash_password(&request.password, config.bcrypt_cost)?;
    let user = users
        .insert(User::new(name.to_string(), email, hashed))
        .await?;

    let token = auth_service::generate_jwt(&config.jwt, &user)?;
    log::info!("✅ User registered: {}", user.email);

    Ok(AuthResponse::new(user, token))
}

pub async fn login(
    users: &dyn UserRepository,
    config: &Config,
    request: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    let email = normalize_email(&request.email);

    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !auth_service::verify_password(&request.password, &user.password)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = auth_service::generate_jwt(&config.jwt, &user)?;
    Ok(AuthResponse::new(user, token))
}

pub async fn get_profile(users: &dyn UserRepository, user_id: &ObjectId) -> Result<UserProfile, AppError> {
    users
        .find_by_id(user_id)
        .await?
        .map(UserProfile::from)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Trips the user organizes, then the ones they joined, each listed once.
pub async fn get_user_trips(trips: &dyn TripRepository, user_id: &ObjectId) -> Result<Vec<Trip>, AppError> {
    let organized = trips.find_by_organizer(user_id).await?;
    let joined = trips.find_by_member(user_id).await?;
    Ok(merge_trips(organized, joined))
}

fn merge_trips(organized: Vec<Trip>, joined: Vec<Trip>) -> Vec<Trip> {
    let mut seen = HashSet::new();
    organized
        .into_iter()
        .chain(joined)
        .filter(|trip| match trip.id {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect()
}

pub async fn increment_trip_count(
    users: &dyn UserRepository,
    user_id: &ObjectId,
) -> Result<UserProfile, AppError> {
    users
        .record_trip_usage(user_id)
        .await?
        .map(UserProfile::from)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
