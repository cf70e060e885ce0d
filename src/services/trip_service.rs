use mongodb::bson::{oid::ObjectId, DateTime};

use crate::database::{JoinOutcome, TripRepository, UserRepository};
use crate::models::{parse_trip_date, CreateTripRequest, MemberRef, Trip, User};
use crate::utils::AppError;

pub const NO_TRIPS_LEFT: &str = "No trips left. Please purchase a plan to create more trips";

pub async fn list_trips(trips: &dyn TripRepository, search: Option<&str>) -> Result<Vec<Trip>, AppError> {
    let all = trips.list().await?;
    Ok(match search.map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => all.into_iter().filter(|trip| trip.matches_search(term)).collect(),
        None => all,
    })
}

pub async fn get_trip(trips: &dyn TripRepository, trip_id: &ObjectId) -> Result<Trip, AppError> {
    trips
        .find_by_id(trip_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))
}

async fn load_user(users: &dyn UserRepository, user_id: &ObjectId) -> Result<User, AppError> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidRequest(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn date(value: &str, field: &str) -> Result<DateTime, AppError> {
    parse_trip_date(value).ok_or_else(|| AppError::InvalidRequest(format!("{} is not a valid date", field)))
}

/// Validates the form and builds the document with the organizer as first member.
pub fn build_trip(request: CreateTripRequest, organizer: MemberRef) -> Result<Trip, AppError> {
    let title = required(&request.title, "title")?;
    let destination = required(&request.destination, "destination")?;
    let image = required(&request.image, "image")?;
    let duration = required(&request.duration, "duration")?;
    let description = required(&request.description, "description")?;
    let start_date = date(&request.start_date, "startDate")?;
    let end_date = date(&request.end_date, "endDate")?;

    if end_date < start_date {
        return Err(AppError::InvalidRequest("endDate must not be before startDate".to_string()));
    }

    let price = request
        .price
        .ok_or_else(|| AppError::InvalidRequest("price is required".to_string()))?;
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::InvalidRequest("price must be a non-negative number".to_string()));
    }

    let max_participants = request
        .max_participants
        .ok_or_else(|| AppError::InvalidRequest("maxParticipants is required".to_string()))?;
    if max_participants < 1 {
        return Err(AppError::InvalidRequest("maxParticipants must be at least 1".to_string()));
    }

    Ok(Trip {
        id: None,
        title,
        destination,
        image,
        start_date,
        end_date,
        duration,
        price,
        participants: 1,
        max_participants,
        description,
        itinerary: request
            .itinerary
            .into_iter()
            .map(|day| day.trim().to_string())
            .filter(|day| !day.is_empty())
            .collect(),
        food: request.food.trim().to_string(),
        accommodation: request.accommodation.trim().to_string(),
        transportation: request.transportation.trim().to_string(),
        members: vec![organizer.clone()],
        organizer,
        created_at: Some(DateTime::now()),
    })
}

/// Creates a trip for `organizer_id` if they still hold a trip credit.
///
/// The insert and the organizer's `tripCount` increment are separate writes;
/// when the second one fails the trip stays and the error is returned.
pub async fn create_trip(
    users: &dyn UserRepository,
    trips: &dyn TripRepository,
    organizer_id: &ObjectId,
    request: CreateTripRequest,
) -> Result<Trip, AppError> {
    let user = load_user(users, organizer_id).await?;

    if !user.can_create_trip() {
        return Err(AppError::PaymentRequired(NO_TRIPS_LEFT.to_string()));
    }

    let organizer = MemberRef {
        id: *organizer_id,
        name: user.name,
    };
    let trip = trips.insert(build_trip(request, organizer)?).await?;

    if let Err(e) = users.increment_trip_count(organizer_id).await {
        log::error!(
            "❌ Trip {} created but tripCount of {} not updated: {}",
            trip.id.map(|id| id.to_hex()).unwrap_or_default(),
            organizer_id,
            e
        );
        return Err(e);
    }

    Ok(trip)
}

pub async fn join_trip(
    users: &dyn UserRepository,
    trips: &dyn TripRepository,
    trip_id: &ObjectId,
    user_id: &ObjectId,
) -> Result<Trip, AppError> {
    let user = load_user(users, user_id).await?;
    let member = MemberRef {
        id: *user_id,
        name: user.name,
    };

    match trips.add_member(trip_id, member).await? {
        JoinOutcome::Joined(trip) => Ok(trip),
        JoinOutcome::NotFound => Err(AppError::NotFound("Trip not found".to_string())),
        JoinOutcome::Full => Err(AppError::InvalidRequest("Trip is already full".to_string())),
        JoinOutcome::AlreadyMember => Err(AppError::InvalidRequest(
            "You have already joined this trip".to_string(),
        )),
    }
}
