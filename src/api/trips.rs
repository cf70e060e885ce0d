use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use super::{caller_id, failure};
use crate::database::parse_object_id;
use crate::middleware::auth::Claims;
use crate::models::{CreateTripRequest, TripResponse};
use crate::services::trip_service;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TripQuery {
    /// Matches title or destination, case-insensitive
    pub search: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JoinTripResponse {
    pub success: bool,
    pub message: String,
    pub trip: TripResponse,
}

#[utoipa::path(
    get,
    path = "/api/trips",
    tag = "Trips",
    params(TripQuery),
    responses((status = 200, description = "Available trips", body = [TripResponse]))
)]
pub async fn get_trips(state: web::Data<AppState>, query: web::Query<TripQuery>) -> HttpResponse {
    log::info!("🗺️  GET /trips - search: {:?}", query.search);

    match trip_service::list_trips(state.trips.as_ref(), query.search.as_deref()).await {
        Ok(trips) => {
            let trips: Vec<TripResponse> = trips.into_iter().map(TripResponse::from).collect();
            HttpResponse::Ok().json(trips)
        }
        Err(e) => failure("Trip listing failed", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/trips/{id}",
    tag = "Trips",
    params(("id" = String, Path, description = "Trip ObjectId")),
    responses(
        (status = 200, description = "Trip", body = TripResponse),
        (status = 404, description = "Trip not found")
    )
)]
pub async fn get_trip(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let trip_id = path.into_inner();
    log::info!("🔎 GET /trips/{}", trip_id);

    let result = async {
        let trip_id = parse_object_id(&trip_id, "trip")?;
        trip_service::get_trip(state.trips.as_ref(), &trip_id).await
    }
    .await;

    match result {
        Ok(trip) => HttpResponse::Ok().json(TripResponse::from(trip)),
        Err(e) => failure("Trip lookup failed", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/trips",
    tag = "Trips",
    request_body = CreateTripRequest,
    responses(
        (status = 201, description = "Trip created", body = TripResponse),
        (status = 400, description = "Invalid trip form"),
        (status = 402, description = "No trip credits left")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_trip(
    user: web::ReqData<Claims>,
    state: web::Data<AppState>,
    request: web::Json<CreateTripRequest>,
) -> HttpResponse {
    log::info!("🆕 POST /trips - organizer {}", user.sub);

    let result = async {
        let organizer_id = caller_id(&user)?;
        trip_service::create_trip(
            state.users.as_ref(),
            state.trips.as_ref(),
            &organizer_id,
            request.into_inner(),
        )
        .await
    }
    .await;

    match result {
        Ok(trip) => {
            log::info!("✅ Trip created: {} ({})", trip.title, trip.destination);
            HttpResponse::Created().json(TripResponse::from(trip))
        }
        Err(e) => failure("Trip creation failed", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/trips/{id}/join",
    tag = "Trips",
    params(("id" = String, Path, description = "Trip ObjectId")),
    responses(
        (status = 200, description = "Joined", body = JoinTripResponse),
        (status = 400, description = "Trip full or already joined"),
        (status = 404, description = "Trip not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn join_trip(
    user: web::ReqData<Claims>,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let trip_id = path.into_inner();
    log::info!("🤝 POST /trips/{}/join - user {}", trip_id, user.sub);

    let result = async {
        let trip_id = parse_object_id(&trip_id, "trip")?;
        let user_id = caller_id(&user)?;
        trip_service::join_trip(state.users.as_ref(), state.trips.as_ref(), &trip_id, &user_id).await
    }
    .await;

    match result {
        Ok(trip) => HttpResponse::Ok().json(JoinTripResponse {
            success: true,
            message: "Successfully joined the trip".to_string(),
            trip: trip.into(),
        }),
        Err(e) => failure("Join failed", e),
    }
}
