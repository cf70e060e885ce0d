use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Travel Squad API",
        version = "1.0.0",
        description = "Group trips for college students.\n\n**Authentication:** creating or joining trips, uploads, payments and the profile need a JWT Bearer token from `/api/users/login` or `/api/users/register`.\n\n**Credits:** every account starts with 2 free trips. Once they are spent, `POST /api/trips` answers 402 until a (mock) payment adds more."
    ),
    paths(
        // Users
        crate::api::users::register,
        crate::api::users::login,
        crate::api::users::get_profile,
        crate::api::users::get_user_trips,
        crate::api::users::increment_trip_count,

        // Trips
        crate::api::trips::get_trips,
        crate::api::trips::get_trip,
        crate::api::trips::create_trip,
        crate::api::trips::join_trip,

        // Upload & Payments
        crate::api::upload::upload_image,
        crate::api::payments::process_payment,

        // Health
        crate::api::health::root,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::RegisterRequest,
            crate::models::LoginRequest,
            crate::models::AuthResponse,
            crate::models::UserProfile,
            crate::models::PaymentUser,

            crate::models::CreateTripRequest,
            crate::models::TripResponse,
            crate::models::MemberResponse,
            crate::api::trips::JoinTripResponse,

            crate::api::upload::UploadResponse,
            crate::services::payment_service::PaymentRequest,
            crate::services::payment_service::PaymentResponse,

            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Users", description = "Registration, login, profile and trip credits."),
        (name = "Trips", description = "Browse, search, create and join trips."),
        (name = "Upload", description = "Trip cover images, stored on disk and served under /uploads."),
        (name = "Payments", description = "Mock payment that marks the account as paid and sets the trip credits."),
        (name = "Health", description = "Liveness endpoints."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by login or register"))
                        .build()
                ),
            );
        }
    }
}
