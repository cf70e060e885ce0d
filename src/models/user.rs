use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Trips a new account may create before a plan is required
pub const DEFAULT_FREE_TRIPS: i32 = 2;

fn default_free_trips() -> i32 {
    DEFAULT_FREE_TRIPS
}

/// User document (armazenado na collection `users`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    #[serde(default)]
    pub trip_count: i32,
    #[serde(default)]
    pub has_paid: bool,
    #[serde(default = "default_free_trips")]
    pub free_trips_left: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: None,
            name,
            email,
            password: password_hash,
            trip_count: 0,
            has_paid: false,
            free_trips_left: DEFAULT_FREE_TRIPS,
            created_at: Some(DateTime::now()),
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn can_create_trip(&self) -> bool {
        self.free_trips_left > 0
    }

    /// Counts one created trip and spends a credit; credits bottom out at zero.
    pub fn record_trip_created(&mut self) {
        self.trip_count += 1;
        self.free_trips_left = (self.free_trips_left - 1).max(0);
    }

    pub fn apply_payment(&mut self, trips: i32) {
        self.has_paid = true;
        self.free_trips_left = trips.max(0);
    }
}

/// Conta sem o hash de senha (profile e increment-trip-count)
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub trip_count: i32,
    pub has_paid: bool,
    pub free_trips_left: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id_hex(),
            created_at: user.created_at.and_then(|dt| dt.try_to_rfc3339_string().ok()),
            name: user.name,
            email: user.email,
            trip_count: user.trip_count,
            has_paid: user.has_paid,
            free_trips_left: user.free_trips_left,
        }
    }
}

/// Returned by register and login
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub trip_count: i32,
    pub has_paid: bool,
    pub free_trips_left: i32,
    pub token: String,
}

impl AuthResponse {
    pub fn new(user: User, token: String) -> Self {
        AuthResponse {
            id: user.id_hex(),
            name: user.name,
            email: user.email,
            trip_count: user.trip_count,
            has_paid: user.has_paid,
            free_trips_left: user.free_trips_left,
            token,
        }
    }
}

/// Subscription state echoed after a payment
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub has_paid: bool,
    pub free_trips_left: i32,
}

impl From<User> for PaymentUser {
    fn from(user: User) -> Self {
        PaymentUser {
            id: user.id_hex(),
            name: user.name,
            email: user.email,
            has_paid: user.has_paid,
            free_trips_left: user.free_trips_left,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Normalizes an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("Ana".into(), "ana@uni.edu".into(), "hash".into())
    }

    #[test]
    fn new_users_start_with_two_free_trips() {
        let u = user();
        assert_eq!(u.free_trips_left, 2);
        assert_eq!(u.trip_count, 0);
        assert!(!u.has_paid);
        assert!(u.can_create_trip());
    }

    #[test]
    fn free_trips_never_go_negative() {
        let mut u = user();
        for _ in 0..5 {
            u.record_trip_created();
        }
        assert_eq!(u.trip_count, 5);
        assert_eq!(u.free_trips_left, 0);
        assert!(!u.can_create_trip());
    }

    #[test]
    fn payment_replaces_remaining_credits() {
        let mut u = user();
        u.record_trip_created();
        u.apply_payment(15);
        assert!(u.has_paid);
        assert_eq!(u.free_trips_left, 15);

        u.apply_payment(-3);
        assert_eq!(u.free_trips_left, 0);
    }

    #[test]
    fn profile_hides_password_and_uses_mongo_field_names() {
        let mut u = user();
        u.id = Some(ObjectId::new());
        let json = serde_json::to_value(UserProfile::from(u.clone())).unwrap();
        assert_eq!(json["_id"], u.id_hex());
        assert_eq!(json["freeTripsLeft"], 2);
        assert_eq!(json["tripCount"], 0);
        assert!(json.get("password").is_none());
    }

    #[test]
    fn legacy_documents_get_defaults() {
        let doc = mongodb::bson::doc! {
            "_id": ObjectId::new(),
            "name": "Old",
            "email": "old@uni.edu",
            "password": "hash",
            "__v": 0,
        };
        let u: User = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(u.free_trips_left, DEFAULT_FREE_TRIPS);
        assert_eq!(u.trip_count, 0);
        assert!(u.created_at.is_none());
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ana@Uni.EDU "), "ana@uni.edu");
    }
}
