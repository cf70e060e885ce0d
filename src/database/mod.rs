mod mongo;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::{Client, Collection, Database};
use std::error::Error;

use crate::models::{MemberRef, Trip, User};
use crate::utils::AppError;

pub const USERS: &str = "users";
pub const TRIPS: &str = "trips";

/// Result of a guarded join attempt
#[derive(Debug)]
pub enum JoinOutcome {
    Joined(Trip),
    NotFound,
    Full,
    AlreadyMember,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    /// Inserts a new account; a taken email is reported as `InvalidRequest`.
    async fn insert(&self, user: User) -> Result<User, AppError>;

    async fn increment_trip_count(&self, id: &ObjectId) -> Result<(), AppError>;

    /// `tripCount + 1` and `freeTripsLeft - 1` floored at zero, in one update.
    async fn record_trip_usage(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    async fn apply_payment(&self, id: &ObjectId, trips: i32) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Trip>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Trip>, AppError>;

    async fn find_by_organizer(&self, user_id: &ObjectId) -> Result<Vec<Trip>, AppError>;

    async fn find_by_member(&self, user_id: &ObjectId) -> Result<Vec<Trip>, AppError>;

    async fn insert(&self, trip: Trip) -> Result<Trip, AppError>;

    /// Adds `member` only if the trip has room and does not list them yet.
    async fn add_member(&self, trip_id: &ObjectId, member: MemberRef) -> Result<JoinOutcome, AppError>;
}

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.app_name = Some("travel-squad".to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| "travelsquad".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;
        log::info!("✅ Connected to MongoDB database: {}", db_name);

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the handlers rely on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS);
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        // A failing unique index would let duplicate accounts through
        users.create_index(email_index).await?;
        log::info!("   ✅ Index created: users(email) unique");

        let trips = self.collection::<mongodb::bson::Document>(TRIPS);
        for key in ["organizer.id", "members.id"] {
            let mut keys = mongodb::bson::Document::new();
            keys.insert(key, 1);
            let index = IndexModel::builder().keys(keys).build();
            match trips.create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: trips({})", key),
                Err(e) => log::warn!("   ⚠️  Index trips({}) not created: {}", key, e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// Parses a path or token id into an ObjectId.
pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::InvalidRequest(format!("Invalid {} ID", what)))
}
