use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::Mutex;

use super::{JoinOutcome, TripRepository, UserRepository};
use crate::models::{MemberRef, Trip, User};
use crate::utils::AppError;

/// In-memory stand-in for the `users` and `trips` collections
#[derive(Default)]
pub struct MemoryStore {
    pub users: Mutex<Vec<User>>,
    pub trips: Mutex<Vec<Trip>>,
}

impl MemoryStore {
    pub async fn user(&self, id: &ObjectId) -> Option<User> {
        self.users.lock().await.iter().find(|u| u.id.as_ref() == Some(id)).cloned()
    }

    pub async fn trip(&self, id: &ObjectId) -> Option<Trip> {
        self.trips.lock().await.iter().find(|t| t.id.as_ref() == Some(id)).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.user(id).await)
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::InvalidRequest("User already exists".to_string()));
        }
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }

    async fn increment_trip_count(&self, id: &ObjectId) -> Result<(), AppError> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.iter_mut().find(|u| u.id.as_ref() == Some(id)) {
            user.trip_count += 1;
        }
        Ok(())
    }

    async fn record_trip_usage(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().await;
        Ok(users.iter_mut().find(|u| u.id.as_ref() == Some(id)).map(|user| {
            user.record_trip_created();
            user.clone()
        }))
    }

    async fn apply_payment(&self, id: &ObjectId, trips: i32) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().await;
        Ok(users.iter_mut().find(|u| u.id.as_ref() == Some(id)).map(|user| {
            user.apply_payment(trips);
            user.clone()
        }))
    }
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Trip>, AppError> {
        Ok(self.trips.lock().await.clone())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Trip>, AppError> {
        Ok(self.trip(id).await)
    }

    async fn find_by_organizer(&self, user_id: &ObjectId) -> Result<Vec<Trip>, AppError> {
        let trips = self.trips.lock().await;
        Ok(trips.iter().filter(|t| &t.organizer.id == user_id).cloned().collect())
    }

    async fn find_by_member(&self, user_id: &ObjectId) -> Result<Vec<Trip>, AppError> {
        let trips = self.trips.lock().await;
        Ok(trips.iter().filter(|t| t.has_member(user_id)).cloned().collect())
    }

    async fn insert(&self, mut trip: Trip) -> Result<Trip, AppError> {
        trip.id = Some(ObjectId::new());
        self.trips.lock().await.push(trip.clone());
        Ok(trip)
    }

    async fn add_member(&self, trip_id: &ObjectId, member: MemberRef) -> Result<JoinOutcome, AppError> {
        let mut trips = self.trips.lock().await;
        let Some(trip) = trips.iter_mut().find(|t| t.id.as_ref() == Some(trip_id)) else {
            return Ok(JoinOutcome::NotFound);
        };

        if trip.is_full() {
            return Ok(JoinOutcome::Full);
        }
        if trip.has_member(&member.id) {
            return Ok(JoinOutcome::AlreadyMember);
        }

        trip.add_member(member);
        Ok(JoinOutcome::Joined(trip.clone()))
    }
}
