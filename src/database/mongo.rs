use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;

use super::{JoinOutcome, MongoDB, TripRepository, UserRepository, TRIPS, USERS};
use crate::models::{MemberRef, Trip, User, DEFAULT_FREE_TRIPS};
use crate::utils::AppError;

const DUPLICATE_KEY: i32 = 11000;

/// Attempts before a join gives up on a trip that keeps changing underneath it
const JOIN_ATTEMPTS: usize = 3;

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        &*e.kind,
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserRepository for MongoDB {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.collection::<User>(USERS).find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.collection::<User>(USERS).find_one(doc! { "_id": *id }).await?)
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let result = self
            .collection::<User>(USERS)
            .insert_one(&user)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::InvalidRequest("User already exists".to_string())
                } else {
                    AppError::from(e)
                }
            })?;

        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    async fn increment_trip_count(&self, id: &ObjectId) -> Result<(), AppError> {
        let result = self
            .collection::<User>(USERS)
            .update_one(doc! { "_id": *id }, doc! { "$inc": { "tripCount": 1 } })
            .await?;

        if result.matched_count == 0 {
            log::warn!("⚠️  tripCount not incremented, user {} not found", id);
        }
        Ok(())
    }

    async fn record_trip_usage(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        // Update pipeline: both counters move in a single document write
        let pipeline = vec![doc! {
            "$set": {
                "tripCount": { "$add": [{ "$ifNull": ["$tripCount", 0] }, 1] },
                "freeTripsLeft": {
                    "$max": [0, { "$subtract": [{ "$ifNull": ["$freeTripsLeft", DEFAULT_FREE_TRIPS] }, 1] }]
                }
            }
        }];

        Ok(self
            .collection::<User>(USERS)
            .find_one_and_update(doc! { "_id": *id }, pipeline)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn apply_payment(&self, id: &ObjectId, trips: i32) -> Result<Option<User>, AppError> {
        Ok(self
            .collection::<User>(USERS)
            .find_one_and_update(
                doc! { "_id": *id },
                doc! { "$set": { "hasPaid": true, "freeTripsLeft": trips.max(0) } },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }
}

#[async_trait]
impl TripRepository for MongoDB {
    async fn list(&self) -> Result<Vec<Trip>, AppError> {
        let cursor = self.collection::<Trip>(TRIPS).find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Trip>, AppError> {
        Ok(self.collection::<Trip>(TRIPS).find_one(doc! { "_id": *id }).await?)
    }

    async fn find_by_organizer(&self, user_id: &ObjectId) -> Result<Vec<Trip>, AppError> {
        let cursor = self
            .collection::<Trip>(TRIPS)
            .find(doc! { "organizer.id": *user_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_member(&self, user_id: &ObjectId) -> Result<Vec<Trip>, AppError> {
        let cursor = self
            .collection::<Trip>(TRIPS)
            .find(doc! { "members.id": *user_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, mut trip: Trip) -> Result<Trip, AppError> {
        let result = self.collection::<Trip>(TRIPS).insert_one(&trip).await?;
        trip.id = result.inserted_id.as_object_id();
        Ok(trip)
    }

    async fn add_member(&self, trip_id: &ObjectId, member: MemberRef) -> Result<JoinOutcome, AppError> {
        let collection = self.collection::<Trip>(TRIPS);

        for _ in 0..JOIN_ATTEMPTS {
            // The filter re-checks capacity and membership at write time
            let filter = doc! {
                "_id": *trip_id,
                "members.id": { "$ne": member.id },
                "$expr": { "$lt": ["$participants", "$maxParticipants"] },
            };
            let update = doc! {
                "$push": { "members": { "id": member.id, "name": member.name.as_str() } },
                "$inc": { "participants": 1 },
            };

            let updated = collection
                .find_one_and_update(filter, update)
                .return_document(ReturnDocument::After)
                .await?;

            if let Some(trip) = updated {
                return Ok(JoinOutcome::Joined(trip));
            }

            match collection.find_one(doc! { "_id": *trip_id }).await? {
                None => return Ok(JoinOutcome::NotFound),
                Some(trip) if trip.is_full() => return Ok(JoinOutcome::Full),
                Some(trip) if trip.has_member(&member.id) => return Ok(JoinOutcome::AlreadyMember),
                Some(_) => log::debug!("Trip {} changed during join, retrying", trip_id),
            }
        }

        Err(AppError::Internal(format!("Trip {} kept changing while joining", trip_id)))
    }
}
