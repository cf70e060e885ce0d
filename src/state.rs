use std::sync::Arc;

use crate::config::Config;
use crate::database::{MongoDB, TripRepository, UserRepository};

/// Shared by every worker through `web::Data<AppState>`
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub trips: Arc<dyn TripRepository>,
    pub config: Config,
}

impl AppState {
    pub fn new(db: MongoDB, config: Config) -> Self {
        let db = Arc::new(db);
        Self {
            users: db.clone(),
            trips: db,
            config,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn in_memory(store: Arc<crate::database::memory::MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            trips: store,
            config: Config::for_tests(),
        }
    }
}
