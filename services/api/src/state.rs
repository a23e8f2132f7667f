//! Application state shared across handlers

use common::jwt::JwtService;
use media::MediaService;
use std::sync::Arc;
use store::FitnessStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FitnessStore>,
    pub media: MediaService,
    pub jwt_service: JwtService,
}
