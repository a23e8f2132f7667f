//! Application state shared across handlers

use common::jwt::JwtService;
use std::sync::Arc;
use store::FitnessStore;

use crate::{rate_limiter::RateLimiter, revocation::RevocationList};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FitnessStore>,
    pub jwt_service: JwtService,
    pub revocations: Arc<dyn RevocationList>,
    pub rate_limiter: RateLimiter,
}
