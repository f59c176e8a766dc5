//! Shared router state. Clone is cheap (the guard is `Arc`-backed).
use crate::services::bearer::BearerGuard;

#[derive(Clone, Debug)]
pub struct AppState {
    pub guard: BearerGuard,
}

impl AppState {
    pub fn new(guard: BearerGuard) -> Self {
        Self { guard }
    }
}
