use axum::Router;

pub mod parcels;
pub mod system;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new().nest("/parcels", parcels::router())
}
