//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::patch;

pub use audit_trail::AuditTrail;
pub use current_actor::CurrentActor;
pub use current_actor::JwtKeys;
#[allow(unused_imports)] // used by tests
pub use current_actor::generate_token;
pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use response::Error;
pub use response::Success;

use crate::storage::Storage;

mod audit_trail;
mod current_actor;
mod deliveries;
mod request;
mod response;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let deliveries = Router::new()
        .route(
            "/",
            get(deliveries::list::<S>).post(deliveries::create::<S>),
        )
        .route("/{delivery}", get(deliveries::single::<S>))
        .route("/{delivery}/acknowledge", patch(deliveries::acknowledge::<S>))
        .route("/{delivery}/accept", patch(deliveries::accept::<S>))
        .route("/{delivery}/deliver", patch(deliveries::deliver::<S>))
        .route("/{delivery}/confirm", patch(deliveries::confirm::<S>));

    Router::new().nest("/deliveries", deliveries)
}

/// Fallback for routes that do not exist
pub async fn not_found() -> Error {
    Error::not_found("Route not found")
}
