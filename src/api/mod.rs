//! HTTP API for the publication engine.
//!
//! This module exposes family builds and whole publication runs over REST,
//! taking records in the request body instead of a warehouse extract.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::PublicationRequest;
pub use response::{ApiError, ApiErrorResponse, PublicationResponse};
pub use state::AppState;
