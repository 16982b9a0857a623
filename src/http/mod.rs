//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, query parameters)
//!     → handlers.rs (validate, one management call)
//!     → response.rs (status code or JSON body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{QueryParams, X_REQUEST_ID};
pub use response::{translate_upstream_error, ApiError, Operation};
pub use server::{build_router, AppState, HttpServer};
