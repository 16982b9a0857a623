//! HTTP management API for V2Ray users and traffic counters.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::schema::ShimConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use upstream::{GrpcManagementClient, ManagementApi};
