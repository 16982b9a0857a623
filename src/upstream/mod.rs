//! Management service client subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → client.rs (ManagementApi: one function per operation)
//!     → proto.rs (generated AlterInbound / QueryStats bindings)
//!     → unary call on a fresh channel
//!     → channel dropped, result returned
//! ```
//!
//! The management service owns the user table and the counters. This side
//! only builds requests and hands back whatever the service answers.

pub mod client;
pub mod proto;
pub mod types;

pub use client::{ClientSettings, GrpcManagementClient, ManagementApi};
pub use types::{InvalidInput, StatRecord, StatsQuery, UpstreamError, UserIdentity};
