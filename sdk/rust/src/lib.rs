//! Typed client for the V2Ray user API.

mod client;

pub use client::{SdkError, StatRecord, UserApiClient};
