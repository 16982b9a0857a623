//! Domain types exchanged with the management service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upstream::proto::stats::Stat;

/// Namespace prefix of per-user counters in the stats service.
pub const USER_STATS_PREFIX: &str = "user>>>";

/// Required length of the textual user id.
pub const USER_ID_LEN: usize = 36;

/// A user to be added to the managed inbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    /// Management key; not checked for RFC 5322 syntax.
    pub email: String,
    /// Account id in canonical UUID form. Only the length is checked.
    pub uuid: String,
}

/// Reasons a request is rejected before any upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("email is required")]
    MissingEmail,

    #[error("uuid must be exactly 36 characters")]
    BadUuidLength,
}

impl UserIdentity {
    pub fn parse(email: &str, uuid: &str) -> Result<Self, InvalidInput> {
        let email = require_email(email)?;
        if uuid.len() != USER_ID_LEN {
            return Err(InvalidInput::BadUuidLength);
        }
        Ok(Self {
            email,
            uuid: uuid.to_string(),
        })
    }
}

/// Returns the email as an owned key, or rejects an empty one.
pub fn require_email(email: &str) -> Result<String, InvalidInput> {
    if email.is_empty() {
        Err(InvalidInput::MissingEmail)
    } else {
        Ok(email.to_string())
    }
}

/// A pattern-filtered counter read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub pattern: String,
    /// Zero the matched counters after reading them.
    pub reset: bool,
}

impl StatsQuery {
    /// Counters of a single user.
    pub fn user(email: &str, reset: bool) -> Self {
        Self {
            pattern: format!("{USER_STATS_PREFIX}{email}"),
            reset,
        }
    }

    /// Counters of every user.
    pub fn all_users(reset: bool) -> Self {
        Self {
            pattern: USER_STATS_PREFIX.to_string(),
            reset,
        }
    }
}

/// A traffic counter as reported by the stats service.
///
/// Zero-valued fields are left out of the JSON object, matching the
/// management service's own JSON encoding of `Stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub value: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl From<Stat> for StatRecord {
    fn from(stat: Stat) -> Self {
        Self {
            name: stat.name,
            value: stat.value,
        }
    }
}

/// Errors from a single upstream round-trip.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid management endpoint: {0}")]
    Endpoint(#[source] tonic::transport::Error),

    #[error("failed to connect to management service: {0}")]
    Connect(#[source] tonic::transport::Error),

    #[error("management call failed: {}", .0.message())]
    Rpc(#[from] tonic::Status),
}

impl UpstreamError {
    /// Error text reported by the remote service, if the call reached it.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            UpstreamError::Rpc(status) => Some(status.message()),
            _ => None,
        }
    }
}
