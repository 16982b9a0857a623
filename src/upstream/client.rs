//! One function per management operation.
//!
//! Every call opens its own connection, issues exactly one RPC and releases
//! the connection before returning, whether the call succeeded or not.

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};

use crate::config::{ShimConfig, TimeoutConfig, UpstreamConfig};
use crate::observability::metrics;
use crate::upstream::proto::protocol::{SecurityConfig, SecurityType, User};
use crate::upstream::proto::proxyman::handler_service_client::HandlerServiceClient;
use crate::upstream::proto::proxyman::{AddUserOperation, AlterInboundRequest, RemoveUserOperation};
use crate::upstream::proto::serial::TypedMessage;
use crate::upstream::proto::stats::stats_service_client::StatsServiceClient;
use crate::upstream::proto::stats::QueryStatsRequest;
use crate::upstream::proto::vmess::Account;
use crate::upstream::proto::TypedName;
use crate::upstream::types::{StatRecord, StatsQuery, UpstreamError, UserIdentity};

/// The management operations the HTTP front end dispatches to.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn add_user(&self, identity: &UserIdentity) -> Result<(), UpstreamError>;

    async fn remove_user(&self, email: &str) -> Result<(), UpstreamError>;

    async fn query_stats(&self, query: StatsQuery) -> Result<Vec<StatRecord>, UpstreamError>;

    async fn query_user_traffic(&self, email: &str) -> Result<Vec<StatRecord>, UpstreamError> {
        self.query_stats(StatsQuery::user(email, false)).await
    }

    async fn query_traffic(&self) -> Result<Vec<StatRecord>, UpstreamError> {
        self.query_stats(StatsQuery::all_users(false)).await
    }

    /// Returns the pre-reset values.
    async fn reset_user_traffic(&self, email: &str) -> Result<Vec<StatRecord>, UpstreamError> {
        self.query_stats(StatsQuery::user(email, true)).await
    }

    /// Returns the pre-reset values.
    async fn reset_traffic(&self) -> Result<Vec<StatRecord>, UpstreamError> {
        self.query_stats(StatsQuery::all_users(true)).await
    }
}

/// Settings the client reads on every call. Swapped as a whole on reload.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub upstream: UpstreamConfig,
    pub timeouts: TimeoutConfig,
}

impl From<&ShimConfig> for ClientSettings {
    fn from(config: &ShimConfig) -> Self {
        Self {
            upstream: config.upstream.clone(),
            timeouts: config.timeouts.clone(),
        }
    }
}

/// [`ManagementApi`] backed by the management service's gRPC interface.
#[derive(Clone)]
pub struct GrpcManagementClient {
    settings: Arc<ArcSwap<ClientSettings>>,
}

impl GrpcManagementClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self::with_shared_settings(Arc::new(ArcSwap::from_pointee(settings)))
    }

    /// Use settings owned elsewhere, e.g. swapped by the config watcher.
    pub fn with_shared_settings(settings: Arc<ArcSwap<ClientSettings>>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> Arc<ClientSettings> {
        self.settings.load_full()
    }

    async fn connect(settings: &ClientSettings) -> Result<Connection, UpstreamError> {
        let uri = settings.upstream.endpoint_uri();
        let mut endpoint = Endpoint::from_shared(uri.clone()).map_err(UpstreamError::Endpoint)?;
        if let Some(timeout) = settings.timeouts.connect() {
            endpoint = endpoint.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.timeouts.request() {
            endpoint = endpoint.timeout(timeout);
        }

        let channel = endpoint.connect().await.map_err(UpstreamError::Connect)?;
        tracing::debug!(endpoint = %uri, "Opened management connection");
        Ok(Connection { channel, endpoint: uri })
    }

    async fn alter_inbound(
        &self,
        operation: &'static str,
        typed: TypedMessage,
    ) -> Result<(), UpstreamError> {
        let settings = self.settings.load_full();
        let start = Instant::now();

        let result: Result<(), UpstreamError> = async {
            let conn = Self::connect(&settings).await?;
            let mut client = HandlerServiceClient::new(conn.channel.clone());
            client
                .alter_inbound(AlterInboundRequest {
                    tag: settings.upstream.inbound_tag.clone(),
                    operation: Some(typed),
                })
                .await?;
            Ok(())
        }
        .await;

        metrics::record_upstream_call(operation, result.is_ok(), start);
        result
    }
}

/// A single-use connection; dropping it closes the channel.
struct Connection {
    channel: Channel,
    endpoint: String,
}

impl Drop for Connection {
    fn drop(&mut self) {
        tracing::debug!(endpoint = %self.endpoint, "Closed management connection");
    }
}

/// Build the typed add-user operation for the given identity.
pub fn add_user_operation(identity: &UserIdentity, level: u32) -> TypedMessage {
    let account = Account {
        id: identity.uuid.clone(),
        alter_id: 0,
        security_settings: Some(SecurityConfig {
            r#type: SecurityType::Auto as i32,
        }),
        tests_enabled: String::new(),
    };

    AddUserOperation {
        user: Some(User {
            level,
            email: identity.email.clone(),
            account: Some(account.to_typed_message()),
        }),
    }
    .to_typed_message()
}

/// Build the typed remove-user operation for the given email.
pub fn remove_user_operation(email: &str) -> TypedMessage {
    RemoveUserOperation {
        email: email.to_string(),
    }
    .to_typed_message()
}

#[async_trait]
impl ManagementApi for GrpcManagementClient {
    async fn add_user(&self, identity: &UserIdentity) -> Result<(), UpstreamError> {
        let level = self.settings.load().upstream.user_level;
        self.alter_inbound("add_user", add_user_operation(identity, level))
            .await
    }

    async fn remove_user(&self, email: &str) -> Result<(), UpstreamError> {
        self.alter_inbound("remove_user", remove_user_operation(email))
            .await
    }

    async fn query_stats(&self, query: StatsQuery) -> Result<Vec<StatRecord>, UpstreamError> {
        let settings = self.settings.load_full();
        let start = Instant::now();
        let operation = if query.reset { "reset_stats" } else { "query_stats" };

        let result: Result<Vec<StatRecord>, UpstreamError> = async {
            let conn = Self::connect(&settings).await?;
            let mut client = StatsServiceClient::new(conn.channel.clone());
            let response = client
                .query_stats(QueryStatsRequest {
                    pattern: query.pattern,
                    reset: query.reset,
                })
                .await?
                .into_inner();
            Ok(response.stat.into_iter().map(StatRecord::from).collect())
        }
        .await;

        metrics::record_upstream_call(operation, result.is_ok(), start);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    fn identity() -> UserIdentity {
        UserIdentity::parse("a@b.com", "123e4567-e89b-12d3-a456-426614174000").unwrap()
    }

    #[test]
    fn test_add_user_operation_layout() {
        let typed = add_user_operation(&identity(), 3);
        assert_eq!(typed.r#type, "v2ray.core.app.proxyman.command.AddUserOperation");

        let op = AddUserOperation::decode(typed.value.as_slice()).unwrap();
        let user = op.user.unwrap();
        assert_eq!(user.level, 3);
        assert_eq!(user.email, "a@b.com");

        let account_msg = user.account.unwrap();
        assert_eq!(account_msg.r#type, "v2ray.core.proxy.vmess.Account");
        let account = Account::decode(account_msg.value.as_slice()).unwrap();
        assert_eq!(account.id, "123e4567-e89b-12d3-a456-426614174000");
        assert_eq!(account.alter_id, 0);
        assert_eq!(
            account.security_settings.unwrap().r#type,
            SecurityType::Auto as i32
        );
    }

    #[test]
    fn test_remove_user_operation_layout() {
        let typed = remove_user_operation("a@b.com");
        assert_eq!(typed.r#type, "v2ray.core.app.proxyman.command.RemoveUserOperation");
        let op = RemoveUserOperation::decode(typed.value.as_slice()).unwrap();
        assert_eq!(op.email, "a@b.com");
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_reported_without_panicking() {
        let mut config = ShimConfig::default();
        config.upstream.address = "http://bad host:1".into();
        let client = GrpcManagementClient::new(ClientSettings::from(&config));

        let err = client.remove_user("a@b.com").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Endpoint(_)));
        assert!(err.remote_message().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = ShimConfig::default();
        config.upstream.address = addr.to_string();
        let client = GrpcManagementClient::new(ClientSettings::from(&config));

        let err = client.query_traffic().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Connect(_)));
    }

    #[test]
    fn test_shared_settings_are_observed() {
        let shared = Arc::new(ArcSwap::from_pointee(ClientSettings::from(&ShimConfig::default())));
        let client = GrpcManagementClient::with_shared_settings(shared.clone());

        let mut config = ShimConfig::default();
        config.upstream.inbound_tag = "vmess-in".into();
        shared.store(Arc::new(ClientSettings::from(&config)));

        assert_eq!(client.settings().upstream.inbound_tag, "vmess-in");
    }
}
