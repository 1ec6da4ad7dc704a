pub mod acl;
pub mod admin;
pub mod connect;
pub mod ec2;
pub mod iam;
pub mod model;
pub mod msk;
mod sdk;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use model::*;

/// Result type for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Legacy control-plane phrase returned for operations serverless clusters do not support
pub const SERVERLESS_UNSUPPORTED_PHRASE: &str =
    "This operation cannot be performed on serverless clusters.";

/// Legacy control-plane phrase returned where VPC connectivity is not offered
pub const VPC_CONNECTIVITY_UNSUPPORTED_PHRASE: &str = "VPC connectivity is not supported";

/// Category of a collaborator failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    UnsupportedOnServerless,
    VpcConnectivityUnsupported,
    /// The broker has no authorizer configured
    SecurityDisabled,
    AccessDenied,
    Throttled,
    ConnectionFailed,
    Timeout,
    Cancelled,
    Other,
}

impl ErrorKind {
    /// Maps vendor error text to a kind when no structured code is available
    pub fn from_message(message: &str) -> Self {
        if message.contains(SERVERLESS_UNSUPPORTED_PHRASE) {
            Self::UnsupportedOnServerless
        } else if message.contains(VPC_CONNECTIVITY_UNSUPPORTED_PHRASE) {
            Self::VpcConnectivityUnsupported
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::UnsupportedOnServerless => "unsupported on serverless",
            Self::VpcConnectivityUnsupported => "vpc connectivity unsupported",
            Self::SecurityDisabled => "security disabled",
            Self::AccessDenied => "access denied",
            Self::Throttled => "throttled",
            Self::ConnectionFailed => "connection failed",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Error raised by a control-plane or Kafka-protocol collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CollectorError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CollectorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds an error whose kind is derived from its text
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::from_message(&message),
            message,
        }
    }

    pub fn timeout(seconds: u64) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("Collection timeout after {} seconds", seconds),
        )
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "scan cancelled")
    }
}

impl From<rdkafka::error::KafkaError> for CollectorError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::from_message(err.to_string())
    }
}

/// Cursor and page-size hint passed to every list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub next_token: Option<String>,
    pub max_results: i32,
}

/// One page returned by a list call
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Cluster-management operations of the cloud control plane
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn describe_cluster(&self, cluster_arn: &str) -> CollectorResult<ClusterDescriptor>;

    async fn get_bootstrap_brokers(&self, cluster_arn: &str) -> CollectorResult<BootstrapBrokers>;

    async fn list_client_vpc_connections(
        &self,
        cluster_arn: &str,
        page: PageRequest,
    ) -> CollectorResult<Page<ClientVpcConnection>>;

    async fn list_cluster_operations(
        &self,
        cluster_arn: &str,
        page: PageRequest,
    ) -> CollectorResult<Page<ClusterOperation>>;

    async fn list_nodes(&self, cluster_arn: &str, page: PageRequest) -> CollectorResult<Page<BrokerNode>>;

    /// Returns secret ARNs only, never secret values
    async fn list_scram_secrets(&self, cluster_arn: &str, page: PageRequest) -> CollectorResult<Page<String>>;

    async fn get_cluster_policy(&self, cluster_arn: &str) -> CollectorResult<ClusterPolicy>;

    async fn get_compatible_kafka_versions(
        &self,
        cluster_arn: &str,
    ) -> CollectorResult<Vec<CompatibleKafkaVersion>>;

    async fn list_clusters(&self, page: PageRequest) -> CollectorResult<Page<ClusterDescriptor>>;

    async fn list_vpc_connections(&self, page: PageRequest) -> CollectorResult<Page<VpcConnection>>;

    async fn list_configurations(&self, page: PageRequest) -> CollectorResult<Page<ConfigurationSummary>>;

    async fn describe_configuration_revision(
        &self,
        configuration_arn: &str,
        revision: i64,
    ) -> CollectorResult<ConfigurationRevision>;

    async fn list_kafka_versions(&self, page: PageRequest) -> CollectorResult<Page<KafkaVersion>>;

    async fn list_replicators(&self, page: PageRequest) -> CollectorResult<Page<ReplicatorSummary>>;

    async fn describe_replicator(&self, replicator_arn: &str) -> CollectorResult<ReplicatorDetail>;
}

/// Subnet lookups used to derive provisioned-cluster network topology
#[async_trait]
pub trait SubnetDescriber: Send + Sync {
    async fn describe_subnets(&self, subnet_ids: &[String]) -> CollectorResult<Vec<SubnetDetail>>;
}

/// Managed Kafka Connect operations
#[async_trait]
pub trait ConnectorManager: Send + Sync {
    async fn list_connectors(&self, page: PageRequest) -> CollectorResult<Page<ConnectorSummary>>;

    async fn describe_connector(&self, connector_arn: &str) -> CollectorResult<ConnectorDetail>;
}

/// An open administrative connection to the Kafka brokers
#[async_trait]
pub trait AdminConnection: Send + Sync {
    async fn describe_cluster(&self) -> CollectorResult<KafkaClusterMetadata>;

    async fn list_topics(&self) -> CollectorResult<Vec<String>>;

    async fn describe_acls(&self) -> CollectorResult<Vec<AclEntry>>;

    /// Releases the connection. Dropping it releases it as well.
    async fn close(self: Box<Self>) -> CollectorResult<()>;
}

/// Opens admin connections for a given set of brokers
#[async_trait]
pub trait AdminConnectionFactory: Send + Sync {
    async fn connect(
        &self,
        addresses: &[String],
        encryption: ClientBrokerEncryption,
        version_hint: &str,
    ) -> CollectorResult<Box<dyn AdminConnection>>;
}

/// Loads the shared AWS SDK configuration for a region
pub async fn load_sdk_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_serverless_phrase() {
        let message = format!("BadRequestException: {}", SERVERLESS_UNSUPPORTED_PHRASE);
        assert_eq!(ErrorKind::from_message(&message), ErrorKind::UnsupportedOnServerless);
    }

    #[test]
    fn test_kind_from_vpc_phrase() {
        let message = "BadRequestException: VPC connectivity is not supported in this region";
        assert_eq!(ErrorKind::from_message(message), ErrorKind::VpcConnectivityUnsupported);
    }

    #[test]
    fn test_kind_from_unrelated_message() {
        assert_eq!(ErrorKind::from_message("InternalServerError"), ErrorKind::Other);
    }

    #[test]
    fn test_error_displays_message_only() {
        let err = CollectorError::new(ErrorKind::AccessDenied, "User is not authorized");
        assert_eq!(err.to_string(), "User is not authorized");
        assert_eq!(CollectorError::timeout(5).kind, ErrorKind::Timeout);
    }
}
