use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Deployment mode of an MSK cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentMode {
    #[serde(rename = "provisioned")]
    Provisioned,
    #[serde(rename = "serverless")]
    Serverless,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Default for DeploymentMode {
    fn default() -> Self {
        Self::Unknown
    }
}

impl DeploymentMode {
    pub fn from_cluster_type(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "PROVISIONED" => Self::Provisioned,
            "SERVERLESS" => Self::Serverless,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provisioned => write!(f, "provisioned"),
            Self::Serverless => write!(f, "serverless"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Encryption used between clients and brokers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientBrokerEncryption {
    #[serde(rename = "TLS")]
    Tls,
    #[serde(rename = "TLS_PLAINTEXT")]
    TlsPlaintext,
    #[serde(rename = "PLAINTEXT")]
    Plaintext,
}

impl Default for ClientBrokerEncryption {
    fn default() -> Self {
        Self::Tls
    }
}

impl FromStr for ClientBrokerEncryption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TLS" => Ok(Self::Tls),
            "TLS_PLAINTEXT" => Ok(Self::TlsPlaintext),
            "PLAINTEXT" => Ok(Self::Plaintext),
            other => Err(format!("unknown client-broker encryption: {}", other)),
        }
    }
}

impl fmt::Display for ClientBrokerEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tls => write!(f, "TLS"),
            Self::TlsPlaintext => write!(f, "TLS_PLAINTEXT"),
            Self::Plaintext => write!(f, "PLAINTEXT"),
        }
    }
}

/// Client authentication flags as declared on the control plane
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAuthentication {
    pub sasl_scram: bool,
    pub sasl_iam: bool,
    pub tls: bool,
    pub unauthenticated: bool,
    pub tls_certificate_authorities: Vec<String>,
}

impl ClientAuthentication {
    /// Human readable list of enabled methods, in a fixed order
    pub fn summary(&self) -> String {
        let mut methods = Vec::new();
        if self.sasl_scram {
            methods.push("SASL/SCRAM");
        }
        if self.sasl_iam {
            methods.push("SASL/IAM");
        }
        if self.tls {
            methods.push("TLS");
        }
        if self.unauthenticated {
            methods.push("Unauthenticated");
        }

        if methods.is_empty() {
            "Unauthenticated".to_string()
        } else {
            methods.join(", ")
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionInTransit {
    pub client_broker: Option<ClientBrokerEncryption>,
    pub in_cluster: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedConfig {
    pub kafka_version: Option<String>,
    pub configuration_arn: Option<String>,
    pub configuration_revision: Option<i64>,
    pub number_of_broker_nodes: Option<i32>,
    pub instance_type: Option<String>,
    pub client_subnets: Vec<String>,
    pub security_groups: Vec<String>,
    /// `DISABLED` or `SERVICE_PROVIDED_EIPS`
    pub public_access: Option<String>,
    pub storage_mode: Option<String>,
    pub enhanced_monitoring: Option<String>,
    pub client_authentication: ClientAuthentication,
    pub encryption_in_transit: EncryptionInTransit,
    pub encryption_at_rest_kms_key: Option<String>,
    pub zookeeper_connect_string: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerlessVpcConfig {
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerlessConfig {
    pub vpc_configs: Vec<ServerlessVpcConfig>,
    pub sasl_iam: bool,
}

/// Control-plane view of a single cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub cluster_arn: String,
    pub cluster_name: String,
    pub state: Option<String>,
    pub current_version: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub deployment_mode: DeploymentMode,
    pub tags: BTreeMap<String, String>,
    pub provisioned: Option<ProvisionedConfig>,
    pub serverless: Option<ServerlessConfig>,
}

impl ClusterDescriptor {
    pub fn is_provisioned(&self) -> bool {
        self.deployment_mode == DeploymentMode::Provisioned
    }

    /// Serverless clusters always encrypt client traffic.
    pub fn client_broker_encryption(&self) -> ClientBrokerEncryption {
        match (&self.deployment_mode, &self.provisioned) {
            (DeploymentMode::Provisioned, Some(p)) => {
                p.encryption_in_transit.client_broker.unwrap_or_default()
            }
            _ => ClientBrokerEncryption::Tls,
        }
    }

    pub fn client_subnets(&self) -> &[String] {
        match &self.provisioned {
            Some(p) => &p.client_subnets,
            None => &[],
        }
    }

    pub fn authentication_summary(&self) -> String {
        match self.deployment_mode {
            DeploymentMode::Provisioned => self
                .provisioned
                .as_ref()
                .map(|p| p.client_authentication.summary())
                .unwrap_or_else(|| ClientAuthentication::default().summary()),
            _ => {
                let sasl_iam = self.serverless.as_ref().map(|s| s.sasl_iam).unwrap_or(false);
                ClientAuthentication {
                    sasl_iam,
                    ..Default::default()
                }
                .summary()
            }
        }
    }

    pub fn public_access_enabled(&self) -> bool {
        self.provisioned
            .as_ref()
            .and_then(|p| p.public_access.as_deref())
            .map(|t| t == "SERVICE_PROVIDED_EIPS")
            .unwrap_or(false)
    }
}

/// Bootstrap broker connection strings, one per scheme and visibility
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapBrokers {
    pub plaintext: Option<String>,
    pub tls: Option<String>,
    pub sasl_scram: Option<String>,
    pub sasl_iam: Option<String>,
    pub public_tls: Option<String>,
    pub public_sasl_scram: Option<String>,
    pub public_sasl_iam: Option<String>,
    pub vpc_connectivity_tls: Option<String>,
    pub vpc_connectivity_sasl_scram: Option<String>,
    pub vpc_connectivity_sasl_iam: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientVpcConnection {
    pub vpc_connection_arn: Option<String>,
    pub owner: Option<String>,
    pub authentication: Option<String>,
    pub state: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VpcConnection {
    pub vpc_connection_arn: Option<String>,
    pub target_cluster_arn: Option<String>,
    pub vpc_id: Option<String>,
    pub authentication: Option<String>,
    pub state: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterOperation {
    pub operation_arn: Option<String>,
    pub operation_type: Option<String>,
    pub status: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerNode {
    pub broker_id: Option<i32>,
    pub node_arn: Option<String>,
    pub instance_type: Option<String>,
    pub client_subnet: Option<String>,
    pub client_vpc_ip_address: Option<String>,
    pub attached_eni_id: Option<String>,
    pub endpoints: Vec<String>,
    pub kafka_version: Option<String>,
}

/// Resource policy attached to a cluster; the zero value means "no policy"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterPolicy {
    pub current_version: Option<String>,
    pub policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibleKafkaVersion {
    pub source_version: Option<String>,
    pub target_versions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSummary {
    pub arn: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub kafka_versions: Vec<String>,
    pub latest_revision: Option<i64>,
    pub state: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRevision {
    pub revision: Option<i64>,
    pub description: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub server_properties: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaVersion {
    pub version: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicatorSummary {
    pub replicator_arn: Option<String>,
    pub replicator_name: Option<String>,
    pub replicator_state: Option<String>,
    pub current_version: Option<String>,
    pub is_replicator_reference: Option<bool>,
    pub creation_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationFlow {
    pub source_kafka_cluster_alias: Option<String>,
    pub target_kafka_cluster_alias: Option<String>,
    pub target_compression_type: Option<String>,
    pub topics_to_replicate: Vec<String>,
    pub topics_to_exclude: Vec<String>,
    pub consumer_groups_to_replicate: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicatorDetail {
    pub replicator_arn: Option<String>,
    pub replicator_name: Option<String>,
    pub replicator_description: Option<String>,
    pub replicator_state: Option<String>,
    pub current_version: Option<String>,
    pub service_execution_role_arn: Option<String>,
    pub is_replicator_reference: Option<bool>,
    pub creation_time: Option<DateTime<Utc>>,
    /// ARNs of the MSK clusters taking part in replication
    pub kafka_clusters: Vec<String>,
    pub replication_flows: Vec<ReplicationFlow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorSummary {
    pub connector_arn: Option<String>,
    pub connector_name: Option<String>,
    pub connector_state: Option<String>,
    pub current_version: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorDetail {
    pub connector_arn: Option<String>,
    pub connector_name: Option<String>,
    pub connector_description: Option<String>,
    pub connector_state: Option<String>,
    pub current_version: Option<String>,
    pub kafka_connect_version: Option<String>,
    pub service_execution_role_arn: Option<String>,
    pub bootstrap_servers: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub connector_configuration: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetDetail {
    pub subnet_id: String,
    pub vpc_id: Option<String>,
    pub availability_zone: Option<String>,
    pub availability_zone_id: Option<String>,
    pub cidr_block: Option<String>,
}

/// Broker metadata reported over the Kafka admin protocol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaClusterMetadata {
    pub cluster_id: Option<String>,
    pub controller_id: Option<i32>,
    pub broker_count: usize,
}

/// One flattened ACL entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub principal: String,
    pub host: String,
    pub operation: String,
    pub permission_type: String,
    pub resource_type: String,
    pub resource_name: String,
    pub resource_pattern_type: String,
}
