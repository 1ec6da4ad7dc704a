use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collectors::{
    AclEntry, BootstrapBrokers, BrokerNode, ClientBrokerEncryption, ClientVpcConnection, ClusterDescriptor,
    ClusterOperation, ClusterPolicy, CompatibleKafkaVersion, ConfigurationRevision, ConfigurationSummary,
    ConnectorDetail, DeploymentMode, KafkaVersion, ReplicatorDetail, SubnetDetail, VpcConnection,
};

/// A benign failure that was absorbed during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub step: String,
    pub message: String,
}

/// Point-in-time snapshot of one cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterInformation {
    pub cluster_arn: String,
    pub cluster_name: String,
    pub region: String,
    pub scan_timestamp: DateTime<Utc>,
    pub cluster: ClusterDescriptor,
    pub bootstrap_brokers: BootstrapBrokers,
    pub client_vpc_connections: Vec<ClientVpcConnection>,
    pub cluster_operations: Vec<ClusterOperation>,
    pub nodes: Vec<BrokerNode>,
    /// Secret ARNs only
    pub scram_secrets: Vec<String>,
    pub policy: ClusterPolicy,
    pub compatible_versions: Vec<CompatibleKafkaVersion>,
    /// Provisioned clusters only
    pub network_topology: Option<NetworkTopology>,
    /// Present only when the Kafka-level phase ran and succeeded
    pub kafka: Option<KafkaLevelInfo>,
    pub warnings: Vec<ScanWarning>,
}

/// Data read over the Kafka admin protocol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaLevelInfo {
    pub cluster_id: Option<String>,
    pub controller_id: Option<i32>,
    pub broker_count: usize,
    pub topics: Vec<String>,
    pub acls: Vec<AclEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTopology {
    pub vpc_id: Option<String>,
    pub subnets: Vec<SubnetDetail>,
    pub brokers: Vec<BrokerNetworkRow>,
}

/// Where a single broker sits in the VPC
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerNetworkRow {
    pub broker_id: Option<i32>,
    pub subnet_id: Option<String>,
    pub availability_zone: Option<String>,
    pub cidr_block: Option<String>,
    pub private_ip: Option<String>,
}

/// One row of the region cluster listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_name: String,
    pub cluster_arn: String,
    pub state: Option<String>,
    pub deployment_mode: DeploymentMode,
    pub authentication: String,
    pub public_access: bool,
    pub client_broker_encryption: ClientBrokerEncryption,
}

impl From<&ClusterDescriptor> for ClusterSummary {
    fn from(cluster: &ClusterDescriptor) -> Self {
        Self {
            cluster_name: cluster.cluster_name.clone(),
            cluster_arn: cluster.cluster_arn.clone(),
            state: cluster.state.clone(),
            deployment_mode: cluster.deployment_mode,
            authentication: cluster.authentication_summary(),
            public_access: cluster.public_access_enabled(),
            client_broker_encryption: cluster.client_broker_encryption(),
        }
    }
}

/// A configuration together with the content of its latest revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationWithRevision {
    pub configuration: ConfigurationSummary,
    pub latest_revision: Option<ConfigurationRevision>,
}

/// Point-in-time snapshot of a region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionScanResult {
    pub region: String,
    pub scan_timestamp: DateTime<Utc>,
    pub clusters: Vec<ClusterSummary>,
    pub vpc_connections: Vec<VpcConnection>,
    pub configurations: Vec<ConfigurationWithRevision>,
    pub kafka_versions: Vec<KafkaVersion>,
    pub replicators: Vec<ReplicatorDetail>,
    pub connectors: Vec<ConnectorDetail>,
    pub warnings: Vec<ScanWarning>,
}
