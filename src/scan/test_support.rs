//! In-memory collaborators for scanner tests

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::collectors::*;

/// Serves `source` in pages of `max_results`, using the offset as cursor
fn paginate<T: Clone>(source: &CollectorResult<Vec<T>>, page: &PageRequest) -> CollectorResult<Page<T>> {
    let items = source.clone()?;
    let start = page
        .next_token
        .as_deref()
        .map(|t| t.parse::<usize>().unwrap())
        .unwrap_or(0);
    let end = (start + page.max_results.max(1) as usize).min(items.len());
    let next_token = if end < items.len() { Some(end.to_string()) } else { None };
    Ok(Page::new(items[start..end].to_vec(), next_token))
}

fn not_found(what: &str) -> CollectorError {
    CollectorError::new(ErrorKind::NotFound, format!("{} not found", what))
}

pub fn serverless_unsupported() -> CollectorError {
    CollectorError::from_message(format!("BadRequestException: {}", SERVERLESS_UNSUPPORTED_PHRASE))
}

pub struct FakeControlPlane {
    pub clusters_by_arn: BTreeMap<String, CollectorResult<ClusterDescriptor>>,
    pub bootstrap_brokers: CollectorResult<BootstrapBrokers>,
    pub client_vpc_connections: CollectorResult<Vec<ClientVpcConnection>>,
    pub cluster_operations: CollectorResult<Vec<ClusterOperation>>,
    pub nodes: CollectorResult<Vec<BrokerNode>>,
    pub scram_secrets: CollectorResult<Vec<String>>,
    pub policy: CollectorResult<ClusterPolicy>,
    pub compatible_versions: CollectorResult<Vec<CompatibleKafkaVersion>>,
    pub clusters: CollectorResult<Vec<ClusterDescriptor>>,
    pub vpc_connections: CollectorResult<Vec<VpcConnection>>,
    pub configurations: CollectorResult<Vec<ConfigurationSummary>>,
    pub revisions: BTreeMap<(String, i64), ConfigurationRevision>,
    pub kafka_versions: CollectorResult<Vec<KafkaVersion>>,
    pub replicators: CollectorResult<Vec<ReplicatorSummary>>,
    pub replicator_details: BTreeMap<String, ReplicatorDetail>,
    /// Names of the operations invoked, in call order
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakeControlPlane {
    fn default() -> Self {
        Self {
            clusters_by_arn: BTreeMap::new(),
            bootstrap_brokers: Ok(BootstrapBrokers::default()),
            client_vpc_connections: Ok(vec![]),
            cluster_operations: Ok(vec![]),
            nodes: Ok(vec![]),
            scram_secrets: Ok(vec![]),
            policy: Ok(ClusterPolicy::default()),
            compatible_versions: Ok(vec![]),
            clusters: Ok(vec![]),
            vpc_connections: Ok(vec![]),
            configurations: Ok(vec![]),
            revisions: BTreeMap::new(),
            kafka_versions: Ok(vec![]),
            replicators: Ok(vec![]),
            replicator_details: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeControlPlane {
    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn with_cluster(mut self, cluster: ClusterDescriptor) -> Self {
        self.clusters_by_arn.insert(cluster.cluster_arn.clone(), Ok(cluster));
        self
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn describe_cluster(&self, cluster_arn: &str) -> CollectorResult<ClusterDescriptor> {
        self.record("describe_cluster");
        self.clusters_by_arn
            .get(cluster_arn)
            .cloned()
            .unwrap_or_else(|| Err(not_found(cluster_arn)))
    }

    async fn get_bootstrap_brokers(&self, _cluster_arn: &str) -> CollectorResult<BootstrapBrokers> {
        self.record("get_bootstrap_brokers");
        self.bootstrap_brokers.clone()
    }

    async fn list_client_vpc_connections(
        &self,
        _cluster_arn: &str,
        page: PageRequest,
    ) -> CollectorResult<Page<ClientVpcConnection>> {
        self.record("list_client_vpc_connections");
        paginate(&self.client_vpc_connections, &page)
    }

    async fn list_cluster_operations(
        &self,
        _cluster_arn: &str,
        page: PageRequest,
    ) -> CollectorResult<Page<ClusterOperation>> {
        self.record("list_cluster_operations");
        paginate(&self.cluster_operations, &page)
    }

    async fn list_nodes(&self, _cluster_arn: &str, page: PageRequest) -> CollectorResult<Page<BrokerNode>> {
        self.record("list_nodes");
        paginate(&self.nodes, &page)
    }

    async fn list_scram_secrets(&self, _cluster_arn: &str, page: PageRequest) -> CollectorResult<Page<String>> {
        self.record("list_scram_secrets");
        paginate(&self.scram_secrets, &page)
    }

    async fn get_cluster_policy(&self, _cluster_arn: &str) -> CollectorResult<ClusterPolicy> {
        self.record("get_cluster_policy");
        self.policy.clone()
    }

    async fn get_compatible_kafka_versions(
        &self,
        _cluster_arn: &str,
    ) -> CollectorResult<Vec<CompatibleKafkaVersion>> {
        self.record("get_compatible_kafka_versions");
        self.compatible_versions.clone()
    }

    async fn list_clusters(&self, page: PageRequest) -> CollectorResult<Page<ClusterDescriptor>> {
        self.record("list_clusters");
        paginate(&self.clusters, &page)
    }

    async fn list_vpc_connections(&self, page: PageRequest) -> CollectorResult<Page<VpcConnection>> {
        self.record("list_vpc_connections");
        paginate(&self.vpc_connections, &page)
    }

    async fn list_configurations(&self, page: PageRequest) -> CollectorResult<Page<ConfigurationSummary>> {
        self.record("list_configurations");
        paginate(&self.configurations, &page)
    }

    async fn describe_configuration_revision(
        &self,
        configuration_arn: &str,
        revision: i64,
    ) -> CollectorResult<ConfigurationRevision> {
        self.record("describe_configuration_revision");
        self.revisions
            .get(&(configuration_arn.to_string(), revision))
            .cloned()
            .ok_or_else(|| not_found(configuration_arn))
    }

    async fn list_kafka_versions(&self, page: PageRequest) -> CollectorResult<Page<KafkaVersion>> {
        self.record("list_kafka_versions");
        paginate(&self.kafka_versions, &page)
    }

    async fn list_replicators(&self, page: PageRequest) -> CollectorResult<Page<ReplicatorSummary>> {
        self.record("list_replicators");
        paginate(&self.replicators, &page)
    }

    async fn describe_replicator(&self, replicator_arn: &str) -> CollectorResult<ReplicatorDetail> {
        self.record("describe_replicator");
        self.replicator_details
            .get(replicator_arn)
            .cloned()
            .ok_or_else(|| not_found(replicator_arn))
    }
}

#[derive(Default)]
pub struct FakeSubnets {
    pub subnets: Vec<SubnetDetail>,
    pub error: Option<CollectorError>,
    /// Subnet ids requested per call
    pub requests: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl SubnetDescriber for FakeSubnets {
    async fn describe_subnets(&self, subnet_ids: &[String]) -> CollectorResult<Vec<SubnetDetail>> {
        self.requests.lock().unwrap().push(subnet_ids.to_vec());
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        Ok(self
            .subnets
            .iter()
            .filter(|s| subnet_ids.contains(&s.subnet_id))
            .cloned()
            .collect())
    }
}

pub struct FakeConnectors {
    pub connectors: CollectorResult<Vec<ConnectorSummary>>,
    pub details: BTreeMap<String, ConnectorDetail>,
}

impl Default for FakeConnectors {
    fn default() -> Self {
        Self {
            connectors: Ok(vec![]),
            details: BTreeMap::new(),
        }
    }
}

#[async_trait]
impl ConnectorManager for FakeConnectors {
    async fn list_connectors(&self, page: PageRequest) -> CollectorResult<Page<ConnectorSummary>> {
        paginate(&self.connectors, &page)
    }

    async fn describe_connector(&self, connector_arn: &str) -> CollectorResult<ConnectorDetail> {
        self.details
            .get(connector_arn)
            .cloned()
            .ok_or_else(|| not_found(connector_arn))
    }
}

/// Arguments of one `connect` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub addresses: Vec<String>,
    pub encryption: ClientBrokerEncryption,
    pub version_hint: String,
}

pub struct FakeAdminFactory {
    pub connect_error: Option<CollectorError>,
    pub metadata: CollectorResult<KafkaClusterMetadata>,
    pub topics: CollectorResult<Vec<String>>,
    pub acls: CollectorResult<Vec<AclEntry>>,
    pub close_error: Option<CollectorError>,
    pub connects: Mutex<Vec<ConnectRequest>>,
    pub closes: Arc<AtomicUsize>,
}

impl Default for FakeAdminFactory {
    fn default() -> Self {
        Self {
            connect_error: None,
            metadata: Ok(KafkaClusterMetadata {
                cluster_id: Some("kafka-cluster-id".to_string()),
                controller_id: Some(1),
                broker_count: 2,
            }),
            topics: Ok(vec!["orders".to_string(), "payments".to_string()]),
            acls: Ok(vec![]),
            close_error: None,
            connects: Mutex::new(Vec::new()),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FakeAdminFactory {
    pub fn connect_count(&self) -> usize {
        self.connects.lock().unwrap().len()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdminConnectionFactory for FakeAdminFactory {
    async fn connect(
        &self,
        addresses: &[String],
        encryption: ClientBrokerEncryption,
        version_hint: &str,
    ) -> CollectorResult<Box<dyn AdminConnection>> {
        self.connects.lock().unwrap().push(ConnectRequest {
            addresses: addresses.to_vec(),
            encryption,
            version_hint: version_hint.to_string(),
        });
        if let Some(err) = &self.connect_error {
            return Err(err.clone());
        }
        Ok(Box::new(FakeAdminConnection {
            metadata: self.metadata.clone(),
            topics: self.topics.clone(),
            acls: self.acls.clone(),
            close_error: self.close_error.clone(),
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct FakeAdminConnection {
    metadata: CollectorResult<KafkaClusterMetadata>,
    topics: CollectorResult<Vec<String>>,
    acls: CollectorResult<Vec<AclEntry>>,
    close_error: Option<CollectorError>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl AdminConnection for FakeAdminConnection {
    async fn describe_cluster(&self) -> CollectorResult<KafkaClusterMetadata> {
        self.metadata.clone()
    }

    async fn list_topics(&self) -> CollectorResult<Vec<String>> {
        self.topics.clone()
    }

    async fn describe_acls(&self) -> CollectorResult<Vec<AclEntry>> {
        self.acls.clone()
    }

    async fn close(self: Box<Self>) -> CollectorResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        match self.close_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub const CLUSTER_ARN: &str =
    "arn:aws:kafka:eu-west-1:123456789012:cluster/orders/2f1e6c1a-7b4d-4c3e-9a55-0d1e2f3a4b5c-2";

pub fn provisioned_iam_cluster() -> ClusterDescriptor {
    ClusterDescriptor {
        cluster_arn: CLUSTER_ARN.to_string(),
        cluster_name: "orders".to_string(),
        state: Some("ACTIVE".to_string()),
        current_version: Some("K3AEGXETSR30VB".to_string()),
        deployment_mode: DeploymentMode::Provisioned,
        provisioned: Some(ProvisionedConfig {
            kafka_version: Some("3.5.1".to_string()),
            number_of_broker_nodes: Some(2),
            instance_type: Some("kafka.m5.large".to_string()),
            client_subnets: vec!["subnet-a".to_string(), "subnet-b".to_string()],
            client_authentication: ClientAuthentication {
                sasl_iam: true,
                ..Default::default()
            },
            encryption_in_transit: EncryptionInTransit {
                client_broker: Some(ClientBrokerEncryption::Tls),
                in_cluster: Some(true),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn serverless_cluster() -> ClusterDescriptor {
    ClusterDescriptor {
        cluster_arn: CLUSTER_ARN.to_string(),
        cluster_name: "orders-serverless".to_string(),
        state: Some("ACTIVE".to_string()),
        deployment_mode: DeploymentMode::Serverless,
        serverless: Some(ServerlessConfig {
            vpc_configs: vec![ServerlessVpcConfig {
                subnet_ids: vec!["subnet-a".to_string()],
                security_group_ids: vec!["sg-1".to_string()],
            }],
            sasl_iam: true,
        }),
        ..Default::default()
    }
}

pub fn broker_nodes() -> Vec<BrokerNode> {
    vec![
        BrokerNode {
            broker_id: Some(1),
            client_subnet: Some("subnet-a".to_string()),
            client_vpc_ip_address: Some("10.0.1.10".to_string()),
            endpoints: vec!["b-1.orders.kafka.eu-west-1.amazonaws.com".to_string()],
            ..Default::default()
        },
        BrokerNode {
            broker_id: Some(2),
            client_subnet: Some("subnet-b".to_string()),
            client_vpc_ip_address: Some("10.0.2.10".to_string()),
            endpoints: vec!["b-2.orders.kafka.eu-west-1.amazonaws.com".to_string()],
            ..Default::default()
        },
    ]
}

pub fn client_subnets() -> Vec<SubnetDetail> {
    vec![
        SubnetDetail {
            subnet_id: "subnet-a".to_string(),
            vpc_id: Some("vpc-0abc".to_string()),
            availability_zone: Some("eu-west-1a".to_string()),
            availability_zone_id: Some("euw1-az1".to_string()),
            cidr_block: Some("10.0.1.0/24".to_string()),
        },
        SubnetDetail {
            subnet_id: "subnet-b".to_string(),
            vpc_id: Some("vpc-0abc".to_string()),
            availability_zone: Some("eu-west-1b".to_string()),
            availability_zone_id: Some("euw1-az2".to_string()),
            cidr_block: Some("10.0.2.0/24".to_string()),
        },
    ]
}
