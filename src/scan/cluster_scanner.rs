use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::brokers::resolve_broker_addresses;
use super::classify::{absorb, Absorb};
use super::config::ScanOptions;
use super::context::ScanContext;
use super::network::build_topology;
use super::paging::collect_pages;
use super::types::{ClusterInformation, KafkaLevelInfo, NetworkTopology, ScanWarning};
use super::ScanError;
use crate::collectors::{
    AdminConnection, AdminConnectionFactory, BootstrapBrokers, BrokerNode, ClusterDescriptor, ControlPlane,
    DeploymentMode, SubnetDescriber,
};

/// Protocol version hint used when the cluster does not declare one
pub const DEFAULT_KAFKA_VERSION: &str = "2.8.1";

/// Progress of a single cluster scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Init,
    AwsResources,
    KafkaLevel,
    Skipped,
    Done,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::AwsResources => write!(f, "aws-resources"),
            Self::KafkaLevel => write!(f, "kafka-level"),
            Self::Skipped => write!(f, "skipped"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Extracts the region from `arn:aws:kafka:<region>:<account>:cluster/<name>/<uuid>`
pub fn region_from_arn(cluster_arn: &str) -> Result<String, ScanError> {
    let parts: Vec<&str> = cluster_arn.splitn(6, ':').collect();
    match parts.as_slice() {
        ["arn", _partition, "kafka", region, _account, resource]
            if !region.is_empty() && resource.starts_with("cluster/") =>
        {
            Ok(region.to_string())
        }
        _ => Err(ScanError::InvalidClusterArn(cluster_arn.to_string())),
    }
}

/// Normalises a declared broker version such as `3.7.x.kraft` to `3.7.0`
pub fn normalize_version(declared: &str) -> Option<String> {
    let mut numbers = Vec::with_capacity(3);
    for part in declared.split('.').take(3) {
        match part.parse::<u32>() {
            Ok(n) => numbers.push(n),
            Err(_) => break,
        }
    }

    if numbers.is_empty() {
        return None;
    }
    numbers.resize(3, 0);
    Some(format!("{}.{}.{}", numbers[0], numbers[1], numbers[2]))
}

pub fn version_hint(cluster: &ClusterDescriptor) -> String {
    match cluster.deployment_mode {
        DeploymentMode::Provisioned => cluster
            .provisioned
            .as_ref()
            .and_then(|p| p.kafka_version.as_deref())
            .and_then(normalize_version)
            .unwrap_or_else(|| DEFAULT_KAFKA_VERSION.to_string()),
        _ => DEFAULT_KAFKA_VERSION.to_string(),
    }
}

/// Scans a single cluster over its control plane and, optionally, the Kafka protocol
pub struct ClusterScanner {
    control_plane: Arc<dyn ControlPlane>,
    subnets: Arc<dyn SubnetDescriber>,
    admin: Arc<dyn AdminConnectionFactory>,
    options: ScanOptions,
    ctx: ScanContext,
}

impl ClusterScanner {
    pub fn new(
        control_plane: Arc<dyn ControlPlane>,
        subnets: Arc<dyn SubnetDescriber>,
        admin: Arc<dyn AdminConnectionFactory>,
        options: ScanOptions,
    ) -> Self {
        let ctx = ScanContext::new(Duration::from_secs(options.call_timeout_secs));
        Self {
            control_plane,
            subnets,
            admin,
            options,
            ctx,
        }
    }

    pub fn with_context(mut self, ctx: ScanContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    fn enter(&self, cluster_arn: &str, phase: &mut ScanPhase, next: ScanPhase) {
        debug!("{}: {} -> {}", cluster_arn, phase, next);
        *phase = next;
    }

    /// Returns a complete snapshot, or the first fatal error with no snapshot
    pub async fn scan(&self, cluster_arn: &str) -> Result<ClusterInformation, ScanError> {
        let mut phase = ScanPhase::Init;
        let region = region_from_arn(cluster_arn)?;
        let mut warnings = Vec::new();

        info!("Scanning cluster {} in {}", cluster_arn, region);
        self.enter(cluster_arn, &mut phase, ScanPhase::AwsResources);
        let mut info = self.scan_aws_resources(cluster_arn, &region, &mut warnings).await?;

        if self.options.skip_kafka_level {
            self.enter(cluster_arn, &mut phase, ScanPhase::Skipped);
            info!("Skipping Kafka-level scan for {}", info.cluster_name);
        } else {
            self.enter(cluster_arn, &mut phase, ScanPhase::KafkaLevel);
            let kafka = self
                .scan_kafka_level(&info.cluster, &info.bootstrap_brokers, &mut warnings)
                .await?;
            info.kafka = Some(kafka);
        }

        self.enter(cluster_arn, &mut phase, ScanPhase::Done);
        info.warnings = warnings;
        info!(
            "Finished scanning {} ({} warning(s))",
            info.cluster_name,
            info.warnings.len()
        );
        Ok(info)
    }

    async fn scan_aws_resources(
        &self,
        arn: &str,
        region: &str,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<ClusterInformation, ScanError> {
        let cp = &self.control_plane;
        let page_size = self.options.page_size;

        let cluster = absorb(
            self.ctx.call(cp.describe_cluster(arn)).await,
            Absorb::NOTHING,
            "describe cluster",
            "failed to describe cluster",
            warnings,
        )?;
        info!(
            "Cluster {} is {} ({})",
            cluster.cluster_name,
            cluster.deployment_mode,
            cluster.state.as_deref().unwrap_or("unknown state")
        );

        let bootstrap_brokers = absorb(
            self.ctx.call(cp.get_bootstrap_brokers(arn)).await,
            Absorb::NOTHING,
            "bootstrap brokers",
            "failed to get bootstrap brokers",
            warnings,
        )?;

        let client_vpc_connections = absorb(
            collect_pages(&self.ctx, page_size, move |page| cp.list_client_vpc_connections(arn, page)).await,
            Absorb::UNSUPPORTED,
            "client VPC connections",
            "failed to list client VPC connections",
            warnings,
        )?;

        let cluster_operations = absorb(
            collect_pages(&self.ctx, page_size, move |page| cp.list_cluster_operations(arn, page)).await,
            Absorb::NOTHING,
            "cluster operations",
            "failed to list cluster operations",
            warnings,
        )?;

        let nodes = absorb(
            collect_pages(&self.ctx, page_size, move |page| cp.list_nodes(arn, page)).await,
            Absorb::UNSUPPORTED,
            "nodes",
            "failed to list nodes",
            warnings,
        )?;

        let scram_secrets = absorb(
            collect_pages(&self.ctx, page_size, move |page| cp.list_scram_secrets(arn, page)).await,
            Absorb::UNSUPPORTED,
            "SCRAM secrets",
            "failed to list SCRAM secrets",
            warnings,
        )?;

        let policy = absorb(
            self.ctx.call(cp.get_cluster_policy(arn)).await,
            Absorb::NOT_FOUND,
            "cluster policy",
            "failed to get cluster policy",
            warnings,
        )?;

        let compatible_versions = absorb(
            self.ctx.call(cp.get_compatible_kafka_versions(arn)).await,
            Absorb::UNSUPPORTED,
            "compatible versions",
            "failed to get compatible versions",
            warnings,
        )?;

        let network_topology = if cluster.is_provisioned() {
            Some(self.scan_network(&cluster, &nodes, warnings).await?)
        } else {
            None
        };

        debug!(
            "AWS resources for {}: {} node(s), {} operation(s), {} SCRAM secret(s)",
            cluster.cluster_name,
            nodes.len(),
            cluster_operations.len(),
            scram_secrets.len()
        );

        Ok(ClusterInformation {
            cluster_arn: arn.to_string(),
            cluster_name: cluster.cluster_name.clone(),
            region: region.to_string(),
            scan_timestamp: Utc::now(),
            cluster,
            bootstrap_brokers,
            client_vpc_connections,
            cluster_operations,
            nodes,
            scram_secrets,
            policy,
            compatible_versions,
            network_topology,
            kafka: None,
            warnings: Vec::new(),
        })
    }

    async fn scan_network(
        &self,
        cluster: &ClusterDescriptor,
        nodes: &[BrokerNode],
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<NetworkTopology, ScanError> {
        let client_subnets = cluster.client_subnets();
        let Some(first) = client_subnets.first() else {
            warn!("Cluster {} declares no client subnets", cluster.cluster_name);
            return Ok(build_topology(None, Vec::new(), nodes));
        };

        let first_subnet = absorb(
            self.ctx.call(self.subnets.describe_subnets(std::slice::from_ref(first))).await,
            Absorb::NOTHING,
            "vpc",
            "failed to resolve cluster VPC",
            warnings,
        )?;
        let vpc_id = first_subnet.into_iter().find_map(|s| s.vpc_id);

        let subnets = absorb(
            self.ctx.call(self.subnets.describe_subnets(client_subnets)).await,
            Absorb::NOTHING,
            "subnets",
            "failed to describe client subnets",
            warnings,
        )?;

        info!(
            "Cluster {} runs in {} across {} subnet(s)",
            cluster.cluster_name,
            vpc_id.as_deref().unwrap_or("an unknown VPC"),
            subnets.len()
        );
        Ok(build_topology(vpc_id, subnets, nodes))
    }

    async fn scan_kafka_level(
        &self,
        cluster: &ClusterDescriptor,
        bootstrap_brokers: &BootstrapBrokers,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<KafkaLevelInfo, ScanError> {
        let auth_type = self.options.credentials.auth_type();
        let addresses = resolve_broker_addresses(bootstrap_brokers, auth_type)?;
        let hint = version_hint(cluster);

        let connection = self
            .ctx
            .call(
                self.admin
                    .connect(&addresses, cluster.client_broker_encryption(), &hint),
            )
            .await
            .map_err(ScanError::AdminSetup)?;

        let result = self.collect_kafka_level(connection.as_ref(), cluster, warnings).await;

        if let Err(e) = connection.close().await {
            warn!("Failed to close admin connection for {}: {}", cluster.cluster_name, e);
        }

        result
    }

    async fn collect_kafka_level(
        &self,
        connection: &dyn AdminConnection,
        cluster: &ClusterDescriptor,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<KafkaLevelInfo, ScanError> {
        let metadata = absorb(
            self.ctx.call(connection.describe_cluster()).await,
            Absorb::NOTHING,
            "kafka cluster",
            "failed to describe Kafka cluster",
            warnings,
        )?;

        let topics = absorb(
            self.ctx.call(connection.list_topics()).await,
            Absorb::NOTHING,
            "topics",
            "failed to list topics",
            warnings,
        )?;

        let acls = if cluster.is_provisioned() {
            absorb(
                self.ctx.call(connection.describe_acls()).await,
                Absorb::UNSUPPORTED,
                "ACLs",
                "failed to describe ACLs",
                warnings,
            )?
        } else {
            Vec::new()
        };

        info!(
            "Kafka cluster {}: {} broker(s), {} topic(s), {} ACL(s)",
            metadata.cluster_id.as_deref().unwrap_or("<unknown>"),
            metadata.broker_count,
            topics.len(),
            acls.len()
        );

        Ok(KafkaLevelInfo {
            cluster_id: metadata.cluster_id,
            controller_id: metadata.controller_id,
            broker_count: metadata.broker_count,
            topics,
            acls,
        })
    }
}
