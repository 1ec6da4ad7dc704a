use async_trait::async_trait;
use aws_sdk_kafka::types as msk;
use tracing::debug;

use super::sdk::{next_token, sdk_error, Optional, OwnedText, StringMap, Timestamp};
use super::{
    BootstrapBrokers, BrokerNode, ClientAuthentication, ClientVpcConnection, ClusterDescriptor,
    ClusterOperation, ClusterPolicy, CollectorResult, CompatibleKafkaVersion, ConfigurationRevision,
    ConfigurationSummary, ControlPlane, DeploymentMode, EncryptionInTransit, KafkaVersion, Page,
    PageRequest, ProvisionedConfig, ReplicationFlow, ReplicatorDetail, ReplicatorSummary,
    ServerlessConfig, ServerlessVpcConfig, VpcConnection,
};

/// Control plane backed by the Amazon MSK API
#[derive(Debug, Clone)]
pub struct MskControlPlane {
    client: aws_sdk_kafka::Client,
}

impl MskControlPlane {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_kafka::Client::new(sdk_config),
        }
    }
}

fn convert_cluster(cluster: &msk::Cluster) -> ClusterDescriptor {
    let deployment_mode = cluster
        .cluster_type()
        .owned_text()
        .map(|t| DeploymentMode::from_cluster_type(&t))
        .unwrap_or_default();

    ClusterDescriptor {
        cluster_arn: cluster.cluster_arn().owned_text().unwrap_or_default(),
        cluster_name: cluster.cluster_name().owned_text().unwrap_or_default(),
        state: cluster.state().owned_text(),
        current_version: cluster.current_version().owned_text(),
        creation_time: cluster.creation_time().timestamp(),
        deployment_mode,
        tags: cluster.tags().to_sorted(),
        provisioned: cluster.provisioned().map(convert_provisioned),
        serverless: cluster.serverless().map(convert_serverless),
    }
}

fn convert_provisioned(p: &msk::Provisioned) -> ProvisionedConfig {
    let node_group = p.broker_node_group_info();
    let software = p.current_broker_software_info();
    let encryption = p.encryption_info();
    let in_transit = encryption.and_then(|e| e.encryption_in_transit());

    ProvisionedConfig {
        kafka_version: software.and_then(|s| s.kafka_version().owned_text()),
        configuration_arn: software.and_then(|s| s.configuration_arn().owned_text()),
        configuration_revision: software.and_then(|s| s.configuration_revision().optional()),
        number_of_broker_nodes: p.number_of_broker_nodes().optional(),
        instance_type: node_group.and_then(|g| g.instance_type().owned_text()),
        client_subnets: node_group.map(|g| g.client_subnets().to_vec()).unwrap_or_default(),
        security_groups: node_group.map(|g| g.security_groups().to_vec()).unwrap_or_default(),
        public_access: node_group
            .and_then(|g| g.connectivity_info())
            .and_then(|c| c.public_access())
            .and_then(|a| a.r#type().owned_text()),
        storage_mode: p.storage_mode().owned_text(),
        enhanced_monitoring: p.enhanced_monitoring().owned_text(),
        client_authentication: p
            .client_authentication()
            .map(convert_client_authentication)
            .unwrap_or_default(),
        encryption_in_transit: EncryptionInTransit {
            client_broker: in_transit
                .and_then(|t| t.client_broker().owned_text())
                .and_then(|t| t.parse().ok()),
            in_cluster: in_transit.and_then(|t| t.in_cluster().optional()),
        },
        encryption_at_rest_kms_key: encryption
            .and_then(|e| e.encryption_at_rest())
            .and_then(|r| r.data_volume_kms_key_id().owned_text()),
        zookeeper_connect_string: p.zookeeper_connect_string().owned_text(),
    }
}

fn convert_client_authentication(auth: &msk::ClientAuthentication) -> ClientAuthentication {
    let sasl = auth.sasl();
    ClientAuthentication {
        sasl_scram: sasl
            .and_then(|s| s.scram())
            .and_then(|s| s.enabled().optional())
            .unwrap_or(false),
        sasl_iam: sasl
            .and_then(|s| s.iam())
            .and_then(|i| i.enabled().optional())
            .unwrap_or(false),
        tls: auth.tls().and_then(|t| t.enabled().optional()).unwrap_or(false),
        unauthenticated: auth
            .unauthenticated()
            .and_then(|u| u.enabled().optional())
            .unwrap_or(false),
        tls_certificate_authorities: auth
            .tls()
            .map(|t| t.certificate_authority_arn_list().to_vec())
            .unwrap_or_default(),
    }
}

fn convert_serverless(s: &msk::Serverless) -> ServerlessConfig {
    ServerlessConfig {
        vpc_configs: s
            .vpc_configs()
            .iter()
            .map(|v| ServerlessVpcConfig {
                subnet_ids: v.subnet_ids().to_vec(),
                security_group_ids: v.security_group_ids().to_vec(),
            })
            .collect(),
        sasl_iam: s
            .client_authentication()
            .and_then(|a| a.sasl())
            .and_then(|s| s.iam())
            .and_then(|i| i.enabled().optional())
            .unwrap_or(false),
    }
}

fn convert_node(node: &msk::NodeInfo) -> BrokerNode {
    let broker = node.broker_node_info();
    BrokerNode {
        broker_id: broker
            .and_then(|b| b.broker_id().optional())
            .map(|id| id as i32),
        node_arn: node.node_arn().owned_text(),
        instance_type: node.instance_type().owned_text(),
        client_subnet: broker.and_then(|b| b.client_subnet().owned_text()),
        client_vpc_ip_address: broker.and_then(|b| b.client_vpc_ip_address().owned_text()),
        attached_eni_id: broker.and_then(|b| b.attached_eni_id().owned_text()),
        endpoints: broker.map(|b| b.endpoints().to_vec()).unwrap_or_default(),
        kafka_version: broker
            .and_then(|b| b.current_broker_software_info())
            .and_then(|s| s.kafka_version().owned_text()),
    }
}

fn convert_replicator_detail(
    output: &aws_sdk_kafka::operation::describe_replicator::DescribeReplicatorOutput,
) -> ReplicatorDetail {
    ReplicatorDetail {
        replicator_arn: output.replicator_arn().owned_text(),
        replicator_name: output.replicator_name().owned_text(),
        replicator_description: output.replicator_description().owned_text(),
        replicator_state: output.replicator_state().owned_text(),
        current_version: output.current_version().owned_text(),
        service_execution_role_arn: output.service_execution_role_arn().owned_text(),
        is_replicator_reference: output.is_replicator_reference().optional(),
        creation_time: output.creation_time().timestamp(),
        kafka_clusters: output
            .kafka_clusters()
            .iter()
            .filter_map(|c| c.amazon_msk_cluster())
            .filter_map(|c| c.msk_cluster_arn().owned_text())
            .collect(),
        replication_flows: output
            .replication_info_list()
            .iter()
            .map(|r| ReplicationFlow {
                source_kafka_cluster_alias: r.source_kafka_cluster_alias().owned_text(),
                target_kafka_cluster_alias: r.target_kafka_cluster_alias().owned_text(),
                target_compression_type: r.target_compression_type().owned_text(),
                topics_to_replicate: r
                    .topic_replication()
                    .map(|t| t.topics_to_replicate().to_vec())
                    .unwrap_or_default(),
                topics_to_exclude: r
                    .topic_replication()
                    .map(|t| t.topics_to_exclude().to_vec())
                    .unwrap_or_default(),
                consumer_groups_to_replicate: r
                    .consumer_group_replication()
                    .map(|c| c.consumer_groups_to_replicate().to_vec())
                    .unwrap_or_default(),
            })
            .collect(),
    }
}

#[async_trait]
impl ControlPlane for MskControlPlane {
    async fn describe_cluster(&self, cluster_arn: &str) -> CollectorResult<ClusterDescriptor> {
        debug!("DescribeClusterV2 {}", cluster_arn);
        let output = self
            .client
            .describe_cluster_v2()
            .cluster_arn(cluster_arn)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeClusterV2", e))?;

        let mut cluster = output
            .cluster_info()
            .map(convert_cluster)
            .unwrap_or_default();
        if cluster.cluster_arn.is_empty() {
            cluster.cluster_arn = cluster_arn.to_string();
        }
        Ok(cluster)
    }

    async fn get_bootstrap_brokers(&self, cluster_arn: &str) -> CollectorResult<BootstrapBrokers> {
        debug!("GetBootstrapBrokers {}", cluster_arn);
        let output = self
            .client
            .get_bootstrap_brokers()
            .cluster_arn(cluster_arn)
            .send()
            .await
            .map_err(|e| sdk_error("GetBootstrapBrokers", e))?;

        Ok(BootstrapBrokers {
            plaintext: output.bootstrap_broker_string().owned_text(),
            tls: output.bootstrap_broker_string_tls().owned_text(),
            sasl_scram: output.bootstrap_broker_string_sasl_scram().owned_text(),
            sasl_iam: output.bootstrap_broker_string_sasl_iam().owned_text(),
            public_tls: output.bootstrap_broker_string_public_tls().owned_text(),
            public_sasl_scram: output.bootstrap_broker_string_public_sasl_scram().owned_text(),
            public_sasl_iam: output.bootstrap_broker_string_public_sasl_iam().owned_text(),
            vpc_connectivity_tls: output.bootstrap_broker_string_vpc_connectivity_tls().owned_text(),
            vpc_connectivity_sasl_scram: output
                .bootstrap_broker_string_vpc_connectivity_sasl_scram()
                .owned_text(),
            vpc_connectivity_sasl_iam: output
                .bootstrap_broker_string_vpc_connectivity_sasl_iam()
                .owned_text(),
        })
    }

    async fn list_client_vpc_connections(
        &self,
        cluster_arn: &str,
        page: PageRequest,
    ) -> CollectorResult<Page<ClientVpcConnection>> {
        let output = self
            .client
            .list_client_vpc_connections()
            .cluster_arn(cluster_arn)
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListClientVpcConnections", e))?;

        let items = output
            .client_vpc_connections()
            .iter()
            .map(|c| ClientVpcConnection {
                vpc_connection_arn: c.vpc_connection_arn().owned_text(),
                owner: c.owner().owned_text(),
                authentication: c.authentication().owned_text(),
                state: c.state().owned_text(),
                creation_time: c.creation_time().timestamp(),
            })
            .collect();
        Ok(Page::new(items, next_token(output.next_token())))
    }

    async fn list_cluster_operations(
        &self,
        cluster_arn: &str,
        page: PageRequest,
    ) -> CollectorResult<Page<ClusterOperation>> {
        let output = self
            .client
            .list_cluster_operations_v2()
            .cluster_arn(cluster_arn)
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListClusterOperationsV2", e))?;

        let items = output
            .cluster_operation_info_list()
            .iter()
            .map(|op| ClusterOperation {
                operation_arn: op.operation_arn().owned_text(),
                operation_type: op.operation_type().owned_text(),
                status: op.status().owned_text(),
                start_time: op.start_time().timestamp(),
                end_time: op.end_time().timestamp(),
            })
            .collect();
        Ok(Page::new(items, next_token(output.next_token())))
    }

    async fn list_nodes(&self, cluster_arn: &str, page: PageRequest) -> CollectorResult<Page<BrokerNode>> {
        let output = self
            .client
            .list_nodes()
            .cluster_arn(cluster_arn)
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListNodes", e))?;

        let items = output.node_info_list().iter().map(convert_node).collect();
        Ok(Page::new(items, next_token(output.next_token())))
    }

    async fn list_scram_secrets(&self, cluster_arn: &str, page: PageRequest) -> CollectorResult<Page<String>> {
        let output = self
            .client
            .list_scram_secrets()
            .cluster_arn(cluster_arn)
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListScramSecrets", e))?;

        Ok(Page::new(
            output.secret_arn_list().to_vec(),
            next_token(output.next_token()),
        ))
    }

    async fn get_cluster_policy(&self, cluster_arn: &str) -> CollectorResult<ClusterPolicy> {
        let output = self
            .client
            .get_cluster_policy()
            .cluster_arn(cluster_arn)
            .send()
            .await
            .map_err(|e| sdk_error("GetClusterPolicy", e))?;

        Ok(ClusterPolicy {
            current_version: output.current_version().owned_text(),
            policy: output.policy().owned_text(),
        })
    }

    async fn get_compatible_kafka_versions(
        &self,
        cluster_arn: &str,
    ) -> CollectorResult<Vec<CompatibleKafkaVersion>> {
        let output = self
            .client
            .get_compatible_kafka_versions()
            .cluster_arn(cluster_arn)
            .send()
            .await
            .map_err(|e| sdk_error("GetCompatibleKafkaVersions", e))?;

        Ok(output
            .compatible_kafka_versions()
            .iter()
            .map(|v| CompatibleKafkaVersion {
                source_version: v.source_version().owned_text(),
                target_versions: v.target_versions().to_vec(),
            })
            .collect())
    }

    async fn list_clusters(&self, page: PageRequest) -> CollectorResult<Page<ClusterDescriptor>> {
        let output = self
            .client
            .list_clusters_v2()
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListClustersV2", e))?;

        let items = output.cluster_info_list().iter().map(convert_cluster).collect();
        Ok(Page::new(items, next_token(output.next_token())))
    }

    async fn list_vpc_connections(&self, page: PageRequest) -> CollectorResult<Page<VpcConnection>> {
        let output = self
            .client
            .list_vpc_connections()
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListVpcConnections", e))?;

        let items = output
            .vpc_connections()
            .iter()
            .map(|c| VpcConnection {
                vpc_connection_arn: c.vpc_connection_arn().owned_text(),
                target_cluster_arn: c.target_cluster_arn().owned_text(),
                vpc_id: c.vpc_id().owned_text(),
                authentication: c.authentication().owned_text(),
                state: c.state().owned_text(),
                creation_time: c.creation_time().timestamp(),
            })
            .collect();
        Ok(Page::new(items, next_token(output.next_token())))
    }

    async fn list_configurations(&self, page: PageRequest) -> CollectorResult<Page<ConfigurationSummary>> {
        let output = self
            .client
            .list_configurations()
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListConfigurations", e))?;

        let items = output
            .configurations()
            .iter()
            .map(|c| ConfigurationSummary {
                arn: c.arn().owned_text(),
                name: c.name().owned_text(),
                description: c.description().owned_text(),
                kafka_versions: c.kafka_versions().to_vec(),
                latest_revision: c.latest_revision().and_then(|r| r.revision().optional()),
                state: c.state().owned_text(),
                creation_time: c.creation_time().timestamp(),
            })
            .collect();
        Ok(Page::new(items, next_token(output.next_token())))
    }

    async fn describe_configuration_revision(
        &self,
        configuration_arn: &str,
        revision: i64,
    ) -> CollectorResult<ConfigurationRevision> {
        let output = self
            .client
            .describe_configuration_revision()
            .arn(configuration_arn)
            .revision(revision)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeConfigurationRevision", e))?;

        Ok(ConfigurationRevision {
            revision: output.revision().optional(),
            description: output.description().owned_text(),
            creation_time: output.creation_time().timestamp(),
            server_properties: output
                .server_properties()
                .map(|blob| String::from_utf8_lossy(blob.as_ref()).into_owned())
                .unwrap_or_default(),
        })
    }

    async fn list_kafka_versions(&self, page: PageRequest) -> CollectorResult<Page<KafkaVersion>> {
        let output = self
            .client
            .list_kafka_versions()
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListKafkaVersions", e))?;

        let items = output
            .kafka_versions()
            .iter()
            .map(|v| KafkaVersion {
                version: v.version().owned_text(),
                status: v.status().owned_text(),
            })
            .collect();
        Ok(Page::new(items, next_token(output.next_token())))
    }

    async fn list_replicators(&self, page: PageRequest) -> CollectorResult<Page<ReplicatorSummary>> {
        let output = self
            .client
            .list_replicators()
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListReplicators", e))?;

        let items = output
            .replicators()
            .iter()
            .map(|r| ReplicatorSummary {
                replicator_arn: r.replicator_arn().owned_text(),
                replicator_name: r.replicator_name().owned_text(),
                replicator_state: r.replicator_state().owned_text(),
                current_version: r.current_version().owned_text(),
                is_replicator_reference: r.is_replicator_reference().optional(),
                creation_time: r.creation_time().timestamp(),
            })
            .collect();
        Ok(Page::new(items, next_token(output.next_token())))
    }

    async fn describe_replicator(&self, replicator_arn: &str) -> CollectorResult<ReplicatorDetail> {
        let output = self
            .client
            .describe_replicator()
            .replicator_arn(replicator_arn)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeReplicator", e))?;

        Ok(convert_replicator_detail(&output))
    }
}
