use async_trait::async_trait;
use tracing::debug;

use super::sdk::{next_token, sdk_error, OwnedText, StringMap, Timestamp};
use super::{CollectorResult, ConnectorDetail, ConnectorManager, ConnectorSummary, Page, PageRequest};

/// Connector lookups backed by the MSK Connect API
#[derive(Debug, Clone)]
pub struct MskConnectManager {
    client: aws_sdk_kafkaconnect::Client,
}

impl MskConnectManager {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_kafkaconnect::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ConnectorManager for MskConnectManager {
    async fn list_connectors(&self, page: PageRequest) -> CollectorResult<Page<ConnectorSummary>> {
        let output = self
            .client
            .list_connectors()
            .max_results(page.max_results)
            .set_next_token(page.next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListConnectors", e))?;

        let items = output
            .connectors()
            .iter()
            .map(|c| ConnectorSummary {
                connector_arn: c.connector_arn().owned_text(),
                connector_name: c.connector_name().owned_text(),
                connector_state: c.connector_state().owned_text(),
                current_version: c.current_version().owned_text(),
                creation_time: c.creation_time().timestamp(),
            })
            .collect();
        Ok(Page::new(items, next_token(output.next_token())))
    }

    async fn describe_connector(&self, connector_arn: &str) -> CollectorResult<ConnectorDetail> {
        debug!("DescribeConnector {}", connector_arn);
        let output = self
            .client
            .describe_connector()
            .connector_arn(connector_arn)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeConnector", e))?;

        Ok(ConnectorDetail {
            connector_arn: output.connector_arn().owned_text(),
            connector_name: output.connector_name().owned_text(),
            connector_description: output.connector_description().owned_text(),
            connector_state: output.connector_state().owned_text(),
            current_version: output.current_version().owned_text(),
            kafka_connect_version: output.kafka_connect_version().owned_text(),
            service_execution_role_arn: output.service_execution_role_arn().owned_text(),
            bootstrap_servers: output
                .kafka_cluster()
                .and_then(|k| k.apache_kafka_cluster())
                .and_then(|a| a.bootstrap_servers().owned_text()),
            creation_time: output.creation_time().timestamp(),
            connector_configuration: output.connector_configuration().to_sorted(),
        })
    }
}
