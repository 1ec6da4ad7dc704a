use async_trait::async_trait;
use tracing::debug;

use super::sdk::{sdk_error, OwnedText};
use super::{CollectorResult, SubnetDescriber, SubnetDetail};

/// Subnet lookups backed by the EC2 API
#[derive(Debug, Clone)]
pub struct Ec2SubnetDescriber {
    client: aws_sdk_ec2::Client,
}

impl Ec2SubnetDescriber {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SubnetDescriber for Ec2SubnetDescriber {
    async fn describe_subnets(&self, subnet_ids: &[String]) -> CollectorResult<Vec<SubnetDetail>> {
        if subnet_ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!("DescribeSubnets {:?}", subnet_ids);
        let output = self
            .client
            .describe_subnets()
            .set_subnet_ids(Some(subnet_ids.to_vec()))
            .send()
            .await
            .map_err(|e| sdk_error("DescribeSubnets", e))?;

        Ok(output
            .subnets()
            .iter()
            .map(|s| SubnetDetail {
                subnet_id: s.subnet_id().owned_text().unwrap_or_default(),
                vpc_id: s.vpc_id().owned_text(),
                availability_zone: s.availability_zone().owned_text(),
                availability_zone_id: s.availability_zone_id().owned_text(),
                cidr_block: s.cidr_block().owned_text(),
            })
            .collect())
    }
}
