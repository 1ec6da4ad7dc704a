use std::collections::HashMap;

use super::types::{BrokerNetworkRow, NetworkTopology};
use crate::collectors::{BrokerNode, SubnetDetail};

/// Joins broker nodes with their subnet details.
///
/// Every broker gets a row, in node order. Availability zone and CIDR stay
/// empty when the broker's subnet was not described.
pub fn build_topology(vpc_id: Option<String>, subnets: Vec<SubnetDetail>, nodes: &[BrokerNode]) -> NetworkTopology {
    let by_id: HashMap<&str, &SubnetDetail> = subnets.iter().map(|s| (s.subnet_id.as_str(), s)).collect();

    let brokers = nodes
        .iter()
        .map(|node| {
            let subnet = node.client_subnet.as_deref().and_then(|id| by_id.get(id));
            BrokerNetworkRow {
                broker_id: node.broker_id,
                subnet_id: node.client_subnet.clone(),
                availability_zone: subnet.and_then(|s| s.availability_zone.clone()),
                cidr_block: subnet.and_then(|s| s.cidr_block.clone()),
                private_ip: node.client_vpc_ip_address.clone(),
            }
        })
        .collect();

    NetworkTopology {
        vpc_id,
        subnets,
        brokers,
    }
}
