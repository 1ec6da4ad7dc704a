use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::classify::{absorb, Absorb};
use super::cluster_scanner::ClusterScanner;
use super::config::ScanOptions;
use super::context::ScanContext;
use super::paging::collect_pages;
use super::types::{ClusterInformation, ClusterSummary, ConfigurationWithRevision, RegionScanResult, ScanWarning};
use super::ScanError;
use crate::collectors::{
    ConfigurationSummary, ConnectorDetail, ConnectorManager, ConnectorSummary, ControlPlane, ReplicatorDetail,
    ReplicatorSummary,
};

const REDACTED: &str = "<redacted>";

/// Result of one cluster scan within a region fan-out
#[derive(Debug)]
pub struct ClusterScanOutcome {
    pub cluster_arn: String,
    pub result: Result<ClusterInformation, ScanError>,
}

/// Whether a connector configuration key is likely to hold a secret
fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    if key.contains("password") || key.contains("secret") || key.contains("sasl.jaas.config") {
        return true;
    }
    key.rsplit(|c: char| c == '.' || c == '_' || c == '-').next() == Some("key")
}

/// ARNs of `summaries`; entries without one are reported instead of dropped silently
fn summary_arns<'a, T>(
    summaries: &'a [T],
    arn: impl Fn(&'a T) -> Option<&'a str>,
    step: &str,
    warnings: &mut Vec<ScanWarning>,
) -> Vec<&'a str> {
    let arns: Vec<&str> = summaries.iter().filter_map(arn).collect();
    let skipped = summaries.len() - arns.len();
    if skipped > 0 {
        let message = format!("{} of {} summaries had no ARN and were not described", skipped, summaries.len());
        warn!("{}: {}", step, message);
        warnings.push(ScanWarning {
            step: step.to_string(),
            message,
        });
    }
    arns
}

fn redact_configuration(configuration: &mut BTreeMap<String, String>) {
    for (key, value) in configuration.iter_mut() {
        if is_sensitive_key(key) {
            *value = REDACTED.to_string();
        }
    }
}

/// Scans the region-wide resources of one region
pub struct RegionScanner {
    region: String,
    control_plane: Arc<dyn ControlPlane>,
    connectors: Arc<dyn ConnectorManager>,
    options: ScanOptions,
    ctx: ScanContext,
}

impl RegionScanner {
    pub fn new(
        region: impl Into<String>,
        control_plane: Arc<dyn ControlPlane>,
        connectors: Arc<dyn ConnectorManager>,
        options: ScanOptions,
    ) -> Self {
        let ctx = ScanContext::new(Duration::from_secs(options.call_timeout_secs));
        Self {
            region: region.into(),
            control_plane,
            connectors,
            options,
            ctx,
        }
    }

    pub fn with_context(mut self, ctx: ScanContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Any failed step aborts the region scan
    pub async fn scan(&self) -> Result<RegionScanResult, ScanError> {
        let cp = &self.control_plane;
        let page_size = self.options.page_size;
        let mut warnings = Vec::new();

        info!("Scanning region {}", self.region);

        let clusters: Vec<ClusterSummary> = absorb(
            collect_pages(&self.ctx, page_size, move |page| cp.list_clusters(page)).await,
            Absorb::NOTHING,
            "clusters",
            "failed to list clusters",
            &mut warnings,
        )?
        .iter()
        .map(ClusterSummary::from)
        .collect();
        info!("Found {} cluster(s) in {}", clusters.len(), self.region);

        let vpc_connections = absorb(
            collect_pages(&self.ctx, page_size, move |page| cp.list_vpc_connections(page)).await,
            Absorb::UNSUPPORTED,
            "VPC connections",
            "failed to list VPC connections",
            &mut warnings,
        )?;

        let configurations = self.scan_configurations(&mut warnings).await?;

        let kafka_versions = absorb(
            collect_pages(&self.ctx, page_size, move |page| cp.list_kafka_versions(page)).await,
            Absorb::NOTHING,
            "kafka versions",
            "failed to list Kafka versions",
            &mut warnings,
        )?;

        let replicators = self.scan_replicators(&mut warnings).await?;
        let connectors = self.scan_connectors(&mut warnings).await?;

        info!(
            "Region {}: {} VPC connection(s), {} configuration(s), {} replicator(s), {} connector(s)",
            self.region,
            vpc_connections.len(),
            configurations.len(),
            replicators.len(),
            connectors.len()
        );

        Ok(RegionScanResult {
            region: self.region.clone(),
            scan_timestamp: Utc::now(),
            clusters,
            vpc_connections,
            configurations,
            kafka_versions,
            replicators,
            connectors,
            warnings,
        })
    }

    async fn scan_configurations(
        &self,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<Vec<ConfigurationWithRevision>, ScanError> {
        let cp = &self.control_plane;
        let summaries: Vec<ConfigurationSummary> = absorb(
            collect_pages(&self.ctx, self.options.page_size, move |page| cp.list_configurations(page)).await,
            Absorb::NOTHING,
            "configurations",
            "failed to list configurations",
            warnings,
        )?;

        let mut configurations = Vec::with_capacity(summaries.len());
        for configuration in summaries {
            let latest_revision = match (configuration.arn.as_deref(), configuration.latest_revision) {
                (Some(arn), Some(revision)) => {
                    debug!("Describing configuration {} revision {}", arn, revision);
                    absorb(
                        self.ctx.call(cp.describe_configuration_revision(arn, revision)).await.map(Some),
                        Absorb::NOTHING,
                        "configuration revision",
                        &format!("failed to describe configuration {}", arn),
                        warnings,
                    )?
                }
                _ => None,
            };
            configurations.push(ConfigurationWithRevision {
                configuration,
                latest_revision,
            });
        }
        Ok(configurations)
    }

    async fn scan_replicators(&self, warnings: &mut Vec<ScanWarning>) -> Result<Vec<ReplicatorDetail>, ScanError> {
        let cp = &self.control_plane;
        let summaries: Vec<ReplicatorSummary> = absorb(
            collect_pages(&self.ctx, self.options.page_size, move |page| cp.list_replicators(page)).await,
            Absorb::NOTHING,
            "replicators",
            "failed to list replicators",
            warnings,
        )?;

        let mut replicators = Vec::with_capacity(summaries.len());
        for arn in summary_arns(&summaries, |s| s.replicator_arn.as_deref(), "replicator", warnings) {
            debug!("Describing replicator {}", arn);
            replicators.push(absorb(
                self.ctx.call(cp.describe_replicator(arn)).await,
                Absorb::NOTHING,
                "replicator",
                &format!("failed to describe replicator {}", arn),
                warnings,
            )?);
        }
        Ok(replicators)
    }

    async fn scan_connectors(&self, warnings: &mut Vec<ScanWarning>) -> Result<Vec<ConnectorDetail>, ScanError> {
        let manager = &self.connectors;
        let summaries: Vec<ConnectorSummary> = absorb(
            collect_pages(&self.ctx, self.options.page_size, move |page| manager.list_connectors(page)).await,
            Absorb::NOTHING,
            "connectors",
            "failed to list connectors",
            warnings,
        )?;

        let mut connectors = Vec::with_capacity(summaries.len());
        for arn in summary_arns(&summaries, |s| s.connector_arn.as_deref(), "connector", warnings) {
            debug!("Describing connector {}", arn);
            let mut detail = absorb(
                self.ctx.call(manager.describe_connector(arn)).await,
                Absorb::NOTHING,
                "connector",
                &format!("failed to describe connector {}", arn),
                warnings,
            )?;
            if self.options.redact_sensitive {
                redact_configuration(&mut detail.connector_configuration);
            }
            connectors.push(detail);
        }
        Ok(connectors)
    }

    /// Scans each cluster with at most `max_concurrent_clusters` in flight.
    ///
    /// Outcomes are returned in input order; a failure affects only its own cluster.
    pub async fn scan_clusters(&self, scanner: &ClusterScanner, cluster_arns: &[String]) -> Vec<ClusterScanOutcome> {
        let limit = self.options.max_concurrent_clusters.max(1);
        info!(
            "Scanning {} cluster(s) in {} with concurrency {}",
            cluster_arns.len(),
            self.region,
            limit
        );

        stream::iter(cluster_arns.iter().cloned())
            .map(move |cluster_arn| async move {
                let result = scanner.scan(&cluster_arn).await;
                if let Err(e) = &result {
                    error!("Cluster scan failed for {}: {}", cluster_arn, e);
                }
                ClusterScanOutcome { cluster_arn, result }
            })
            .buffered(limit)
            .collect()
            .await
    }
}
