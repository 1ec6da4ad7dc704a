use anyhow::{bail, Result};
use colored::Colorize;
use std::sync::Arc;
use tracing::{error, info};

use super::{build_cluster_scanner, build_options, scan_context};
use crate::cli::commands::RegionScanArgs;
use crate::cli::utils::{print_cluster_summary, print_region_summary};
use crate::collectors::connect::MskConnectManager;
use crate::collectors::load_sdk_config;
use crate::collectors::msk::MskControlPlane;
use crate::scan::{RegionScanner, ScanContext, ScanOptions};
use crate::snapshot::{Snapshot, SnapshotManager, SnapshotMetadata};

fn metadata(options: &ScanOptions, region: &str) -> SnapshotMetadata {
    let mut metadata = SnapshotMetadata::new(env!("CARGO_PKG_VERSION").to_string());
    metadata.auth_type = Some(options.credentials.auth_type().to_string());
    metadata.kafka_level_skipped = options.skip_kafka_level;
    metadata.redaction_applied = options.redact_sensitive;
    metadata.tags.insert("region".to_string(), region.to_string());
    metadata
}

/// Scans one region; returns the number of failed cluster scans
async fn scan_region(
    region: &str,
    args: &RegionScanArgs,
    options: &ScanOptions,
    ctx: &ScanContext,
    manager: &SnapshotManager,
) -> Result<usize> {
    let sdk_config = load_sdk_config(region).await;
    let scanner = RegionScanner::new(
        region,
        Arc::new(MskControlPlane::new(&sdk_config)),
        Arc::new(MskConnectManager::new(&sdk_config)),
        options.clone(),
    )
    .with_context(ctx.clone());

    let result = scanner.scan().await?;
    print_region_summary(&result);

    let cluster_arns: Vec<String> = result.clusters.iter().map(|c| c.cluster_arn.clone()).collect();
    let path = manager.path_for(&args.output_dir, &format!("region-{}", region));
    manager.save(&Snapshot::region(metadata(options, region), result), &path)?;
    println!("{} {}", "✓ Region snapshot written to".green(), path.display());

    if !args.scan_clusters || cluster_arns.is_empty() {
        return Ok(0);
    }

    let cluster_scanner = build_cluster_scanner(&sdk_config, region, options.clone(), ctx.clone());
    let mut failures = 0;
    for outcome in scanner.scan_clusters(&cluster_scanner, &cluster_arns).await {
        match outcome.result {
            Ok(info) => {
                print_cluster_summary(&info);
                let path = manager.path_for(&args.output_dir.join(region), &info.cluster_name);
                manager.save(&Snapshot::cluster(metadata(options, region), info), &path)?;
                println!("{} {}", "✓ Cluster snapshot written to".green(), path.display());
            }
            Err(e) => {
                failures += 1;
                println!("{} {}: {}", "✗ Cluster scan failed for".red(), outcome.cluster_arn, e);
            }
        }
    }
    Ok(failures)
}

pub async fn handle_scan_region_command(args: RegionScanArgs) -> Result<()> {
    let options = build_options(&args.auth, args.skip_kafka, args.max_concurrency)?;
    let ctx = scan_context(&options);
    let manager = SnapshotManager::new().with_compression(args.compress);

    info!("Starting MSK region scan of {}", args.regions.join(", "));

    let mut failed_regions = Vec::new();
    let mut failed_clusters = 0;
    for region in &args.regions {
        if ctx.ensure_active().is_err() {
            break;
        }
        match scan_region(region, &args, &options, &ctx, &manager).await {
            Ok(failures) => failed_clusters += failures,
            Err(e) => {
                error!("Region scan failed for {}: {:#}", region, e);
                println!("{} {}: {:#}", "✗ Region scan failed for".red(), region, e);
                failed_regions.push(region.clone());
            }
        }
    }

    if ctx.ensure_active().is_err() {
        bail!("Scan cancelled");
    }
    if !failed_regions.is_empty() || failed_clusters > 0 {
        bail!(
            "{} region scan(s) and {} cluster scan(s) failed{}",
            failed_regions.len(),
            failed_clusters,
            if failed_regions.is_empty() {
                String::new()
            } else {
                format!(" ({})", failed_regions.join(", "))
            }
        );
    }

    println!(
        "\n{} {}",
        "✓ Region scan complete, snapshots in".green().bold(),
        args.output_dir.display()
    );
    Ok(())
}
