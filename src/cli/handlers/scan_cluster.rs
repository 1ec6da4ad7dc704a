use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use super::{build_cluster_scanner, build_options, scan_context};
use crate::cli::commands::ClusterScanArgs;
use crate::cli::utils::{print_cluster_summary, print_scanner_settings};
use crate::collectors::load_sdk_config;
use crate::scan::cluster_scanner::region_from_arn;
use crate::snapshot::{Snapshot, SnapshotManager, SnapshotMetadata};

pub async fn handle_scan_cluster_command(args: ClusterScanArgs) -> Result<()> {
    let options = build_options(&args.auth, args.skip_kafka, None)?;
    let region = region_from_arn(&args.cluster_arn)?;

    info!("Starting MSK cluster scan of {}", args.cluster_arn);

    let sdk_config = load_sdk_config(&region).await;
    let ctx = scan_context(&options);
    let scanner = build_cluster_scanner(&sdk_config, &region, options.clone(), ctx);
    print_scanner_settings(&scanner);

    let info = scanner
        .scan(&args.cluster_arn)
        .await
        .with_context(|| format!("Cluster scan failed for {}", args.cluster_arn))?;

    print_cluster_summary(&info);

    let manager = SnapshotManager::new().with_compression(args.compress);
    let path = match args.output {
        Some(path) => path,
        None => manager.path_for(std::path::Path::new("."), &info.cluster_name),
    };

    let mut metadata = SnapshotMetadata::new(env!("CARGO_PKG_VERSION").to_string());
    metadata.auth_type = Some(options.credentials.auth_type().to_string());
    metadata.kafka_level_skipped = options.skip_kafka_level;
    metadata.tags.insert("region".to_string(), region);

    manager.save(&Snapshot::cluster(metadata, info), &path)?;
    println!("\n{} {}", "✓ Snapshot written to".green(), path.display());

    Ok(())
}
