use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::scan::cluster_scanner::ClusterScanner;
use crate::scan::{ClusterInformation, RegionScanResult, ScanWarning};

pub fn init_logging(verbose: bool, log_format: &str) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = if log_format == "json" {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .expect("Failed to initialize tracing subscriber");
}

pub fn print_info() {
    println!("MSKPilot v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("Authors: {}", env!("CARGO_PKG_AUTHORS"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
    println!();
    println!("For more information, visit: {}", env!("CARGO_PKG_REPOSITORY"));
}

fn print_warnings(warnings: &[ScanWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n{}", "⚠ Warnings".bright_yellow().bold());
    for warning in warnings {
        println!("  • {}: {}", warning.step.yellow(), warning.message);
    }
}

pub fn print_cluster_summary(info: &ClusterInformation) {
    println!("\n{}", format!("📊 Cluster {}", info.cluster_name).bright_white().bold());
    println!("  ARN:            {}", info.cluster_arn);
    println!("  Region:         {}", info.region);
    println!("  Mode:           {}", info.cluster.deployment_mode);
    println!("  Authentication: {}", info.cluster.authentication_summary());
    println!("  Encryption:     {}", info.cluster.client_broker_encryption());
    println!("  Broker nodes:   {}", info.nodes.len());
    println!("  SCRAM secrets:  {}", info.scram_secrets.len());

    if let Some(topology) = &info.network_topology {
        println!(
            "  VPC:            {} ({} subnet(s))",
            topology.vpc_id.as_deref().unwrap_or("unknown"),
            topology.subnets.len()
        );
    }

    match &info.kafka {
        Some(kafka) => {
            println!(
                "  Kafka:          {} broker(s), {} topic(s), {} ACL(s)",
                kafka.broker_count,
                kafka.topics.len(),
                kafka.acls.len()
            );
        }
        None => println!("  Kafka:          {}", "not scanned".dimmed()),
    }

    print_warnings(&info.warnings);
}

pub fn print_region_summary(result: &RegionScanResult) {
    println!("\n{}", format!("🌍 Region {}", result.region).bright_white().bold());
    println!("  Clusters:         {}", result.clusters.len());
    for cluster in &result.clusters {
        let public = if cluster.public_access { "public".red() } else { "private".green() };
        println!(
            "    • {} [{}] {} | {} | {}",
            cluster.cluster_name.bright_white(),
            cluster.deployment_mode,
            cluster.authentication,
            cluster.client_broker_encryption,
            public
        );
    }
    println!("  VPC connections:  {}", result.vpc_connections.len());
    println!("  Configurations:   {}", result.configurations.len());
    println!("  Kafka versions:   {}", result.kafka_versions.len());
    println!("  Replicators:      {}", result.replicators.len());
    println!("  Connectors:       {}", result.connectors.len());

    print_warnings(&result.warnings);
}

pub fn print_scanner_settings(scanner: &ClusterScanner) {
    let options = scanner.options();
    println!(
        "{} auth={} skip_kafka={} page_size={} timeout={}s",
        "Settings:".dimmed(),
        options.credentials.auth_type(),
        options.skip_kafka_level,
        options.page_size,
        options.call_timeout_secs
    );
}
