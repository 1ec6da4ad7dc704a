use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::scan::AuthType;

#[derive(Parser, Debug)]
#[command(
    name = "mskpilot",
    about = "Amazon MSK discovery and migration inventory tool",
    version,
    author
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for logs
    #[arg(long, value_parser = ["text", "json"], default_value = "text", global = true)]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan MSK resources
    Scan {
        #[command(subcommand)]
        target: ScanTarget,
    },

    /// Show information about MSKPilot
    Info,
}

#[derive(Subcommand, Debug)]
pub enum ScanTarget {
    /// Scan a single cluster over the control plane and the Kafka protocol
    Cluster(ClusterScanArgs),

    /// Scan the region-wide resources of one or more regions
    Region(RegionScanArgs),
}

/// Broker authentication flags; unset flags fall back to MSKPILOT_* variables
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Authentication used against the brokers: iam, sasl_scram, tls or unauthenticated
    #[arg(long)]
    pub auth_type: Option<AuthType>,

    /// SASL/SCRAM username
    #[arg(long, env = "MSKPILOT_SASL_USERNAME")]
    pub sasl_username: Option<String>,

    /// SASL/SCRAM password
    #[arg(long, env = "MSKPILOT_SASL_PASSWORD", hide_env_values = true)]
    pub sasl_password: Option<String>,

    /// CA certificate for TLS client authentication
    #[arg(long)]
    pub ca_cert: Option<PathBuf>,

    /// Client certificate for TLS client authentication
    #[arg(long)]
    pub client_cert: Option<PathBuf>,

    /// Client private key for TLS client authentication
    #[arg(long)]
    pub client_key: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ClusterScanArgs {
    /// ARN of the cluster to scan
    #[arg(long)]
    pub cluster_arn: String,

    #[command(flatten)]
    pub auth: AuthArgs,

    /// Skip the Kafka-protocol phase (topics, ACLs, cluster id)
    #[arg(long)]
    pub skip_kafka: bool,

    /// Snapshot file path (default: <cluster-name>.json in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Gzip the snapshot
    #[arg(long)]
    pub compress: bool,
}

#[derive(Args, Debug)]
pub struct RegionScanArgs {
    /// Regions to scan, one after another
    #[arg(long = "region", env = "AWS_REGION", value_delimiter = ',', required = true)]
    pub regions: Vec<String>,

    /// Also scan every cluster found in each region
    #[arg(long)]
    pub scan_clusters: bool,

    #[command(flatten)]
    pub auth: AuthArgs,

    /// Skip the Kafka-protocol phase of cluster scans
    #[arg(long)]
    pub skip_kafka: bool,

    /// Cluster scans allowed in flight per region
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Directory for snapshot files
    #[arg(short, long, default_value = "mskpilot-output")]
    pub output_dir: PathBuf,

    /// Gzip the snapshots
    #[arg(long)]
    pub compress: bool,
}
