use anyhow::Result;
use clap::Parser;
use mskpilot::cli::commands::{Cli, Commands, ScanTarget};
use mskpilot::cli::handlers::{handle_scan_cluster_command, handle_scan_region_command};
use mskpilot::cli::utils::{init_logging, print_info};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up MSKPILOT_* settings from .env before clap reads the environment
    let _ = dotenv::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, &cli.log_format);

    // Execute command
    match cli.command {
        Commands::Scan { target } => match target {
            ScanTarget::Cluster(args) => handle_scan_cluster_command(args).await,
            ScanTarget::Region(args) => handle_scan_region_command(args).await,
        },

        Commands::Info => {
            print_info();
            Ok(())
        }
    }
}
