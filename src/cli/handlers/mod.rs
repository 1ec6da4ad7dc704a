pub mod scan_cluster;
pub mod scan_region;

// Re-export handler functions for convenience
pub use scan_cluster::handle_scan_cluster_command;
pub use scan_region::handle_scan_region_command;

use anyhow::Result;
use aws_config::SdkConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::commands::AuthArgs;
use crate::collectors::admin::KafkaAdminFactory;
use crate::collectors::ec2::Ec2SubnetDescriber;
use crate::collectors::msk::MskControlPlane;
use crate::scan::{AuthParts, ClusterScanner, ScanContext, ScanOptions};

/// Loads options from the environment; command-line values win field by field
pub(crate) fn build_options(auth: &AuthArgs, skip_kafka: bool, max_concurrency: Option<usize>) -> Result<ScanOptions> {
    let mut options = ScanOptions::from_env_with(AuthParts::from(auth))?;

    if skip_kafka {
        options.skip_kafka_level = true;
    }
    if let Some(max_concurrency) = max_concurrency {
        options.max_concurrent_clusters = max_concurrency;
    }

    options.validate()?;
    Ok(options)
}

impl From<&AuthArgs> for AuthParts {
    fn from(args: &AuthArgs) -> Self {
        Self {
            auth_type: args.auth_type,
            username: args.sasl_username.clone(),
            password: args.sasl_password.clone(),
            ca_cert: args.ca_cert.clone(),
            client_cert: args.client_cert.clone(),
            client_key: args.client_key.clone(),
        }
    }
}

/// Scan context whose token is cancelled on Ctrl-C
pub(crate) fn scan_context(options: &ScanOptions) -> ScanContext {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling scan");
            on_signal.cancel();
        }
    });

    ScanContext::new(Duration::from_secs(options.call_timeout_secs)).with_cancellation(token)
}

pub(crate) fn build_cluster_scanner(
    sdk_config: &SdkConfig,
    region: &str,
    options: ScanOptions,
    ctx: ScanContext,
) -> ClusterScanner {
    let admin = KafkaAdminFactory::new(options.credentials.clone(), region)
        .with_timeout(options.kafka_timeout_secs)
        .with_client_id(options.client_id.clone());

    ClusterScanner::new(
        Arc::new(MskControlPlane::new(sdk_config)),
        Arc::new(Ec2SubnetDescriber::new(sdk_config)),
        Arc::new(admin),
        options,
    )
    .with_context(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{AuthType, Credentials};
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_flag_auth_type_overrides_env() {
        env::set_var("MSKPILOT_AUTH_TYPE", "tls");

        let args = AuthArgs {
            auth_type: Some(AuthType::Iam),
            ..Default::default()
        };
        let result = build_options(&args, false, None);

        env::remove_var("MSKPILOT_AUTH_TYPE");
        assert_eq!(result.unwrap().credentials, Credentials::Iam);
    }

    #[test]
    #[serial]
    fn test_scram_flags_apply_to_env_auth_type() {
        env::set_var("MSKPILOT_AUTH_TYPE", "sasl_scram");

        let args = AuthArgs {
            sasl_username: Some("migrator".to_string()),
            sasl_password: Some("secret".to_string()),
            ..Default::default()
        };
        let result = build_options(&args, true, Some(3));

        env::remove_var("MSKPILOT_AUTH_TYPE");
        let options = result.unwrap();
        assert_eq!(
            options.credentials,
            Credentials::SaslScram {
                username: "migrator".to_string(),
                password: "secret".to_string(),
            }
        );
        assert!(options.skip_kafka_level);
        assert_eq!(options.max_concurrent_clusters, 3);
    }
}
