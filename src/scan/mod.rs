// Module declarations
pub mod brokers;
pub mod classify;
pub mod cluster_scanner;
pub mod config;
pub mod context;
pub mod network;
pub mod paging;
pub mod region_scanner;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

use crate::collectors::CollectorError;

// Re-export types for convenience
pub use brokers::{resolve_broker_addresses, NoBrokersFoundError};
pub use classify::{classify, Absorb, Classification};
pub use cluster_scanner::ClusterScanner;
pub use config::{AuthParts, AuthType, Credentials, ScanOptions};
pub use context::ScanContext;
pub use region_scanner::{ClusterScanOutcome, RegionScanner};
pub use types::{ClusterInformation, ClusterSummary, RegionScanResult, ScanWarning};

/// Errors that abort a cluster or region scan
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("{context}: {source}")]
    Collector {
        context: String,
        #[source]
        source: CollectorError,
    },

    #[error(transparent)]
    NoBrokersFound(#[from] NoBrokersFoundError),

    #[error("failed to setup admin client: {0}")]
    AdminSetup(#[source] CollectorError),

    #[error("invalid cluster ARN: {0}")]
    InvalidClusterArn(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ScanError {
    pub fn collector(context: impl Into<String>, source: CollectorError) -> Self {
        Self::Collector {
            context: context.into(),
            source,
        }
    }
}
