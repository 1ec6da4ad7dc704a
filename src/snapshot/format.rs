use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::scan::{ClusterInformation, RegionScanResult};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// What a snapshot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotKind {
    #[serde(rename = "cluster")]
    Cluster,
    #[serde(rename = "region")]
    Region,
}

/// Versioned envelope around a scan result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub kind: SnapshotKind,
    pub metadata: SnapshotMetadata,
    pub data: T,
}

impl<T> Snapshot<T> {
    pub fn new(kind: SnapshotKind, metadata: SnapshotMetadata, data: T) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            timestamp: Utc::now(),
            kind,
            metadata,
            data,
        }
    }
}

impl Snapshot<ClusterInformation> {
    pub fn cluster(metadata: SnapshotMetadata, info: ClusterInformation) -> Self {
        Self::new(SnapshotKind::Cluster, metadata, info)
    }
}

impl Snapshot<RegionScanResult> {
    pub fn region(metadata: SnapshotMetadata, result: RegionScanResult) -> Self {
        Self::new(SnapshotKind::Region, metadata, result)
    }
}

/// Metadata about the scan that produced a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub tool_version: String,
    pub scan_id: String,
    pub auth_type: Option<String>,
    pub kafka_level_skipped: bool,
    pub redaction_applied: bool,
    pub tags: HashMap<String, String>,
}

impl SnapshotMetadata {
    pub fn new(tool_version: String) -> Self {
        Self {
            tool_version,
            scan_id: uuid::Uuid::new_v4().to_string(),
            auth_type: None,
            kafka_level_skipped: false,
            redaction_applied: false,
            tags: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_has_unique_scan_ids() {
        let a = SnapshotMetadata::new("0.1.0".to_string());
        let b = SnapshotMetadata::new("0.1.0".to_string());

        assert_ne!(a.scan_id, b.scan_id);
        assert!(uuid::Uuid::parse_str(&a.scan_id).is_ok());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let snapshot = Snapshot::new(
            SnapshotKind::Region,
            SnapshotMetadata::new("0.1.0".to_string()),
            vec!["eu-west-1"],
        );
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["kind"], "region");
        assert_eq!(json["version"], SNAPSHOT_VERSION);
        assert_eq!(json["data"][0], "eu-west-1");
    }
}
