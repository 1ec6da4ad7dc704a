use async_trait::async_trait;
use rdkafka::admin::AdminClient;
use rdkafka::config::ClientConfig;
use rdkafka::metadata::Metadata;
use std::ffi::{c_int, c_void, CStr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::acl::describe_all_acls;
use super::iam::MskClientContext;
use super::{
    AclEntry, AdminConnection, AdminConnectionFactory, ClientBrokerEncryption, CollectorError,
    CollectorResult, ErrorKind, KafkaClusterMetadata,
};
use crate::scan::config::Credentials;

/// Conversion constant for seconds to milliseconds
const MS_PER_SEC: u64 = 1000;

type MskAdminClient = AdminClient<MskClientContext>;

/// Opens librdkafka admin clients for the configured credentials
pub struct KafkaAdminFactory {
    credentials: Credentials,
    region: String,
    timeout_secs: u64,
    client_id: String,
}

impl KafkaAdminFactory {
    pub fn new(credentials: Credentials, region: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            timeout_secs: 30,
            client_id: "mskpilot".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    fn create_client_config(
        &self,
        addresses: &[String],
        encryption: ClientBrokerEncryption,
        version_hint: &str,
    ) -> ClientConfig {
        let mut client_config = ClientConfig::new();

        client_config.set("bootstrap.servers", addresses.join(","));
        client_config.set("client.id", &self.client_id);
        client_config.set("broker.version.fallback", version_hint);

        match &self.credentials {
            Credentials::Iam => {
                client_config.set("security.protocol", "SASL_SSL");
                client_config.set("sasl.mechanism", "OAUTHBEARER");
            }
            Credentials::SaslScram { username, password } => {
                client_config.set("security.protocol", "SASL_SSL");
                client_config.set("sasl.mechanism", "SCRAM-SHA-512");
                client_config.set("sasl.username", username);
                client_config.set("sasl.password", password);
            }
            Credentials::Tls {
                ca_cert,
                client_cert,
                client_key,
            } => {
                client_config.set("security.protocol", "SSL");
                client_config.set("ssl.ca.location", ca_cert.to_string_lossy());
                client_config.set("ssl.certificate.location", client_cert.to_string_lossy());
                client_config.set("ssl.key.location", client_key.to_string_lossy());
            }
            Credentials::Unauthenticated => {
                // Unauthenticated clusters prefer the TLS listener unless only plaintext is open
                let protocol = match encryption {
                    ClientBrokerEncryption::Plaintext => "PLAINTEXT",
                    _ => "SSL",
                };
                client_config.set("security.protocol", protocol);
            }
        }

        client_config.set(
            "socket.timeout.ms",
            (self.timeout_secs * MS_PER_SEC).to_string(),
        );

        client_config
    }
}

#[async_trait]
impl AdminConnectionFactory for KafkaAdminFactory {
    async fn connect(
        &self,
        addresses: &[String],
        encryption: ClientBrokerEncryption,
        version_hint: &str,
    ) -> CollectorResult<Box<dyn AdminConnection>> {
        if addresses.is_empty() {
            return Err(CollectorError::new(
                ErrorKind::ConnectionFailed,
                "No bootstrap servers configured",
            ));
        }

        info!(
            "Creating admin client for {} broker(s), encryption {}, version hint {}",
            addresses.len(),
            encryption,
            version_hint
        );

        let client_config = self.create_client_config(addresses, encryption, version_hint);
        let client: MskAdminClient = client_config
            .create_with_context(MskClientContext::new(self.region.clone()))
            .map_err(|e| CollectorError::new(ErrorKind::ConnectionFailed, e.to_string()))?;

        Ok(Box::new(KafkaAdminConnection {
            client: Arc::new(client),
            timeout: Duration::from_secs(self.timeout_secs),
            topics: Arc::new(Mutex::new(None)),
        }))
    }
}

/// Admin connection over a librdkafka client; dropping it closes the client
pub struct KafkaAdminConnection {
    client: Arc<MskAdminClient>,
    timeout: Duration,
    /// Topic names from the metadata fetched by `describe_cluster`
    topics: Arc<Mutex<Option<Vec<String>>>>,
}

impl KafkaAdminConnection {
    /// Runs a blocking librdkafka call off the async runtime
    async fn blocking<T, F>(&self, f: F) -> CollectorResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&MskAdminClient, Duration) -> CollectorResult<T> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || f(&client, timeout))
            .await
            .map_err(|e| CollectorError::new(ErrorKind::Other, format!("admin task failed: {}", e)))?
    }
}

fn timeout_ms(timeout: Duration) -> c_int {
    timeout.as_millis().min(c_int::MAX as u128) as c_int
}

/// Time left until `deadline`, never below one millisecond
fn remaining(deadline: Instant) -> Duration {
    deadline
        .saturating_duration_since(Instant::now())
        .max(Duration::from_millis(1))
}

fn sorted_topic_names(metadata: &Metadata) -> Vec<String> {
    let mut topics: Vec<String> = metadata
        .topics()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    topics.sort();
    topics
}

#[async_trait]
impl AdminConnection for KafkaAdminConnection {
    async fn describe_cluster(&self) -> CollectorResult<KafkaClusterMetadata> {
        let cache = Arc::clone(&self.topics);
        self.blocking(move |client, timeout| {
            // The three native calls share one deadline
            let deadline = Instant::now() + timeout;
            let metadata = client
                .inner()
                .fetch_metadata(None, timeout)
                .map_err(|e| CollectorError::new(ErrorKind::ConnectionFailed, e.to_string()))?;
            if let Ok(mut topics) = cache.lock() {
                *topics = Some(sorted_topic_names(&metadata));
            }

            let native = client.inner().native_ptr();
            // Raw FFI until rdkafka exposes these ids (see acl.rs).
            // SAFETY: the client outlives both calls and the returned string is freed with
            // the allocator that produced it.
            let (cluster_id, controller_id) = unsafe {
                let raw = rdkafka_sys::rd_kafka_clusterid(native, timeout_ms(remaining(deadline)));
                let cluster_id = if raw.is_null() {
                    None
                } else {
                    let id = CStr::from_ptr(raw).to_string_lossy().into_owned();
                    rdkafka_sys::rd_kafka_mem_free(native, raw as *mut c_void);
                    Some(id)
                };
                let controller = rdkafka_sys::rd_kafka_controllerid(native, timeout_ms(remaining(deadline)));
                (cluster_id, if controller >= 0 { Some(controller) } else { None })
            };

            debug!(
                "Cluster metadata: {} brokers, controller {:?}",
                metadata.brokers().len(),
                controller_id
            );

            Ok(KafkaClusterMetadata {
                cluster_id,
                controller_id,
                broker_count: metadata.brokers().len(),
            })
        })
        .await
    }

    async fn list_topics(&self) -> CollectorResult<Vec<String>> {
        let cached = self.topics.lock().ok().and_then(|mut topics| topics.take());
        if let Some(topics) = cached {
            return Ok(topics);
        }

        self.blocking(|client, timeout| {
            let metadata = client.inner().fetch_metadata(None, timeout)?;
            Ok(sorted_topic_names(&metadata))
        })
        .await
    }

    async fn describe_acls(&self) -> CollectorResult<Vec<AclEntry>> {
        self.blocking(|client, timeout| {
            // SAFETY: the Arc held by this closure keeps the native handle alive.
            unsafe { describe_all_acls(client.inner().native_ptr(), timeout) }
        })
        .await
    }

    async fn close(self: Box<Self>) -> CollectorResult<()> {
        let client = self.client;
        // Dropping the last reference tears down the librdkafka handle, which can block
        tokio::task::spawn_blocking(move || drop(client))
            .await
            .map_err(|e| CollectorError::new(ErrorKind::Other, format!("failed to close admin client: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn addresses() -> Vec<String> {
        vec!["b-1.msk:9098".to_string(), "b-2.msk:9098".to_string()]
    }

    #[test]
    fn test_iam_client_config() {
        let factory = KafkaAdminFactory::new(Credentials::Iam, "eu-west-1");
        let config = factory.create_client_config(&addresses(), ClientBrokerEncryption::Tls, "3.5.1");

        assert_eq!(config.get("bootstrap.servers"), Some("b-1.msk:9098,b-2.msk:9098"));
        assert_eq!(config.get("security.protocol"), Some("SASL_SSL"));
        assert_eq!(config.get("sasl.mechanism"), Some("OAUTHBEARER"));
        assert_eq!(config.get("broker.version.fallback"), Some("3.5.1"));
        assert_eq!(config.get("socket.timeout.ms"), Some("30000"));
    }

    #[test]
    fn test_scram_client_config() {
        let factory = KafkaAdminFactory::new(
            Credentials::SaslScram {
                username: "migrator".to_string(),
                password: "secret".to_string(),
            },
            "eu-west-1",
        )
        .with_timeout(10)
        .with_client_id("inventory");
        let config = factory.create_client_config(&addresses(), ClientBrokerEncryption::Tls, "2.8.1");

        assert_eq!(config.get("sasl.mechanism"), Some("SCRAM-SHA-512"));
        assert_eq!(config.get("sasl.username"), Some("migrator"));
        assert_eq!(config.get("client.id"), Some("inventory"));
        assert_eq!(config.get("socket.timeout.ms"), Some("10000"));
    }

    #[test]
    fn test_tls_client_config() {
        let factory = KafkaAdminFactory::new(
            Credentials::Tls {
                ca_cert: PathBuf::from("/certs/ca.pem"),
                client_cert: PathBuf::from("/certs/client.pem"),
                client_key: PathBuf::from("/certs/client.key"),
            },
            "eu-west-1",
        );
        let config = factory.create_client_config(&addresses(), ClientBrokerEncryption::Tls, "3.6.0");

        assert_eq!(config.get("security.protocol"), Some("SSL"));
        assert_eq!(config.get("ssl.ca.location"), Some("/certs/ca.pem"));
        assert_eq!(config.get("ssl.key.location"), Some("/certs/client.key"));
        assert_eq!(config.get("sasl.mechanism"), None);
    }

    #[test]
    fn test_unauthenticated_protocol_follows_encryption() {
        let factory = KafkaAdminFactory::new(Credentials::Unauthenticated, "eu-west-1");

        let plaintext = factory.create_client_config(&addresses(), ClientBrokerEncryption::Plaintext, "3.6.0");
        assert_eq!(plaintext.get("security.protocol"), Some("PLAINTEXT"));

        let mixed = factory.create_client_config(&addresses(), ClientBrokerEncryption::TlsPlaintext, "3.6.0");
        assert_eq!(mixed.get("security.protocol"), Some("SSL"));
    }

    #[test]
    fn test_remaining_budget_shrinks_and_stays_positive() {
        let deadline = Instant::now() + Duration::from_secs(30);
        let left = remaining(deadline);
        assert!(left <= Duration::from_secs(30));
        assert!(left > Duration::from_secs(29));

        let expired = Instant::now();
        assert_eq!(remaining(expired), Duration::from_millis(1));
        assert_eq!(timeout_ms(remaining(expired)), 1);
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_addresses() {
        let factory = KafkaAdminFactory::new(Credentials::Iam, "eu-west-1");
        let result = factory.connect(&[], ClientBrokerEncryption::Tls, "3.6.0").await;

        match result {
            Err(e) => assert_eq!(e.kind, ErrorKind::ConnectionFailed),
            Ok(_) => panic!("expected connect to fail without brokers"),
        }
    }
}
