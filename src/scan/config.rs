use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::ScanError;

/// Authentication scheme used to reach the brokers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthType {
    #[serde(rename = "iam")]
    Iam,
    #[serde(rename = "sasl_scram")]
    SaslScram,
    #[serde(rename = "tls")]
    Tls,
    #[serde(rename = "unauthenticated")]
    Unauthenticated,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iam => write!(f, "iam"),
            Self::SaslScram => write!(f, "sasl_scram"),
            Self::Tls => write!(f, "tls"),
            Self::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}

impl FromStr for AuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "iam" | "sasl_iam" => Ok(Self::Iam),
            "sasl_scram" | "scram" => Ok(Self::SaslScram),
            "tls" => Ok(Self::Tls),
            "unauthenticated" | "none" => Ok(Self::Unauthenticated),
            other => Err(format!(
                "unknown auth type '{}', expected one of: iam, sasl_scram, tls, unauthenticated",
                other
            )),
        }
    }
}

/// Resolved secrets for the selected authentication scheme
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Iam,
    SaslScram {
        username: String,
        password: String,
    },
    Tls {
        ca_cert: PathBuf,
        client_cert: PathBuf,
        client_key: PathBuf,
    },
    Unauthenticated,
}

impl Credentials {
    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::Iam => AuthType::Iam,
            Self::SaslScram { .. } => AuthType::SaslScram,
            Self::Tls { .. } => AuthType::Tls,
            Self::Unauthenticated => AuthType::Unauthenticated,
        }
    }

    /// Assembles credentials for `auth_type`, requiring the secrets that scheme needs
    pub fn from_parts(
        auth_type: AuthType,
        username: Option<String>,
        password: Option<String>,
        ca_cert: Option<PathBuf>,
        client_cert: Option<PathBuf>,
        client_key: Option<PathBuf>,
    ) -> Result<Self, ScanError> {
        match auth_type {
            AuthType::Iam => Ok(Self::Iam),
            AuthType::Unauthenticated => Ok(Self::Unauthenticated),
            AuthType::SaslScram => match (username, password) {
                (Some(username), Some(password)) => Ok(Self::SaslScram { username, password }),
                _ => Err(ScanError::Configuration(
                    "SASL/SCRAM authentication requires a username and a password".to_string(),
                )),
            },
            AuthType::Tls => match (ca_cert, client_cert, client_key) {
                (Some(ca_cert), Some(client_cert), Some(client_key)) => Ok(Self::Tls {
                    ca_cert,
                    client_cert,
                    client_key,
                }),
                _ => Err(ScanError::Configuration(
                    "TLS authentication requires a CA certificate, a client certificate and a client key"
                        .to_string(),
                )),
            },
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iam => write!(f, "Iam"),
            Self::SaslScram { username, .. } => f
                .debug_struct("SaslScram")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Tls {
                ca_cert,
                client_cert,
                client_key,
            } => f
                .debug_struct("Tls")
                .field("ca_cert", ca_cert)
                .field("client_cert", client_cert)
                .field("client_key", client_key)
                .finish(),
            Self::Unauthenticated => write!(f, "Unauthenticated"),
        }
    }
}

/// Immutable options shared by the cluster and region scanners
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub credentials: Credentials,

    /// Skip the Kafka-protocol phase entirely
    pub skip_kafka_level: bool,

    /// `max_results` hint sent with every list call
    pub page_size: i32,

    /// Deadline for every single control-plane call, in seconds
    pub call_timeout_secs: u64,

    /// Deadline for admin-protocol calls, in seconds
    pub kafka_timeout_secs: u64,

    /// Cluster scans allowed in flight during a region scan
    pub max_concurrent_clusters: usize,

    /// Redact sensitive connector configuration values
    pub redact_sensitive: bool,

    pub client_id: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            credentials: Credentials::Iam,
            skip_kafka_level: false,
            page_size: 100,
            call_timeout_secs: 60,
            kafka_timeout_secs: 30,
            max_concurrent_clusters: 1,
            redact_sensitive: true,
            client_id: "mskpilot".to_string(),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ScanError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ScanError::Configuration(format!("{} has an invalid value: {}", name, value))),
        Err(_) => Ok(None),
    }
}

/// Authentication settings as given, before they are checked for completeness
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthParts {
    pub auth_type: Option<AuthType>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
}

impl AuthParts {
    fn from_env() -> Result<Self, ScanError> {
        let auth_type = match env::var("MSKPILOT_AUTH_TYPE") {
            Ok(value) => Some(value.parse::<AuthType>().map_err(ScanError::Configuration)?),
            Err(_) => None,
        };
        Ok(Self {
            auth_type,
            username: env::var("MSKPILOT_SASL_USERNAME").ok(),
            password: env::var("MSKPILOT_SASL_PASSWORD").ok(),
            ca_cert: env::var("MSKPILOT_TLS_CA_CERT").ok().map(PathBuf::from),
            client_cert: env::var("MSKPILOT_TLS_CLIENT_CERT").ok().map(PathBuf::from),
            client_key: env::var("MSKPILOT_TLS_CLIENT_KEY").ok().map(PathBuf::from),
        })
    }

    /// Field-by-field merge; values set in `overrides` win
    pub fn overridden_by(self, overrides: AuthParts) -> Self {
        Self {
            auth_type: overrides.auth_type.or(self.auth_type),
            username: overrides.username.or(self.username),
            password: overrides.password.or(self.password),
            ca_cert: overrides.ca_cert.or(self.ca_cert),
            client_cert: overrides.client_cert.or(self.client_cert),
            client_key: overrides.client_key.or(self.client_key),
        }
    }

    /// IAM unless an auth type was given
    pub fn into_credentials(self) -> Result<Credentials, ScanError> {
        Credentials::from_parts(
            self.auth_type.unwrap_or(AuthType::Iam),
            self.username,
            self.password,
            self.ca_cert,
            self.client_cert,
            self.client_key,
        )
    }
}

impl ScanOptions {
    /// Load options from `MSKPILOT_*` environment variables (and `.env` if present)
    pub fn from_env() -> Result<Self, ScanError> {
        Self::from_env_with(AuthParts::default())
    }

    /// Like [`ScanOptions::from_env`], with `auth` taking precedence over the environment
    pub fn from_env_with(auth: AuthParts) -> Result<Self, ScanError> {
        Self::from_env_internal(true, auth)
    }

    #[cfg(test)]
    fn from_env_no_dotenv(auth: AuthParts) -> Result<Self, ScanError> {
        Self::from_env_internal(false, auth)
    }

    fn from_env_internal(load_dotenv: bool, auth: AuthParts) -> Result<Self, ScanError> {
        if load_dotenv {
            let _ = dotenv::dotenv();
        }

        let mut options = Self::default();
        options.credentials = AuthParts::from_env()?.overridden_by(auth).into_credentials()?;

        if let Some(skip) = env_flag("MSKPILOT_SKIP_KAFKA") {
            options.skip_kafka_level = skip;
        }
        if let Some(page_size) = env_parse("MSKPILOT_PAGE_SIZE")? {
            options.page_size = page_size;
        }
        if let Some(timeout) = env_parse("MSKPILOT_CALL_TIMEOUT")? {
            options.call_timeout_secs = timeout;
        }
        if let Some(timeout) = env_parse("MSKPILOT_KAFKA_TIMEOUT")? {
            options.kafka_timeout_secs = timeout;
        }
        if let Some(concurrency) = env_parse("MSKPILOT_MAX_CONCURRENCY")? {
            options.max_concurrent_clusters = concurrency;
        }
        if let Some(redact) = env_flag("MSKPILOT_REDACT") {
            options.redact_sensitive = redact;
        }
        if let Ok(client_id) = env::var("MSKPILOT_CLIENT_ID") {
            options.client_id = client_id;
        }

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if !(1..=100).contains(&self.page_size) {
            return Err(ScanError::Configuration(
                "Page size must be between 1 and 100".to_string(),
            ));
        }
        if self.call_timeout_secs == 0 || self.kafka_timeout_secs == 0 {
            return Err(ScanError::Configuration(
                "Timeouts must be greater than 0".to_string(),
            ));
        }
        if self.kafka_timeout_secs > self.call_timeout_secs {
            return Err(ScanError::Configuration(
                "Kafka timeout must not exceed the call timeout".to_string(),
            ));
        }
        if self.max_concurrent_clusters == 0 {
            return Err(ScanError::Configuration(
                "Max concurrent clusters must be greater than 0".to_string(),
            ));
        }
        if let Credentials::SaslScram { username, .. } = &self.credentials {
            if username.is_empty() {
                return Err(ScanError::Configuration(
                    "SASL/SCRAM username is empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "MSKPILOT_AUTH_TYPE",
        "MSKPILOT_SASL_USERNAME",
        "MSKPILOT_SASL_PASSWORD",
        "MSKPILOT_TLS_CA_CERT",
        "MSKPILOT_TLS_CLIENT_CERT",
        "MSKPILOT_TLS_CLIENT_KEY",
        "MSKPILOT_SKIP_KAFKA",
        "MSKPILOT_PAGE_SIZE",
        "MSKPILOT_CALL_TIMEOUT",
        "MSKPILOT_KAFKA_TIMEOUT",
        "MSKPILOT_MAX_CONCURRENCY",
        "MSKPILOT_REDACT",
        "MSKPILOT_CLIENT_ID",
    ];

    fn setup_clean_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_options() {
        let options = ScanOptions::default();

        assert_eq!(options.credentials, Credentials::Iam);
        assert!(!options.skip_kafka_level);
        assert_eq!(options.page_size, 100);
        assert_eq!(options.max_concurrent_clusters, 1);
        assert!(options.redact_sensitive);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_parse_auth_type() {
        assert_eq!("iam".parse(), Ok(AuthType::Iam));
        assert_eq!("sasl-scram".parse(), Ok(AuthType::SaslScram));
        assert_eq!("SASL_SCRAM".parse(), Ok(AuthType::SaslScram));
        assert_eq!("unauthenticated".parse(), Ok(AuthType::Unauthenticated));
        assert!("kerberos".parse::<AuthType>().is_err());
        assert_eq!(AuthType::SaslScram.to_string(), "sasl_scram");
    }

    #[test]
    fn test_scram_requires_secrets() {
        let result = Credentials::from_parts(
            AuthType::SaslScram,
            Some("admin".to_string()),
            None,
            None,
            None,
            None,
        );
        assert!(matches!(result, Err(ScanError::Configuration(_))));
    }

    #[test]
    fn test_tls_requires_all_files() {
        let result = Credentials::from_parts(
            AuthType::Tls,
            None,
            None,
            Some(PathBuf::from("/certs/ca.pem")),
            Some(PathBuf::from("/certs/client.pem")),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = Credentials::SaslScram {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_validate_page_size() {
        let options = ScanOptions {
            page_size: 0,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("Page size must be between"));
    }

    #[test]
    fn test_validate_concurrency() {
        let options = ScanOptions {
            max_concurrent_clusters: 0,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        setup_clean_env();

        let options = ScanOptions::from_env_no_dotenv(AuthParts::default()).unwrap();
        assert_eq!(options.credentials.auth_type(), AuthType::Iam);
        assert_eq!(options.call_timeout_secs, 60);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        setup_clean_env();
        env::set_var("MSKPILOT_AUTH_TYPE", "sasl_scram");
        env::set_var("MSKPILOT_SASL_USERNAME", "migrator");
        env::set_var("MSKPILOT_SASL_PASSWORD", "secret");
        env::set_var("MSKPILOT_SKIP_KAFKA", "true");
        env::set_var("MSKPILOT_PAGE_SIZE", "25");
        env::set_var("MSKPILOT_MAX_CONCURRENCY", "4");

        let options = ScanOptions::from_env_no_dotenv(AuthParts::default()).unwrap();
        assert_eq!(
            options.credentials,
            Credentials::SaslScram {
                username: "migrator".to_string(),
                password: "secret".to_string(),
            }
        );
        assert!(options.skip_kafka_level);
        assert_eq!(options.page_size, 25);
        assert_eq!(options.max_concurrent_clusters, 4);

        setup_clean_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_number() {
        setup_clean_env();
        env::set_var("MSKPILOT_CALL_TIMEOUT", "soon");

        let result = ScanOptions::from_env_no_dotenv(AuthParts::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("MSKPILOT_CALL_TIMEOUT"));

        setup_clean_env();
    }

    #[test]
    #[serial]
    fn test_auth_override_replaces_env_auth_type() {
        setup_clean_env();
        env::set_var("MSKPILOT_AUTH_TYPE", "tls");

        let options = ScanOptions::from_env_no_dotenv(AuthParts {
            auth_type: Some(AuthType::Iam),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(options.credentials, Credentials::Iam);

        setup_clean_env();
    }

    #[test]
    #[serial]
    fn test_auth_override_merges_fields_with_env() {
        setup_clean_env();
        env::set_var("MSKPILOT_AUTH_TYPE", "tls");
        env::set_var("MSKPILOT_TLS_CA_CERT", "/env/ca.pem");
        env::set_var("MSKPILOT_TLS_CLIENT_KEY", "/env/client.key");

        let options = ScanOptions::from_env_no_dotenv(AuthParts {
            ca_cert: Some(PathBuf::from("/flags/ca.pem")),
            client_cert: Some(PathBuf::from("/flags/client.pem")),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            options.credentials,
            Credentials::Tls {
                ca_cert: PathBuf::from("/flags/ca.pem"),
                client_cert: PathBuf::from("/flags/client.pem"),
                client_key: PathBuf::from("/env/client.key"),
            }
        );

        setup_clean_env();
    }

    #[test]
    fn test_merged_parts_default_to_iam() {
        let credentials = AuthParts::default()
            .overridden_by(AuthParts::default())
            .into_credentials()
            .unwrap();
        assert_eq!(credentials, Credentials::Iam);
    }

    #[test]
    fn test_validate_kafka_timeout_within_call_timeout() {
        let options = ScanOptions {
            call_timeout_secs: 20,
            kafka_timeout_secs: 30,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("Kafka timeout must not exceed"));
    }
}
