use tracing::{debug, info};

use super::config::AuthType;
use crate::collectors::BootstrapBrokers;

/// No endpoint string was published for the selected authentication scheme
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no brokers found for auth type {auth_type}")]
pub struct NoBrokersFoundError {
    pub auth_type: AuthType,
}

/// Splits a comma separated endpoint string; `None` when nothing usable remains
fn split_endpoints(value: Option<&str>) -> Option<Vec<String>> {
    let addresses: Vec<String> = value?
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();

    if addresses.is_empty() {
        None
    } else {
        Some(addresses)
    }
}

/// Picks the dial addresses for `auth_type`, preferring public endpoints.
///
/// Unauthenticated clusters prefer the TLS listener and fall back to plaintext.
pub fn resolve_broker_addresses(
    brokers: &BootstrapBrokers,
    auth_type: AuthType,
) -> Result<Vec<String>, NoBrokersFoundError> {
    let (preferred, fallback, tiers) = match auth_type {
        AuthType::Iam => (&brokers.public_sasl_iam, &brokers.sasl_iam, ("public", "private")),
        AuthType::SaslScram => (&brokers.public_sasl_scram, &brokers.sasl_scram, ("public", "private")),
        AuthType::Tls => (&brokers.public_tls, &brokers.tls, ("public", "private")),
        AuthType::Unauthenticated => (&brokers.tls, &brokers.plaintext, ("private TLS", "plaintext")),
    };

    if let Some(addresses) = split_endpoints(preferred.as_deref()) {
        info!("Using {} broker endpoints for {} authentication", tiers.0, auth_type);
        return Ok(addresses);
    }

    debug!("No {} endpoints for {}, trying {}", tiers.0, auth_type, tiers.1);
    if let Some(addresses) = split_endpoints(fallback.as_deref()) {
        info!("Using {} broker endpoints for {} authentication", tiers.1, auth_type);
        return Ok(addresses);
    }

    Err(NoBrokersFoundError { auth_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_bundle() -> BootstrapBrokers {
        BootstrapBrokers {
            plaintext: Some("p1:9092,p2:9092".to_string()),
            tls: Some("t1:9094,t2:9094".to_string()),
            sasl_scram: Some("s1:9096".to_string()),
            sasl_iam: Some("i1:9098".to_string()),
            public_tls: Some("pt1:9194".to_string()),
            public_sasl_scram: Some("ps1:9196".to_string()),
            public_sasl_iam: Some("pi1:9198, pi2:9198".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_public_endpoints_win_when_present() {
        let brokers = full_bundle();

        assert_eq!(
            resolve_broker_addresses(&brokers, AuthType::Iam).unwrap(),
            vec!["pi1:9198", "pi2:9198"]
        );
        assert_eq!(
            resolve_broker_addresses(&brokers, AuthType::SaslScram).unwrap(),
            vec!["ps1:9196"]
        );
        assert_eq!(
            resolve_broker_addresses(&brokers, AuthType::Tls).unwrap(),
            vec!["pt1:9194"]
        );
    }

    #[test]
    fn test_unauthenticated_prefers_tls_listener() {
        let brokers = full_bundle();
        assert_eq!(
            resolve_broker_addresses(&brokers, AuthType::Unauthenticated).unwrap(),
            vec!["t1:9094", "t2:9094"]
        );

        let plaintext_only = BootstrapBrokers {
            plaintext: Some("p1:9092".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_broker_addresses(&plaintext_only, AuthType::Unauthenticated).unwrap(),
            vec!["p1:9092"]
        );
    }

    #[test]
    fn test_falls_back_to_private_endpoints() {
        let brokers = BootstrapBrokers {
            sasl_iam: Some("b-1:9098,b-2:9098".to_string()),
            tls: Some("b-1:9094".to_string()),
            sasl_scram: Some("b-1:9096".to_string()),
            ..Default::default()
        };

        assert_eq!(
            resolve_broker_addresses(&brokers, AuthType::Iam).unwrap(),
            vec!["b-1:9098", "b-2:9098"]
        );
        assert_eq!(
            resolve_broker_addresses(&brokers, AuthType::Tls).unwrap(),
            vec!["b-1:9094"]
        );
        assert_eq!(
            resolve_broker_addresses(&brokers, AuthType::SaslScram).unwrap(),
            vec!["b-1:9096"]
        );
    }

    #[test]
    fn test_blank_public_field_is_treated_as_absent() {
        let brokers = BootstrapBrokers {
            public_sasl_iam: Some(" , ,".to_string()),
            sasl_iam: Some("b-1:9098".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_broker_addresses(&brokers, AuthType::Iam).unwrap(),
            vec!["b-1:9098"]
        );
    }

    #[test]
    fn test_trims_and_drops_empty_entries_in_order() {
        let brokers = BootstrapBrokers {
            public_tls: Some("  c:9194 ,,a:9194,  b:9194  ,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_broker_addresses(&brokers, AuthType::Tls).unwrap(),
            vec!["c:9194", "a:9194", "b:9194"]
        );
    }

    #[test]
    fn test_missing_endpoints_name_the_scheme() {
        let brokers = BootstrapBrokers {
            plaintext: Some("p1:9092".to_string()),
            ..Default::default()
        };

        let err = resolve_broker_addresses(&brokers, AuthType::SaslScram).unwrap_err();
        assert_eq!(err.auth_type, AuthType::SaslScram);
        assert_eq!(err.to_string(), "no brokers found for auth type sasl_scram");

        let err = resolve_broker_addresses(&BootstrapBrokers::default(), AuthType::Unauthenticated)
            .unwrap_err();
        assert_eq!(err.auth_type, AuthType::Unauthenticated);
    }
}
