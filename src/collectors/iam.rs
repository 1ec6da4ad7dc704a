use rdkafka::client::{ClientContext, OAuthToken};
use std::error::Error;
use tracing::{debug, warn};

/// Principal reported with IAM tokens; MSK authorises on the signed token itself
const IAM_PRINCIPAL: &str = "mskpilot";

/// Client context that signs SASL/OAUTHBEARER tokens for MSK IAM authentication.
///
/// librdkafka only asks for a token when `sasl.mechanism` is `OAUTHBEARER`, so the
/// same context is used for every authentication scheme.
#[derive(Debug, Clone)]
pub struct MskClientContext {
    region: String,
}

impl MskClientContext {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }
}

impl ClientContext for MskClientContext {
    const ENABLE_REFRESH_OAUTH_TOKEN: bool = true;

    fn generate_oauth_token(&self, _oauthbearer_config: Option<&str>) -> Result<OAuthToken, Box<dyn Error>> {
        let region = self.region.clone();
        debug!("Generating MSK IAM auth token for region {}", region);

        // librdkafka calls this from its own thread, outside of any tokio runtime
        let signed = std::thread::spawn(move || -> Result<(String, i64), String> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| e.to_string())?;
            runtime
                .block_on(aws_msk_iam_sasl_signer::generate_auth_token(
                    aws_config::Region::new(region),
                ))
                .map_err(|e| e.to_string())
        })
        .join()
        .map_err(|_| "IAM token signer thread panicked".to_string())?;

        let (token, lifetime_ms) = signed.map_err(|e| {
            warn!("Failed to generate MSK IAM auth token: {}", e);
            e
        })?;

        Ok(OAuthToken {
            token,
            principal_name: IAM_PRINCIPAL.to_string(),
            lifetime_ms,
        })
    }
}
