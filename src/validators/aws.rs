use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::core::config::ValidationSettings;
use crate::core::error::{KeySweepError, Result};
use crate::core::report::{CandidateCredential, ValidationOutcome};
use crate::core::traits::CredentialValidator;
use crate::utils::HttpClient;
use crate::validators::sigv4::RequestSigner;

const STS_ACTION: &[u8] = b"Action=GetCallerIdentity&Version=2011-06-15";
const CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Authority error codes that are definitive answers about the candidate
/// pair. Anything not in this list is a transient failure and surfaces as
/// an error, never as `Invalid`.
const REJECTED_CODES: [&str; 4] = [
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "AuthFailure",
];

#[derive(Debug, Deserialize)]
struct CallerIdentityResponse {
    #[serde(rename = "GetCallerIdentityResponse")]
    response: CallerIdentityBody,
}

#[derive(Debug, Deserialize)]
struct CallerIdentityBody {
    #[serde(rename = "GetCallerIdentityResult")]
    result: CallerIdentity,
}

#[derive(Debug, Deserialize)]
struct CallerIdentity {
    #[serde(rename = "Account")]
    account: Option<String>,
    #[serde(rename = "Arn")]
    arn: Option<String>,
}

/// Confirms candidate pairs against AWS STS `GetCallerIdentity`, a
/// read-only identity check signed with the candidate pair itself. A pair
/// the authority accepts is live; a pair it rejects with a definitive
/// error code is not.
pub struct AwsStsValidator {
    endpoint: String,
    region: String,
    rate_limit_ms: u64,
    timeout: Duration,
}

impl AwsStsValidator {
    pub fn new(settings: &ValidationSettings) -> Self {
        Self {
            endpoint: settings.sts_endpoint.trim_end_matches('/').to_string(),
            region: settings.region.clone(),
            rate_limit_ms: settings.rate_limit_ms,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    fn host(&self) -> String {
        self.endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .to_string()
    }

    /// Map an authority response to an outcome. Only a recognized
    /// rejection code marks the pair invalid.
    fn classify(status_code: u16, body: &str) -> Result<ValidationOutcome> {
        if (200..300).contains(&status_code) {
            return Ok(ValidationOutcome::Valid);
        }
        if status_code == 429 {
            return Err(KeySweepError::RateLimit(
                "STS throttled the validation call".to_string(),
            ));
        }
        if status_code >= 500 {
            return Err(KeySweepError::ValidationFailed(format!(
                "STS server error: HTTP {}",
                status_code
            )));
        }
        if REJECTED_CODES.iter().any(|code| body.contains(code)) {
            return Ok(ValidationOutcome::Invalid);
        }
        Err(KeySweepError::ValidationFailed(format!(
            "STS returned HTTP {} with unrecognized error",
            status_code
        )))
    }
}

impl Default for AwsStsValidator {
    fn default() -> Self {
        Self::new(&ValidationSettings::default())
    }
}

#[async_trait]
impl CredentialValidator for AwsStsValidator {
    async fn validate(&self, credential: &CandidateCredential) -> Result<ValidationOutcome> {
        let signer = RequestSigner {
            access_key_id: credential.identifier.clone(),
            secret_access_key: credential.secret.clone(),
            region: self.region.clone(),
            service: "sts".to_string(),
        };
        let host = self.host();
        let signed = signer.sign("POST", &host, "/", "", Some(CONTENT_TYPE), STS_ACTION, Utc::now());

        // Perform request in blocking context (curl is sync)
        let result = tokio::task::spawn_blocking({
            let client = HttpClient::with_timeout(self.timeout);
            let url = format!("{}/", self.endpoint);
            move || {
                client.post(
                    &url,
                    &[
                        ("Authorization", signed.authorization.as_str()),
                        ("X-Amz-Date", signed.amz_date.as_str()),
                        ("Content-Type", CONTENT_TYPE),
                        ("Accept", "application/json"),
                    ],
                    STS_ACTION,
                )
            }
        })
        .await
        .map_err(|e| KeySweepError::Unknown(format!("validation task failed: {}", e)))?;

        let response = result
            .map_err(|e| KeySweepError::Http(format!("cannot reach STS: {}", e)))?;
        let body = response.text().unwrap_or_default();

        if response.is_success() {
            if let Ok(identity) = response.json::<CallerIdentityResponse>() {
                debug!(
                    "{} is live (account {}, arn {})",
                    credential.identifier,
                    identity.response.result.account.as_deref().unwrap_or("?"),
                    identity.response.result.arn.as_deref().unwrap_or("?"),
                );
            }
        }

        Self::classify(response.status_code, &body)
    }

    fn key_type(&self) -> &str {
        "aws"
    }

    fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_pair_is_valid() {
        let outcome = AwsStsValidator::classify(
            200,
            r#"{"GetCallerIdentityResponse":{"GetCallerIdentityResult":{"Account":"123456789012"}}}"#,
        )
        .unwrap();
        assert_eq!(outcome, ValidationOutcome::Valid);
    }

    #[test]
    fn unknown_identifier_is_invalid() {
        let body = r#"{"Error":{"Code":"InvalidClientTokenId","Message":"The security token included in the request is invalid."}}"#;
        let outcome = AwsStsValidator::classify(403, body).unwrap();
        assert_eq!(outcome, ValidationOutcome::Invalid);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let body = r#"{"Error":{"Code":"SignatureDoesNotMatch","Message":"..."}}"#;
        let outcome = AwsStsValidator::classify(403, body).unwrap();
        assert_eq!(outcome, ValidationOutcome::Invalid);
    }

    #[test]
    fn throttling_is_an_error_not_invalid() {
        let result = AwsStsValidator::classify(429, "");
        assert!(matches!(result, Err(KeySweepError::RateLimit(_))));
    }

    #[test]
    fn server_error_is_an_error_not_invalid() {
        let result = AwsStsValidator::classify(503, "Service Unavailable");
        assert!(matches!(result, Err(KeySweepError::ValidationFailed(_))));
    }

    #[test]
    fn unrecognized_rejection_is_an_error() {
        let body = r#"{"Error":{"Code":"SomethingNew","Message":"..."}}"#;
        let result = AwsStsValidator::classify(403, body);
        assert!(result.is_err());
    }

    #[test]
    fn validator_identifies_its_key_type() {
        let validator = AwsStsValidator::default();
        assert_eq!(validator.key_type(), "aws");
        assert_eq!(validator.rate_limit(), Duration::from_millis(500));
    }
}
