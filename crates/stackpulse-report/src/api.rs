//! Reporting service client.

use std::time::Duration;

use stackpulse_core::{ApiConfig, Fact, StackpulseError};

/// Destination for batches of facts.
///
/// One call delivers one batch; an error means the whole batch failed.
#[allow(async_fn_in_trait)]
pub trait FactsApi {
    /// Deliver `facts` to the reporting service.
    async fn post_facts(&self, facts: &[Fact]) -> Result<(), StackpulseError>;
}

/// JSON body of a facts batch: `{"facts": [...]}`.
///
/// # Examples
///
/// ```
/// use stackpulse_core::{Fact, FactCode, Repo};
/// use stackpulse_report::api::facts_payload;
///
/// let body = facts_payload(&[Fact::new(Repo::new("r1"), FactCode::TeamSize, 0, "3")]);
/// assert_eq!(body["facts"][0]["code"], "TEAM_SIZE");
/// assert_eq!(body["facts"][0]["repo"]["id"], "r1");
/// ```
pub fn facts_payload(facts: &[Fact]) -> serde_json::Value {
    serde_json::json!({ "facts": facts })
}

/// HTTP client for the reporting service.
///
/// # Examples
///
/// ```
/// use stackpulse_core::ApiConfig;
/// use stackpulse_report::HttpFactsApi;
///
/// let config = ApiConfig {
///     base_url: Some("https://stats.example.com/api".into()),
///     token: Some("secret".into()),
///     ..ApiConfig::default()
/// };
/// let api = HttpFactsApi::new(&config).unwrap();
/// assert_eq!(api.facts_url(), "https://stats.example.com/api/facts");
/// ```
pub struct HttpFactsApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpFactsApi {
    /// Create a client from the `[api]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`StackpulseError::Config`] when no base URL is configured and
    /// [`StackpulseError::Api`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, StackpulseError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| StackpulseError::Config("api.base_url is not set".into()))?
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StackpulseError::Api(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Endpoint receiving fact batches.
    pub fn facts_url(&self) -> String {
        format!("{}/facts", self.base_url)
    }
}

impl FactsApi for HttpFactsApi {
    async fn post_facts(&self, facts: &[Fact]) -> Result<(), StackpulseError> {
        let mut request = self.client.post(self.facts_url());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .json(&facts_payload(facts))
            .send()
            .await
            .map_err(|e| StackpulseError::Api(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(StackpulseError::Api(format!("{status}: {body_text}")));
        }
        Ok(())
    }
}
