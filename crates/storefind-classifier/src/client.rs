//! Chat-completions client that maps a product to a store category.

use std::time::Duration;

use reqwest::{Client, Url};
use storefind_core::AppConfig;

use crate::error::ClassifierError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

const SYSTEM_PROMPT: &str = "You are an assistant that helps determine the most relevant Google Places API category for products. You should return ONLY the best-matching category name, with no additional text or explanation.";

fn user_prompt(product: &str) -> String {
    format!(
        "What is the most appropriate Google Places business category or search keyword for finding stores that sell: \"{product}\"? Return ONLY the category or search term, nothing else."
    )
}

struct Backend {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
}

/// Classifies products into Places categories.
///
/// A classifier built without an API key is disabled: every call returns
/// [`ClassifierError::Disabled`] so the caller's fallback applies.
pub struct CategoryClassifier {
    backend: Option<Backend>,
}

impl std::fmt::Debug for CategoryClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.backend {
            Some(backend) => f
                .debug_struct("CategoryClassifier")
                .field("endpoint", &backend.endpoint.as_str())
                .field("model", &backend.model)
                .field("api_key", &"[redacted]")
                .finish(),
            None => f.write_str("CategoryClassifier(disabled)"),
        }
    }
}

impl CategoryClassifier {
    /// Creates a classifier posting to `<base_url>/chat/completions`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ClassifierError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("chat/completions"))
            .map_err(|e| ClassifierError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            backend: Some(Backend {
                client,
                api_key: api_key.to_owned(),
                endpoint,
                model: model.to_owned(),
            }),
        })
    }

    /// A classifier that never calls out.
    #[must_use]
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Builds from config; disabled when `DEEPSEEK_API_KEY` is unset.
    ///
    /// # Errors
    ///
    /// Same as [`CategoryClassifier::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClassifierError> {
        match config.deepseek_api_key.as_deref() {
            Some(key) => Self::new(
                key,
                &config.deepseek_base_url,
                &config.deepseek_model,
                config.http_timeout_secs,
                &config.user_agent,
            ),
            None => Ok(Self::disabled()),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Asks the model for the category that best finds stores selling
    /// `product`.
    ///
    /// # Errors
    ///
    /// - [`ClassifierError::Disabled`] when no API key was configured.
    /// - [`ClassifierError::Status`] on a non-2xx response.
    /// - [`ClassifierError::Deserialize`] on a malformed body.
    /// - [`ClassifierError::EmptyResponse`] when the first choice is blank.
    pub async fn classify(&self, product: &str) -> Result<String, ClassifierError> {
        let Some(backend) = &self.backend else {
            return Err(ClassifierError::Disabled);
        };

        let request = ChatRequest {
            model: &backend.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_owned(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(product),
                },
            ],
        };

        let response = backend
            .client
            .post(backend.endpoint.clone())
            .bearer_auth(&backend.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(ClassifierError::Deserialize)?;

        let category = parsed
            .first_content()
            .ok_or(ClassifierError::EmptyResponse)?
            .to_owned();

        tracing::debug!(product, category = %category, "product classified");
        Ok(category)
    }
}
