use async_trait::async_trait;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::resolver::{AuthData, AuthResolver};
use genai::{Client, ModelIden};
use tracing::debug;

use crate::decompose::config::DecomposerConfig;
use crate::decompose::error::DecomposeError;

/// Remote chat endpoint that turns a prompt into raw (unparsed) feature JSON.
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    async fn extract(&self, system: &str, user: &str) -> Result<String, DecomposeError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// [`FeatureExtractor`] backed by a `genai` chat client.
#[derive(Clone)]
pub struct GenaiExtractor {
    client: Client,
    model: String,
    api_key_var: String,
    options: ChatOptions,
}

impl std::fmt::Debug for GenaiExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiExtractor")
            .field("model", &self.model)
            .field("api_key_var", &self.api_key_var)
            .finish()
    }
}

impl GenaiExtractor {
    pub const TEMPERATURE: f64 = 0.3;
    pub const MAX_TOKENS: u32 = 500;

    /// Client authenticating with the key held in env var `api_key_var`.
    pub fn new(model: impl Into<String>, api_key_var: impl Into<String>) -> Self {
        let api_key_var = api_key_var.into();
        let key_var = api_key_var.clone();
        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model: ModelIden| -> Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_env(key_var.clone())))
            },
        );

        Self {
            client: Client::builder().with_auth_resolver(auth_resolver).build(),
            model: model.into(),
            api_key_var,
            options: ChatOptions::default()
                .with_temperature(Self::TEMPERATURE)
                .with_max_tokens(Self::MAX_TOKENS),
        }
    }

    pub fn from_config(config: &DecomposerConfig) -> Self {
        Self::new(config.llm_model.clone(), config.api_key_var.clone())
    }

    pub fn api_key_var(&self) -> &str {
        &self.api_key_var
    }
}

#[async_trait]
impl FeatureExtractor for GenaiExtractor {
    async fn extract(&self, system: &str, user: &str) -> Result<String, DecomposeError> {
        let request = ChatRequest::new(vec![ChatMessage::user(user)]).with_system(system);

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&self.options))
            .await
            .map_err(|e| DecomposeError::Provider(e.to_string()))?;

        let text = response.first_text().unwrap_or_default().to_string();
        debug!(model = %self.model, reply_len = text.len(), "Provider replied");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
