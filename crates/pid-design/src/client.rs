//! HTTP client for the generateContent endpoint.

use crate::parse::decode;
use crate::wire::{GenerateRequest, GenerateResponse, InlineData, error_message};
use crate::{DesignError, DesignService, prompt, schema};
use async_trait::async_trait;
use pid_core::design::{DesignResults, ParameterAnalysis, ProcessFlowDiagram};
use pid_core::project::ProjectData;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_THINKING_BUDGET: u32 = 32_768;
/// Environment variable holding the credential.
pub const API_KEY_VAR: &str = "API_KEY";
/// Design generation with a full thinking budget can take minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL up to and including the API version.
    pub endpoint: String,
    /// `None` omits `thinkingConfig` from requests.
    pub thinking_budget: Option<u32>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads the credential from `API_KEY`.
    pub fn from_env() -> Result<Self, DesignError> {
        Self::with_key(std::env::var(API_KEY_VAR).ok())
    }

    /// An explicit key wins over the environment.
    pub fn with_key(key: Option<String>) -> Result<Self, DesignError> {
        key.or_else(|| std::env::var(API_KEY_VAR).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(Self::new)
            .ok_or(DesignError::MissingApiKey)
    }

    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("thinking_budget", &self.thinking_budget)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GeminiClient {
    pub fn new(config: ClientConfig) -> Result<Self, DesignError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, DesignError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn request(
        &self,
        system: String,
        prompt: String,
        project: &ProjectData,
        schema: Value,
    ) -> GenerateRequest {
        GenerateRequest::new(system, prompt, project, schema, self.config.thinking_budget)
    }

    /// Post a request and return the model's answer text.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, DesignError> {
        answer_text(&self.post(request).await?)
    }

    /// Post a request and return the raw response body of a successful call.
    async fn post(&self, request: &GenerateRequest) -> Result<String, DesignError> {
        log::debug!(
            "POST {} ({} parts)",
            self.config.generate_url(),
            request.contents.iter().map(|c| c.parts.len()).sum::<usize>()
        );
        let response = self
            .http
            .post(self.config.generate_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = error_message(&body);
            log::warn!("design service returned {status}: {message}");
            return Err(DesignError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: GenerateRequest,
        context: &'static str,
    ) -> Result<T, DesignError> {
        let text = self.generate(&request).await?;
        decode(&text, context)
    }
}

fn envelope(body: &str) -> Result<GenerateResponse, DesignError> {
    serde_json::from_str(body).map_err(|source| DesignError::InvalidJson {
        context: "response envelope",
        source,
    })
}

/// The answer text in a generateContent response body.
pub fn answer_text(body: &str) -> Result<String, DesignError> {
    let response = envelope(body)?;
    match response.text() {
        Some(text) => Ok(text),
        None => {
            if let Some(reason) = response.block_reason() {
                log::warn!("prompt blocked: {reason}");
            } else if let Some(reason) = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
            {
                log::warn!("no answer text, finish reason {reason}");
            }
            Err(DesignError::EmptyResponse)
        }
    }
}

/// The first image in a generateContent response body.
pub fn answer_image(body: &str) -> Result<InlineData, DesignError> {
    let response = envelope(body)?;
    match response.image() {
        Some(image) if !image.data.trim().is_empty() => Ok(image.clone()),
        _ => {
            if let Some(reason) = response.block_reason() {
                log::warn!("image edit blocked: {reason}");
            }
            Err(DesignError::NoImage)
        }
    }
}

#[async_trait]
impl DesignService for GeminiClient {
    async fn analyze_instructions(
        &self,
        project: &ProjectData,
    ) -> Result<ParameterAnalysis, DesignError> {
        let request = self.request(
            prompt::ANALYSIS_SYSTEM_INSTRUCTION.to_string(),
            prompt::analysis_prompt(project),
            project,
            schema::analysis_schema(project.project_type),
        );
        self.call(request, "instruction analysis").await
    }

    async fn generate_design(&self, project: &ProjectData) -> Result<DesignResults, DesignError> {
        let today = chrono::Local::now().date_naive();
        let request = self.request(
            prompt::design_system_instruction(project),
            prompt::design_prompt(project, today),
            project,
            schema::design_schema(),
        );
        let results: DesignResults = self.call(request, "design").await?;
        let missing = results.missing_sections();
        if !missing.is_empty() {
            log::warn!("design came back without {}", missing.join(", "));
        }
        Ok(results)
    }

    async fn regenerate_diagram(
        &self,
        project: &ProjectData,
    ) -> Result<ProcessFlowDiagram, DesignError> {
        let request = self.request(
            prompt::DIAGRAM_SYSTEM_INSTRUCTION.to_string(),
            prompt::diagram_prompt(project),
            project,
            schema::diagram_schema(),
        );
        self.call(request, "diagram").await
    }

    async fn edit_image(
        &self,
        image_base64: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, DesignError> {
        let source = InlineData {
            mime_type: mime_type.to_string(),
            data: image_base64.to_string(),
        };
        let request = GenerateRequest::image_edit(source, prompt);
        let image = answer_image(&self.post(&request).await?)?;
        log::debug!("edited image: {} ({} base64 bytes)", image.mime_type, image.data.len());
        Ok(image.data)
    }
}
