//! AI design service.
//!
//! Three calls back the proposal wizard: extracting parameters from the
//! user's free-form instructions, generating the full design, and
//! regenerating only the P&ID. A fourth edits an uploaded image from a text
//! prompt. `DesignService` is the seam; `GeminiClient` is the HTTP
//! implementation. Failures are reported once and never
//! retried.

pub mod attachments;
pub mod client;
pub mod loading;
pub mod parse;
pub mod prompt;
pub mod schema;
pub mod wire;

pub use attachments::{attach_bytes, attach_file, guess_mime};
pub use client::{ClientConfig, GeminiClient};
pub use loading::{LoadingFlag, LoadingGuard};

use async_trait::async_trait;
use pid_core::design::{DesignResults, ParameterAnalysis, ProcessFlowDiagram};
use pid_core::project::{AttachedFile, ParameterName, ProjectData};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    #[error("the {} environment variable is not set", client::API_KEY_VAR)]
    MissingApiKey,
    #[error("request to the design service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("design service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("the design service returned no content")]
    EmptyResponse,
    #[error("no image was returned from the image edit")]
    NoImage,
    #[error("{context}: the response was not valid JSON: {source}")]
    InvalidJson {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not read attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("attachment {} is too large to send ({size} bytes)", .path.display())]
    AttachmentTooLarge { path: PathBuf, size: usize },
    #[error("an image and a prompt are both required")]
    MissingEditInput,
}

impl DesignError {
    /// Text shown to the user when `operation` fails.
    pub fn user_message(&self, operation: Operation) -> String {
        match self {
            Self::MissingApiKey => format!(
                "The design service is not configured. Set {} and try again.",
                client::API_KEY_VAR
            ),
            Self::Attachment { .. } | Self::AttachmentTooLarge { .. } => {
                format!("{self}. Remove or replace the file and try again.")
            }
            Self::MissingEditInput => "Please upload an image and enter a prompt.".to_string(),
            _ => operation.failure_message().to_string(),
        }
    }
}

/// The service calls, named for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AnalyzeInstructions,
    GenerateDesign,
    RegenerateDiagram,
    EditImage,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::AnalyzeInstructions => {
                "Could not automatically extract parameters from your instructions. Please review and enter them manually."
            }
            Self::GenerateDesign => {
                "Failed to generate design. Please check your inputs and try again."
            }
            Self::RegenerateDiagram => "Failed to regenerate P&ID. Please try again.",
            Self::EditImage => "Failed to edit image. Please try again.",
        }
    }
}

#[async_trait]
pub trait DesignService: Send + Sync {
    /// Extract parameter values and a summary from the special instructions.
    async fn analyze_instructions(
        &self,
        project: &ProjectData,
    ) -> Result<ParameterAnalysis, DesignError>;

    async fn generate_design(&self, project: &ProjectData) -> Result<DesignResults, DesignError>;

    async fn regenerate_diagram(
        &self,
        project: &ProjectData,
    ) -> Result<ProcessFlowDiagram, DesignError>;

    /// Apply `prompt` to a base64 image; returns the edited image as base64.
    /// The result is presented with the source's `mime_type`.
    async fn edit_image(
        &self,
        image_base64: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, DesignError>;
}

/// Validate the inputs of an image edit and run it.
pub async fn edit_image(
    service: &dyn DesignService,
    image: &AttachedFile,
    prompt: &str,
) -> Result<String, DesignError> {
    if image.data.is_empty() || prompt.trim().is_empty() {
        return Err(DesignError::MissingEditInput);
    }
    if !image.mime_type.starts_with("image/") {
        log::warn!("{} is {}, not an image", image.name, image.mime_type);
    }
    service.edit_image(&image.data, &image.mime_type, prompt.trim()).await
}

/// Run instruction analysis when the project has instructions and merge the
/// result into it. Returns the parameters the model filled in.
pub async fn refine_project(
    service: &dyn DesignService,
    project: &mut ProjectData,
) -> Result<Vec<ParameterName>, DesignError> {
    if !project.has_instructions() {
        return Ok(Vec::new());
    }
    let analysis = service.analyze_instructions(project).await?;
    let applied = analysis.apply_to(project);
    log::debug!("instruction analysis set {} parameter(s)", applied.len());
    Ok(applied)
}

/// Regenerate the P&ID and swap it into `results`. On failure `results`
/// keeps its previous diagram.
pub async fn replace_diagram(
    service: &dyn DesignService,
    project: &ProjectData,
    results: &mut DesignResults,
) -> Result<(), DesignError> {
    let diagram = service.regenerate_diagram(project).await?;
    if diagram.svg_content.trim().is_empty() {
        return Err(DesignError::EmptyResponse);
    }
    results.process_flow_diagram = diagram;
    Ok(())
}
