use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine as _;
use clap::Args;
use pid_core::ProjectData;
use pid_core::design::DesignResults;
use pid_design::{
    ClientConfig, DesignError, DesignService, GeminiClient, LoadingFlag, Operation, attach_file,
    edit_image, refine_project, replace_diagram,
};

use super::{read_json, write_json};

/// Options shared by every command that calls the design service.
#[derive(Args)]
pub struct ServiceArgs {
    /// API key (defaults to $API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Disable extended thinking
    #[arg(long)]
    pub no_thinking: bool,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Project data JSON
    pub project: PathBuf,

    /// Documents or images sent with the instructions
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,

    /// Recorded voice instructions
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Write the updated project here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Project data JSON
    pub project: PathBuf,

    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,

    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Use the instructions as given instead of analysing them first
    #[arg(long)]
    pub skip_analysis: bool,

    /// Write the design here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args)]
pub struct RegenerateArgs {
    /// Project data JSON
    pub project: PathBuf,

    /// Existing design results JSON
    #[arg(long)]
    pub design: PathBuf,

    /// Write the updated design here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args)]
pub struct EditImageArgs {
    /// Image to edit (PNG, JPEG, WebP or GIF)
    pub image: PathBuf,

    /// What to change
    #[arg(short, long)]
    pub prompt: String,

    /// Output file (defaults to edited-<image name>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

fn client(args: &ServiceArgs) -> Result<GeminiClient> {
    let mut config = ClientConfig::with_key(args.api_key.clone())
        .map_err(|e| failure(e, Operation::GenerateDesign))?;
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if args.no_thinking {
        config.thinking_budget = None;
    }
    log::debug!("{config:?}");
    Ok(GeminiClient::new(config)?)
}

/// Keep the user-facing text on top and the underlying error as the cause.
fn failure(err: DesignError, operation: Operation) -> anyhow::Error {
    let message = err.user_message(operation);
    anyhow::Error::new(err).context(message)
}

fn load_project(
    path: &Path,
    attachments: &[PathBuf],
    audio: Option<&Path>,
) -> Result<ProjectData> {
    let mut project: ProjectData = read_json(path)?;
    for file in attachments {
        project
            .special_instructions_files
            .push(attach_file(file).map_err(|e| failure(e, Operation::AnalyzeInstructions))?);
    }
    if let Some(audio) = audio {
        project.special_instructions_audio =
            Some(attach_file(audio).map_err(|e| failure(e, Operation::AnalyzeInstructions))?);
    }
    for issue in project.validate() {
        log::warn!("{issue}");
    }
    Ok(project)
}

async fn analyze_into(service: &dyn DesignService, project: &mut ProjectData) -> Result<()> {
    let flag = LoadingFlag::new();
    let guard = flag.begin();
    let applied = refine_project(service, project)
        .await
        .map_err(|e| failure(e, Operation::AnalyzeInstructions))?;
    if let Some(guard) = guard {
        log::info!("instruction analysis took {:.1?}", guard.elapsed());
    }
    if applied.is_empty() {
        eprintln!("No parameters found in the instructions.");
    }
    for name in applied {
        eprintln!("  {} = {}", name.key(), project.value(name));
    }
    Ok(())
}

pub async fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let mut project = load_project(&args.project, &args.attachments, args.audio.as_deref())?;
    if !project.has_instructions() {
        eprintln!("The project has no special instructions to analyse.");
        return write_json(&project, args.output.as_deref());
    }
    let client = client(&args.service)?;
    analyze_into(&client, &mut project).await?;
    write_json(&project, args.output.as_deref())
}

pub async fn generate(args: &GenerateArgs) -> Result<()> {
    let mut project = load_project(&args.project, &args.attachments, args.audio.as_deref())?;
    let client = client(&args.service)?;

    if !args.skip_analysis
        && project.has_instructions()
        && let Err(err) = analyze_into(&client, &mut project).await
    {
        // The design can still be generated from the parameters as entered.
        eprintln!("{err}");
    }

    eprintln!(
        "Generating {} design for {}...",
        project.project_type.code(),
        project.location
    );
    let results = client
        .generate_design(&project)
        .await
        .map_err(|e| failure(e, Operation::GenerateDesign))?;
    if !results.has_diagram() {
        eprintln!("The design came back without a P&ID; try `pid regenerate`.");
    }
    write_json(&results, args.output.as_deref())
}

pub async fn regenerate(args: &RegenerateArgs) -> Result<()> {
    let project: ProjectData = read_json(&args.project)?;
    let mut results: DesignResults = read_json(&args.design)
        .with_context(|| format!("failed to load design {}", args.design.display()))?;
    let client = client(&args.service)?;

    replace_diagram(&client, &project, &mut results)
        .await
        .map_err(|e| failure(e, Operation::RegenerateDiagram))?;
    write_json(&results, args.output.as_deref())
}

/// `edited-<name>` in the current directory.
fn edited_path(image: &Path) -> PathBuf {
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.png".to_string());
    PathBuf::from(format!("edited-{name}"))
}

pub async fn edit(args: &EditImageArgs) -> Result<()> {
    let image = attach_file(&args.image).map_err(|e| failure(e, Operation::EditImage))?;
    let client = client(&args.service)?;

    eprintln!("Editing {}...", image.name);
    let edited = edit_image(&client, &image, &args.prompt)
        .await
        .map_err(|e| failure(e, Operation::EditImage))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(edited.trim())
        .context("the edited image was not valid base64")?;

    let path = args.output.clone().unwrap_or_else(|| edited_path(&args.image));
    std::fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {} ({}, {} bytes)", path.display(), image.mime_type, bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edited_image_keeps_its_name() {
        assert_eq!(
            edited_path(Path::new("drawings/site-sketch.jpg")),
            PathBuf::from("edited-site-sketch.jpg")
        );
    }

    #[test]
    fn failure_puts_user_text_first() {
        let err = failure(DesignError::EmptyResponse, Operation::RegenerateDiagram);
        assert_eq!(err.to_string(), "Failed to regenerate P&ID. Please try again.");
        assert_eq!(
            err.root_cause().to_string(),
            "the design service returned no content"
        );
    }
}
