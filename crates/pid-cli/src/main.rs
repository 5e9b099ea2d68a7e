mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pid", about = "Treatment plant P&ID viewer checks and proposal export")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the interactive units and loader findings of a diagram
    Inspect(commands::inspect::InspectArgs),
    /// Save the diagram of a design as SVG or PNG
    Diagram(commands::diagram::DiagramArgs),
    /// Export a design report as HTML, RTF or Word
    Report(commands::report::ReportArgs),
    /// Extract parameters from a project's special instructions
    Analyze(commands::design::AnalyzeArgs),
    /// Generate a full design for a project
    Generate(commands::design::GenerateArgs),
    /// Regenerate only the P&ID of an existing design
    Regenerate(commands::design::RegenerateArgs),
    /// Edit an image from a text prompt
    EditImage(commands::design::EditImageArgs),
    /// Show or change viewer settings
    Settings(commands::settings::SettingsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Diagram(args) => commands::diagram::run(args),
        Commands::Report(args) => commands::report::run(args),
        Commands::Analyze(args) => commands::design::analyze(args).await,
        Commands::Generate(args) => commands::design::generate(args).await,
        Commands::Regenerate(args) => commands::design::regenerate(args).await,
        Commands::EditImage(args) => commands::design::edit(args).await,
        Commands::Settings(args) => commands::settings::run(args),
    }
}
