use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use pid_core::ProjectType;
use pid_core::design::DesignResults;
use pid_render::RasterOptions;

use super::{parse_project_type, read_json, save_download};

#[derive(Clone, Copy, ValueEnum)]
pub enum DiagramFormat {
    Svg,
    Png,
}

#[derive(Args)]
pub struct DiagramArgs {
    /// Design results JSON
    pub design: PathBuf,

    #[arg(long, value_enum, default_value = "svg")]
    pub format: DiagramFormat,

    /// Project type code or label, used for the default file name
    #[arg(long = "type", value_parser = parse_project_type, default_value = "STP")]
    pub project_type: ProjectType,

    /// PNG supersampling factor
    #[arg(long, default_value_t = 2.0)]
    pub scale: f32,

    /// Output file (defaults to the download file name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &DiagramArgs) -> Result<()> {
    let results: DesignResults = read_json(&args.design)?;
    let download = match args.format {
        DiagramFormat::Svg => pid_export::diagram_svg(&results, args.project_type)?,
        DiagramFormat::Png => {
            let options = RasterOptions {
                scale: args.scale,
                ..RasterOptions::default()
            };
            pid_export::diagram_png(&results, args.project_type, &options)?
        }
    };
    save_download(&download, args.output.as_deref())?;
    Ok(())
}
