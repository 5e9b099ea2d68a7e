use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use pid_core::ProjectData;
use pid_core::design::DesignResults;
use pid_export::{ExportOptions, ReportFormat};

use super::{read_json, save_download};

#[derive(Args)]
pub struct ReportArgs {
    /// Design results JSON
    pub design: PathBuf,

    /// Project data JSON
    #[arg(long)]
    pub project: PathBuf,

    /// html, rtf or doc
    #[arg(long, value_parser = parse_format, default_value = "html")]
    pub format: ReportFormat,

    /// Report date as YYYY-MM-DD (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Output file (defaults to the download file name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_format(input: &str) -> Result<ReportFormat, String> {
    ReportFormat::parse(input).ok_or_else(|| format!("unknown report format `{input}`"))
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| format!("{input}: {e}"))
}

pub fn run(args: &ReportArgs) -> Result<()> {
    let results: DesignResults = read_json(&args.design)?;
    let project: ProjectData = read_json(&args.project)?;

    for section in results.missing_sections() {
        log::warn!("design has no {section}");
    }
    let options = args
        .date
        .map(ExportOptions::new)
        .unwrap_or_else(ExportOptions::today);
    let download = pid_export::export_report(&results, &project, args.format, &options);
    save_download(&download, args.output.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_aliases_and_dates() {
        assert_eq!(parse_format("word"), Ok(ReportFormat::WordXml));
        assert!(parse_format("pdf").is_err());
        assert_eq!(
            parse_date("2025-03-14"),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
        );
        assert!(parse_date("14/03/2025").is_err());
    }
}
