//! Command line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use claimcheck_core::ReportFormat;

/// Upload claim documents for verification and inspect the results.
#[derive(Parser, Debug)]
#[command(name = "claimcheck", author, version, about)]
pub struct Cli {
    /// Verification service base URL [env: CLAIMCHECK_API_URL]
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the saved task list [env: CLAIMCHECK_STATE_DIR]
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Directory reports and previews are written to [env: CLAIMCHECK_REPORT_DIR]
    #[arg(long, global = true)]
    pub report_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload files and wait for their results
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List saved tasks
    List,
    /// Show every panel for a task (default: the selected one)
    Show {
        id: Option<String>,
        /// Print the raw result payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Select a task
    Select { id: String },
    /// Re-run a finished task and wait for the new result
    Retry { id: String },
    /// Delete a task
    Delete { id: String },
    /// Delete every task
    Clear,
    /// Write a JSON or HTML report
    Export {
        /// Task to export (default: the selected one)
        #[arg(conflicts_with = "all")]
        id: Option<String>,
        /// Export every completed task into one report
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = "json", value_parser = parse_format)]
        format: ReportFormat,
    },
    /// Download the original file of a task
    Preview {
        id: String,
        /// Output path (default: the original name inside the report directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check that the verification service is up
    Health,
}

fn parse_format(s: &str) -> Result<ReportFormat, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "claimcheck",
            "upload",
            "a.pdf",
            "b.png",
            "--api-url",
            "http://verify:8000",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://verify:8000"));
        match cli.command {
            Command::Upload { files } => assert_eq!(files.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn export_options() {
        let cli = Cli::try_parse_from(["claimcheck", "export", "--all", "--format", "html"]).unwrap();
        match cli.command {
            Command::Export { id, all, format } => {
                assert!(id.is_none());
                assert!(all);
                assert_eq!(format, ReportFormat::Html);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["claimcheck", "export", "abc", "--all"]).is_err());
        assert!(Cli::try_parse_from(["claimcheck", "export", "--format", "pdf"]).is_err());
        assert!(Cli::try_parse_from(["claimcheck", "upload"]).is_err());
    }
}
