//! Command-line interface definitions for retrodoc

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the retrodoc application
#[derive(Parser)]
#[command(name = "retrodoc")]
#[command(version)]
#[command(about = "Styled DOCX report builder for project retrospectives", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for retrodoc
#[derive(Subcommand)]
pub enum Commands {
    /// Build a .docx report from a report description
    Build {
        /// Report description (.toml)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Output file path (overrides `output` in the report description)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check a report description without writing anything
    Validate {
        /// Report description (.toml)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Show detailed validation results
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write a starter report description from a built-in template
    Init {
        /// Directory to write report.toml into (defaults to current directory)
        path: Option<PathBuf>,

        /// Template identifier or alias
        #[arg(short, long, default_value = crate::templates::DEFAULT_TEMPLATE)]
        template: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// List built-in report templates
    ListTemplates,
}
