//! retrodoc - styled DOCX report builder
//!
//! A CLI tool that turns a TOML report description (cover page, table of
//! contents, sections of paragraphs, bullets and tables) into a styled
//! Word document.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]
#![allow(dead_code)]

mod cli;
mod report_config;
mod templates;

// Document model and styling
mod report_model;
mod theme;

// Builders: primitives, tables, document
mod document_builder;
mod table_builder;

// Report composition and DOCX export
mod compose;
mod docx_exporter;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use report_config::ReportConfig;
use std::path::{Path, PathBuf};

/// File name written by `init` and used when no output is configured
const DEFAULT_CONFIG_NAME: &str = "report.toml";
const DEFAULT_OUTPUT_NAME: &str = "report.docx";

/// Main entry point for the retrodoc CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            output,
            verbose,
        } => {
            handle_build_command(config, output, verbose)?;
        }

        Commands::Validate { config, verbose } => {
            handle_validate_command(config, verbose)?;
        }

        Commands::Init {
            path,
            template,
            force,
        } => {
            handle_init_command(path, template, force)?;
        }

        Commands::ListTemplates => {
            handle_list_templates_command();
        }
    }

    Ok(())
}

/// Initialize logging; `RUST_LOG` applies unless verbose raises the level to Info
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

/// Handle the build command
fn handle_build_command(
    config_path: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    init_logging(verbose);

    let config = load_config(&config_path)?;
    let base_dir = config_dir(&config_path);
    let output = resolve_output(output, &config, &base_dir);

    if verbose {
        println!("Config: {}", config_path.display());
        println!("Output: {}", output.display());
    }

    let doc = compose::compose(&config, &base_dir)
        .with_context(|| format!("Failed to compose report from {}", config_path.display()))?;

    if verbose {
        println!("  - {} sections", config.sections.len());
        println!("  - {} tables", doc.table_count());
        println!("  - {} words", doc.word_count());
    }

    docx_exporter::save(&doc, &output)
        .with_context(|| format!("Failed to export DOCX to {}", output.display()))?;

    println!("Saved: {}", output.display());

    Ok(())
}

/// Handle the validate command
fn handle_validate_command(config_path: PathBuf, verbose: bool) -> Result<()> {
    init_logging(verbose);

    println!("Validating report description...");
    println!("Config: {}", config_path.display());

    let config = load_config(&config_path)?;
    let base_dir = config_dir(&config_path);

    if verbose {
        print_section_summary(&config);
    }

    let doc = compose::compose(&config, &base_dir)
        .with_context(|| format!("Failed to compose report from {}", config_path.display()))?;

    println!(
        "✓ {} sections, {} blocks, {} tables, {} words",
        config.sections.len(),
        doc.blocks().len(),
        doc.table_count(),
        doc.word_count()
    );

    Ok(())
}

/// Handle the init command
fn handle_init_command(path: Option<PathBuf>, template: String, force: bool) -> Result<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    let template_info = templates::get_template(&template).with_context(|| {
        format!(
            "Template '{}' not found. Run 'retrodoc list-templates' to see available templates",
            template
        )
    })?;

    templates::parse_template(&template_info)
        .with_context(|| format!("Failed to parse template '{}'", template_info.id))?;

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)
            .with_context(|| format!("Failed to create directory {}", target_dir.display()))?;
    }

    let target = target_dir.join(DEFAULT_CONFIG_NAME);
    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it",
            target.display()
        );
    }

    std::fs::write(&target, template_info.content)
        .with_context(|| format!("Failed to write file {}", target.display()))?;

    println!("✓ Created {} from template: {}", target.display(), template_info.id);
    println!("\nNext steps:");
    println!("  1. Edit {} to describe your report", DEFAULT_CONFIG_NAME);
    println!("  2. Run 'retrodoc build {}' to generate the document", target.display());

    Ok(())
}

/// Handle the list-templates command
fn handle_list_templates_command() {
    println!("Available report templates:\n");

    for template in templates::get_all_templates() {
        println!("  {} - {}", template.id, template.description);
        println!("    Alias: {}", template.alias);
        println!();
    }

    println!("Usage: retrodoc init [path] --template <template>");
}

fn load_config(path: &Path) -> Result<ReportConfig> {
    ReportConfig::load(path)
        .with_context(|| format!("Failed to load report description {}", path.display()))
}

/// Directory that relative paths inside a config file resolve against
fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Pick the output path: command line, then the config's `output`, then the default name
fn resolve_output(cli_output: Option<PathBuf>, config: &ReportConfig, base_dir: &Path) -> PathBuf {
    if let Some(path) = cli_output {
        return path;
    }
    match &config.output {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => base_dir.join(path),
        None => PathBuf::from(DEFAULT_OUTPUT_NAME),
    }
}

/// Print section summary
fn print_section_summary(config: &ReportConfig) {
    println!("\nFound {} sections:", config.sections.len());
    for (index, section) in config.sections.iter().enumerate() {
        let number = config.numbered.then_some(index + 1);
        println!(
            "  {} ({} blocks)",
            compose::section_heading(&section.title, number),
            section.blocks.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        assert_eq!(config_dir(Path::new("report.toml")), PathBuf::from("."));
        assert_eq!(
            config_dir(Path::new("reports/q1/report.toml")),
            PathBuf::from("reports/q1")
        );
    }

    #[test]
    fn test_resolve_output_precedence() {
        let mut config = ReportConfig::default();
        let base = Path::new("reports");

        assert_eq!(
            resolve_output(None, &config, base),
            PathBuf::from(DEFAULT_OUTPUT_NAME)
        );

        config.output = Some(PathBuf::from("retro.docx"));
        assert_eq!(
            resolve_output(None, &config, base),
            PathBuf::from("reports/retro.docx")
        );

        assert_eq!(
            resolve_output(Some(PathBuf::from("cli.docx")), &config, base),
            PathBuf::from("cli.docx")
        );
    }
}
