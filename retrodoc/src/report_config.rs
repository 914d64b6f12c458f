//! Report description loaded from a TOML file

use crate::report_model::{Length, PageSetup};
use crate::theme::ThemeOverrides;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output path (relative paths resolve against the config file's directory)
    pub output: Option<PathBuf>,

    /// Prefix section headings and TOC entries with "1. ", "2. ", ...
    #[serde(default = "default_true")]
    pub numbered: bool,

    /// Page geometry, in points
    #[serde(default)]
    pub page: PageConfig,

    /// Style and palette overrides
    #[serde(default)]
    pub theme: ThemeOverrides,

    /// Cover page lines
    #[serde(default)]
    pub cover: CoverConfig,

    /// Table of contents settings
    #[serde(default)]
    pub toc: TocConfig,

    /// Report sections in output order
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: None,
            numbered: true,
            page: PageConfig::default(),
            theme: ThemeOverrides::default(),
            cover: CoverConfig::default(),
            toc: TocConfig::default(),
            sections: Vec::new(),
        }
    }
}

/// Page size and margins in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_top_pt: f32,
    pub margin_bottom_pt: f32,
    pub margin_left_pt: f32,
    pub margin_right_pt: f32,
}

impl Default for PageConfig {
    /// US Letter, 72pt top/bottom and 60pt side margins
    fn default() -> Self {
        Self {
            width_pt: 612.0,
            height_pt: 792.0,
            margin_top_pt: 72.0,
            margin_bottom_pt: 72.0,
            margin_left_pt: 60.0,
            margin_right_pt: 60.0,
        }
    }
}

impl PageConfig {
    pub fn to_page_setup(self) -> PageSetup {
        PageSetup {
            width: Length::pt(self.width_pt),
            height: Length::pt(self.height_pt),
            margin_top: Length::pt(self.margin_top_pt),
            margin_bottom: Length::pt(self.margin_bottom_pt),
            margin_left: Length::pt(self.margin_left_pt),
            margin_right: Length::pt(self.margin_right_pt),
        }
    }
}

/// Cover page lines; any line left out is skipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    pub enabled: bool,
    pub leading_blank_lines: usize,
    pub context: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub byline: Option<String>,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            leading_blank_lines: 6,
            context: None,
            title: None,
            subtitle: None,
            description: None,
            date: None,
            byline: None,
        }
    }
}

impl CoverConfig {
    /// True when there is at least one line to put on the cover
    pub fn has_content(&self) -> bool {
        [
            &self.context,
            &self.title,
            &self.subtitle,
            &self.description,
            &self.date,
            &self.byline,
        ]
        .iter()
        .any(|line| line.is_some())
    }
}

/// Table of contents settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    pub enabled: bool,
    pub heading: String,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            heading: "Contents".to_string(),
        }
    }
}

/// One top-level report section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Section heading text (without the number)
    pub title: String,

    /// Alternative text for the TOC entry
    pub toc_title: Option<String>,

    /// Paragraph placed directly under the heading
    pub intro: Option<String>,

    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

/// Content block inside a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockConfig {
    /// Body paragraph
    Paragraph { text: String },

    /// Second-level heading
    Subheading { text: String },

    /// Bullet list
    Bullets { items: Vec<BulletItem> },

    /// Table with a header row
    StyledTable {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },

    /// Two-column table of `[key, value]` pairs
    KeyValueTable { pairs: Vec<(String, String)> },

    /// Styled table loaded from a CSV file whose first record is the header
    CsvTable { path: PathBuf },

    /// Empty paragraph
    Blank,

    PageBreak,
}

/// A bullet list item: plain text or a bold prefix followed by text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulletItem {
    Plain(String),
    Prefixed { prefix: String, text: String },
}

impl ReportConfig {
    /// Load a report description from a TOML file
    ///
    /// # Parameters
    /// * `path` - Path to the report .toml file
    ///
    /// # Returns
    /// * `Ok(ReportConfig)` - Successfully loaded configuration
    /// * `Err(ReportConfigError)` - Error reading or parsing the file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReportConfigError> {
        let content = fs::read_to_string(&path).map_err(ReportConfigError::IoError)?;
        Self::parse(&content)
    }

    /// Parse a report description from TOML text
    pub fn parse(content: &str) -> Result<Self, ReportConfigError> {
        toml::from_str(content).map_err(ReportConfigError::ParseError)
    }

    /// Save the report description to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportConfigError> {
        let content = toml::to_string_pretty(self).map_err(ReportConfigError::SerializeError)?;

        fs::write(&path, content).map_err(ReportConfigError::IoError)?;

        Ok(())
    }
}

/// Errors that can occur when loading or saving a report description
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ReportConfigError {
    /// IO error when reading or writing file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// Error serializing to TOML
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for ReportConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ReportConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            ReportConfigError::SerializeError(e) => write!(f, "TOML serialize error: {}", e),
        }
    }
}

impl std::error::Error for ReportConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_example_toml() {
        let toml_content = r##"
output = "out/retro.docx"

[cover]
title = "P1~P4 Projects"
date = "2026-02-18"

[toc]
heading = "Table of Contents"

[[sections]]
title = "Token Costs"
toc_title = "Token cost analysis"
intro = "Token usage per model."

[[sections.blocks]]
kind = "styled_table"
headers = ["Project", "Total"]
rows = [["P1", "$4"], ["P2", "$3.87"]]

[[sections.blocks]]
kind = "subheading"
text = "Model share"

[[sections.blocks]]
kind = "bullets"
items = ["Opus: ~43%", { prefix = "Sonnet: ", text = "~33%" }]

[[sections.blocks]]
kind = "key_value_table"
pairs = [["Symptom", "Large commits"], ["Cause", "Whole modules at once"]]

[[sections.blocks]]
kind = "page_break"
"##;

        let config = ReportConfig::parse(toml_content).unwrap();

        assert_eq!(config.output, Some(PathBuf::from("out/retro.docx")));
        assert!(config.numbered);
        assert_eq!(config.page, PageConfig::default());
        assert!(config.cover.enabled);
        assert_eq!(config.cover.leading_blank_lines, 6);
        assert_eq!(config.cover.title.as_deref(), Some("P1~P4 Projects"));
        assert!(config.toc.enabled);
        assert_eq!(config.toc.heading, "Table of Contents");

        let section = &config.sections[0];
        assert_eq!(section.toc_title.as_deref(), Some("Token cost analysis"));
        assert_eq!(section.blocks.len(), 5);
        assert_eq!(
            section.blocks[2],
            BlockConfig::Bullets {
                items: vec![
                    BulletItem::Plain("Opus: ~43%".to_string()),
                    BulletItem::Prefixed {
                        prefix: "Sonnet: ".to_string(),
                        text: "~33%".to_string()
                    },
                ]
            }
        );
        assert_eq!(
            section.blocks[3],
            BlockConfig::KeyValueTable {
                pairs: vec![
                    ("Symptom".to_string(), "Large commits".to_string()),
                    ("Cause".to_string(), "Whole modules at once".to_string()),
                ]
            }
        );
        assert_eq!(section.blocks[4], BlockConfig::PageBreak);
    }

    #[test]
    fn test_unknown_block_kind_is_rejected() {
        let result = ReportConfig::parse(
            r#"
[[sections]]
title = "X"

[[sections.blocks]]
kind = "chart"
"#,
        );
        assert!(matches!(result, Err(ReportConfigError::ParseError(_))));
    }

    #[test]
    fn test_page_config_to_letter_setup() {
        assert_eq!(PageConfig::default().to_page_setup(), PageSetup::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        let config = ReportConfig {
            output: Some(PathBuf::from("report.docx")),
            numbered: false,
            sections: vec![SectionConfig {
                title: "Summary".to_string(),
                toc_title: Some("Summary of results".to_string()),
                intro: None,
                blocks: vec![
                    BlockConfig::Blank,
                    BlockConfig::KeyValueTable {
                        pairs: vec![("Period".to_string(), "02-17 ~ 02-18".to_string())],
                    },
                ],
            }],
            ..ReportConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = ReportConfig::load(&path).unwrap();

        assert_eq!(loaded.output, config.output);
        assert!(!loaded.numbered);
        assert_eq!(loaded.cover, config.cover);
        assert_eq!(loaded.sections, config.sections);
    }

    #[test]
    fn test_save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.toml");

        let result = ReportConfig::default().save(&path);
        assert!(matches!(result, Err(ReportConfigError::IoError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ReportConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ReportConfigError::IoError(_))));
    }
}
