//! Embedded report templates
//!
//! Built-in report descriptions compiled into the binary. `retrodoc init`
//! writes one of these to disk as a starting point.

use crate::report_config::{ReportConfig, ReportConfigError};

/// Template metadata for display and lookup
#[derive(Debug, Clone)]
pub struct TemplateInfo {
    /// Template identifier (e.g., "retrospective-p1-p4")
    pub id: &'static str,
    /// Short alias accepted on the command line
    pub alias: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Template TOML content
    pub content: &'static str,
}

/// Identifier of the template used when none is named
pub const DEFAULT_TEMPLATE: &str = "retrospective-p1-p4";

/// Get all available templates
pub fn get_all_templates() -> Vec<TemplateInfo> {
    vec![TemplateInfo {
        id: "retrospective-p1-p4",
        alias: "retrospective",
        description: "Integrated retrospective for four projects: costs, issues, KPT",
        content: include_str!("templates/retrospective-p1-p4.toml"),
    }]
}

/// Get a template by ID or alias
///
/// # Parameters
/// * `id` - Template identifier or its alias (case-insensitive)
///
/// # Returns
/// * `Some(TemplateInfo)` - Template information if found
/// * `None` - No template found matching the given identifier
pub fn get_template(id: &str) -> Option<TemplateInfo> {
    get_all_templates()
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(id) || t.alias.eq_ignore_ascii_case(id))
}

/// Parse a template into a report description
pub fn parse_template(template_info: &TemplateInfo) -> Result<ReportConfig, ReportConfigError> {
    ReportConfig::parse(template_info.content)
}
