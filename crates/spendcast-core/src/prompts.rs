//! Prompt for narrative generation
//!
//! The prompt is loaded with a two-layer resolution:
//! 1. Check for an override in the data dir
//!    (~/.local/share/spendcast/prompts/spending_narrative.md)
//! 2. Fall back to the embedded default (compiled into binary)
//!
//! Prompt files carry a `# System` and a `# User` section; `{{var}}`
//! placeholders in the user section are substituted at render time.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::AnalysisContext;
use crate::error::{Error, Result};
use crate::models::SpendingSummary;

const SPENDING_NARRATIVE: &str = include_str!("../../../prompts/spending_narrative.md");
const PROMPT_FILE: &str = "spending_narrative.md";

/// A loaded prompt
#[derive(Debug, Clone)]
pub struct Prompt {
    content: String,
    /// Path of the override file this prompt came from, if any
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Embedded default prompt
    pub fn embedded() -> Self {
        Self {
            content: SPENDING_NARRATIVE.to_string(),
            override_path: None,
        }
    }

    /// Load the override from `dir` if present, else the embedded default
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = dir {
            let path = dir.join(PROMPT_FILE);
            if path.exists() {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read prompt override: {}", e))
                })?;
                if extract_section(&content, "# User").is_none() {
                    return Err(Error::Config(format!(
                        "Prompt override {} has no '# User' section",
                        path.display()
                    )));
                }
                return Ok(Self {
                    content,
                    override_path: Some(path),
                });
            }
        }
        Ok(Self::embedded())
    }

    /// Load from the default override directory
    pub fn load_default() -> Self {
        Self::load(default_prompts_dir().as_deref()).unwrap_or_else(|e| {
            tracing::warn!("{}; using embedded prompt", e);
            Self::embedded()
        })
    }

    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the user section with `{{var}}` placeholders replaced
    ///
    /// Placeholders without a value are removed.
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        let mut result = self.user_section().unwrap_or(&self.content).to_string();
        for (key, value) in vars {
            let pattern = format!("{{{{{}}}}}", key);
            result = result.replace(&pattern, value);
        }
        remove_placeholders(&result)
    }

    /// Render the narrative request for a spending summary
    pub fn render_narrative(&self, summary: &SpendingSummary, context: &AnalysisContext) -> String {
        let categories = category_table(summary);
        let types = expense_type_table(summary);
        let context_block = context.to_prompt_block();

        let mut vars = HashMap::new();
        vars.insert("category_table", categories.as_str());
        vars.insert("expense_type_table", types.as_str());
        vars.insert("context_block", context_block.as_str());
        vars.insert("language", context.language());
        self.render_user(&vars)
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendcast").join("prompts"))
}

/// Text between `header` and the next top-level `# ` header
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)? + header.len();
    let rest = &content[start..];
    let end = rest.find("\n# ").unwrap_or(rest.len());
    Some(rest[..end].trim())
}

fn remove_placeholders(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("{{") {
        match rest[start..].find("}}") {
            Some(end) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + end + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Fixed-width table of category sum/mean/count
pub fn category_table(summary: &SpendingSummary) -> String {
    let width = summary
        .categories
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .max("category".len());

    let mut lines = vec![format!(
        "{:width$}  {:>12}  {:>12}  {:>6}",
        "category",
        "sum",
        "mean",
        "count",
        width = width
    )];
    for (name, stat) in &summary.categories {
        lines.push(format!(
            "{:width$}  {:>12.2}  {:>12.2}  {:>6}",
            name,
            stat.sum,
            stat.mean,
            stat.count,
            width = width
        ));
    }
    lines.join("\n")
}

/// Fixed-width table of expense-type sums
pub fn expense_type_table(summary: &SpendingSummary) -> String {
    let width = summary
        .expense_types
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .max("expense_type".len());

    let mut lines = vec![format!("{:width$}  {:>12}", "expense_type", "sum", width = width)];
    for (name, stat) in &summary.expense_types {
        lines.push(format!("{:width$}  {:>12.2}", name, stat.sum, width = width));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryStat, TypeStat};

    fn summary() -> SpendingSummary {
        let mut summary = SpendingSummary::default();
        summary.categories.insert(
            "Food".into(),
            CategoryStat {
                sum: 157.43,
                mean: 52.48,
                count: 3,
            },
        );
        summary
            .expense_types
            .insert("variable".into(), TypeStat { sum: 157.43 });
        summary
    }

    #[test]
    fn test_embedded_prompt_sections() {
        let prompt = Prompt::embedded();
        assert!(prompt.system_section().unwrap().contains("financial analyst"));
        assert!(prompt.user_section().unwrap().contains("{{category_table}}"));
        assert!(!prompt.user_section().unwrap().contains("# System"));
    }

    #[test]
    fn test_render_narrative_fills_tables() {
        let prompt = Prompt::embedded();
        let context = AnalysisContext::new(Some("retail".into()), None).with_language("Spanish");
        let rendered = prompt.render_narrative(&summary(), &context);

        assert!(rendered.contains("Food"));
        assert!(rendered.contains("157.43"));
        assert!(rendered.contains("variable"));
        assert!(rendered.contains("Sector: retail"));
        assert!(rendered.contains("in Spanish as JSON"));
        assert!(rendered.contains("\"recommendations\""));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_unfilled_placeholders_are_removed() {
        let prompt = Prompt::embedded();
        let rendered = prompt.render_user(&HashMap::new());
        assert!(!rendered.contains("{{context_block}}"));
        assert!(!rendered.contains("{{category_table}}"));
    }

    #[test]
    fn test_override_prompt_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROMPT_FILE),
            "# System\nBe brief.\n\n# User\nCategories:\n{{category_table}}\n",
        )
        .unwrap();

        let prompt = Prompt::load(Some(dir.path())).unwrap();
        assert!(prompt.override_path.is_some());
        assert_eq!(prompt.system_section(), Some("Be brief."));
        assert!(prompt
            .render_narrative(&summary(), &AnalysisContext::default())
            .contains("Food"));
    }

    #[test]
    fn test_override_without_user_section_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROMPT_FILE), "just text").unwrap();
        assert!(matches!(
            Prompt::load(Some(dir.path())),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_override_dir_uses_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = Prompt::load(Some(dir.path())).unwrap();
        assert!(prompt.override_path.is_none());
    }

    #[test]
    fn test_category_table_layout() {
        let table = category_table(&summary());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("category"));
        assert!(lines[1].starts_with("Food"));
        assert!(lines[1].trim_end().ends_with('3'));
    }
}
