//! Types shared by text-analysis backends

use serde::{Deserialize, Serialize};

/// Structured commentary on a spending summary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NarrativeAnalysis {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub anomalies: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl NarrativeAnalysis {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.anomalies.is_empty() && self.recommendations.is_empty()
    }
}

/// Commentary returned by a provider, merged verbatim into the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Narrative {
    Structured(NarrativeAnalysis),
    Text(String),
}

impl From<NarrativeAnalysis> for Narrative {
    fn from(analysis: NarrativeAnalysis) -> Self {
        Narrative::Structured(analysis)
    }
}

/// Optional context strings passed along with the summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// Business sector (e.g. "hospitality")
    pub sector: Option<String>,
    /// Region or market (e.g. "Catalonia")
    pub region: Option<String>,
    /// Language the commentary should be written in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl AnalysisContext {
    pub fn new(sector: Option<String>, region: Option<String>) -> Self {
        let clean = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            sector: clean(sector),
            region: clean(region),
            language: None,
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        let language = language.trim();
        if !language.is_empty() {
            self.language = Some(language.to_string());
        }
        self
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("English")
    }

    /// Context lines for the prompt, empty when nothing was given
    pub fn to_prompt_block(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref sector) = self.sector {
            lines.push(format!("Sector: {}", sector));
        }
        if let Some(ref region) = self.region {
            lines.push(format!("Region: {}", region));
        }
        if lines.is_empty() {
            String::new()
        } else {
            format!("\nContext:\n{}\n", lines.join("\n"))
        }
    }
}
