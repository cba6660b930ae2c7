//! Prompt construction

use crate::analysis::AnalysisSummary;
use std::fmt;

/// Placeholder rendered for an empty analysis field.
pub const NONE_PLACEHOLDER: &str = "None";

/// Text sent to the completion endpoint. Built once per request, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Format source code and its analysis into a prompt.
pub fn build_prompt(code: &str, analysis: &AnalysisSummary) -> Prompt {
    Prompt(format!(
        "Generate technical documentation for the following Python code:

{}

Analysis:
Functions: {}
Classes: {}
Imports: {}",
        code,
        render_names(&analysis.functions),
        render_names(&analysis.classes),
        render_names(analysis.imports()),
    ))
}

fn render_names(names: &[String]) -> String {
    if names.is_empty() {
        NONE_PLACEHOLDER.to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Relationships;

    #[test]
    fn test_empty_analysis_renders_placeholders() {
        let prompt = build_prompt("x = 1", &AnalysisSummary::default());
        let text = prompt.as_str();

        assert!(text.contains("Functions: None"));
        assert!(text.contains("Classes: None"));
        assert!(text.contains("Imports: None"));
        assert!(!text.contains("[]"));
    }

    #[test]
    fn test_each_missing_field_renders_placeholder() {
        let analysis = AnalysisSummary {
            functions: vec!["run".to_string()],
            classes: Vec::new(),
            relationships: Relationships {
                imports: vec!["os".to_string(), "sys".to_string()],
            },
        };
        let text = build_prompt("def run(): pass", &analysis).to_string();

        assert!(text.contains("Functions: run\n"));
        assert!(text.contains("Classes: None\n"));
        assert!(text.ends_with("Imports: os, sys"));
    }

    #[test]
    fn test_prompt_contains_code_and_is_deterministic() {
        let analysis = AnalysisSummary::from_json(r#"{"classes": ["A"]}"#).unwrap();
        let first = build_prompt("class A: pass", &analysis);
        let second = build_prompt("class A: pass", &analysis);

        assert_eq!(first, second);
        assert!(first.as_str().contains("\n\nclass A: pass\n\n"));
        assert!(first.as_str().contains("Classes: A"));
    }
}
