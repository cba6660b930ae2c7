//! Static-analysis summary of a source file and a lightweight Python analyzer

use crate::Result;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Names extracted from a source file.
///
/// Matches the JSON shape `{"functions": [...], "classes": [...],
/// "relationships": {"imports": [...]}}`. Every field may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub functions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
    #[serde(default, deserialize_with = "null_as_default")]
    pub imports: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl AnalysisSummary {
    /// Load a summary produced by an external analyzer.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn imports(&self) -> &[String] {
        &self.relationships.imports
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty() && self.imports().is_empty()
    }
}

/// Regex-based analyzer for Python source.
///
/// Not a parser: names inside string literals or docstrings that look like
/// definitions are picked up too.
pub struct CodeAnalyzer {
    function_regex: Regex,
    class_regex: Regex,
    import_regex: Regex,
}

impl CodeAnalyzer {
    pub fn new() -> Result<Self> {
        let function_regex = Regex::new(r"(?m)^[ \t]*(?:async[ \t]+)?def[ \t]+([A-Za-z_]\w*)[ \t]*\(")?;
        let class_regex = Regex::new(r"(?m)^[ \t]*class[ \t]+([A-Za-z_]\w*)")?;
        let import_regex = Regex::new(
            r"(?m)^[ \t]*(?:from[ \t]+([\w.]+)[ \t]+import\b|import[ \t]+([^\n#;]+))",
        )?;

        Ok(Self {
            function_regex,
            class_regex,
            import_regex,
        })
    }

    /// Analyze source text. Names keep first-appearance order without duplicates.
    pub fn analyze(&self, code: &str) -> AnalysisSummary {
        AnalysisSummary {
            functions: Self::collect_names(&self.function_regex, code),
            classes: Self::collect_names(&self.class_regex, code),
            relationships: Relationships {
                imports: self.extract_imports(code),
            },
        }
    }

    fn collect_names(regex: &Regex, code: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        regex
            .captures_iter(code)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    fn extract_imports(&self, code: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut imports = Vec::new();

        for caps in self.import_regex.captures_iter(code) {
            let modules: Vec<&str> = if let Some(from) = caps.get(1) {
                vec![from.as_str()]
            } else if let Some(list) = caps.get(2) {
                // `import a.b as c, d`
                list.as_str()
                    .trim_end_matches('\\')
                    .split(',')
                    .filter_map(|item| item.split_whitespace().next())
                    .collect()
            } else {
                continue;
            };

            for module in modules {
                if seen.insert(module.to_string()) {
                    imports.push(module.to_string());
                }
            }
        }

        imports
    }
}
