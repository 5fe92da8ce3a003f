/// Templates module for embedded templates
/// Template files are embedded at compile time using include_str! macro
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// GitHub Actions workflow written by the GenerateCI stage
pub fn get_ci_workflow_template() -> &'static str {
    include_str!("../../templates/ci.yml")
}

/// Placeholder test so the generated workflow has something to run
pub fn get_test_stub_template() -> &'static str {
    include_str!("../../templates/test_dummy.py")
}

/// Sample tidysync.yaml written by `tidysync init`
pub fn get_config_template() -> &'static str {
    include_str!("../../templates/tidysync.yaml")
}

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").ok())
        .as_ref()
}

/// `{{name}}` placeholder substitution
#[derive(Debug, Default, Clone)]
pub struct TemplateProcessor {
    values: HashMap<String, String>,
}

impl TemplateProcessor {
    /// Create a new template processor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value for `{{key}}`
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Replace every known placeholder. Unknown placeholders are left untouched.
    pub fn process(&self, template: &str) -> String {
        let Some(pattern) = placeholder_pattern() else {
            return template.to_string();
        };
        pattern
            .replace_all(template, |caps: &Captures| {
                self.values
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_pattern_compiles() {
        assert!(placeholder_pattern().is_some());
    }

    #[test]
    fn test_process_replaces_known_placeholders() {
        let processor = TemplateProcessor::new()
            .with_value("branch", "main")
            .with_value("timestamp", "2024-01-01T00:00:00Z");

        assert_eq!(
            processor.process("push {{branch}} at {{ timestamp }}"),
            "push main at 2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_process_keeps_unknown_placeholders() {
        let processor = TemplateProcessor::new().with_value("branch", "main");
        assert_eq!(processor.process("{{branch}} {{other}}"), "main {{other}}");
    }

    #[test]
    fn test_ci_template_renders_branch() {
        let rendered = TemplateProcessor::new()
            .with_value("branch", "develop")
            .with_value("python_version", "3.12")
            .process(get_ci_workflow_template());

        assert!(rendered.contains("branches: [ develop ]"));
        assert!(rendered.contains("python-version: \"3.12\""));
        assert!(!rendered.contains("{{"));
    }
}
