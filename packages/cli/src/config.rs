use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use workbench_linter::{LintOptions, RuleRegistry};

pub const DEFAULT_CONFIG_NAME: &str = "workbench.config.json";

/// Workbench configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Protocol name used for export envelopes and id seeds
    #[serde(default = "default_protocol_name")]
    pub protocol_name: String,

    /// Directory scanned by `lint` when no input is given
    #[serde(default = "default_schema_dir")]
    pub schema_dir: String,

    #[serde(default)]
    pub lint: LintConfig,

    #[serde(default)]
    pub preview: PreviewConfig,
}

fn default_protocol_name() -> String {
    "protocol".to_string()
}

fn default_schema_dir() -> String {
    "schemas".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintConfig {
    /// Rule names to skip
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    /// JSON table of extra rules, relative to the config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config {}", config_path.display()))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to schema directory
    pub fn get_schema_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.schema_dir)
    }

    /// Linter options: built-in rules, the configured rules file, disabled names
    pub fn lint_options(&self, cwd: &Path) -> anyhow::Result<LintOptions> {
        let mut registry = RuleRegistry::new();
        if let Some(rules_file) = &self.lint.rules_file {
            let path = cwd.join(rules_file);
            let table = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read rules file {}", path.display()))?;
            registry
                .extend_from_json(&table)
                .with_context(|| format!("Invalid rules file {}", path.display()))?;
        }

        Ok(LintOptions {
            registry: Some(registry),
            disabled_rules: self.lint.disabled_rules.clone(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocol_name: default_protocol_name(),
            schema_dir: default_schema_dir(),
            lint: LintConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "protocolName": "Stroke Registry",
            "schemaDir": "protocols",
            "lint": {
                "disabledRules": ["survival-misplaced"],
                "rulesFile": "rules.json"
            },
            "preview": { "pretty": false }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.protocol_name, "Stroke Registry");
        assert_eq!(config.schema_dir, "protocols");
        assert_eq!(config.lint.disabled_rules, vec!["survival-misplaced"]);
        assert_eq!(config.lint.rules_file, Some("rules.json".to_string()));
        assert!(!config.preview.pretty);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.schema_dir, "schemas");
        assert!(config.preview.pretty);
        assert!(config.lint.disabled_rules.is_empty());
    }

    #[test]
    fn test_lint_options_load_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rules.json"),
            r#"[{ "name": "no-imaging", "when": { "categoryIs": "Imaging" }, "reason": "{name}" }]"#,
        )
        .unwrap();

        let config = Config {
            lint: LintConfig {
                disabled_rules: vec!["procedure-under-outcome".to_string()],
                rules_file: Some("rules.json".to_string()),
            },
            ..Config::default()
        };

        let options = config.lint_options(dir.path()).unwrap();
        let registry = options.registry.unwrap();
        assert!(registry.contains("no-imaging"));
        assert_eq!(options.disabled_rules, vec!["procedure-under-outcome"]);

        let missing = Config {
            lint: LintConfig {
                rules_file: Some("nope.json".to_string()),
                ..LintConfig::default()
            },
            ..Config::default()
        };
        assert!(missing.lint_options(dir.path()).is_err());
    }
}
