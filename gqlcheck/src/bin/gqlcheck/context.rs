use anyhow::{Context, Result};
use clap::ValueEnum;
use gqlcheck::{DiffOptions, DiffRule, Severity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for in the current directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".gqlcheck.toml";

/// Lowest severity that makes `diff` exit with a failure status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    #[default]
    Breaking,
    Dangerous,
    Safe,
    /// Never fail on changes
    None,
}

impl FailOn {
    pub fn threshold(self) -> Option<Severity> {
        match self {
            FailOn::Breaking => Some(Severity::Breaking),
            FailOn::Dangerous => Some(Severity::Dangerous),
            FailOn::Safe => Some(Severity::Safe),
            FailOn::None => None,
        }
    }
}

/// Configuration stored in .gqlcheck.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GqlcheckConfig {
    #[serde(default)]
    pub diff: DiffSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffSettings {
    #[serde(default)]
    pub ignore_descriptions: bool,
    #[serde(default)]
    pub ignore_directives: bool,
    #[serde(default)]
    pub rules: Vec<DiffRule>,
    #[serde(default)]
    pub fail_on: FailOn,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct DiffOverrides {
    pub ignore_descriptions: bool,
    pub ignore_directives: bool,
    pub rules: Vec<DiffRule>,
    pub fail_on: Option<FailOn>,
}

impl DiffSettings {
    /// Merge command-line flags over file values. Rules given on the command
    /// line replace the file's rules rather than adding to them.
    pub fn merged(&self, overrides: &DiffOverrides) -> (DiffOptions, FailOn) {
        let rules = if overrides.rules.is_empty() {
            self.rules.clone()
        } else {
            overrides.rules.clone()
        };
        let options = DiffOptions {
            ignore_descriptions: self.ignore_descriptions || overrides.ignore_descriptions,
            ignore_directives: self.ignore_directives || overrides.ignore_directives,
            rules,
        };
        (options, overrides.fail_on.unwrap_or(self.fail_on))
    }
}

/// Loaded configuration and where it came from
pub struct ConfigContext {
    /// Path of the config file, if one was found
    pub config_path: Option<PathBuf>,
    pub config: GqlcheckConfig,
}

impl ConfigContext {
    /// Load the explicit config file if given, otherwise search from the
    /// current directory upwards. No file found means defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let current_dir = std::env::current_dir().context("Failed to get current directory")?;
                Self::find_from(&current_dir)
            }
        }
    }

    /// Find the config file starting from the given directory
    pub fn find_from(start: &Path) -> Result<Self> {
        match Self::find_config_file(start) {
            Some(path) => Self::load(&path),
            None => Ok(Self {
                config_path: None,
                config: GqlcheckConfig::default(),
            }),
        }
    }

    /// Load a specific config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GqlcheckConfig =
            toml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(Self {
            config_path: Some(path.to_path_buf()),
            config,
        })
    }

    fn find_config_file(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}

/// Default config file contents written by `gqlcheck init`
pub fn default_config_toml() -> Result<String> {
    toml::to_string_pretty(&GqlcheckConfig::default()).context("Failed to serialize default config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GqlcheckConfig::default();
        assert!(!config.diff.ignore_descriptions);
        assert!(!config.diff.ignore_directives);
        assert!(config.diff.rules.is_empty());
        assert_eq!(config.diff.fail_on, FailOn::Breaking);
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = default_config_toml().unwrap();
        assert!(toml_str.contains("[diff]"));
        assert!(toml_str.contains("fail_on = \"breaking\""));
        let parsed: GqlcheckConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.diff.fail_on, FailOn::Breaking);
    }

    #[test]
    fn test_parse_rules_and_fail_on() {
        let config: GqlcheckConfig = toml::from_str(
            r#"
            [diff]
            ignore_descriptions = true
            rules = ["safe-unreachable", "suppress-removal-of-deprecated-field"]
            fail_on = "dangerous"
            "#,
        )
        .unwrap();
        assert!(config.diff.ignore_descriptions);
        assert_eq!(
            config.diff.rules,
            vec![DiffRule::SafeUnreachable, DiffRule::SuppressRemovalOfDeprecatedField]
        );
        assert_eq!(config.diff.fail_on.threshold(), Some(Severity::Dangerous));
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let result: Result<GqlcheckConfig, _> = toml::from_str("[diff]\nrules = [\"no-such-rule\"]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let settings = DiffSettings {
            ignore_descriptions: false,
            ignore_directives: true,
            rules: vec![DiffRule::SafeUnreachable],
            fail_on: FailOn::Dangerous,
        };
        let overrides = DiffOverrides {
            ignore_descriptions: true,
            rules: vec![DiffRule::IgnoreDescriptionChanges],
            fail_on: Some(FailOn::None),
            ..Default::default()
        };
        let (options, fail_on) = settings.merged(&overrides);
        assert!(options.ignore_descriptions);
        assert!(options.ignore_directives);
        assert_eq!(options.rules, vec![DiffRule::IgnoreDescriptionChanges]);
        assert_eq!(fail_on, FailOn::None);
        assert_eq!(fail_on.threshold(), None);

        let (options, fail_on) = settings.merged(&DiffOverrides::default());
        assert_eq!(options.rules, vec![DiffRule::SafeUnreachable]);
        assert_eq!(fail_on, FailOn::Dangerous);
    }

    #[test]
    fn test_config_discovered_in_ancestor() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(CONFIG_FILE_NAME), "[diff]\nfail_on = \"safe\"\n").unwrap();
        let nested = root.path().join("services").join("api");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = ConfigContext::find_from(&nested).unwrap();
        assert_eq!(ctx.config_path, Some(root.path().join(CONFIG_FILE_NAME)));
        assert_eq!(ctx.config.diff.fail_on, FailOn::Safe);
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let root = tempfile::tempdir().unwrap();
        assert!(ConfigContext::resolve(Some(&root.path().join("absent.toml"))).is_err());
    }
}
