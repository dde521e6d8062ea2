//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod logging;
mod output;
mod storage;
mod survey;

pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use storage::FileStorageConfig;
pub use survey::FileSurveyConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration problems detected by [`FileConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("survey.focus_budget cannot be 0")]
    ZeroFocusBudget,

    #[error("survey.focus_rank_limit cannot be 0")]
    ZeroRankLimit,

    #[error("storage.mirror_dir must differ from the data directory")]
    MirrorIsDataDir,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Local storage and mirror locations
    pub storage: FileStorageConfig,
    /// Focus selection and seeding
    pub survey: FileSurveyConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Diagnostic and activity logs
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.survey.focus_budget == 0 {
            issues.push(ConfigValidationError::ZeroFocusBudget);
        }
        if self.survey.focus_rank_limit == 0 {
            issues.push(ConfigValidationError::ZeroRankLimit);
        }
        if let Some(mirror) = &self.storage.mirror_dir
            && *mirror == self.storage.resolved_data_dir()
        {
            issues.push(ConfigValidationError::MirrorIsDataDir);
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfcheck_domain::{OutputFormat, OwnerScope};
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[storage]
data_dir = "/var/lib/selfcheck"
owner = "alice"
mirror_dir = "/mnt/shared/selfcheck"

[survey]
focus_budget = 20
focus_rank_limit = 5
seed_default = false

[output]
format = "json"
color = false

[logging]
activity_log = false
dir = "/var/log/selfcheck"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.storage.resolved_data_dir(),
            PathBuf::from("/var/lib/selfcheck")
        );
        assert_eq!(config.storage.owner_scope(), OwnerScope::User("alice".into()));
        assert_eq!(config.survey.focus_budget, 20);
        assert_eq!(config.survey.to_behavior().focus_rank_limit, 5);
        assert!(!config.survey.seed_default);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert!(config.logging.activity_log_path(&PathBuf::from("/x")).is_none());
        assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/selfcheck")));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[survey]
focus_budget = 12
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.survey.focus_budget, 12);
        // Defaults should apply
        assert_eq!(config.survey.focus_rank_limit, 3);
        assert!(config.survey.seed_default);
        assert!(config.output.color);
        assert_eq!(config.storage.owner_scope(), OwnerScope::Anonymous);
        assert_eq!(
            config.logging.activity_log_path(&PathBuf::from("/data")),
            Some(PathBuf::from("/data/activity.jsonl"))
        );
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let toml_str = r#"
[storage]
data_dir = "/srv/sc"
mirror_dir = "/srv/sc"

[survey]
focus_budget = 0
focus_rank_limit = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.validate(),
            vec![
                ConfigValidationError::ZeroFocusBudget,
                ConfigValidationError::ZeroRankLimit,
                ConfigValidationError::MirrorIsDataDir,
            ]
        );
    }
}
