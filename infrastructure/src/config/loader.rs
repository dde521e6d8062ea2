//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// Project-level config file names, checked in order.
const PROJECT_FILES: [&str; 2] = ["selfcheck.toml", ".selfcheck.toml"];

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "SELFCHECK_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `SELFCHECK_<SECTION>__<KEY>` (e.g. `SELFCHECK_STORAGE__OWNER`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./selfcheck.toml` or `./.selfcheck.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/selfcheck/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// The merged provider stack behind [`ConfigLoader::load`].
    pub fn figment(config_path: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/selfcheck/config.toml if set,
    /// otherwise falls back to ~/.config/selfcheck/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("selfcheck").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        println!("  [ env ] Environment: {}<SECTION>__<KEY>", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "     " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./selfcheck.toml or ./.selfcheck.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use selfcheck_domain::OwnerScope;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.survey.focus_budget, 10);
        assert!(config.logging.activity_log);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("selfcheck"));
    }

    #[test]
    fn test_project_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "selfcheck.toml",
                r#"
                [storage]
                owner = "alice"

                [survey]
                focus_budget = 15
                focus_rank_limit = 4
                "#,
            )?;
            jail.set_env("SELFCHECK_SURVEY__FOCUS_BUDGET", "25");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;

            assert_eq!(config.storage.owner_scope(), OwnerScope::User("alice".into()));
            assert_eq!(config.survey.focus_budget, 25);
            assert_eq!(config.survey.focus_rank_limit, 4);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_beats_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(".selfcheck.toml", "[output]\ncolor = false\n")?;
            jail.create_file("custom.toml", "[output]\ncolor = true\nformat = \"json\"\n")?;

            let explicit = PathBuf::from("custom.toml");
            let config = ConfigLoader::load(Some(&explicit)).map_err(|e| *e)?;

            assert!(config.output.color);
            assert_eq!(config.output.format, Some(selfcheck_domain::OutputFormat::Json));
            Ok(())
        });
    }
}
