//! Configuration management for Codex.
//!
//! Parses `codex.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Path values support `${VAR}` and `${VAR:-default}`:
//! - `data.dir`
//! - `build.output_dir`

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override data directory.
    pub data_dir: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override pre-rendering of every configured locale.
    pub prerender_all_locales: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "codex.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data configuration (paths are relative strings from TOML).
    data: DataConfigRaw,
    /// Locale configuration.
    pub i18n: I18nConfig,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,

    /// Resolved data configuration (set after loading).
    #[serde(skip)]
    pub data_resolved: DataConfig,
    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw data configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DataConfigRaw {
    dir: Option<String>,
    cache_enabled: Option<bool>,
}

/// Resolved data configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DataConfig {
    /// Root of the per-locale data directories.
    pub data_dir: PathBuf,
    /// Project directory for codex state (.codex/).
    pub project_dir: PathBuf,
    /// Whether generated pages are cached on disk.
    pub cache_enabled: bool,
}

impl DataConfig {
    /// Cache directory path (.codex/cache/).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }
}

/// Locale configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Locale used when a request does not name one.
    pub default_locale: String,
    /// Locale whose data decides which pages are pre-rendered.
    pub reference_locale: String,
    /// Every locale the site is published in.
    pub locales: Vec<String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_owned(),
            reference_locale: "en".to_owned(),
            locales: vec!["en".to_owned()],
        }
    }
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    output_dir: Option<String>,
    prerender_all_locales: Option<bool>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Directory the pre-rendered pages are written to.
    pub output_dir: PathBuf,
    /// Pre-render every configured locale instead of the default one only.
    pub prerender_all_locales: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`data.dir`").
        field: String,
        /// Error message (e.g., "${`CODEX_DATA`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `codex.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Locales to pre-render at build time.
    ///
    /// The default locale only, unless `prerender_all_locales` is set.
    #[must_use]
    pub fn prerender_locales(&self) -> Vec<String> {
        if self.build_resolved.prerender_all_locales {
            self.i18n.locales.clone()
        } else {
            vec![self.i18n.default_locale.clone()]
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(data_dir) = &settings.data_dir {
            self.data_resolved.data_dir.clone_from(data_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.data_resolved.cache_enabled = cache_enabled;
        }
        if let Some(all) = settings.prerender_all_locales {
            self.build_resolved.prerender_all_locales = all;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            data: DataConfigRaw::default(),
            i18n: I18nConfig::default(),
            build: BuildConfigRaw::default(),
            data_resolved: DataConfig {
                data_dir: base.join("data"),
                project_dir: base.join(".codex"),
                cache_enabled: true,
            },
            build_resolved: BuildConfig {
                output_dir: base.join("out"),
                prerender_all_locales: false,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let i18n = &self.i18n;
        if i18n.locales.is_empty() {
            return Err(ConfigError::Validation(
                "i18n.locales must list at least one locale".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for locale in &i18n.locales {
            if locale.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "i18n.locales cannot contain an empty locale".to_owned(),
                ));
            }
            if !seen.insert(locale.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "i18n.locales lists {locale} more than once"
                )));
            }
        }

        for (field, locale) in [
            ("i18n.default_locale", &i18n.default_locale),
            ("i18n.reference_locale", &i18n.reference_locale),
        ] {
            if !seen.contains(locale.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "{field} {locale} is not listed in i18n.locales"
                )));
            }
        }

        Ok(())
    }

    /// Expand environment variable references in path values.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.data.dir {
            self.data.dir = Some(expand::expand_env(dir, "data.dir")?);
        }
        if let Some(ref dir) = self.build.output_dir {
            self.build.output_dir = Some(expand::expand_env(dir, "build.output_dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.data_resolved = DataConfig {
            data_dir: resolve(self.data.dir.as_deref(), "data"),
            project_dir: config_dir.join(".codex"),
            cache_enabled: self.data.cache_enabled.unwrap_or(true),
        };

        self.build_resolved = BuildConfig {
            output_dir: resolve(self.build.output_dir.as_deref(), "out"),
            prerender_all_locales: self.build.prerender_all_locales.unwrap_or(false),
        };
    }
}
