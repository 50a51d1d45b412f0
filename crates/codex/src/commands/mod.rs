//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod page;
pub(crate) mod paths;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use codex_config::{CliSettings, Config};
use codex_data::{DataProvider, TermProvider};
use codex_data_fs::FsProvider;
use codex_site::{FactionRoute, FilePageCache, NullPageCache, PageCache, PageStore};

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use page::PageArgs;
pub(crate) use paths::PathsArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover codex.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory (overrides config).
    #[arg(short, long, env = "CODEX_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable the persistent page cache (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable the persistent page cache.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,
}

impl ConfigArgs {
    /// Load the configuration with these options applied on top.
    pub(crate) fn load(&self, mut settings: CliSettings) -> Result<Config, CliError> {
        settings.data_dir.clone_from(&self.data_dir);
        settings.cache_enabled = self.resolve_cache_enabled();
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }

    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        self.no_cache.then_some(false).or(self.cache)
    }
}

/// Open the faction page store described by `config`.
pub(crate) fn open_store(config: &Config, version: &str) -> Result<PageStore<FactionRoute>, CliError> {
    let provider = Arc::new(
        FsProvider::new(config.data_resolved.data_dir.clone())
            .with_fallback_locale(config.i18n.default_locale.clone()),
    );
    let route = FactionRoute::new(
        Arc::clone(&provider) as Arc<dyn DataProvider>,
        provider as Arc<dyn TermProvider>,
        config.i18n.reference_locale.clone(),
    );

    let cache: Box<dyn PageCache> = if config.data_resolved.cache_enabled {
        ensure_project_dir(&config.data_resolved.project_dir)?;
        let cache_dir = config.data_resolved.cache_dir();
        tracing::debug!(cache_dir = %cache_dir.display(), "Page cache enabled");
        Box::new(FilePageCache::new(cache_dir, version))
    } else {
        tracing::debug!("Page cache disabled");
        Box::new(NullPageCache)
    };

    Ok(PageStore::with_cache(route, cache))
}

/// Ensure the `.codex/` project directory exists with a `.gitignore`.
fn ensure_project_dir(project_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(project_dir)?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        let _ = std::fs::write(&gitignore_path, "# Automatically created by codex\n*\n");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use codex_site::{PageSource, StaticRoute, StaticSiteBuilder};
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_project(root: &Path) -> PathBuf {
        let en = root.join("data/en");
        fs::create_dir_all(&en).unwrap();
        fs::write(
            en.join("factions.json"),
            r#"[{
                "type": "fire",
                "name": "Fire",
                "description": "Burns.",
                "bannerSprite": {"spriteSheet": "/b.png", "x": 0, "y": 0, "width": 8, "height": 8},
                "symbolSprite": {"spriteSheet": "/s.png", "x": 0, "y": 0, "width": 8, "height": 8}
            }]"#,
        )
        .unwrap();
        fs::write(
            en.join("terms.json"),
            r#"{"Common": {"Wielders": "Wielders"}, "Tutorial": {"CodexCategory": {"Units": "Units"}}}"#,
        )
        .unwrap();

        let config_path = root.join("codex.toml");
        fs::write(&config_path, "[data]\ndir = \"data\"\n").unwrap();
        config_path
    }

    fn config_args(config: PathBuf, cache: bool) -> ConfigArgs {
        ConfigArgs {
            config: Some(config),
            data_dir: None,
            cache: None,
            no_cache: !cache,
        }
    }

    #[test]
    fn test_resolve_cache_enabled() {
        let mut args = config_args(PathBuf::from("codex.toml"), true);
        assert_eq!(args.resolve_cache_enabled(), None);

        args.cache = Some(true);
        assert_eq!(args.resolve_cache_enabled(), Some(true));

        args.cache = None;
        args.no_cache = true;
        assert_eq!(args.resolve_cache_enabled(), Some(false));
    }

    #[test]
    fn test_open_store_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_args(write_project(dir.path()), false)
            .load(CliSettings::default())
            .unwrap();

        let store = open_store(&config, "test").unwrap();

        assert_eq!(store.route().reference_locale(), "en");
        assert_eq!(store.route().paths().unwrap().paths.len(), 1);
        let page = store.get("fire", "en").unwrap().found().unwrap();
        assert_eq!(page.props.terms.units, "Units");
        assert!(!dir.path().join(".codex").exists());
    }

    #[test]
    fn test_open_store_with_cache_persists_pages() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_args(write_project(dir.path()), true)
            .load(CliSettings::default())
            .unwrap();

        open_store(&config, "test").unwrap().get("fire", "en").unwrap();
        let reopened = open_store(&config, "test").unwrap();
        let page = reopened.get("fire", "en").unwrap().found().unwrap();

        assert_eq!(page.source, PageSource::Disk);
        assert!(dir.path().join(".codex/.gitignore").is_file());
    }

    fn rename_fire(data_dir: &Path, name: &str) {
        let path = data_dir.join("en/factions.json");
        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, content.replace("\"Fire\"", &format!("\"{name}\""))).unwrap();
    }

    fn build_fire_name(config: &Config, out: &Path) -> (usize, String) {
        let store = open_store(config, "test").unwrap();
        let report = StaticSiteBuilder::new(out.to_path_buf(), vec!["en".to_owned()])
            .build(&store)
            .unwrap();
        let page: serde_json::Value =
            serde_json::from_slice(&fs::read(out.join("en/factions/fire.json")).unwrap()).unwrap();
        let name = page["props"]["faction"]["name"].as_str().unwrap().to_owned();
        (report.generated, name)
    }

    #[test]
    fn test_rebuild_after_data_edit_regenerates_pages() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_args(write_project(dir.path()), true)
            .load(CliSettings::default())
            .unwrap();
        let out = dir.path().join("out");

        assert_eq!(build_fire_name(&config, &out), (1, "Fire".to_owned()));
        assert_eq!(build_fire_name(&config, &out), (0, "Fire".to_owned()));

        rename_fire(&dir.path().join("data"), "Fire Reforged");

        assert_eq!(
            build_fire_name(&config, &out),
            (1, "Fire Reforged".to_owned())
        );
    }

    #[test]
    fn test_rebuild_with_other_data_dir_regenerates_pages() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_project(dir.path());
        let out = dir.path().join("out");

        let config = config_args(config_path.clone(), true)
            .load(CliSettings::default())
            .unwrap();
        assert_eq!(build_fire_name(&config, &out), (1, "Fire".to_owned()));

        let other = tempfile::tempdir().unwrap();
        write_project(other.path());
        rename_fire(&other.path().join("data"), "Flame");
        let mut args = config_args(config_path, true);
        args.data_dir = Some(other.path().join("data"));
        let config = args.load(CliSettings::default()).unwrap();

        assert_eq!(build_fire_name(&config, &out), (1, "Flame".to_owned()));
    }
}
