//! Site configuration management for `fennica.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                           |
//! |-------------|---------------------------------------------------|
//! | `[base]`    | Site metadata (title, author, url, feeds)         |
//! | `[build]`   | Paths, languages, drafts, images, RSS             |
//! | `[serve]`   | Development server (port, interface, watch)       |
//! | `[map]`     | Default map viewport and tiles                    |
//!
//! The file is optional: a missing `fennica.toml` means all defaults.

mod base;
mod build;
pub mod defaults;
mod error;
mod map;
mod serve;

pub use error::ConfigError;

use base::BaseConfig;
use build::BuildConfig;
use map::MapConfig;
use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing fennica.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Client map settings
    #[serde(default)]
    pub map: MapConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config named by the CLI (or defaults), apply CLI overrides and validate.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Source directory mirrored verbatim into the output.
    pub fn static_source(&self) -> PathBuf {
        self.build.content.join(&self.build.static_dir)
    }

    /// Base URL without trailing slash, empty if unset.
    pub fn base_url(&self) -> &str {
        self.base
            .url
            .as_deref()
            .map_or("", |url| url.trim_end_matches('/'))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());
        self.update_path_with_root(&root, cli);

        let args = cli.build_args();
        Self::update_option(&mut self.build.drafts, args.drafts.as_ref());
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        self.build.images.force = args.force_images;
        if let Some(url) = &args.base_url {
            self.base.url = Some(url.clone());
        }

        if let Commands::Dev {
            interface,
            port,
            watch,
            ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
            self.base.url = Some(format!(
                "http://{}:{}",
                self.serve.interface, self.serve.port
            ));
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, cli: &Cli) {
        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.build.content.is_dir() {
            bail!(ConfigError::MissingContent(self.build.content.clone()));
        }

        if self.build.languages.is_empty() {
            bail!(ConfigError::Validation(
                "[build.languages] must list at least one language".into()
            ));
        }

        let mut seen = FxHashSet::default();
        if let Some(dup) = self.build.languages.iter().find(|l| !seen.insert(*l)) {
            bail!(ConfigError::Validation(format!(
                "[build.languages] lists `{dup}` twice"
            )));
        }

        if self.build.posts_per_page == 0 {
            bail!(ConfigError::Validation(
                "[build.posts_per_page] must be positive".into()
            ));
        }

        if self.build.images.size == 0 || self.build.images.thumb_size == 0 {
            bail!(ConfigError::Validation(
                "[build.images] sizes must be positive".into()
            ));
        }

        if self.build.rss.enable && self.base.url.is_none() {
            bail!("[base.url] is required for RSS generation");
        }

        if let Some(base_url) = &self.base.url
            && !base_url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn site_with_content() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        dir
    }

    #[test]
    fn test_from_str() {
        let config = SiteConfig::from_str(
            r#"
            [base]
            title = "Fennica"
            url = "https://example.org"
        "#,
        )
        .unwrap();

        assert_eq!(config.base.title, "Fennica");
        assert_eq!(config.base_url(), "https://example.org");
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SiteConfig::from_str("[base\ntitle = 1").is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        assert!(SiteConfig::from_str("[deploy]\nforce = true").is_err());
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let mut config = SiteConfig::default();
        config.base.url = Some("https://example.org/".into());
        assert_eq!(config.base_url(), "https://example.org");
        config.base.url = None;
        assert_eq!(config.base_url(), "");
    }

    #[test]
    fn test_load_without_config_file_uses_defaults() {
        let dir = site_with_content();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["fennica", "-r", root, "generate", "--base-url", "https://x.org"]);

        let config = SiteConfig::load(&cli).unwrap();

        assert_eq!(config.build.languages, vec!["en", "ru", "fi"]);
        assert!(config.build.content.ends_with("content"));
        assert!(config.build.output.is_absolute());
        assert_eq!(config.base_url(), "https://x.org");
    }

    #[test]
    fn test_load_generate_requires_url_for_rss() {
        let dir = site_with_content();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["fennica", "-r", root, "generate"]);

        let err = SiteConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("[base.url]"));
    }

    #[test]
    fn test_load_dev_sets_local_url() {
        let dir = site_with_content();
        fs::write(dir.path().join("fennica.toml"), "[serve]\nport = 9100\n").unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["fennica", "-r", root, "dev", "--drafts"]);

        let config = SiteConfig::load(&cli).unwrap();

        assert_eq!(config.base_url(), "http://127.0.0.1:9100");
        assert!(config.build.drafts);
    }

    #[test]
    fn test_load_missing_content_dir() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["fennica", "-r", root, "dev"]);

        assert!(SiteConfig::load(&cli).is_err());
    }

    #[test]
    fn test_validate_duplicate_language() {
        let dir = site_with_content();
        let mut config = SiteConfig::default();
        config.build.content = dir.path().join("content");
        config.base.url = Some("https://example.org".into());
        config.build.languages = vec!["en".into(), "fi".into(), "en".into()];

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("`en` twice"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let dir = site_with_content();
        let mut config = SiteConfig::default();
        config.build.content = dir.path().join("content");
        config.base.url = Some("example.org".into());

        assert!(config.validate().is_err());
    }
}
