//! `[build]` section configuration.
//!
//! Paths, languages, draft handling, pagination, image sizes and RSS.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in fennica.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"      # Markdown sources, images and the static dir
/// output = "build"         # Generated site
/// languages = ["en", "fi"]
/// drafts = false
///
/// [build.images]
/// size = 677
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content source directory.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Directory under `content` copied verbatim to `output`; never scanned.
    #[serde(default = "defaults::build::static_dir")]
    #[educe(Default = defaults::build::static_dir())]
    pub static_dir: PathBuf,

    /// Language codes accepted in `<name>.<lang>.<type>.md`.
    #[serde(default = "defaults::build::languages")]
    #[educe(Default = defaults::build::languages())]
    pub languages: Vec<String>,

    /// Keep items marked `draft: true`.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub drafts: bool,

    /// Minify HTML output.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Posts per blog page and per RSS feed.
    #[serde(default = "defaults::build::posts_per_page")]
    #[educe(Default = defaults::build::posts_per_page())]
    pub posts_per_page: usize,

    /// Web path of the client script bundle.
    #[serde(default = "defaults::build::bundle")]
    #[educe(Default = defaults::build::bundle())]
    pub bundle: String,

    /// Web path of the stylesheet.
    #[serde(default = "defaults::build::stylesheet")]
    #[educe(Default = defaults::build::stylesheet())]
    pub stylesheet: String,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub rss: RssConfig,
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.images]` section - responsive variant sizes.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    /// Short-edge size of the `.1x` variant.
    #[serde(default = "defaults::build::images::size")]
    #[educe(Default = defaults::build::images::size())]
    pub size: u32,

    /// Short-edge size of the `.t` thumbnail.
    #[serde(default = "defaults::build::images::thumb_size")]
    #[educe(Default = defaults::build::images::thumb_size())]
    pub thumb_size: u32,

    /// Regenerate variants even if they exist (CLI only).
    #[serde(skip)]
    pub force: bool,
}

/// `[build.rss]` section - per-language RSS feeds.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RssConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Feed file name inside each language directory.
    #[serde(default = "defaults::build::rss::path")]
    #[educe(Default = defaults::build::rss::path())]
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.content, PathBuf::from("content"));
        assert_eq!(config.build.output, PathBuf::from("build"));
        assert_eq!(config.build.static_dir, PathBuf::from("static"));
        assert_eq!(config.build.languages, vec!["en", "ru", "fi"]);
        assert!(!config.build.drafts);
        assert!(!config.build.minify);
        assert_eq!(config.build.posts_per_page, 25);
        assert_eq!(config.build.images.size, 677);
        assert_eq!(config.build.images.thumb_size, 100);
        assert!(config.build.rss.enable);
        assert_eq!(config.build.rss.path, PathBuf::from("rss.xml"));
    }

    #[test]
    fn test_build_config_custom() {
        let config = r#"
            [build]
            content = "src"
            languages = ["fi"]
            drafts = true
            posts_per_page = 10

            [build.images]
            size = 800

            [build.rss]
            enable = false
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.content, PathBuf::from("src"));
        assert_eq!(config.build.languages, vec!["fi"]);
        assert!(config.build.drafts);
        assert_eq!(config.build.posts_per_page, 10);
        assert_eq!(config.build.images.size, 800);
        assert_eq!(config.build.images.thumb_size, 100);
        assert!(!config.build.rss.enable);
    }

    #[test]
    fn test_images_force_not_configurable() {
        let config = r#"
            [build.images]
            force = true
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
