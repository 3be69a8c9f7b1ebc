//! `[base]` section configuration.
//!
//! Site identity used in page headers and RSS channels.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `[base]` section in fennica.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "Encyclopaedia Fennica"
/// author = "Alice"
/// url = "https://fennica.example.org"
///
/// [base.rss_description]
/// en = "Finland and the Nordics."
/// fi = "Suomi ja Pohjoismaat."
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site title displayed in browser tab, headers and feeds.
    #[serde(default = "defaults::base::title")]
    #[educe(Default = defaults::base::title())]
    pub title: String,

    /// Author name, appended to the copyright line.
    #[serde(default = "defaults::base::author")]
    #[educe(Default = defaults::base::author())]
    pub author: String,

    /// Public base URL for absolute links in RSS.
    /// Required when `[build.rss].enable = true`.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: Option<String>,

    /// Copyright prefix, e.g. "© 2015-2022".
    #[serde(default = "defaults::base::copyright")]
    #[educe(Default = defaults::base::copyright())]
    pub copyright: String,

    #[serde(default = "defaults::base::favicon")]
    #[educe(Default = defaults::base::favicon())]
    pub favicon: String,

    /// Channel description per language code.
    #[serde(default = "defaults::base::rss_description")]
    #[educe(Default = defaults::base::rss_description())]
    pub rss_description: BTreeMap<String, String>,
}

impl BaseConfig {
    /// Full copyright line, e.g. "© 2015-2022 Alice".
    pub fn copyright_line(&self) -> String {
        format!("{} {}", self.copyright, self.author)
    }

    /// Description for one language, falling back to the title.
    pub fn description_for(&self, lang: &str) -> &str {
        self.rss_description
            .get(lang)
            .map_or(self.title.as_str(), String::as_str)
    }
}
