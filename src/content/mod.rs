//! Content model, loading and indexing.
//!
//! # Pipeline
//!
//! ```text
//! scan (locator) ─► trim_drafts ─► load_item (loader) ─► relations ─► geo
//!                                                                     │
//!         FileEvent ─► Updater (update) ─► same steps, one item ──────┘
//! ```
//!
//! | Module      | Responsibility                                      |
//! |-------------|-----------------------------------------------------|
//! | `locator`   | `<name>.<lang>.<type>.md` discovery, content map    |
//! | `loader`    | front matter + body, per-kind text formatting       |
//! | `relations` | POI paths, post order, categories                   |
//! | `geo`       | zoom buckets, map views                             |
//! | `drafts`    | draft removal before loading                        |
//! | `index`     | per-language index and published snapshots         |
//! | `update`    | single-file incremental updates                     |

mod drafts;
mod error;
pub mod geo;
mod index;
mod kind;
pub mod loader;
mod locator;
pub mod relations;
mod types;
mod update;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ContentError, ScanError};
pub use index::{LanguageIndex, LoadSettings, SiteIndex, load_site};
pub use kind::ContentKind;
pub use locator::{ContentFile, ContentMap, PostName, classify, scan};
pub use relations::PostScope;
pub use types::{Article, GalleryImage, Item, Map, OneOrMany, Poi, Post};
pub use update::{FileEvent, UpdateOutcome, Updater};

/// Site URL of an item.
///
/// ```text
/// post    2020-02-01-helsinki → /en/2020/02/01/helsinki/
/// poi     turku               → /en/place/turku/
/// article index               → /en/article/
/// map     index               → /en/map/
/// ```
pub fn item_url(lang: &str, kind: ContentKind, name: &str) -> String {
    match kind.url_segment() {
        None => PostName::parse(name).map_or_else(|| format!("/{lang}/"), |post| post.url(lang)),
        Some(segment) if name == "index" && kind != ContentKind::Poi => {
            format!("/{lang}/{segment}/")
        }
        Some(segment) => format!("/{lang}/{segment}/{name}/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_urls() {
        assert_eq!(
            item_url("en", ContentKind::Post, "2020-02-01-helsinki"),
            "/en/2020/02/01/helsinki/"
        );
        assert_eq!(item_url("fi", ContentKind::Poi, "turku"), "/fi/place/turku/");
        assert_eq!(item_url("ru", ContentKind::Article, "about"), "/ru/article/about/");
        assert_eq!(item_url("en", ContentKind::Article, "index"), "/en/article/");
        assert_eq!(item_url("en", ContentKind::Map, "index"), "/en/map/");
        assert_eq!(item_url("en", ContentKind::Map, "lapland"), "/en/map/lapland/");
    }
}
