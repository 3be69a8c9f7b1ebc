//! The four content kinds and their per-kind constants.

use serde::Serialize;
use std::fmt;

/// Kind of a content file, taken from the `<type>` part of `<name>.<lang>.<type>.md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Article,
    Post,
    Poi,
    Map,
}

impl ContentKind {
    pub const ALL: [Self; 4] = [Self::Article, Self::Post, Self::Poi, Self::Map];

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "article" => Some(Self::Article),
            "post" => Some(Self::Post),
            "poi" => Some(Self::Poi),
            "map" => Some(Self::Map),
            _ => None,
        }
    }

    /// File name suffix (`poi` in `turku.en.poi.md`).
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Post => "post",
            Self::Poi => "poi",
            Self::Map => "map",
        }
    }

    /// URL segment between language and name. Posts use dated URLs instead.
    pub const fn url_segment(self) -> Option<&'static str> {
        match self {
            Self::Article => Some("article"),
            Self::Post => None,
            Self::Poi => Some("place"),
            Self::Map => Some("map"),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_round_trips_for_all_kinds() {
        for kind in ContentKind::ALL {
            assert_eq!(ContentKind::from_suffix(kind.suffix()), Some(kind));
        }
        assert_eq!(ContentKind::from_suffix("page"), None);
    }

    #[test]
    fn test_url_segment() {
        assert_eq!(ContentKind::Poi.url_segment(), Some("place"));
        assert_eq!(ContentKind::Post.url_segment(), None);
    }
}
