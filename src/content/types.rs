//! Front matter schemas and loaded items.
//!
//! Field names follow the camelCase keys used in the Markdown front matter,
//! and the same shape is written to the JSON snapshots read by the client.

use super::{ContentKind, PostName, geo::GeoLayers};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Hash of the source file bytes.
pub type Fingerprint = blake3::Hash;

// ============================================================================
// Shared shapes
// ============================================================================

/// A YAML value that may be written as a single item or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(item) => std::slice::from_ref(item),
            Self::Many(items) => items,
        }
    }
}

/// Gallery entry: a bare path or a path with a caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GalleryEntry {
    Url(String),
    Titled {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
}

impl GalleryEntry {
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Titled { url, .. } => url,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Url(_) => None,
            Self::Titled { title, .. } => title.as_deref(),
        }
    }
}

/// A gallery image with its responsive variants resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub original: String,
    pub fullscreen: String,
    pub src_set: String,
    pub thumbnail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// Front matter
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

/// One geotagged point of a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoTag {
    pub lat: f64,
    pub lng: f64,
    pub zoom: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_image_offset_y: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub title_image_in_text: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_image_caption: Option<String>,
    /// Free-form date shown instead of the one from the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coat_of_arms: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// `[label, link]` pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<OneOrMany<GeoTag>>,
    #[serde(default)]
    pub draft: bool,
}

impl PostMeta {
    pub fn geo_tags(&self) -> &[GeoTag] {
        self.geo.as_ref().map_or(&[], OneOrMany::as_slice)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub zoom: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub poi_type: Option<String>,
    /// Maps on which this POI is shown at top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub more: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub external_links: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<GalleryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon_size: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

impl PoiMeta {
    pub fn map_tags(&self) -> &[String] {
        self.map.as_ref().map_or(&[], OneOrMany::as_slice)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<i64>,
    /// POI types shown on this map regardless of `map` tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poi_types: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub name: String,
    pub data: ArticleMeta,
    pub content: String,
    #[serde(skip)]
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub name: String,
    pub data: PostMeta,
    pub content: String,
    /// Older neighbor in the global ordering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Newer neighbor in the global ordering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip)]
    pub fingerprint: Fingerprint,
}

impl Post {
    /// Date and slug from the name. Names are validated at scan time.
    pub fn post_name(&self) -> Option<PostName<'_>> {
        PostName::parse(&self.name)
    }

    /// Serialized geo payload, used to detect geo-relevant edits.
    pub fn geo_signature(&self) -> String {
        serde_json::to_string(&self.data.geo).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub name: String,
    pub data: PoiMeta,
    pub content: String,
    #[serde(rename = "geoJSONs")]
    pub geo_jsons: GeoLayers,
    pub gallery_prepared: Vec<GalleryImage>,
    #[serde(skip)]
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Map {
    pub name: String,
    pub data: MapMeta,
    pub content: String,
    #[serde(rename = "geoJSONs")]
    pub geo_jsons: GeoLayers,
    #[serde(skip)]
    pub fingerprint: Fingerprint,
}

/// A freshly loaded item of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Article(Article),
    Post(Post),
    Poi(Poi),
    Map(Map),
}

impl Item {
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::Article(_) => ContentKind::Article,
            Self::Post(_) => ContentKind::Post,
            Self::Poi(_) => ContentKind::Poi,
            Self::Map(_) => ContentKind::Map,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Article(a) => &a.name,
            Self::Post(p) => &p.name,
            Self::Poi(p) => &p.name,
            Self::Map(m) => &m.name,
        }
    }

    pub const fn is_draft(&self) -> bool {
        match self {
            Self::Article(a) => a.data.draft,
            Self::Post(p) => p.data.draft,
            Self::Poi(p) => p.data.draft,
            Self::Map(m) => m.data.draft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_meta_single_and_many_geo() {
        let one: PostMeta = serde_yaml::from_str(
            "title: Turku\ngeo:\n  lat: 60.45\n  lng: 22.26\n  zoom: 10\n",
        )
        .unwrap();
        assert_eq!(one.geo_tags().len(), 1);

        let many: PostMeta = serde_yaml::from_str(
            "title: Trip\ngeo:\n  - {lat: 1, lng: 2, zoom: 5}\n  - {lat: 3, lng: 4, zoom: 6, maps: [lapland]}\n",
        )
        .unwrap();
        assert_eq!(many.geo_tags().len(), 2);
        assert_eq!(many.geo_tags()[1].maps, vec!["lapland"]);
    }

    #[test]
    fn test_post_meta_tags_are_pairs() {
        let meta: PostMeta =
            serde_yaml::from_str("title: x\ntags:\n  - [Turku, turku.en.poi.md]\n").unwrap();
        assert_eq!(meta.tags, vec![("Turku".to_string(), "turku.en.poi.md".to_string())]);
    }

    #[test]
    fn test_poi_meta_map_tag_forms() {
        let single: PoiMeta =
            serde_yaml::from_str("title: a\nlat: 1\nlng: 2\nzoom: 8\nmap: lapland\n").unwrap();
        assert_eq!(single.map_tags(), ["lapland"]);

        let list: PoiMeta = serde_yaml::from_str(
            "title: a\nlat: 1\nlng: 2\nzoom: 8\nmap: [lapland, karelia]\ntype: castle\n",
        )
        .unwrap();
        assert_eq!(list.map_tags(), ["lapland", "karelia"]);
        assert_eq!(list.poi_type.as_deref(), Some("castle"));
    }

    #[test]
    fn test_gallery_entry_forms() {
        let meta: PoiMeta = serde_yaml::from_str(
            "title: a\nlat: 1\nlng: 2\nzoom: 8\ngallery:\n  - a.jpg\n  - {url: b.jpg, title: Bridge}\n",
        )
        .unwrap();
        assert_eq!(meta.gallery[0].url(), "a.jpg");
        assert_eq!(meta.gallery[0].title(), None);
        assert_eq!(meta.gallery[1].title(), Some("Bridge"));
    }

    #[test]
    fn test_geo_signature_tracks_geo_only() {
        let mut post = Post {
            name: "2020-01-01-a".into(),
            data: serde_yaml::from_str("title: a\ngeo: {lat: 1, lng: 2, zoom: 5}").unwrap(),
            content: String::new(),
            prev: None,
            next: None,
            fingerprint: blake3::hash(b""),
        };
        let before = post.geo_signature();
        post.data.title = "b".into();
        assert_eq!(post.geo_signature(), before);
        post.data.geo = None;
        assert_ne!(post.geo_signature(), before);
    }

    #[test]
    fn test_article_meta_missing_title_fails() {
        assert!(serde_yaml::from_str::<ArticleMeta>("updated: 2021-01-01").is_err());
    }
}
