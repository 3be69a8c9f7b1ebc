//! Zoom-bucketed GeoJSON layers for the client map.
//!
//! Every geo-tagged entity lands in exactly one of [`BUCKETS`] feature
//! collections; the client shows bucket `n` from zoom level `n` on.
//!
//! ```text
//! minZoom present   → bucket = minZoom            (must be 0..=15)
//! minZoom absent    → bucket = clamp(zoom - 4, 1, 15)
//! ```
//!
//! The global projection covers every POI and every post geo tag of a
//! language. Map views and POI sub-maps are derived from it or from the
//! path index, never loaded independently.

use super::{ContentError, Poi, Post};
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

/// Number of zoom buckets shared with the client map renderer.
pub const BUCKETS: usize = 16;

/// Highest zoom level accepted in front matter.
pub const MAX_ZOOM: i64 = 20;

/// Bucket that map-tagged entities are promoted to on their map.
const TOP_LEVEL_BUCKET: usize = 1;

/// Map name that always shows the whole projection.
pub const INDEX_MAP: &str = "index";

/// Assign the zoom bucket for one entity.
pub fn bucket(entity: &str, zoom: i64, min_zoom: Option<i64>) -> Result<usize, ContentError> {
    if !(0..=MAX_ZOOM).contains(&zoom) {
        return Err(ContentError::InvalidZoom {
            entity: entity.to_string(),
            field: "zoom",
            value: zoom,
            min: 0,
            max: MAX_ZOOM,
        });
    }
    match min_zoom {
        Some(min) if (0..BUCKETS as i64).contains(&min) => Ok(min as usize),
        Some(min) => Err(ContentError::InvalidZoom {
            entity: entity.to_string(),
            field: "minZoom",
            value: min,
            min: 0,
            max: BUCKETS as i64 - 1,
        }),
        None => Ok((zoom - 4).clamp(1, BUCKETS as i64 - 1) as usize),
    }
}

// ============================================================================
// GeoJSON shapes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
enum FeatureTag {
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
enum PointTag {
    Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    #[serde(rename = "type")]
    tag: PointTag,
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
}

impl Point {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self {
            tag: PointTag::Point,
            coordinates: [lng, lat],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub poi_type: Option<String>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_icon_size: Option<Value>,
    /// Set for post geo tags: the post the popup links to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    tag: FeatureTag,
    pub geometry: Point,
    pub id: String,
    pub properties: FeatureProperties,
    /// Map names this feature is shown on at top level.
    #[serde(skip)]
    pub maps: Vec<String>,
}

impl Feature {
    pub fn from_poi(poi: &Poi) -> Self {
        let data = &poi.data;
        Self {
            tag: FeatureTag::Feature,
            geometry: Point::new(data.lat, data.lng),
            id: poi.name.clone(),
            properties: FeatureProperties {
                poi_type: data.poi_type.clone(),
                title: Some(data.title.clone()),
                custom_icon: data.custom_icon.clone(),
                custom_icon_size: data.custom_icon_size.clone(),
                ..Default::default()
            },
            maps: data.map_tags().to_vec(),
        }
    }

    fn from_post_tag(post: &Post, index: usize) -> Option<Self> {
        let tag = post.data.geo_tags().get(index)?;
        Some(Self {
            tag: FeatureTag::Feature,
            geometry: Point::new(tag.lat, tag.lng),
            id: format!("{}#{index}", post.name),
            properties: FeatureProperties {
                title: tag.title.clone().or_else(|| Some(post.data.title.clone())),
                custom_icon: tag.icon.clone(),
                post: Some(post.name.clone()),
                anchor: tag.anchor.clone(),
                ..Default::default()
            },
            maps: tag.maps.clone(),
        })
    }

    pub fn is_poi(&self) -> bool {
        self.properties.post.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    tag: CollectionTag,
    pub features: Vec<Feature>,
}

/// One feature collection per zoom bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeoLayers(pub [FeatureCollection; BUCKETS]);

impl GeoLayers {
    fn push(&mut self, bucket: usize, feature: Feature) {
        self.0[bucket].features.push(feature);
    }

    /// `(bucket, feature)` pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Feature)> {
        self.0
            .iter()
            .enumerate()
            .flat_map(|(bucket, fc)| fc.features.iter().map(move |f| (bucket, f)))
    }
}

#[cfg(test)]
impl GeoLayers {
    pub fn len(&self) -> usize {
        self.0.iter().map(|fc| fc.features.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bucket holding the feature with this id.
    pub fn bucket_of(&self, id: &str) -> Option<usize> {
        self.iter().find(|(_, f)| f.id == id).map(|(bucket, _)| bucket)
    }
}

// ============================================================================
// Projections
// ============================================================================

/// Bucket for a POI.
pub fn poi_bucket(poi: &Poi) -> Result<usize, ContentError> {
    bucket(&poi.name, poi.data.zoom, poi.data.min_zoom)
}

/// Project POIs only. Used for POI sub-maps.
pub fn project_pois<'a>(pois: impl IntoIterator<Item = &'a Poi>) -> Result<GeoLayers, ContentError> {
    project(pois, [])
}

/// Unfiltered projection of POIs (in the given order) and post geo tags.
pub fn project<'a>(
    pois: impl IntoIterator<Item = &'a Poi>,
    posts: impl IntoIterator<Item = &'a Post>,
) -> Result<GeoLayers, ContentError> {
    let mut layers = GeoLayers::default();

    for poi in pois {
        layers.push(poi_bucket(poi)?, Feature::from_poi(poi));
    }

    for post in posts {
        for (i, tag) in post.data.geo_tags().iter().enumerate() {
            let id = format!("{}#{i}", post.name);
            let slot = bucket(&id, tag.zoom, tag.min_zoom)?;
            if let Some(feature) = Feature::from_post_tag(post, i) {
                layers.push(slot, feature);
            }
        }
    }

    Ok(layers)
}

/// Derive a map's layers from the global projection.
///
/// `index` shows everything. Other maps show features tagged with the map
/// name, promoted to the top-level bucket, then POIs whose type is listed in
/// `poi_types` at their own bucket. A feature matching both keeps its own
/// bucket.
pub fn map_view(global: &GeoLayers, map_name: &str, poi_types: &[String]) -> GeoLayers {
    if map_name == INDEX_MAP {
        return global.clone();
    }

    let mut selected: Vec<(usize, &Feature)> = Vec::new();
    let mut position: FxHashMap<&str, usize> = FxHashMap::default();

    for (_, feature) in global.iter() {
        if feature.maps.iter().any(|m| m == map_name) {
            position.insert(&feature.id, selected.len());
            selected.push((TOP_LEVEL_BUCKET, feature));
        }
    }

    if !poi_types.is_empty() {
        for (bucket, feature) in global.iter() {
            let by_type = feature.is_poi()
                && feature
                    .properties
                    .poi_type
                    .as_ref()
                    .is_some_and(|t| poi_types.contains(t));
            if !by_type {
                continue;
            }
            match position.get(feature.id.as_str()) {
                Some(&idx) => selected[idx] = (bucket, feature),
                None => {
                    position.insert(&feature.id, selected.len());
                    selected.push((bucket, feature));
                }
            }
        }
    }

    let mut layers = GeoLayers::default();
    for (bucket, feature) in selected {
        layers.push(bucket, feature.clone());
    }
    layers
}
