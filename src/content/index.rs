//! In-memory content index.
//!
//! One [`LanguageIndex`] per language. The content map and every language
//! index are published together through one `ArcSwap`, so renderers always
//! see a complete and consistent snapshot.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         SiteIndex                             │
//! │                                                               │
//! │   current: ArcSwap<Snapshot>                                  │
//! │              content: Arc<ContentMap>                         │
//! │              langs:   en → Arc<LanguageIndex>                 │
//! │                       ru → Arc<LanguageIndex>                 │
//! │                       fi → Arc<LanguageIndex>                 │
//! │                                                               │
//! │   ┌────────────┐   ┌────────────┐        ┌────────────────┐   │
//! │   │  server    │   │ generator  │        │    updater     │   │
//! │   │ load_full  │   │ load_full  │        │ clone → edit → │   │
//! │   └────────────┘   └────────────┘        │     store      │   │
//! │                                          └────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items are held in `Arc`s, so cloning a language index for an update is
//! cheap and unchanged items stay shared between snapshots.

use super::{
    Article, ContentError, ContentFile, ContentKind, ContentMap, Item, Map, Poi, Post,
    drafts::{self, DraftSet},
    geo::{self, GeoLayers},
    loader::{TextRenderer, load_item},
    relations::{self, PostScope},
    scan,
    types::Fingerprint,
};
use crate::{config::SiteConfig, images::ImageResolver, log, render::MarkdownRenderer};
use arc_swap::ArcSwap;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
    sync::Arc,
};

// ============================================================================
// Settings
// ============================================================================

/// What the loader needs from the site configuration.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub content_root: PathBuf,
    pub static_dir: PathBuf,
    pub languages: Vec<String>,
    pub include_drafts: bool,
}

impl LoadSettings {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            content_root: config.build.content.clone(),
            static_dir: config.static_source(),
            languages: config.build.languages.clone(),
            include_drafts: config.build.drafts,
        }
    }
}

// ============================================================================
// Language index
// ============================================================================

/// Everything known about one language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageIndex {
    pub lang: String,

    pub articles: BTreeMap<String, Arc<Article>>,
    pub posts: BTreeMap<String, Arc<Post>>,
    pub pois: BTreeMap<String, Arc<Poi>>,
    pub maps: BTreeMap<String, Arc<Map>>,

    /// Post names, newest first.
    pub posts_ordered: Vec<String>,
    /// Category → post names, newest first.
    pub categories: BTreeMap<String, Vec<String>>,

    /// POI path → POI name.
    pub poi_paths: BTreeMap<String, String>,
    /// POI name → POI path.
    pub poi_path_of: FxHashMap<String, String>,

    /// Unfiltered projection of all POIs and post geo tags.
    pub geo: GeoLayers,

    /// Items dropped for being drafts.
    pub drafts: DraftSet,
}

impl LanguageIndex {
    pub fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            ..Default::default()
        }
    }

    pub fn insert(&mut self, item: Item) {
        match item {
            Item::Article(a) => {
                self.articles.insert(a.name.clone(), Arc::new(a));
            }
            Item::Post(p) => self.insert_post(p),
            Item::Poi(p) => self.insert_poi(p),
            Item::Map(m) => {
                self.maps.insert(m.name.clone(), Arc::new(m));
            }
        }
    }

    pub fn insert_post(&mut self, post: Post) {
        self.posts.insert(post.name.clone(), Arc::new(post));
    }

    pub fn insert_poi(&mut self, poi: Poi) {
        self.pois.insert(poi.name.clone(), Arc::new(poi));
    }

    /// Drop an item from its item map. Derived structures are not touched.
    pub fn remove(&mut self, kind: ContentKind, name: &str) -> bool {
        match kind {
            ContentKind::Article => self.articles.remove(name).is_some(),
            ContentKind::Post => self.posts.remove(name).is_some(),
            ContentKind::Poi => self.pois.remove(name).is_some(),
            ContentKind::Map => self.maps.remove(name).is_some(),
        }
    }

    pub fn contains(&self, kind: ContentKind, name: &str) -> bool {
        match kind {
            ContentKind::Article => self.articles.contains_key(name),
            ContentKind::Post => self.posts.contains_key(name),
            ContentKind::Poi => self.pois.contains_key(name),
            ContentKind::Map => self.maps.contains_key(name),
        }
    }

    pub fn fingerprint(&self, kind: ContentKind, name: &str) -> Option<Fingerprint> {
        match kind {
            ContentKind::Article => self.articles.get(name).map(|a| a.fingerprint),
            ContentKind::Post => self.posts.get(name).map(|p| p.fingerprint),
            ContentKind::Poi => self.pois.get(name).map(|p| p.fingerprint),
            ContentKind::Map => self.maps.get(name).map(|m| m.fingerprint),
        }
    }

    // ------------------------------------------------------------------------
    // Derived structures
    // ------------------------------------------------------------------------

    /// Rebuild every derived structure from the item maps.
    pub fn rebuild(&mut self) -> Result<(), ContentError> {
        relations::resolve_poi_paths(self)?;
        relations::order_posts(self);
        self.project_global()?;
        self.refresh_submaps()?;
        self.refresh_maps();
        Ok(())
    }

    /// POIs in path order.
    pub fn pois_by_path(&self) -> impl Iterator<Item = &Poi> {
        self.poi_paths
            .values()
            .filter_map(|name| self.pois.get(name).map(Arc::as_ref))
    }

    /// Posts newest first.
    pub fn posts_in_order(&self) -> impl Iterator<Item = &Post> {
        self.posts_ordered
            .iter()
            .filter_map(|name| self.posts.get(name).map(Arc::as_ref))
    }

    /// Recompute the unfiltered projection.
    pub fn project_global(&mut self) -> Result<(), ContentError> {
        self.geo = geo::project(self.pois_by_path(), self.posts_in_order())?;
        Ok(())
    }

    /// Recompute one map view from the current global projection.
    pub fn refresh_map(&mut self, name: &str) {
        let Some(map) = self.maps.get(name) else {
            return;
        };
        let view = geo::map_view(&self.geo, name, &map.data.poi_types);
        if view != map.geo_jsons
            && let Some(map) = self.maps.get_mut(name)
        {
            Arc::make_mut(map).geo_jsons = view;
        }
    }

    pub fn refresh_maps(&mut self) {
        let names: Vec<String> = self.maps.keys().cloned().collect();
        for name in names {
            self.refresh_map(&name);
        }
    }

    /// POIs shown on the sub-map of `name`: its anchor (parent, or itself
    /// without one) and everything below the anchor.
    pub fn submap_members(&self, name: &str) -> Vec<&Poi> {
        let Some(poi) = self.pois.get(name) else {
            return Vec::new();
        };
        let anchor = poi.data.parent.as_deref().unwrap_or(name);
        let Some(anchor_path) = self.poi_path_of.get(anchor) else {
            return Vec::new();
        };

        std::iter::once(anchor_path.clone())
            .chain(relations::paths_below(&self.poi_paths, anchor_path))
            .filter_map(|path| self.poi_paths.get(&path))
            .filter_map(|name| self.pois.get(name).map(Arc::as_ref))
            .collect()
    }

    /// Names of the POIs whose sub-map contains the POI at `path`.
    ///
    /// A sub-map anchored at `q` contains `path` when `q` is `path` or one of
    /// its ancestors. Anchored at `q` are the direct children of `q`, and `q`
    /// itself when it is a root.
    pub fn submaps_containing(&self, path: &str) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut ancestor = String::new();

        for segment in path.split('/') {
            if ancestor.is_empty() {
                names.insert(segment.to_string());
            } else {
                ancestor.push('/');
            }
            ancestor.push_str(segment);
            names.extend(relations::children(&self.poi_paths, &ancestor));
        }

        names.retain(|name| self.pois.contains_key(name));
        names
    }

    pub fn refresh_submap(&mut self, name: &str) -> Result<(), ContentError> {
        let layers = geo::project_pois(self.submap_members(name))?;
        if let Some(poi) = self.pois.get_mut(name)
            && poi.geo_jsons != layers
        {
            Arc::make_mut(poi).geo_jsons = layers;
        }
        Ok(())
    }

    pub fn refresh_submaps(&mut self) -> Result<(), ContentError> {
        let names: Vec<String> = self.pois.keys().cloned().collect();
        for name in names {
            self.refresh_submap(&name)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Post scopes
    // ------------------------------------------------------------------------

    /// Post names of a scope, newest first.
    pub fn order(&self, scope: PostScope<'_>) -> &[String] {
        match scope {
            PostScope::All => &self.posts_ordered,
            PostScope::Category(category) => self
                .categories
                .get(category)
                .map_or(&[], Vec::as_slice),
        }
    }

    /// `(prev, next)` of a post within a scope.
    pub fn neighbors(&self, scope: PostScope<'_>, name: &str) -> (Option<&str>, Option<&str>) {
        relations::neighbors(self.order(scope), name)
    }

    pub fn poi_path(&self, name: &str) -> Option<&str> {
        self.poi_path_of.get(name).map(String::as_str)
    }
}

/// Load every item of one language and build its derived structures.
///
/// `drafts` were already taken out of `content`.
fn build_language(
    lang: &str,
    content: &ContentMap,
    renderer: &impl TextRenderer,
    drafts: DraftSet,
) -> Result<LanguageIndex, ContentError> {
    let mut index = LanguageIndex::new(lang);
    index.drafts = drafts;

    for kind in ContentKind::ALL {
        for (name, path) in content.entries(lang, kind) {
            let file = ContentFile {
                lang: lang.to_string(),
                kind,
                name: name.to_string(),
                path: path.to_path_buf(),
            };
            index.insert(load_item(&file, renderer)?);
        }
    }

    index.rebuild()?;
    Ok(index)
}

// ============================================================================
// Site index
// ============================================================================

/// The content map and every language index at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub content: Arc<ContentMap>,
    langs: BTreeMap<String, Arc<LanguageIndex>>,
}

impl Snapshot {
    pub fn language(&self, lang: &str) -> Option<&Arc<LanguageIndex>> {
        self.langs.get(lang)
    }
}

/// The published [`Snapshot`].
pub struct SiteIndex {
    current: ArcSwap<Snapshot>,
    languages: Vec<String>,
}

impl SiteIndex {
    pub fn new(content: ContentMap, langs: impl IntoIterator<Item = LanguageIndex>) -> Self {
        let langs: BTreeMap<String, Arc<LanguageIndex>> = langs
            .into_iter()
            .map(|index| (index.lang.clone(), Arc::new(index)))
            .collect();
        Self {
            languages: langs.keys().cloned().collect(),
            current: ArcSwap::from_pointee(Snapshot {
                content: Arc::new(content),
                langs,
            }),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn language(&self, lang: &str) -> Option<Arc<LanguageIndex>> {
        self.current.load().language(lang).cloned()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(String::as_str)
    }

    /// Publish a new content map and language index in one swap.
    ///
    /// Only the updater calls this, so there is no concurrent writer.
    pub fn publish(&self, content: ContentMap, index: Arc<LanguageIndex>) {
        let mut next = Snapshot::clone(&self.current.load());
        next.content = Arc::new(content);
        if let Some(slot) = next.langs.get_mut(&index.lang) {
            *slot = index;
        }
        self.current.store(Arc::new(next));
    }
}

/// Scan the content root and load every language in parallel.
pub fn load_site(settings: &LoadSettings, images: &impl ImageResolver) -> Result<SiteIndex, ContentError> {
    let mut content = scan(
        &settings.content_root,
        &settings.languages,
        &settings.static_dir,
    )?;
    log!("load"; "found {} content files", content.len());

    let mut drafts = if settings.include_drafts {
        BTreeMap::new()
    } else {
        drafts::trim_drafts(&mut content)?
    };
    let skipped: usize = drafts.values().map(BTreeSet::len).sum();
    if skipped > 0 {
        log!("load"; "skipped {skipped} draft(s)");
    }

    let renderer = MarkdownRenderer::new(&content, images, &settings.languages);
    let langs = settings
        .languages
        .iter()
        .map(|lang| (lang, drafts.remove(lang).unwrap_or_default()))
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(lang, drafts)| build_language(lang, &content, &renderer, drafts))
        .collect::<Result<Vec<_>, _>>()?;

    for index in &langs {
        log!(
            "load";
            "{}: {} posts, {} POIs, {} maps, {} articles",
            index.lang,
            index.posts.len(),
            index.pois.len(),
            index.maps.len(),
            index.articles.len()
        );
    }

    Ok(SiteIndex::new(content, langs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::{poi, post};

    fn tree() -> LanguageIndex {
        let mut index = LanguageIndex::new("en");
        index.insert_poi(poi("finland", None));
        index.insert_poi(poi("turku", Some("finland")));
        index.insert_poi(poi("castle", Some("turku")));
        index.insert_poi(poi("cathedral", Some("turku")));
        index.insert_poi(poi("helsinki", Some("finland")));
        index.insert_poi(poi("sweden", None));
        index.rebuild().unwrap();
        index
    }

    fn ids(layers: &GeoLayers) -> Vec<&str> {
        let mut ids: Vec<&str> = layers.iter().map(|(_, f)| f.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_submap_of_leaf_shows_siblings() {
        let index = tree();
        assert_eq!(ids(&index.pois["castle"].geo_jsons), vec!["castle", "cathedral", "turku"]);
    }

    #[test]
    fn test_submap_of_root_shows_subtree() {
        let index = tree();
        assert_eq!(
            ids(&index.pois["finland"].geo_jsons),
            vec!["castle", "cathedral", "finland", "helsinki", "turku"]
        );
        assert_eq!(ids(&index.pois["sweden"].geo_jsons), vec!["sweden"]);
    }

    #[test]
    fn test_submaps_containing() {
        let index = tree();
        let names: Vec<String> = index.submaps_containing("finland/turku/castle").into_iter().collect();
        assert_eq!(names, vec!["castle", "cathedral", "finland", "helsinki", "turku"]);

        for name in &names {
            assert!(index.submap_members(name).iter().any(|p| p.name == "castle"));
        }
        assert!(!index.submap_members("sweden").iter().any(|p| p.name == "castle"));
    }

    #[test]
    fn test_global_projection_covers_pois_and_posts() {
        let mut index = tree();
        let mut p = post("2020-01-01-a", None);
        p.data = serde_yaml::from_str("title: A\ngeo: {lat: 1, lng: 2, zoom: 8}").unwrap();
        index.insert_post(p);
        index.rebuild().unwrap();

        assert_eq!(index.geo.len(), 7);
        assert_eq!(index.geo.bucket_of("2020-01-01-a#0"), Some(4));
    }

    #[test]
    fn test_map_views_follow_global() {
        let mut index = tree();
        let mut map = crate::content::testing::map("lapland");
        map.data.poi_types = vec!["castle".into()];
        index.insert(Item::Map(map));
        let mut castle = (*index.pois["castle"]).clone();
        castle.data.poi_type = Some("castle".into());
        index.insert_poi(castle);
        index.rebuild().unwrap();

        assert_eq!(ids(&index.maps["lapland"].geo_jsons), vec!["castle"]);
    }

    #[test]
    fn test_scoped_neighbors() {
        let mut index = LanguageIndex::new("en");
        index.insert_post(post("2020-01-01-a", Some("travel")));
        index.insert_post(post("2020-02-01-b", None));
        index.insert_post(post("2020-03-01-c", Some("travel")));
        index.rebuild().unwrap();

        assert_eq!(index.neighbors(PostScope::All, "2020-01-01-a"), (None, Some("2020-02-01-b")));
        assert_eq!(
            index.neighbors(PostScope::Category("travel"), "2020-01-01-a"),
            (None, Some("2020-03-01-c"))
        );
        assert!(index.order(PostScope::Category("food")).is_empty());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut index = tree();
        let before = index.clone();
        index.rebuild().unwrap();
        assert_eq!(index, before);
    }
}
