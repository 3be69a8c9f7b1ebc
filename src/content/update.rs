//! Applying single-file changes to the published index.
//!
//! # Protocol
//!
//! ```text
//! FileEvent ──► classify ──► not content ─────────────────────► Ignored
//!                  │
//!                  ├── Removed ──► warn, dependents are stale ──► Stale
//!                  │
//!                  └── Added / Changed
//!                        │
//!                        ├── same bytes as indexed ───────────► Unchanged
//!                        │
//!                        ▼
//!                  clone content map + language index
//!                        │  reload item (drafts leave the map),
//!                        │  recompute dependents
//!                        │  (any error: clones dropped, snapshot untouched)
//!                        ▼
//!                  write JSON ──► publish snapshot ───────────► Updated
//! ```
//!
//! | Kind    | Recomputed                                               |
//! |---------|----------------------------------------------------------|
//! | Article | nothing                                                  |
//! | Map     | its own view                                             |
//! | Post    | ordering; global geo + map views if its geo tags changed |
//! | POI     | its subtree paths, global geo, map views, every sub-map  |
//! |         | that contains its old or new path                        |
//!
//! Events must be applied one at a time; the updater is the only writer.

use super::{
    ContentError, ContentFile, ContentKind, ContentMap, Item, LanguageIndex, LoadSettings, SiteIndex,
    classify,
    loader::{self, load_item},
    relations,
};
use crate::{
    images::ImageResolver,
    log,
    output::{self, OutputWriter},
    render::MarkdownRenderer,
};
use anyhow::{Context, Result};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

/// A filesystem change below the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Added(PathBuf),
    Changed(PathBuf),
    Removed(PathBuf),
}

impl FileEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Added(path) | Self::Changed(path) | Self::Removed(path) => path,
        }
    }
}

/// What an event did to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Not a content file.
    Ignored,
    /// Content identical to what is indexed.
    Unchanged,
    /// Content removed; derived data may now reference it.
    Stale,
    Updated(UpdateReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub lang: String,
    pub kind: ContentKind,
    pub name: String,
    /// The item was dropped for being a draft.
    pub draft: bool,
    /// The global projection was recomputed.
    pub geo_changed: bool,
    /// POIs whose JSON snapshot was rewritten.
    pub pois_written: Vec<String>,
    pub maps_refreshed: usize,
}

impl UpdateReport {
    fn new(lang: &str, kind: ContentKind, name: &str, draft: bool) -> Self {
        Self {
            lang: lang.to_string(),
            kind,
            name: name.to_string(),
            draft,
            geo_changed: false,
            pois_written: Vec::new(),
            maps_refreshed: 0,
        }
    }
}

/// Applies file events to a [`SiteIndex`].
pub struct Updater<'a, I, W> {
    site: &'a SiteIndex,
    settings: &'a LoadSettings,
    images: &'a I,
    writer: &'a W,
}

impl<'a, I: ImageResolver, W: OutputWriter> Updater<'a, I, W> {
    pub const fn new(
        site: &'a SiteIndex,
        settings: &'a LoadSettings,
        images: &'a I,
        writer: &'a W,
    ) -> Self {
        Self {
            site,
            settings,
            images,
            writer,
        }
    }

    /// Apply one event. On error the published index is left as it was.
    pub fn handle(&self, event: &FileEvent) -> Result<UpdateOutcome> {
        let path = event.path();
        if path.starts_with(&self.settings.static_dir) {
            return Ok(UpdateOutcome::Ignored);
        }

        let file = match classify(path, &self.settings.languages) {
            Ok(Some(file)) => file,
            Ok(None) => return Ok(UpdateOutcome::Ignored),
            Err(err) => {
                log!("warn"; "ignoring {}: {err}", path.display());
                return Ok(UpdateOutcome::Ignored);
            }
        };

        if let FileEvent::Removed(_) = event {
            log!(
                "warn";
                "{} `{}` ({}) removed, derived data is stale now; restart to rebuild",
                file.kind, file.name, file.lang
            );
            return Ok(UpdateOutcome::Stale);
        }

        self.reload(file)
    }

    fn reload(&self, file: ContentFile) -> Result<UpdateOutcome> {
        let snapshot = self.site.snapshot();
        let current = snapshot
            .language(&file.lang)
            .with_context(|| format!("language `{}` is not indexed", file.lang))?;
        let content = &snapshot.content;

        let fingerprint = loader::fingerprint(&file.path)?;
        let same_path = content.get(&file.lang, file.kind, &file.name) == Some(file.path.as_path());
        if same_path && current.fingerprint(file.kind, &file.name) == Some(fingerprint) {
            return Ok(UpdateOutcome::Unchanged);
        }

        let mut map = ContentMap::clone(content);
        map.insert(file.clone()).map_err(ContentError::from)?;

        let renderer = MarkdownRenderer::new(&map, self.images, &self.settings.languages);
        let item = load_item(&file, &renderer)?;

        let mut next = LanguageIndex::clone(current);
        let report = apply(&mut next, current, item, self.settings.include_drafts)
            .map_err(|err| err.in_file(&file.path))?;

        if report.draft {
            map.remove(&file.lang, file.kind, &file.name);
            if current.contains(file.kind, &file.name) {
                log!(
                    "warn";
                    "{} `{}` ({}) is a draft now, links to it are stale; restart to rebuild",
                    file.kind, file.name, file.lang
                );
            }
        }

        self.persist(&next, &report)?;
        self.site.publish(map, Arc::new(next));

        log!(
            "content";
            "{} `{}` ({}) reloaded{}, {} POI snapshot(s), {} map(s) refreshed",
            report.kind,
            report.name,
            report.lang,
            if report.draft { " as draft" } else { "" },
            report.pois_written.len(),
            report.maps_refreshed
        );
        Ok(UpdateOutcome::Updated(report))
    }

    fn persist(&self, index: &LanguageIndex, report: &UpdateReport) -> Result<()> {
        for name in &report.pois_written {
            if let Some(poi) = index.pois.get(name) {
                output::write_poi_json(self.writer, &index.lang, poi)?;
            }
        }

        match report.kind {
            ContentKind::Post if report.draft => {
                self.writer
                    .remove(&output::post_json_path(&index.lang, &report.name))?;
            }
            ContentKind::Post => {
                if let Some(post) = index.posts.get(&report.name) {
                    output::write_post_json(self.writer, &index.lang, post)?;
                }
            }
            ContentKind::Poi if report.draft => {
                self.writer
                    .remove(&output::poi_json_path(&index.lang, &report.name))?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Put `item` into `next` and recompute what depends on it.
///
/// `prev` is the published snapshot `next` was cloned from.
pub fn apply(
    next: &mut LanguageIndex,
    prev: &LanguageIndex,
    item: Item,
    include_drafts: bool,
) -> Result<UpdateReport, ContentError> {
    let kind = item.kind();
    let name = item.name().to_string();
    let draft = item.is_draft() && !include_drafts;

    if draft {
        next.remove(kind, &name);
        next.drafts.insert((kind, name.clone()));
    } else {
        next.drafts.remove(&(kind, name.clone()));
        next.insert(item);
    }

    let mut report = UpdateReport::new(&next.lang, kind, &name, draft);

    match kind {
        ContentKind::Article => {}

        ContentKind::Map => {
            next.refresh_map(&name);
            report.maps_refreshed = usize::from(next.maps.contains_key(&name));
        }

        ContentKind::Post => {
            relations::order_posts(next);
            let before = relations::geo_signature(prev.posts.get(&name).map(Arc::as_ref));
            let after = relations::geo_signature(next.posts.get(&name).map(Arc::as_ref));
            if before != after {
                next.project_global()?;
                next.refresh_maps();
                report.geo_changed = true;
                report.maps_refreshed = next.maps.len();
            }
        }

        ContentKind::Poi => {
            let old_path = relations::reindex_poi(next, &name)?;
            next.project_global()?;
            next.refresh_maps();

            let mut dependents: BTreeSet<String> = BTreeSet::new();
            if let Some(old) = &old_path {
                dependents.extend(prev.submaps_containing(old));
            }
            if let Some(new) = next.poi_path(&name).map(str::to_string) {
                dependents.extend(next.submaps_containing(&new));
            }
            dependents.retain(|poi| next.pois.contains_key(poi));
            for poi in &dependents {
                next.refresh_submap(poi)?;
            }

            report.geo_changed = true;
            report.maps_refreshed = next.maps.len();
            report.pois_written = dependents.into_iter().collect();
        }
    }

    Ok(report)
}
