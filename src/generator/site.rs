//! One-shot generation of the whole site.
//!
//! ```text
//! generate()
//!     │
//!     └── per language (snapshot)
//!             ├── Route::all ──► render (parallel) ──► <url>/index.html
//!             ├── POI + post JSON snapshots
//!             └── rss.xml
//! ```

use super::rss::write_feed;
use crate::{
    config::SiteConfig,
    content::{LanguageIndex, SiteIndex},
    log,
    output::{self, OutputWriter},
    render::{self, PageContext, Route},
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts of what [`generate`] wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateReport {
    pub pages: usize,
    pub json: usize,
    pub feeds: usize,
}

/// Render every language of `site` into `writer`.
pub fn generate(config: &SiteConfig, site: &SiteIndex, writer: &impl OutputWriter) -> Result<GenerateReport> {
    let snapshot = site.snapshot();
    let feed = config.build.rss.path.to_string_lossy();
    let mut report = GenerateReport::default();

    for lang in site.languages() {
        let Some(index) = snapshot.language(lang) else {
            continue;
        };
        let ctx = PageContext {
            config,
            content: &snapshot.content,
            index,
        };

        let pages = AtomicUsize::new(0);
        Route::all(index, config.build.posts_per_page, false)
            .par_iter()
            .try_for_each(|route| {
                let url = route.url(lang, &feed);
                if let Some(html) = render::render(&ctx, route) {
                    writer
                        .write(&output::page_path(&url), html.as_bytes())
                        .with_context(|| format!("cannot write page `{url}`"))?;
                    pages.fetch_add(1, Ordering::Relaxed);
                }
                anyhow::Ok(())
            })?;

        let json = write_snapshots(index, writer)?;

        write_feed(config, index, writer)?;
        let feeds = usize::from(config.build.rss.enable);

        let pages = pages.into_inner();
        log!("generate"; "{lang}: {pages} pages, {json} json files");
        report.pages += pages;
        report.json += json;
        report.feeds += feeds;
    }

    Ok(report)
}

/// JSON snapshots of every POI and post in one language. Returns the file count.
pub fn write_snapshots(index: &LanguageIndex, writer: &impl OutputWriter) -> Result<usize> {
    let lang = index.lang.as_str();
    index
        .pois
        .values()
        .par_bridge()
        .try_for_each(|poi| output::write_poi_json(writer, lang, poi))?;
    index
        .posts
        .values()
        .par_bridge()
        .try_for_each(|post| output::write_post_json(writer, lang, post))?;
    Ok(index.pois.len() + index.posts.len())
}
