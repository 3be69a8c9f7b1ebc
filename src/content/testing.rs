//! Shared fixtures for content tests.

use super::{
    ContentError, LoadSettings, Map, Poi, Post,
    geo::GeoLayers,
    loader::{TextMode, TextRenderer},
    types::{MapMeta, PoiMeta, PostMeta},
};
use crate::images::{ImageResolver, ImageSources};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Wraps blocks in `<p>` and inline text in brackets, no Markdown.
pub struct PlainRenderer;

impl TextRenderer for PlainRenderer {
    fn render(
        &self,
        markdown: &str,
        _lang: &str,
        _base_dir: &Path,
        mode: TextMode,
    ) -> Result<String, ContentError> {
        Ok(match mode {
            TextMode::Block => format!("<p>{markdown}</p>"),
            TextMode::Inline => format!("[{markdown}]"),
        })
    }

    fn image(&self, src: &str, base_dir: &Path) -> Result<ImageSources, ContentError> {
        FakeImages.resolve(src, base_dir)
    }
}

/// Resolves every image to a 677x451 variant set without touching disk.
pub struct FakeImages;

impl ImageResolver for FakeImages {
    fn resolve(&self, src: &str, _base_dir: &Path) -> Result<ImageSources, ContentError> {
        Ok(ImageSources::new(format!("/{}", src.trim_start_matches('/')), 677, 451))
    }
}

pub fn write(root: &Path, rel: &str, text: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, text).unwrap();
    path
}

pub fn settings(root: &Path) -> LoadSettings {
    LoadSettings {
        content_root: root.to_path_buf(),
        static_dir: root.join("static"),
        languages: vec!["en".into(), "ru".into(), "fi".into()],
        include_drafts: false,
    }
}

pub fn poi(name: &str, parent: Option<&str>) -> Poi {
    Poi {
        name: name.into(),
        data: PoiMeta {
            title: name.to_uppercase(),
            parent: parent.map(str::to_string),
            lat: 60.0,
            lng: 24.0,
            zoom: 10,
            ..Default::default()
        },
        content: String::new(),
        geo_jsons: GeoLayers::default(),
        gallery_prepared: Vec::new(),
        fingerprint: blake3::hash(name.as_bytes()),
    }
}

pub fn post(name: &str, category: Option<&str>) -> Post {
    Post {
        name: name.into(),
        data: PostMeta {
            title: name.to_uppercase(),
            category: category.map(str::to_string),
            ..Default::default()
        },
        content: format!("<p>{name}</p>"),
        prev: None,
        next: None,
        fingerprint: blake3::hash(name.as_bytes()),
    }
}

pub fn map(name: &str) -> Map {
    Map {
        name: name.into(),
        data: MapMeta {
            title: name.to_uppercase(),
            ..Default::default()
        },
        content: String::new(),
        geo_jsons: GeoLayers::default(),
        fingerprint: blake3::hash(name.as_bytes()),
    }
}
