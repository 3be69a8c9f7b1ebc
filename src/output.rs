//! Writing generated files below the output root.
//!
//! Everything generated goes through an [`OutputWriter`] addressed by web
//! path (`/en/place/turku.json`), so the build and the watcher share one
//! code path and tests can capture output in memory.

use crate::{
    content::{Poi, Post},
    utils::minify::{MinifyType, minify},
};
use anyhow::{Context, Result};
use std::{
    fs, io,
    path::PathBuf,
};

pub trait OutputWriter: Sync {
    fn write(&self, web_path: &str, bytes: &[u8]) -> Result<()>;

    /// Removing a file that does not exist is not an error.
    fn remove(&self, web_path: &str) -> Result<()>;
}

/// Writes below a directory, minifying HTML and XML when enabled.
pub struct FsWriter {
    root: PathBuf,
    minify: bool,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>, minify: bool) -> Self {
        Self {
            root: root.into(),
            minify,
        }
    }

    fn target(&self, web_path: &str) -> PathBuf {
        self.root.join(web_path.trim_start_matches('/'))
    }
}

impl OutputWriter for FsWriter {
    fn write(&self, web_path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.target(web_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create `{}`", parent.display()))?;
        }
        let bytes = minify(MinifyType::for_path(web_path, bytes), self.minify);
        fs::write(&target, &*bytes).with_context(|| format!("cannot write `{}`", target.display()))
    }

    fn remove(&self, web_path: &str) -> Result<()> {
        let target = self.target(web_path);
        match fs::remove_file(&target) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => {
                Err(err).with_context(|| format!("cannot remove `{}`", target.display()))
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Paths
// ============================================================================

/// File path of a page URL: `/en/place/turku/` → `/en/place/turku/index.html`.
pub fn page_path(url: &str) -> String {
    if url.ends_with('/') {
        format!("{url}index.html")
    } else {
        url.to_string()
    }
}

pub fn poi_json_path(lang: &str, name: &str) -> String {
    format!("/{lang}/place/{name}.json")
}

pub fn post_json_path(lang: &str, name: &str) -> String {
    format!("/{lang}/json/{name}.json")
}

/// Full POI record for the client map popup.
pub fn write_poi_json(writer: &impl OutputWriter, lang: &str, poi: &Poi) -> Result<()> {
    let json = serde_json::to_vec(poi)?;
    writer.write(&poi_json_path(lang, &poi.name), &json)
}

/// Post front matter for the client map popup.
pub fn write_post_json(writer: &impl OutputWriter, lang: &str, post: &Post) -> Result<()> {
    let json = serde_json::to_vec(&post.data)?;
    writer.write(&post_json_path(lang, &post.name), &json)
}

// ============================================================================
// In-memory writer
// ============================================================================

#[cfg(test)]
pub use memory::MemoryWriter;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::{poi, post};
    use tempfile::TempDir;

    #[test]
    fn test_page_path() {
        assert_eq!(page_path("/en/place/turku/"), "/en/place/turku/index.html");
        assert_eq!(page_path("/en/rss.xml"), "/en/rss.xml");
    }

    #[test]
    fn test_fs_writer_creates_dirs_and_removes() {
        let dir = TempDir::new().unwrap();
        let writer = FsWriter::new(dir.path(), false);

        writer.write("/en/place/turku.json", b"{}").unwrap();
        let file = dir.path().join("en/place/turku.json");
        assert_eq!(fs::read(&file).unwrap(), b"{}");

        writer.remove("/en/place/turku.json").unwrap();
        assert!(!file.exists());
        writer.remove("/en/place/turku.json").unwrap();
    }

    #[test]
    fn test_fs_writer_minifies_html_only() {
        let dir = TempDir::new().unwrap();
        let writer = FsWriter::new(dir.path(), true);
        let html = b"<html>\n  <body>\n    <p>x</p>\n  </body>\n</html>";

        writer.write("/en/index.html", html).unwrap();
        writer.write("/en/a.json", b"{\n  \"a\": 1\n}").unwrap();

        assert!(fs::read(dir.path().join("en/index.html")).unwrap().len() < html.len());
        assert_eq!(fs::read(dir.path().join("en/a.json")).unwrap(), b"{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_poi_json_is_full_record() {
        let writer = MemoryWriter::default();
        write_poi_json(&writer, "fi", &poi("turku", None)).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&writer.get("/fi/place/turku.json").unwrap()).unwrap();
        assert_eq!(json["name"], "turku");
        assert_eq!(json["data"]["title"], "TURKU");
        assert!(json["geoJSONs"].is_array());
    }

    #[test]
    fn test_post_json_is_front_matter() {
        let writer = MemoryWriter::default();
        write_post_json(&writer, "en", &post("2020-01-01-a", Some("trips"))).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&writer.get("/en/json/2020-01-01-a.json").unwrap()).unwrap();
        assert_eq!(json["title"], "2020-01-01-A");
        assert_eq!(json["category"], "trips");
    }
}
