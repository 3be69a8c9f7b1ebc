//! Reading one content file into a typed item.
//!
//! A file is a YAML front matter block fenced by `---` lines followed by a
//! Markdown body. Textual fields go through a [`TextRenderer`]; the list of
//! fields is fixed per kind so that full loads and incremental reloads
//! format identically.

use super::{
    Article, ContentError, ContentFile, ContentKind, GalleryImage, Item, Map, Poi, Post,
    geo::GeoLayers,
    types::{ArticleMeta, Fingerprint, MapMeta, PoiMeta, PostMeta},
};
use crate::images::ImageSources;
use serde::de::DeserializeOwned;
use std::{fs, io, path::Path};

/// Whether rendered text keeps its paragraph wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// Multi-paragraph body text.
    Block,
    /// Single-line field, the wrapping `<p>` is stripped.
    Inline,
}

/// Markdown to HTML conversion with site-aware link and image rewriting.
pub trait TextRenderer {
    fn render(
        &self,
        markdown: &str,
        lang: &str,
        base_dir: &Path,
        mode: TextMode,
    ) -> Result<String, ContentError>;

    /// Resolve an image reference relative to `base_dir`.
    fn image(&self, src: &str, base_dir: &Path) -> Result<ImageSources, ContentError>;
}

/// Raw front matter and body of one file.
#[derive(Debug)]
pub struct Loaded<T> {
    pub data: T,
    pub body: String,
    pub fingerprint: Fingerprint,
}

/// Hash of the file as it is on disk now.
pub fn fingerprint(path: &Path) -> Result<Fingerprint, ContentError> {
    let bytes = fs::read(path).map_err(|err| ContentError::Io(path.to_path_buf(), err))?;
    Ok(blake3::hash(&bytes))
}

/// Split `---\n<yaml>\n---\n<body>`. A leading BOM and CRLF line endings are accepted.
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Read and parse one file without formatting.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<Loaded<T>, ContentError> {
    let bytes = fs::read(path).map_err(|err| ContentError::Io(path.to_path_buf(), err))?;
    let fingerprint = blake3::hash(&bytes);
    let text = String::from_utf8(bytes).map_err(|err| {
        ContentError::Io(path.to_path_buf(), io::Error::new(io::ErrorKind::InvalidData, err))
    })?;

    let (yaml, body) =
        split_front_matter(&text).ok_or_else(|| ContentError::MissingFrontMatter(path.to_path_buf()))?;
    let data = serde_yaml::from_str(yaml).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Loaded {
        data,
        body: body.to_string(),
        fingerprint,
    })
}

/// Load and format one content file into its typed item.
pub fn load_item(file: &ContentFile, renderer: &impl TextRenderer) -> Result<Item, ContentError> {
    let ctx = Formatter {
        renderer,
        lang: &file.lang,
        base_dir: file.path.parent().unwrap_or(Path::new("")),
    };

    let item = match file.kind {
        ContentKind::Article => load(&file.path).and_then(|l| ctx.article(&file.name, l)),
        ContentKind::Post => load(&file.path).and_then(|l| ctx.post(&file.name, l)),
        ContentKind::Poi => load(&file.path).and_then(|l| ctx.poi(&file.name, l)),
        ContentKind::Map => load(&file.path).and_then(|l| ctx.map(&file.name, l)),
    };
    item.map_err(|err| err.in_file(&file.path))
}

// ============================================================================
// Per-kind formatting
// ============================================================================

struct Formatter<'a, R> {
    renderer: &'a R,
    lang: &'a str,
    base_dir: &'a Path,
}

impl<R: TextRenderer> Formatter<'_, R> {
    fn block(&self, text: &str) -> Result<String, ContentError> {
        self.renderer
            .render(text, self.lang, self.base_dir, TextMode::Block)
    }

    fn inline(&self, text: &str) -> Result<String, ContentError> {
        self.renderer
            .render(text, self.lang, self.base_dir, TextMode::Inline)
    }

    fn inline_opt(&self, field: &mut Option<String>) -> Result<(), ContentError> {
        if let Some(text) = field {
            *text = self.inline(text)?;
        }
        Ok(())
    }

    fn article(&self, name: &str, loaded: Loaded<ArticleMeta>) -> Result<Item, ContentError> {
        Ok(Item::Article(Article {
            name: name.to_string(),
            content: self.block(&loaded.body)?,
            data: loaded.data,
            fingerprint: loaded.fingerprint,
        }))
    }

    fn post(&self, name: &str, loaded: Loaded<PostMeta>) -> Result<Item, ContentError> {
        let mut data = loaded.data;
        self.inline_opt(&mut data.description)?;
        self.inline_opt(&mut data.title_image_caption)?;
        if let Some(geo) = &mut data.geo {
            let tags = match geo {
                super::OneOrMany::One(tag) => std::slice::from_mut(tag),
                super::OneOrMany::Many(tags) => tags.as_mut_slice(),
            };
            for tag in tags {
                self.inline_opt(&mut tag.subtitle)?;
                self.inline_opt(&mut tag.description)?;
            }
        }

        Ok(Item::Post(Post {
            name: name.to_string(),
            content: self.block(&loaded.body)?,
            data,
            prev: None,
            next: None,
            fingerprint: loaded.fingerprint,
        }))
    }

    fn poi(&self, name: &str, loaded: Loaded<PoiMeta>) -> Result<Item, ContentError> {
        let mut data = loaded.data;
        self.inline_opt(&mut data.subtitle)?;
        self.inline_opt(&mut data.description)?;
        self.inline_opt(&mut data.address)?;
        self.inline_opt(&mut data.season_description)?;
        self.inline_opt(&mut data.access_description)?;
        for value in data.more.values_mut() {
            *value = self.inline(value)?;
        }
        data.external_links = std::mem::take(&mut data.external_links)
            .into_iter()
            .map(|(title, url)| Ok::<_, ContentError>((self.inline(&title)?, url)))
            .collect::<Result<_, ContentError>>()?;

        let gallery_prepared = data
            .gallery
            .iter()
            .map(|entry| {
                let sources = self.renderer.image(entry.url(), self.base_dir)?;
                Ok::<_, ContentError>(GalleryImage {
                    src_set: sources.src_set(),
                    original: sources.x1,
                    fullscreen: sources.orig,
                    thumbnail: sources.thumb,
                    description: entry.title().map(str::to_string),
                })
            })
            .collect::<Result<_, ContentError>>()?;

        Ok(Item::Poi(Poi {
            name: name.to_string(),
            content: self.block(&loaded.body)?,
            data,
            geo_jsons: GeoLayers::default(),
            gallery_prepared,
            fingerprint: loaded.fingerprint,
        }))
    }

    fn map(&self, name: &str, loaded: Loaded<MapMeta>) -> Result<Item, ContentError> {
        Ok(Item::Map(Map {
            name: name.to_string(),
            content: self.block(&loaded.body)?,
            data: loaded.data,
            geo_jsons: GeoLayers::default(),
            fingerprint: loaded.fingerprint,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{classify, testing::PlainRenderer};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, text: &str) -> PathBuf {
        let path = dir.path().join(rel);
        fs::write(&path, text).unwrap();
        path
    }

    fn file(path: &Path) -> ContentFile {
        classify(path, &["en".to_string(), "fi".to_string()])
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_split_front_matter() {
        let (yaml, body) = split_front_matter("---\ntitle: A\n---\nHello\n").unwrap();
        assert_eq!(yaml, "title: A\n");
        assert_eq!(body, "Hello\n");
    }

    #[test]
    fn test_split_front_matter_bom_and_crlf() {
        let (yaml, body) = split_front_matter("\u{feff}---\r\ntitle: A\r\n---\r\nHi").unwrap();
        assert_eq!(yaml, "title: A\r\n");
        assert_eq!(body, "Hi");
    }

    #[test]
    fn test_split_front_matter_missing() {
        assert!(split_front_matter("title: A\n").is_none());
        assert!(split_front_matter("---\ntitle: A\n").is_none());
    }

    #[test]
    fn test_load_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "x.en.article.md", "---\ntitle: [unclosed\n---\n");
        assert!(matches!(load::<ArticleMeta>(&path), Err(ContentError::Parse { .. })));
    }

    #[test]
    fn test_load_item_poi_formats_fields() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "turku.en.poi.md",
            "---\ntitle: Turku\nlat: 60.45\nlng: 22.26\nzoom: 10\ndescription: Old *capital*\n\
             more:\n  Founded: 13th century\nexternalLinks:\n  Wiki: https://wiki\n\
             gallery:\n  - castle.jpg\n  - {url: cathedral.jpg, title: Cathedral}\n---\nBody text\n",
        );

        let Item::Poi(poi) = load_item(&file(&path), &PlainRenderer).unwrap() else {
            panic!("expected a POI");
        };

        assert_eq!(poi.name, "turku");
        assert_eq!(poi.content, "<p>Body text\n</p>");
        assert_eq!(poi.data.description.as_deref(), Some("[Old *capital*]"));
        assert_eq!(poi.data.more["Founded"], "[13th century]");
        assert_eq!(poi.data.external_links["[Wiki]"], "https://wiki");
        assert_eq!(poi.gallery_prepared.len(), 2);
        assert_eq!(poi.gallery_prepared[0].original, "/castle.1x.jpg");
        assert_eq!(poi.gallery_prepared[0].fullscreen, "/castle.jpg");
        assert_eq!(poi.gallery_prepared[1].description.as_deref(), Some("Cathedral"));
        assert_eq!(poi.fingerprint, fingerprint(&path).unwrap());
    }

    #[test]
    fn test_load_item_post() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "2020-02-01-b.fi.post.md",
            "---\ntitle: B\ncategory: travel\ngeo: {lat: 1, lng: 2, zoom: 5, description: here}\n---\nText",
        );

        let Item::Post(post) = load_item(&file(&path), &PlainRenderer).unwrap() else {
            panic!("expected a post");
        };
        assert_eq!(post.data.category.as_deref(), Some("travel"));
        assert_eq!(post.data.geo_tags()[0].description.as_deref(), Some("[here]"));
        assert_eq!(post.prev, None);
    }

    #[test]
    fn test_load_item_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.en.map.md", "no front matter");

        let err = load_item(&file(&path), &PlainRenderer).unwrap_err();
        assert!(matches!(err.root(), ContentError::MissingFrontMatter(_)));
        assert!(matches!(err, ContentError::InFile { .. }));
    }

    #[test]
    fn test_reload_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.en.article.md", "---\ntitle: A\n---\nSame");
        let first = load_item(&file(&path), &PlainRenderer).unwrap();
        let second = load_item(&file(&path), &PlainRenderer).unwrap();
        assert_eq!(first, second);
    }
}
