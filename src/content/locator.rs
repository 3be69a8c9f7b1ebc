//! Finding content files and resolving them to `(lang, kind, name)`.
//!
//! ```text
//! content/finland/turku/turku.en.poi.md        → (en, poi, turku)
//! content/blog/2020-02-01-helsinki.fi.post.md  → (fi, post, 2020-02-01-helsinki)
//! content/static/logo.png                      → not content (static dir)
//! content/notes.md                             → ScanError::MalformedName
//! ```

use super::{ContentKind, ScanError};
use chrono::NaiveDate;
use regex::Regex;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use walkdir::WalkDir;

static RE_CONTENT_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.([^.]+)\.([^.]+)\.md$").unwrap());

static RE_POST_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(.+)$").unwrap());

// ============================================================================
// Single file
// ============================================================================

/// A recognized content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub lang: String,
    pub kind: ContentKind,
    pub name: String,
    pub path: PathBuf,
}

/// Classify one path.
///
/// Returns `Ok(None)` for anything that is not a `.md` file, and an error for
/// `.md` files that break the naming convention.
pub fn classify(path: &Path, languages: &[String]) -> Result<Option<ContentFile>, ScanError> {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    if !file_name.ends_with(".md") {
        return Ok(None);
    }

    let caps = RE_CONTENT_FILE
        .captures(file_name)
        .ok_or_else(|| ScanError::MalformedName(path.to_path_buf()))?;
    let (name, lang, suffix) = (&caps[1], &caps[2], &caps[3]);

    if !languages.iter().any(|l| l == lang) {
        return Err(ScanError::UnknownLanguage {
            path: path.to_path_buf(),
            lang: lang.to_string(),
        });
    }
    let kind = ContentKind::from_suffix(suffix).ok_or_else(|| ScanError::UnknownKind {
        path: path.to_path_buf(),
        kind: suffix.to_string(),
    })?;
    if kind == ContentKind::Post && PostName::parse(name).is_none() {
        return Err(ScanError::MalformedPostName(path.to_path_buf()));
    }

    Ok(Some(ContentFile {
        lang: lang.to_string(),
        kind,
        name: name.to_string(),
        path: path.to_path_buf(),
    }))
}

// ============================================================================
// Post names
// ============================================================================

/// A post name split into its date and slug parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostName<'a> {
    pub date: NaiveDate,
    pub year: &'a str,
    pub month: &'a str,
    pub day: &'a str,
    pub slug: &'a str,
}

impl<'a> PostName<'a> {
    /// Parse `YYYY-MM-DD-slug`; the date must exist in the calendar.
    pub fn parse(name: &'a str) -> Option<Self> {
        let caps = RE_POST_NAME.captures(name)?;
        let (year, month, day, slug) = (
            caps.get(1)?.as_str(),
            caps.get(2)?.as_str(),
            caps.get(3)?.as_str(),
            caps.get(4)?.as_str(),
        );
        let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
        Some(Self {
            date,
            year,
            month,
            day,
            slug,
        })
    }

    /// `/<lang>/<YYYY>/<MM>/<DD>/<slug>/`
    pub fn url(&self, lang: &str) -> String {
        format!("/{lang}/{}/{}/{}/{}/", self.year, self.month, self.day, self.slug)
    }
}

// ============================================================================
// Content map
// ============================================================================

/// Every recognized content file, per language and kind.
#[derive(Debug, Clone, Default)]
pub struct ContentMap {
    langs: BTreeMap<String, BTreeMap<ContentKind, BTreeMap<String, PathBuf>>>,
}

impl ContentMap {
    /// Empty map with an entry for every configured language.
    pub fn new(languages: &[String]) -> Self {
        let langs = languages
            .iter()
            .map(|lang| (lang.clone(), BTreeMap::new()))
            .collect();
        Self { langs }
    }

    /// Register a file. Registering the same path again is a no-op.
    pub fn insert(&mut self, file: ContentFile) -> Result<(), ScanError> {
        let names = self
            .langs
            .entry(file.lang.clone())
            .or_default()
            .entry(file.kind)
            .or_default();

        match names.get(&file.name) {
            Some(existing) if *existing != file.path => Err(ScanError::Duplicate {
                lang: file.lang,
                kind: file.kind,
                name: file.name,
                first: existing.clone(),
                second: file.path,
            }),
            Some(_) => Ok(()),
            None => {
                names.insert(file.name, file.path);
                Ok(())
            }
        }
    }

    pub fn get(&self, lang: &str, kind: ContentKind, name: &str) -> Option<&Path> {
        self.langs
            .get(lang)?
            .get(&kind)?
            .get(name)
            .map(PathBuf::as_path)
    }

    pub fn contains(&self, lang: &str, kind: ContentKind, name: &str) -> bool {
        self.get(lang, kind, name).is_some()
    }

    pub fn remove(&mut self, lang: &str, kind: ContentKind, name: &str) -> Option<PathBuf> {
        self.langs.get_mut(lang)?.get_mut(&kind)?.remove(name)
    }

    /// Every registered file.
    pub fn files(&self) -> impl Iterator<Item = ContentFile> + '_ {
        self.langs.iter().flat_map(|(lang, kinds)| {
            kinds.iter().flat_map(move |(kind, names)| {
                names.iter().map(move |(name, path)| ContentFile {
                    lang: lang.clone(),
                    kind: *kind,
                    name: name.clone(),
                    path: path.clone(),
                })
            })
        })
    }

    /// Names and paths of one kind in one language, sorted by name.
    pub fn entries(&self, lang: &str, kind: ContentKind) -> impl Iterator<Item = (&str, &Path)> {
        self.langs
            .get(lang)
            .and_then(|kinds| kinds.get(&kind))
            .into_iter()
            .flatten()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Languages in which an item with this kind and name exists.
    pub fn translations(&self, kind: ContentKind, name: &str) -> Vec<&str> {
        self.langs
            .iter()
            .filter(|(_, kinds)| kinds.get(&kind).is_some_and(|names| names.contains_key(name)))
            .map(|(lang, _)| lang.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.langs
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }
}

// ============================================================================
// Scan
// ============================================================================

/// Walk `root` and register every content file.
///
/// Hidden entries and everything under `exclude` (the static dir) are skipped.
pub fn scan(root: &Path, languages: &[String], exclude: &Path) -> Result<ContentMap, ScanError> {
    let mut map = ContentMap::new(languages);

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(is_hidden(e.path()) || e.path().starts_with(exclude)));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(file) = classify(entry.path(), languages)? {
            map.insert(file)?;
        }
    }

    Ok(map)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
