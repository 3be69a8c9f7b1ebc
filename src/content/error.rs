//! Error types for scanning, loading and indexing content.

use super::ContentKind;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Problems with the set of files found under the content root.
///
/// All of these are fatal at startup: they make item identity ambiguous.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot walk content directory")]
    Walk(#[from] walkdir::Error),

    #[error("`{0}` does not follow the <name>.<lang>.<type>.md convention")]
    MalformedName(PathBuf),

    #[error("`{path}`: unknown language `{lang}`")]
    UnknownLanguage { path: PathBuf, lang: String },

    #[error("`{path}`: unknown content type `{kind}`")]
    UnknownKind { path: PathBuf, kind: String },

    #[error("`{0}`: malformed post name, expected YYYY-MM-DD-name.<lang>.post.md")]
    MalformedPostName(PathBuf),

    #[error("duplicate {kind} `{name}` in `{lang}`: `{first}` and `{second}`")]
    Duplicate {
        lang: String,
        kind: ContentKind,
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Problems with one item or with the relations between items.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("`{0}`: no front matter block")]
    MissingFrontMatter(PathBuf),

    #[error("`{path}`: malformed front matter: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("POI `{name}`: circular parent chain {chain}")]
    Cycle { name: String, chain: String },

    #[error("POI `{name}`: parent `{parent}` does not exist")]
    UnresolvedParent { name: String, parent: String },

    #[error("POI `{name}`: parent `{parent}` is a draft")]
    DraftParent { name: String, parent: String },

    #[error("`{entity}`: {field} {value} outside {min}..={max}")]
    InvalidZoom {
        entity: String,
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("broken link to `{0}`")]
    BrokenLink(String),

    #[error("could not resolve image `{src}`, no file at `{path}`")]
    MissingImage { src: String, path: PathBuf },

    #[error("cannot read image size of `{0}`")]
    ImageSize(PathBuf, #[source] image::ImageError),

    #[error("{path}: {error}")]
    InFile {
        path: PathBuf,
        error: Box<ContentError>,
    },

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl ContentError {
    /// Attach the source file to an error raised while processing it.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            already @ Self::InFile { .. } => already,
            error => Self::InFile {
                path: path.into(),
                error: Box::new(error),
            },
        }
    }
}

#[cfg(test)]
impl ContentError {
    /// The error without any file context.
    pub fn root(&self) -> &ContentError {
        match self {
            Self::InFile { error, .. } => error.root(),
            other => other,
        }
    }
}
