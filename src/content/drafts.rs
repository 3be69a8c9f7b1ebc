//! Keeping `draft: true` items out of the site.
//!
//! Drafts are spotted from their front matter alone and dropped from the
//! content map before any body is rendered. Links to them then fail as
//! broken, translation switchers never offer them, and ordering, paths and
//! geo layers never see them. Their names stay on the language index so a
//! child of a draft POI can be reported as such.

use super::{ContentError, ContentFile, ContentKind, ContentMap, loader};
use rayon::prelude::*;
use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

/// Drafts of one language.
pub type DraftSet = BTreeSet<(ContentKind, String)>;

#[derive(Deserialize)]
struct DraftFlag {
    #[serde(default)]
    draft: bool,
}

/// Whether the front matter of `path` marks it as a draft.
pub fn is_draft_file(path: &Path) -> Result<bool, ContentError> {
    Ok(loader::load::<DraftFlag>(path)?.data.draft)
}

/// Drop every draft file from `content`.
///
/// Returns the removed drafts per language.
pub fn trim_drafts(content: &mut ContentMap) -> Result<BTreeMap<String, DraftSet>, ContentError> {
    let files: Vec<ContentFile> = content.files().collect();
    let drafts = files
        .into_par_iter()
        .filter_map(|file| match is_draft_file(&file.path) {
            Ok(true) => Some(Ok(file)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut by_lang: BTreeMap<String, DraftSet> = BTreeMap::new();
    for file in drafts {
        content.remove(&file.lang, file.kind, &file.name);
        by_lang
            .entry(file.lang)
            .or_default()
            .insert((file.kind, file.name));
    }
    Ok(by_lang)
}
