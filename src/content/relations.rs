//! Derived relations between items of one language.
//!
//! # POI paths
//!
//! A POI's path is the chain of names from its root ancestor down to itself:
//!
//! ```text
//! finland            (no parent)   → finland
//! turku     parent: finland        → finland/turku
//! castle    parent: turku          → finland/turku/castle
//! ```
//!
//! Parents are plain names looked up in the index, never pointers, so
//! reloading one POI only needs its own subtree re-resolved.
//!
//! # Post order
//!
//! Posts are ordered by name descending (names start with the date). `next`
//! is the newer neighbor, `prev` the older one. Category orderings are kept
//! as name lists; their neighbor links are derived on demand.

use super::{ContentError, ContentKind, LanguageIndex, Poi, Post};
use rustc_hash::FxHashSet;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

// ============================================================================
// POI paths
// ============================================================================

/// Walk the parent chain of `name` and join it root-first.
///
/// Fails on a parent that is missing, a draft, or already on the chain.
pub fn poi_path(
    pois: &BTreeMap<String, Arc<Poi>>,
    drafts: &BTreeSet<(ContentKind, String)>,
    name: &str,
) -> Result<String, ContentError> {
    let mut chain = vec![name];
    let mut seen = FxHashSet::default();
    seen.insert(name);

    let mut current = name;
    while let Some(parent) = pois.get(current).and_then(|p| p.data.parent.as_deref()) {
        if !seen.insert(parent) {
            let mut cycle: Vec<&str> = chain.clone();
            cycle.push(parent);
            return Err(ContentError::Cycle {
                name: name.to_string(),
                chain: cycle.join(" -> "),
            });
        }
        if !pois.contains_key(parent) {
            let (name, parent) = (current.to_string(), parent.to_string());
            return Err(if drafts.contains(&(ContentKind::Poi, parent.clone())) {
                ContentError::DraftParent { name, parent }
            } else {
                ContentError::UnresolvedParent { name, parent }
            });
        }
        chain.push(parent);
        current = parent;
    }

    chain.reverse();
    Ok(chain.join("/"))
}

/// Resolve the path of every POI in the index from scratch.
pub fn resolve_poi_paths(index: &mut LanguageIndex) -> Result<(), ContentError> {
    index.poi_paths.clear();
    index.poi_path_of.clear();
    for name in index.pois.keys() {
        let path = poi_path(&index.pois, &index.drafts, name)?;
        index.poi_paths.insert(path.clone(), name.clone());
        index.poi_path_of.insert(name.clone(), path);
    }
    Ok(())
}

/// Re-resolve one POI and everything that was below it.
///
/// The stale entries are located through the name → path map and a prefix
/// range over the path index. If `name` is no longer in the index its entry
/// is simply dropped, and any former child fails to resolve.
///
/// Returns the old path of `name`, if it had one.
pub fn reindex_poi(index: &mut LanguageIndex, name: &str) -> Result<Option<String>, ContentError> {
    let mut moved = vec![name.to_string()];
    let old_path = index.poi_path_of.remove(name);

    if let Some(old) = &old_path {
        index.poi_paths.remove(old);
        for path in paths_below(&index.poi_paths, old) {
            if let Some(child) = index.poi_paths.remove(&path) {
                index.poi_path_of.remove(&child);
                moved.push(child);
            }
        }
    }

    for poi in moved {
        if !index.pois.contains_key(&poi) {
            continue;
        }
        let path = poi_path(&index.pois, &index.drafts, &poi)?;
        index.poi_paths.insert(path.clone(), poi.clone());
        index.poi_path_of.insert(poi, path);
    }

    Ok(old_path)
}

/// Every indexed path strictly below `path`, in order.
pub fn paths_below(paths: &BTreeMap<String, String>, path: &str) -> Vec<String> {
    let prefix = format!("{path}/");
    paths
        .range(prefix.clone()..)
        .take_while(|(p, _)| p.starts_with(&prefix))
        .map(|(p, _)| p.clone())
        .collect()
}

/// Names of the POIs directly below `path`.
pub fn children(paths: &BTreeMap<String, String>, path: &str) -> Vec<String> {
    let prefix = format!("{path}/");
    paths
        .range(prefix.clone()..)
        .take_while(|(p, _)| p.starts_with(&prefix))
        .filter(|(p, _)| !p[prefix.len()..].contains('/'))
        .map(|(_, name)| name.clone())
        .collect()
}

// ============================================================================
// Post ordering
// ============================================================================

/// Which ordering a neighbor lookup runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope<'a> {
    All,
    Category(&'a str),
}

/// Order posts by name descending, relink `prev`/`next` and partition by category.
///
/// Posts whose links are already correct are left untouched, so unchanged
/// entries keep sharing their allocation with older snapshots.
pub fn order_posts(index: &mut LanguageIndex) {
    let order: Vec<String> = index.posts.keys().rev().cloned().collect();

    for (k, name) in order.iter().enumerate() {
        let next = k.checked_sub(1).map(|i| order[i].clone());
        let prev = order.get(k + 1).cloned();
        if let Some(post) = index.posts.get_mut(name)
            && (post.next != next || post.prev != prev)
        {
            let post = Arc::make_mut(post);
            post.next = next;
            post.prev = prev;
        }
    }

    let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in &order {
        if let Some(category) = index.posts.get(name).and_then(|p| p.data.category.clone()) {
            categories.entry(category).or_default().push(name.clone());
        }
    }

    index.posts_ordered = order;
    index.categories = categories;
}

/// Neighbors of `name` in an ordering: `(prev, next)`, older then newer.
pub fn neighbors<'a>(order: &'a [String], name: &str) -> (Option<&'a str>, Option<&'a str>) {
    let Some(k) = order.iter().position(|n| n == name) else {
        return (None, None);
    };
    let prev = order.get(k + 1).map(String::as_str);
    let next = k.checked_sub(1).map(|i| order[i].as_str());
    (prev, next)
}

/// Geo payload of a post, `None` for a missing post or one without geo tags.
pub fn geo_signature(post: Option<&Post>) -> Option<String> {
    post.filter(|p| p.data.geo.is_some()).map(Post::geo_signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::{poi, post};

    fn index_with_pois(pois: &[(&str, Option<&str>)]) -> LanguageIndex {
        let mut index = LanguageIndex::new("en");
        for (name, parent) in pois {
            index.insert_poi(poi(name, *parent));
        }
        index
    }

    #[test]
    fn test_paths_resolve_root_first() {
        let mut index = index_with_pois(&[("a", None), ("b", Some("a")), ("c", Some("b"))]);
        resolve_poi_paths(&mut index).unwrap();

        let paths: Vec<(&str, &str)> = index
            .poi_paths
            .iter()
            .map(|(p, n)| (p.as_str(), n.as_str()))
            .collect();
        assert_eq!(paths, vec![("a", "a"), ("a/b", "b"), ("a/b/c", "c")]);
        assert_eq!(index.poi_path_of["c"], "a/b/c");
    }

    #[test]
    fn test_unresolved_parent() {
        let mut index = index_with_pois(&[("b", Some("missing"))]);
        let err = resolve_poi_paths(&mut index).unwrap_err();
        assert!(matches!(err, ContentError::UnresolvedParent { ref parent, .. } if parent == "missing"));
    }

    #[test]
    fn test_draft_parent() {
        let mut index = index_with_pois(&[("b", Some("a"))]);
        index.drafts.insert((ContentKind::Poi, "a".into()));
        assert!(matches!(
            resolve_poi_paths(&mut index),
            Err(ContentError::DraftParent { .. })
        ));
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let mut index = index_with_pois(&[("a", Some("a"))]);
        assert!(matches!(
            resolve_poi_paths(&mut index),
            Err(ContentError::Cycle { .. })
        ));
    }

    #[test]
    fn test_longer_cycle_reports_chain() {
        let index = index_with_pois(&[("a", Some("c")), ("b", Some("a")), ("c", Some("b"))]);
        let err = poi_path(&index.pois, &index.drafts, "a").unwrap_err();
        let ContentError::Cycle { chain, .. } = err else {
            panic!("expected a cycle");
        };
        assert_eq!(chain, "a -> c -> b -> a");
    }

    #[test]
    fn test_reindex_poi_cascades_to_children() {
        let mut index = index_with_pois(&[("a", None), ("b", Some("a")), ("c", Some("b"))]);
        resolve_poi_paths(&mut index).unwrap();

        index.insert_poi(poi("b", None));
        let old = reindex_poi(&mut index, "b").unwrap();

        assert_eq!(old.as_deref(), Some("a/b"));
        assert_eq!(index.poi_path_of["b"], "b");
        assert_eq!(index.poi_path_of["c"], "b/c");
        assert!(!index.poi_paths.contains_key("a/b"));
        assert!(!index.poi_paths.contains_key("a/b/c"));
        assert_eq!(index.poi_paths.len(), 3);
    }

    #[test]
    fn test_reindex_matches_full_resolution() {
        let mut incremental = index_with_pois(&[
            ("a", None),
            ("x", None),
            ("b", Some("a")),
            ("c", Some("b")),
            ("d", Some("b")),
        ]);
        resolve_poi_paths(&mut incremental).unwrap();
        incremental.insert_poi(poi("b", Some("x")));
        reindex_poi(&mut incremental, "b").unwrap();

        let mut full = incremental.clone();
        resolve_poi_paths(&mut full).unwrap();
        assert_eq!(incremental.poi_paths, full.poi_paths);
        assert_eq!(incremental.poi_path_of, full.poi_path_of);
    }

    #[test]
    fn test_paths_below_ignores_similar_prefixes() {
        let mut index = index_with_pois(&[("a", None), ("a-b", None), ("c", Some("a"))]);
        resolve_poi_paths(&mut index).unwrap();
        assert_eq!(paths_below(&index.poi_paths, "a"), vec!["a/c"]);
        assert_eq!(children(&index.poi_paths, "a"), vec!["c"]);
    }

    #[test]
    fn test_order_two_posts() {
        let mut index = LanguageIndex::new("en");
        index.insert_post(post("2020-01-01-a", None));
        index.insert_post(post("2020-02-01-b", None));
        order_posts(&mut index);

        assert_eq!(index.posts_ordered, vec!["2020-02-01-b", "2020-01-01-a"]);
        assert_eq!(index.posts["2020-02-01-b"].prev.as_deref(), Some("2020-01-01-a"));
        assert_eq!(index.posts["2020-02-01-b"].next, None);
        assert_eq!(index.posts["2020-01-01-a"].next.as_deref(), Some("2020-02-01-b"));
        assert_eq!(index.posts["2020-01-01-a"].prev, None);
    }

    #[test]
    fn test_ordering_neighbor_property() {
        let mut index = LanguageIndex::new("en");
        for name in ["2019-05-01-c", "2021-01-01-e", "2020-01-01-a", "2020-02-01-b", "2019-12-31-d"] {
            index.insert_post(post(name, None));
        }
        order_posts(&mut index);

        let order = &index.posts_ordered;
        assert!(order.windows(2).all(|w| w[0] > w[1]));
        for (i, name) in order.iter().enumerate() {
            let p = &index.posts[name];
            if i > 0 {
                assert_eq!(p.next.as_ref(), Some(&order[i - 1]));
            }
            if i + 1 < order.len() {
                assert_eq!(p.prev.as_ref(), Some(&order[i + 1]));
            }
        }
    }

    #[test]
    fn test_category_ordering_is_independent() {
        let mut index = LanguageIndex::new("en");
        index.insert_post(post("2020-01-01-a", Some("travel")));
        index.insert_post(post("2020-02-01-b", None));
        index.insert_post(post("2020-03-01-c", Some("travel")));
        order_posts(&mut index);

        assert_eq!(index.categories["travel"], vec!["2020-03-01-c", "2020-01-01-a"]);

        let all = neighbors(&index.posts_ordered, "2020-03-01-c");
        assert_eq!(all, (Some("2020-02-01-b"), None));
        let travel = neighbors(&index.categories["travel"], "2020-03-01-c");
        assert_eq!(travel, (Some("2020-01-01-a"), None));

        assert_eq!(index.posts["2020-03-01-c"].prev.as_deref(), Some("2020-02-01-b"));
    }

    #[test]
    fn test_reorder_keeps_unchanged_posts_shared() {
        let mut index = LanguageIndex::new("en");
        index.insert_post(post("2020-01-01-a", None));
        index.insert_post(post("2020-02-01-b", None));
        order_posts(&mut index);
        let before = Arc::clone(&index.posts["2020-01-01-a"]);

        order_posts(&mut index);
        assert!(Arc::ptr_eq(&before, &index.posts["2020-01-01-a"]));
    }
}
