//! Page routes and their URLs.
//!
//! | URL                                   | Route                          |
//! |---------------------------------------|--------------------------------|
//! | `/en/`, `/en/3/`                      | `Blog { category: None, .. }`  |
//! | `/en/category/trips/`, `.../trips/2/` | `Blog { category: Some, .. }`  |
//! | `/en/2020/02/01/helsinki/`            | `Post("2020-02-01-helsinki")`  |
//! | `/en/article/`, `/en/article/about/`  | `Article("index" / "about")`   |
//! | `/en/place/turku/`                    | `Place("turku")`               |
//! | `/en/map/`, `/en/map/lapland/`        | `Map("index" / "lapland")`     |
//! | `/en/rss.xml`                         | `Feed`                         |

use crate::content::{ContentKind, LanguageIndex, PostScope, item_url};

const INDEX: &str = "index";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Paginated post list, pages count from 1.
    Blog {
        category: Option<String>,
        page: usize,
    },
    Post(String),
    Article(String),
    Place(String),
    Map(String),
    Feed,
}

impl Route {
    pub fn blog(page: usize) -> Self {
        Self::Blog {
            category: None,
            page,
        }
    }

    pub fn url(&self, lang: &str, feed: &str) -> String {
        match self {
            Self::Blog { category, page } => {
                let base = match category {
                    Some(category) => format!("/{lang}/category/{}/", urlencoding::encode(category)),
                    None => format!("/{lang}/"),
                };
                if *page <= 1 {
                    base
                } else {
                    format!("{base}{page}/")
                }
            }
            Self::Post(name) => item_url(lang, ContentKind::Post, name),
            Self::Article(name) => item_url(lang, ContentKind::Article, name),
            Self::Place(name) => item_url(lang, ContentKind::Poi, name),
            Self::Map(name) => item_url(lang, ContentKind::Map, name),
            Self::Feed => format!("/{lang}/{feed}"),
        }
    }

    /// Match a request path. Returns the language and the route; whether
    /// the item exists is up to the renderer.
    pub fn parse(path: &str, languages: &[String], feed: &str) -> Option<(String, Self)> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let mut parts = path.trim_matches('/').split('/');
        let lang = parts.next().filter(|l| languages.iter().any(|x| x == l))?;
        let rest: Vec<&str> = parts.filter(|p| !p.is_empty()).collect();
        let trailing_slash = path.ends_with('/');

        let route = match rest.as_slice() {
            [] => Self::blog(1),
            [file] if *file == feed && !trailing_slash => Self::Feed,
            ["article"] => Self::Article(INDEX.into()),
            ["map"] => Self::Map(INDEX.into()),
            [page] => Self::blog(parse_page(page)?),
            ["category", category] => Self::Blog {
                category: Some(decode(category)?),
                page: 1,
            },
            ["category", category, page] => Self::Blog {
                category: Some(decode(category)?),
                page: parse_page(page)?,
            },
            ["article", name] => Self::Article(decode(name)?),
            ["place", name] if !name.ends_with(".json") => Self::Place(decode(name)?),
            ["map", name] => Self::Map(decode(name)?),
            [year, month, day, slug] if is_digits(year, 4) && is_digits(month, 2) && is_digits(day, 2) => {
                Self::Post(format!("{year}-{month}-{day}-{}", decode(slug)?))
            }
            _ => return None,
        };

        // Files like `/en/place/turku.json` fall through to static serving
        if !trailing_slash && !matches!(route, Self::Feed) && !rest.is_empty() {
            return None;
        }
        Some((lang.to_string(), route))
    }

    /// Every route with content in `index`.
    pub fn all(index: &LanguageIndex, per_page: usize, feed: bool) -> Vec<Self> {
        let mut routes = Vec::new();

        let pages = page_count(index.order(PostScope::All).len(), per_page);
        routes.extend((1..=pages).map(Self::blog));
        for (category, posts) in &index.categories {
            routes.extend((1..=page_count(posts.len(), per_page)).map(|page| Self::Blog {
                category: Some(category.clone()),
                page,
            }));
        }

        routes.extend(index.posts.keys().cloned().map(Self::Post));
        routes.extend(index.articles.keys().cloned().map(Self::Article));
        routes.extend(index.pois.keys().cloned().map(Self::Place));
        routes.extend(index.maps.keys().cloned().map(Self::Map));
        if feed {
            routes.push(Self::Feed);
        }
        routes
    }
}

/// Number of blog pages for `posts` posts; an empty blog still has page 1.
pub fn page_count(posts: usize, per_page: usize) -> usize {
    posts.div_ceil(per_page.max(1)).max(1)
}

fn parse_page(s: &str) -> Option<usize> {
    s.parse().ok().filter(|&n| n >= 1)
}

fn decode(s: &str) -> Option<String> {
    urlencoding::decode(s).ok().map(|s| s.into_owned())
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::{poi, post};

    fn langs() -> Vec<String> {
        vec!["en".into(), "fi".into()]
    }

    fn parse(path: &str) -> Option<(String, Route)> {
        Route::parse(path, &langs(), "rss.xml")
    }

    #[test]
    fn test_parse_blog() {
        assert_eq!(parse("/en/"), Some(("en".into(), Route::blog(1))));
        assert_eq!(parse("/fi/3/"), Some(("fi".into(), Route::blog(3))));
        assert_eq!(parse("/en/0/"), None);
        assert_eq!(
            parse("/en/category/trips/2/"),
            Some((
                "en".into(),
                Route::Blog {
                    category: Some("trips".into()),
                    page: 2
                }
            ))
        );
    }

    #[test]
    fn test_parse_items() {
        assert_eq!(
            parse("/en/2020/02/01/helsinki/"),
            Some(("en".into(), Route::Post("2020-02-01-helsinki".into())))
        );
        assert_eq!(parse("/en/article/"), Some(("en".into(), Route::Article("index".into()))));
        assert_eq!(parse("/en/map/"), Some(("en".into(), Route::Map("index".into()))));
        assert_eq!(parse("/en/article/about/"), Some(("en".into(), Route::Article("about".into()))));
        assert_eq!(parse("/en/map/lapland/"), Some(("en".into(), Route::Map("lapland".into()))));
        assert_eq!(parse("/fi/place/turku/"), Some(("fi".into(), Route::Place("turku".into()))));
        assert_eq!(parse("/en/rss.xml"), Some(("en".into(), Route::Feed)));
    }

    #[test]
    fn test_parse_rejects_files_and_unknown() {
        assert_eq!(parse("/en/place/turku.json"), None);
        assert_eq!(parse("/static/logo.png"), None);
        assert_eq!(parse("/de/"), None);
        assert_eq!(parse("/favicon.ico"), None);
        assert_eq!(parse("/en/20/02/01/x/"), None);
    }

    #[test]
    fn test_url_round_trip() {
        for route in [
            Route::blog(1),
            Route::blog(4),
            Route::Blog {
                category: Some("trips".into()),
                page: 2,
            },
            Route::Post("2020-02-01-helsinki".into()),
            Route::Article("about".into()),
            Route::Place("turku".into()),
            Route::Map("index".into()),
            Route::Map("lapland".into()),
            Route::Article("index".into()),
            Route::Feed,
        ] {
            let url = route.url("en", "rss.xml");
            assert_eq!(parse(&url), Some(("en".into(), route)), "{url}");
        }
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 25), 1);
        assert_eq!(page_count(25, 25), 1);
        assert_eq!(page_count(26, 25), 2);
    }

    #[test]
    fn test_all_routes() {
        let mut index = LanguageIndex::new("en");
        index.insert_post(post("2020-01-01-a", Some("trips")));
        index.insert_post(post("2020-01-02-b", None));
        index.insert_post(post("2020-01-03-c", Some("trips")));
        index.insert_poi(poi("turku", None));
        index.rebuild().unwrap();

        let routes = Route::all(&index, 2, true);
        assert!(routes.contains(&Route::blog(1)));
        assert!(routes.contains(&Route::blog(2)));
        assert!(!routes.contains(&Route::blog(3)));
        assert!(routes.contains(&Route::Blog {
            category: Some("trips".into()),
            page: 1
        }));
        assert!(routes.contains(&Route::Place("turku".into())));
        assert!(routes.contains(&Route::Feed));
        assert_eq!(routes.len(), 2 + 1 + 3 + 1 + 1);
    }
}
