//! HTML pages.
//!
//! Every page shares [`layout`]; interactive parts (maps, galleries) are
//! emitted as `<div class="__ssr">` placeholders carrying JSON props for the
//! client bundle.

use super::{
    l10n::{format_date, tr},
    route::{Route, page_count},
};
use crate::{
    config::SiteConfig,
    content::{
        Article, ContentKind, ContentMap, LanguageIndex, Map, Poi, Post, PostScope, item_url,
    },
    images::with_variant,
};
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde_json::{Value, json};
use std::sync::Arc;

const COAT_OF_ARMS_SIZE: f64 = 150.0;
const INDEX: &str = "index";

/// What a page needs from the site: config, every content file, one language.
#[derive(Clone, Copy)]
pub struct PageContext<'a> {
    pub config: &'a SiteConfig,
    pub content: &'a ContentMap,
    pub index: &'a LanguageIndex,
}

impl PageContext<'_> {
    fn lang(&self) -> &str {
        &self.index.lang
    }

    fn tr<'k>(&self, key: &'k str) -> &'k str {
        tr(key, self.lang())
    }

    /// `(lang, url)` of every translation of an item.
    fn versions(&self, kind: ContentKind, name: &str) -> Vec<(String, String)> {
        self.content
            .translations(kind, name)
            .into_iter()
            .map(|lang| (lang.to_string(), item_url(lang, kind, name)))
            .collect()
    }

    fn feed_url(&self) -> Option<String> {
        let rss = &self.config.build.rss;
        rss.enable
            .then(|| Route::Feed.url(self.lang(), &rss.path.to_string_lossy()))
    }

    fn post(&self, name: &str) -> Option<&Post> {
        self.index.posts.get(name).map(Arc::as_ref)
    }
}

/// Render a route, `None` when the item does not exist in this language.
pub fn render(ctx: &PageContext<'_>, route: &Route) -> Option<String> {
    let markup = match route {
        Route::Blog { category, page } => blog_page(ctx, category.as_deref(), *page)?,
        Route::Post(name) => post_page(ctx, ctx.index.posts.get(name)?),
        Route::Article(name) => article_page(ctx, ctx.index.articles.get(name)?),
        Route::Place(name) => place_page(ctx, ctx.index.pois.get(name)?),
        Route::Map(name) => map_page(ctx, ctx.index.maps.get(name)?),
        Route::Feed => return None,
    };
    Some(markup.into_string())
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Default)]
struct Head<'a> {
    title: Option<&'a str>,
    description: Option<&'a str>,
    published: Option<NaiveDate>,
    title_image: Option<String>,
    versions: Vec<(String, String)>,
    rss: Option<String>,
    body_class: &'a str,
    prev: Option<(String, &'a str)>,
    next: Option<(String, &'a str)>,
    no_footer: bool,
}

fn layout(ctx: &PageContext<'_>, head: Head<'_>, main: Markup) -> Markup {
    let base = &ctx.config.base;
    let lang = ctx.lang();
    let full_title = match head.title {
        Some(title) => format!("{title} - {}", base.title),
        None => base.title.clone(),
    };
    let canonical = head
        .versions
        .iter()
        .find(|(l, _)| l == lang)
        .map(|(_, url)| format!("{}{url}", ctx.config.base_url()));
    let languages = &ctx.config.build.languages;

    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                link rel="stylesheet" href=(ctx.config.build.stylesheet);
                title { (full_title) }
                @if let Some(description) = head.description {
                    meta name="description" content=(strip_tags(description));
                }
                @for (l, url) in &head.versions {
                    link rel="alternate" hreflang=(l) href=(url);
                }
                @if let Some(canonical) = &canonical {
                    link rel="canonical" href=(canonical);
                    meta property="og:url" content=(canonical);
                }
                @if let Some(rss) = &head.rss {
                    link rel="alternate" type="application/rss+xml" title=(full_title) href=(rss);
                }
                link rel="icon" href=(base.favicon);
                meta property="og:site_name" content=(base.title);
                @if let Some(title) = head.title {
                    meta property="og:title" content=(title);
                }
                @if let Some(published) = head.published {
                    meta property="og:type" content="article";
                    meta property="article:published_time" content=(published.format("%Y-%m-%d").to_string());
                    meta property="article:author" content=(base.author);
                }
                @if let Some(image) = &head.title_image {
                    meta property="og:image" content=(image);
                    meta name="twitter:card" content="summary_large_image";
                }
            }
            body class=(head.body_class) {
                header role="banner" {
                    a.title-link href={ "/" (lang) "/" } {
                        h1.main-title { (base.title) }
                    }
                    nav {
                        @for l in languages {
                            @if let Some((_, url)) = head.versions.iter().find(|(v, _)| v == l) {
                                a href=(url) class=[(l == lang).then_some("active")] { (l.to_uppercase()) }
                            } @else {
                                span.muted { (l.to_uppercase()) }
                            }
                        }
                    }
                }
                (main)
                @if !head.no_footer {
                    footer {
                        @if head.prev.is_some() || head.next.is_some() {
                            p.neighbors {
                                @if let Some((url, title)) = &head.prev {
                                    a.prev href=(url) { "← " (title) }
                                }
                                @if let Some((url, title)) = &head.next {
                                    a.next href=(url) { (title) " →" }
                                }
                            }
                        }
                        p { (base.copyright_line()) }
                    }
                }
                script type="text/javascript" src=(ctx.config.build.bundle) {}
            }
        }
    }
}

/// Placeholder hydrated by the client bundle.
fn ssr_component(kind: &str, props: &Value) -> Markup {
    html! {
        div.__ssr data-component-type=(kind) data-component-props=(props.to_string()) {}
    }
}

// ============================================================================
// Posts
// ============================================================================

fn post_date(post: &Post) -> Option<NaiveDate> {
    post.post_name().map(|name| name.date)
}

fn post_page(ctx: &PageContext<'_>, post: &Post) -> Markup {
    let lang = ctx.lang();
    let neighbor = |name: Option<&str>| {
        name.and_then(|n| ctx.post(n))
            .map(|p| (item_url(lang, ContentKind::Post, &p.name), p.data.title.as_str()))
    };
    let prev = neighbor(post.prev.as_deref());
    let next = neighbor(post.next.as_deref());
    let (cat_prev, cat_next) = match post.data.category.as_deref() {
        Some(category) => {
            let (p, n) = ctx.index.neighbors(PostScope::Category(category), &post.name);
            (neighbor(p), neighbor(n))
        }
        None => (None, None),
    };

    let data = &post.data;
    let heading_style = data.title_image.as_ref().map(|image| {
        format!(
            "background-image: url({image}); background-position: 50% {}%",
            data.title_image_offset_y.unwrap_or(50.0)
        )
    });
    let date = post_date(post).map(|d| format_date(d, lang));
    let image_in_text = data.title_image.as_ref().filter(|_| data.title_image_in_text);
    let category_nav = data
        .category
        .as_ref()
        .filter(|_| cat_prev.is_some() || cat_next.is_some());

    let main = html! {
        main.post-main {
            article {
                div class=(if heading_style.is_some() { "post-heading" } else { "post-heading-no-pic" })
                    style=[heading_style] {
                    div.post-title {
                        h1 { (data.title) }
                        @if let Some(shown) = &data.date {
                            h4 { span.time { time { (shown) } } }
                        }
                        @if let Some((url, title)) = &prev {
                            h4 { span.prev { (ctx.tr("Previous")) ": " a href=(url) { (title) } } }
                        }
                        @if let Some((url, title)) = &next {
                            h4 { span.next { (ctx.tr("Next")) ": " a href=(url) { (title) } } }
                        }
                    }
                }
                hr;
                @if let Some(image) = image_in_text {
                    figure {
                        img src=(with_variant(image, "1x"));
                        @if let Some(caption) = &data.title_image_caption {
                            figcaption { (PreEscaped(caption)) }
                        }
                    }
                }
                div.content { (PreEscaped(&post.content)) }
                @if let Some(date) = &date {
                    h4 { (ctx.tr("Published on")) ": " time { (date) } }
                }
                @if let Some(category) = category_nav {
                    p.category-neighbors {
                        a href=(Route::Blog { category: Some(category.clone()), page: 1 }.url(lang, "")) { (category) }
                        @if let Some((url, title)) = &cat_prev {
                            " ← " a href=(url) { (title) }
                        }
                        @if let Some((url, title)) = &cat_next {
                            " → " a href=(url) { (title) }
                        }
                    }
                }
            }
        }
    };

    layout(
        ctx,
        Head {
            title: Some(&data.title),
            description: data.description.as_deref(),
            published: post_date(post),
            title_image: data
                .title_image
                .as_ref()
                .map(|image| format!("{}{image}", ctx.config.base_url())),
            versions: ctx.versions(ContentKind::Post, &post.name),
            body_class: "body-post",
            prev,
            next,
            ..Default::default()
        },
        main,
    )
}

/// `coatOfArms`: a path, `[path, size]`, or a list mixing both.
fn coats_of_arms(value: Option<&Value>) -> Vec<(String, f64)> {
    fn one(value: &Value) -> Option<(String, f64)> {
        match value {
            Value::String(src) => Some((src.clone(), COAT_OF_ARMS_SIZE)),
            Value::Array(pair) => match pair.as_slice() {
                [Value::String(src), Value::Number(size)] => {
                    Some((src.clone(), size.as_f64().unwrap_or(COAT_OF_ARMS_SIZE)))
                }
                _ => None,
            },
            _ => None,
        }
    }

    match value {
        None => Vec::new(),
        Some(value @ Value::Array(items)) => match one(value) {
            Some(single) => vec![single],
            None => items.iter().filter_map(one).collect(),
        },
        Some(value) => one(value).into_iter().collect(),
    }
}

fn post_entry(ctx: &PageContext<'_>, post: &Post) -> Markup {
    let lang = ctx.lang();
    let url = item_url(lang, ContentKind::Post, &post.name);
    let coats = coats_of_arms(post.data.coat_of_arms.as_ref());

    html! {
        article.post-list-entry {
            @if let Some(image) = &post.data.title_image {
                a.post-list-entry-titleimage href=(url) { img src=(with_variant(image, "1x")); }
            } @else {
                div.post-list-entry-notitleimage {}
            }
            div.post-list-entry-body {
                div.post-list-entry-top {
                    div.post-list-entry-title {
                        h2 { a href=(url) { (post.data.title) } }
                        @if let Some(date) = post_date(post) {
                            h4 { time { (format_date(date, lang)) } }
                        }
                    }
                    @if !coats.is_empty() {
                        div.post-list-entry-coatsofarms {
                            @for (src, size) in &coats {
                                img src=(src) style={ "--width: " (size.floor()) "px" };
                            }
                        }
                    }
                }
                @if let Some(description) = &post.data.description {
                    p.post-list-entry-description { (PreEscaped(description)) }
                }
            }
        }
    }
}

/// Page numbers to show, `0` marking a gap.
pub fn pagination(this: usize, total: usize) -> Vec<usize> {
    if total < 2 {
        return Vec::new();
    }
    if total < 11 {
        return (1..=total).collect();
    }
    let tail = total - 2..=total;
    if this <= 6 {
        (1..this + 3).chain([0]).chain(tail).collect()
    } else if total - this <= 6 {
        [1, 2, 3, 0].into_iter().chain(this - 2..=total).collect()
    } else {
        [1, 2, 3, 0]
            .into_iter()
            .chain(this - 2..this + 3)
            .chain([0])
            .chain(tail)
            .collect()
    }
}

fn pagination_nav(ctx: &PageContext<'_>, category: Option<&str>, this: usize, total: usize) -> Markup {
    let lang = ctx.lang();
    let url = |page: usize| {
        Route::Blog {
            category: category.map(str::to_string),
            page,
        }
        .url(lang, "")
    };
    let pages = pagination(this, total);

    html! {
        @if !pages.is_empty() {
            nav.navigation.pagination role="navigation" {
                div.nav-links {
                    @if this > 1 {
                        a.prev.page-numbers href=(url(this - 1)) { (ctx.tr("Previous")) }
                        " "
                    }
                    @for page in pages {
                        @if page == 0 {
                            span.page-numbers.dots { "… " }
                        } @else if page == this {
                            span.page-numbers.current aria-current="page" { (page) " " }
                        } @else {
                            a.page-numbers href=(url(page)) {
                                span.meta-nav.screen-reader-text { (ctx.tr("Page")) " " }
                                (page)
                            }
                            " "
                        }
                    }
                    @if this < total {
                        a.next.page-numbers href=(url(this + 1)) { (ctx.tr("Next")) }
                    }
                }
            }
        }
    }
}

fn blog_page(ctx: &PageContext<'_>, category: Option<&str>, page: usize) -> Option<Markup> {
    let scope = category.map_or(PostScope::All, PostScope::Category);
    let order = ctx.index.order(scope);
    if category.is_some() && order.is_empty() {
        return None;
    }

    let per_page = ctx.config.build.posts_per_page;
    let total = page_count(order.len(), per_page);
    if page == 0 || page > total {
        return None;
    }
    let posts = order
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .filter_map(|name| ctx.post(name));

    let lang = ctx.lang();
    let versions = match category {
        None => ctx
            .config
            .build
            .languages
            .iter()
            .map(|l| (l.clone(), Route::blog(1).url(l, "")))
            .collect(),
        Some(_) => vec![(lang.to_string(), Route::blog(1).url(lang, ""))],
    };

    let main = html! {
        main.blog-main {
            @if let Some(category) = category {
                h1.category-title { (category) }
            }
            @for post in posts {
                (post_entry(ctx, post))
            }
            (pagination_nav(ctx, category, page, total))
        }
    };

    Some(layout(
        ctx,
        Head {
            title: Some(category.unwrap_or_else(|| ctx.tr("Blog"))),
            versions,
            rss: ctx.feed_url(),
            body_class: "body-blog",
            ..Default::default()
        },
        main,
    ))
}

// ============================================================================
// Articles, places, maps
// ============================================================================

fn article_page(ctx: &PageContext<'_>, article: &Article) -> Markup {
    let lang = ctx.lang();
    let neighbor = |name: Option<&String>| {
        name.and_then(|n| ctx.index.articles.get(n)).map(|a| {
            (
                item_url(lang, ContentKind::Article, &a.name),
                a.data.title.as_str(),
            )
        })
    };

    let main = html! {
        main {
            h1.article-title { (article.data.title) }
            hr;
            article.article-main {
                (PreEscaped(&article.content))
                @if let Some(updated) = &article.data.updated {
                    p { i { (ctx.tr("Updated on")) ": " (updated) } }
                }
            }
        }
    };

    layout(
        ctx,
        Head {
            title: Some(&article.data.title),
            versions: ctx.versions(ContentKind::Article, &article.name),
            body_class: "body-article",
            prev: neighbor(article.data.prev.as_ref()),
            next: neighbor(article.data.next.as_ref()),
            ..Default::default()
        },
        main,
    )
}

/// The map a POI page borrows its settings from: its first map tag, else `index`.
pub fn owning_map<'i>(index: &'i LanguageIndex, poi: &Poi) -> Option<&'i Map> {
    let name = poi.data.map_tags().first().map_or(INDEX, String::as_str);
    index.maps.get(name).map(Arc::as_ref)
}

fn place_page(ctx: &PageContext<'_>, poi: &Poi) -> Markup {
    let lang = ctx.lang();
    let data = &poi.data;
    let parent = data.parent.as_ref().and_then(|p| ctx.index.pois.get(p));
    // Untranslated types show as they are written
    let type_label = data.poi_type.as_ref().map(|t| {
        let key = format!("type-{t}");
        match tr(&key, lang) {
            label if label == key => t.clone(),
            label => label.to_string(),
        }
    });
    let map = owning_map(ctx.index, poi);

    let details = [
        ("Address", &data.address),
        ("Season", &data.season_description),
        ("Access", &data.access_description),
    ];

    let main = html! {
        main {
            div.poi-logo {
                @if let Some(icon) = &data.custom_icon {
                    img.custom-icon src=(icon) height="80";
                }
            }
            h1.poi-title { (data.title) }
            p.poi-subtitle {
                @if let Some(parent) = parent {
                    a href=(item_url(lang, ContentKind::Poi, &parent.name)) { "← " (parent.data.title) }
                    " • "
                }
                @if let Some(label) = &type_label {
                    (label)
                    @if data.subtitle.is_some() { " • " }
                }
                @if let Some(subtitle) = &data.subtitle {
                    (PreEscaped(subtitle))
                }
            }
            hr;
            div.poi-description {
                @if !poi.gallery_prepared.is_empty() {
                    (ssr_component("reactImageGallery", &json!({
                        "items": poi.gallery_prepared,
                        "showPlayButton": false,
                        "showIndex": true,
                        "showBullets": true,
                    })))
                }
                @if let Some(description) = &data.description {
                    h2 { (PreEscaped(description)) }
                }
            }
            aside.poi-map-and-data {
                (ssr_component("miniMapView", &json!({
                    "lang": lang,
                    "poiData": data,
                    "mapData": map.map(|m| &m.data),
                    "geoJSONs": poi.geo_jsons,
                    "settings": ctx.config.map,
                })))
                @for (label, value) in details {
                    @if let Some(value) = value {
                        p { b { (ctx.tr(label)) } ": " span { (PreEscaped(value)) } }
                    }
                }
                @for (label, value) in &data.more {
                    p { b { (tr(label, lang)) } ": " span { (PreEscaped(value)) } }
                }
                @if !data.external_links.is_empty() {
                    p { b { (ctx.tr("Links")) ":" } }
                    ul {
                        @for (title, url) in &data.external_links {
                            li { a href=(url) { (PreEscaped(title)) } }
                        }
                    }
                }
            }
            article.poi-main {
                @if !poi.gallery_prepared.is_empty() { hr; }
                (PreEscaped(&poi.content))
                @if let Some(updated) = &data.updated {
                    p { i { (ctx.tr("Updated on")) ": " (updated) } }
                }
            }
        }
    };

    layout(
        ctx,
        Head {
            title: Some(&data.title),
            description: data.description.as_deref(),
            versions: ctx.versions(ContentKind::Poi, &poi.name),
            body_class: "body-poi",
            ..Default::default()
        },
        main,
    )
}

fn map_page(ctx: &PageContext<'_>, map: &Map) -> Markup {
    let main = ssr_component(
        "mapView",
        &json!({
            "lang": ctx.lang(),
            "data": map.data,
            "content": map.content,
            "geoJSONs": map.geo_jsons,
            "settings": ctx.config.map,
        }),
    );

    layout(
        ctx,
        Head {
            title: Some(&map.data.title),
            versions: ctx.versions(ContentKind::Map, &map.name),
            body_class: "body-map",
            no_footer: true,
            ..Default::default()
        },
        main,
    )
}

/// Text of an HTML fragment, for attributes.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{
        ContentFile,
        testing::{map, poi, post},
    };
    use std::path::PathBuf;

    struct Fixture {
        config: SiteConfig,
        content: ContentMap,
        index: LanguageIndex,
    }

    impl Fixture {
        fn new() -> Self {
            let mut config = SiteConfig::default();
            config.base.url = Some("https://example.org".into());
            config.build.posts_per_page = 2;

            let mut index = LanguageIndex::new("en");
            let mut content = ContentMap::new(&config.build.languages);
            let mut add = |lang: &str, kind: ContentKind, name: &str| {
                content
                    .insert(ContentFile {
                        lang: lang.into(),
                        kind,
                        name: name.into(),
                        path: PathBuf::from(format!("/c/{name}.{lang}.{kind}.md")),
                    })
                    .unwrap();
            };

            for (name, category) in [
                ("2020-01-01-a", Some("trips")),
                ("2020-01-02-b", None),
                ("2020-01-03-c", Some("trips")),
            ] {
                add("en", ContentKind::Post, name);
                index.insert_post(post(name, category));
            }
            add("fi", ContentKind::Post, "2020-01-01-a");

            let mut child = poi("turku", Some("finland"));
            child.data.map = Some(crate::content::OneOrMany::One("south".into()));
            child.data.poi_type = Some("city".into());
            child.data.address = Some("Linnankatu 80".into());
            for item in [poi("finland", None), child] {
                add("en", ContentKind::Poi, &item.name);
                index.insert_poi(item);
            }
            for name in ["index", "south"] {
                add("en", ContentKind::Map, name);
                index.insert(crate::content::Item::Map(map(name)));
            }
            index.rebuild().unwrap();

            Self {
                config,
                content,
                index,
            }
        }

        fn ctx(&self) -> PageContext<'_> {
            PageContext {
                config: &self.config,
                content: &self.content,
                index: &self.index,
            }
        }

        fn render(&self, route: Route) -> Option<String> {
            render(&self.ctx(), &route)
        }
    }

    #[test]
    fn test_pagination_windows() {
        assert!(pagination(1, 1).is_empty());
        assert_eq!(pagination(2, 4), vec![1, 2, 3, 4]);
        assert_eq!(pagination(3, 20), vec![1, 2, 3, 4, 5, 0, 18, 19, 20]);
        assert_eq!(pagination(16, 20), vec![1, 2, 3, 0, 14, 15, 16, 17, 18, 19, 20]);
        assert_eq!(pagination(10, 20), vec![1, 2, 3, 0, 8, 9, 10, 11, 12, 0, 18, 19, 20]);
    }

    #[test]
    fn test_coats_of_arms_forms() {
        assert_eq!(coats_of_arms(None), vec![]);
        assert_eq!(coats_of_arms(Some(&json!("/a.png"))), vec![("/a.png".into(), 150.0)]);
        assert_eq!(coats_of_arms(Some(&json!(["/a.png", 90]))), vec![("/a.png".into(), 90.0)]);
        assert_eq!(
            coats_of_arms(Some(&json!(["/a.png", ["/b.png", 80]]))),
            vec![("/a.png".into(), 150.0), ("/b.png".into(), 80.0)]
        );
    }

    #[test]
    fn test_blog_pages() {
        let fx = Fixture::new();
        let first = fx.render(Route::blog(1)).unwrap();
        assert!(first.starts_with("<!DOCTYPE html>"));
        assert!(first.contains("/en/2020/01/03/c/"));
        assert!(first.contains("/en/2020/01/02/b/"));
        assert!(!first.contains("/en/2020/01/01/a/\""));
        assert!(first.contains(r#"href="/en/rss.xml""#));

        let second = fx.render(Route::blog(2)).unwrap();
        assert!(second.contains("/en/2020/01/01/a/"));
        assert!(fx.render(Route::blog(3)).is_none());
    }

    #[test]
    fn test_category_page() {
        let fx = Fixture::new();
        let page = fx
            .render(Route::Blog {
                category: Some("trips".into()),
                page: 1,
            })
            .unwrap();
        assert!(page.contains("/en/2020/01/03/c/"));
        assert!(page.contains("/en/2020/01/01/a/"));
        assert!(!page.contains("/en/2020/01/02/b/"));

        assert!(
            fx.render(Route::Blog {
                category: Some("nope".into()),
                page: 1
            })
            .is_none()
        );
    }

    #[test]
    fn test_post_page_neighbors_and_versions() {
        let fx = Fixture::new();
        let page = fx.render(Route::Post("2020-01-01-a".into())).unwrap();

        // global next is b, category next is c
        assert!(page.contains(r#"<a href="/en/2020/01/02/b/">2020-01-02-B</a>"#));
        assert!(page.contains(r#"<a href="/en/2020/01/03/c/">2020-01-03-C</a>"#));
        assert!(page.contains(r#"hreflang="fi" href="/fi/2020/01/01/a/""#));
        assert!(page.contains("January 1, 2020"));
        assert!(page.contains(r#"<link rel="canonical" href="https://example.org/en/2020/01/01/a/">"#));
    }

    #[test]
    fn test_place_page() {
        let fx = Fixture::new();
        let page = fx.render(Route::Place("turku".into())).unwrap();

        assert!(page.contains(r#"href="/en/place/finland/""#));
        assert!(page.contains("Linnankatu 80"));
        assert!(page.contains("</a> • city"));
        assert!(page.contains(r#"data-component-type="miniMapView""#));
        assert!(fx.render(Route::Place("nowhere".into())).is_none());
    }

    #[test]
    fn test_owning_map() {
        let fx = Fixture::new();
        let turku = &fx.index.pois["turku"];
        let finland = &fx.index.pois["finland"];
        assert_eq!(owning_map(&fx.index, turku).unwrap().name, "south");
        assert_eq!(owning_map(&fx.index, finland).unwrap().name, "index");
    }

    #[test]
    fn test_map_page_has_no_footer() {
        let fx = Fixture::new();
        let page = fx.render(Route::Map("index".into())).unwrap();
        assert!(page.contains(r#"data-component-type="mapView""#));
        assert!(!page.contains("<footer>"));
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("a <em>b</em> c"), "a b c");
    }
}
