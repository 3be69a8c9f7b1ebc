//! Markdown to HTML with site-aware rewriting.
//!
//! ```text
//! [Turku](../turku/turku.en.poi.md)   → <a href="/en/place/turku/">
//! ![Castle](castle.jpg)               → <figure><a href=orig><img 1x + srcset></a>
//!                                        <figcaption>Castle</figcaption></figure>
//! ![Castle](castle.jpg "nofigure")    → <a href=orig><img 1x + srcset></a>
//! ![Remote](https://x.org/a.jpg)      → untouched
//! ```

use crate::{
    content::{
        ContentError, ContentMap, classify, item_url,
        loader::{TextMode, TextRenderer},
    },
    images::{ImageResolver, ImageSources},
};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::{fmt::Write, path::Path};

/// Image title that suppresses the `<figure>` wrapper.
const NO_FIGURE: &str = "nofigure";

pub struct MarkdownRenderer<'a, I> {
    content: &'a ContentMap,
    images: &'a I,
    languages: &'a [String],
    options: Options,
}

impl<'a, I: ImageResolver> MarkdownRenderer<'a, I> {
    pub fn new(content: &'a ContentMap, images: &'a I, languages: &'a [String]) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        Self {
            content,
            images,
            languages,
            options,
        }
    }

    /// Site URL for a `<name>.<lang>.<kind>.md` link target.
    fn content_url(&self, dest: &str) -> Result<String, ContentError> {
        let broken = || ContentError::BrokenLink(dest.to_string());
        // Content URLs are flat, the directory part never matters
        let file_name = dest.rsplit('/').next().unwrap_or(dest);
        let file = classify(Path::new(file_name), self.languages)
            .map_err(|_| broken())?
            .ok_or_else(broken)?;

        if !self.content.contains(&file.lang, file.kind, &file.name) {
            return Err(broken());
        }
        Ok(item_url(&file.lang, file.kind, &file.name))
    }

    fn rewrite<'e>(
        &self,
        events: impl Iterator<Item = Event<'e>>,
        lang: &str,
        base_dir: &Path,
    ) -> Result<Vec<Event<'e>>, ContentError> {
        let mut events = events;
        let mut out = Vec::new();

        while let Some(event) = events.next() {
            match event {
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) if is_content_link(&dest_url) => {
                    out.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url: self.content_url(&dest_url)?.into(),
                        title,
                        id,
                    }));
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) if !is_remote(&dest_url) => {
                    let alt = take_image_alt(&mut events);
                    let sources = self.images.resolve(&dest_url, base_dir)?;
                    let html = image_html(&sources, &alt, lang, &*title != NO_FIGURE);
                    out.push(Event::Html(html.into()));
                }
                Event::Text(text) if lang == "ru" => out.push(Event::Text(guillemets(text))),
                other => out.push(other),
            }
        }
        Ok(out)
    }
}

impl<I: ImageResolver> TextRenderer for MarkdownRenderer<'_, I> {
    fn render(
        &self,
        markdown: &str,
        lang: &str,
        base_dir: &Path,
        mode: TextMode,
    ) -> Result<String, ContentError> {
        if markdown.trim().is_empty() {
            return Ok(String::new());
        }

        let events = self.rewrite(Parser::new_ext(markdown, self.options), lang, base_dir)?;
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());

        Ok(match mode {
            TextMode::Block => out,
            TextMode::Inline => strip_paragraph(&out).to_string(),
        })
    }

    fn image(&self, src: &str, base_dir: &Path) -> Result<ImageSources, ContentError> {
        self.images.resolve(src, base_dir)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn is_remote(url: &str) -> bool {
    url.contains("://")
}

fn is_content_link(url: &str) -> bool {
    !is_remote(url) && url.ends_with(".md")
}

/// Consume the alt events up to the image end.
fn take_image_alt<'e>(events: &mut impl Iterator<Item = Event<'e>>) -> Vec<Event<'e>> {
    let mut alt = Vec::new();
    let mut nesting = 0usize;
    for event in events.by_ref() {
        match event {
            Event::End(TagEnd::Image) if nesting == 0 => break,
            Event::Start(Tag::Image { .. }) => {
                nesting += 1;
                alt.push(event);
            }
            Event::End(TagEnd::Image) => {
                nesting -= 1;
                alt.push(event);
            }
            other => alt.push(other),
        }
    }
    alt
}

fn image_html(sources: &ImageSources, alt: &[Event<'_>], lang: &str, figure: bool) -> String {
    let alt_text: String = alt
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) | Event::Code(t) => Some(&**t),
            _ => None,
        })
        .collect();

    let mut out = String::new();
    if figure {
        out.push_str("<figure>");
    }
    let _ = write!(
        out,
        r#"<a href="{}"><img src="{}" srcset="{}" width="{}" height="{}" alt="{}"></a>"#,
        escape_attr(&sources.orig),
        escape_attr(&sources.x1),
        escape_attr(&sources.src_set()),
        sources.width,
        sources.height,
        escape_attr(&alt_text),
    );
    if figure {
        if !alt.is_empty() {
            let mut caption = String::new();
            let alt = alt.iter().cloned().map(|e| match e {
                Event::Text(text) if lang == "ru" => Event::Text(guillemets(text)),
                other => other,
            });
            html::push_html(&mut caption, alt);
            let _ = write!(out, "<figcaption>{caption}</figcaption>");
        }
        out.push_str("</figure>");
    }
    out
}

/// Russian typography: curly double quotes become guillemets.
fn guillemets(text: CowStr<'_>) -> CowStr<'_> {
    if text.contains(['\u{201c}', '\u{201d}']) {
        text.replace('\u{201c}', "«").replace('\u{201d}', "»").into()
    } else {
        text
    }
}

/// `<p>text</p>\n` → `text`; multi-paragraph output is left alone.
fn strip_paragraph(html: &str) -> &str {
    let trimmed = html.trim_end();
    trimmed
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .filter(|inner| !inner.contains("<p>"))
        .unwrap_or(trimmed)
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{
        ContentFile, ContentKind,
        testing::FakeImages,
    };
    use std::path::PathBuf;

    fn languages() -> Vec<String> {
        vec!["en".into(), "ru".into(), "fi".into()]
    }

    fn content() -> ContentMap {
        let mut map = ContentMap::new(&languages());
        for (lang, kind, name) in [
            ("en", ContentKind::Poi, "turku"),
            ("en", ContentKind::Post, "2020-02-01-helsinki"),
            ("ru", ContentKind::Article, "about"),
            ("en", ContentKind::Map, "lapland"),
        ] {
            map.insert(ContentFile {
                lang: lang.into(),
                kind,
                name: name.into(),
                path: PathBuf::from(format!("/c/{name}.{lang}.{kind}.md")),
            })
            .unwrap();
        }
        map
    }

    fn render(markdown: &str, lang: &str, mode: TextMode) -> Result<String, ContentError> {
        let content = content();
        let langs = languages();
        let renderer = MarkdownRenderer::new(&content, &FakeImages, &langs);
        renderer.render(markdown, lang, Path::new("/c/fin"), mode)
    }

    #[test]
    fn test_block_and_inline() {
        assert_eq!(render("Hello *world*", "en", TextMode::Block).unwrap(), "<p>Hello <em>world</em></p>\n");
        assert_eq!(render("Hello *world*", "en", TextMode::Inline).unwrap(), "Hello <em>world</em>");
        assert_eq!(render("", "en", TextMode::Block).unwrap(), "");
    }

    #[test]
    fn test_inline_keeps_multiple_paragraphs() {
        let html = render("one\n\ntwo", "en", TextMode::Inline).unwrap();
        assert_eq!(html, "<p>one</p>\n<p>two</p>");
    }

    #[test]
    fn test_content_links_rewritten() {
        let html = render(
            "[a](../fin/turku.en.poi.md) [b](2020-02-01-helsinki.en.post.md) [c](about.ru.article.md) [d](lapland.en.map.md)",
            "en",
            TextMode::Inline,
        )
        .unwrap();

        assert!(html.contains(r#"href="/en/place/turku/""#));
        assert!(html.contains(r#"href="/en/2020/02/01/helsinki/""#));
        assert!(html.contains(r#"href="/ru/article/about/""#));
        assert!(html.contains(r#"href="/en/map/lapland/""#));
    }

    #[test]
    fn test_other_links_untouched() {
        let html = render(
            "[x](https://example.org/readme.md) [y](/static/a.pdf)",
            "en",
            TextMode::Inline,
        )
        .unwrap();
        assert!(html.contains(r#"href="https://example.org/readme.md""#));
        assert!(html.contains(r#"href="/static/a.pdf""#));
    }

    #[test]
    fn test_broken_links() {
        for link in ["missing.en.poi.md", "turku.fi.poi.md", "notes.md", "a.en.thing.md"] {
            let err = render(&format!("[x]({link})"), "en", TextMode::Block).unwrap_err();
            assert!(matches!(err, ContentError::BrokenLink(ref l) if l == link), "{link}");
        }
    }

    #[test]
    fn test_image_figure() {
        let html = render("![Turku *castle*](castle.jpg)", "en", TextMode::Block).unwrap();

        assert!(html.contains(r#"<figure><a href="/castle.jpg">"#));
        assert!(html.contains(r#"src="/castle.1x.jpg""#));
        assert!(html.contains(r#"srcset="/castle.1x.jpg, /castle.2x.jpg 2x""#));
        assert!(html.contains(r#"width="677" height="451""#));
        assert!(html.contains(r#"alt="Turku castle""#));
        assert!(html.contains("<figcaption>Turku <em>castle</em></figcaption></figure>"));
    }

    #[test]
    fn test_image_nofigure_and_remote() {
        let html = render(r#"![x](a.png "nofigure")"#, "en", TextMode::Inline).unwrap();
        assert!(html.starts_with(r#"<a href="/a.png"><img src="/a.1x.png""#));
        assert!(!html.contains("figure"));

        let html = render("![x](https://x.org/a.jpg)", "en", TextMode::Inline).unwrap();
        assert_eq!(html, r#"<img src="https://x.org/a.jpg" alt="x" />"#);
    }

    #[test]
    fn test_russian_quotes() {
        assert_eq!(render("\"Турку\"", "ru", TextMode::Inline).unwrap(), "«Турку»");
        assert_eq!(render("\"Turku\"", "en", TextMode::Inline).unwrap(), "\u{201c}Turku\u{201d}");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"a "b" <c>"#), "a &quot;b&quot; &lt;c&gt;");
    }
}
