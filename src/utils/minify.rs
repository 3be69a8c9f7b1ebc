//! Minification for generated HTML and XML.

use std::borrow::Cow;

/// Content type for minification.
pub enum MinifyType<'a> {
    Html(&'a [u8]),
    Xml(&'a [u8]),
    /// Anything else is written as is.
    Raw(&'a [u8]),
}

impl<'a> MinifyType<'a> {
    /// Pick the minifier from the output path's extension.
    pub fn for_path(web_path: &str, bytes: &'a [u8]) -> Self {
        match web_path.rsplit_once('.').map(|(_, ext)| ext) {
            Some("html") => Self::Html(bytes),
            Some("xml") => Self::Xml(bytes),
            _ => Self::Raw(bytes),
        }
    }
}

/// Returns `Cow::Borrowed` if disabled or not minifiable.
pub fn minify(content: MinifyType<'_>, enabled: bool) -> Cow<'_, [u8]> {
    match content {
        MinifyType::Html(html) if enabled => Cow::Owned(minify_html_inner(html)),
        MinifyType::Xml(xml) if enabled => Cow::Owned(minify_xml_inner(xml)),
        MinifyType::Html(bytes) | MinifyType::Xml(bytes) | MinifyType::Raw(bytes) => {
            Cow::Borrowed(bytes)
        }
    }
}

fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    // `<!--more-->` only matters in sources, never in output
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    minify_html::minify(html, &cfg)
}

/// Drop indentation and blank lines.
fn minify_xml_inner(xml: &[u8]) -> Vec<u8> {
    String::from_utf8_lossy(xml)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<String>()
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_path() {
        assert!(matches!(MinifyType::for_path("/en/index.html", b""), MinifyType::Html(_)));
        assert!(matches!(MinifyType::for_path("/en/rss.xml", b""), MinifyType::Xml(_)));
        assert!(matches!(MinifyType::for_path("/en/place/a.json", b""), MinifyType::Raw(_)));
    }

    #[test]
    fn test_minify_html() {
        let html = b"<html>\n  <body>\n    <p>Turku</p>\n  </body>\n</html>";
        let minified = minify(MinifyType::Html(html), true);
        let text = String::from_utf8_lossy(&minified);

        assert!(!text.contains("\n  "));
        assert!(text.contains("<p>Turku</p>"));
        assert_eq!(&*minify(MinifyType::Html(html), false), html);
    }

    #[test]
    fn test_minify_xml() {
        let xml = b"<rss>\n\n  <channel>\n    <title>Blog</title>\n  </channel>\n</rss>";
        assert_eq!(
            &*minify(MinifyType::Xml(xml), true),
            b"<rss><channel><title>Blog</title></channel></rss>"
        );
    }

    #[test]
    fn test_raw_untouched() {
        let json = b"{\n  \"a\": 1\n}";
        assert_eq!(&*minify(MinifyType::Raw(json), true), json);
    }
}
