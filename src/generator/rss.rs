//! Per-language RSS feeds.
//!
//! The newest `posts_per_page` posts of a language, each with its body cut
//! at `<!--more-->` and site-relative links made absolute.

use crate::{
    config::SiteConfig,
    content::{ContentKind, LanguageIndex, Post, item_url},
    output::OutputWriter,
    render::{Route, l10n::tr},
};
use anyhow::{Result, anyhow};
use regex::Regex;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};
use std::sync::LazyLock;

const CUT_MARK: &str = "<!--more-->";
const GENERATOR: &str = "fennica static site generator";

static RE_ROOTED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\s(?:src|href)=")(/[^"]*")"#).unwrap());

static RE_SRCSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+srcset="[^"]*""#).unwrap());

/// Web path of a language's feed.
pub fn feed_path(config: &SiteConfig, lang: &str) -> String {
    Route::Feed.url(lang, &config.build.rss.path.to_string_lossy())
}

/// Render the feed XML for one language.
pub fn render_feed(config: &SiteConfig, index: &LanguageIndex) -> Result<String> {
    let lang = index.lang.as_str();
    let base = config.base_url();

    let items: Vec<_> = index
        .posts_in_order()
        .take(config.build.posts_per_page)
        .map(|post| post_to_item(post, lang, base))
        .collect();

    let channel = ChannelBuilder::default()
        .title(&config.base.title)
        .link(format!("{base}/{lang}/"))
        .description(config.base.description_for(lang))
        .language(Some(lang.to_string()))
        .copyright(Some(config.base.copyright_line()))
        .generator(Some(GENERATOR.to_string()))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| anyhow!("rss validation failed for `{lang}`: {e}"))?;
    Ok(channel.to_string())
}

/// Write the feed for one language if feeds are enabled.
pub fn write_feed(config: &SiteConfig, index: &LanguageIndex, writer: &impl OutputWriter) -> Result<()> {
    if config.build.rss.enable {
        let xml = render_feed(config, index)?;
        writer.write(&feed_path(config, &index.lang), xml.as_bytes())?;
    }
    Ok(())
}

fn post_to_item(post: &Post, lang: &str, base: &str) -> rss::Item {
    let url = format!("{base}{}", item_url(lang, ContentKind::Post, &post.name));
    let pub_date = post
        .post_name()
        .and_then(|name| name.date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().to_rfc2822());

    ItemBuilder::default()
        .title(Some(post.data.title.clone()))
        .link(Some(url.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(url.clone()).build()))
        .description(post.data.description.clone())
        .content(Some(feed_content(post, lang, base, &url)))
        .pub_date(pub_date)
        .build()
}

/// Feed body: title image, text up to the cut, absolute URLs.
fn feed_content(post: &Post, lang: &str, base: &str, url: &str) -> String {
    let (body, cut) = match post.content.find(CUT_MARK) {
        Some(at) => (&post.content[..at], true),
        None => (post.content.as_str(), false),
    };

    let mut content = String::new();
    if let Some(image) = &post.data.title_image {
        content.push_str(&format!(r#"<p><img src="{base}{image}"></p>"#));
    }
    content.push_str(&absolutize(body, base));
    if cut {
        content.push_str(&format!(
            r#"<p><a href="{url}">{}</a></p>"#,
            tr("Continue reading", lang)
        ));
    }
    content
}

fn absolutize(html: &str, base: &str) -> String {
    let without_srcset = RE_SRCSET.replace_all(html, "");
    RE_ROOTED_URL
        .replace_all(&without_srcset, |caps: &regex::Captures| {
            format!("{}{base}{}", &caps[1], &caps[2])
        })
        .into_owned()
}
