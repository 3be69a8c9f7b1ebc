//! Turning content into HTML.
//!
//! | Module     | Responsibility                                    |
//! |------------|---------------------------------------------------|
//! | `markdown` | Markdown bodies and fields, link + image rewrites |
//! | `route`    | page URLs in both directions                      |
//! | `pages`    | `maud` templates for every route                  |
//! | `l10n`     | UI strings and dates                              |

pub mod l10n;
mod markdown;
pub mod pages;
mod route;

pub use markdown::MarkdownRenderer;
pub use pages::{PageContext, render};
pub use route::Route;
