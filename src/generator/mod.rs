//! Output generation.
//!
//! | Module | Output                                             |
//! |--------|----------------------------------------------------|
//! | `site` | every page as `index.html`, POI and post JSON       |
//! | `rss`  | `/<lang>/rss.xml`                                  |

pub mod rss;
mod site;

pub use site::{generate, write_snapshots};
