//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    use std::collections::BTreeMap;

    pub fn title() -> String {
        "Encyclopaedia Fennica".into()
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn url() -> Option<String> {
        None
    }

    pub fn copyright() -> String {
        "© 2015-2022".into()
    }

    pub fn favicon() -> String {
        "/static/favicon.png".into()
    }

    pub fn rss_description() -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "build".into()
    }

    pub fn static_dir() -> PathBuf {
        "static".into()
    }

    pub fn languages() -> Vec<String> {
        vec!["en".into(), "ru".into(), "fi".into()]
    }

    pub fn posts_per_page() -> usize {
        25
    }

    pub fn bundle() -> String {
        "/static/bundle.js".into()
    }

    pub fn stylesheet() -> String {
        "/static/style.css".into()
    }

    pub mod images {
        pub fn size() -> u32 {
            677
        }

        pub fn thumb_size() -> u32 {
            100
        }
    }

    pub mod rss {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "rss.xml".into()
        }
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        8001
    }
}

// ============================================================================
// [map] Section Defaults
// ============================================================================

pub mod map {
    pub fn lat() -> f64 {
        61.504951
    }

    pub fn lng() -> f64 {
        24.627933
    }

    pub fn zoom() -> u8 {
        4
    }

    pub fn min_zoom() -> u8 {
        2
    }

    pub fn max_zoom() -> u8 {
        13
    }

    pub fn tile_source() -> String {
        "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into()
    }

    pub fn attribution() -> String {
        "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
            .into()
    }
}
