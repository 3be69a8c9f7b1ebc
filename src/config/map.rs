//! `[map]` section configuration.
//!
//! Viewport and tile settings handed to the client map widget. Individual
//! `.map.md` files override the center and zoom.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[map]` section in fennica.toml.
///
/// # Example
/// ```toml
/// [map]
/// lat = 61.5
/// lng = 24.6
/// zoom = 4
/// tile_source = "https://tile.openstreetmap.org/{z}/{x}/{y}.png"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct MapConfig {
    #[serde(default = "defaults::map::lat")]
    #[educe(Default = defaults::map::lat())]
    pub lat: f64,

    #[serde(default = "defaults::map::lng")]
    #[educe(Default = defaults::map::lng())]
    pub lng: f64,

    #[serde(default = "defaults::map::zoom")]
    #[educe(Default = defaults::map::zoom())]
    pub zoom: u8,

    #[serde(default = "defaults::map::min_zoom")]
    #[educe(Default = defaults::map::min_zoom())]
    pub min_zoom: u8,

    #[serde(default = "defaults::map::max_zoom")]
    #[educe(Default = defaults::map::max_zoom())]
    pub max_zoom: u8,

    /// Tile URL template with `{z}`, `{x}`, `{y}` placeholders.
    #[serde(default = "defaults::map::tile_source")]
    #[educe(Default = defaults::map::tile_source())]
    pub tile_source: String,

    /// Attribution HTML shown in the map corner.
    #[serde(default = "defaults::map::attribution")]
    #[educe(Default = defaults::map::attribution())]
    pub attribution: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_map_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.map.zoom, 4);
        assert_eq!(config.map.min_zoom, 2);
        assert_eq!(config.map.max_zoom, 13);
        assert!(config.map.tile_source.contains("{z}"));
    }

    #[test]
    fn test_map_config_override() {
        let config = r#"
            [map]
            lat = 60.17
            lng = 24.94
            max_zoom = 15
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.map.lat, 60.17);
        assert_eq!(config.map.max_zoom, 15);
        assert_eq!(config.map.min_zoom, 2);
    }
}
