/// Light and dark chart styling.
///
/// A `Palette` is resolved once per theme switch and passed to whatever
/// draws the charts; nothing reads colors from ambient state.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(name: &str) -> Option<Theme> {
        match name.trim().to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                text: "#cbd5e1",
                grid: "rgba(255,255,255,0.08)",
                background: "#0b1220",
                accent: "#38bdf8",
                area_fill: "rgba(56,189,248,0.18)",
                band_outer: "#64748b",
                band_inner: "#334155",
                scatter_fill: "black",
                logo: "./data/img/logo_dark.png",
            },
            Theme::Light => Palette {
                text: "#334155",
                grid: "rgba(0,0,0,0.08)",
                background: "#ffffff",
                accent: "#0ea5e9",
                area_fill: "rgba(14,165,233,0.18)",
                band_outer: "#cbd5e1",
                band_inner: "#64748b",
                scatter_fill: "white",
                logo: "./data/img/logo_light.png",
            },
        }
    }
}

/// Resolved chart colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    /// Axis lines, labels and titles.
    pub text: &'static str,
    pub grid: &'static str,
    pub background: &'static str,
    /// Mean line and highlighted series.
    pub accent: &'static str,
    pub area_fill: &'static str,
    /// p5–p95 band.
    pub band_outer: &'static str,
    /// p25–p75 band.
    pub band_inner: &'static str,
    /// Optical/thermal marker fill on the ice cover scatter.
    pub scatter_fill: &'static str,
    pub logo: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_is_light() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::default().palette().logo, "./data/img/logo_light.png");
    }

    #[test]
    fn test_toggle_switches_palette() {
        let dark = Theme::Light.toggled();
        assert_eq!(dark, Theme::Dark);
        assert_eq!(dark.palette().background, "#0b1220");
        assert_eq!(dark.toggled(), Theme::Light);
    }

    #[test]
    fn test_band_greys_swap_between_themes() {
        let light = Theme::Light.palette();
        let dark = Theme::Dark.palette();
        assert_eq!(light.band_inner, dark.band_outer);
        assert_ne!(light.scatter_fill, dark.scatter_fill);
    }

    #[test]
    fn test_parse_theme_name() {
        assert_eq!(Theme::parse("Dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse(" light "), Some(Theme::Light));
        assert_eq!(Theme::parse("sepia"), None);
    }
}
