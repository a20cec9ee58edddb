use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: country → Color32
// ---------------------------------------------------------------------------

/// Maps each country in the table's fixed domain to a distinct bar colour.
/// Built once per loaded table so colours stay stable across filtering.
#[derive(Debug, Clone, Default)]
pub struct CountryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CountryColors {
    pub fn new(countries: &[String]) -> Self {
        let palette = generate_palette(countries.len());
        let mapping = countries
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();
        CountryColors { mapping }
    }

    /// Look up the colour for a country; grey for anything unknown.
    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping
            .get(country)
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_size_matches_request() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }

    #[test]
    fn colors_are_stable_per_country() {
        let countries = vec!["Austria".to_string(), "Germany".to_string()];
        let colors = CountryColors::new(&countries);
        assert_eq!(colors.color_for("Austria"), colors.color_for("Austria"));
        assert_ne!(colors.color_for("Austria"), colors.color_for("Germany"));
        assert_eq!(colors.color_for("Atlantis"), Color32::GRAY);
    }
}
