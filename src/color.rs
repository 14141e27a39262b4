use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

use crate::config::PALETTE_SIZE;
use crate::data::model::UNKNOWN_METHOD;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// CSS hex color for the "Unknown" method sentinel.
pub const UNKNOWN_COLOR: &str = "#9aa0a6";

/// Generates `n` visually distinct colours using evenly spaced hues,
/// rendered as CSS hex strings.
pub fn generate_palette(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n.max(1) as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.72, 0.48);
            let rgb: Srgb = hsl.into_color();
            format!(
                "#{:02x}{:02x}{:02x}",
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: method label → hex color
// ---------------------------------------------------------------------------

/// Assigns each method a colour by cycling a fixed palette in first-seen
/// order. The "Unknown" sentinel always maps to a fixed gray.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, String>,
}

impl ColorMap {
    /// `methods` must be in first-seen (legend) order so that colours stay
    /// stable across rebuilds of the same dataset.
    pub fn new(methods: &[String]) -> Self {
        let palette = generate_palette(PALETTE_SIZE);
        let mut mapping = BTreeMap::new();
        let mut next = 0usize;
        for method in methods {
            let color = if method == UNKNOWN_METHOD {
                UNKNOWN_COLOR.to_string()
            } else {
                let c = palette[next % palette.len()].clone();
                next += 1;
                c
            };
            mapping.insert(method.clone(), color);
        }
        ColorMap { mapping }
    }

    pub fn color_for(&self, method: &str) -> &str {
        self.mapping
            .get(method)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_COLOR)
    }
}
