use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{LabelColumn, Wave};

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
            // Offset so the first wave (P) is blue.
            let hue = (210.0 + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.5);
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
// Wave colours: one hue per wave, shared by its interval and peak labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WavePalette {
    mapping: BTreeMap<Wave, Color32>,
}

impl Default for WavePalette {
    fn default() -> Self {
        let mapping = Wave::ALL
            .into_iter()
            .zip(generate_palette(Wave::ALL.len()))
            .collect();
        WavePalette { mapping }
    }
}

impl WavePalette {
    pub fn color_for(&self, column: LabelColumn) -> Color32 {
        self.mapping
            .get(&column.wave())
            .copied()
            .unwrap_or(Color32::GRAY)
    }

    /// Translucent variant for shaded intervals.
    pub fn fill_for(&self, column: LabelColumn) -> Color32 {
        self.color_for(column).gamma_multiply(0.2)
    }
}
