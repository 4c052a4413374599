//! Named colors, looked up case-insensitively ("PowderBlue", "powder_blue"
//! and "powderblue" are the same entry).

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: 1.0,
        }
    }
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("alice_blue", [240, 248, 255]),
    ("banana", [227, 207, 87]),
    ("black", [0, 0, 0]),
    ("blue", [0, 0, 255]),
    ("burlywood", [222, 184, 135]),
    ("cornsilk", [255, 248, 220]),
    ("dark_slate_gray", [47, 79, 79]),
    ("gold", [255, 215, 0]),
    ("green", [0, 128, 0]),
    ("ivory", [255, 255, 240]),
    ("light_gray", [211, 211, 211]),
    ("midnight_blue", [25, 25, 112]),
    ("mint", [189, 252, 201]),
    ("misty_rose", [255, 228, 225]),
    ("navy", [0, 0, 128]),
    ("orange", [255, 165, 0]),
    ("peach_puff", [255, 218, 185]),
    ("peacock", [51, 161, 201]),
    ("powder_blue", [176, 224, 230]),
    ("red", [255, 0, 0]),
    ("sea_green", [46, 139, 87]),
    ("silver", [192, 192, 192]),
    ("slate_gray", [112, 128, 144]),
    ("steel_blue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("tomato", [255, 99, 71]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
];

lazy_static! {
    static ref PALETTE: HashMap<String, Color> = NAMED_COLORS
        .iter()
        .map(|&(name, [r, g, b])| (normalize(name), Color::from_rgb8(r, g, b)))
        .collect();
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn named_color(name: &str) -> Option<Color> {
    PALETTE.get(&normalize(name)).copied()
}

/// Like [`named_color`], falling back to white with a warning for unknown names.
pub fn color_or_white(name: &str) -> Color {
    named_color(name).unwrap_or_else(|| {
        log::warn!("unknown color name {:?}, using white", name);
        Color::new(1.0, 1.0, 1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_colors_resolve() {
        for name in ["Mint", "Tomato", "PowderBlue", "Burlywood"] {
            assert!(named_color(name).is_some(), "{} missing", name);
        }
        assert_eq!(named_color("Tomato"), Some(Color::from_rgb8(255, 99, 71)));
    }

    #[test]
    fn lookup_ignores_case_and_separators() {
        assert_eq!(named_color("powder_blue"), named_color("POWDERBLUE"));
        assert_eq!(named_color("Powder Blue"), named_color("PowderBlue"));
    }

    #[test]
    fn unknown_names_fall_back_to_white() {
        assert_eq!(named_color("NotAColor"), None);
        assert_eq!(color_or_white("NotAColor"), Color::new(1.0, 1.0, 1.0));
    }
}
