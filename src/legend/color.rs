//! Color values for legend entries and clinical tracks.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An sRGB color, optionally with opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// RGB color with values 0-255
    Rgb(u8, u8, u8),
    /// RGBA color with alpha 0.0-1.0
    Rgba(u8, u8, u8, f64),
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(r, g, b)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color::Rgba(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)? as f64 / 255.0,
            )),
            _ => None,
        }
    }

    /// Uppercase `#RRGGBB`, with an alpha byte appended when not opaque.
    pub fn to_hex(&self) -> String {
        match *self {
            Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
            Color::Rgba(r, g, b, a) if a >= 1.0 => format!("#{:02X}{:02X}{:02X}", r, g, b),
            Color::Rgba(r, g, b, a) => format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                r,
                g,
                b,
                (a * 255.0).round() as u8
            ),
        }
    }

    pub const BLACK: Color = Color::Rgb(0, 0, 0);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color '{}'", s)))
    }
}

/// Event label used for the fallback color.
pub const OTHER_MUTATION: &str = "OTHER";

/// Fill for cells without any event.
pub const NO_ALTERATION_COLOR: Color = Color::rgb(0xEE, 0xEE, 0xEE);

/// Default track color for clinical tracks (medium sea green).
pub const CLINICAL_TRACK_COLOR: Color = Color::rgb(0x3C, 0xB3, 0x71);

/// Built-in event colors.
pub const DEFAULT_EVENT_COLORS: [(&str, Color); 9] = [
    ("SNP", Color::rgb(0x85, 0xC1, 0xE9)),
    ("INS", Color::rgb(0xEC, 0x70, 0x63)),
    ("DEL", Color::rgb(0xF5, 0xB0, 0x41)),
    ("TRUNC", Color::rgb(0x00, 0x00, 0x00)),
    ("MISSENSE", Color::rgb(0x32, 0xCD, 0x32)),
    (OTHER_MUTATION, Color::rgb(0xDA, 0x70, 0xD6)),
    ("CNA", Color::rgb(0x00, 0x00, 0xFF)),
    ("EXP", Color::rgb(0xFF, 0x00, 0x00)),
    ("Multi", Color::rgb(0x00, 0x00, 0x00)),
];

/// Palette cycled over clinical categories.
pub const CATEGORY_PALETTE: [Color; 6] = [
    Color::rgb(0x00, 0x00, 0x80),
    Color::rgb(0x46, 0x82, 0xB4),
    Color::rgb(0x87, 0xCE, 0xEB),
    Color::rgb(0xFF, 0xE4, 0xB5),
    Color::rgb(0xFF, 0xA5, 0x00),
    Color::rgb(0xFF, 0x45, 0x00),
];

/// Built-in color for an event, if it has one.
pub fn default_event_color(event: &str) -> Option<Color> {
    DEFAULT_EVENT_COLORS
        .iter()
        .find(|(name, _)| *name == event)
        .map(|(_, c)| *c)
}

/// The color used for events missing from the built-in table.
pub fn other_color() -> Color {
    default_event_color(OTHER_MUTATION).unwrap_or(Color::BLACK)
}

/// Palette color for the `index`-th category.
pub fn category_color(index: usize) -> Color {
    CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
}
