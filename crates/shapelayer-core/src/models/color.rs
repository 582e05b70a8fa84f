//! RGBA colors as stored in legend records (`rrggbb` or `rrggbbaa` hex).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ShapeLayerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Substituted wherever a color is missing or malformed, so the problem is
    /// visible on the map instead of silently blending in.
    pub const ALARM: Color = Color::rgb(255, 0, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse an optional stored color, falling back to [`Color::ALARM`].
    pub fn parse_or_alarm(value: Option<&str>) -> Self {
        match value.map(str::parse::<Color>) {
            Some(Ok(color)) => color,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Unparseable legend color, using alarm color");
                Color::ALARM
            }
            None => Color::ALARM,
        }
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
        };
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl FromStr for Color {
    type Err = ShapeLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || ShapeLayerError::ConfigInvalid {
            key: "color".to_string(),
            reason: format!("Invalid hex color: {:?}", s),
        };
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl TryFrom<String> for Color {
    type Error = ShapeLayerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb_and_rgba() {
        assert_eq!("ff0000".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
        assert_eq!("#00ff0080".parse::<Color>().unwrap(), Color::rgba(0, 255, 0, 128));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("red".parse::<Color>().is_err());
        assert!("zzzzzz".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn test_parse_or_alarm() {
        assert_eq!(Color::parse_or_alarm(None), Color::ALARM);
        assert_eq!(Color::parse_or_alarm(Some("nope")), Color::ALARM);
        assert_eq!(Color::parse_or_alarm(Some("0000ff")), Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(200, 100, 50);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Color::rgb(100, 50, 25));
        assert_eq!(a.lerp(&b, 7.0), b);
    }

    #[test]
    fn test_hex_roundtrip_through_serde() {
        let json = serde_json::to_string(&Color::rgb(255, 185, 117)).unwrap();
        assert_eq!(json, "\"#ffb975\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(255, 185, 117));
    }
}
