//! 8-bit sRGB colors and the single blending primitive shared by both render
//! paths.
//!
//! Blending is a straight per-channel interpolation of the encoded values; no
//! gamma correction or perceptual space is involved, so midpoints between
//! saturated hues come out darker than a color-managed blend would. Browsers
//! interpolate CSS gradients the same way, which keeps preview and export in
//! agreement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rejected color text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{input}'; expected six hex digits such as #3b82f6")]
pub struct ParseError {
    pub input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`, case-insensitive.
    pub fn from_hex(input: &str) -> Result<Self, ParseError> {
        let err = || ParseError {
            input: input.to_string(),
        };
        let digits = input.strip_prefix('#').unwrap_or(input);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| err())
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// `rgba(r, g, b, a)` text for translucent CSS layers.
    pub fn css_rgba(self, alpha: f32) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-channel `round(c1 + (c2 - c1) * t)` with `t` clamped to `[0, 1]`.
pub fn lerp(c1: Rgb, c2: Rgb, t: f32) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let channel = |a: u8, b: u8| {
        let a = a as f32;
        let b = b as f32;
        (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
    };
    Rgb {
        r: channel(c1.r, c2.r),
        g: channel(c1.g, c2.g),
        b: channel(c1.b, c2.b),
    }
}

/// Blends two unparsed colors into `rgb(r, g, b)` text.
///
/// Never fails: if either side is malformed the first input is returned as-is.
pub fn mix_hex(a: &str, b: &str, t: f32) -> String {
    match (Rgb::from_hex(a), Rgb::from_hex(b)) {
        (Ok(c1), Ok(c2)) => {
            let mixed = lerp(c1, c2, t);
            format!("rgb({}, {}, {})", mixed.r, mixed.g, mixed.b)
        }
        (Err(err), _) | (_, Err(err)) => {
            tracing::debug!(error = %err, fallback = a, "color blend fell back to first input");
            a.to_string()
        }
    }
}
