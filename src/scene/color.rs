use crate::foundation::core::Rgba8;
use crate::foundation::error::{CertError, CertResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fill or stroke paint: a solid color or nothing at all.
///
/// Accepted spellings are `#rgb`, `#rrggbb`, `#rrggbbaa` (case-insensitive), `none` and
/// `transparent`. Encoding is canonical: `#rrggbb` for opaque colors, `#rrggbbaa` otherwise, and
/// `none` for the empty paint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Paint {
    /// Nothing is painted.
    #[default]
    None,
    /// Solid straight-alpha color.
    Solid(Rgba8),
}

impl Paint {
    /// Opaque black paint.
    pub const BLACK: Self = Self::Solid(Rgba8::BLACK);
    /// Opaque white paint.
    pub const WHITE: Self = Self::Solid(Rgba8::WHITE);

    /// Parse a paint value.
    pub fn parse(s: &str) -> CertResult<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("transparent") {
            return Ok(Self::None);
        }
        parse_hex(s).map(Self::Solid).map_err(CertError::validation)
    }

    /// Solid color, if any.
    pub fn color(self) -> Option<Rgba8> {
        match self {
            Self::None => None,
            Self::Solid(c) if c.a == 0 => None,
            Self::Solid(c) => Some(c),
        }
    }

    /// Return `true` when this paint draws nothing.
    pub fn is_none(self) -> bool {
        self.color().is_none()
    }
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Solid(c) if c.a == 255 => write!(f, "#{:02x}{:02x}{:02x}", c.r, c.g, c.b),
            Self::Solid(c) => write!(f, "#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a),
        }
    }
}

impl FromStr for Paint {
    type Err = CertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Paint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Paint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Paint::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    let hex = s
        .strip_prefix('#')
        .ok_or_else(|| format!("color \"{s}\" must be #rgb, #rrggbb, #rrggbbaa or none"))?;

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !hex.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                let v = ch
                    .to_digit(16)
                    .ok_or_else(|| format!("invalid hex digit '{ch}'"))? as u8;
                *slot = v * 17;
            }
            Ok(Rgba8::opaque(out[0], out[1], out[2]))
        }
        6 => Ok(Rgba8::opaque(
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
        )),
        8 => Ok(Rgba8 {
            r: hex_byte(&hex[0..2])?,
            g: hex_byte(&hex[2..4])?,
            b: hex_byte(&hex[4..6])?,
            a: hex_byte(&hex[6..8])?,
        }),
        _ => Err(format!(
            "color \"{s}\" must be #rgb, #rrggbb or #rrggbbaa (case-insensitive)"
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/color.rs"]
mod tests;
