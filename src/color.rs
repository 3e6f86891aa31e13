//! Hex colors and the linear gradient between two of them.

use std::fmt;
use std::str::FromStr;

use crate::error::HotspotsError;

/// Number of gradient steps. The fraction along the gradient is
/// `percent / (GRADIENT_STEPS - 1)`.
pub const GRADIENT_STEPS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 0xff,
        g: 0xff,
        b: 0xff,
    };

    /// Lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Rgb {
    type Err = HotspotsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HotspotsError::ColorDecode(s.to_string());

        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());

        Ok(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color at `percent` along the gradient from `lower` to `upper`.
///
/// Channels are truncated toward zero and clamped to `0..=255`; percentages
/// above 99 overshoot `upper` before clamping.
#[must_use]
pub fn gradient(percent: f64, lower: Rgb, upper: Rgb) -> Rgb {
    let fraction = percent / f64::from(GRADIENT_STEPS - 1);
    let mix = |start: u8, end: u8| {
        let start = f64::from(start);
        let value = start + fraction * (f64::from(end) - start);
        value.trunc().clamp(0.0, 255.0) as u8
    };

    Rgb {
        r: mix(lower.r, upper.r),
        g: mix(lower.g, upper.g),
        b: mix(lower.b, upper.b),
    }
}
