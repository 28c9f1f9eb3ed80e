//! 8-bit RGBA color with hex parsing, integer blending, and WCAG contrast.
//!
//! All channel arithmetic is integer-only so that the same inputs always
//! produce the same outputs on every platform. The WCAG helpers follow the
//! standard relative-luminance formula and are used to pick readable
//! on-accent foregrounds.

use std::fmt;
use std::str::FromStr;

/// WCAG AA minimum contrast ratio for normal text.
pub const WCAG_AA_NORMAL_TEXT: f64 = 4.5;

/// WCAG AA minimum contrast ratio for large text.
pub const WCAG_AA_LARGE_TEXT: f64 = 3.0;

/// An 8-bit RGBA color.
///
/// Stored as straight (non-premultiplied) channels. The textual form is
/// `#AARRGGBB`; parsing also accepts `#RRGGBB` with an implied opaque
/// alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create an opaque color from RGB channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color from RGBA channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a `0xAARRGGBB` value.
    #[must_use]
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into a `0xAARRGGBB` value.
    #[must_use]
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Return the same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Blend each channel toward `other` by `weight` / 255.
    ///
    /// `weight == 0` returns `self` unchanged, `weight == 255` returns
    /// `other`. Alpha is blended the same way as the color channels.
    #[must_use]
    pub const fn mix(self, other: Self, weight: u8) -> Self {
        const fn lerp(from: u8, to: u8, weight: u8) -> u8 {
            let from = from as i32;
            let to = to as i32;
            (from + (to - from) * weight as i32 / 255) as u8
        }
        Self {
            r: lerp(self.r, other.r, weight),
            g: lerp(self.g, other.g, weight),
            b: lerp(self.b, other.b, weight),
            a: lerp(self.a, other.a, weight),
        }
    }

    /// Blend toward white by `amount` / 255, preserving alpha.
    #[must_use]
    pub const fn lighten(self, amount: u8) -> Self {
        const fn up(c: u8, amount: u8) -> u8 {
            c + ((255 - c) as u16 * amount as u16 / 255) as u8
        }
        Self {
            r: up(self.r, amount),
            g: up(self.g, amount),
            b: up(self.b, amount),
            a: self.a,
        }
    }

    /// Blend toward black by `amount` / 255, preserving alpha.
    #[must_use]
    pub const fn darken(self, amount: u8) -> Self {
        const fn down(c: u8, amount: u8) -> u8 {
            c - (c as u16 * amount as u16 / 255) as u8
        }
        Self {
            r: down(self.r, amount),
            g: down(self.g, amount),
            b: down(self.b, amount),
            a: self.a,
        }
    }

    /// WCAG relative luminance of the color, ignoring alpha.
    ///
    /// Returns a value in `0.0..=1.0` where 0 is black and 1 is white.
    #[must_use]
    pub fn relative_luminance(self) -> f64 {
        fn linearize(channel: u8) -> f64 {
            let c = f64::from(channel) / 255.0;
            if c <= 0.040_45 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linearize(self.r) + 0.7152 * linearize(self.g) + 0.0722 * linearize(self.b)
    }
}

/// WCAG relative luminance of `color`. See [`Rgba::relative_luminance`].
#[must_use]
pub fn relative_luminance(color: Rgba) -> f64 {
    color.relative_luminance()
}

/// WCAG contrast ratio between two colors, in `1.0..=21.0`.
///
/// Symmetric in its arguments: the lighter color is always placed in the
/// numerator.
#[must_use]
pub fn contrast_ratio(a: Rgba, b: Rgba) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Pick black or white, whichever contrasts better against `background`.
#[must_use]
pub fn best_text_color(background: Rgba) -> Rgba {
    if contrast_ratio(Rgba::WHITE, background) >= contrast_ratio(Rgba::BLACK, background) {
        Rgba::WHITE
    } else {
        Rgba::BLACK
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.to_argb())
    }
}

/// Errors that can occur when parsing a hex color string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorParseError {
    /// Input did not start with `#`.
    MissingHash,
    /// Input was not 6 or 8 hex digits long.
    InvalidLength(usize),
    /// Input contained a non-hex character.
    InvalidDigit(char),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHash => write!(f, "color must start with '#'"),
            Self::InvalidLength(len) => {
                write!(f, "expected 6 or 8 hex digits, got {len}")
            }
            Self::InvalidDigit(c) => write!(f, "invalid hex digit {c:?}"),
        }
    }
}

impl std::error::Error for ColorParseError {}

impl FromStr for Rgba {
    type Err = ColorParseError;

    /// Parse `#RRGGBB` or `#AARRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').ok_or(ColorParseError::MissingHash)?;
        let count = digits.chars().count();
        if count != 6 && count != 8 {
            return Err(ColorParseError::InvalidLength(count));
        }
        let mut value: u32 = 0;
        for c in digits.chars() {
            let d = c.to_digit(16).ok_or(ColorParseError::InvalidDigit(c))?;
            value = value << 4 | d;
        }
        if count == 6 {
            value |= 0xFF00_0000;
        }
        Ok(Self::from_argb(value))
    }
}
