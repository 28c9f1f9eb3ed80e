#![forbid(unsafe_code)]

//! Color primitives and accent palette derivation for Duskfall.
//!
//! # Role in Duskfall
//! `dusk-color` is the shared vocabulary for colors. The cascade and the
//! theme manager use these types to populate resource dictionaries without
//! dragging in tree or runtime dependencies.
//!
//! # This crate provides
//! - [`Rgba`] — an 8-bit RGBA color with hex parsing, integer blending,
//!   and WCAG contrast utilities.
//! - [`AccentPalette`] — the fixed, deterministic shade ladder derived
//!   from a single accent color.
//!
//! # How it fits in the system
//! `dusk-tree` stores [`Rgba`] values in resource dictionaries and
//! `dusk-runtime` regenerates the [`AccentPalette`] whenever the effective
//! accent color changes, fanning the named shades out to every cached
//! theme dictionary in one pass.

/// Color type, hex parsing, blending, and contrast utilities.
pub mod color;
/// Accent palette derivation.
pub mod palette;

pub use color::{
    // Color type and parse error
    ColorParseError,
    Rgba,
    // WCAG constants
    WCAG_AA_LARGE_TEXT,
    WCAG_AA_NORMAL_TEXT,
    // WCAG contrast utilities
    best_text_color,
    contrast_ratio,
    relative_luminance,
};
pub use palette::{AccentPalette, DEFAULT_ACCENT};
