//! Paint color canonicalization.
//!
//! Documents express the same color in many textual forms (`#fff`,
//! `#FFFFFF`, `rgb(255, 255, 255)`). [`normalize`] folds them into a single
//! [`CanonicalColor`] so colors can be counted, compared and used as keys.

pub mod ranking;

pub use ranking::{Palette, build_palette};

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use palette::Srgb;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

// ============================================================================
// CanonicalColor
// ============================================================================

/// A normalized 24-bit RGB color.
///
/// Displays and serializes as a lowercase `#rrggbb` string. Two paint values
/// are the same color iff their canonical forms are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalColor([u8; 3]);

impl CanonicalColor {
    /// Creates a color from its channels.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self([red, green, blue])
    }

    pub fn red(&self) -> u8 {
        self.0[0]
    }

    pub fn green(&self) -> u8 {
        self.0[1]
    }

    pub fn blue(&self) -> u8 {
        self.0[2]
    }

    /// Returns the color as a `palette` sRGB value.
    pub fn to_srgb(self) -> Srgb<u8> {
        let [r, g, b] = self.0;
        Srgb::new(r, g, b)
    }

    /// Returns the `#rrggbb` form.
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl From<Srgb<u8>> for CanonicalColor {
    fn from(color: Srgb<u8>) -> Self {
        let (r, g, b) = color.into_components();
        Self::new(r, g, b)
    }
}

impl fmt::Display for CanonicalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Returned when a string is not a recognized color form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color '{0}'")]
pub struct ParseColorError(pub String);

impl FromStr for CanonicalColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s).ok_or_else(|| ParseColorError(s.to_string()))
    }
}

impl TryFrom<String> for CanonicalColor {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CanonicalColor> for String {
    fn from(color: CanonicalColor) -> Self {
        color.to_string()
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Canonicalizes a paint color value.
///
/// Recognized forms:
/// - `#rgb` shorthand, expanded by digit duplication
/// - `#rrggbb` in any letter case
/// - `rgb(...)` / `rgba(...)`, using the first three integers found
///
/// Everything else yields `None`, which callers treat as "ignore this color".
pub fn normalize(value: &str) -> Option<CanonicalColor> {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    if value.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("rgb")) {
        return parse_rgb_function(value);
    }

    None
}

fn parse_hex(hex: &str) -> Option<CanonicalColor> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(CanonicalColor::new(
            digit(0)? * 0x11,
            digit(1)? * 0x11,
            digit(2)? * 0x11,
        )),
        6 => Some(CanonicalColor::new(pair(0)?, pair(2)?, pair(4)?)),
        _ => None,
    }
}

fn parse_rgb_function(value: &str) -> Option<CanonicalColor> {
    let mut channels = INTEGER.find_iter(value).map(|m| m.as_str().parse::<u8>());
    let r = channels.next()?.ok()?;
    let g = channels.next()?.ok()?;
    let b = channels.next()?.ok()?;
    Some(CanonicalColor::new(r, g, b))
}

// ============================================================================
// Tests
// ============================================================================
