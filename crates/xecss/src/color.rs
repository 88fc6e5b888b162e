//! Named palette and hex color resolution with tint and opacity.

use std::ops::Range;

/// Fallback for tokens that are neither palette names, keywords nor hex digits
pub const DEFAULT_COLOR: &str = "#0084ff";

const PALETTE: &[(&str, &str)] = &[
  ("primary", "#0084ff"),
  ("danger", "#f9463f"),
  ("warning", "#fa8c16"),
  ("info", "#abb2c2"),
  ("success", "#24b47e"),
  ("red", "#ff3333"),
  ("purple", "#ff33a9"),
  ("orange", "#ff8833"),
  ("blue", "#3377ff"),
  ("deep", "#2c96ff"),
  ("weak", "#b9fdfb"),
  ("gray", "#8c939d"),
  ("white", "#ffffff"),
  ("black", "#000000"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

impl Rgb {
  /// Parses a lowercase `#rrggbb` color
  pub fn from_hex(color: &str) -> Option<Self> {
    let digits = color.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(is_lower_hex_digit) {
      return None;
    }

    let channel = |range: Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Rgb {
      r: channel(0..2)?,
      g: channel(2..4)?,
      b: channel(4..6)?,
    })
  }

  /// Moves every channel towards white.
  ///
  /// `depth` is how much of the source color is kept: 100 keeps it unchanged, 0 yields white.
  /// Channels are truncated, not rounded.
  pub fn tint(self, depth: u32) -> Self {
    let weight = f64::from(100 - depth.min(100)) / 100.0;
    let mix = |channel: u8| {
      let channel = f64::from(channel);
      (channel + (255.0 - channel) * weight) as u8
    };
    Rgb {
      r: mix(self.r),
      g: mix(self.g),
      b: mix(self.b),
    }
  }
}

fn is_lower_hex_digit(byte: u8) -> bool {
  byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte)
}

/// Resolves a color token: palette names first, then bare CSS keywords, then 3 or 6 hex digits.
/// Anything else falls back to [`DEFAULT_COLOR`].
pub fn resolve_color(token: &str) -> String {
  if let Some((_, color)) = PALETTE.iter().find(|(name, _)| *name == token) {
    return color.to_string();
  }

  if !token.is_empty() && token.bytes().all(|byte| byte.is_ascii_alphabetic()) {
    return token.to_string();
  }

  if matches!(token.len(), 3 | 6) && token.bytes().all(is_lower_hex_digit) {
    return format!("#{token}");
  }

  DEFAULT_COLOR.to_string()
}

/// CSS value for a color token with optional tint depth and opacity percentages.
///
/// Six digit hex colors become `rgba(...)`; anything else (keywords, short hex) is returned as
/// resolved and ignores tint and opacity.
pub fn color_value(token: &str, depth: Option<u32>, opacity: Option<u32>) -> String {
  let color = resolve_color(token);
  let Some(rgb) = Rgb::from_hex(&color) else {
    return color;
  };

  let rgb = depth.map_or(rgb, |depth| rgb.tint(depth));
  let alpha = opacity.map_or(1.0, |opacity| f64::from(opacity.min(100)) / 100.0);

  format!("rgba({},{},{},{})", rgb.r, rgb.g, rgb.b, alpha)
}

/// Parses an optional percentage capture; empty captures are absent and oversized ones clamp.
pub fn percentage(capture: &str) -> Option<u32> {
  if capture.is_empty() {
    return None;
  }
  Some(capture.parse::<u32>().unwrap_or(100).min(100))
}
