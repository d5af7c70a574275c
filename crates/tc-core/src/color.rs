//! RGBA colors and the CSS color-string parser.
//!
//! Colors travel through templates, snapshots and the property panel as CSS
//! strings, so `Color` serializes as its hex form and deserializes through
//! [`parse_css_color`]. The parser is built on `winnow` and accepts hex
//! notation, `rgb()`/`rgba()` functions and the handful of named colors the
//! editor itself emits.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::prelude::*;
use winnow::token::take_while;

/// RGBA color, 4 × f32 in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`; the `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let digits = hex
            .bytes()
            .map(hex_val)
            .collect::<Option<Vec<u8>>>()?;

        let (channels, alpha) = match digits.len() {
            3 | 4 => {
                let expand = |d: u8| d * 17;
                let channels = [expand(digits[0]), expand(digits[1]), expand(digits[2])];
                (channels, digits.get(3).map(|d| expand(*d)))
            }
            6 | 8 => {
                let pair = |i: usize| digits[i] << 4 | digits[i + 1];
                let channels = [pair(0), pair(2), pair(4)];
                (channels, (digits.len() == 8).then(|| pair(6)))
            }
            _ => return None,
        };

        Some(Self::rgba(
            channels[0] as f32 / 255.0,
            channels[1] as f32 / 255.0,
            channels[2] as f32 / 255.0,
            alpha.map_or(1.0, |a| a as f32 / 255.0),
        ))
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Shortest hex form: `#RRGGBB` when opaque, `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// `rgba(...)` form understood by Canvas2D.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn with_alpha_scaled(&self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..*self
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = EditorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        parse_css_color(&s)
    }
}

impl FromStr for Color {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_css_color(s)
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────

/// Parse a CSS color string.
pub fn parse_css_color(source: &str) -> Result<Color, EditorError> {
    let mut input = source.trim();
    let color = alt((hex_color, rgb_function, named_color))
        .parse_next(&mut input)
        .map_err(|_| EditorError::Color(source.to_string()))?;
    if !input.trim().is_empty() {
        return Err(EditorError::Color(source.to_string()));
    }
    Ok(color)
}

fn hex_color(input: &mut &str) -> ModalResult<Color> {
    preceded('#', take_while(1..=8, |c: char| c.is_ascii_hexdigit()))
        .verify_map(Color::from_hex)
        .parse_next(input)
}

fn channel(input: &mut &str) -> ModalResult<f32> {
    delimited(
        multispace0,
        take_while(1.., |c: char| c.is_ascii_digit() || c == '.'),
        multispace0,
    )
    .verify_map(|digits: &str| digits.parse::<f32>().ok())
    .parse_next(input)
}

fn rgb_function(input: &mut &str) -> ModalResult<Color> {
    (
        alt(("rgba(", "rgb(")),
        channel,
        ',',
        channel,
        ',',
        channel,
        opt(preceded(',', channel)),
        ')',
    )
        .map(|(_, r, _, g, _, b, a, _)| {
            Color::rgba(
                (r / 255.0).clamp(0.0, 1.0),
                (g / 255.0).clamp(0.0, 1.0),
                (b / 255.0).clamp(0.0, 1.0),
                a.unwrap_or(1.0).clamp(0.0, 1.0),
            )
        })
        .parse_next(input)
}

fn named_color(input: &mut &str) -> ModalResult<Color> {
    take_while(1.., |c: char| c.is_ascii_alphabetic())
        .verify_map(|name: &str| match name.to_ascii_lowercase().as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "transparent" => Some(Color::TRANSPARENT),
            "red" => Some(Color::rgb8(255, 0, 0)),
            "gray" | "grey" => Some(Color::rgb8(128, 128, 128)),
            _ => None,
        })
        .parse_next(input)
}
