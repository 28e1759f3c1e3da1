//! CSS color values (`#rgb`, `#rrggbbaa`, `rgb()`, `rgba()`, a few names).
//!
//! Layout JSON carries colors as CSS strings. The browser interprets them
//! directly; native painters need them as channels.

use winnow::combinator::{alt, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS color string. Returns `None` for anything unrecognized.
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_ascii_lowercase();
        let mut rest = lowered.as_str();
        let color = alt((parse_hex, parse_rgb_function, parse_named))
            .parse_next(&mut rest)
            .ok()?;
        rest.trim().is_empty().then_some(color)
    }

    /// `#rrggbb`, or `#rrggbbaa` when translucent.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn parse_hex(input: &mut &str) -> ModalResult<Rgba> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(3..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    let d: Vec<u8> = digits
        .bytes()
        .map(hex_val)
        .collect::<Option<_>>()
        .ok_or_else(backtrack)?;
    let pair = |i: usize| d[i] << 4 | d[i + 1];
    match d.len() {
        3 => Ok(Rgba::new(d[0] * 17, d[1] * 17, d[2] * 17, 255)),
        4 => Ok(Rgba::new(d[0] * 17, d[1] * 17, d[2] * 17, d[3] * 17)),
        6 => Ok(Rgba::new(pair(0), pair(2), pair(4), 255)),
        8 => Ok(Rgba::new(pair(0), pair(2), pair(4), pair(6))),
        _ => Err(backtrack()),
    }
}

/// Consume optional whitespace (concrete error type avoids inference issues).
fn skip_space(input: &mut &str) {
    use winnow::ascii::space0;
    let _: Result<&str, ErrMode<ContextError>> = space0.parse_next(input);
}

fn skip_digits(input: &mut &str) {
    use winnow::ascii::digit0;
    let _: Result<&str, ErrMode<ContextError>> = digit0.parse_next(input);
}

fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') {
        *input = &input[1..];
    }
    skip_digits(input);
    if input.starts_with('.') {
        *input = &input[1..];
        skip_digits(input);
    }
    let matched = &start[..start.len() - input.len()];
    matched.parse::<f64>().map_err(|_| backtrack())
}

/// A channel: `0..=255` or a percentage.
fn parse_channel(input: &mut &str) -> ModalResult<u8> {
    let n = parse_number(input)?;
    let percent: Option<char> = opt('%').parse_next(input)?;
    let value = if percent.is_some() { n / 100.0 * 255.0 } else { n };
    Ok(value.round().clamp(0.0, 255.0) as u8)
}

/// Alpha: `0..=1` or a percentage.
fn parse_alpha(input: &mut &str) -> ModalResult<u8> {
    let n = parse_number(input)?;
    let percent: Option<char> = opt('%').parse_next(input)?;
    let fraction = if percent.is_some() { n / 100.0 } else { n };
    Ok((fraction.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn separator(input: &mut &str) {
    skip_space(input);
    if input.starts_with(',') || input.starts_with('/') {
        *input = &input[1..];
    }
    skip_space(input);
}

fn parse_rgb_function(input: &mut &str) -> ModalResult<Rgba> {
    let _ = alt(("rgba", "rgb")).parse_next(input)?;
    skip_space(input);
    let _ = '('.parse_next(input)?;
    skip_space(input);
    let r = parse_channel(input)?;
    separator(input);
    let g = parse_channel(input)?;
    separator(input);
    let b = parse_channel(input)?;
    separator(input);
    let a = if input.starts_with(')') {
        255
    } else {
        parse_alpha(input)?
    };
    skip_space(input);
    let _ = ')'.parse_next(input)?;
    Ok(Rgba::new(r, g, b, a))
}

fn parse_named(input: &mut &str) -> ModalResult<Rgba> {
    let name: &str = take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)?;
    let color = match name {
        "transparent" => Rgba::TRANSPARENT,
        "black" => Rgba::BLACK,
        "white" => Rgba::WHITE,
        "red" => Rgba::new(255, 0, 0, 255),
        "green" => Rgba::new(0, 128, 0, 255),
        "blue" => Rgba::new(0, 0, 255, 255),
        "gray" | "grey" => Rgba::new(128, 128, 128, 255),
        "gold" => Rgba::new(255, 215, 0, 255),
        "ivory" => Rgba::new(255, 255, 240, 255),
        "pink" => Rgba::new(255, 192, 203, 255),
        _ => return Err(backtrack()),
    };
    Ok(color)
}
