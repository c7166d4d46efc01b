//! Colours and text styles for highlighted tokens
//!
//! A token carries one [`TokenStyle`] per theme. The pair is rendered as an
//! inline CSS string where the light theme drives the plain properties and
//! the dark theme is published through `--shiki-dark*` custom properties, so
//! a single stylesheet rule can switch between them.

use std::fmt;
use std::str::FromStr;

/// RGBA colour parsed from `#rrggbb` or `#rrggbbaa`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha channel, `None` when the source had no alpha component
    pub a: Option<u8>,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }
}

/// Opaque syntect colours carry no alpha
impl From<syntect::highlighting::Color> for Color {
    fn from(c: syntect::highlighting::Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: (c.a != u8::MAX).then_some(c.a),
        }
    }
}

impl From<Color> for syntect::highlighting::Color {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a.unwrap_or(u8::MAX),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("colour `{s}` must start with '#'"))?;
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return Err(format!("colour `{s}` must be #rrggbb or #rrggbbaa"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("colour `{s}` has a non-hex digit"))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { Some(channel(6)?) } else { None },
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if let Some(a) = self.a {
            write!(f, "{a:02x}")?;
        }
        Ok(())
    }
}

/// Font attributes a theme may attach to a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl FontStyle {
    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.underline
    }
}

/// Style of a token under one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TokenStyle {
    /// Foreground colour, `None` inherits the code block's foreground
    pub color: Option<Color>,
    pub font: FontStyle,
}

impl TokenStyle {
    pub fn fg(color: Color) -> Self {
        Self {
            color: Some(color),
            font: FontStyle::default(),
        }
    }

    /// Check if this style leaves the token unstyled
    pub fn is_plain(&self) -> bool {
        self.color.is_none() && self.font.is_plain()
    }
}

/// Light and dark styles for one token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct DualStyle {
    pub light: TokenStyle,
    pub dark: TokenStyle,
}

impl DualStyle {
    pub fn new(light: TokenStyle, dark: TokenStyle) -> Self {
        Self { light, dark }
    }

    pub fn is_plain(&self) -> bool {
        self.light.is_plain() && self.dark.is_plain()
    }

    /// Render as an inline CSS declaration list (`prop:value` joined by `;`)
    ///
    /// Plain styles render as the empty string.
    pub fn to_css(&self) -> String {
        let mut props: Vec<String> = Vec::new();

        if let Some(color) = self.light.color {
            props.push(format!("color:{color}"));
        }
        if let Some(color) = self.dark.color {
            props.push(format!("--shiki-dark:{color}"));
        }
        push_font(&mut props, "", self.light.font);
        push_font(&mut props, "--shiki-dark-", self.dark.font);

        props.join(";")
    }
}

fn push_font(props: &mut Vec<String>, prefix: &str, font: FontStyle) {
    if font.italic {
        props.push(format!("{prefix}font-style:italic"));
    }
    if font.bold {
        props.push(format!("{prefix}font-weight:bold"));
    }
    if font.underline {
        props.push(format!("{prefix}text-decoration:underline"));
    }
}
