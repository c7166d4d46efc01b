//! Light and dark themes
//!
//! Themes are TextMate `.tmTheme` plists loaded through syntect. The
//! highlighter always holds exactly two compiled themes, one per
//! [`ThemeVariant`].

use std::borrow::Cow;
use std::io::Cursor;

use syntect::highlighting::{self, FontStyle as SyntectFont, Style, ThemeSet};

use crate::error::HighlightError;
use crate::style::{Color, FontStyle, TokenStyle};

const VITESSE_LIGHT: &str = include_str!("../themes/vitesse-light.tmTheme");
const VITESSE_DARK: &str = include_str!("../themes/vitesse-dark.tmTheme");

/// Dark background matching the site's zinc-900 dark mode
pub const DEFAULT_DARK_BACKGROUND: &str = "#18181b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeVariant {
    Light,
    Dark,
}

/// Uncompiled theme: a `.tmTheme` document and an optional background
/// override
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSpec {
    pub name: String,
    pub tm_theme: Cow<'static, str>,
    /// Replaces the theme's own background colour
    pub background: Option<String>,
}

impl ThemeSpec {
    pub fn new(name: impl Into<String>, tm_theme: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            tm_theme: tm_theme.into(),
            background: None,
        }
    }

    /// Parse the plist and apply the background override
    pub fn compile(&self) -> Result<Theme, HighlightError> {
        let mut inner = ThemeSet::load_from_reader(&mut Cursor::new(self.tm_theme.as_bytes()))
            .map_err(|e| HighlightError::theme(&self.name, e))?;

        if let Some(bg) = &self.background {
            let color: Color = bg
                .parse()
                .map_err(|message| HighlightError::theme(&self.name, message))?;
            inner.settings.background = Some(color.into());
        }

        let fg = inner
            .settings
            .foreground
            .ok_or_else(|| HighlightError::theme(&self.name, "no default foreground"))?;
        let bg = inner
            .settings
            .background
            .ok_or_else(|| HighlightError::theme(&self.name, "no default background"))?;

        Ok(Theme {
            name: self.name.clone(),
            fg: fg.into(),
            bg: bg.into(),
            inner,
        })
    }
}

/// Compiled theme
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub fg: Color,
    pub bg: Color,
    inner: highlighting::Theme,
}

impl Theme {
    pub(crate) fn syntect(&self) -> &highlighting::Theme {
        &self.inner
    }

    /// Convert a resolved syntect style
    ///
    /// The theme's default foreground maps to no colour so unscoped text
    /// inherits the block colour.
    pub fn token_style(&self, style: Style) -> TokenStyle {
        let color = Color::from(style.foreground);
        TokenStyle {
            color: (color != self.fg).then_some(color),
            font: FontStyle {
                bold: style.font_style.contains(SyntectFont::BOLD),
                italic: style.font_style.contains(SyntectFont::ITALIC),
                underline: style.font_style.contains(SyntectFont::UNDERLINE),
            },
        }
    }
}

/// The two theme definitions a highlighter is built from
#[derive(Debug, Clone, PartialEq)]
pub struct ThemePair {
    pub light: ThemeSpec,
    pub dark: ThemeSpec,
}

impl ThemePair {
    /// vitesse-light and vitesse-dark, with the dark background swapped for
    /// [`DEFAULT_DARK_BACKGROUND`]
    pub fn vitesse() -> Self {
        Self {
            light: ThemeSpec::new("vitesse-light", VITESSE_LIGHT),
            dark: ThemeSpec::new("vitesse-dark", VITESSE_DARK),
        }
        .with_dark_background(DEFAULT_DARK_BACKGROUND)
    }

    pub fn with_dark_background(mut self, bg: &str) -> Self {
        self.dark.background = Some(bg.to_string());
        self
    }
}

impl Default for ThemePair {
    fn default() -> Self {
        Self::vitesse()
    }
}

/// CSS variables a code block's chrome uses to match the themes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeVars {
    pub light_fg: Color,
    pub dark_fg: Color,
    pub light_bg: Color,
    pub dark_bg: Color,
}

impl ThemeVars {
    pub fn new(light: &Theme, dark: &Theme) -> Self {
        Self {
            light_fg: light.fg,
            dark_fg: dark.fg,
            light_bg: light.bg,
            dark_bg: dark.bg,
        }
    }

    pub fn to_css(&self) -> String {
        format!(
            "--shiki-light:{};--shiki-dark:{};--shiki-light-bg:{};--shiki-dark-bg:{}",
            self.light_fg, self.dark_fg, self.light_bg, self.dark_bg
        )
    }
}
