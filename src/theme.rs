//! Light/dark presentation mode.
//!
//! Only rendering reads the mode. The report takes its banner, rule and
//! label colours from the palette; nothing here touches result data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::view::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn from_str_loose(s: &str) -> Option<ThemeMode> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

/// `#rrggbb` colour token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(v: u32) -> Self {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// 24-bit ANSI foreground escape.
    pub fn ansi_fg(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.0, self.1, self.2)
    }

    /// 24-bit ANSI background escape.
    pub fn ansi_bg(&self) -> String {
        format!("\x1b[48;2;{};{};{}m", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

pub const ANSI_RESET: &str = "\x1b[0m";

/// Colours a chart needs from the active mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPalette {
    pub tooltip_background: Rgb,
    pub tooltip_border: Rgb,
    pub text: Rgb,
    pub label: Rgb,
    pub equity_line: Rgb,
    pub buy: Rgb,
    pub sell: Rgb,
}

impl ChartPalette {
    pub fn for_mode(mode: ThemeMode) -> Self {
        let (tooltip_background, tooltip_border, text, label) = match mode {
            ThemeMode::Light => (
                Rgb::hex(0xffffff),
                Rgb::hex(0xe5e7eb),
                Rgb::hex(0x111827),
                Rgb::hex(0x6b7280),
            ),
            ThemeMode::Dark => (
                Rgb::hex(0x020617),
                Rgb::hex(0x1e293b),
                Rgb::hex(0xe5e7eb),
                Rgb::hex(0x9ca3af),
            ),
        };
        Self {
            tooltip_background,
            tooltip_border,
            text,
            label,
            equity_line: Rgb::hex(0x4f46e5),
            buy: Rgb::hex(0x16a34a),
            sell: Rgb::hex(0xdc2626),
        }
    }

    /// Colour for a classified value: buy green, sell red, else body text.
    pub fn value_color(&self, class: Classification) -> Rgb {
        match class {
            Classification::Positive => self.buy,
            Classification::Negative => self.sell,
            Classification::Neutral => self.text,
        }
    }
}

/// Holds the active mode for the whole session.
#[derive(Debug, Clone, Default)]
pub struct ThemeContext {
    mode: ThemeMode,
}

impl ThemeContext {
    pub fn new(mode: ThemeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn toggle(&mut self) -> ThemeMode {
        self.mode = self.mode.flipped();
        self.mode
    }

    /// Class applied at the root of the rendering tree.
    pub fn root_class(&self) -> &'static str {
        match self.mode {
            ThemeMode::Light => "theme-light",
            ThemeMode::Dark => "theme-dark",
        }
    }

    pub fn palette(&self) -> ChartPalette {
        ChartPalette::for_mode(self.mode)
    }
}
