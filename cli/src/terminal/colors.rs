//! Console palette. Everything printed picks its color from here.

use colored::Color;

pub const PRIMARY: Color = Color::BrightCyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const ACCENT: Color = Color::BrightGreen;

/// Region, name and device columns of an ordinary TM.
pub const META: Color = Color::White;
/// Same columns for TMs on the automated addressing scheme.
pub const META_AUTOMATED: Color = Color::Yellow;

pub const SUCCESS: Color = Color::Green;
pub const FAILURE: Color = Color::Red;
pub const PORT_CLOSED: Color = Color::Magenta;
pub const LOSS: Color = Color::TrueColor {
    r: 255,
    g: 165,
    b: 0,
};
pub const MUTED: Color = Color::BrightBlack;

pub const LINE_HEADER: Color = Color::Yellow;
pub const LINE_DOWN: Color = Color::Red;
pub const LINE_UP: Color = Color::Green;
