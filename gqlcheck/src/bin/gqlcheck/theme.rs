use colored::Color;
use comfy_table::Color as TableColor;
use gqlcheck::Severity;
use once_cell::sync::Lazy;

/// Colors for status lines, help output and change severities
pub struct ColorTheme {
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub highlight: Color,
    pub muted: Color,
    pub primary: Color,
    pub secondary: Color,
    pub key: Color,
    pub value: Color,
    pub breaking: Color,
    pub dangerous: Color,
    pub safe: Color,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
            highlight: Color::Cyan,
            muted: Color::BrightBlack,
            primary: Color::BrightBlue,
            secondary: Color::Magenta,
            key: Color::BrightCyan,
            value: Color::White,
            breaking: Color::BrightRed,
            dangerous: Color::Yellow,
            safe: Color::Green,
        }
    }
}

impl ColorTheme {
    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Breaking => self.breaking,
            Severity::Dangerous => self.dangerous,
            Severity::Safe => self.safe,
        }
    }
}

pub static THEME: Lazy<ColorTheme> = Lazy::new(ColorTheme::default);

/// Glyphs for status lines and severity markers
pub struct Icons {
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub arrow: &'static str,
    pub bullet: &'static str,
}

pub const ICONS: Icons = Icons {
    success: "✓",
    error: "✗",
    warning: "⚠",
    info: "ℹ",
    arrow: "→",
    bullet: "•",
};

impl Icons {
    pub fn severity(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Breaking => self.error,
            Severity::Dangerous => self.warning,
            Severity::Safe => self.success,
        }
    }
}

/// Map a theme color onto comfy-table's palette.
pub fn table_color(color: Color) -> TableColor {
    match color {
        Color::Black => TableColor::Black,
        Color::Red => TableColor::DarkRed,
        Color::Green => TableColor::DarkGreen,
        Color::Yellow => TableColor::DarkYellow,
        Color::Blue => TableColor::DarkBlue,
        Color::Magenta => TableColor::DarkMagenta,
        Color::Cyan => TableColor::DarkCyan,
        Color::White => TableColor::Grey,
        Color::BrightBlack => TableColor::DarkGrey,
        Color::BrightRed => TableColor::Red,
        Color::BrightGreen => TableColor::Green,
        Color::BrightYellow => TableColor::Yellow,
        Color::BrightBlue => TableColor::Blue,
        Color::BrightMagenta => TableColor::Magenta,
        Color::BrightCyan => TableColor::Cyan,
        Color::BrightWhite => TableColor::White,
        Color::TrueColor { r, g, b } => TableColor::Rgb { r, g, b },
    }
}
