//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color,
//! plus the per-colour table used to draw pieces.

use cascadetui::PieceColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// How one piece colour is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceLook {
    pub color: Color,
    pub glyph: &'static str,
}

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours in [`PieceColor::PLAYABLE`] order: red, blue, green, yellow, purple, heart.
    pub pieces: [Color; 6],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (stats, help).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text.
    pub inactive_fg: Color,
}

/// Glyphs in [`PieceColor::PLAYABLE`] order, so colour is never the only cue.
const GLYPHS: [&str; 6] = ["●", "◆", "▲", "■", "✚", "♥"];

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

/// `(key, fallback)` per piece colour, in [`PieceColor::PLAYABLE`] order.
const PIECE_KEYS: [(&str, Color); 6] = [
    ("cpu_end", Color::Rgb(0xE0, 0x6C, 0x75)),
    ("cpu_box", Color::Rgb(0x61, 0xAF, 0xEF)),
    ("mem_box", Color::Rgb(0x98, 0xC3, 0x79)),
    ("title", Color::Rgb(0xE5, 0xC0, 0x7B)),
    ("net_box", Color::Rgb(0xC6, 0x78, 0xDD)),
    ("hi_fg", Color::Rgb(0xE8, 0x7E, 0xA8)),
];

impl Theme {
    /// One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            pieces: PIECE_KEYS.map(|(_, c)| c),
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override piece colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.pieces = [
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0xFF),
                ];
            }
            crate::Palette::Colorblind => {
                // Okabe-Ito style: no red/green pair without a brightness gap.
                self.pieces = [
                    Color::Rgb(0xCC, 0x33, 0x11),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0xBB, 0xBB, 0x00),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let defaults = Self::onedark_default();
        Self {
            pieces: PIECE_KEYS.map(|(key, fallback)| get(key).unwrap_or(fallback)),
            bg: get("main_bg").unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
        }
    }

    /// Colour and glyph for a piece; the sentinel draws as blank background.
    pub fn piece_look(&self, color: PieceColor) -> PieceLook {
        match color.index() {
            Some(i) => PieceLook {
                color: self.pieces[i],
                glyph: GLYPHS[i],
            },
            None => PieceLook {
                color: self.bg,
                glyph: " ",
            },
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>, scale: u8| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .map(|v| v * scale)
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2, 1)?, channel(2..4, 1)?, channel(4..6, 1)?),
        3 => (channel(0..1, 17)?, channel(1..2, 17)?, channel(2..3, 17)?),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex("#12"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GG0000"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[main_bg]="#31353F""##);
        assert_eq!(map.get("main_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_piece_colour() {
        let map = parse_theme_file("theme[cpu_end]='#010203'\n# comment\n");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.piece_look(PieceColor::Red).color, Color::Rgb(1, 2, 3));
        assert_eq!(theme.piece_look(PieceColor::Blue).color, Color::Rgb(0x61, 0xAF, 0xEF));
    }

    #[test]
    fn test_every_playable_colour_has_a_distinct_glyph() {
        let theme = Theme::default();
        let glyphs: std::collections::HashSet<_> = PieceColor::PLAYABLE
            .iter()
            .map(|&c| theme.piece_look(c).glyph)
            .collect();
        assert_eq!(glyphs.len(), 6);
        assert_eq!(theme.piece_look(PieceColor::None).glyph, " ");
    }
}
