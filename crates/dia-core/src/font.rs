//! Font descriptions and the metrics used for text layout.
//!
//! Geometry must be reproducible without a text shaping backend, so the
//! text engine measures through the [`FontMetrics`] trait and the core
//! ships a deterministic table-based implementation.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Style bits ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSlant {
    #[default]
    Normal,
    Oblique,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    UltraLight,
    Light,
    #[default]
    Normal,
    Medium,
    DemiBold,
    Bold,
    UltraBold,
    Heavy,
}

impl FontWeight {
    fn code(self) -> u8 {
        match self {
            FontWeight::Normal => 0,
            FontWeight::UltraLight => 1,
            FontWeight::Light => 2,
            FontWeight::Medium => 3,
            FontWeight::DemiBold => 4,
            FontWeight::Bold => 5,
            FontWeight::UltraBold => 6,
            FontWeight::Heavy => 7,
        }
    }

    fn from_code(code: u8) -> Self {
        match code {
            1 => FontWeight::UltraLight,
            2 => FontWeight::Light,
            3 => FontWeight::Medium,
            4 => FontWeight::DemiBold,
            5 => FontWeight::Bold,
            6 => FontWeight::UltraBold,
            7 => FontWeight::Heavy,
            _ => FontWeight::Normal,
        }
    }
}

// ─── Font ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    pub family: FontFamily,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl Font {
    pub const SANS: Font = Font {
        family: FontFamily::Sans,
        weight: FontWeight::Normal,
        slant: FontSlant::Normal,
    };

    pub const MONOSPACE: Font = Font {
        family: FontFamily::Monospace,
        weight: FontWeight::Normal,
        slant: FontSlant::Normal,
    };

    #[must_use]
    pub fn new(family: FontFamily) -> Self {
        Font {
            family,
            ..Font::default()
        }
    }

    /// Packed style bits as written to the `style` attribute of a font
    /// data node: slant in bits 2-3, weight in bits 4-6.
    pub fn style_bits(&self) -> u32 {
        let slant = match self.slant {
            FontSlant::Normal => 0,
            FontSlant::Oblique => 1,
            FontSlant::Italic => 2,
        };
        (slant << 2) | (u32::from(self.weight.code()) << 4)
    }

    pub fn from_style_bits(family: FontFamily, style: u32) -> Self {
        let slant = match (style >> 2) & 0x3 {
            1 => FontSlant::Oblique,
            2 => FontSlant::Italic,
            _ => FontSlant::Normal,
        };
        Font {
            family,
            weight: FontWeight::from_code(((style >> 4) & 0x7) as u8),
            slant,
        }
    }

    /// Legacy PostScript-style face name, written alongside family/style.
    pub fn legacy_name(&self) -> String {
        let base = match self.family {
            FontFamily::Sans => "Helvetica",
            FontFamily::Serif => "Times",
            FontFamily::Monospace => "Courier",
        };
        let bold = self.weight.code() >= FontWeight::DemiBold.code();
        let slanted = self.slant != FontSlant::Normal;
        match (bold, slanted, self.family) {
            (false, false, FontFamily::Serif) => "Times-Roman".to_string(),
            (false, false, _) => base.to_string(),
            (true, false, _) => format!("{base}-Bold"),
            (false, true, FontFamily::Serif) => "Times-Italic".to_string(),
            (false, true, _) => format!("{base}-Oblique"),
            (true, true, FontFamily::Serif) => "Times-BoldItalic".to_string(),
            (true, true, _) => format!("{base}-BoldOblique"),
        }
    }

    /// Best-effort reverse of [`Font::legacy_name`] for files that only
    /// carry a face name.
    pub fn from_legacy_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        let family = if lower.starts_with("courier") || lower.contains("mono") {
            FontFamily::Monospace
        } else if lower.starts_with("times") || lower.contains("serif") && !lower.contains("sans") {
            FontFamily::Serif
        } else {
            FontFamily::Sans
        };
        let weight = if lower.contains("bold") {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        let slant = if lower.contains("italic") {
            FontSlant::Italic
        } else if lower.contains("oblique") {
            FontSlant::Oblique
        } else {
            FontSlant::Normal
        };
        Font {
            family,
            weight,
            slant,
        }
    }

    pub fn family_name(&self) -> &'static str {
        match self.family {
            FontFamily::Sans => "sans",
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "monospace",
        }
    }

    pub fn family_from_name(name: &str) -> FontFamily {
        match name.to_ascii_lowercase().as_str() {
            "serif" | "times" => FontFamily::Serif,
            "monospace" | "mono" | "courier" => FontFamily::Monospace,
            _ => FontFamily::Sans,
        }
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.legacy_name())
    }
}

// ─── Metrics ─────────────────────────────────────────────────────────────

/// Text measurement used by the text engine and by renderers that do not
/// shape text themselves. All results are in diagram units for a font of
/// the given `height`.
pub trait FontMetrics: fmt::Debug + Sync {
    fn string_width(&self, text: &str, font: &Font, height: f64) -> f64;

    fn ascent(&self, _font: &Font, height: f64) -> f64 {
        height * 0.8
    }

    fn descent(&self, _font: &Font, height: f64) -> f64 {
        height * 0.2
    }
}

/// Per-character advance table, scaled by font height.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMetrics;

pub static SIMPLE_METRICS: SimpleMetrics = SimpleMetrics;

impl SimpleMetrics {
    fn advance(c: char, font: &Font) -> f64 {
        if font.family == FontFamily::Monospace {
            return 0.6;
        }
        let base = match c {
            'i' | 'j' | 'l' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' | ' ' => 0.3,
            'm' | 'w' | 'M' | 'W' | '@' => 0.85,
            c if c.is_uppercase() => 0.7,
            _ => 0.55,
        };
        if font.weight.code() >= FontWeight::DemiBold.code() {
            base * 1.1
        } else {
            base
        }
    }
}

impl FontMetrics for SimpleMetrics {
    fn string_width(&self, text: &str, font: &Font, height: f64) -> f64 {
        text.chars().map(|c| Self::advance(c, font)).sum::<f64>() * height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_bits_roundtrip() {
        let f = Font {
            family: FontFamily::Serif,
            weight: FontWeight::Bold,
            slant: FontSlant::Italic,
        };
        assert_eq!(f.style_bits(), (2 << 2) | (5 << 4));
        assert_eq!(Font::from_style_bits(FontFamily::Serif, f.style_bits()), f);
    }

    #[test]
    fn legacy_names() {
        assert_eq!(Font::SANS.legacy_name(), "Helvetica");
        assert_eq!(Font::MONOSPACE.legacy_name(), "Courier");
        assert_eq!(Font::from_legacy_name("Times-BoldItalic").family, FontFamily::Serif);
        assert_eq!(Font::from_legacy_name("Courier").family, FontFamily::Monospace);
    }

    #[test]
    fn simple_metrics_scale_with_height() {
        let w1 = SIMPLE_METRICS.string_width("abc", &Font::SANS, 1.0);
        let w2 = SIMPLE_METRICS.string_width("abc", &Font::SANS, 2.0);
        assert!((w2 - 2.0 * w1).abs() < 1e-12);
        assert_eq!(SIMPLE_METRICS.string_width("", &Font::SANS, 1.0), 0.0);
        assert!((SIMPLE_METRICS.string_width("mi", &Font::MONOSPACE, 1.0) - 1.2).abs() < 1e-12);
    }
}
