use anyhow::{anyhow, Result};
use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

use crate::config::ChartColors;

// ---------------------------------------------------------------------------
// Hex parsing
// ---------------------------------------------------------------------------

/// Parse `#RRGGBB` (leading `#` optional) into a plotters colour.
pub fn parse_hex(hex: &str) -> Result<RGBColor> {
    let rgb: Srgb<u8> = hex
        .trim()
        .parse()
        .map_err(|e| anyhow!("couleur invalide '{hex}': {e:?}"))?;
    Ok(RGBColor(rgb.red, rgb.green, rgb.blue))
}

/// Same hue, lightness moved towards white by `amount` (0..1).
pub fn lighten(color: RGBColor, amount: f32) -> RGBColor {
    let rgb = Srgb::new(color.0, color.1, color.2).into_format::<f32>();
    let mut hsl: Hsl = rgb.into_color();
    hsl.lightness += (1.0 - hsl.lightness) * amount.clamp(0.0, 1.0);
    let out: Srgb = hsl.into_color();
    let out = out.into_format::<u8>();
    RGBColor(out.red, out.green, out.blue)
}

// ---------------------------------------------------------------------------
// Chart palette
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub primary: RGBColor,
    pub accent: RGBColor,
    pub muted: RGBColor,
    /// Grid lines.
    pub grid: RGBColor,
}

impl Palette {
    pub fn from_config(colors: &ChartColors) -> Result<Self> {
        let muted = parse_hex(&colors.muted)?;
        Ok(Palette {
            primary: parse_hex(&colors.primary)?,
            accent: parse_hex(&colors.accent)?,
            muted,
            grid: lighten(muted, 0.7),
        })
    }
}
