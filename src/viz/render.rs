use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops, Rgb, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;

use super::compute::CardStats;
use super::font::FAMILY;
use crate::color::Palette;
use crate::data::stats::{group_thousands, truncate_label};

/// Longest street label drawn on the bar chart axis.
const MAX_LOCATION_LABEL: usize = 38;

// ---------------------------------------------------------------------------
// Canvas – figure size in inches at a given resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Canvas {
    pub fn new(width_in: f64, height_in: f64, dpi: u32) -> Self {
        Canvas {
            width_in,
            height_in,
            dpi: dpi.max(1),
        }
    }

    pub fn pixels(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Typographic points to pixels.
    pub fn pt(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }

    fn px(&self, points: f64) -> u32 {
        self.pt(points).round() as u32
    }

    /// Resolution in the unit PNG stores it in.
    pub fn dots_per_metre(&self) -> u32 {
        (self.dpi as f64 / 0.0254).round() as u32
    }
}

/// Draw into an in-memory RGB buffer, crop it to the drawn content plus a
/// small border and save it as PNG tagged with the canvas resolution.
fn render_png<F>(path: &Path, canvas: Canvas, draw: F) -> Result<()>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
{
    let (w, h) = canvas.pixels();
    let mut buf = vec![255u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    let img = RgbImage::from_raw(w, h, buf).context("tampon image incohérent")?;
    // 0.1 inch around the content
    let img = tight_crop(&img, canvas.px(7.2));
    write_png(path, &img, canvas.dots_per_metre())
}

/// Smallest region holding every non-white pixel, grown by `pad` on each side
/// and clamped to the image. A blank image is returned unchanged.
fn tight_crop(img: &RgbImage, pad: u32) -> RgbImage {
    let blank = Rgb([255u8, 255, 255]);
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in img.enumerate_pixels() {
        if *px == blank {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    let Some((x0, y0, x1, y1)) = bounds else {
        return img.clone();
    };
    let left = x0.saturating_sub(pad);
    let top = y0.saturating_sub(pad);
    let right = (x1 + pad).min(img.width() - 1);
    let bottom = (y1 + pad).min(img.height() - 1);
    imageops::crop_imm(img, left, top, right - left + 1, bottom - top + 1).to_image()
}

fn write_png(path: &Path, img: &RgbImage, dots_per_metre: u32) -> Result<()> {
    let file = File::create(path).with_context(|| format!("écriture de {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), img.width(), img.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: dots_per_metre,
        yppu: dots_per_metre,
        unit: png::Unit::Meter,
    }));
    let mut writer = encoder
        .write_header()
        .with_context(|| format!("écriture de {}", path.display()))?;
    writer
        .write_image_data(img.as_raw())
        .with_context(|| format!("écriture de {}", path.display()))?;
    writer.finish()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Evolution – filled line of creations per year
// ---------------------------------------------------------------------------

pub fn evolution_chart(
    path: &Path,
    counts: &BTreeMap<i32, usize>,
    title: &str,
    palette: &Palette,
    dpi: u32,
) -> Result<()> {
    let canvas = Canvas::new(12.0, 6.0, dpi);
    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        anyhow::bail!("aucune année à tracer");
    };
    let (x0, x1) = if first == last { (first - 1, last + 1) } else { (first, last) };
    let y_max = counts.values().copied().max().unwrap_or(0);
    let y_top = (y_max as f64 * 1.1).ceil() as usize + 1;
    let points: Vec<(i32, usize)> = counts.iter().map(|(&y, &n)| (y, n)).collect();

    render_png(path, canvas, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, (FAMILY, canvas.pt(14.0)).into_font().style(FontStyle::Bold))
            .margin(canvas.px(10.0))
            .x_label_area_size(canvas.px(36.0))
            .y_label_area_size(canvas.px(48.0))
            .build_cartesian_2d(x0..x1, 0usize..y_top)?;

        chart
            .configure_mesh()
            .x_desc("Année")
            .y_desc("Nombre de créations")
            .axis_desc_style((FAMILY, canvas.pt(12.0)))
            .label_style((FAMILY, canvas.pt(10.0)))
            .bold_line_style(palette.grid.stroke_width(1))
            .light_line_style(WHITE.mix(0.0).stroke_width(0))
            .x_label_formatter(&|y| y.to_string())
            .draw()?;

        chart.draw_series(AreaSeries::new(
            points.iter().copied(),
            0,
            palette.primary.mix(0.3).filled(),
        ))?;
        chart.draw_series(LineSeries::new(
            points.iter().copied(),
            palette.primary.stroke_width(canvas.px(2.0).max(1)),
        ))?;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Top locations – horizontal ranked bars
// ---------------------------------------------------------------------------

pub fn locations_chart(
    path: &Path,
    top: &[(String, usize)],
    title: &str,
    palette: &Palette,
    dpi: u32,
) -> Result<()> {
    if top.is_empty() {
        anyhow::bail!("aucune adresse à tracer");
    }
    let canvas = Canvas::new(12.0, 6.0, dpi);
    let n = top.len();
    // bottom-up drawing order, so the most frequent bar ends up on top
    let bars: Vec<(String, usize)> = top
        .iter()
        .rev()
        .map(|(label, count)| (truncate_label(label, MAX_LOCATION_LABEL), *count))
        .collect();
    let x_max = bars.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let x_top = (x_max as f64 * 1.1).ceil() as usize + 1;

    render_png(path, canvas, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, (FAMILY, canvas.pt(14.0)).into_font().style(FontStyle::Bold))
            .margin(canvas.px(10.0))
            .x_label_area_size(canvas.px(36.0))
            .y_label_area_size(canvas.px(220.0))
            .build_cartesian_2d(0usize..x_top, (0usize..n).into_segmented())?;

        let label_for = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                bars.get(*i).map(|(l, _)| l.clone()).unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        };

        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_desc("Nombre d'associations")
            .y_desc("Rue")
            .y_labels(n)
            .y_label_formatter(&label_for)
            .axis_desc_style((FAMILY, canvas.pt(12.0)))
            .label_style((FAMILY, canvas.pt(9.0)))
            .bold_line_style(palette.grid.stroke_width(1))
            .light_line_style(WHITE.mix(0.0).stroke_width(0))
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (_, count))| {
            let mut bar = Rectangle::new(
                [(0, SegmentValue::Exact(i)), (*count, SegmentValue::Exact(i + 1))],
                palette.accent.filled(),
            );
            bar.set_margin(canvas.px(4.0), canvas.px(4.0), 0, 0);
            bar
        }))?;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Statistics card – big numbers, no axes
// ---------------------------------------------------------------------------

pub fn stats_card(
    path: &Path,
    stats: &CardStats,
    heading: &str,
    caption: &str,
    palette: &Palette,
    dpi: u32,
) -> Result<()> {
    let canvas = Canvas::new(10.0, 6.0, dpi);
    let (w, h) = canvas.pixels();
    let center = Pos::new(HPos::Center, VPos::Center);
    let at = |fx: f64, fy: f64| ((w as f64 * fx) as i32, (h as f64 * (1.0 - fy)) as i32);

    let entries = [
        ("Total associations", stats.total, None),
        ("Avec site web", stats.with_website.count, Some(stats.with_website.percent)),
        ("Avec adresse complète", stats.with_address.count, Some(stats.with_address.percent)),
    ];

    render_png(path, canvas, |root| {
        let title = (FAMILY, canvas.pt(20.0))
            .into_font()
            .style(FontStyle::Bold)
            .color(&BLACK)
            .pos(center);
        root.draw(&Text::new(heading.to_uppercase(), at(0.5, 0.9), title))?;

        let subtitle = (FAMILY, canvas.pt(14.0))
            .into_font()
            .style(FontStyle::Italic)
            .color(&palette.muted)
            .pos(center);
        root.draw(&Text::new("Statistiques clés", at(0.5, 0.82), subtitle))?;

        let mut y = 0.65;
        for (label, value, percent) in entries {
            let number = (FAMILY, canvas.pt(32.0))
                .into_font()
                .style(FontStyle::Bold)
                .color(&palette.primary)
                .pos(center);
            root.draw(&Text::new(group_thousands(value), at(0.5, y), number))?;

            let label_style = (FAMILY, canvas.pt(12.0)).into_font().color(&palette.muted).pos(center);
            root.draw(&Text::new(label, at(0.5, y - 0.08), label_style))?;

            if let Some(p) = percent {
                let pct = (FAMILY, canvas.pt(10.0))
                    .into_font()
                    .style(FontStyle::Italic)
                    .color(&palette.muted)
                    .pos(center);
                root.draw(&Text::new(format!("({p:.1}%)"), at(0.5, y - 0.12), pct))?;
            }
            y -= 0.22;
        }

        let source = (FAMILY, canvas.pt(9.0))
            .into_font()
            .style(FontStyle::Italic)
            .color(&palette.muted)
            .pos(center);
        root.draw(&Text::new(caption, at(0.5, 0.05), source))?;
        Ok(())
    })
}
