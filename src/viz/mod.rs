/// Charts built from the cleaned extract.
///
/// Each artifact stands alone: a missing column skips it, a rendering
/// failure is logged and recorded, and the others are still produced.
pub mod compute;
pub mod font;
pub mod render;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::color::Palette;
use crate::config::Settings;
use crate::data::loader::{load_csv, LoadOptions};
use compute::{top_locations, year_counts, CardStats};

#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Written(PathBuf),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ChartResult {
    pub name: &'static str,
    pub outcome: ChartOutcome,
}

#[derive(Debug, Clone)]
pub struct VizReport {
    pub rows: usize,
    pub year_counts: BTreeMap<i32, usize>,
    pub top_locations: Vec<(String, usize)>,
    pub card: CardStats,
    pub charts: Vec<ChartResult>,
}

impl VizReport {
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.charts.iter().filter_map(|c| match &c.outcome {
            ChartOutcome::Written(p) => Some(p.as_path()),
            _ => None,
        })
    }
}

pub fn run(dir: &Path, settings: &Settings) -> Result<VizReport> {
    let viz = &settings.viz;
    let input = dir.join(&viz.input);
    // the cleaned file is written by the ETL step with default CSV settings
    let opts = LoadOptions {
        delimiter: b',',
        ..LoadOptions::default()
    };
    let table = load_csv(&input, &opts)?.table;
    log::info!("{} rows loaded from {}", table.len(), input.display());

    let palette = Palette::from_config(&viz.colors)?;
    let font = font::ensure_registered(viz.font_path.as_deref());
    if let Err(e) = &font {
        log::warn!("{e}");
    }
    let font_ready = || font.clone().map(|_| ());

    let mut charts = Vec::with_capacity(3);

    // creations per year
    let years = if table.has_column(&viz.date_column) {
        year_counts(table.column_values(&viz.date_column), viz.min_year)
    } else {
        BTreeMap::new()
    };
    let outcome = if !table.has_column(&viz.date_column) {
        ChartOutcome::Skipped(format!("colonne '{}' absente", viz.date_column))
    } else if years.is_empty() {
        ChartOutcome::Skipped("aucune date de création exploitable".to_string())
    } else {
        let title = format!("Évolution des créations d'associations à {}", viz.area_label);
        attempt(dir.join(&viz.evolution_output), |path| {
            font_ready()?;
            render::evolution_chart(path, &years, &title, &palette, viz.dpi)
        })
    };
    charts.push(ChartResult { name: "evolution", outcome });

    // most frequent streets
    let top = if table.has_column(&viz.address_column) {
        top_locations(table.column_values(&viz.address_column), viz.top_locations)
    } else {
        Vec::new()
    };
    let outcome = if !table.has_column(&viz.address_column) {
        ChartOutcome::Skipped(format!("colonne '{}' absente", viz.address_column))
    } else if top.is_empty() {
        ChartOutcome::Skipped("aucune adresse renseignée".to_string())
    } else {
        let title = format!(
            "Top {} des rues avec le plus d'associations ({})",
            top.len(),
            viz.area_label
        );
        attempt(dir.join(&viz.locations_output), |path| {
            font_ready()?;
            render::locations_chart(path, &top, &title, &palette, viz.dpi)
        })
    };
    charts.push(ChartResult { name: "locations", outcome });

    // statistics card, always produced
    let card = CardStats::compute(&table, &viz.website_column, &viz.address_column);
    let heading = format!("Associations {}", viz.area_label);
    let outcome = attempt(dir.join(&viz.card_output), |path| {
        font_ready()?;
        render::stats_card(
            path,
            &card,
            &heading,
            &viz.caption,
            &palette,
            viz.dpi,
        )
    });
    charts.push(ChartResult { name: "card", outcome });

    Ok(VizReport {
        rows: table.len(),
        year_counts: years,
        top_locations: top,
        card,
        charts,
    })
}

fn attempt<F>(path: PathBuf, draw: F) -> ChartOutcome
where
    F: FnOnce(&Path) -> Result<()>,
{
    match draw(&path) {
        Ok(()) => ChartOutcome::Written(path),
        Err(e) => {
            log::error!("{}: {e:#}", path.display());
            ChartOutcome::Failed(format!("{e:#}"))
        }
    }
}
