//! Extract one postal code from a department file, clean it, and write the
//! cleaned table, a sample and a statistics report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{EtlSettings, Settings};
use crate::data::filter::{dedup_by, drop_null, filter_exact, project, trim_columns};
use crate::data::loader::load_csv;
use crate::data::model::Table;
use crate::data::stats::SummaryStats;
use crate::data::writer::write_csv;
use crate::error::RnaError;

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Output of the transform stage.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// Rows matching the postal code, before any cleaning.
    pub matched: usize,
    pub duplicates_removed: usize,
    pub null_ids_dropped: usize,
    /// Deduplicated and trimmed, all source columns still present.
    pub full: Table,
    /// `full` projected onto the output columns.
    pub cleaned: Table,
}

/// Filter → dedup → drop null ids → trim → project.
pub fn transform(table: &Table, etl: &EtlSettings) -> Result<Transformed, RnaError> {
    for required in [&etl.postal_column, &etl.id_column] {
        if !table.has_column(required) {
            return Err(RnaError::MissingColumn(required.clone()));
        }
    }

    let filtered = filter_exact(table, &etl.postal_column, &etl.postal_code);
    if filtered.is_empty() {
        return Err(RnaError::NoMatch(etl.postal_code.clone()));
    }
    let matched = filtered.len();

    let (deduped, duplicates_removed) = dedup_by(&filtered, &etl.id_column);
    let (with_ids, null_ids_dropped) = drop_null(&deduped, &etl.id_column);
    let full = trim_columns(&with_ids, &etl.trim_columns);
    let cleaned = project(&full, &etl.keep_columns);

    log::debug!(
        "matched {matched}, duplicates {duplicates_removed}, null ids {null_ids_dropped}, kept {} columns",
        cleaned.columns.len()
    );

    Ok(Transformed {
        matched,
        duplicates_removed,
        null_ids_dropped,
        full,
        cleaned,
    })
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EtlReport {
    pub input: PathBuf,
    pub loaded_rows: usize,
    pub loaded_columns: usize,
    pub skipped_rows: usize,
    pub matched: usize,
    pub duplicates_removed: usize,
    pub null_ids_dropped: usize,
    pub columns: Vec<String>,
    pub stats: SummaryStats,
    /// First titles of the cleaned table, for a visual check.
    pub examples: Vec<String>,
    pub clean_output: PathBuf,
    pub sample_output: PathBuf,
    pub stats_output: PathBuf,
}

pub fn run(dir: &Path, settings: &Settings) -> Result<EtlReport> {
    let etl = &settings.etl;
    let input = dir.join(&etl.input);
    if !input.is_file() {
        return Err(RnaError::MissingInput(input).into());
    }

    let loaded = load_csv(&input, &settings.source.load_options(None))?;
    let table = loaded.table;
    log::info!("{} rows loaded from {}", table.len(), input.display());

    let t = transform(&table, etl)?;

    let clean_output = dir.join(&etl.clean_output);
    write_csv(&t.cleaned, &clean_output)?;

    let sample_output = dir.join(&etl.sample_output);
    write_csv(&t.cleaned.head(etl.sample_size), &sample_output)?;

    let stats = SummaryStats::compute(
        &t.cleaned,
        &t.full,
        &etl.purpose_column,
        &etl.website_column,
        etl.top_purposes,
        etl.label_width,
    );

    let stats_output = dir.join(&etl.stats_output);
    std::fs::write(&stats_output, render_stats_report(&stats, etl))
        .with_context(|| format!("écriture de {}", stats_output.display()))?;

    let examples = t
        .cleaned
        .column_values(&etl.title_column)
        .into_iter()
        .take(etl.examples)
        .map(|v| v.unwrap_or_default().to_string())
        .collect();

    Ok(EtlReport {
        input,
        loaded_rows: table.len(),
        loaded_columns: table.columns.len(),
        skipped_rows: loaded.skipped_rows,
        matched: t.matched,
        duplicates_removed: t.duplicates_removed,
        null_ids_dropped: t.null_ids_dropped,
        columns: t.cleaned.columns.clone(),
        stats,
        examples,
        clean_output,
        sample_output,
        stats_output,
    })
}

/// Plain-text statistics file.
pub fn render_stats_report(stats: &SummaryStats, etl: &EtlSettings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "STATISTIQUES - ASSOCIATIONS {}", etl.area_label);
    let _ = writeln!(out, "{}", "=".repeat(50));
    out.push('\n');
    let _ = writeln!(out, "Total associations : {}", stats.total);
    match &stats.with_website {
        Some(share) => {
            let _ = writeln!(out, "Associations avec site web : {share}");
        }
        None => {
            let _ = writeln!(out, "Associations avec site web : non disponible");
        }
    }
    if let Some(top) = stats.top_purposes.as_ref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "\nTop {} objets sociaux :", top.len());
        for (label, n) in top {
            let _ = writeln!(out, "  - {label} : {n}");
        }
    }
    let _ = writeln!(out, "\nDonnées extraites le : {}", etl.extraction_date);
    let _ = writeln!(out, "{}", etl.source_line);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use crate::data::stats::Share;

    fn source() -> Table {
        Table::new(
            vec![
                "id".into(),
                "titre".into(),
                "adrs_codepostal".into(),
                "objet_social1".into(),
                "siteweb".into(),
            ],
            vec![
                Record::from_strs(&["1", "  Club  ", "75012", "Sport", ""]),
                Record::from_strs(&["1", "Club bis", "75012", "Sport", ""]),
                Record::from_strs(&["2", "Ailleurs", "75011", "Culture", ""]),
                Record::from_strs(&["", "Sans id", "75012", "", "w"]),
                Record::from_strs(&["3", "Atelier", "75012", "Culture", "w"]),
            ],
        )
    }

    #[test]
    fn test_transform_stages() {
        let t = transform(&source(), &EtlSettings::default()).unwrap();
        assert_eq!(t.matched, 4);
        assert_eq!(t.duplicates_removed, 1);
        assert_eq!(t.null_ids_dropped, 1);
        assert_eq!(t.cleaned.columns, vec!["id", "titre", "adrs_codepostal", "siteweb"]);
        assert_eq!(t.cleaned.column_values("id"), vec![Some("1"), Some("3")]);
        assert_eq!(t.cleaned.value(0, "titre"), Some("Club"));
        assert!(t.full.has_column("objet_social1"));
    }

    #[test]
    fn test_transform_no_match() {
        let etl = EtlSettings {
            postal_code: "13001".into(),
            ..EtlSettings::default()
        };
        let err = transform(&source(), &etl).unwrap_err();
        assert!(matches!(err, RnaError::NoMatch(code) if code == "13001"));
    }

    #[test]
    fn test_transform_missing_postal_column() {
        let t = source().select(&["id", "titre"]);
        let err = transform(&t, &EtlSettings::default()).unwrap_err();
        assert!(matches!(err, RnaError::MissingColumn(c) if c == "adrs_codepostal"));
    }

    #[test]
    fn test_stats_report_layout() {
        let stats = SummaryStats {
            total: 2,
            top_purposes: Some(vec![("Sport".into(), 1)]),
            with_website: Some(Share::of(1, 2)),
        };
        let text = render_stats_report(&stats, &EtlSettings::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "STATISTIQUES - ASSOCIATIONS PARIS 12");
        assert_eq!(lines[1], "=".repeat(50));
        assert!(text.contains("Total associations : 2\n"));
        assert!(text.contains("Associations avec site web : 1 (50.0%)\n"));
        assert!(text.contains("  - Sport : 1\n"));
        assert!(text.contains("Données extraites le : 01/09/2025\n"));
        assert!(text.ends_with("Source : RNA - data.gouv.fr\n"));
    }

    #[test]
    fn test_stats_report_without_website_column() {
        let stats = SummaryStats {
            total: 0,
            top_purposes: None,
            with_website: None,
        };
        let text = render_stats_report(&stats, &EtlSettings::default());
        assert!(text.contains("site web : non disponible"));
        assert!(!text.contains("objets sociaux"));
    }
}
