//! Look around the working directory, preview the first CSV and pull out
//! the rows of one postal-code prefix.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::data::filter::{filter_prefix, find_column};
use crate::data::loader::load_csv;
use crate::data::writer::write_csv;
use crate::error::RnaError;

/// A `.csv` or `.zip` entry of the scanned directory.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub size_mb: f64,
}

#[derive(Debug, Clone)]
pub struct PreviewReport {
    /// Every entry in the directory, files and folders alike.
    pub total_entries: usize,
    pub data_files: Vec<FileEntry>,
    pub csv_count: usize,
    pub outcome: PreviewOutcome,
}

#[derive(Debug, Clone)]
pub enum PreviewOutcome {
    /// Nothing to read; the operator has to download the extract first.
    NoCsv,
    Loaded(LoadedPreview),
}

#[derive(Debug, Clone)]
pub struct LoadedPreview {
    pub file: PathBuf,
    pub rows: usize,
    pub skipped_rows: usize,
    pub columns: Vec<String>,
    pub postal: PostalMatch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PostalMatch {
    ColumnMissing,
    Matched {
        column: String,
        count: usize,
        /// Set only when at least one row matched.
        written: Option<PathBuf>,
    },
}

pub fn run(dir: &Path, settings: &Settings) -> Result<PreviewReport> {
    // (name, is regular file)
    let mut entries: Vec<(String, bool)> = std::fs::read_dir(dir)
        .with_context(|| format!("lecture du dossier {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let is_file = entry.file_type().is_ok_and(|t| t.is_file());
            (entry.file_name().to_string_lossy().into_owned(), is_file)
        })
        .collect();
    entries.sort();

    let files: Vec<&String> = entries
        .iter()
        .filter(|(_, is_file)| *is_file)
        .map(|(name, _)| name)
        .collect();

    let mut data_files = Vec::new();
    for name in &files {
        if has_extension(name, "csv") || has_extension(name, "zip") {
            let size = std::fs::metadata(dir.join(name))
                .with_context(|| format!("taille de {name}"))?
                .len();
            data_files.push(FileEntry {
                name: name.to_string(),
                size_mb: size as f64 / (1024.0 * 1024.0),
            });
        }
    }

    let csvs: Vec<&String> = files.iter().copied().filter(|n| has_extension(n, "csv")).collect();
    let csv_count = csvs.len();
    log::debug!("{} entries, {csv_count} csv", entries.len());

    let outcome = match pick_source(&csvs, settings) {
        None => PreviewOutcome::NoCsv,
        Some(name) => PreviewOutcome::Loaded(preview_file(dir, name, settings)?),
    };

    Ok(PreviewReport {
        total_entries: entries.len(),
        data_files,
        csv_count,
        outcome,
    })
}

/// The configured department extract if present, otherwise the first CSV by
/// name that none of the procedures writes.
fn pick_source<'a>(csvs: &[&'a String], settings: &Settings) -> Option<&'a str> {
    let produced = [
        settings.preview.output.as_path(),
        settings.etl.clean_output.as_path(),
        settings.etl.sample_output.as_path(),
    ];
    let candidates: Vec<&'a str> = csvs
        .iter()
        .map(|n| n.as_str())
        .filter(|n| !produced.contains(&Path::new(*n)))
        .collect();
    candidates
        .iter()
        .find(|n| Path::new(**n) == settings.etl.input.as_path())
        .or_else(|| candidates.first())
        .copied()
}

fn preview_file(dir: &Path, name: &str, settings: &Settings) -> Result<LoadedPreview> {
    let path = dir.join(name);
    let opts = settings.source.load_options(Some(settings.preview.max_rows));
    let loaded = load_csv(&path, &opts).map_err(|e| unreadable(&path, e))?;
    let table = loaded.table;

    let postal = match find_column(&table.columns, &settings.preview.postal_tokens) {
        None => {
            log::warn!("no postal-code column in {name}");
            PostalMatch::ColumnMissing
        }
        Some(column) => {
            let matched = filter_prefix(&table, &column, &settings.preview.postal_prefix);
            let written = if matched.is_empty() {
                None
            } else {
                let out = dir.join(&settings.preview.output);
                write_csv(&matched, &out)?;
                Some(out)
            };
            PostalMatch::Matched {
                column,
                count: matched.len(),
                written,
            }
        }
    };

    Ok(LoadedPreview {
        file: path,
        rows: table.len(),
        skipped_rows: loaded.skipped_rows,
        columns: table.columns,
        postal,
    })
}

/// Classify a failed preview load so it is reported with the encoding hint.
fn unreadable(path: &Path, err: anyhow::Error) -> anyhow::Error {
    if err.downcast_ref::<RnaError>().is_some() {
        return err;
    }
    RnaError::Unreadable {
        path: path.to_path_buf(),
        reason: format!("{err:#}"),
    }
    .into()
}

fn has_extension(name: &str, ext: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
