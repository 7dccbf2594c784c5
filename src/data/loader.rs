use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;
use serde::Deserialize;

use super::model::{Record, Table};
use crate::error::RnaError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Text encoding of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SourceEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// Latin-1 family, decoded as Windows-1252.
    #[serde(rename = "latin-1", alias = "latin1", alias = "cp1252")]
    Latin1,
}

impl SourceEncoding {
    pub fn label(self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Latin1 => "latin-1",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub encoding: SourceEncoding,
    /// Stop after this many kept rows.
    pub max_rows: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            encoding: SourceEncoding::Utf8,
            max_rows: None,
        }
    }
}

/// A loaded table plus what was dropped on the way in.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: Table,
    /// Rows whose field count did not match the header.
    pub skipped_rows: usize,
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load a delimited text file whose first line is the header.
///
/// Rows with the wrong number of fields are skipped and counted. A field
/// that does not decode in the selected encoding fails the whole load with
/// [`RnaError::Decode`].
pub fn load_csv(path: &Path, opts: &LoadOptions) -> Result<LoadOutcome> {
    let file = File::open(path).with_context(|| format!("ouverture de {}", path.display()))?;
    load_from_reader(file, opts).with_context(|| format!("lecture de {}", path.display()))
}

pub fn load_from_reader<R: Read>(reader: R, opts: &LoadOptions) -> Result<LoadOutcome> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let header = reader.byte_headers().context("lecture de l'en-tête")?.clone();
    let mut columns = decode_record(&header, opts.encoding, 0)?;
    if let Some(first) = columns.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    let mut records = Vec::new();
    let mut skipped_rows = 0;
    let mut raw = ByteRecord::new();
    let mut row_no = 0usize;

    while reader.read_byte_record(&mut raw).context("lecture d'une ligne")? {
        row_no += 1;
        if opts.max_rows.is_some_and(|max| records.len() >= max) {
            break;
        }
        if raw.len() != columns.len() {
            log::debug!(
                "line {row_no}: {} fields, expected {}; skipped",
                raw.len(),
                columns.len()
            );
            skipped_rows += 1;
            continue;
        }
        let cells = decode_record(&raw, opts.encoding, row_no)?;
        records.push(Record::from_strs(&cells));
    }

    if skipped_rows > 0 {
        log::warn!("{skipped_rows} malformed rows skipped");
    }
    log::debug!("loaded {} rows, {} columns", records.len(), columns.len());

    Ok(LoadOutcome {
        table: Table::new(columns, records),
        skipped_rows,
    })
}

fn decode_record(raw: &ByteRecord, encoding: SourceEncoding, row: usize) -> Result<Vec<String>> {
    raw.iter()
        .map(|field| decode_field(field, encoding, row))
        .collect()
}

fn decode_field(bytes: &[u8], encoding: SourceEncoding, row: usize) -> Result<String> {
    match encoding {
        SourceEncoding::Utf8 => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| {
                RnaError::Decode {
                    row,
                    encoding: encoding.label(),
                }
                .into()
            }),
        SourceEncoding::Latin1 => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            Ok(text.into_owned())
        }
    }
}
