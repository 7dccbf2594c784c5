use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::loader::{LoadOptions, SourceEncoding};

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "rna_etl.json";
/// Overrides the config file location.
pub const CONFIG_ENV: &str = "RNA_ETL_CONFIG";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Every knob of the three procedures. All fields default to the values the
/// Paris 12 extraction uses, so an absent or partial config file is fine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub preview: PreviewSettings,
    pub etl: EtlSettings,
    pub viz: VizSettings,
    pub console: ConsoleSettings,
}

impl Settings {
    /// Read `RNA_ETL_CONFIG`, or `rna_etl.json` in `dir`, or fall back to
    /// defaults when neither exists.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(p) => PathBuf::from(p),
            None => {
                let p = dir.join(CONFIG_FILE);
                if !p.exists() {
                    log::debug!("no {CONFIG_FILE}, using defaults");
                    return Ok(Settings::default());
                }
                p
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("lecture de {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("configuration invalide : {}", path.display()))?;
        log::info!("configuration loaded from {}", path.display());
        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub delimiter: char,
    pub encoding: SourceEncoding,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            delimiter: ';',
            encoding: SourceEncoding::Utf8,
        }
    }
}

impl SourceSettings {
    pub fn load_options(&self, max_rows: Option<usize>) -> LoadOptions {
        LoadOptions {
            delimiter: delimiter_byte(self.delimiter),
            encoding: self.encoding,
            max_rows,
        }
    }
}

fn delimiter_byte(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        log::warn!("non-ASCII delimiter {c:?} ignored, using ';'");
        b';'
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub max_rows: usize,
    pub postal_prefix: String,
    /// Lowercase fragments identifying a postal-code column.
    pub postal_tokens: Vec<String>,
    pub output: PathBuf,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            max_rows: 5000,
            postal_prefix: "75012".into(),
            postal_tokens: vec!["postal".into(), "cp".into(), "code_post".into()],
            output: "paris12_extrait.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EtlSettings {
    pub input: PathBuf,
    pub postal_column: String,
    pub postal_code: String,
    pub id_column: String,
    pub trim_columns: Vec<String>,
    /// Output projection, in output order.
    pub keep_columns: Vec<String>,
    pub purpose_column: String,
    pub website_column: String,
    pub title_column: String,
    pub clean_output: PathBuf,
    pub sample_output: PathBuf,
    pub sample_size: usize,
    pub stats_output: PathBuf,
    pub top_purposes: usize,
    pub label_width: usize,
    pub examples: usize,
    /// Shown in report titles, e.g. "PARIS 12".
    pub area_label: String,
    pub extraction_date: String,
    pub source_line: String,
}

impl Default for EtlSettings {
    fn default() -> Self {
        Self {
            input: "rna_import_20250901_dpt_75.csv".into(),
            postal_column: "adrs_codepostal".into(),
            postal_code: "75012".into(),
            id_column: "id".into(),
            trim_columns: strings(&["titre", "objet", "libcom"]),
            keep_columns: strings(&[
                "id",
                "titre",
                "objet",
                "date_creat",
                "date_publi",
                "adr1",
                "adr2",
                "adr3",
                "adrs_codepostal",
                "libcom",
                "siteweb",
            ]),
            purpose_column: "objet_social1".into(),
            website_column: "siteweb".into(),
            title_column: "titre".into(),
            clean_output: "associations_paris12_clean.csv".into(),
            sample_output: "sample_data.csv".into(),
            sample_size: 100,
            stats_output: "stats_paris12.txt".into(),
            top_purposes: 5,
            label_width: 40,
            examples: 5,
            area_label: "PARIS 12".into(),
            extraction_date: "01/09/2025".into(),
            source_line: "Source : RNA - data.gouv.fr".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VizSettings {
    pub input: PathBuf,
    pub date_column: String,
    /// Years at or below this are sentinel values and dropped.
    pub min_year: i32,
    pub address_column: String,
    pub website_column: String,
    pub top_locations: usize,
    pub dpi: u32,
    pub evolution_output: PathBuf,
    pub locations_output: PathBuf,
    pub card_output: PathBuf,
    pub area_label: String,
    pub caption: String,
    pub font_path: Option<PathBuf>,
    pub colors: ChartColors,
}

impl Default for VizSettings {
    fn default() -> Self {
        Self {
            input: "associations_paris12_clean.csv".into(),
            date_column: "date_creat".into(),
            min_year: 1900,
            address_column: "adr1".into(),
            website_column: "siteweb".into(),
            top_locations: 10,
            dpi: 300,
            evolution_output: "graphique_evolution.png".into(),
            locations_output: "graphique_rues.png".into(),
            card_output: "infographie_stats.png".into(),
            area_label: "Paris 12".into(),
            caption: "Source : RNA - data.gouv.fr (Sept 2025)".into(),
            font_path: None,
            colors: ChartColors::default(),
        }
    }
}

/// Hex colours (`#RRGGBB`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartColors {
    pub primary: String,
    pub accent: String,
    pub muted: String,
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            primary: "#2E86AB".into(),
            accent: "#A23B72".into(),
            muted: "#808080".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub pause_on_exit: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self { pause_on_exit: true }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
