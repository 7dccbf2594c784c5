use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Table;

/// Write a table as comma-separated UTF-8 with a header row. Null cells are
/// written as empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("création de {}", path.display()))?;
    write_to(table, file).with_context(|| format!("écriture de {}", path.display()))
}

pub fn write_to<W: Write>(table: &Table, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&table.columns)?;
    for record in &table.records {
        writer.write_record(record.cells.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}
