/// Data layer: core types, loading, cleaning and statistics.
///
/// Architecture:
/// ```text
///  rna_import_*.csv  (';', utf-8 | latin-1)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table, skip malformed rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  postal filter → dedup → drop null ids → trim → project
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  writer   │   │  stats    │
///   └──────────┘   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
pub mod writer;
