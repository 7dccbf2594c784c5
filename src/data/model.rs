use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Record – one row of the registry extract
// ---------------------------------------------------------------------------

/// A nullable text cell. Empty source fields load as `None`.
pub type Cell = Option<String>;

/// A single row, aligned with the owning table's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub cells: Vec<Cell>,
}

impl Record {
    pub fn new(cells: Vec<Cell>) -> Self {
        Record { cells }
    }

    /// Build a record from raw strings, mapping empty ones to null.
    pub fn from_strs<S: AsRef<str>>(values: &[S]) -> Self {
        Record {
            cells: values
                .iter()
                .map(|v| {
                    let v = v.as_ref();
                    (!v.is_empty()).then(|| v.to_string())
                })
                .collect(),
        }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).and_then(|c| c.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Table – header discovered at load time plus ordered records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names in file order.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Table { columns, records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at `row` for the named column, `None` when null or absent.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.records.get(row)?.get(idx)
    }

    /// All cells of a column in row order. Empty when the column is absent.
    pub fn column_values(&self, column: &str) -> Vec<Option<&str>> {
        match self.column_index(column) {
            Some(idx) => self.records.iter().map(|r| r.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// First `n` records (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            records: self.records.iter().take(n).cloned().collect(),
        }
    }

    /// Number of non-null cells in a column; `None` when the column is absent.
    pub fn non_null_count(&self, column: &str) -> Option<usize> {
        let idx = self.column_index(column)?;
        Some(self.records.iter().filter(|r| r.get(idx).is_some()).count())
    }

    /// Frequency of each non-null value, highest first. Ties keep the
    /// order in which values first appear.
    pub fn value_counts(&self, column: &str) -> Vec<(String, usize)> {
        count_values(self.column_values(column).into_iter().flatten())
    }

    /// Keep only the records matching `keep`.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Record) -> bool,
    {
        self.records.retain(|r| keep(r));
    }

    /// New table with the given columns, in the given order. Names that
    /// are not in the header are ignored.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Table {
        let picked: Vec<(String, usize)> = columns
            .iter()
            .filter_map(|c| {
                let name = c.as_ref();
                self.column_index(name).map(|i| (name.to_string(), i))
            })
            .collect();

        let records = self
            .records
            .iter()
            .map(|r| Record::new(picked.iter().map(|(_, i)| r.cells[*i].clone()).collect()))
            .collect();

        Table {
            columns: picked.into_iter().map(|(name, _)| name).collect(),
            records,
        }
    }
}

/// Count occurrences, sorted by count descending then first appearance.
pub fn count_values<I, S>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for v in values {
        let v = v.as_ref();
        match counts.get_mut(v) {
            Some(n) => *n += 1,
            None => {
                counts.insert(v.to_string(), 1);
                order.push(v.to_string());
            }
        }
    }

    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|v| {
            let n = counts[&v];
            (v, n)
        })
        .collect();
    // stable sort keeps first-appearance order among equal counts
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}
