use std::collections::HashSet;

use super::model::Table;

// ---------------------------------------------------------------------------
// Column discovery
// ---------------------------------------------------------------------------

/// First column (schema order) whose lowercased name contains any of the
/// lowercased `tokens`.
pub fn find_column<S, T>(schema: &[S], tokens: &[T]) -> Option<String>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_lowercase()).collect();
    schema
        .iter()
        .map(AsRef::as_ref)
        .find(|col| {
            let lower = col.to_lowercase();
            tokens.iter().any(|t| lower.contains(t.as_str()))
        })
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Row predicates
// ---------------------------------------------------------------------------

/// Rows whose `column` equals `value`. An absent column matches nothing.
pub fn filter_exact(table: &Table, column: &str, value: &str) -> Table {
    filter_by(table, column, |cell| cell == value)
}

/// Rows whose `column` starts with `prefix`. An absent column matches nothing.
pub fn filter_prefix(table: &Table, column: &str, prefix: &str) -> Table {
    filter_by(table, column, |cell| cell.starts_with(prefix))
}

fn filter_by<F>(table: &Table, column: &str, pred: F) -> Table
where
    F: Fn(&str) -> bool,
{
    let mut out = table.clone();
    match table.column_index(column) {
        Some(idx) => out.retain_rows(|r| r.get(idx).is_some_and(&pred)),
        None => out.records.clear(),
    }
    out
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// Keep the first record per distinct `column` value. Nulls count as one
/// key. Returns the table and the number of records removed.
pub fn dedup_by(table: &Table, column: &str) -> (Table, usize) {
    let Some(idx) = table.column_index(column) else {
        return (table.clone(), 0);
    };

    let mut seen: HashSet<Option<&str>> = HashSet::new();
    let records: Vec<_> = table
        .records
        .iter()
        .filter(|r| seen.insert(r.get(idx)))
        .cloned()
        .collect();

    let removed = table.len() - records.len();
    (Table::new(table.columns.clone(), records), removed)
}

/// Drop records whose `column` is null. Returns the table and the number
/// dropped.
pub fn drop_null(table: &Table, column: &str) -> (Table, usize) {
    let mut out = table.clone();
    if let Some(idx) = table.column_index(column) {
        out.retain_rows(|r| r.get(idx).is_some());
    }
    let dropped = table.len() - out.len();
    (out, dropped)
}

/// Strip surrounding whitespace in the named columns; absent ones are ignored.
pub fn trim_columns<S: AsRef<str>>(table: &Table, columns: &[S]) -> Table {
    let targets: Vec<usize> = columns
        .iter()
        .filter_map(|c| table.column_index(c.as_ref()))
        .collect();

    let mut out = table.clone();
    for record in &mut out.records {
        for &idx in &targets {
            if let Some(Some(cell)) = record.cells.get_mut(idx) {
                if cell.trim().len() != cell.len() {
                    *cell = cell.trim().to_string();
                }
            }
        }
    }
    out
}

/// Keep the whitelisted columns present in the table, in whitelist order.
/// Absent names are skipped silently so regional variants of the extract
/// with fewer columns still go through.
pub fn project<S: AsRef<str>>(table: &Table, whitelist: &[S]) -> Table {
    table.select(whitelist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn table(cols: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            cols.iter().map(|c| c.to_string()).collect(),
            rows.iter().map(|r| Record::from_strs(r)).collect(),
        )
    }

    #[test]
    fn test_find_column_matches_substring_case_insensitive() {
        let schema = ["id", "titre", "ADRS_CodePostal", "libcom"];
        assert_eq!(
            find_column(&schema, &["postal", "cp", "code_post"]),
            Some("ADRS_CodePostal".to_string())
        );
    }

    #[test]
    fn test_find_column_first_in_schema_order() {
        let schema = ["cp_siege", "code_postal"];
        assert_eq!(find_column(&schema, &["postal", "cp"]), Some("cp_siege".to_string()));
    }

    #[test]
    fn test_find_column_none() {
        let schema = ["id", "titre"];
        assert_eq!(find_column(&schema, &["postal", "cp"]), None);
    }

    #[test]
    fn test_filter_exact_and_prefix() {
        let t = table(
            &["id", "cp"],
            &[&["1", "75012"], &["2", "750120"], &["3", "75011"], &["4", ""]],
        );
        let exact = filter_exact(&t, "cp", "75012");
        assert_eq!(exact.len(), 1);
        assert!(exact.column_values("cp").iter().all(|v| *v == Some("75012")));

        let prefix = filter_prefix(&t, "cp", "75012");
        assert_eq!(prefix.len(), 2);
        assert!(prefix
            .column_values("cp")
            .iter()
            .all(|v| v.is_some_and(|s| s.starts_with("75012"))));
    }

    #[test]
    fn test_filter_on_absent_column_is_empty() {
        let t = table(&["id"], &[&["1"]]);
        let out = filter_exact(&t, "cp", "75012");
        assert!(out.is_empty());
        assert_eq!(out.columns, vec!["id"]);
    }

    #[test]
    fn test_filter_then_dedup_keeps_first_occurrence() {
        let t = table(
            &["id", "cp", "titre"],
            &[&["1", "75012", "first"], &["1", "75012", "second"], &["2", "75011", "other"]],
        );
        let filtered = filter_exact(&t, "cp", "75012");
        let (deduped, removed) = dedup_by(&filtered, "id");
        assert_eq!(deduped.len(), 1);
        assert_eq!(removed, 1);
        assert_eq!(deduped.value(0, "id"), Some("1"));
        assert_eq!(deduped.value(0, "titre"), Some("first"));
    }

    #[test]
    fn test_dedup_keeps_order_and_uniqueness() {
        let t = table(&["id"], &[&["b"], &["a"], &["b"], &["c"], &["a"]]);
        let (d, removed) = dedup_by(&t, "id");
        assert_eq!(removed, 2);
        assert_eq!(d.column_values("id"), vec![Some("b"), Some("a"), Some("c")]);
    }

    #[test]
    fn test_dedup_treats_nulls_as_one_key_then_drop_null() {
        let t = table(&["id"], &[&[""], &["1"], &[""]]);
        let (d, removed) = dedup_by(&t, "id");
        assert_eq!(removed, 1);
        let (d, dropped) = drop_null(&d, "id");
        assert_eq!(dropped, 1);
        assert_eq!(d.column_values("id"), vec![Some("1")]);
    }

    #[test]
    fn test_trim_only_named_present_columns() {
        let t = table(&["titre", "adr1"], &[&["  Club  ", " 3 rue "]]);
        let out = trim_columns(&t, &["titre", "objet"]);
        assert_eq!(out.value(0, "titre"), Some("Club"));
        assert_eq!(out.value(0, "adr1"), Some(" 3 rue "));
    }

    #[test]
    fn test_project_omits_absent_and_keeps_present() {
        let t = table(&["siteweb", "id", "extra"], &[&["w", "1", "x"]]);
        let whitelist = ["id", "titre", "siteweb"];
        let out = project(&t, &whitelist);
        assert_eq!(out.columns, vec!["id", "siteweb"]);
        assert!(out.columns.iter().all(|c| t.has_column(c)));
        for w in whitelist {
            assert_eq!(t.has_column(w), out.has_column(w));
        }
    }
}
