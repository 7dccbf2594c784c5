use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::data::model::{count_values, Table};
use crate::data::stats::Share;

// ---------------------------------------------------------------------------
// Creations per year
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Year of a date cell, `None` when it does not parse.
pub fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .map(|d| d.year())
}

/// Number of records per year, ascending. Unparsable dates and years at or
/// below `min_year` (registry placeholders such as `0001-01-01`) are dropped.
pub fn year_counts<'a, I>(dates: I, min_year: i32) -> BTreeMap<i32, usize>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts = BTreeMap::new();
    for year in dates.into_iter().flatten().filter_map(parse_year) {
        if year > min_year {
            *counts.entry(year).or_insert(0) += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Most frequent address lines
// ---------------------------------------------------------------------------

/// Null → empty, uppercase, trimmed.
pub fn normalize_address(raw: Option<&str>) -> String {
    raw.unwrap_or_default().to_uppercase().trim().to_string()
}

/// The `n` most frequent normalized addresses, empty ones excluded.
pub fn top_locations<'a, I>(addresses: I, n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let normalized = addresses
        .into_iter()
        .map(normalize_address)
        .filter(|a| !a.is_empty());
    let mut counts = count_values(normalized);
    counts.truncate(n);
    counts
}

// ---------------------------------------------------------------------------
// Statistics card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CardStats {
    pub total: usize,
    pub with_website: Share,
    pub with_address: Share,
}

impl CardStats {
    /// Absent columns count as zero.
    pub fn compute(table: &Table, website_column: &str, address_column: &str) -> Self {
        let total = table.len();
        let share = |col: &str| Share::of(table.non_null_count(col).unwrap_or(0), total);
        CardStats {
            total,
            with_website: share(website_column),
            with_address: share(address_column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    #[test]
    fn test_parse_year_formats() {
        assert_eq!(parse_year("2001-05-01"), Some(2001));
        assert_eq!(parse_year("15/03/1998"), Some(1998));
        assert_eq!(parse_year("2010/12/31"), Some(2010));
        assert_eq!(parse_year("2020-01-01 00:00:00"), Some(2020));
        assert_eq!(parse_year(" 2020-01-01T08:30:00 "), Some(2020));
        assert_eq!(parse_year("pas une date"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn test_year_counts_drop_sentinels() {
        let dates = [Some("1850-01-01"), Some("2001-05-01"), Some("2020-01-01")];
        let counts = year_counts(dates, 1900);
        assert_eq!(counts, BTreeMap::from([(2001, 1), (2020, 1)]));
    }

    #[test]
    fn test_year_counts_boundary_nulls_and_order() {
        let dates = [
            Some("1900-06-01"),
            Some("1901-01-01"),
            None,
            Some("n/a"),
            Some("0001-01-01"),
            Some("1999-01-01"),
            Some("1901-12-31"),
        ];
        let counts = year_counts(dates, 1900);
        assert_eq!(counts.into_iter().collect::<Vec<_>>(), vec![(1901, 2), (1999, 1)]);
    }

    #[test]
    fn test_top_locations_normalizes_and_excludes_empty() {
        let addrs = [Some("A"), Some("a "), Some(""), Some("A"), None, Some("  ")];
        let top = top_locations(addrs, 10);
        assert_eq!(top, vec![("A".to_string(), 3)]);
    }

    #[test]
    fn test_top_locations_limit_and_ranking() {
        let addrs = [
            Some("rue de Lyon"),
            Some("Avenue Daumesnil"),
            Some("AVENUE DAUMESNIL"),
            Some("rue de Charenton"),
            Some("avenue daumesnil "),
            Some("RUE DE LYON"),
        ];
        let top = top_locations(addrs, 2);
        assert_eq!(
            top,
            vec![("AVENUE DAUMESNIL".to_string(), 3), ("RUE DE LYON".to_string(), 2)]
        );
    }

    #[test]
    fn test_card_on_empty_table() {
        let t = Table::new(vec!["siteweb".into(), "adr1".into()], Vec::new());
        let card = CardStats::compute(&t, "siteweb", "adr1");
        assert_eq!(card.total, 0);
        assert_eq!(card.with_website, Share { count: 0, percent: 0.0 });
        assert_eq!(card.with_address, Share { count: 0, percent: 0.0 });
    }

    #[test]
    fn test_card_counts() {
        let t = Table::new(
            vec!["siteweb".into(), "adr1".into()],
            vec![
                Record::from_strs(&["w", "1 rue"]),
                Record::from_strs(&["", "2 rue"]),
                Record::from_strs(&["", ""]),
                Record::from_strs(&["", "3 rue"]),
            ],
        );
        let card = CardStats::compute(&t, "siteweb", "absent");
        assert_eq!(card.total, 4);
        assert_eq!(card.with_website.count, 1);
        assert_eq!(card.with_website.percent, 25.0);
        assert_eq!(card.with_address.count, 0);

        let card = CardStats::compute(&t, "siteweb", "adr1");
        assert_eq!(card.with_address.count, 3);
        assert_eq!(card.with_address.percent, 75.0);
    }
}
