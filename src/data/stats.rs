use std::fmt;

use super::model::Table;

// ---------------------------------------------------------------------------
// Share – a count and its percentage of a total
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Share {
    pub count: usize,
    pub percent: f64,
}

impl Share {
    /// `count` out of `total`; an empty total gives 0.0 %.
    pub fn of(count: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        };
        Share { count, percent }
    }

    /// Non-null cells of `column`, or `None` when the column is absent.
    pub fn non_null(table: &Table, column: &str) -> Option<Self> {
        table
            .non_null_count(column)
            .map(|n| Share::of(n, table.len()))
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.count, self.percent)
    }
}

// ---------------------------------------------------------------------------
// Summary statistics of the cleaned table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total: usize,
    /// Most frequent social purposes, labels truncated for display.
    /// `None` when the purpose column is absent.
    pub top_purposes: Option<Vec<(String, usize)>>,
    pub with_website: Option<Share>,
}

impl SummaryStats {
    /// `cleaned` gives the total and website share; `purposes` is the
    /// pre-projection table that still carries the social-purpose column.
    pub fn compute(
        cleaned: &Table,
        purposes: &Table,
        purpose_column: &str,
        website_column: &str,
        top_n: usize,
        label_width: usize,
    ) -> Self {
        let top_purposes = purposes.has_column(purpose_column).then(|| {
            purposes
                .value_counts(purpose_column)
                .into_iter()
                .take(top_n)
                .map(|(label, n)| (truncate_label(&label, label_width), n))
                .collect()
        });

        SummaryStats {
            total: cleaned.len(),
            top_purposes,
            with_website: Share::non_null(cleaned, website_column),
        }
    }
}

/// First `width` characters of `label`.
pub fn truncate_label(label: &str, width: usize) -> String {
    label.chars().take(width).collect()
}

/// `12345` → `"12,345"`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
