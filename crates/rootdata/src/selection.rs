//! Object, column and row selection for tabular extraction.
//!
//! A selection names one histogram (`Hist:dir/name;cycle`) or tree
//! (`Tree:dir/name`). Histogram columns are `center`, `low`, `content` and
//! `error`; tree columns are leaves written `branch`, `branch:leaf`,
//! `branch[i]` or `branch:leaf[i]`.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{Result, RootError};
use crate::file::RootFile;
use crate::histogram::bin_center;
use crate::tree::LeafInfo;

/// The object a table is extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectSelection {
    /// A histogram at a given cycle.
    Histogram {
        /// Path of the histogram.
        name: String,
        /// Cycle number.
        cycle: u16,
    },
    /// A tree or n-tuple.
    Tree(String),
}

impl FromStr for ObjectSelection {
    type Err = RootError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RootError::InvalidSelection(s.to_string());
        match s.split_once(':').ok_or_else(invalid)? {
            ("Hist", rest) => {
                let (name, cycle) = rest.rsplit_once(';').ok_or_else(invalid)?;
                let cycle = cycle.parse().map_err(|_| invalid())?;
                Ok(ObjectSelection::Histogram { name: name.to_string(), cycle })
            }
            ("Tree", rest) if !rest.is_empty() => Ok(ObjectSelection::Tree(rest.to_string())),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for ObjectSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectSelection::Histogram { name, cycle } => write!(f, "Hist:{};{}", name, cycle),
            ObjectSelection::Tree(name) => write!(f, "Tree:{}", name),
        }
    }
}

/// A derived per-bin histogram quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramColumn {
    /// Bin center; `-inf` for underflow and `+inf` for overflow.
    Center,
    /// Lower bin edge.
    Low,
    /// Bin content.
    Content,
    /// `sqrt(sumw2)`.
    Error,
}

impl HistogramColumn {
    /// All columns, in display order.
    pub const ALL: [HistogramColumn; 4] = [
        HistogramColumn::Center,
        HistogramColumn::Low,
        HistogramColumn::Content,
        HistogramColumn::Error,
    ];

    fn as_str(self) -> &'static str {
        match self {
            HistogramColumn::Center => "center",
            HistogramColumn::Low => "low",
            HistogramColumn::Content => "content",
            HistogramColumn::Error => "error",
        }
    }
}

impl FromStr for HistogramColumn {
    type Err = RootError;

    fn from_str(s: &str) -> Result<Self> {
        HistogramColumn::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| RootError::InvalidSelection(s.to_string()))
    }
}

impl fmt::Display for HistogramColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One leaf slot of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafColumn {
    /// Branch name.
    pub branch: String,
    /// Leaf name when it differs from the branch name.
    pub leaf: Option<String>,
    /// Array slot for array leaves.
    pub element: Option<usize>,
}

impl LeafColumn {
    /// Leaf name to look up.
    pub fn leaf_name(&self) -> &str {
        self.leaf.as_deref().unwrap_or(&self.branch)
    }
}

impl FromStr for LeafColumn {
    type Err = RootError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RootError::InvalidSelection(s.to_string());
        let (name, element) = match s.strip_suffix(']').and_then(|t| t.rsplit_once('[')) {
            Some((name, index)) => (name, Some(index.parse::<usize>().map_err(|_| invalid())?)),
            None => (s, None),
        };
        let (branch, leaf) = match name.split_once(':') {
            Some((branch, leaf)) => (branch, Some(leaf.to_string())),
            None => (name, None),
        };
        if branch.is_empty() || leaf.as_deref() == Some("") {
            return Err(invalid());
        }
        Ok(LeafColumn { branch: branch.to_string(), leaf, element })
    }
}

impl fmt::Display for LeafColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.branch)?;
        if let Some(leaf) = &self.leaf {
            write!(f, ":{}", leaf)?;
        }
        if let Some(i) = self.element {
            write!(f, "[{}]", i)?;
        }
        Ok(())
    }
}

impl LeafInfo {
    /// Columns for this leaf, one per array slot.
    pub fn columns(&self) -> Vec<LeafColumn> {
        let leaf = (self.leaf != self.branch).then(|| self.leaf.clone());
        if self.elements > 1 {
            (0..self.elements)
                .map(|i| LeafColumn {
                    branch: self.branch.clone(),
                    leaf: leaf.clone(),
                    element: Some(i),
                })
                .collect()
        } else {
            vec![LeafColumn { branch: self.branch.clone(), leaf, element: None }]
        }
    }
}

/// A column of an extracted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// Histogram quantity.
    Histogram(HistogramColumn),
    /// Tree leaf slot.
    Leaf(LeafColumn),
}

impl From<HistogramColumn> for Column {
    fn from(c: HistogramColumn) -> Self {
        Column::Histogram(c)
    }
}

impl From<LeafColumn> for Column {
    fn from(c: LeafColumn) -> Self {
        Column::Leaf(c)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Histogram(c) => c.fmt(f),
            Column::Leaf(c) => c.fmt(f),
        }
    }
}

/// Requested rows. A negative `end` means "to the last row"; the sign of
/// `start` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    /// First row.
    pub start: i64,
    /// Last row, inclusive.
    pub end: i64,
}

impl Default for RowRange {
    fn default() -> Self {
        Self { start: 0, end: -1 }
    }
}

impl RowRange {
    /// Row indices selected out of `n` rows.
    pub fn resolve(&self, n: usize) -> Range<usize> {
        let n = n as i64;
        let first = self.start.saturating_abs();
        let last = if self.end < 0 { n - 1 } else { (first - 1).max(self.end.min(n - 1)) };
        first as usize..(last + 1).max(first) as usize
    }
}

/// Extracted values, one vector per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Column headers.
    pub headers: Vec<String>,
    /// Column values; all columns have the same length.
    pub columns: Vec<Vec<f64>>,
}

impl Table {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

impl RootFile {
    /// Number of rows of the selected object: bins or tree entries.
    pub fn rows_in(&self, selection: &ObjectSelection) -> usize {
        match selection {
            ObjectSelection::Histogram { name, cycle } => self.histogram_bin_count(name, *cycle),
            ObjectSelection::Tree(name) => self.tree_entry_count(name),
        }
    }

    /// Extract `columns` of the selected object over `range`.
    ///
    /// Tree rows beyond the available data are `NaN`.
    pub fn read_selection(
        &self,
        selection: &ObjectSelection,
        columns: &[Column],
        range: RowRange,
    ) -> Result<Table> {
        let mut table = Table {
            headers: columns.iter().map(Column::to_string).collect(),
            columns: Vec::with_capacity(columns.len()),
        };
        match selection {
            ObjectSelection::Histogram { name, cycle } => {
                let bins = self.try_read_histogram(name, *cycle)?;
                let rows = range.resolve(bins.len());
                for column in columns {
                    let Column::Histogram(c) = column else {
                        return Err(RootError::InvalidSelection(format!(
                            "{} is not a histogram column",
                            column
                        )));
                    };
                    let values = rows
                        .clone()
                        .map(|i| match c {
                            HistogramColumn::Center => bin_center(&bins, i),
                            HistogramColumn::Low => bins[i].lowedge,
                            HistogramColumn::Content => bins[i].content,
                            HistogramColumn::Error => bins[i].error(),
                        })
                        .collect();
                    table.columns.push(values);
                }
            }
            ObjectSelection::Tree(name) => {
                let rows = range.resolve(self.tree_entry_count(name));
                for column in columns {
                    let Column::Leaf(c) = column else {
                        return Err(RootError::InvalidSelection(format!(
                            "{} is not a tree column",
                            column
                        )));
                    };
                    let data: Vec<f64> = self.try_list_entries(
                        name,
                        &c.branch,
                        c.leaf_name(),
                        c.element.unwrap_or(0),
                        rows.end,
                    )?;
                    let values =
                        rows.clone().map(|i| data.get(i).copied().unwrap_or(f64::NAN)).collect();
                    table.columns.push(values);
                }
            }
        }
        Ok(table)
    }
}
