use chrono::NaiveDate;
use log::{Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple logger implementation, writes to stderr so stdout stays free for pages
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &LogRecord) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// One day (or hour) of bike sharing usage as found in the source table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub instant: u64,
    pub dteday: NaiveDate,
    pub season: u8,
    pub yr: u8,
    pub mnth: u8,
    /// Hour of day, only present in hourly extracts
    #[serde(default)]
    pub hr: Option<u8>,
    /// Month label column used by the revenue analysis
    #[serde(default)]
    pub month: Option<String>,
    pub holiday: u8,
    pub weekday: u8,
    pub workingday: u8,
    pub weathersit: u8,
    pub temp: f64,
    pub atemp: f64,
    pub hum: f64,
    pub windspeed: f64,
    pub casual: u64,
    pub registered: u64,
    pub cnt: u64,
}

/// Optional columns found in the source header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalColumns {
    pub hour: bool,
    pub month_label: bool,
}

/// The loaded dataset. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
    columns: OptionalColumns,
}

impl Table {
    pub fn new(records: Vec<Record>, columns: OptionalColumns) -> Self {
        Self { records, columns }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> OptionalColumns {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Rentals and revenue for one month label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub instant: u64,
    pub cnt: u64,
    pub revenue: u64,
}

/// Row count for one categorical code (season, weekday, weather)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub code: u8,
    pub label: String,
    pub count: u64,
}

/// Mean rentals for one hour of the day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyAverage {
    pub hour: u8,
    pub cnt: f64,
}

/// Total rentals for one numeric month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: u8,
    pub cnt: u64,
}

/// Recency and monetary values for a single date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRfm {
    pub date: NaiveDate,
    pub recency_days: i64,
    pub rows: u64,
    pub monetary: u64,
}

/// Recency/frequency/monetary sketch keyed by date.
///
/// There is no customer identity in the data, so `frequency` is a single
/// scalar (mean rows per date) rather than a per-customer value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmSketch {
    pub max_date: NaiveDate,
    pub frequency: f64,
    pub dates: Vec<DailyRfm>,
}

/// Typed values of one result column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValues {
    Text(Vec<String>),
    Int(Vec<u64>),
    SignedInt(Vec<i64>),
    Float(Vec<f64>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::SignedInt(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Formats the value at `row` for display and CSV output
    pub fn cell(&self, row: usize) -> String {
        match self {
            ColumnValues::Text(v) => v[row].clone(),
            ColumnValues::Int(v) => v[row].to_string(),
            ColumnValues::SignedInt(v) => v[row].to_string(),
            ColumnValues::Float(v) => format!("{:.2}", v[row]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: &str, values: ColumnValues) -> Self {
        Self {
            name: name.to_string(),
            values,
        }
    }
}

/// Column-oriented aggregation result used for display and export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<Column>,
}

impl ResultTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row(&self, index: usize) -> Vec<String> {
        self.columns.iter().map(|c| c.values.cell(index)).collect()
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<String>> = (0..self.num_rows()).map(|i| self.row(i)).collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                rows.iter()
                    .map(|r| r[i].len())
                    .chain(std::iter::once(c.name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>w$}", c.name, w = w))
            .collect();
        writeln!(f, "{}", header.join("  "))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("  "))?;
        if self.columns.iter().all(|c| c.values.is_empty()) {
            return writeln!(f, "(no rows)");
        }
        for row in rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:>w$}", cell, w = w))
                .collect();
            writeln!(f, "{}", cells.join("  "))?;
        }
        Ok(())
    }
}

impl From<&[MonthlyRevenue]> for ResultTable {
    fn from(rows: &[MonthlyRevenue]) -> Self {
        ResultTable::new(vec![
            Column::new(
                "month",
                ColumnValues::Text(rows.iter().map(|r| r.month.clone()).collect()),
            ),
            Column::new(
                "instant",
                ColumnValues::Int(rows.iter().map(|r| r.instant).collect()),
            ),
            Column::new("cnt", ColumnValues::Int(rows.iter().map(|r| r.cnt).collect())),
            Column::new(
                "revenue",
                ColumnValues::Int(rows.iter().map(|r| r.revenue).collect()),
            ),
        ])
    }
}

impl From<&[CategoryCount]> for ResultTable {
    fn from(rows: &[CategoryCount]) -> Self {
        ResultTable::new(vec![
            Column::new(
                "code",
                ColumnValues::Int(rows.iter().map(|r| u64::from(r.code)).collect()),
            ),
            Column::new(
                "label",
                ColumnValues::Text(rows.iter().map(|r| r.label.clone()).collect()),
            ),
            Column::new(
                "count",
                ColumnValues::Int(rows.iter().map(|r| r.count).collect()),
            ),
        ])
    }
}

impl From<&[HourlyAverage]> for ResultTable {
    fn from(rows: &[HourlyAverage]) -> Self {
        ResultTable::new(vec![
            Column::new(
                "hr",
                ColumnValues::Int(rows.iter().map(|r| u64::from(r.hour)).collect()),
            ),
            Column::new("cnt", ColumnValues::Float(rows.iter().map(|r| r.cnt).collect())),
        ])
    }
}

impl From<&[MonthlyTotal]> for ResultTable {
    fn from(rows: &[MonthlyTotal]) -> Self {
        ResultTable::new(vec![
            Column::new(
                "mnth",
                ColumnValues::Int(rows.iter().map(|r| u64::from(r.month)).collect()),
            ),
            Column::new("cnt", ColumnValues::Int(rows.iter().map(|r| r.cnt).collect())),
        ])
    }
}

impl From<&RfmSketch> for ResultTable {
    fn from(sketch: &RfmSketch) -> Self {
        let days = &sketch.dates;
        ResultTable::new(vec![
            Column::new(
                "dteday",
                ColumnValues::Text(days.iter().map(|d| d.date.to_string()).collect()),
            ),
            Column::new(
                "recency",
                ColumnValues::SignedInt(days.iter().map(|d| d.recency_days).collect()),
            ),
            Column::new("rows", ColumnValues::Int(days.iter().map(|d| d.rows).collect())),
            Column::new(
                "monetary",
                ColumnValues::Int(days.iter().map(|d| d.monetary).collect()),
            ),
        ])
    }
}

/// Configuration for rendering and aggregation
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Price charged per rental when deriving revenue
    pub unit_price: u64,
    /// Width in characters of the longest bar in text charts
    pub bar_width: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            unit_price: 3,
            bar_width: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_table_formats_aligned_rows() {
        let totals = vec![
            MonthlyTotal { month: 1, cnt: 60 },
            MonthlyTotal { month: 12, cnt: 1500 },
        ];
        let table = ResultTable::from(totals.as_slice());
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.headers(), vec!["mnth", "cnt"]);

        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "mnth   cnt");
        assert_eq!(lines[2], "   1    60");
        assert_eq!(lines[3], "  12  1500");
    }

    #[test]
    fn float_cells_use_two_decimals() {
        let values = ColumnValues::Float(vec![1.0 / 3.0]);
        assert_eq!(values.cell(0), "0.33");
    }

    #[test]
    fn empty_result_table_says_so() {
        let table = ResultTable::from(Vec::<MonthlyTotal>::new().as_slice());
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.to_string(), "mnth  cnt\n----  ---\n(no rows)\n");
    }

    #[test]
    fn table_reports_emptiness() {
        assert!(Table::default().is_empty());
        assert_eq!(Table::default().len(), 0);
    }
}
