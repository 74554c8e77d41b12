use crate::error::{DashboardError, Result};
use crate::structs::{
    CategoryCount, DailyRfm, HourlyAverage, MonthlyRevenue, MonthlyTotal, Record, RfmSketch, Table,
};
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeMap;

const SEASON_NAMES: [&str; 4] = ["Spring", "Summer", "Fall", "Winter"];

// Code 0 is mapped to Monday, as the dashboard has always labelled it.
const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const WEATHER_NAMES: [&str; 4] = ["Clear", "Mist", "Light Snow/Rain", "Heavy Rain"];

/// Running totals for one group key.
///
/// Everything is accumulated as integers so the parallel reduction gives
/// the same answer regardless of how rayon splits the input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Bucket {
    rows: u64,
    instant: u64,
    cnt: u64,
}

impl Bucket {
    fn add(&mut self, record: &Record) {
        self.rows += 1;
        self.instant += record.instant;
        self.cnt += record.cnt;
    }

    fn merge(&mut self, other: Bucket) {
        self.rows += other.rows;
        self.instant += other.instant;
        self.cnt += other.cnt;
    }
}

/// Sort key for month labels: numeric labels first in numeric order, then
/// any other label in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MonthLabel {
    non_numeric: bool,
    number: u64,
    label: String,
}

impl MonthLabel {
    fn new(label: &str) -> Self {
        let label = label.trim();
        match label.parse::<u64>() {
            Ok(number) => Self {
                non_numeric: false,
                number,
                label: label.to_string(),
            },
            Err(_) => Self {
                non_numeric: true,
                number: 0,
                label: label.to_string(),
            },
        }
    }
}

/// Groups records by `key`, skipping records whose key is `None`.
///
/// The fold/reduce runs on rayon's pool. Keys come back in ascending order.
fn group_by<K, F>(records: &[Record], key: F) -> BTreeMap<K, Bucket>
where
    K: Ord + Send,
    F: Fn(&Record) -> Option<K> + Sync,
{
    records
        .par_iter()
        .fold(BTreeMap::new, |mut acc: BTreeMap<K, Bucket>, record| {
            if let Some(k) = key(record) {
                acc.entry(k).or_default().add(record);
            }
            acc
        })
        .reduce(BTreeMap::new, |mut left, right| {
            for (k, bucket) in right {
                left.entry(k).or_default().merge(bucket);
            }
            left
        })
}

pub fn season_name(code: u8) -> Result<&'static str> {
    lookup_name(&SEASON_NAMES, usize::from(code).wrapping_sub(1), "season", code)
}

pub fn weekday_name(code: u8) -> Result<&'static str> {
    lookup_name(&WEEKDAY_NAMES, usize::from(code), "weekday", code)
}

pub fn weather_name(code: u8) -> Result<&'static str> {
    lookup_name(&WEATHER_NAMES, usize::from(code).wrapping_sub(1), "weathersit", code)
}

fn lookup_name(
    names: &[&'static str],
    index: usize,
    column: &str,
    code: u8,
) -> Result<&'static str> {
    names
        .get(index)
        .copied()
        .ok_or_else(|| DashboardError::Lookup(format!("No {} label for code {}", column, code)))
}

fn categorical_counts(
    table: &Table,
    column: &str,
    key: impl Fn(&Record) -> u8 + Sync,
    name: fn(u8) -> Result<&'static str>,
) -> Result<Vec<CategoryCount>> {
    let groups = group_by(table.records(), |r| Some(key(r)));
    debug!("Grouped {} rows into {} {} buckets", table.len(), groups.len(), column);

    groups
        .into_iter()
        .map(|(code, bucket)| {
            Ok(CategoryCount {
                code,
                label: name(code)?.to_string(),
                count: bucket.rows,
            })
        })
        .collect()
}

/// Sums `instant` and `cnt` per month label and derives revenue.
///
/// Groups on the `month` label column, not on the numeric `mnth` column used
/// by [`monthly_totals`]. Rows with an empty label are skipped.
///
/// # Errors
///
/// Returns `DashboardError::Lookup` if the table has no `month` column and
/// `DashboardError::Value` if a month's revenue does not fit in a `u64`.
pub fn monthly_revenue(table: &Table, unit_price: u64) -> Result<Vec<MonthlyRevenue>> {
    if !table.columns().month_label {
        return Err(DashboardError::Lookup(
            "Column not found: month".to_string(),
        ));
    }

    let groups = group_by(table.records(), |r| {
        r.month
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .map(MonthLabel::new)
    });
    debug!("Monthly revenue over {} month labels", groups.len());

    groups
        .into_iter()
        .map(|(month, bucket)| {
            let revenue = bucket.cnt.checked_mul(unit_price).ok_or_else(|| {
                DashboardError::Value(format!(
                    "Revenue for month {} overflows at unit price {}",
                    month.label, unit_price
                ))
            })?;
            Ok(MonthlyRevenue {
                month: month.label,
                instant: bucket.instant,
                cnt: bucket.cnt,
                revenue,
            })
        })
        .collect()
}

/// Counts rows per season and attaches the season name.
///
/// # Errors
///
/// Returns `DashboardError::Lookup` for a season code outside 1-4.
pub fn seasonal_distribution(table: &Table) -> Result<Vec<CategoryCount>> {
    categorical_counts(table, "season", |r| r.season, season_name)
}

/// Counts rows per weekday and attaches the weekday name.
///
/// This counts rows, it does not sum rentals.
///
/// # Errors
///
/// Returns `DashboardError::Lookup` for a weekday code outside 0-6.
pub fn weekday_distribution(table: &Table) -> Result<Vec<CategoryCount>> {
    categorical_counts(table, "weekday", |r| r.weekday, weekday_name)
}

/// Counts rows per weather situation code.
///
/// # Errors
///
/// Returns `DashboardError::Lookup` for a code outside 1-4.
pub fn weather_distribution(table: &Table) -> Result<Vec<CategoryCount>> {
    categorical_counts(table, "weathersit", |r| r.weathersit, weather_name)
}

/// Mean `cnt` per hour of day.
///
/// Only hours that occur in the table are returned; missing hours are
/// absent rather than zero.
///
/// # Errors
///
/// Returns `DashboardError::Lookup` if the table has no `hr` column.
pub fn hourly_average(table: &Table) -> Result<Vec<HourlyAverage>> {
    if !table.columns().hour {
        return Err(DashboardError::Lookup("Column not found: hr".to_string()));
    }

    let groups = group_by(table.records(), |r| r.hr);
    if groups.len() < 24 {
        debug!("Hourly average covers only {} of 24 hours", groups.len());
    }

    Ok(groups
        .into_iter()
        .map(|(hour, bucket)| HourlyAverage {
            hour,
            cnt: bucket.cnt as f64 / bucket.rows as f64,
        })
        .collect())
}

/// Total `cnt` per numeric month, ordered by month.
pub fn monthly_totals(table: &Table) -> Vec<MonthlyTotal> {
    group_by(table.records(), |r| Some(r.mnth))
        .into_iter()
        .map(|(month, bucket)| MonthlyTotal {
            month,
            cnt: bucket.cnt,
        })
        .collect()
}

/// The month with the largest total. The earliest month wins a tie.
pub fn peak_month(totals: &[MonthlyTotal]) -> Option<&MonthlyTotal> {
    totals
        .iter()
        .reduce(|best, t| if t.cnt > best.cnt { t } else { best })
}

/// Builds the recency/frequency/monetary sketch keyed by date.
///
/// # Errors
///
/// Returns `DashboardError::Value` for an empty table, which has no
/// latest date to measure recency from.
pub fn rfm_sketch(table: &Table) -> Result<RfmSketch> {
    let groups = group_by(table.records(), |r| Some(r.dteday));
    let max_date = groups.keys().next_back().copied().ok_or_else(|| {
        DashboardError::Value("Cannot compute recency on an empty table".to_string())
    })?;

    let frequency = table.len() as f64 / groups.len() as f64;
    debug!(
        "RFM sketch over {} dates, latest {}, frequency {:.2}",
        groups.len(),
        max_date,
        frequency
    );

    let dates = groups
        .into_iter()
        .map(|(date, bucket)| DailyRfm {
            date,
            recency_days: (max_date - date).num_days(),
            rows: bucket.rows,
            monetary: bucket.cnt,
        })
        .collect();

    Ok(RfmSketch {
        max_date,
        frequency,
        dates,
    })
}
