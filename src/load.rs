use crate::chart::{self, ChartSpec};
use crate::error::{DashboardError, Result};
use crate::structs::{ColumnValues, DashboardConfig, OptionalColumns, Record, ResultTable, Table};
use crate::transform;
use arrow_array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, RecordBatch, StringArray, UInt64Array,
};
use arrow_schema::{DataType, Field, Schema};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, Writer};
use log::{debug, warn};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Columns every source table must provide
pub const REQUIRED_COLUMNS: [&str; 16] = [
    "instant",
    "dteday",
    "season",
    "yr",
    "mnth",
    "holiday",
    "weekday",
    "workingday",
    "weathersit",
    "temp",
    "atemp",
    "hum",
    "windspeed",
    "casual",
    "registered",
    "cnt",
];

pub const HOUR_COLUMN: &str = "hr";
pub const MONTH_LABEL_COLUMN: &str = "month";

/// Reads the bike sharing table from a CSV or Parquet file.
///
/// The format is picked by extension: `.parquet` is read through Arrow,
/// anything else is parsed as CSV with a header row. The header is checked
/// once against [`REQUIRED_COLUMNS`] before any row is read.
///
/// # Errors
///
/// Every failure is reported as `DashboardError::Load`: a missing file,
/// missing columns (all of them named at once), or a malformed value.
pub fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(DashboardError::Load(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let is_parquet = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    let result = if is_parquet {
        read_parquet(path)
    } else {
        read_csv(path)
    };

    result.map_err(|e| match e {
        DashboardError::Load(_) => e,
        other => DashboardError::Load(format!("{}: {}", path.display(), other)),
    })
}

/// Checks a header against the schema and reports which optional columns exist.
pub fn check_schema<S: AsRef<str>>(names: &[S]) -> Result<OptionalColumns> {
    let has = |column: &str| names.iter().any(|n| n.as_ref() == column);
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !has(c))
        .collect();

    if !missing.is_empty() {
        return Err(DashboardError::Load(format!(
            "Missing columns: {}",
            missing.join(", ")
        )));
    }

    Ok(OptionalColumns {
        hour: has(HOUR_COLUMN),
        month_label: has(MONTH_LABEL_COLUMN),
    })
}

fn read_csv(path: &Path) -> Result<Table> {
    debug!("Reading CSV file: {}", path.display());
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let columns = check_schema(&headers)?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<Record>().enumerate() {
        let record = row.map_err(|e| DashboardError::Load(format!("Row {}: {}", i + 1, e)))?;
        records.push(record);
    }

    debug!(
        "Loaded {} rows (hour column: {}, month label column: {})",
        records.len(),
        columns.hour,
        columns.month_label
    );
    Ok(Table::new(records, columns))
}

fn read_parquet(path: &Path) -> Result<Table> {
    debug!("Reading Parquet file: {}", path.display());
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    let columns = check_schema(&names)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let offset = records.len();
        records.extend(batch_records(&batch, columns, offset)?);
    }

    debug!("Loaded {} rows from Parquet", records.len());
    Ok(Table::new(records, columns))
}

fn batch_records(
    batch: &RecordBatch,
    columns: OptionalColumns,
    offset: usize,
) -> Result<Vec<Record>> {
    let instant = IntColumn::get(batch, "instant")?;
    let dteday = get_column_str(batch, "dteday")?;
    let season = IntColumn::get(batch, "season")?;
    let yr = IntColumn::get(batch, "yr")?;
    let mnth = IntColumn::get(batch, "mnth")?;
    let holiday = IntColumn::get(batch, "holiday")?;
    let weekday = IntColumn::get(batch, "weekday")?;
    let workingday = IntColumn::get(batch, "workingday")?;
    let weathersit = IntColumn::get(batch, "weathersit")?;
    let temp = get_column_f64(batch, "temp")?;
    let atemp = get_column_f64(batch, "atemp")?;
    let hum = get_column_f64(batch, "hum")?;
    let windspeed = get_column_f64(batch, "windspeed")?;
    let casual = IntColumn::get(batch, "casual")?;
    let registered = IntColumn::get(batch, "registered")?;
    let cnt = IntColumn::get(batch, "cnt")?;
    let hr = if columns.hour {
        Some(IntColumn::get(batch, HOUR_COLUMN)?)
    } else {
        None
    };
    let month = if columns.month_label {
        Some(LabelColumn::get(batch, MONTH_LABEL_COLUMN)?)
    } else {
        None
    };

    let mut records = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let row = offset + i + 1;
        let date_str = required(dteday, i, "dteday", row)?;
        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
            DashboardError::Load(format!("Row {}: bad dteday '{}': {}", row, date_str, e))
        })?;

        records.push(Record {
            instant: instant.unsigned(i, row)?,
            dteday: date,
            season: narrow_u8(&season, i, row)?,
            yr: narrow_u8(&yr, i, row)?,
            mnth: narrow_u8(&mnth, i, row)?,
            hr: match &hr {
                Some(col) if !col.is_null(i) => Some(narrow_u8(col, i, row)?),
                _ => None,
            },
            month: match &month {
                Some(col) => col.label(i, row)?,
                None => None,
            },
            holiday: narrow_u8(&holiday, i, row)?,
            weekday: narrow_u8(&weekday, i, row)?,
            workingday: narrow_u8(&workingday, i, row)?,
            weathersit: narrow_u8(&weathersit, i, row)?,
            temp: required_f64(temp, i, "temp", row)?,
            atemp: required_f64(atemp, i, "atemp", row)?,
            hum: required_f64(hum, i, "hum", row)?,
            windspeed: required_f64(windspeed, i, "windspeed", row)?,
            casual: casual.unsigned(i, row)?,
            registered: registered.unsigned(i, row)?,
            cnt: cnt.unsigned(i, row)?,
        });
    }
    Ok(records)
}

/// Integer column stored as either Int64 or Int32
enum IntColumn<'a> {
    I64(&'a str, &'a Int64Array),
    I32(&'a str, &'a Int32Array),
}

impl<'a> IntColumn<'a> {
    fn get(batch: &'a RecordBatch, name: &'a str) -> Result<Self> {
        let column = batch
            .column_by_name(name)
            .ok_or_else(|| DashboardError::Load(format!("Column not found: {}", name)))?;
        if let Some(array) = column.as_any().downcast_ref::<Int64Array>() {
            return Ok(IntColumn::I64(name, array));
        }
        column
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|array| IntColumn::I32(name, array))
            .ok_or_else(|| DashboardError::Load(format!("Column {} is not an integer", name)))
    }

    fn name(&self) -> &str {
        match self {
            IntColumn::I64(name, _) | IntColumn::I32(name, _) => name,
        }
    }

    fn is_null(&self, i: usize) -> bool {
        match self {
            IntColumn::I64(_, a) => a.is_null(i),
            IntColumn::I32(_, a) => a.is_null(i),
        }
    }

    fn value(&self, i: usize, row: usize) -> Result<i64> {
        if self.is_null(i) {
            return Err(DashboardError::Load(format!(
                "Row {}: {} is empty",
                row,
                self.name()
            )));
        }
        Ok(match self {
            IntColumn::I64(_, a) => a.value(i),
            IntColumn::I32(_, a) => i64::from(a.value(i)),
        })
    }

    fn unsigned(&self, i: usize, row: usize) -> Result<u64> {
        let value = self.value(i, row)?;
        u64::try_from(value).map_err(|_| {
            DashboardError::Load(format!("Row {}: {} is negative ({})", row, self.name(), value))
        })
    }
}

/// Label column stored as text or as integers; integers become their decimal text
enum LabelColumn<'a> {
    Text(&'a StringArray),
    Int(IntColumn<'a>),
}

impl<'a> LabelColumn<'a> {
    fn get(batch: &'a RecordBatch, name: &'a str) -> Result<Self> {
        if let Ok(array) = get_column_str(batch, name) {
            return Ok(LabelColumn::Text(array));
        }
        IntColumn::get(batch, name)
            .map(LabelColumn::Int)
            .map_err(|_| DashboardError::Load(format!("Column {} is neither text nor integer", name)))
    }

    fn label(&self, i: usize, row: usize) -> Result<Option<String>> {
        match self {
            LabelColumn::Text(array) if array.is_null(i) => Ok(None),
            LabelColumn::Text(array) => Ok(Some(array.value(i).to_string())),
            LabelColumn::Int(column) if column.is_null(i) => Ok(None),
            LabelColumn::Int(column) => Ok(Some(column.value(i, row)?.to_string())),
        }
    }
}

fn narrow_u8(column: &IntColumn<'_>, i: usize, row: usize) -> Result<u8> {
    let value = column.value(i, row)?;
    u8::try_from(value).map_err(|_| {
        DashboardError::Load(format!(
            "Row {}: {} out of range ({})",
            row,
            column.name(),
            value
        ))
    })
}

fn required<'a>(column: &'a StringArray, i: usize, name: &str, row: usize) -> Result<&'a str> {
    if column.is_null(i) {
        return Err(DashboardError::Load(format!("Row {}: {} is empty", row, name)));
    }
    Ok(column.value(i))
}

fn required_f64(column: &Float64Array, i: usize, name: &str, row: usize) -> Result<f64> {
    if column.is_null(i) {
        return Err(DashboardError::Load(format!("Row {}: {} is empty", row, name)));
    }
    Ok(column.value(i))
}

fn get_column_f64<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DashboardError::Load(format!("Column not found: {}", name)))?
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| DashboardError::Load(format!("Column {} is not Float64", name)))
}

fn get_column_str<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DashboardError::Load(format!("Column not found: {}", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DashboardError::Load(format!("Column {} is not Utf8/String", name)))
}

/// Writes an aggregation result to a CSV file.
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_csv(table: &ResultTable, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(table.headers())?;
    for i in 0..table.num_rows() {
        writer.write_record(table.row(i))?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes any serializable result to a pretty-formatted JSON file.
///
/// # Errors
/// Returns error if file cannot be created or serialization fails.
pub fn write_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// Writes an aggregation result to a Parquet file, one typed column per result column.
///
/// # Errors
/// Returns error if file cannot be created, schema is invalid, or Arrow operations fail.
pub fn write_parquet(table: &ResultTable, output_path: &Path) -> Result<()> {
    let mut fields = Vec::with_capacity(table.columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns.len());

    for column in &table.columns {
        let (data_type, array): (DataType, ArrayRef) = match &column.values {
            ColumnValues::Text(v) => (
                DataType::Utf8,
                Arc::new(StringArray::from_iter_values(v.iter())),
            ),
            ColumnValues::Int(v) => (DataType::UInt64, Arc::new(UInt64Array::from(v.clone()))),
            ColumnValues::SignedInt(v) => (DataType::Int64, Arc::new(Int64Array::from(v.clone()))),
            ColumnValues::Float(v) => (DataType::Float64, Arc::new(Float64Array::from(v.clone()))),
        };
        fields.push(Field::new(column.name.as_str(), data_type, false));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

fn write_all<T: Serialize + ?Sized>(
    rows: &T,
    table: &ResultTable,
    output_dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let csv_path = output_dir.join(format!("{}.csv", stem));
    let json_path = output_dir.join(format!("{}.json", stem));
    let parquet_path = output_dir.join(format!("{}.parquet", stem));

    write_csv(table, &csv_path)?;
    write_json(rows, &json_path)?;
    write_parquet(table, &parquet_path)?;
    Ok(vec![csv_path, json_path, parquet_path])
}

/// Skips an analysis whose columns are missing, keeps every other error fatal.
fn skip_recoverable<T>(name: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_recoverable() => {
            warn!("Skipping {}: {}", name, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Computes every analysis and writes each result as CSV, JSON and Parquet,
/// plus one JSON file holding every chart spec.
///
/// Analyses that fail with a lookup or value error (for instance hourly
/// averages on a daily table) are skipped with a warning.
///
/// # Returns
/// Paths of every written file.
pub fn export_results(
    table: &Table,
    config: &DashboardConfig,
    output_dir: &Path,
    name: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let mut charts: Vec<ChartSpec> = Vec::new();

    if let Some(rows) = skip_recoverable(
        "monthly revenue",
        transform::monthly_revenue(table, config.unit_price),
    )? {
        let result = ResultTable::from(rows.as_slice());
        written.extend(write_all(&rows, &result, output_dir, &format!("{}_monthly_revenue", name))?);
    }

    if let Some(rows) = skip_recoverable("season distribution", transform::seasonal_distribution(table))? {
        let result = ResultTable::from(rows.as_slice());
        written.extend(write_all(&rows, &result, output_dir, &format!("{}_season", name))?);
        charts.push(chart::season_chart(&rows));
    }

    if let Some(rows) = skip_recoverable("weekday distribution", transform::weekday_distribution(table))? {
        let result = ResultTable::from(rows.as_slice());
        written.extend(write_all(&rows, &result, output_dir, &format!("{}_weekday", name))?);
        charts.push(chart::weekday_chart(&rows));
    }

    if let Some(sketch) = skip_recoverable("rfm sketch", transform::rfm_sketch(table))? {
        let result = ResultTable::from(&sketch);
        written.extend(write_all(&sketch, &result, output_dir, &format!("{}_rfm", name))?);
    }

    if let Some(rows) = skip_recoverable("hourly average", transform::hourly_average(table))? {
        let result = ResultTable::from(rows.as_slice());
        written.extend(write_all(&rows, &result, output_dir, &format!("{}_hourly", name))?);
        charts.push(chart::hourly_chart(&rows));
    }

    let totals = transform::monthly_totals(table);
    let result = ResultTable::from(totals.as_slice());
    written.extend(write_all(&totals, &result, output_dir, &format!("{}_monthly_totals", name))?);
    charts.push(chart::monthly_totals_chart(&totals));

    if let Some(rows) = skip_recoverable("weather distribution", transform::weather_distribution(table))? {
        let result = ResultTable::from(rows.as_slice());
        written.extend(write_all(&rows, &result, output_dir, &format!("{}_weather", name))?);
        charts.push(chart::weather_chart(&rows));
    }

    let charts_path = output_dir.join(format!("{}_charts.json", name));
    write_json(&charts, &charts_path)?;
    written.push(charts_path);

    debug!("Exported {} files to {}", written.len(), output_dir.display());
    Ok(written)
}
