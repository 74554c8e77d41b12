pub mod chart;
pub mod content;
pub mod error;
pub mod load;
pub mod navigation;
pub mod session;
pub mod structs;
pub mod transform;

// Re-export public API
pub use chart::{ChartKind, ChartSpec, render_text};
pub use error::{DashboardError, Result};
pub use load::{export_results, read_table, write_csv, write_json, write_parquet};
pub use navigation::{Analysis, Input, Page, Section, State, View, Visualization, render};
pub use session::{Command, parse_command, run_session};
pub use structs::{DashboardConfig, Record, ResultTable, SimpleLogger, Table};
pub use transform::{
    hourly_average, monthly_revenue, monthly_totals, peak_month, rfm_sketch,
    seasonal_distribution, weather_distribution, weekday_distribution,
};
