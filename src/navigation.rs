use crate::chart::{self, ChartSpec};
use crate::content;
use crate::error::{DashboardError, Result};
use crate::structs::{DashboardConfig, ResultTable, Table};
use crate::transform;
use log::{debug, warn};

/// Top-level sidebar choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Section {
    #[default]
    Info,
    Analysis,
    Conclusion,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Section::Info => "Data Information",
            Section::Analysis => "Data Analysis",
            Section::Conclusion => "Answers & Conclusion",
        }
    }
}

/// Dropdown of the analysis section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Analysis {
    #[default]
    MonthlyRevenue,
    SeasonDistribution,
    WeekdayDistribution,
    Rfm,
}

impl Analysis {
    pub const ALL: [Analysis; 4] = [
        Analysis::MonthlyRevenue,
        Analysis::SeasonDistribution,
        Analysis::WeekdayDistribution,
        Analysis::Rfm,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Analysis::MonthlyRevenue => "Bike Rental and Revenue per Month",
            Analysis::SeasonDistribution => "Bike Rental Distribution Per Season",
            Analysis::WeekdayDistribution => "Bike Rental Distribution Per Weekday",
            Analysis::Rfm => "Frequency, Recency, and Monetary Analysis",
        }
    }
}

/// Dropdown of the conclusion section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visualization {
    #[default]
    HourlyPattern,
    MonthlyTotals,
    WeatherDistribution,
}

impl Visualization {
    pub const ALL: [Visualization; 3] = [
        Visualization::HourlyPattern,
        Visualization::MonthlyTotals,
        Visualization::WeatherDistribution,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Visualization::HourlyPattern => "Highest Rental in a Day",
            Visualization::MonthlyTotals => "Rental Count Per Month",
            Visualization::WeatherDistribution => "Rental Distribution Per Weather Condition",
        }
    }
}

/// One user interaction with a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Section(Section),
    Analysis(Analysis),
    Visualization(Visualization),
}

/// Current choice of every selector.
///
/// Each input yields a new snapshot through [`State::apply`]; [`render`] turns
/// a snapshot plus the loaded table into a [`Page`] without touching anything
/// else. The two dropdowns keep their own choice while the other section is
/// shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct State {
    pub section: Section,
    pub analysis: Analysis,
    pub visualization: Visualization,
}

impl State {
    pub fn apply(self, input: Input) -> State {
        match input {
            Input::Section(section) => State { section, ..self },
            Input::Analysis(analysis) => State { analysis, ..self },
            Input::Visualization(visualization) => State {
                visualization,
                ..self
            },
        }
    }
}

/// Inputs for picking `section` and, optionally, its 1-based dropdown `choice`.
///
/// # Errors
///
/// Returns `DashboardError::Command` when the choice is out of range or the
/// section has no dropdown.
pub fn select(section: Section, choice: Option<usize>) -> Result<Vec<Input>> {
    let mut inputs = vec![Input::Section(section)];
    let Some(choice) = choice else {
        return Ok(inputs);
    };

    let index = choice.checked_sub(1);
    let sub = match section {
        Section::Info => None,
        Section::Analysis => index
            .and_then(|i| Analysis::ALL.get(i))
            .map(|a| Input::Analysis(*a)),
        Section::Conclusion => index
            .and_then(|i| Visualization::ALL.get(i))
            .map(|v| Input::Visualization(*v)),
    };

    match sub {
        Some(input) => {
            inputs.push(input);
            Ok(inputs)
        }
        None => Err(DashboardError::Command(format!(
            "No choice {} in {}",
            choice,
            section.title()
        ))),
    }
}

/// What a page shows below its headers
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Text(String),
    Table {
        caption: Option<String>,
        table: ResultTable,
    },
    Chart {
        chart: ChartSpec,
        narrative: Option<&'static str>,
    },
    /// A render pass failed; the session carries on
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub header: &'static str,
    pub subheader: Option<&'static str>,
    pub view: View,
}

impl Page {
    /// Lays the page out as plain text; charts use bars of at most `bar_width`.
    pub fn to_text(&self, bar_width: usize) -> String {
        let mut out = format!("== {} ==\n", self.header);
        if let Some(sub) = self.subheader {
            out.push_str(&format!("-- {} --\n", sub));
        }
        out.push('\n');

        match &self.view {
            View::Text(text) => out.push_str(&format!("{}\n", text)),
            View::Table { caption, table } => {
                if let Some(caption) = caption {
                    out.push_str(&format!("{}\n\n", caption));
                }
                out.push_str(&table.to_string());
            }
            View::Chart { chart, narrative } => {
                out.push_str(&chart::render_text(chart, bar_width));
                if let Some(narrative) = narrative {
                    out.push_str(&format!("\n{}\n", narrative));
                }
            }
            View::Error(message) => out.push_str(&format!("Error: {}\n", message)),
        }
        out
    }
}

/// Renders the page for `state`. Lookup and value failures become an inline
/// error view instead of an `Err`.
pub fn render(state: &State, table: &Table, config: &DashboardConfig) -> Page {
    debug!("Rendering {:?}", state);
    let (subheader, result) = match state.section {
        Section::Info => (None, Ok(info_view(table))),
        Section::Analysis => (
            Some(state.analysis.title()),
            analysis_view(state.analysis, table, config),
        ),
        Section::Conclusion => (
            Some(state.visualization.title()),
            conclusion_view(state.visualization, table),
        ),
    };

    let view = result.unwrap_or_else(|e| {
        warn!("Render of {:?} failed: {}", state, e);
        View::Error(e.to_string())
    });

    Page {
        header: state.section.title(),
        subheader,
        view,
    }
}

fn info_view(table: &Table) -> View {
    View::Text(format!(
        "Total rows: {}\n{}\n\n{}",
        table.len(),
        content::COLUMNS,
        content::QUESTIONS
    ))
}

fn analysis_view(analysis: Analysis, table: &Table, config: &DashboardConfig) -> Result<View> {
    let view = match analysis {
        Analysis::MonthlyRevenue => {
            let rows = transform::monthly_revenue(table, config.unit_price)?;
            View::Table {
                caption: None,
                table: ResultTable::from(rows.as_slice()),
            }
        }
        Analysis::SeasonDistribution => View::Chart {
            chart: chart::season_chart(&transform::seasonal_distribution(table)?),
            narrative: None,
        },
        Analysis::WeekdayDistribution => View::Chart {
            chart: chart::weekday_chart(&transform::weekday_distribution(table)?),
            narrative: None,
        },
        Analysis::Rfm => {
            let sketch = transform::rfm_sketch(table)?;
            View::Table {
                caption: Some(format!(
                    "RFM Analysis (by date, no customer segmentation):\n\
                     Latest date: {}\nFrequency (mean rows per date): {:.2}",
                    sketch.max_date, sketch.frequency
                )),
                table: ResultTable::from(&sketch),
            }
        }
    };
    Ok(view)
}

fn conclusion_view(visualization: Visualization, table: &Table) -> Result<View> {
    let view = match visualization {
        Visualization::HourlyPattern => View::Chart {
            chart: chart::hourly_chart(&transform::hourly_average(table)?),
            narrative: Some(content::HOURLY_CONCLUSION),
        },
        Visualization::MonthlyTotals => View::Chart {
            chart: chart::monthly_totals_chart(&transform::monthly_totals(table)),
            narrative: Some(content::MONTHLY_CONCLUSION),
        },
        Visualization::WeatherDistribution => View::Chart {
            chart: chart::weather_chart(&transform::weather_distribution(table)?),
            narrative: Some(content::WEATHER_CONCLUSION),
        },
    };
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::OptionalColumns;
    use crate::transform::tests::record;

    fn daily_table() -> Table {
        Table::new(
            vec![record(1, 1, 10), record(2, 1, 20), record(1, 8, 30)],
            OptionalColumns::default(),
        )
    }

    #[test]
    fn initial_state_is_info() {
        let state = State::default();
        assert_eq!(state.section, Section::Info);
        assert_eq!(state.analysis, Analysis::MonthlyRevenue);
        assert_eq!(state.visualization, Visualization::HourlyPattern);
    }

    #[test]
    fn dropdowns_keep_their_choice_across_sections() {
        let state = State::default()
            .apply(Input::Section(Section::Analysis))
            .apply(Input::Analysis(Analysis::Rfm))
            .apply(Input::Section(Section::Conclusion))
            .apply(Input::Visualization(Visualization::WeatherDistribution))
            .apply(Input::Section(Section::Analysis));

        assert_eq!(state.section, Section::Analysis);
        assert_eq!(state.analysis, Analysis::Rfm);
        assert_eq!(state.visualization, Visualization::WeatherDistribution);
    }

    #[test]
    fn select_maps_one_based_choices() {
        assert_eq!(
            select(Section::Conclusion, Some(2)).unwrap(),
            vec![
                Input::Section(Section::Conclusion),
                Input::Visualization(Visualization::MonthlyTotals),
            ]
        );
        assert_eq!(
            select(Section::Info, None).unwrap(),
            vec![Input::Section(Section::Info)]
        );
        assert!(select(Section::Analysis, Some(0)).is_err());
        assert!(select(Section::Analysis, Some(5)).is_err());
        assert!(select(Section::Info, Some(1)).is_err());
    }

    #[test]
    fn info_page_counts_rows() {
        let page = render(&State::default(), &daily_table(), &DashboardConfig::default());
        assert_eq!(page.header, "Data Information");
        match page.view {
            View::Text(text) => assert!(text.starts_with("Total rows: 3")),
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn missing_column_renders_inline_error() {
        let state = State::default().apply(Input::Section(Section::Conclusion));
        let page = render(&state, &daily_table(), &DashboardConfig::default());
        assert_eq!(page.subheader, Some("Highest Rental in a Day"));
        match &page.view {
            View::Error(msg) => assert!(msg.contains("hr")),
            other => panic!("unexpected view {:?}", other),
        }
        assert!(page.to_text(20).contains("Error: Lookup Error"));
    }

    #[test]
    fn monthly_totals_page_has_chart_and_narrative() {
        let state = State {
            section: Section::Conclusion,
            visualization: Visualization::MonthlyTotals,
            ..State::default()
        };
        let page = render(&state, &daily_table(), &DashboardConfig::default());
        let text = page.to_text(10);
        assert!(text.contains("Number of Bike Sharing Borrowed Every Month"));
        assert!(text.contains("Peak: 30"));
        assert!(text.contains("August has the highest number"));
    }

    #[test]
    fn revenue_overflow_renders_inline_error() {
        let table = Table::new(
            vec![record(1, 1, 985)],
            OptionalColumns {
                hour: false,
                month_label: true,
            },
        );
        let config = DashboardConfig {
            unit_price: u64::MAX / 10,
            ..DashboardConfig::default()
        };
        let state = State::default().apply(Input::Section(Section::Analysis));
        let page = render(&state, &table, &config);
        match &page.view {
            View::Error(msg) => assert!(msg.starts_with("Value Error: Revenue for month 1")),
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn rendering_is_repeatable() {
        let table = daily_table();
        let config = DashboardConfig::default();
        let state = State {
            section: Section::Analysis,
            analysis: Analysis::Rfm,
            ..State::default()
        };
        assert_eq!(
            render(&state, &table, &config),
            render(&state, &table, &config)
        );
    }
}
