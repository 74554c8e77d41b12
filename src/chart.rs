use crate::structs::{CategoryCount, HourlyAverage, MonthlyTotal};
use crate::transform::peak_month;
use serde::Serialize;

/// Tick labels of the weather chart, applied by position to the codes present.
/// There are four labels for a three-code domain.
pub const WEATHER_TICK_LABELS: [&str; 4] = ["1. Bright", "2. Fog", "3. Drizzle", "4. Rain"];

/// Vertical offset of the peak annotation above its bar
const PEAK_LABEL_OFFSET: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    CountBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grid {
    None,
    Both,
    YAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub dashes: (u32, u32),
    pub markers: bool,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Position of the annotated point in `points`
    pub index: usize,
    pub y: f64,
    pub text: String,
    pub color: String,
}

/// A chart with its data and fixed styling, ready for a host widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub title_font_size: u32,
    pub x_label: String,
    pub y_label: String,
    /// Named colour, or palette name for count bars
    pub color: String,
    pub figure_size: (f64, f64),
    pub grid: Grid,
    pub x_tick_rotation: u32,
    pub line: Option<LineStyle>,
    pub points: Vec<ChartPoint>,
    pub annotation: Option<Annotation>,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: &str, x_label: &str, y_label: &str, color: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            title_font_size: 12,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            color: color.to_string(),
            figure_size: (10.0, 6.0),
            grid: Grid::None,
            x_tick_rotation: 0,
            line: None,
            points: Vec::new(),
            annotation: None,
        }
    }
}

/// Dashed line with markers of the mean rentals per hour.
pub fn hourly_chart(hours: &[HourlyAverage]) -> ChartSpec {
    let mut chart = ChartSpec::new(
        ChartKind::Line,
        "Average Pattern of Bike Sharing Bicycle Use in a Day",
        "Hour",
        "Average Loan Amount",
        "skyblue",
    );
    chart.title_font_size = 16;
    chart.figure_size = (12.0, 6.0);
    chart.grid = Grid::Both;
    chart.line = Some(LineStyle {
        dashes: (5, 2),
        markers: true,
        width: 2.0,
    });
    chart.points = hours
        .iter()
        .map(|h| ChartPoint {
            label: h.hour.to_string(),
            value: h.cnt,
        })
        .collect();
    chart
}

/// Bars of total rentals per month with the peak month annotated.
pub fn monthly_totals_chart(totals: &[MonthlyTotal]) -> ChartSpec {
    let mut chart = ChartSpec::new(
        ChartKind::Bar,
        "Number of Bike Sharing Borrowed Every Month",
        "Month",
        "Borrowing Amount",
        "green",
    );
    chart.grid = Grid::YAxis;
    chart.points = totals
        .iter()
        .map(|t| ChartPoint {
            label: t.month.to_string(),
            value: t.cnt as f64,
        })
        .collect();
    chart.annotation = peak_month(totals).and_then(|peak| {
        totals
            .iter()
            .position(|t| t.month == peak.month)
            .map(|index| Annotation {
                index,
                y: peak.cnt as f64 + PEAK_LABEL_OFFSET,
                text: format!("Peak: {}", peak.cnt),
                color: "red".to_string(),
            })
    });
    chart
}

/// Count bars per weather code, labelled positionally with the fixed tick labels.
pub fn weather_chart(weather: &[CategoryCount]) -> ChartSpec {
    let mut chart = ChartSpec::new(
        ChartKind::CountBar,
        "Distribution of Bike Sharing Use Based on Weather Conditions",
        "Weather",
        "Borrowing Amount",
        "viridis",
    );
    chart.x_tick_rotation = 45;
    chart.points = weather
        .iter()
        .enumerate()
        .map(|(i, w)| ChartPoint {
            label: WEATHER_TICK_LABELS
                .get(i)
                .map_or_else(|| w.code.to_string(), |l| l.to_string()),
            value: w.count as f64,
        })
        .collect();
    chart
}

pub fn season_chart(seasons: &[CategoryCount]) -> ChartSpec {
    category_chart("Bike Rental Distribution Per Season", "season", "instant", seasons)
}

pub fn weekday_chart(weekdays: &[CategoryCount]) -> ChartSpec {
    category_chart("Bike Rental Distribution Per Weekday", "weekday", "cnt", weekdays)
}

fn category_chart(title: &str, x_label: &str, y_label: &str, rows: &[CategoryCount]) -> ChartSpec {
    let mut chart = ChartSpec::new(ChartKind::Bar, title, x_label, y_label, "steelblue");
    chart.points = rows
        .iter()
        .map(|r| ChartPoint {
            label: r.label.clone(),
            value: r.count as f64,
        })
        .collect();
    chart
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Draws a chart as horizontal text bars, one line per point.
///
/// The longest bar is `width` characters. Lines draw as dashes ending in a
/// marker; bars draw as `#`.
pub fn render_text(chart: &ChartSpec, width: usize) -> String {
    let mut out = format!("{}\n{} by {}\n", chart.title, chart.y_label, chart.x_label);
    if chart.points.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let label_width = chart
        .points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);
    let max = chart
        .points
        .iter()
        .map(|p| p.value)
        .fold(0.0_f64, f64::max);

    for (i, point) in chart.points.iter().enumerate() {
        let len = if max > 0.0 {
            ((point.value / max) * width as f64).round() as usize
        } else {
            0
        };
        let bar = match &chart.line {
            Some(style) => {
                let dashes: String = (0..len.saturating_sub(1))
                    .map(|j| if j % 2 == 0 { '-' } else { ' ' })
                    .collect();
                if style.markers {
                    format!("{}o", dashes)
                } else {
                    dashes
                }
            }
            None => "#".repeat(len),
        };
        out.push_str(&format!(
            "{:>lw$} | {} {}",
            point.label,
            bar,
            format_value(point.value),
            lw = label_width
        ));
        if let Some(note) = chart.annotation.as_ref().filter(|a| a.index == i) {
            out.push_str(&format!("  <- {}", note.text));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(codes: &[(u8, u64)]) -> Vec<CategoryCount> {
        codes
            .iter()
            .map(|(code, count)| CategoryCount {
                code: *code,
                label: code.to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn monthly_chart_annotates_peak() {
        let totals = vec![
            MonthlyTotal { month: 1, cnt: 100 },
            MonthlyTotal { month: 8, cnt: 702388 },
            MonthlyTotal { month: 9, cnt: 5000 },
        ];
        let chart = monthly_totals_chart(&totals);
        let note = chart.annotation.unwrap();
        assert_eq!(note.index, 1);
        assert_eq!(note.text, "Peak: 702388");
        assert_eq!(note.y, 703388.0);
        assert_eq!(chart.grid, Grid::YAxis);
    }

    #[test]
    fn weather_labels_are_positional() {
        let chart = weather_chart(&weather(&[(1, 463), (2, 247), (3, 21)]));
        let labels: Vec<&str> = chart.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["1. Bright", "2. Fog", "3. Drizzle"]);
        assert_eq!(chart.x_tick_rotation, 45);

        // A missing code shifts the labels, as the positional ticks always have.
        let chart = weather_chart(&weather(&[(1, 5), (3, 2)]));
        assert_eq!(chart.points[1].label, "2. Fog");
    }

    #[test]
    fn hourly_chart_is_dashed_with_markers() {
        let chart = hourly_chart(&[HourlyAverage { hour: 4, cnt: 6.35 }]);
        assert_eq!(chart.kind, ChartKind::Line);
        let style = chart.line.as_ref().unwrap();
        assert_eq!(style.dashes, (5, 2));
        assert!(style.markers);
        assert_eq!(chart.figure_size, (12.0, 6.0));
    }

    #[test]
    fn text_render_scales_to_width() {
        let chart = season_chart(&[
            CategoryCount {
                code: 1,
                label: "Spring".to_string(),
                count: 10,
            },
            CategoryCount {
                code: 2,
                label: "Fall".to_string(),
                count: 5,
            },
        ]);
        let text = render_text(&chart, 10);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Bike Rental Distribution Per Season");
        assert_eq!(lines[2], "Spring | ########## 10");
        assert_eq!(lines[3], "  Fall | ##### 5");
    }

    #[test]
    fn text_render_marks_annotation_and_empty_charts() {
        let chart = monthly_totals_chart(&[MonthlyTotal { month: 8, cnt: 4 }]);
        let text = render_text(&chart, 4);
        assert!(text.contains("8 | #### 4  <- Peak: 4"));

        let empty = monthly_totals_chart(&[]);
        assert!(render_text(&empty, 4).contains("(no data)"));
    }

    #[test]
    fn chart_spec_serializes_kind_in_snake_case() {
        let chart = weather_chart(&weather(&[(1, 1)]));
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["kind"], "count_bar");
        assert_eq!(json["points"][0]["label"], "1. Bright");
    }
}
