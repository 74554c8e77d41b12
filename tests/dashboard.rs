use lib::{
    DashboardConfig, DashboardError, Section, State, View, export_results, hourly_average,
    monthly_revenue, navigation, read_table, render, run_session, seasonal_distribution,
};
use std::fs;
use std::path::{Path, PathBuf};

const HEADER: &str = "instant,dteday,season,yr,mnth,hr,month,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt";

/// Hourly rows for two days in January and one in August
fn fixture(dir: &Path) -> PathBuf {
    let mut csv = format!("{}\n", HEADER);
    let days = [("2011-01-01", 1, 1, 6), ("2011-01-02", 1, 1, 0), ("2011-08-01", 3, 8, 1)];
    let mut instant = 1;
    for (date, season, mnth, weekday) in days {
        for hr in 0..24u64 {
            let cnt = if hr == 17 { 500 } else { hr + mnth * 10 };
            let weather = 1 + hr % 3;
            csv.push_str(&format!(
                "{},{},{},0,{},{},{},0,{},1,{},0.3,0.3,0.5,0.2,{},{},{}\n",
                instant,
                date,
                season,
                mnth,
                hr,
                mnth,
                weekday,
                weather,
                cnt / 2,
                cnt - cnt / 2,
                cnt
            ));
            instant += 1;
        }
    }
    let path = dir.join("all_data.csv");
    fs::write(&path, csv).unwrap();
    path
}

#[test]
fn loads_and_aggregates_hourly_table() {
    let dir = tempfile::tempdir().unwrap();
    let table = read_table(&fixture(dir.path())).unwrap();
    assert_eq!(table.len(), 72);

    let hours = hourly_average(&table).unwrap();
    assert_eq!(hours.len(), 24);
    let peak = hours
        .iter()
        .max_by(|a, b| a.cnt.total_cmp(&b.cnt))
        .unwrap();
    assert_eq!(peak.hour, 17);

    let total: u64 = table.records().iter().map(|r| r.cnt).sum();
    let revenue = monthly_revenue(&table, 3).unwrap();
    assert_eq!(revenue.iter().map(|r| r.revenue).sum::<u64>(), 3 * total);

    let seasons = seasonal_distribution(&table).unwrap();
    assert_eq!(
        seasons.iter().map(|s| s.count).sum::<u64>(),
        table.len() as u64
    );
}

#[test]
fn one_shot_render_of_weather_chart() {
    let dir = tempfile::tempdir().unwrap();
    let table = read_table(&fixture(dir.path())).unwrap();
    let state = navigation::select(Section::Conclusion, Some(3))
        .unwrap()
        .into_iter()
        .fold(State::default(), State::apply);

    let page = render(&state, &table, &DashboardConfig::default());
    match &page.view {
        View::Chart { chart, narrative } => {
            assert_eq!(chart.points.len(), 3);
            assert_eq!(chart.points[0].value, 24.0);
            assert!(narrative.is_some());
        }
        other => panic!("unexpected view {:?}", other),
    }
}

#[test]
fn scripted_session_walks_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let table = read_table(&fixture(dir.path())).unwrap();
    let script = "analysis 1\nanalysis 2\nanalysis 3\nanalysis 4\nconclusion 1\nconclusion 2\nconclusion 3\ninfo\n";
    let mut output = Vec::new();

    let state = run_session(
        script.as_bytes(),
        &mut output,
        &table,
        &DashboardConfig::default(),
    )
    .unwrap();
    assert_eq!(state.section, Section::Info);

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Total rows: 72"));
    assert!(text.contains("revenue"));
    assert!(text.contains("Fall"));
    assert!(text.contains("Sunday"));
    assert!(text.contains("Latest date: 2011-08-01"));
    assert!(text.contains("Average Pattern of Bike Sharing Bicycle Use in a Day"));
    assert!(text.contains("Peak:"));
    assert!(text.contains("1. Bright"));
    assert!(!text.contains("Error:"));
}

#[test]
fn export_writes_every_result() {
    let dir = tempfile::tempdir().unwrap();
    let table = read_table(&fixture(dir.path())).unwrap();
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();

    let written = export_results(&table, &DashboardConfig::default(), &out, "run").unwrap();
    // seven analyses with three files each, plus the chart specs
    assert_eq!(written.len(), 22);
    assert!(written.iter().all(|p| p.exists()));

    let csv = fs::read_to_string(out.join("run_monthly_totals.csv")).unwrap();
    assert!(csv.starts_with("mnth,cnt\n1,"));

    let charts: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("run_charts.json")).unwrap()).unwrap();
    assert_eq!(charts.as_array().unwrap().len(), 5);
}

#[test]
fn missing_file_aborts_with_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_table(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, DashboardError::Load(_)));
}
