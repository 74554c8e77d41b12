use clap::Parser;
use lib::{
    DashboardConfig, DashboardError, Section, SimpleLogger, State, export_results, navigation,
    read_table, render, run_session,
};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV or Parquet file with the bike sharing table
    #[arg(short, long, env = "BIKESHARE_DATA", default_value = "all_data.csv")]
    input_file: PathBuf,

    /// Render a single section and exit instead of starting a session
    #[arg(short, long)]
    section: Option<Section>,

    /// 1-based dropdown choice within --section
    #[arg(short, long, requires = "section")]
    choice: Option<usize>,

    /// Export every analysis to ./output/<NAME>/ (csv, json, parquet) and exit
    #[arg(short, long, value_name = "NAME")]
    output: Option<String>,

    /// Price per rental used for monthly revenue
    #[arg(long, default_value_t = 3)]
    unit_price: u64,

    /// Width of the longest bar in text charts
    #[arg(long, default_value_t = 50)]
    bar_width: usize,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), DashboardError> {
    let total_start = Instant::now();
    log::set_logger(&LOGGER).map_err(|e| DashboardError::Logger(e.to_string()))?;

    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    let config = DashboardConfig {
        unit_price: args.unit_price,
        bar_width: args.bar_width,
    };
    debug!(
        "Input file: {} | Unit price: {} | Bar width: {}",
        args.input_file.display(),
        config.unit_price,
        config.bar_width
    );

    // A load failure ends the process here; everything after it is per-render
    let load_start = Instant::now();
    let table = read_table(&args.input_file)?;
    if table.is_empty() {
        warn!("{} has no rows", args.input_file.display());
    }
    debug!(
        "Loaded {} rows in {:.2?}",
        table.len(),
        load_start.elapsed()
    );

    if let Some(name) = &args.output {
        let output_name = name.split(['/', '\\']).next_back().unwrap_or(name);
        let output_dir = PathBuf::from(format!("./output/{}", output_name));
        fs::create_dir_all(&output_dir)?;
        println!("Writing output files to {}", output_dir.display());

        let io_start = Instant::now();
        let written = export_results(&table, &config, &output_dir, output_name)?;
        for path in &written {
            debug!("  - {}", path.display());
        }
        println!(
            "Wrote {} files in {:.2?}",
            written.len(),
            io_start.elapsed()
        );
        debug!("Total runtime: {:.2?}", total_start.elapsed());
        return Ok(());
    }

    if let Some(section) = args.section {
        let state = navigation::select(section, args.choice)?
            .into_iter()
            .fold(State::default(), State::apply);
        let page = render(&state, &table, &config);
        println!("{}", page.to_text(config.bar_width));
        return Ok(());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let state = run_session(stdin.lock(), &mut stdout, &table, &config)?;
    debug!(
        "Session closed on {:?} after {:.2?}",
        state.section,
        total_start.elapsed()
    );
    Ok(())
}
