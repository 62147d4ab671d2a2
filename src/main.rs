// Entry point and high-level CLI flow.
//
// - With a subcommand, the binary loads the CSV, builds one chart and
//   prints it (markdown preview, CSV or JSON).
// - Without one, an interactive menu lets the user load the file once and
//   browse every chart, changing selections as they go.
use clap::{Parser, Subcommand, ValueEnum};
use energy_dashboard::charts::{self, ChartData, ChartRequest, Selection};
use energy_dashboard::error::{ChartKind, DashboardError, Outcome};
use energy_dashboard::loader::{DatasetCache, LoadOptions};
use energy_dashboard::source::EnergySource;
use energy_dashboard::types::Dataset;
use energy_dashboard::{output, util};
use log::{error, info};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex, MutexGuard};
use tabled::Tabled;

// Datasets stay loaded for the whole run so charts can be rebuilt on
// every selection change without re-reading the CSV.
static CACHE: Lazy<Mutex<DatasetCache>> = Lazy::new(|| Mutex::new(DatasetCache::default()));

fn cache() -> MutexGuard<'static, DatasetCache> {
    CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Parser)]
#[command(
    name = "energy_dashboard",
    version,
    about = "Chart data for annual renewable-energy production by region and department"
)]
struct Args {
    /// Semicolon-delimited Enedis export.
    #[arg(long, default_value = "departement.csv")]
    source: PathBuf,

    /// Skip rows before this year.
    #[arg(long)]
    from_year: Option<i32>,

    /// Skip rows after this year.
    #[arg(long)]
    to_year: Option<i32>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write the output to this file instead of stdout (a full markdown
    /// table for the default format).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Rows shown in table previews.
    #[arg(long, default_value_t = 20)]
    rows: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Load the file and print load diagnostics.
    Load,
    /// Yearly totals per region for one source.
    TimeSeries {
        #[arg(long, default_value = "photovoltaic")]
        energy: String,
    },
    /// Per-department totals of every source.
    Stacked,
    /// Per-year raw values for one source, summarized as box plots.
    Distribution {
        #[arg(long, default_value = "photovoltaic")]
        energy: String,
    },
    /// Share of each source in one year.
    Proportion {
        #[arg(long, default_value_t = charts::DEFAULT_PROPORTION_YEAR)]
        year: i32,
    },
    /// Region to source flows.
    Flow,
    /// Region and department tree for one source.
    Hierarchy {
        #[arg(long, default_value = "photovoltaic")]
        energy: String,
        /// Region name, or "all".
        #[arg(long, default_value = "all")]
        region: String,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Department profile for one source, as a closed polygon.
    Radial {
        #[arg(long, default_value = "photovoltaic")]
        energy: String,
    },
}

impl Command {
    fn chart(&self) -> Option<(ChartKind, Selection)> {
        let energy = |e: &String| Selection { energy: Some(e.clone()), ..Selection::default() };
        match self {
            Command::Load => None,
            Command::TimeSeries { energy: e } => Some((ChartKind::TimeSeries, energy(e))),
            Command::Stacked => Some((ChartKind::StackedTotals, Selection::default())),
            Command::Distribution { energy: e } => Some((ChartKind::Distribution, energy(e))),
            Command::Proportion { year } => Some((
                ChartKind::Proportion,
                Selection { year: Some(*year), ..Selection::default() },
            )),
            Command::Flow => Some((ChartKind::FlowGraph, Selection::default())),
            Command::Hierarchy { energy: e, region, year } => Some((
                ChartKind::Hierarchy,
                Selection { energy: Some(e.clone()), year: *year, region: Some(region.clone()) },
            )),
            Command::Radial { energy: e } => Some((ChartKind::RadialSeries, energy(e))),
        }
    }
}

fn load_options(args: &Args) -> LoadOptions {
    let defaults = LoadOptions::default();
    let from = args.from_year.unwrap_or(*defaults.year_range.start());
    let to = args.to_year.unwrap_or(*defaults.year_range.end());
    LoadOptions { year_range: from..=to }
}

/// Load (or reuse) the dataset and print a short summary of the load.
/// Nothing is printed when `quiet`, so CSV/JSON on stdout stays clean.
fn load(path: &Path, quiet: bool) -> Result<Arc<Dataset>, DashboardError> {
    let mut cache = cache();
    let fresh = !cache.contains(path);
    let dataset = cache.get_or_load(path)?;
    if fresh && !quiet {
        if let Some(report) = cache.report(path) {
            println!(
                "Processing dataset... ({} rows read, {} records loaded)",
                util::format_int(report.total_rows),
                util::format_int(report.loaded_rows)
            );
            if report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped due to parse/validation errors.",
                    util::format_int(report.skipped_rows)
                );
            }
            if report.imputed_zeros > 0 {
                println!(
                    "Info: {} blank production cells counted as zero.",
                    util::format_int(report.imputed_zeros)
                );
            }
        }
        println!(
            "{} regions, {} departments, years {:?}\n",
            dataset.regions().len(),
            dataset.departments().len(),
            dataset.years()
        );
    }
    Ok(dataset)
}

struct Render<'a> {
    format: OutputFormat,
    output: Option<&'a Path>,
    rows: usize,
}

impl Render<'_> {
    fn rows<T: Tabled + Serialize + Clone>(&self, title: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
        match (self.format, self.output) {
            (OutputFormat::Csv, Some(path)) => {
                output::write_csv(path, rows)?;
                println!("(Full table exported to {})", path.display());
            }
            (OutputFormat::Csv, None) => output::write_csv_to(io::stdout().lock(), rows)?,
            (_, Some(path)) => {
                output::write_table(path, title, rows)?;
                println!("(Full table exported to {})", path.display());
            }
            _ => output::preview_table(title, None, rows, self.rows),
        }
        Ok(())
    }

    fn chart(&self, outcome: &Outcome<ChartData>) -> Result<(), Box<dyn Error>> {
        if let Some(w) = &outcome.warning {
            eprintln!("Warning: {}", w);
        }
        if self.format == OutputFormat::Json {
            match self.output {
                Some(path) => {
                    output::write_json(path, outcome)?;
                    println!("(Chart data exported to {})", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(outcome)?),
            }
            return Ok(());
        }
        match &outcome.data {
            ChartData::TimeSeries(c) => {
                self.rows(&format!("Total {} Production by Region Over Time", c.source), &c.preview_rows())
            }
            ChartData::StackedTotals(c) => {
                self.rows("Distribution of Energy Sources by Department", &c.preview_rows())
            }
            ChartData::Distribution(c) => {
                self.rows(&format!("{} Production Distribution by Year", c.source), &c.preview_rows())
            }
            ChartData::Proportion(c) => {
                self.rows(&format!("Proportion of Energy Sources in {}", c.year), &c.preview_rows())
            }
            ChartData::FlowGraph(c) => self.rows("Energy Flow from Regions to Sources", &c.preview_rows()),
            ChartData::Hierarchy(c) => self.rows(
                &format!("{} Production by Region and Department ({})", c.source, c.filter.region),
                &c.preview_rows(),
            ),
            ChartData::RadialSeries(c) => {
                self.rows(&format!("{} Production by Department", c.source), &c.preview_rows())
            }
        }
    }
}

fn run_command(args: &Args, command: &Command) -> Result<(), Box<dyn Error>> {
    let quiet = args.format != OutputFormat::Table && args.output.is_none();
    let dataset = load(&args.source, quiet && !matches!(command, Command::Load))?;
    let Some((kind, selection)) = command.chart() else {
        return Ok(());
    };
    let request = ChartRequest::from_selection(kind, &selection)?;
    info!("Building {} chart", kind);
    let outcome = charts::build(&dataset, &request);
    let render = Render { format: args.format, output: args.output.as_deref(), rows: args.rows };
    render.chart(&outcome)
}

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn prompt_energy() -> Option<String> {
    let ids: Vec<&str> = EnergySource::ALL.iter().map(|s| s.id()).collect();
    let answer = read_line(&format!("Energy source ({}) [photovoltaic]: ", ids.join("/")));
    (!answer.is_empty()).then_some(answer)
}

fn prompt_year(label: &str) -> Option<i32> {
    loop {
        let answer = read_line(label);
        if answer.is_empty() {
            return None;
        }
        match answer.parse() {
            Ok(y) => return Some(y),
            Err(_) => println!("Invalid year. Please enter a number like 2020."),
        }
    }
}

fn prompt_selection(kind: ChartKind, dataset: &Dataset) -> Selection {
    let mut selection = Selection::default();
    match kind {
        ChartKind::TimeSeries | ChartKind::Distribution | ChartKind::RadialSeries => {
            selection.energy = prompt_energy();
        }
        ChartKind::Proportion => {
            selection.year = prompt_year(&format!(
                "Year [{}]: ",
                charts::DEFAULT_PROPORTION_YEAR
            ));
        }
        ChartKind::Hierarchy => {
            selection.energy = prompt_energy();
            println!("Regions: {}", dataset.regions().join(", "));
            let region = read_line("Region [all]: ");
            selection.region = (!region.is_empty()).then_some(region);
            selection.year = prompt_year("Year [all years]: ");
        }
        ChartKind::StackedTotals | ChartKind::FlowGraph => {}
    }
    selection
}

fn handle_chart(args: &Args, kind: ChartKind) {
    if !cache().contains(&args.source) {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    }
    let dataset = match load(&args.source, false) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    let selection = prompt_selection(kind, &dataset);
    let request = match ChartRequest::from_selection(kind, &selection) {
        Ok(r) => r,
        Err(e) => {
            println!("Error: {}\n", e);
            return;
        }
    };
    let outcome = charts::build(&dataset, &request);
    let render = Render { format: args.format, output: args.output.as_deref(), rows: args.rows };
    if let Err(e) = render.chart(&outcome) {
        eprintln!("Write error: {}", e);
    }
}

fn interactive(args: &Args) {
    static MENU: [(&str, Option<ChartKind>); 8] = [
        ("Load the file", None),
        ("Time series by region", Some(ChartKind::TimeSeries)),
        ("Stacked totals by department", Some(ChartKind::StackedTotals)),
        ("Distribution by year", Some(ChartKind::Distribution)),
        ("Proportion of sources in a year", Some(ChartKind::Proportion)),
        ("Energy flow from regions to sources", Some(ChartKind::FlowGraph)),
        ("Hierarchy by region and department", Some(ChartKind::Hierarchy)),
        ("Radial profile by department", Some(ChartKind::RadialSeries)),
    ];
    loop {
        println!("Select an option:");
        for (i, (label, _)) in MENU.iter().enumerate() {
            println!("[{}] {}", i + 1, label);
        }
        println!("[0] Exit\n");
        let choice = read_line("Enter choice: ");
        if choice == "0" {
            println!("Exiting the program.");
            break;
        }
        match choice.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| MENU.get(i)) {
            Some((_, None)) => {
                if cache().invalidate(&args.source) {
                    info!("Reloading {}", args.source.display());
                }
                if let Err(e) = load(&args.source, false) {
                    eprintln!("Failed to load file: {}\n", e);
                }
            }
            Some((_, Some(kind))) => handle_chart(args, *kind),
            None => println!("Invalid choice. Please enter a number from 0 to {}.\n", MENU.len()),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    cache().set_options(load_options(&args));

    match &args.command {
        Some(command) => match run_command(&args, command) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{}", e);
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        None => {
            interactive(&args);
            ExitCode::SUCCESS
        }
    }
}
