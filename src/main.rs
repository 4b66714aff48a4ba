use clap::Parser;
use suivi_tools::io::export;
use suivi_tools::pipeline::{self, ExtractConfig, RunSummary};
use suivi_tools::{Result, ToolError, analytics};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(&cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    init_logging()?;
    let summary = pipeline::run(&ExtractConfig::default())?;
    print_summary(&summary);
    if cli.stats {
        let overview = analytics::overview(&summary.dataset);
        println!("{}", export::overview_to_json(&overview)?);
    }
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn print_summary(summary: &RunSummary) {
    println!("Fichier source: {}", summary.workbook.display());
    println!("Lignes générées: {}", summary.record_count);
    println!(
        "Sortie: {} + {} + {}",
        summary.outputs.records_csv.display(),
        summary.outputs.records_json.display(),
        summary.outputs.people_json.display()
    );
}

/// Extracts the fitness-tracking workbook found in the current directory into
/// `data/clean_data.csv`, `data/clean_data.json` and `data/people_meta.json`.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Normalise a per-person fitness-tracking workbook into clean CSV and JSON."
)]
struct Cli {
    /// Also print progression statistics as JSON after the summary.
    #[arg(long)]
    stats: bool,
}
