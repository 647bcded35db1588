use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lineage::{
    engine::{EngineBuilder, EngineSettings},
    menu::Menu,
    scenario::ScenarioLoader,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Synthesizes a family tree from demographic tables")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/default.yaml")]
    scenario: PathBuf,

    /// Fix the random seed (overrides the scenario)
    #[arg(long)]
    seed: Option<u64>,

    /// Birth year of the founding couple
    #[arg(long)]
    start_year: Option<i32>,

    /// Stop expanding once a processed person is born after this year
    #[arg(long)]
    end_year: Option<i32>,

    /// Directory holding the demographic CSV tables
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    init_logging(&scenario.logging.level);

    let data_dir = scenario.data_dir(cli.data_dir);
    let tables = scenario.load_tables(&data_dir)?;
    let (start_year, end_year) = scenario.years(cli.start_year, cli.end_year);
    let settings = EngineSettings {
        seed: scenario.seed(cli.seed),
        start_year,
        end_year,
        ..scenario.engine_settings()
    };

    let tree = EngineBuilder::new(settings, &tables).build().run();
    println!(
        "Scenario '{}' generated {} people (seed {}).",
        scenario.name,
        tree.population().len(),
        tree.seed()
    );

    let stdin = io::stdin();
    Menu::new(&tree, &scenario.report)
        .run(stdin.lock(), io::stdout())
        .context("menu session failed")?;
    Ok(())
}
