use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jugglefest::config::{DEFAULT_INPUT, DEFAULT_REPORT_CIRCUIT};
use jugglefest::{name_number_sum, Engine, RunConfig};

#[derive(Parser)]
#[command(
    name = "jugglefest",
    about = "Assign jugglers to circuits with a stable, capacity-bounded matching",
    version
)]
struct Cli {
    /// Input record file
    #[arg(default_value = DEFAULT_INPUT, env = "JUGGLEFEST_INPUT")]
    input: PathBuf,

    /// Roster output file [default: <input name>_solution.txt]
    output: Option<PathBuf>,

    /// Circuit whose members are summarised after the run
    #[arg(long, default_value = DEFAULT_REPORT_CIRCUIT)]
    report: String,

    /// Also write a flat CSV of every assignment
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = RunConfig {
        input: cli.input,
        output: cli.output,
        csv: cli.csv,
        report: Some(cli.report),
    };

    let engine = match Engine::run(&config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(circuit) = &config.report {
        let members = engine.team_members(circuit);
        if !members.is_empty() {
            println!("Team {circuit} : {} ", members.join(" "));
            println!("Sum of names is {}", name_number_sum(members.iter().copied()));
        }
    }

    ExitCode::SUCCESS
}
