use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use dutasteride_sim::config::Config;
use dutasteride_sim::dosing::Schedule;
use dutasteride_sim::output::{self, RunReport};
use dutasteride_sim::simulation::Simulator;

const SCHEDULE_HELP: &str = "Enter a dosing schedule. Dosing schedule format examples:

\t1)  [0.5, 1d] x 90d = 0.5 mg daily for 90 days.
\t2)  [1, 2d] x 2mo = 1 mg every other day for 2 months.
\t3)  [0.5, 3d, 1, 2d] x 16w = 0.5 mg, wait 3 days, 1 mg, wait 2 days, repeat for 16 weeks.
\t4)  [2.5, 1w] x 0.5y, [0.5, 1d] x 0.5y = 2.5 mg per week for half a year, then 0.5 mg per day for half a year.
\t5)  [0.5, MWF] x 45d = 0.5 mg on Monday Wednesday Friday for 45 days.
\t6)  [1, SaSuTuTh] x 6mo = 1 mg on Saturday Sunday Tuesday Thursday for 6 months.
\t7)  [0.5, 1d] x 1mo, [1, 1d] x 1mo, [1.5, 1d] x 1mo, [2, 1d] x 1mo = Increasing daily dose by 0.5 mg each month.

Make sure to specify time units; default unit is days.
Enter 'q' to quit.
";

#[derive(Parser)]
#[command(name = "dutasteride_sim")]
#[command(about = "Dutasteride serum and scalp DHT suppression simulator")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dosing schedule to run; prompts interactively when omitted
    #[arg(short, long)]
    schedule: Option<String>,

    /// Output directory for CSV/JSON results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Integration step in hours
    #[arg(long)]
    dt: Option<f64>,

    /// Sampling resolution in hours
    #[arg(long)]
    resolution: Option<f64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::from_file(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };
    if let Some(dt) = cli.dt {
        config.simulation.step_hours = dt;
    }
    if let Some(resolution) = cli.resolution {
        config.simulation.resolution_hours = resolution;
    }
    config.validate()?;

    let simulator = Simulator::new(config.simulation.clone())?;

    match cli.schedule.as_deref().or(config.schedule.as_deref()) {
        Some(text) => {
            let mut schedule = Schedule::parse(text)
                .with_context(|| format!("Invalid dosing schedule '{}'", text))?;
            run_schedule(&simulator, &config, text, &mut schedule, cli.output.as_deref())
        }
        None => interactive(&simulator, &config, cli.output.as_deref()),
    }
}

fn interactive(simulator: &Simulator, config: &Config, output_dir: Option<&Path>) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut runs = 0usize;

    loop {
        println!("{}", SCHEDULE_HELP);
        print!("Your dosing schedule: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.split_whitespace().collect::<String>().to_lowercase() == "q" {
            break;
        }

        let mut schedule = match Schedule::parse(&line) {
            Ok(schedule) => schedule,
            Err(e) => {
                println!("{}", e);
                println!("Not valid dosing schedule syntax. Press enter to try again.");
                if lines.next().is_none() {
                    break;
                }
                println!();
                continue;
            }
        };

        runs += 1;
        let run_dir = output_dir.map(|dir| dir.join(format!("run_{:03}", runs)));
        if let Err(e) = run_schedule(simulator, config, &line, &mut schedule, run_dir.as_deref()) {
            warn!("Run {} failed: {:#}", runs, e);
        }
        println!();
    }

    Ok(())
}

fn run_schedule(
    simulator: &Simulator,
    config: &Config,
    text: &str,
    schedule: &mut Schedule,
    output_dir: Option<&Path>,
) -> Result<()> {
    let data = simulator.run(schedule);
    let report = RunReport::new(text, schedule.to_string(), simulator.config(), &data);

    println!("{}", output::format_summary(&report.summary));

    if let Some(dir) = output_dir {
        output::save_results(&data, &report, dir, config.output.write_report)
            .with_context(|| format!("Failed to write results to {:?}", dir))?;
        println!("Results saved to {:?}", dir);
    }

    Ok(())
}
