use chaosim::{ScenarioConfig, Scenario};
use chaosim::{run_2d, run_3d};
use chaosim::{bench_live_step, bench_precompute, bench_trail};
use chaosim::{hilbert_curve, recaman_arcs, recaman_sequence};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive viewer for a scenario
    View {
        #[arg(short, default_value = "double_pendulum.yaml")]
        file_name: String,
    },
    /// Run a scenario headless to t_end and print CSV
    Run {
        #[arg(short, default_value = "double_pendulum.yaml")]
        file_name: String,
    },
    /// Print Hilbert curve vertices as CSV
    Hilbert {
        #[arg(long, default_value_t = 4)]
        order: u32,
    },
    /// Print the Recamán sequence and its arcs as CSV
    Recaman {
        #[arg(long, default_value_t = 100)]
        n: usize,
    },
    /// Time the integration strategies
    Bench,
}

fn scenario_path(file_name: &str) -> PathBuf {
    let given = PathBuf::from(file_name);
    if given.exists() {
        return given;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<Scenario> {
    let config_path = scenario_path(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    info!("loaded scenario {}", config_path.display());
    Scenario::build_scenario(scenario_cfg).context("invalid scenario")
}

fn run_headless(mut scenario: Scenario) -> Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    writeln!(out, "t,system,x,y,z,energy")?;

    let mut write_err = None;
    scenario.run_headless(|i, sim| {
        if write_err.is_some() {
            return;
        }
        let p = sim.position();
        let energy = sim.energy().map(|e| e.to_string()).unwrap_or_default();
        if let Err(err) = writeln!(out, "{},{},{},{},{},{}", sim.time(), i, p.x, p.y, p.z, energy) {
            write_err = Some(err);
        }
    })?;

    if let Some(err) = write_err {
        return Err(err.into());
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::View { file_name } => {
            let scenario = load_scenario_from_yaml(&file_name)?;
            if scenario.needs_3d() {
                run_3d(scenario);
            } else {
                run_2d(scenario);
            }
        }
        Command::Run { file_name } => {
            let scenario = load_scenario_from_yaml(&file_name)?;
            run_headless(scenario)?;
        }
        Command::Hilbert { order } => {
            let mut out = BufWriter::new(io::stdout().lock());
            writeln!(out, "index,x,y")?;
            for (i, p) in hilbert_curve(order)?.iter().enumerate() {
                writeln!(out, "{},{},{}", i, p.x, p.y)?;
            }
            out.flush()?;
        }
        Command::Recaman { n } => {
            let mut out = BufWriter::new(io::stdout().lock());
            writeln!(out, "n,term,arc_start,arc_end,upper")?;
            let terms = recaman_sequence(n);
            let arcs = recaman_arcs(n);
            for (i, term) in terms.iter().enumerate() {
                match i.checked_sub(1).and_then(|j| arcs.get(j)) {
                    Some(arc) => writeln!(out, "{},{},{},{},{}", i, term, arc.start, arc.end, arc.upper)?,
                    None => writeln!(out, "{},{},,,", i, term)?,
                }
            }
            out.flush()?;
        }
        Command::Bench => {
            bench_live_step()?;
            bench_precompute()?;
            bench_trail()?;
        }
    }

    Ok(())
}
