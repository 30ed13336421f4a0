use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing_subscriber::EnvFilter;

use cinema_hall::{
    auditorium::Auditorium, config::HallConfig, scenario::Scenario, terminal::TerminalHall,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const RUN_USAGE: &str = "cinema-hall run [--seed <n>] [--config <config.json>]";
const SIMULATE_USAGE: &str = "cinema-hall simulate <scenario.json>";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("run") => {
            let mut seed = None;
            let mut config_path = None;
            while let Some(flag) = args.next() {
                match flag.as_str() {
                    "--seed" => {
                        let raw = args.next().context(RUN_USAGE)?;
                        seed = Some(
                            raw.parse::<u64>()
                                .with_context(|| format!("Invalid seed {raw:?}"))?,
                        );
                    }
                    "--config" => {
                        config_path = Some(PathBuf::from(args.next().context(RUN_USAGE)?));
                    }
                    other => bail!("Unknown option {other:?}\n\nUsage:\n  {RUN_USAGE}"),
                }
            }
            interactive(seed, config_path.as_deref())
        }
        Some("simulate") => {
            let path = args.next().context(SIMULATE_USAGE)?;
            simulate(Path::new(&path))
        }
        _ => bail!(
            "cinema-hall — interactive cinema auditorium\n\n\
             Usage:\n  {RUN_USAGE}\n  {SIMULATE_USAGE}"
        ),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn interactive(seed: Option<u64>, config_path: Option<&Path>) -> Result<()> {
    // The config decides where logs go; its own warnings go to stderr while
    // the terminal is still in normal mode.
    let stderr_logger = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(stderr_logger, || HallConfig::load(config_path));

    let log = File::create(&config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(log))
        .init();

    let rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    tracing::info!(?seed, fps = config.target_fps, "cinema hall opening");

    let hall = Auditorium::new(Box::new(rng));
    TerminalHall::new(hall, config).run()
}

fn simulate(path: &Path) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();

    let scenario = Scenario::load(path)?;
    let report = scenario.run();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.completed {
        bail!("Scenario did not finish within {} ticks", scenario.max_ticks);
    }
    Ok(())
}
