use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use singularity_sim::config::SingularityConfig;
use singularity_sim::market::{FixedMarket, MarketIndicators};
use singularity_sim::runtime::{BusMessage, SingularityRuntime};
use singularity_sim::sim::{SimEvent, Simulation, SystemStatus};

#[derive(Parser, Debug)]
#[command(name = "singularity_run")]
#[command(about = "Run the singularity progression engine headless and dump its status")]
struct Args {
    /// JSON config file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the config seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Coordinator ticks to run
    #[arg(short, long, default_value = "600")]
    ticks: u64,

    /// Stop as soon as the singularity is reached
    #[arg(long)]
    until_singularity: bool,

    /// Force this many phase advances before running
    #[arg(long, default_value = "0")]
    force_phases: u32,

    /// Market growth indicator fed to the fixed market
    #[arg(long, default_value = "0.0")]
    growth: f64,

    /// Market trade volume indicator fed to the fixed market
    #[arg(long, default_value = "0.0")]
    trade_volume: f64,

    /// Run the async runtime against the wall clock for this many seconds instead
    #[arg(long)]
    realtime_secs: Option<u64>,

    /// Write the final system status as JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let status = run(&args).await?;

    let json = serde_json::to_string_pretty(&status)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

async fn run(args: &Args) -> Result<SystemStatus, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SingularityConfig::from_file(path)?,
        None => SingularityConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;

    let market = FixedMarket::new(MarketIndicators {
        growth: args.growth,
        trade_volume: args.trade_volume,
    });

    let status = match args.realtime_secs {
        Some(secs) => {
            let runtime = SingularityRuntime::start(config, market);
            let mut bus = runtime.subscribe();
            for _ in 0..args.force_phases {
                runtime.force_advance_phase().await?;
            }
            let deadline = tokio::time::sleep(Duration::from_secs(secs));
            tokio::pin!(deadline);
            loop {
                tokio::select! {
                    _ = &mut deadline => break,
                    message = bus.recv() => match message {
                        Ok(BusMessage::Narrative(event)) => info!(title = %event.title, "narrative"),
                        Ok(BusMessage::News(item)) => info!(headline = %item.headline, "news"),
                        Ok(BusMessage::ZooDay(day)) => info!(day = day.day, visitors = day.visitors, "zoo day"),
                        Ok(_) => {}
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "status listener lagged");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            runtime.system_status()
        }
        None => {
            let mut sim = Simulation::new(config, market);
            for _ in 0..args.force_phases {
                sim.force_advance_phase();
            }
            if args.until_singularity {
                match sim.run_until_singularity(args.ticks) {
                    Some(tick) => info!(tick, "singularity reached"),
                    None => info!(ticks = args.ticks, "singularity not reached"),
                }
            } else {
                for _ in 0..args.ticks {
                    for event in sim.step() {
                        match event {
                            SimEvent::Tick(report) => {
                                for event in &report.events {
                                    info!(tick = report.tick, title = %event.title, "narrative");
                                }
                            }
                            SimEvent::News(item) => info!(headline = %item.headline, "news"),
                            SimEvent::ZooDay(day) => {
                                info!(day = day.day, visitors = day.visitors, "zoo day")
                            }
                        }
                    }
                }
            }
            sim.system_status()
        }
    };
    Ok(status)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::CommandFactory;
    use singularity_sim::model::{GameTime, SingularityPhase};

    use super::*;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("singularity_run").chain(extra.iter().copied()))
            .unwrap()
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_run_six_hundred_ticks() {
        let parsed = args(&[]);
        assert_eq!(parsed.ticks, 600);
        assert_eq!(parsed.force_phases, 0);
        assert!(parsed.realtime_secs.is_none());
        assert!(Args::try_parse_from(["singularity_run", "--ticks", "many"]).is_err());
    }

    #[tokio::test]
    async fn deterministic_run_reports_forced_phase_and_ticks() {
        let status = run(&args(&["--seed", "3", "--ticks", "12", "--force-phases", "2"]))
            .await
            .unwrap();
        assert_eq!(status.tick, 12);
        assert!(status.progression.phase >= SingularityPhase::PredictiveDominance);
        assert!(status.terminal.is_none());
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"difficulty_multiplier\""));
    }

    #[tokio::test]
    async fn config_file_and_seed_override_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{ "tick_interval_secs": 2.0 }}"#).unwrap();

        let path = path.to_string_lossy().into_owned();
        let status = run(&args(&["--config", &path, "--ticks", "10"])).await.unwrap();
        assert_eq!(status.now, GameTime::from_secs(20));
    }

    #[tokio::test]
    async fn invalid_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "tick_interval_secs": 0 }"#).unwrap();
        let path = path.to_string_lossy().into_owned();
        assert!(run(&args(&["--config", &path])).await.is_err());
    }
}
