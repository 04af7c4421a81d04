use std::io::Write;
use std::path::PathBuf;

use aegis_ai::rng::DEFAULT_SEED;
use aegis_ai::{
    InferenceRng, KeywordClassifier, MessageClassifier, ResourcePredictor, RouteOptimizer,
    StubDetector, StubPredictor, StubRouter,
};
use aegis_core::{MockSource, Snapshot};
use aegis_feed::FeedClient;
use aegis_sim::{ManualClock, Simulation, Speed, TrainingRun};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod display;
mod infer;

#[derive(Parser)]
#[command(name = "aegis")]
#[command(version)]
#[command(about = "Disaster-response read model on the command line", long_about = None)]
struct Cli {
    /// Live feed base URL. Without it the built-in demonstration data is shown.
    #[arg(long, env = "AEGIS_FEED_URL", global = true)]
    feed_url: Option<String>,

    /// Seed for the stand-in models and the simulation.
    #[arg(long, env = "AEGIS_SEED", global = true, default_value_t = DEFAULT_SEED)]
    seed: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Active disaster zones, most severe first
    Zones,

    /// Emergency messages by priority
    Messages {
        /// Only messages not yet handled
        #[arg(long)]
        unprocessed: bool,
    },

    /// Evacuation routes
    Routes,

    /// Resource allocation cards with shortage summary
    Resources,

    /// Subsystem states
    Status,

    /// Run the scenario simulation for a number of ticks
    Simulate {
        #[arg(long, default_value_t = 10)]
        ticks: u32,

        /// Speed multiplier: 0.5, 1, 2, 5 or 10
        #[arg(long, default_value_t = Speed::X1)]
        speed: Speed,

        #[arg(long)]
        scenario: Option<String>,
    },

    /// Train a catalog model to completion
    Train {
        /// Model id; all catalog models when omitted
        model: Option<String>,
    },

    /// Classify message texts
    Classify {
        #[arg(required = true)]
        texts: Vec<String>,

        /// Label as one batch instead of one by one
        #[arg(long)]
        batch: bool,
    },

    /// Detect disaster zones in an image
    Detect { image: PathBuf },

    /// Plan evacuation routes to the nearest safe zones
    Plan,

    /// Predict needs for the most severe zone and recommend deployments
    Recommend {
        #[arg(long, default_value_t = 10_000)]
        population: u32,

        /// Affected area in km²
        #[arg(long, default_value_t = 1.0)]
        area: f64,
    },

    /// Sort uploaded files by what they feed into
    Ingest {
        #[arg(required = true)]
        files: Vec<String>,

        /// MIME type reported by the upload, applied to every file
        #[arg(long)]
        mime: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    debug!(seed = cli.seed, "aegis v{}", env!("CARGO_PKG_VERSION"));

    let now = Utc::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Zones => {
            let snap = load_snapshot(cli.feed_url.as_deref(), now).await?;
            display::write_zones(&mut out, &snap.zones, now)?;
        }
        Command::Messages { unprocessed } => {
            let snap = load_snapshot(cli.feed_url.as_deref(), now).await?;
            display::write_messages(&mut out, &snap.messages, unprocessed, now)?;
        }
        Command::Routes => {
            let snap = load_snapshot(cli.feed_url.as_deref(), now).await?;
            display::write_routes(&mut out, &snap.routes)?;
        }
        Command::Resources => {
            let snap = load_snapshot(cli.feed_url.as_deref(), now).await?;
            display::write_resources(&mut out, &snap.allocations)?;
        }
        Command::Status => {
            let snap = load_snapshot(cli.feed_url.as_deref(), now).await?;
            let status = snap.status.refresh(now);
            display::write_status(&mut out, &status, now)?;
        }
        Command::Simulate {
            ticks,
            speed,
            scenario,
        } => run_simulation(&mut out, cli.seed, now, ticks, speed, scenario.as_deref())?,
        Command::Train { model } => run_training(&mut out, cli.seed, model.as_deref())?,
        Command::Classify { texts, batch } => {
            let mut classifier = KeywordClassifier::new(InferenceRng::from_seed_u64(cli.seed));
            if batch {
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                let labels = classifier
                    .classify_batch(&refs)
                    .context("classifying batch")?;
                display::write_batch_labels(&mut out, &labels)?;
            } else {
                let labels = texts
                    .iter()
                    .map(|t| classifier.classify(t))
                    .collect::<Result<Vec<_>, _>>()
                    .context("classifying message")?;
                display::write_labels(&mut out, &texts, &labels)?;
            }
        }
        Command::Detect { image } => {
            let (secs, zones) = infer::detect_zones(&mut StubDetector, &image, now)?;
            writeln!(out, "Analysed {} in {secs:.1}s", image.display())?;
            writeln!(out)?;
            display::write_zones(&mut out, &zones, now)?;
        }
        Command::Plan => {
            let snap = load_snapshot(cli.feed_url.as_deref(), now).await?;
            let request = infer::route_request(&snap);
            let plan = StubRouter::default()
                .find_routes(&request)
                .context("planning routes")?;
            display::write_route_plan(&mut out, &plan)?;
        }
        Command::Recommend { population, area } => {
            let snap = load_snapshot(cli.feed_url.as_deref(), now).await?;
            let request = infer::needs_request(&snap, population, area)?;
            let mut predictor = StubPredictor;
            let predictions = predictor
                .predict_needs(&request)
                .context("predicting resource needs")?;
            let recs = predictor.recommend(&snap.allocations, &predictions);
            display::write_recommendations(&mut out, &recs)?;
        }
        Command::Ingest { files, mime } => {
            let sorted = infer::sort_uploads(&files, mime.as_deref());
            display::write_ingest(&mut out, &sorted)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Fetch from the live feed when a URL is configured, else use the demonstration data.
async fn load_snapshot(feed_url: Option<&str>, now: DateTime<Utc>) -> anyhow::Result<Snapshot> {
    match feed_url {
        Some(url) => FeedClient::new(url.to_string())
            .fetch_snapshot(now)
            .await
            .with_context(|| format!("fetching snapshot from {url}")),
        None => {
            debug!("no feed url configured, using demonstration data");
            Ok(Snapshot::capture(&MockSource::new(now)))
        }
    }
}

fn run_simulation(
    out: &mut impl Write,
    seed: u64,
    now: DateTime<Utc>,
    ticks: u32,
    speed: Speed,
    scenario: Option<&str>,
) -> anyhow::Result<()> {
    let mut rng = InferenceRng::from_seed_u64(seed);
    let clock = ManualClock::new(now);
    let mut sim = Simulation::new(&clock);

    sim.set_speed(speed);
    if let Some(name) = scenario {
        sim.set_scenario(name, &mut rng.0)
            .context("selecting scenario")?;
    }

    display::write_sim_header(out, &sim)?;
    sim.start(&clock);
    for tick in 1..=ticks {
        sim.tick(&mut rng.0);
        display::write_sim_tick(out, tick, &sim)?;
    }
    sim.pause();

    info!(
        ticks,
        processed_events = sim.processed_events(),
        "simulation finished"
    );
    Ok(())
}

fn run_training(out: &mut impl Write, seed: u64, model: Option<&str>) -> anyhow::Result<()> {
    let mut rng = InferenceRng::from_seed_u64(seed);
    let mut runs = TrainingRun::catalog();
    if let Some(id) = model {
        runs.retain(|r| r.id == id);
        anyhow::ensure!(!runs.is_empty(), "unknown model: {id}");
    }

    for run in &mut runs {
        writeln!(out, "{} ({}, {} epochs)", run.name, run.kind.as_str(), run.total_epochs)?;
        run.start();
        let mut last_decile = 0;
        while run.tick(&mut rng.0) {
            let decile = run.epoch * 10 / run.total_epochs;
            if decile > last_decile {
                last_decile = decile;
                display::write_training_progress(out, run)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
