//
// Monte Carlo Localization against known landmarks.
//
// Runs either a fixed-length diagnostic that reports how far the mean pose
// drifts from the true pose, or a live loop that ticks until Ctrl-C.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info, warn};

use landmark_mcl::localization::LiveHandle;
use landmark_mcl::utils::plotting;
use landmark_mcl::{FilterConfig, LocalizationResult, ParticleFilter};

#[derive(Parser)]
#[command(author, version, about = "Monte Carlo Localization against known landmarks")]
struct Cli {
    /// YAML filter configuration; built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a fixed number of ticks and report mean-pose divergence
    Diagnostic {
        /// Overrides `diagnostic_ticks` from the configuration
        #[arg(long)]
        ticks: Option<usize>,
        /// Write the divergence series to this SVG file
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Tick at the configured interval until Ctrl-C or the duration elapses
    Live {
        #[arg(long)]
        duration_secs: Option<u64>,
        /// Write the final belief to this SVG file
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> LocalizationResult<()> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FilterConfig::load(path)?
        }
        None => FilterConfig::default(),
    };

    match cli.command {
        Command::Diagnostic { ticks, plot } => diagnostic(config, ticks, plot),
        Command::Live { duration_secs, snapshot } => live(config, duration_secs.map(Duration::from_secs), snapshot),
        Command::Config => {
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

fn diagnostic(mut config: FilterConfig, ticks: Option<usize>, plot: Option<PathBuf>) -> LocalizationResult<()> {
    if let Some(k) = ticks {
        config.diagnostic_ticks = k;
    }
    let mut pf = ParticleFilter::new(config)?;
    let controls = pf.random_walk();
    let series = pf.run_diagnostic(controls);

    println!("{:>5} {:>10} {:>10} {:>10}", "tick", "|dx|", "|dy|", "|dh| deg");
    for d in series.records() {
        println!("{:>5} {:>10.3} {:>10.3} {:>10.2}", d.tick, d.dx, d.dy, d.dheading.to_degrees());
    }

    let (sx, sy, sh) = (series.summary_x(), series.summary_y(), series.summary_heading());
    println!("mean |dx| {:.3} (max {:.3})", sx.mean, sx.max);
    println!("mean |dy| {:.3} (max {:.3})", sy.mean, sy.max);
    println!("mean |dh| {:.2} deg (max {:.2} deg)", sh.mean.to_degrees(), sh.max.to_degrees());

    if let Some(path) = plot {
        let mut fg = plotting::plot_divergence(&series);
        plotting::save_svg(&mut fg, &path.to_string_lossy())?;
        info!("Divergence plot saved to {}", path.display());
    }
    Ok(())
}

fn live(config: FilterConfig, duration: Option<Duration>, snapshot: Option<PathBuf>) -> LocalizationResult<()> {
    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
            warn!("Could not install Ctrl-C handler: {}", e);
        }
    }

    let interval = Duration::from_millis(config.tick_interval_ms);
    let world = config.world;
    let mut pf = ParticleFilter::new(config)?;
    let landmarks = pf.landmarks().clone();
    let controls = pf.random_walk();
    let handle = LiveHandle::spawn(pf, controls, interval);

    let started = Instant::now();
    let mut last_tick = 0;
    while running.load(Ordering::SeqCst) && !handle.is_finished() {
        if duration.map_or(false, |d| started.elapsed() >= d) {
            break;
        }
        thread::sleep(interval);

        let belief = handle.snapshot();
        if belief.tick != last_tick {
            last_tick = belief.tick;
            let est = belief.mean_pose();
            info!(
                "tick {:>5}: agent ({:.1}, {:.1}, {:.1} deg) estimate ({:.1}, {:.1}, {:.1} deg)",
                belief.tick,
                belief.agent.x,
                belief.agent.y,
                belief.agent.heading_degrees(),
                est.x,
                est.y,
                est.heading_degrees()
            );
        }
    }

    let pf = match handle.stop() {
        Some(pf) => pf,
        None => return Ok(()),
    };
    let d = pf.divergence();
    info!(
        "Stopped after {} ticks: |dx| {:.3}, |dy| {:.3}, |dh| {:.2} deg",
        pf.tick_count(),
        d.dx,
        d.dy,
        d.dheading.to_degrees()
    );

    if let Some(path) = snapshot {
        let mut fg = plotting::plot_belief(&pf.snapshot(), &landmarks, &world);
        plotting::save_svg(&mut fg, &path.to_string_lossy())?;
        info!("Belief plot saved to {}", path.display());
    }
    Ok(())
}
