//
// Live localization with a separate reader thread.
//
// The filter ticks on its own thread; a second thread polls the published
// belief and logs the estimate, then the final belief is plotted to live_localization.svg.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use env_logger::Env;
use log::info;

use landmark_mcl::localization::LiveHandle;
use landmark_mcl::utils::plotting;
use landmark_mcl::{FilterConfig, LocalizationResult, ParticleFilter, ResamplingStrategy};

fn main() -> LocalizationResult<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = FilterConfig {
        particle_count: 300,
        resampling: ResamplingStrategy::Systematic,
        tick_interval_ms: 50,
        seed: Some(7),
        ..FilterConfig::default()
    };
    let interval = Duration::from_millis(config.tick_interval_ms);
    let world = config.world;

    let mut pf = ParticleFilter::new(config)?;
    let landmarks = pf.landmarks().clone();
    let controls = pf.random_walk().take(60);
    let handle = LiveHandle::spawn(pf, controls, interval);

    let reader = {
        let shared = handle.shared();
        let running = handle.running();
        thread::spawn(move || {
            let mut last = 0;
            while running.load(Ordering::SeqCst) {
                let belief = shared.latest();
                if belief.tick != last && belief.tick % 10 == 0 {
                    last = belief.tick;
                    let est = belief.mean_pose();
                    info!(
                        "tick {:>3}: agent ({:.1}, {:.1}) estimate ({:.1}, {:.1})",
                        belief.tick, belief.agent.x, belief.agent.y, est.x, est.y
                    );
                }
                thread::sleep(Duration::from_millis(5));
            }
        })
    };

    while !handle.is_finished() {
        thread::sleep(interval);
    }
    let pf = match handle.stop() {
        Some(pf) => pf,
        None => return Ok(()),
    };
    let _ = reader.join();

    let d = pf.divergence();
    info!("Finished after {} ticks, position error {:.2}", pf.tick_count(), d.position_error());

    let mut fg = plotting::plot_belief(&pf.snapshot(), &landmarks, &world);
    plotting::save_svg(&mut fg, "live_localization.svg")?;
    Ok(())
}
