//! Live mode: tick at a fixed cadence until cancelled
//!
//! The filter thread is the only writer. After every tick it publishes an
//! owned [`BeliefSnapshot`] into a [`SharedBelief`]; readers (renderers,
//! diagnostics) take an `Arc` to the latest snapshot and never see a belief
//! that is being replaced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info};
use parking_lot::RwLock;

use crate::common::ControlInput;

use super::particle_filter::{BeliefSnapshot, ParticleFilter};

/// Single-writer, multiple-reader cell holding the latest snapshot
#[derive(Debug, Clone)]
pub struct SharedBelief {
    inner: Arc<RwLock<Arc<BeliefSnapshot>>>,
}

impl SharedBelief {
    pub fn new(initial: Arc<BeliefSnapshot>) -> Self {
        Self { inner: Arc::new(RwLock::new(initial)) }
    }

    /// Latest published snapshot
    pub fn latest(&self) -> Arc<BeliefSnapshot> {
        self.inner.read().clone()
    }

    fn publish(&self, snapshot: Arc<BeliefSnapshot>) {
        *self.inner.write() = snapshot;
    }
}

impl ParticleFilter {
    /// Tick once per `interval` with controls from `controls`, publishing a
    /// snapshot after each tick.
    ///
    /// `running` is checked only between ticks. Returns the number of ticks
    /// executed, which is also how many snapshots were published.
    pub fn run_live<I>(&mut self, controls: I, interval: Duration, running: &AtomicBool, shared: &SharedBelief) -> u64
    where
        I: IntoIterator<Item = ControlInput>,
    {
        info!("Live mode starting ({} ms/tick)", interval.as_millis());
        let mut controls = controls.into_iter();
        let mut executed = 0;

        while running.load(Ordering::SeqCst) {
            let started = Instant::now();
            let control = match controls.next() {
                Some(c) => c,
                None => {
                    info!("Control source exhausted");
                    break;
                }
            };
            self.tick(control);
            shared.publish(self.snapshot());
            executed += 1;

            if let Some(rest) = interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }

        info!("Live mode stopped after {} ticks", executed);
        executed
    }
}

/// Live mode running on its own thread
pub struct LiveHandle {
    running: Arc<AtomicBool>,
    shared: SharedBelief,
    worker: Option<JoinHandle<ParticleFilter>>,
}

impl LiveHandle {
    /// Move `filter` onto a new thread and start ticking
    pub fn spawn<I>(mut filter: ParticleFilter, controls: I, interval: Duration) -> Self
    where
        I: IntoIterator<Item = ControlInput>,
        I::IntoIter: Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let shared = SharedBelief::new(filter.snapshot());
        let controls = controls.into_iter();

        let worker = {
            let running = running.clone();
            let shared = shared.clone();
            thread::spawn(move || {
                filter.run_live(controls, interval, &running, &shared);
                filter
            })
        };

        Self { running, shared, worker: Some(worker) }
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<BeliefSnapshot> {
        self.shared.latest()
    }

    /// Reader handle that can be passed to other threads
    pub fn shared(&self) -> SharedBelief {
        self.shared.clone()
    }

    /// Cancellation flag; clearing it stops the loop at the next tick boundary
    pub fn running(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    /// Request a stop, wait for the current tick to finish and hand the
    /// filter back. `None` if the filter thread panicked.
    pub fn stop(mut self) -> Option<ParticleFilter> {
        self.running.store(false, Ordering::SeqCst);
        join_worker(self.worker.take()?)
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            join_worker(worker);
        }
    }
}

fn join_worker(worker: JoinHandle<ParticleFilter>) -> Option<ParticleFilter> {
    match worker.join() {
        Ok(filter) => Some(filter),
        Err(_) => {
            error!("Live filter thread panicked");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterConfig, LandmarkSource};
    use crate::localization::noise::NoiseConfig;

    fn config() -> FilterConfig {
        FilterConfig {
            particle_count: 20,
            world: crate::common::WorldBounds::new(100.0, 100.0),
            landmarks: LandmarkSource::fixed(&[(20.0, 30.0), (50.0, 50.0)]),
            noise: NoiseConfig::noiseless(),
            agent_start: crate::common::Pose2D::new(10.0, 10.0, 0.0),
            seed: Some(3),
            ..FilterConfig::default()
        }
    }

    #[test]
    fn test_run_live_stops_when_controls_end() {
        let mut pf = ParticleFilter::new(config()).unwrap();
        let shared = SharedBelief::new(pf.snapshot());
        let running = AtomicBool::new(true);
        let n = pf.run_live(vec![ControlInput::forward(1.0); 4], Duration::from_millis(0), &running, &shared);
        assert_eq!(n, 4);
        let latest = shared.latest();
        assert_eq!(latest.tick, 4);
        assert_eq!(latest.particles.len(), 20);
    }

    #[test]
    fn test_run_live_honours_cleared_flag() {
        let mut pf = ParticleFilter::new(config()).unwrap();
        let shared = SharedBelief::new(pf.snapshot());
        let running = AtomicBool::new(false);
        let n = pf.run_live(std::iter::repeat(ControlInput::forward(1.0)), Duration::from_millis(0), &running, &shared);
        assert_eq!(n, 0);
        assert_eq!(shared.latest().tick, 0);
    }

    #[test]
    fn test_handle_stop_returns_filter() {
        let pf = ParticleFilter::new(config()).unwrap();
        let handle = LiveHandle::spawn(pf, std::iter::repeat(ControlInput::forward(0.5)), Duration::from_millis(1));
        let reader = handle.shared();
        let deadline = Instant::now() + Duration::from_secs(5);
        while reader.latest().tick < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        let seen = reader.latest();
        assert_eq!(seen.particles.len(), 20);

        let pf = handle.stop().unwrap();
        assert!(pf.tick_count() >= seen.tick);
        assert!(pf.tick_count() >= 3);
    }

    #[test]
    fn test_join_worker_reports_panic() {
        let worker = thread::spawn(|| -> ParticleFilter { panic!("filter thread failed") });
        assert!(join_worker(worker).is_none());

        let pf = ParticleFilter::new(config()).unwrap();
        let worker = thread::spawn(move || pf);
        assert_eq!(join_worker(worker).map(|pf| pf.tick_count()), Some(0));
    }

    #[test]
    fn test_drop_stops_worker() {
        let pf = ParticleFilter::new(config()).unwrap();
        let handle = LiveHandle::spawn(pf, std::iter::repeat(ControlInput::forward(0.5)), Duration::from_millis(1));
        let running = handle.running();
        drop(handle);
        assert!(!running.load(Ordering::SeqCst));
    }
}
