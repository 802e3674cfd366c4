//! Repeat-click loop
//!
//! Each clicker owns a background thread while running. The thread clicks,
//! then waits on a stop channel until the next tick is due, so `stop()`
//! wakes it immediately instead of waiting out the interval.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::input_simulator::ClickEmitter;
use crate::MouseButton;

/// Longest wait between clicks, whatever the stored rate
pub const MAX_INTERVAL: Duration = Duration::from_secs(3600);

/// Clicks per second, shared between the application and a running loop
///
/// Stored as `f64` bits so the loop can read it on every tick without a lock.
#[derive(Debug)]
pub struct ClickRate(AtomicU64);

impl ClickRate {
    pub fn new(cps: f64) -> Self {
        Self(AtomicU64::new(cps.to_bits()))
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::SeqCst))
    }

    /// Callers guarantee `cps` is finite and positive
    pub fn set(&self, cps: f64) {
        self.0.store(cps.to_bits(), Ordering::SeqCst);
    }

    /// Time between clicks, capped at [`MAX_INTERVAL`]
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.get())
            .map(|interval| interval.min(MAX_INTERVAL))
            .unwrap_or(MAX_INTERVAL)
    }
}

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

/// Repeat-click loop for one mouse button
pub struct Clicker {
    button: MouseButton,
    emitter: Arc<dyn ClickEmitter>,
    rate: Arc<ClickRate>,
    running: Arc<AtomicBool>,
    worker: Option<Worker>,
}

impl Clicker {
    pub fn new(button: MouseButton, emitter: Arc<dyn ClickEmitter>, rate: Arc<ClickRate>) -> Self {
        Self {
            button,
            emitter,
            rate,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn rate(&self) -> &Arc<ClickRate> {
        &self.rate
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start clicking. No-op if already running.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let button = self.button;
        let emitter = Arc::clone(&self.emitter);
        let rate = Arc::clone(&self.rate);
        let running = Arc::clone(&self.running);

        running.store(true, Ordering::SeqCst);
        let handle = thread::spawn(move || {
            run_loop(button, emitter.as_ref(), &rate, &stop_rx);
            running.store(false, Ordering::SeqCst);
        });

        self.worker = Some(Worker { stop_tx, handle });
        info!("{} clicker started at {} cps", self.button, self.rate.get());
    }

    /// Stop clicking and wait for the loop to exit. No-op if not running.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // A send error means the loop already exited
        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            warn!("{} clicker thread panicked", self.button);
        }
        self.running.store(false, Ordering::SeqCst);
        info!("{} clicker stopped", self.button);
    }

    /// Stop if running, start otherwise. Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        if self.worker.is_some() {
            self.stop();
        } else {
            self.start();
        }
        self.is_running()
    }
}

impl Drop for Clicker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    button: MouseButton,
    emitter: &dyn ClickEmitter,
    rate: &ClickRate,
    stop_rx: &mpsc::Receiver<()>,
) {
    debug!("{} click loop running", button);
    let mut next_tick = Instant::now();

    loop {
        if let Err(e) = emitter.click(button) {
            warn!("Failed to send {} click: {}", button, e);
        }

        // Rate is read fresh so changes apply from the next tick
        let now = Instant::now();
        next_tick = next_tick
            .checked_add(rate.interval())
            .filter(|tick| *tick >= now)
            .unwrap_or(now);

        match stop_rx.recv_timeout(next_tick - now) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!("{} click loop exited", button);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClickerError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEmitter {
        clicks: Mutex<Vec<(MouseButton, Instant)>>,
    }

    impl RecordingEmitter {
        fn count(&self) -> usize {
            self.clicks.lock().unwrap().len()
        }

        fn timestamps(&self) -> Vec<Instant> {
            self.clicks.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }
    }

    impl ClickEmitter for RecordingEmitter {
        fn click(&self, button: MouseButton) -> Result<(), ClickerError> {
            self.clicks.lock().unwrap().push((button, Instant::now()));
            Ok(())
        }
    }

    struct FailingEmitter;

    impl ClickEmitter for FailingEmitter {
        fn click(&self, _button: MouseButton) -> Result<(), ClickerError> {
            Err(ClickerError::SendEvent("no display".to_string()))
        }
    }

    fn clicker(cps: f64) -> (Clicker, Arc<RecordingEmitter>) {
        let emitter = Arc::new(RecordingEmitter::default());
        let clicker = Clicker::new(
            MouseButton::Left,
            emitter.clone(),
            Arc::new(ClickRate::new(cps)),
        );
        (clicker, emitter)
    }

    #[test]
    fn test_rate_interval() {
        let rate = ClickRate::new(20.0);
        assert_eq!(rate.interval(), Duration::from_millis(50));
        rate.set(4.0);
        assert_eq!(rate.get(), 4.0);
        assert_eq!(rate.interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_interval_is_capped() {
        assert_eq!(ClickRate::new(1e-20).interval(), MAX_INTERVAL);
        assert_eq!(ClickRate::new(0.0).interval(), MAX_INTERVAL);
        assert_eq!(ClickRate::new(f64::NAN).interval(), MAX_INTERVAL);
        assert_eq!(ClickRate::new(1e300).interval(), Duration::ZERO);
    }

    #[test]
    fn test_extreme_rate_keeps_loop_alive() {
        let (mut clicker, emitter) = clicker(1e-20);
        clicker.start();
        thread::sleep(Duration::from_millis(50));

        assert!(clicker.is_running());
        assert_eq!(emitter.count(), 1);
        clicker.stop();
        assert!(!clicker.is_running());
    }

    #[test]
    fn test_mean_interval_matches_rate() {
        let (mut clicker, emitter) = clicker(50.0);
        clicker.start();
        thread::sleep(Duration::from_millis(500));
        clicker.stop();

        let stamps = emitter.timestamps();
        assert!(stamps.len() >= 10, "only {} clicks", stamps.len());
        let span = *stamps.last().unwrap() - stamps[0];
        let mean = span.as_secs_f64() / (stamps.len() - 1) as f64;
        assert!((mean - 0.02).abs() < 0.01, "mean interval {}", mean);
    }

    #[test]
    fn test_no_clicks_after_stop() {
        let (mut clicker, emitter) = clicker(200.0);
        clicker.start();
        thread::sleep(Duration::from_millis(50));
        clicker.stop();
        assert!(!clicker.is_running());

        let count = emitter.count();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(emitter.count(), count);
    }

    #[test]
    fn test_stop_interrupts_long_interval() {
        let (mut clicker, emitter) = clicker(0.1);
        clicker.start();
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        clicker.stop();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(emitter.count(), 1);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let (mut clicker, _emitter) = clicker(10.0);
        assert!(!clicker.is_running());

        assert!(clicker.toggle());
        assert!(!clicker.toggle());
        assert!(!clicker.is_running());

        clicker.start();
        assert!(!clicker.toggle());
        assert!(clicker.toggle());
        assert!(clicker.is_running());
        clicker.stop();
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let (mut clicker, _emitter) = clicker(10.0);
        clicker.stop();
        assert!(!clicker.is_running());

        clicker.start();
        clicker.start();
        assert!(clicker.is_running());

        clicker.stop();
        clicker.stop();
        assert!(!clicker.is_running());
    }

    #[test]
    fn test_rate_change_applies_to_running_loop() {
        let (mut clicker, emitter) = clicker(1.0);
        clicker.start();
        clicker.rate().set(200.0);
        // The first wait still uses the old rate's deadline
        thread::sleep(Duration::from_millis(1300));
        clicker.stop();

        assert!(emitter.count() > 20, "only {} clicks", emitter.count());
    }

    #[test]
    fn test_emitter_errors_do_not_stop_loop() {
        let mut clicker = Clicker::new(
            MouseButton::Right,
            Arc::new(FailingEmitter),
            Arc::new(ClickRate::new(100.0)),
        );
        clicker.start();
        thread::sleep(Duration::from_millis(30));
        assert!(clicker.is_running());
        clicker.stop();
    }
}
