//! Idle auto-rotation
//!
//! While auto-rotate is on and nobody is dragging, the card drifts around
//! its vertical axis and gently bobs around the horizontal one. Each tick:
//!
//! ```text
//! x = sin(now_ms * 0.0005) * 10      (±10°, ~12.5 s period)
//! y = previous_y + 0.5
//! ```
//!
//! The Y drift is per tick, not per millisecond, so a faster frame rate
//! spins the card faster.

use crate::rotation::{Rotation, RotationState};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Degrees added to Y per tick
pub const DRIFT_PER_TICK_DEG: f32 = 0.5;
/// X oscillation amplitude in degrees
pub const BOB_AMPLITUDE_DEG: f32 = 10.0;
/// X oscillation angular rate, radians per millisecond
pub const BOB_RATE: f64 = 0.0005;

/// Default tick spacing, one display frame at 60 Hz
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// `running` value while stopped
const STOPPED: u64 = 0;

/// Who calls the per-frame tick
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoRotateDriver {
    /// A tokio interval task owned by the manager
    #[default]
    Timer,
    /// The host's own frame loop, through [`AutoRotationManager::tick`]
    Host,
}

/// One auto-rotation step from `previous` at wall time `now_ms`
pub fn auto_rotate_step(previous: RotationState, now_ms: f64) -> RotationState {
    RotationState {
        x: ((now_ms * BOB_RATE).sin() * BOB_AMPLITUDE_DEG as f64) as f32,
        y: previous.y + DRIFT_PER_TICK_DEG,
    }
}

/// Milliseconds since the Unix epoch
pub fn wall_clock_ms() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64
}

/// Aborts the ticker task when dropped
#[derive(Debug)]
struct TickerTask {
    handle: JoinHandle<()>,
}

impl Drop for TickerTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Drives [`auto_rotate_step`] while allowed to
#[derive(Debug)]
pub struct AutoRotationManager {
    rotation: Rotation,
    driver: AutoRotateDriver,
    frame_interval: Duration,
    /// Epoch of the current run, [`STOPPED`] while stopped. A ticker only
    /// writes while its own epoch is current.
    running: Arc<AtomicU64>,
    last_epoch: u64,
    ticker: Option<TickerTask>,
}

impl AutoRotationManager {
    pub fn new(rotation: Rotation, driver: AutoRotateDriver, frame_interval: Duration) -> Self {
        Self {
            rotation,
            driver,
            frame_interval,
            running: Arc::new(AtomicU64::new(STOPPED)),
            last_epoch: STOPPED,
            ticker: None,
        }
    }

    pub fn driver(&self) -> AutoRotateDriver {
        self.driver
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) != STOPPED
    }

    /// Start or stop to match `should_run` (`auto_rotate && !dragging`).
    ///
    /// Stopping takes effect before this returns: no tick lands afterwards.
    /// Starting resumes from the current rotation.
    pub fn sync(&mut self, should_run: bool) {
        if should_run == self.is_running() {
            return;
        }

        if should_run {
            self.last_epoch += 1;
            self.running.store(self.last_epoch, Ordering::SeqCst);
            tracing::debug!("auto-rotation started ({:?})", self.driver);
            if self.driver == AutoRotateDriver::Timer {
                self.spawn_ticker(self.last_epoch);
            }
        } else {
            self.running.store(STOPPED, Ordering::SeqCst);
            self.ticker = None;
            tracing::debug!("auto-rotation stopped");
        }
    }

    /// Advance one frame from the host's loop.
    ///
    /// No-op unless running with the [`AutoRotateDriver::Host`] driver.
    pub fn tick(&self, now_ms: f64) -> bool {
        if self.driver != AutoRotateDriver::Host {
            return false;
        }
        let epoch = self.running.load(Ordering::SeqCst);
        epoch != STOPPED && advance(&self.rotation, &self.running, epoch, now_ms)
    }

    fn spawn_ticker(&mut self, epoch: u64) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = run_ticker(
                    self.rotation.clone(),
                    Arc::clone(&self.running),
                    epoch,
                    self.frame_interval,
                );
                self.ticker = Some(TickerTask {
                    handle: handle.spawn(task),
                });
            }
            Err(_) => {
                tracing::warn!("No tokio runtime for the auto-rotation timer, expecting host ticks");
                self.driver = AutoRotateDriver::Host;
            }
        }
    }
}

impl Drop for AutoRotationManager {
    fn drop(&mut self) {
        self.running.store(STOPPED, Ordering::SeqCst);
        self.ticker = None;
    }
}

/// Step the rotation if `epoch` is still the running one.
///
/// The check happens inside the rotation's write lock, so a writer that
/// stopped the ticker before publishing its own value always wins.
fn advance(rotation: &Rotation, running: &AtomicU64, epoch: u64, now_ms: f64) -> bool {
    rotation.update(|previous| {
        (running.load(Ordering::SeqCst) == epoch).then(|| auto_rotate_step(previous, now_ms))
    })
}

async fn run_ticker(rotation: Rotation, running: Arc<AtomicU64>, epoch: u64, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if running.load(Ordering::SeqCst) != epoch {
            break;
        }
        advance(&rotation, &running, epoch, wall_clock_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_manager(rotation: &Rotation) -> AutoRotationManager {
        AutoRotationManager::new(rotation.clone(), AutoRotateDriver::Host, DEFAULT_FRAME_INTERVAL)
    }

    #[test]
    fn test_step() {
        let next = auto_rotate_step(RotationState::new(99.0, 10.0), 0.0);
        assert_eq!(next, RotationState::new(0.0, 10.5));

        // Quarter period of the bob: sin(pi/2) = 1
        let quarter = std::f64::consts::FRAC_PI_2 / BOB_RATE;
        let next = auto_rotate_step(RotationState::ZERO, quarter);
        assert!((next.x - 10.0).abs() < 1e-4);
        assert_eq!(next.y, 0.5);
    }

    #[test]
    fn test_y_is_never_wrapped() {
        let mut r = RotationState::new(0.0, 359.75);
        for _ in 0..4 {
            r = auto_rotate_step(r, 0.0);
        }
        assert_eq!(r.y, 361.75);
    }

    #[test]
    fn test_host_ticks_only_while_running() {
        let rotation = Rotation::default();
        let mut manager = host_manager(&rotation);

        assert!(!manager.tick(0.0));
        assert_eq!(rotation.get(), RotationState::ZERO);

        manager.sync(true);
        assert!(manager.is_running());
        for _ in 0..3 {
            assert!(manager.tick(0.0));
        }
        assert_eq!(rotation.get().y, 1.5);

        manager.sync(false);
        assert!(!manager.tick(0.0));
        assert_eq!(rotation.get().y, 1.5);
    }

    #[test]
    fn test_resume_keeps_state() {
        let rotation = Rotation::default();
        let mut manager = host_manager(&rotation);

        manager.sync(true);
        manager.tick(0.0);
        manager.sync(false);

        rotation.set(RotationState::new(5.0, 42.0));
        manager.sync(true);
        manager.tick(0.0);
        assert_eq!(rotation.get().y, 42.5);
    }

    #[test]
    fn test_timer_without_runtime_falls_back_to_host() {
        let rotation = Rotation::default();
        let mut manager =
            AutoRotationManager::new(rotation.clone(), AutoRotateDriver::Timer, DEFAULT_FRAME_INTERVAL);

        manager.sync(true);
        assert_eq!(manager.driver(), AutoRotateDriver::Host);
        assert!(manager.tick(0.0));
        assert_eq!(rotation.get().y, 0.5);
    }

    #[test]
    fn test_timer_ignores_host_ticks() {
        let rotation = Rotation::default();
        let manager =
            AutoRotationManager::new(rotation.clone(), AutoRotateDriver::Timer, DEFAULT_FRAME_INTERVAL);
        assert!(!manager.tick(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_advances_and_stops() {
        let rotation = Rotation::default();
        let mut manager =
            AutoRotationManager::new(rotation.clone(), AutoRotateDriver::Timer, DEFAULT_FRAME_INTERVAL);

        manager.sync(true);
        tokio::time::sleep(Duration::from_millis(200)).await;
        let spun = rotation.get().y;
        assert!(spun >= 5.0, "only reached {spun}");

        manager.sync(false);
        let stopped_at = rotation.get();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rotation.get(), stopped_at);

        manager.sync(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rotation.get().y > stopped_at.y);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_ticker_never_overwrites_drag() {
        let rotation = Rotation::default();
        let mut manager =
            AutoRotationManager::new(rotation.clone(), AutoRotateDriver::Timer, DEFAULT_FRAME_INTERVAL);

        manager.sync(true);
        tokio::time::sleep(Duration::from_millis(50)).await;

        manager.sync(false);
        let dragged = RotationState::new(12.0, -34.0);
        rotation.set(dragged);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(rotation.get(), dragged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_ticker() {
        let rotation = Rotation::default();
        let mut manager =
            AutoRotationManager::new(rotation.clone(), AutoRotateDriver::Timer, DEFAULT_FRAME_INTERVAL);
        manager.sync(true);
        tokio::time::sleep(Duration::from_millis(50)).await;

        drop(manager);
        let at_drop = rotation.get();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rotation.get(), at_drop);
    }
}
