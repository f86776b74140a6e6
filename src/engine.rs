use crate::history;
use crate::probe::{NetworkProbe, SpeedTestResult};
use crate::settings::Settings;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

/// Lifecycle of a speed test run. `Idle` is the initial state; `Done` and
/// `Failed` are terminal until the next `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TestState {
    Idle = 0,
    Running = 1,
    Done = 2,
    Failed = 3,
}

impl TestState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => TestState::Running,
            2 => TestState::Done,
            3 => TestState::Failed,
            _ => TestState::Idle,
        }
    }
}

/// Fields shared between the background run and any number of pollers.
///
/// The result is always written before the `Done` state flag; the Release
/// store on `state` paired with the Acquire load in `state()` makes the
/// full result visible to any reader that observes `Done`.
struct Shared {
    state: AtomicU8,
    /// Fractional progress of the current run, stored as `f32` bits.
    progress: AtomicU32,
    result: Mutex<Option<SpeedTestResult>>,
    last_saved: Mutex<Option<SpeedTestResult>>,
}

impl Shared {
    fn set_progress(&self, value: f64) {
        self.progress
            .store((value.clamp(0.0, 1.0) as f32).to_bits(), Ordering::Release);
    }
}

/// Owns the run state machine: starts probes on background tasks, publishes
/// state/progress/result to concurrent pollers, and persists completed
/// results to the append-only log.
///
/// Exactly one run is in flight at a time; `start` while `Running` is
/// rejected, not queued. None of the polling methods block.
pub struct SpeedTestEngine {
    settings: Settings,
    shared: Arc<Shared>,
}

impl SpeedTestEngine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            shared: Arc::new(Shared {
                state: AtomicU8::new(TestState::Idle as u8),
                progress: AtomicU32::new(0f32.to_bits()),
                result: Mutex::new(None),
                last_saved: Mutex::new(None),
            }),
        }
    }

    /// Begins a new run unless one is already in flight. Returns whether a
    /// run was started; `false` means another run is still `Running`.
    ///
    /// The probe is spawned fire-and-forget on the tokio runtime; completion
    /// is observed by polling `state()`. Must be called within a runtime.
    pub fn start(&self) -> bool {
        let current = self.shared.state.load(Ordering::Acquire);
        if current == TestState::Running as u8 {
            return false;
        }
        // A failed swap means another caller won the race to start.
        if self
            .shared
            .state
            .compare_exchange(
                current,
                TestState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return false;
        }

        self.shared.set_progress(0.0);

        let shared = Arc::clone(&self.shared);
        let settings = self.settings.clone();
        tokio::spawn(async move {
            let outcome = match NetworkProbe::new(&settings) {
                Ok(probe) => {
                    let progress = Arc::clone(&shared);
                    probe.run(move |value| progress.set_progress(value)).await
                }
                Err(err) => Err(err),
            };

            match outcome {
                Ok(result) => {
                    tracing::info!(
                        download_mbps = result.download_mbps,
                        ping_ms = result.ping_ms,
                        "speed test complete"
                    );
                    if let Ok(mut slot) = shared.result.lock() {
                        *slot = Some(result);
                    }
                    shared.set_progress(1.0);
                    shared.state.store(TestState::Done as u8, Ordering::Release);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "speed test failed");
                    // Prior result, if any, stays untouched.
                    shared
                        .state
                        .store(TestState::Failed as u8, Ordering::Release);
                }
            }
        });

        true
    }

    pub fn state(&self) -> TestState {
        TestState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Fractional progress of the current run in `[0.0, 1.0]`. Non-decreasing
    /// while `Running`, 0 right after `start`, exactly 1.0 once `Done`.
    pub fn progress(&self) -> f64 {
        f32::from_bits(self.shared.progress.load(Ordering::Acquire)) as f64
    }

    /// Snapshot of the most recently published result. Only meaningful when
    /// `state()` is `Done`; a `Failed` run leaves the previous run's result
    /// in place.
    pub fn result(&self) -> Option<SpeedTestResult> {
        self.shared.result.lock().ok().and_then(|slot| slot.clone())
    }

    /// Appends the completed result to the log. No-op unless `state()` is
    /// `Done`. A write failure is swallowed and LastSaved is left unchanged,
    /// so the save can be retried. Returns whether a line was written.
    pub fn save_result(&self) -> bool {
        if self.state() != TestState::Done {
            return false;
        }
        let Some(result) = self.result() else {
            return false;
        };

        if history::append(&self.settings.log_path, &result).is_err() {
            return false;
        }
        if let Ok(mut slot) = self.shared.last_saved.lock() {
            *slot = Some(result);
        }
        true
    }

    /// The most recently persisted result, if any run was ever saved.
    pub fn last_saved(&self) -> Option<SpeedTestResult> {
        self.shared
            .last_saved
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
    }
}
