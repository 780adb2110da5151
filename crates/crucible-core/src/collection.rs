//! The shared registry and driver for all test cases.

use std::io;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use crate::case::{CaseHarness, CaseReport, TestCase};
use crate::reporter::{self, ColorMode};

/// How [`Collection::run_all_with`] schedules cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// One thread per case, all joined before the run returns.
    #[default]
    Parallel,
    /// Registration order on the calling thread.
    Sequential,
}

/// The registry and driver: owns every registered case, runs them behind a
/// fork-join barrier, and keeps the tallies of the last run.
///
/// Cases render in registration order regardless of finish order, so the
/// report is deterministic even though scheduling is not. Tallies are
/// atomic because every worker thread bumps them on completion.
pub struct Collection {
    cases: Mutex<Vec<Mutex<CaseHarness>>>,
    passed: AtomicUsize,
    failed: AtomicUsize,
    duration: Mutex<Duration>,
}

static GLOBAL: OnceLock<Collection> = OnceLock::new();

impl Collection {
    pub fn new() -> Self {
        Self {
            cases: Mutex::new(Vec::new()),
            passed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            duration: Mutex::new(Duration::ZERO),
        }
    }

    /// The process-wide collection, created lazily on first access. It is
    /// never torn down; process exit reclaims it.
    pub fn global() -> &'static Collection {
        GLOBAL.get_or_init(Collection::new)
    }

    /// Add a case to the run. Registration order is report order.
    pub fn register(&self, case: impl TestCase + 'static) {
        self.cases
            .lock()
            .unwrap()
            .push(Mutex::new(CaseHarness::new(Box::new(case))));
    }

    pub fn len(&self) -> usize {
        self.cases.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every registered case concurrently and wait for all of them.
    pub fn run_all(&self) {
        self.run_all_with(RunMode::Parallel);
    }

    /// Run every registered case under the given schedule. Tallies are
    /// zeroed first so they reflect exactly this run; the wall-clock
    /// duration of the whole run is recorded at the join barrier.
    pub fn run_all_with(&self, mode: RunMode) {
        self.passed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);

        // Intentional case panics are recorded state, not console noise.
        silence_panics();

        let start = Instant::now();
        let cases = self.cases.lock().unwrap();
        match mode {
            RunMode::Parallel => {
                thread::scope(|scope| {
                    for slot in cases.iter() {
                        scope.spawn(move || self.run_case(slot));
                    }
                });
            }
            RunMode::Sequential => {
                for slot in cases.iter() {
                    self.run_case(slot);
                }
            }
        }
        drop(cases);
        *self.duration.lock().unwrap() = start.elapsed();

        restore_panics();
    }

    /// One case's full lifecycle plus the tally update. A panic escaping
    /// this wrapper is a bug in the framework, not in the test; it is
    /// reported to stderr and the other threads keep running.
    fn run_case(&self, slot: &Mutex<CaseHarness>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut case = slot.lock().unwrap();
            if case.prepare() {
                case.execute();
                case.finish();
            }
            if case.has_failed() {
                self.failed.fetch_add(1, Ordering::Relaxed);
            } else {
                self.passed.fetch_add(1, Ordering::Relaxed);
            }
        }));
        if let Err(payload) = outcome {
            Self::error(&crate::case::panic_message(payload.as_ref()));
        }
    }

    /// Report a framework-level error. Unreachable in correct use.
    fn error(message: &str) {
        eprintln!("crucible: framework error: {message}");
    }

    /// Pass tally of the last run.
    pub fn passed(&self) -> usize {
        self.passed.load(Ordering::Relaxed)
    }

    /// Fail tally of the last run.
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// Wall-clock duration of the last full run.
    pub fn duration(&self) -> Duration {
        *self.duration.lock().unwrap()
    }

    /// Read-only snapshots of every case, in registration order.
    pub fn case_reports(&self) -> Vec<CaseReport> {
        self.cases
            .lock()
            .unwrap()
            .iter()
            .map(|slot| slot.lock().unwrap().report())
            .collect()
    }

    /// Write the report for the last run into `sink`. Read-only: two
    /// renders without an intervening run produce identical bytes.
    pub fn render(&self, sink: &mut dyn io::Write, mode: ColorMode) -> io::Result<()> {
        reporter::render(
            sink,
            &self.case_reports(),
            self.failed(),
            self.passed(),
            self.duration(),
            mode,
        )
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Depth of nested/concurrent runs and the hook to put back afterwards.
static PANIC_SILENCE: Mutex<(usize, Option<PanicHook>)> = Mutex::new((0, None));

fn silence_panics() {
    let mut state = PANIC_SILENCE.lock().unwrap();
    if state.0 == 0 {
        state.1 = Some(panic::take_hook());
        panic::set_hook(Box::new(|_| {}));
    }
    state.0 += 1;
}

fn restore_panics() {
    let mut state = PANIC_SILENCE.lock().unwrap();
    state.0 -= 1;
    if state.0 == 0 {
        if let Some(previous) = state.1.take() {
            panic::set_hook(previous);
        }
    }
}
