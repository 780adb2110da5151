//! The test-case lifecycle: setup, run, teardown, and the assertion surface.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::result::{Failure, ResultLog};

/// A self-contained unit of test logic.
///
/// `run` is the test body and is mandatory; `setup` and `teardown` default
/// to succeeding no-ops. Returning `false` from `setup` skips the body and
/// records the case as errored; returning `false` from `teardown` records an
/// error but still finishes the case. A panic escaping any hook is caught
/// and recorded as the case's fatal error, never crossing into other cases.
pub trait TestCase: Send {
    /// Human-readable name shown in the report.
    fn name(&self) -> &str;

    /// Prepare the environment for the test. `false` marks the case errored
    /// and skips `run` and `teardown`.
    fn setup(&mut self, _cx: &mut TestContext) -> bool {
        true
    }

    /// The test body. Assertions go through the `expect_*` macros on `cx`.
    fn run(&mut self, cx: &mut TestContext);

    /// Clean up after the test. `false` records a fatal error.
    fn teardown(&mut self, _cx: &mut TestContext) -> bool {
        true
    }
}

/// Assertion surface and private input/output channels handed to every
/// lifecycle hook.
///
/// Each case owns its own context, so concurrently running cases never share
/// mutable state and their console output never interleaves: anything the
/// case prints goes through `write!`/`writeln!` into a per-case buffer that
/// can be inspected after the run, and anything it reads comes from input
/// scripted via [`feed_input`](TestContext::feed_input), typically in
/// `setup`.
#[derive(Debug, Default)]
pub struct TestContext {
    results: ResultLog,
    output: String,
    input: String,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a failed check. The `expect_*` macros call this with the
    /// stringified source expression and its location.
    pub fn fail(&mut self, condition: &str, file: &str, line: u32) {
        self.results.fail(condition, file, line);
    }

    /// Record a failure unless `value` holds. Backs [`expect_valid!`] and
    /// [`expect_eq!`].
    ///
    /// [`expect_valid!`]: crate::expect_valid
    /// [`expect_eq!`]: crate::expect_eq
    pub fn check(&mut self, value: bool, condition: &str, file: &str, line: u32) {
        if !value {
            self.results.fail(condition, file, line);
        }
    }

    /// Everything recorded so far for this case.
    pub fn results(&self) -> &ResultLog {
        &self.results
    }

    pub(crate) fn results_mut(&mut self) -> &mut ResultLog {
        &mut self.results
    }

    /// Everything the case wrote through `write!`/`writeln!`.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Queue scripted input for the case to consume, the stand-in for a
    /// redirected standard-input channel.
    pub fn feed_input(&mut self, text: impl Into<String>) {
        self.input.push_str(&text.into());
    }

    /// The next line of scripted input, without its trailing newline.
    /// `None` once the input is exhausted.
    pub fn read_line(&mut self) -> Option<String> {
        if self.input.is_empty() {
            return None;
        }
        match self.input.find('\n') {
            Some(end) => {
                let line = self.input[..end].to_string();
                self.input.drain(..=end);
                Some(line)
            }
            None => Some(std::mem::take(&mut self.input)),
        }
    }
}

impl fmt::Write for TestContext {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

/// Check that a boolean expression holds.
#[macro_export]
macro_rules! expect_valid {
    ($cx:expr, $cond:expr) => {
        $cx.check(
            $cond,
            concat!("expect_valid: ", stringify!($cond)),
            file!(),
            line!(),
        )
    };
}

/// Check that two expressions compare equal.
#[macro_export]
macro_rules! expect_eq {
    ($cx:expr, $a:expr, $b:expr) => {
        $cx.check(
            $a == $b,
            concat!("expect_eq: ", stringify!($a), " == ", stringify!($b)),
            file!(),
            line!(),
        )
    };
}

/// Check that a `Result` expression is `Err` matching the given pattern.
/// Records a failure when the expression succeeds or fails with a different
/// error kind.
#[macro_export]
macro_rules! expect_err {
    ($cx:expr, $e:expr, $($pattern:tt)+) => {
        match $e {
            Err(ref err) if matches!(err, $($pattern)+) => {}
            _ => $cx.fail(
                concat!(
                    "expect_err: ",
                    stringify!($($pattern)+),
                    " in ",
                    stringify!($e),
                ),
                file!(),
                line!(),
            ),
        }
    };
}

/// Check that a `Result` expression succeeds.
#[macro_export]
macro_rules! expect_ok {
    ($cx:expr, $e:expr) => {
        if $e.is_err() {
            $cx.fail(
                concat!("expect_ok: ", stringify!($e)),
                file!(),
                line!(),
            );
        }
    };
}

/// Read-only snapshot of one case after a run, used for rendering.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    /// Wall-clock time from setup to teardown; zero until the case finished.
    pub duration: Duration,
    pub failed: bool,
    pub failures: Vec<Failure>,
    pub error: Option<String>,
    /// Output the case wrote into its private sink.
    pub output: String,
}

/// Drives one case through its lifecycle and owns its recorded state.
pub(crate) struct CaseHarness {
    case: Box<dyn TestCase>,
    cx: TestContext,
    start: Option<Instant>,
    duration: Duration,
    finished: bool,
}

impl CaseHarness {
    pub(crate) fn new(case: Box<dyn TestCase>) -> Self {
        Self {
            case,
            cx: TestContext::new(),
            start: None,
            duration: Duration::ZERO,
            finished: false,
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.case.name()
    }

    /// Setup wrapper. Captures the start time, then runs user setup; a
    /// `false` return or a panic records the fatal error and reports the
    /// case as not runnable.
    pub(crate) fn prepare(&mut self) -> bool {
        self.start = Some(Instant::now());
        match catch(|| self.case.setup(&mut self.cx)) {
            Ok(true) => true,
            Ok(false) => {
                self.cx.results_mut().error("Failed to Initiate Test");
                false
            }
            Err(message) => {
                self.cx.results_mut().error(message);
                false
            }
        }
    }

    /// Body wrapper. A panic becomes the case's fatal error; the lifecycle
    /// continues to teardown regardless.
    pub(crate) fn execute(&mut self) {
        if let Err(message) = catch(|| self.case.run(&mut self.cx)) {
            self.cx.results_mut().error(message);
        }
    }

    /// Teardown wrapper. The end time and finished flag are recorded on
    /// every path out, whatever user teardown does.
    pub(crate) fn finish(&mut self) {
        match catch(|| self.case.teardown(&mut self.cx)) {
            Ok(true) => {}
            Ok(false) => self.cx.results_mut().error("Failed to Cleanup Test"),
            Err(message) => self.cx.results_mut().error(message),
        }
        self.duration = self.start.map(|start| start.elapsed()).unwrap_or_default();
        self.finished = true;
    }

    pub(crate) fn has_failed(&self) -> bool {
        self.cx.results().has_failed()
    }

    /// Zero until the case finished.
    pub(crate) fn duration(&self) -> Duration {
        if self.finished {
            self.duration
        } else {
            Duration::ZERO
        }
    }

    pub(crate) fn report(&self) -> CaseReport {
        CaseReport {
            name: self.case.name().to_string(),
            duration: self.duration(),
            failed: self.has_failed(),
            failures: self.cx.results().failures().to_vec(),
            error: self.cx.results().error_message().map(str::to_string),
            output: self.cx.output().to_string(),
        }
    }
}

/// Run a lifecycle hook, converting an escaped panic into its message.
fn catch<T>(hook: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(hook)).map_err(|payload| panic_message(payload.as_ref()))
}

/// Best-effort text of a panic payload. Anything that is not a string
/// reports as "Unknown Error", the same catch-all the report shows for
/// unrecognized exception kinds.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown Error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fmt::Write;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Scripted {
        fail_setup: bool,
        panic_in_setup: bool,
        fail_teardown: bool,
        panic_with: Option<&'static str>,
        ran: Arc<AtomicBool>,
        cleaned: Arc<AtomicBool>,
    }

    impl TestCase for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn setup(&mut self, _cx: &mut TestContext) -> bool {
            if self.panic_in_setup {
                panic!("setup exploded");
            }
            !self.fail_setup
        }

        fn run(&mut self, cx: &mut TestContext) {
            self.ran.store(true, Ordering::SeqCst);
            expect_eq!(cx, 1 + 1, 3);
            if let Some(message) = self.panic_with {
                panic!("{}", message);
            }
            expect_valid!(cx, false);
        }

        fn teardown(&mut self, _cx: &mut TestContext) -> bool {
            self.cleaned.store(true, Ordering::SeqCst);
            !self.fail_teardown
        }
    }

    fn harness(case: Scripted) -> CaseHarness {
        CaseHarness::new(Box::new(case))
    }

    #[test]
    fn clean_lifecycle_records_the_assertions() {
        let mut h = harness(Scripted::default());
        assert!(h.prepare());
        h.execute();
        h.finish();

        // Both failing checks in the body ran.
        assert_eq!(h.cx.results().fail_count(), 2);
        assert!(h.has_failed());
        assert!(h.finished);
    }

    #[test]
    fn refused_setup_records_the_init_error() {
        let case = Scripted {
            fail_setup: true,
            ..Default::default()
        };
        let ran = case.ran.clone();

        let mut h = harness(case);
        assert!(!h.prepare());
        assert_eq!(
            h.cx.results().error_message(),
            Some("Failed to Initiate Test")
        );
        assert!(h.has_failed());
        assert!(!ran.load(Ordering::SeqCst));
        // Never finished, so the duration stays at zero.
        assert_eq!(h.duration(), Duration::ZERO);
    }

    #[test]
    fn panicking_setup_records_the_panic_text() {
        let mut h = harness(Scripted {
            panic_in_setup: true,
            ..Default::default()
        });
        assert!(!h.prepare());
        assert_eq!(h.cx.results().error_message(), Some("setup exploded"));
    }

    #[test]
    fn body_panic_keeps_earlier_failures_and_skips_the_rest() {
        let mut h = harness(Scripted {
            panic_with: Some("mid-run crash"),
            ..Default::default()
        });
        assert!(h.prepare());
        h.execute();
        h.finish();

        // Only the check before the panic was recorded.
        assert_eq!(h.cx.results().fail_count(), 1);
        assert_eq!(h.cx.results().error_message(), Some("mid-run crash"));
        assert!(h.finished);
    }

    #[test]
    fn refused_teardown_still_finishes_the_case() {
        let case = Scripted {
            fail_teardown: true,
            ..Default::default()
        };
        let cleaned = case.cleaned.clone();

        let mut h = harness(case);
        assert!(h.prepare());
        h.execute();
        h.finish();

        assert!(cleaned.load(Ordering::SeqCst));
        assert_eq!(
            h.cx.results().error_message(),
            Some("Failed to Cleanup Test")
        );
        assert!(h.finished);
    }

    #[test]
    fn macros_record_condition_text_and_location() {
        let mut cx = TestContext::new();
        expect_valid!(cx, 1 > 2);

        let failure = &cx.results().failures()[0];
        assert_eq!(failure.condition(), "expect_valid: 1 > 2");
        assert_eq!(failure.file(), "case.rs");
        assert!(failure.line() > 0);
    }

    #[test]
    fn expect_eq_stringifies_both_sides() {
        let mut cx = TestContext::new();
        let answer = 41;
        expect_eq!(cx, answer, 42);

        let failure = &cx.results().failures()[0];
        assert_eq!(failure.condition(), "expect_eq: answer == 42");
    }

    #[derive(Debug, PartialEq)]
    enum Flavor {
        Sweet,
        Sour,
    }

    fn taste(ok: bool, flavor: Flavor) -> Result<(), Flavor> {
        if ok {
            Ok(())
        } else {
            Err(flavor)
        }
    }

    #[test]
    fn expect_err_accepts_the_matching_kind() {
        let mut cx = TestContext::new();
        expect_err!(cx, taste(false, Flavor::Sour), Flavor::Sour);
        assert_eq!(cx.results().fail_count(), 0);
    }

    #[test]
    fn expect_err_flags_success_and_the_wrong_kind() {
        let mut cx = TestContext::new();
        expect_err!(cx, taste(true, Flavor::Sweet), Flavor::Sour);
        expect_err!(cx, taste(false, Flavor::Sweet), Flavor::Sour);

        assert_eq!(cx.results().fail_count(), 2);
        let condition = cx.results().failures()[0].condition();
        assert!(condition.starts_with("expect_err: "));
        assert!(condition.ends_with("in taste(true, Flavor::Sweet)"));
    }

    #[test]
    fn expect_ok_flags_only_errors() {
        let mut cx = TestContext::new();
        expect_ok!(cx, taste(true, Flavor::Sweet));
        expect_ok!(cx, taste(false, Flavor::Sour));

        assert_eq!(cx.results().fail_count(), 1);
        assert_eq!(
            cx.results().failures()[0].condition(),
            "expect_ok: taste(false, Flavor::Sour)"
        );
    }

    #[test]
    fn output_lands_in_the_private_sink() {
        let mut cx = TestContext::new();
        writeln!(cx, "hello from the case").unwrap();
        write!(cx, "{} + {}", 1, 2).unwrap();
        assert_eq!(cx.output(), "hello from the case\n1 + 2");
    }

    #[test]
    fn scripted_input_is_consumed_line_by_line() {
        let mut cx = TestContext::new();
        cx.feed_input("first\nsecond\n");
        cx.feed_input("tail without newline");

        assert_eq!(cx.read_line().as_deref(), Some("first"));
        assert_eq!(cx.read_line().as_deref(), Some("second"));
        assert_eq!(cx.read_line().as_deref(), Some("tail without newline"));
        assert_eq!(cx.read_line(), None);
    }

    #[test]
    fn setup_can_feed_input_to_the_body() {
        struct Prompted;

        impl TestCase for Prompted {
            fn name(&self) -> &str {
                "prompted"
            }

            fn setup(&mut self, cx: &mut TestContext) -> bool {
                cx.feed_input("42\n");
                true
            }

            fn run(&mut self, cx: &mut TestContext) {
                let answer = cx.read_line();
                expect_eq!(cx, answer.as_deref(), Some("42"));
            }
        }

        let mut h = CaseHarness::new(Box::new(Prompted));
        assert!(h.prepare());
        h.execute();
        h.finish();
        assert!(!h.has_failed());
    }

    #[test]
    fn report_snapshots_the_recorded_state() {
        let mut h = harness(Scripted::default());
        h.prepare();
        h.execute();
        h.finish();

        let report = h.report();
        assert_eq!(report.name, "scripted");
        assert!(report.failed);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.error, None);
    }
}
