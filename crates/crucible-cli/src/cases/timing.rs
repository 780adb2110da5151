use std::fmt::Write;
use std::hint;
use std::time::{Duration, Instant};

use crucible_core::{expect_valid, TestCase, TestContext};

const SPIN: Duration = Duration::from_millis(25);

/// Busy-spins long enough to show up in the report's duration column and
/// demonstrates the per-case output sink.
pub struct TimingCase;

impl TestCase for TimingCase {
    fn name(&self) -> &str {
        "Timing Test"
    }

    fn run(&mut self, cx: &mut TestContext) {
        let start = Instant::now();
        let mut spins: u64 = 0;
        while start.elapsed() < SPIN {
            spins += 1;
            hint::black_box(spins);
        }

        let _ = writeln!(cx, "spun {spins} times in {:?}", start.elapsed());
        expect_valid!(cx, spins > 0);
        expect_valid!(cx, start.elapsed() >= SPIN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spins_for_at_least_the_configured_window() {
        let start = Instant::now();
        let mut case = TimingCase;
        let mut cx = TestContext::default();
        case.run(&mut cx);

        assert!(start.elapsed() >= SPIN);
        assert!(!cx.results().has_failed());
        assert!(cx.output().starts_with("spun "));
    }
}
