//! Crucible - a minimal unit-testing framework
//!
//! Test cases implement [`TestCase`], register into a [`Collection`], and run
//! with one thread per case behind a fork-join barrier. Each case records
//! assertion failures and fatal errors into its own log; the collection
//! aggregates pass/fail tallies and renders a human-readable report.
//!
//! ```
//! use crucible_core::{expect_eq, ColorMode, Collection, TestCase, TestContext};
//!
//! struct Arithmetic;
//!
//! impl TestCase for Arithmetic {
//!     fn name(&self) -> &str {
//!         "Arithmetic"
//!     }
//!
//!     fn run(&mut self, cx: &mut TestContext) {
//!         expect_eq!(cx, 2 + 2, 4);
//!     }
//! }
//!
//! let collection = Collection::new();
//! collection.register(Arithmetic);
//! collection.run_all();
//! assert_eq!(collection.passed(), 1);
//!
//! let mut report = Vec::new();
//! collection.render(&mut report, ColorMode::Plain).unwrap();
//! ```

pub mod case;
pub mod collection;
pub mod reporter;
pub mod result;

pub use case::{CaseReport, TestCase, TestContext};
pub use collection::{Collection, RunMode};
pub use reporter::ColorMode;
pub use result::{Failure, ResultLog};
