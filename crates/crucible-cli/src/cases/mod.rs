//! The demo suite: arbitrary user code under test plus its test cases.

mod factorial;
mod fibonacci;
mod timing;

use crucible_core::Collection;
use thiserror::Error;

pub use factorial::FactorialCase;
pub use fibonacci::FibonacciCase;
pub use timing::TimingCase;

/// Errors from the demo math functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MathError {
    #[error("negative argument is not allowed")]
    NegativeArgument,
    #[error("multiplication overflow at {0}")]
    Overflow(i32),
}

/// Register the whole demo suite. Registration order is report order.
pub fn register_all(collection: &Collection) {
    collection.register(FactorialCase);
    collection.register(FibonacciCase);
    collection.register(TimingCase);
}
