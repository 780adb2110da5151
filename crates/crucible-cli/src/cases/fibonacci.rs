use crucible_core::{expect_eq, expect_err, TestCase, TestContext};

use super::MathError;

/// Naive recursive fibonacci, deliberately slow for larger inputs.
pub fn fibonacci(number: i64) -> Result<i64, MathError> {
    if number < 0 {
        return Err(MathError::NegativeArgument);
    }
    Ok(match number {
        0 => 0,
        1 => 1,
        n => fibonacci(n - 1)? + fibonacci(n - 2)?,
    })
}

pub struct FibonacciCase;

impl TestCase for FibonacciCase {
    fn name(&self) -> &str {
        "Fibonacci Test"
    }

    fn run(&mut self, cx: &mut TestContext) {
        expect_eq!(cx, fibonacci(0), Ok(0));
        expect_eq!(cx, fibonacci(1), Ok(1));

        expect_eq!(cx, fibonacci(10), Ok(55));

        expect_err!(cx, fibonacci(-1), MathError::NegativeArgument);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_line_up() {
        assert_eq!(fibonacci(2), Ok(1));
        assert_eq!(fibonacci(7), Ok(13));
        assert_eq!(fibonacci(10), Ok(55));
    }

    #[test]
    fn negative_input_is_rejected() {
        assert_eq!(fibonacci(-5), Err(MathError::NegativeArgument));
    }
}
