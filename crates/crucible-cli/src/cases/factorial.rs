use crucible_core::{expect_eq, expect_err, TestCase, TestContext};

use super::MathError;

/// Checked factorial over `i32`; 13! is the first value that overflows.
pub fn factorial(number: i32) -> Result<i32, MathError> {
    if number < 0 {
        return Err(MathError::NegativeArgument);
    }
    let mut fact: i32 = 1;
    for i in 1..=number {
        fact = fact.checked_mul(i).ok_or(MathError::Overflow(i))?;
    }
    Ok(fact)
}

pub struct FactorialCase;

impl TestCase for FactorialCase {
    fn name(&self) -> &str {
        "Factorial Test"
    }

    fn run(&mut self, cx: &mut TestContext) {
        expect_eq!(cx, factorial(0), Ok(1));
        expect_eq!(cx, factorial(1), Ok(1));

        expect_eq!(cx, factorial(5), Ok(120));
        expect_eq!(cx, factorial(10), Ok(3628800));

        expect_err!(cx, factorial(-1), MathError::NegativeArgument);
        expect_err!(cx, factorial(13), MathError::Overflow(_));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_is_the_last_representable_factorial() {
        assert_eq!(factorial(12), Ok(479_001_600));
        assert!(matches!(factorial(13), Err(MathError::Overflow(_))));
    }

    #[test]
    fn negative_input_is_rejected() {
        assert_eq!(factorial(-1), Err(MathError::NegativeArgument));
    }
}
