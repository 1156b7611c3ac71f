// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pass/fail/skip/error tallies and their reduction.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::Serialize;

/// Counts of snippet outcomes.
///
/// Tallies combine with [`TestResult::reduce`], which is associative and
/// commutative with [`TestResult::ZERO`] as identity, so per-snippet results
/// and whole-subtree results fold the same way in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TestResult {
    pub pass: u32,
    pub fail: u32,
    pub skip: u32,
    /// Snippets that could not be compiled, found or started.
    pub error: u32,
}

impl TestResult {
    pub const ZERO: TestResult = TestResult::new(0, 0, 0, 0);
    pub const PASS: TestResult = TestResult::new(1, 0, 0, 0);
    pub const FAIL: TestResult = TestResult::new(0, 1, 0, 0);
    pub const SKIP: TestResult = TestResult::new(0, 0, 1, 0);
    pub const ERROR: TestResult = TestResult::new(0, 0, 0, 1);

    pub const fn new(pass: u32, fail: u32, skip: u32, error: u32) -> Self {
        Self {
            pass,
            fail,
            skip,
            error,
        }
    }

    /// Component-wise sum.
    pub fn reduce(self, other: TestResult) -> TestResult {
        TestResult {
            pass: self.pass.saturating_add(other.pass),
            fail: self.fail.saturating_add(other.fail),
            skip: self.skip.saturating_add(other.skip),
            error: self.error.saturating_add(other.error),
        }
    }

    pub fn total(&self) -> u32 {
        self.pass
            .saturating_add(self.fail)
            .saturating_add(self.skip)
            .saturating_add(self.error)
    }

    /// True when nothing failed or errored.
    pub fn is_success(&self) -> bool {
        self.fail == 0 && self.error == 0
    }
}

impl Add for TestResult {
    type Output = TestResult;

    fn add(self, other: TestResult) -> TestResult {
        self.reduce(other)
    }
}

impl Sum for TestResult {
    fn sum<I: Iterator<Item = TestResult>>(iter: I) -> TestResult {
        iter.fold(TestResult::ZERO, TestResult::reduce)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "passed: {}, failed: {}, skipped: {}, errored: {}",
            self.pass, self.fail, self.skip, self.error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<TestResult> {
        vec![
            TestResult::ZERO,
            TestResult::PASS,
            TestResult::FAIL,
            TestResult::SKIP,
            TestResult::ERROR,
            TestResult::new(3, 1, 4, 1),
            TestResult::new(5, 9, 2, 6),
        ]
    }

    #[test]
    fn reduce_is_associative() {
        for a in samples() {
            for b in samples() {
                for c in samples() {
                    assert_eq!(a.reduce(b).reduce(c), a.reduce(b.reduce(c)));
                }
            }
        }
    }

    #[test]
    fn reduce_is_commutative() {
        for a in samples() {
            for b in samples() {
                assert_eq!(a.reduce(b), b.reduce(a));
            }
        }
    }

    #[test]
    fn zero_is_identity() {
        for a in samples() {
            assert_eq!(a.reduce(TestResult::ZERO), a);
            assert_eq!(TestResult::ZERO.reduce(a), a);
        }
        assert_eq!(TestResult::ZERO.reduce(TestResult::ZERO), TestResult::ZERO);
    }

    #[test]
    fn sum_and_add() {
        let total: TestResult = [TestResult::PASS, TestResult::FAIL, TestResult::PASS]
            .into_iter()
            .sum();
        assert_eq!(total, TestResult::new(2, 1, 0, 0));
        assert_eq!(TestResult::SKIP + TestResult::ERROR, TestResult::new(0, 0, 1, 1));
        assert_eq!(total.total(), 3);
        assert!(!total.is_success());
        assert!(TestResult::new(4, 0, 2, 0).is_success());
    }

    #[test]
    fn counts_saturate() {
        let big = TestResult::new(u32::MAX, 1, 0, 0);
        assert_eq!(big.total(), u32::MAX);
        assert_eq!(big.reduce(TestResult::PASS).pass, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(
            TestResult::new(1, 2, 3, 4).to_string(),
            "passed: 1, failed: 2, skipped: 3, errored: 4"
        );
    }
}
