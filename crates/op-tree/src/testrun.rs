use std::ops::{AddAssign, SubAssign};

use crate::Summarize;

/// This is a simple item for testing. Each run has a length, and the tree tracks both the total
/// length and the number of runs.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TestRun(pub usize);

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct TestRunSummary {
    pub len: usize,
    pub count: usize,
}

impl AddAssign for TestRunSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.len += rhs.len;
        self.count += rhs.count;
    }
}

impl SubAssign for TestRunSummary {
    fn sub_assign(&mut self, rhs: Self) {
        self.len -= rhs.len;
        self.count -= rhs.count;
    }
}

impl Summarize for TestRun {
    type Summary = TestRunSummary;

    fn summarize(&self) -> Self::Summary {
        TestRunSummary { len: self.0, count: 1 }
    }
}
