use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Index;
use tracing::debug;

use crate::search::KmpMatcher;

/// Seed used when the caller does not pick one
pub const DEFAULT_SEED: u64 = 42;

/// One independent search task: find `pattern` in `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub pattern: String,
    pub text: String,
}

impl TestCase {
    pub fn new(pattern: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            text: text.into(),
        }
    }

    /// Number of (possibly overlapping) occurrences of the pattern in the text
    pub fn count_matches(&self) -> usize {
        KmpMatcher::new(&self.pattern).count(&self.text)
    }
}

/// Fixed-size, index-stable collection of test cases.
///
/// Runners only ever borrow the batch, so each strategy sees exactly the same
/// input and nothing can mutate it between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestBatch {
    cases: Vec<TestCase>,
}

impl TestBatch {
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self { cases }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TestCase> {
        self.cases.get(index)
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.cases.iter()
    }
}

impl Index<usize> for TestBatch {
    type Output = TestCase;

    fn index(&self, index: usize) -> &TestCase {
        &self.cases[index]
    }
}

impl FromIterator<TestCase> for TestBatch {
    fn from_iter<I: IntoIterator<Item = TestCase>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Generates `count` random test cases using [`DEFAULT_SEED`].
pub fn generate(count: usize, pattern_length: usize, text_length: usize) -> TestBatch {
    generate_seeded(count, pattern_length, text_length, DEFAULT_SEED)
}

/// Generates `count` random test cases over the lowercase alphabet.
///
/// The same arguments always produce the same batch, which is how separate
/// worker processes agree on the input without shipping it around.
pub fn generate_seeded(
    count: usize,
    pattern_length: usize,
    text_length: usize,
    seed: u64,
) -> TestBatch {
    debug!(
        "Generating {} test cases (pattern {} chars, text {} chars, seed {})",
        count, pattern_length, text_length, seed
    );
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let pattern = random_lowercase(&mut rng, pattern_length);
            let text = random_lowercase(&mut rng, text_length);
            TestCase { pattern, text }
        })
        .collect()
}

fn random_lowercase(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}
