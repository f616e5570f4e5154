/// Knuth-Morris-Pratt matcher over a single pattern.
///
/// The failure function is built once in [`KmpMatcher::new`] and the matcher
/// only borrows the pattern, so one matcher can be shared across threads and
/// reused for any number of texts.
#[derive(Debug, Clone)]
pub struct KmpMatcher<'p> {
    pattern: &'p [u8],
    failure: Vec<usize>,
}

impl<'p> KmpMatcher<'p> {
    /// Creates a matcher for `pattern`, computing its failure function
    pub fn new(pattern: &'p str) -> Self {
        let pattern = pattern.as_bytes();
        Self {
            pattern,
            failure: failure_function(pattern),
        }
    }

    /// Length of the pattern in bytes
    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    /// Returns every offset in `text` where the pattern starts, in ascending order.
    pub fn find_all(&self, text: &str) -> Vec<usize> {
        self.find_all_from(text, 0)
    }

    /// Same as [`find_all`](Self::find_all) but only considers offsets `>= start`.
    ///
    /// Matching state always starts fresh at `start`. Overlapping occurrences
    /// are all reported.
    pub fn find_all_from(&self, text: &str, start: usize) -> Vec<usize> {
        let mut matches = Vec::new();
        self.scan(text.as_bytes(), start, |offset| matches.push(offset));
        matches
    }

    /// Counts occurrences without collecting offsets.
    pub fn count(&self, text: &str) -> usize {
        let mut count = 0;
        self.scan(text.as_bytes(), 0, |_| count += 1);
        count
    }

    fn scan(&self, text: &[u8], start: usize, mut on_match: impl FnMut(usize)) {
        let m = self.pattern.len();
        if m == 0 || start >= text.len() || text.len() - start < m {
            return;
        }

        let mut k = 0;
        for (i, &c) in text.iter().enumerate().skip(start) {
            while k > 0 && self.pattern[k] != c {
                k = self.failure[k - 1];
            }
            if self.pattern[k] == c {
                k += 1;
            }
            if k == m {
                on_match(i + 1 - m);
                // keep the border so overlapping matches are found
                k = self.failure[k - 1];
            }
        }
    }
}

/// Builds the prefix (failure) function: `pf[i]` is the length of the longest
/// proper prefix of `pattern[..=i]` that is also its suffix.
fn failure_function(pattern: &[u8]) -> Vec<usize> {
    let mut pf = vec![0; pattern.len()];
    let mut k = 0;
    for i in 1..pattern.len() {
        while k > 0 && pattern[i] != pattern[k] {
            k = pf[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        pf[i] = k;
    }
    pf
}

/// Finds all occurrences of `pattern` in `text`.
pub fn find_all(text: &str, pattern: &str) -> Vec<usize> {
    KmpMatcher::new(pattern).find_all(text)
}

/// Finds all occurrences of `pattern` in `text` starting at or after `start`.
pub fn find_all_from(text: &str, pattern: &str, start: usize) -> Vec<usize> {
    KmpMatcher::new(pattern).find_all_from(text, start)
}
