/// Exact string search with the Knuth-Morris-Pratt algorithm.
///
/// # Why KMP
///
/// A naive search re-reads text characters after every partial match, which
/// is O(n * m) in the worst case. KMP precomputes, for every pattern prefix,
/// the longest border (proper prefix that is also a suffix). On a mismatch the
/// scan falls back to that border instead of moving backwards in the text, so
/// every text character is examined a bounded number of times: O(n + m).
///
/// # Sharing Across Threads
///
/// In .NET, sharing a searcher between tasks usually means reasoning about
/// hidden mutable state:
/// ```csharp
/// var searcher = new KmpSearcher(pattern);
/// Parallel.ForEach(texts, text => searcher.FindAll(text)); // safe?
/// ```
///
/// In Rust, `KmpMatcher` holds only borrowed pattern bytes and an immutable
/// table, so it is `Send + Sync` and the compiler proves concurrent use is safe:
/// ```rust,ignore
/// let matcher = KmpMatcher::new(pattern);
/// texts.par_iter().map(|text| matcher.count(text)).sum::<usize>();
/// ```
pub mod matcher;

pub use matcher::{find_all, find_all_from, KmpMatcher};
