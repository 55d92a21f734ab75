//! Hashtag frequency tally built on the max-Fibonacci heap
//!
//! The tally keeps one live heap element per distinct hashtag and a hash map
//! from tag name to that element's handle. Re-observing a tag bumps its
//! frequency in place through `increase_key` instead of re-heapifying, which
//! is the access pattern the Fibonacci heap exists for.
//!
//! # Input protocol
//!
//! [`run`] streams a line protocol:
//!
//! - `#tag n`: observe hashtag `tag` with frequency `n`
//! - a bare non-negative integer `n`: emit the current top `n` tags as one
//!   comma-separated line
//! - `stop` / `STOP` (or any other line starting with `S`): end of input
//!
//! Top-N queries are answered by extracting the maxima, writing their names,
//! and re-inserting them with their counts intact, so later observations keep
//! accumulating on the emitted totals.

use crate::fibonacci::{FibonacciHeap, HeapError, HeapHandle};
use log::warn;
use rustc_hash::FxHashMap;
use std::io::{self, BufRead, Write};

/// Frequency tally over hashtags, answering top-N queries
///
/// # Example
///
/// ```rust
/// use hashtag_counter::HashtagTally;
///
/// let mut tally = HashtagTally::new();
/// tally.observe("rust", 3.0).unwrap();
/// tally.observe("heap", 5.0).unwrap();
/// tally.observe("rust", 4.0).unwrap();
///
/// assert_eq!(tally.top(1), vec![("rust".to_owned(), 7.0)]);
/// // The query re-inserted the element; counting continues
/// assert_eq!(tally.count("rust"), Some(7.0));
/// ```
pub struct HashtagTally {
    heap: FibonacciHeap<String>,
    /// Tag name -> handle of its live heap element
    handles: FxHashMap<String, HeapHandle>,
}

impl Default for HashtagTally {
    fn default() -> Self {
        Self::new()
    }
}

impl HashtagTally {
    /// Creates an empty tally
    pub fn new() -> Self {
        Self {
            heap: FibonacciHeap::new(),
            handles: FxHashMap::default(),
        }
    }

    /// Returns the number of distinct tags observed so far
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no tag has been observed yet
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the accumulated count for `tag`, if it has been observed
    pub fn count(&self, tag: &str) -> Option<f64> {
        self.handles
            .get(tag)
            .and_then(|&handle| self.heap.priority(handle))
    }

    /// Records an observation of `tag` with frequency `count`
    ///
    /// A first observation inserts a fresh element; later ones promote the
    /// existing element by `count`.
    ///
    /// # Errors
    /// Returns `HeapError::PriorityNotIncreased` if `count` is negative
    /// or NaN.
    pub fn observe(&mut self, tag: &str, count: f64) -> Result<(), HeapError> {
        if !(count >= 0.0) {
            return Err(HeapError::PriorityNotIncreased);
        }
        match self.handles.get(tag) {
            Some(&handle) => self.heap.increase_key(handle, count),
            None => {
                let handle = self.heap.insert(count, tag.to_owned());
                self.handles.insert(tag.to_owned(), handle);
                Ok(())
            }
        }
    }

    /// Returns the `n` most frequent tags with their counts, most frequent
    /// first, and keeps them in the tally
    ///
    /// Stops early if fewer than `n` tags exist. The extracted elements are
    /// re-inserted with their counts, refreshing the handle table, so the
    /// query does not disturb subsequent observations.
    pub fn top(&mut self, n: usize) -> Vec<(String, f64)> {
        let mut out = Vec::with_capacity(n.min(self.heap.len()));
        for _ in 0..n {
            match self.heap.delete_max() {
                Some((count, tag)) => {
                    self.handles.remove(&tag);
                    out.push((tag, count));
                }
                None => break,
            }
        }

        for (tag, count) in &out {
            let handle = self.heap.insert(*count, tag.clone());
            self.handles.insert(tag.clone(), handle);
        }

        out
    }
}

/// Streams the tally protocol from `reader` to `writer`
///
/// Observation and query lines are described in the module docs. Malformed
/// lines are skipped with a warning rather than aborting the stream.
pub fn run<R: BufRead, W: Write>(reader: R, mut writer: W) -> io::Result<()> {
    let mut tally = HashtagTally::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            let mut parts = rest.split_whitespace();
            let tag = parts.next().filter(|tag| !tag.is_empty());
            let count = parts.next().and_then(|raw| raw.parse::<u64>().ok());
            match (tag, count) {
                (Some(tag), Some(count)) => {
                    // count >= 0 by construction, so observe cannot fail
                    let _ = tally.observe(tag, count as f64);
                }
                _ => warn!("skipping malformed observation: {line}"),
            }
        } else if line.eq_ignore_ascii_case("stop") || line.starts_with('S') {
            break;
        } else {
            match line.parse::<usize>() {
                Ok(n) => {
                    let names: Vec<String> =
                        tally.top(n).into_iter().map(|(tag, _)| tag).collect();
                    writeln!(writer, "{}", names.join(","))?;
                }
                Err(_) => warn!("skipping unrecognized line: {line}"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_observe_and_count() {
        let mut tally = HashtagTally::new();
        tally.observe("rust", 3.0).unwrap();
        tally.observe("heap", 5.0).unwrap();
        tally.observe("rust", 4.0).unwrap();

        assert_eq!(tally.len(), 2);
        assert_eq!(tally.count("rust"), Some(7.0));
        assert_eq!(tally.count("heap"), Some(5.0));
        assert_eq!(tally.count("unknown"), None);
    }

    #[test]
    fn test_observe_rejects_negative_count() {
        let mut tally = HashtagTally::new();
        assert_eq!(
            tally.observe("rust", -1.0),
            Err(HeapError::PriorityNotIncreased)
        );
        assert!(tally.is_empty());
    }

    #[test]
    fn test_top_orders_and_reinserts() {
        let mut tally = HashtagTally::new();
        tally.observe("apple", 5.0).unwrap();
        tally.observe("banana", 3.0).unwrap();
        tally.observe("cherry", 8.0).unwrap();
        tally.observe("date", 1.0).unwrap();

        let top = tally.top(3);
        assert_eq!(
            top,
            vec![
                ("cherry".to_owned(), 8.0),
                ("apple".to_owned(), 5.0),
                ("banana".to_owned(), 3.0),
            ]
        );

        // Everything is still in the tally and counting continues
        assert_eq!(tally.len(), 4);
        tally.observe("banana", 10.0).unwrap();
        assert_eq!(tally.count("banana"), Some(13.0));
        assert_eq!(tally.top(1), vec![("banana".to_owned(), 13.0)]);
    }

    #[test]
    fn test_top_more_than_available() {
        let mut tally = HashtagTally::new();
        tally.observe("only", 2.0).unwrap();

        let top = tally.top(5);
        assert_eq!(top, vec![("only".to_owned(), 2.0)]);
        assert_eq!(tally.len(), 1);
    }

    #[test]
    fn test_run_sample_stream() {
        let input = "\
#apple 5
#banana 3
#cherry 8
#date 1
3
#banana 10
2
stop
";
        let mut output = Vec::new();
        run(Cursor::new(input), &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "cherry,apple,banana\nbanana,cherry\n");
    }

    #[test]
    fn test_run_skips_malformed_lines() {
        let input = "\
#apple 5
#broken
#also broken
not-a-number
1
STOP
";
        let mut output = Vec::new();
        run(Cursor::new(input), &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "apple\n");
    }

    #[test]
    fn test_run_stops_at_s_line() {
        let input = "\
#apple 5
Something else
1
";
        let mut output = Vec::new();
        run(Cursor::new(input), &mut output).unwrap();

        // The S-line terminates the stream before the query runs
        assert!(output.is_empty());
    }
}
