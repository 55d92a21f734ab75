//! Hashtag frequency counting on a max-priority Fibonacci heap
//!
//! This crate provides a Fibonacci heap specialized as a max-priority queue
//! with an efficient `increase_key` operation, and a hashtag tally client
//! built on top of it.
//!
//! # Features
//!
//! - **Fibonacci Heap**: O(1) insert and find-max; O(1) amortized
//!   increase_key; O(log n) amortized delete-max
//! - **Stable handles**: elements are addressed through generational arena
//!   keys, so a handle to an extracted element is detected instead of
//!   dereferenced
//! - **Hashtag tally**: maps tag names to live handles, bumps frequencies in
//!   place, and answers top-N queries by extract/emit/re-insert
//!
//! `increase_key` is the reason a Fibonacci heap is used at all: re-observing
//! a hashtag promotes its element in place in O(1) amortized time, where a
//! binary heap would pay O(log n) per observation.
//!
//! # Example
//!
//! ```rust
//! use hashtag_counter::fibonacci::FibonacciHeap;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle = heap.insert(5.0, "item1");
//! heap.insert(3.0, "item2");
//! heap.increase_key(handle, 2.0).unwrap();
//! assert_eq!(heap.find_max(), Some((7.0, &"item1")));
//! ```

pub mod fibonacci;
pub mod tally;

// Re-export the main types for convenience
pub use fibonacci::{FibonacciHeap, HeapError, HeapHandle};
pub use tally::HashtagTally;
