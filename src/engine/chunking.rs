//! Wave planning
//!
//! The remaining elements of a phase live in a queue that waves drain from the
//! front, so concatenating every chunk of every wave reproduces the input.

use std::collections::VecDeque;

/// Drain the next wave from `remaining`: up to `max_chunks` chunks of at most
/// `chunk_size` elements each. Returns an empty wave once `remaining` is empty.
pub fn next_wave<T>(
    remaining: &mut VecDeque<T>,
    chunk_size: usize,
    max_chunks: usize,
) -> Vec<Vec<T>> {
    let chunk_size = chunk_size.max(1);
    let mut wave = Vec::new();

    while wave.len() < max_chunks && !remaining.is_empty() {
        let take = chunk_size.min(remaining.len());
        wave.push(remaining.drain(..take).collect());
    }

    wave
}
