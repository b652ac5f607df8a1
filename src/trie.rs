// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Multi-stage trie compression of the dense classification array.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::props::TrieType;

/// How hard the chunk deduplication tries.
///
/// Higher effort never produces a larger trie, only a slower build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dedup {
    /// Every chunk is appended verbatim.
    None,
    /// Identical chunks share one offset.
    Exact,
    /// Additionally reuses chunks contained anywhere in the stage so far,
    /// and merges head/tail overlaps at the append position.
    Overlapping,
}

#[derive(Clone, Default)]
pub struct Stage {
    pub values: Vec<u32>,
    pub index: usize,
    pub shift: usize,
    pub mask: usize,
    pub bits: usize,
}

#[derive(Clone, Default)]
pub struct Trie {
    pub stages: Vec<Stage>,
    pub total_size: usize,
}

impl Trie {
    /// Chains the stages the same way the generated lookup functions do.
    /// Root stage first, each stage's value is the offset into the next.
    pub fn lookup(&self, cp: usize) -> u32 {
        let mut offset = 0usize;
        for stage in &self.stages {
            offset = stage.values[offset + ((cp >> stage.shift) & stage.mask)] as usize;
        }
        offset as u32
    }
}

/// Tries all shift combinations for the given stage count in parallel
/// and returns the one with the smallest serialized size.
pub fn build_best_trie(
    uncompressed: &[TrieType],
    min_shift: usize,
    max_shift: usize,
    stages: usize,
) -> Trie {
    let depth = stages - 1;
    let delta = max_shift - min_shift + 1;
    let total = delta.pow(depth as u32);

    let mut tasks = Vec::new();
    for i in 0..total {
        let mut shifts = vec![0; depth];
        let mut index = i;
        for s in &mut shifts {
            *s = min_shift + (index % delta);
            index /= delta;
        }
        tasks.push(shifts);
    }

    tasks
        .par_iter()
        .map(|shifts| build_trie(uncompressed.to_vec(), shifts, Dedup::Overlapping))
        .min_by_key(|t| t.total_size)
        .unwrap_or_default()
}

pub fn build_trie(uncompressed: Vec<TrieType>, shifts: &[usize], dedup: Dedup) -> Trie {
    // Fun fact: Rust optimizes the into_iter/collect into a no-op. Neat!
    let mut uncompressed: Vec<u32> = uncompressed.into_iter().map(|c| c.value()).collect();
    let mut cumulative_shift = 0;
    let mut stages = Vec::new();

    for (stage, &shift) in shifts.iter().enumerate() {
        let chunk_size = 1 << shift;
        let mut cache = HashMap::new();
        let mut compressed = Vec::new();
        let mut offsets = Vec::new();
        let mut off = 0;

        while off < uncompressed.len() {
            let chunk = &uncompressed[off..off + chunk_size.min(uncompressed.len() - off)];

            let offset = if stage == 0 && off < 0x80 {
                // The first stage (well, really the last stage - the one which contains the values instead of indices)
                // contains a direct 1:1 mapping for all ASCII codepoints as they're most common in IT environments.
                compressed.extend_from_slice(chunk);
                (compressed.len() - chunk.len()) as u32
            } else if dedup == Dedup::None {
                compressed.extend_from_slice(chunk);
                (compressed.len() - chunk.len()) as u32
            } else {
                *cache.entry(chunk).or_insert_with(|| {
                    if dedup == Dedup::Overlapping
                        && let Some(existing) = find_existing(&compressed, chunk)
                    {
                        existing as u32
                    } else {
                        let overlap = if dedup == Dedup::Overlapping {
                            measure_overlap(&compressed, chunk)
                        } else {
                            0
                        };
                        compressed.extend_from_slice(&chunk[overlap..]);
                        (compressed.len() - chunk.len()) as u32
                    }
                })
            };

            offsets.push(offset);
            off += chunk.len();
        }

        stages.push(Stage {
            values: compressed,
            index: shifts.len() - stages.len(),
            shift: cumulative_shift,
            mask: chunk_size - 1,
            bits: 0,
        });

        uncompressed = offsets;
        cumulative_shift += shift;
    }

    stages.push(Stage {
        values: uncompressed,
        index: 0,
        shift: cumulative_shift,
        mask: usize::MAX,
        bits: 0,
    });

    stages.reverse();

    for stage in stages.iter_mut() {
        let max_val = stage.values.iter().max().cloned().unwrap_or(0);
        stage.bits = match max_val {
            0..0x100 => 8,
            0x100..0x10000 => 16,
            _ => 32,
        };
    }

    let total_size: usize = stages.iter().map(|stage| (stage.bits / 8) * stage.values.len()).sum();

    Trie { stages, total_size }
}

fn find_existing(haystack: &[u32], needle: &[u32]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn measure_overlap(prev: &[u32], next: &[u32]) -> usize {
    (0..prev.len().min(next.len()))
        .rev()
        .find(|&i| prev[prev.len() - i..] == next[..i])
        .unwrap_or(0)
}
