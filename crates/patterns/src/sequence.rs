//! Character alignment between two strings.
//!
//! The matcher repeatedly takes the longest common run (leftmost in `a`,
//! then leftmost in `b`, on ties) and recurses on the text to either side
//! of it. Adjacent runs are merged and a zero-length terminator block at
//! `(len_a, len_b)` closes the list, so two unrelated strings still report
//! one block.

use std::collections::HashMap;

/// `a[a_start..a_start + len] == b[b_start..b_start + len]`, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

impl MatchBlock {
    pub fn a_end(&self) -> usize {
        self.a_start + self.len
    }
}

#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    a_len: usize,
    b_len: usize,
    blocks: Vec<MatchBlock>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let blocks = matching_blocks(&a, &b);
        Self {
            a_len: a.len(),
            b_len: b.len(),
            blocks,
        }
    }

    /// Matching blocks in increasing order, terminator included.
    pub fn matching_blocks(&self) -> &[MatchBlock] {
        &self.blocks
    }

    /// Matching blocks with a non-zero length.
    pub fn runs(&self) -> impl Iterator<Item = &MatchBlock> {
        self.blocks.iter().filter(|block| block.len > 0)
    }

    /// `2 * matched / (len_a + len_b)`, or 1.0 for two empty strings.
    pub fn ratio(&self) -> f64 {
        let total = self.a_len + self.b_len;
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.blocks.iter().map(|block| block.len).sum();
        2.0 * matched as f64 / total as f64
    }
}

fn matching_blocks(a: &[char], b: &[char]) -> Vec<MatchBlock> {
    let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        b_positions.entry(*ch).or_default().push(j);
    }

    let mut found = Vec::new();
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = queue.pop() {
        let block = longest_match(a, &b_positions, a_lo, a_hi, b_lo, b_hi);
        if block.len == 0 {
            continue;
        }
        found.push(block);
        if a_lo < block.a_start && b_lo < block.b_start {
            queue.push((a_lo, block.a_start, b_lo, block.b_start));
        }
        if block.a_end() < a_hi && block.b_start + block.len < b_hi {
            queue.push((block.a_end(), a_hi, block.b_start + block.len, b_hi));
        }
    }
    found.sort_unstable();

    let mut merged: Vec<MatchBlock> = Vec::with_capacity(found.len() + 1);
    for block in found {
        match merged.last_mut() {
            Some(last)
                if last.a_start + last.len == block.a_start
                    && last.b_start + last.len == block.b_start =>
            {
                last.len += block.len;
            }
            _ => merged.push(block),
        }
    }
    merged.push(MatchBlock {
        a_start: a.len(),
        b_start: b.len(),
        len: 0,
    });
    merged
}

fn longest_match(
    a: &[char],
    b_positions: &HashMap<char, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> MatchBlock {
    let mut best = MatchBlock {
        a_start: a_lo,
        b_start: b_lo,
        len: 0,
    };
    // run length of the match ending at b[j], for the previous row of `a`
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, ch) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b_positions.get(ch) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let previous = if j > 0 {
                    run_ending_at.get(&(j - 1)).copied().unwrap_or(0)
                } else {
                    0
                };
                let len = previous + 1;
                next.insert(j, len);
                if len > best.len {
                    best = MatchBlock {
                        a_start: i + 1 - len,
                        b_start: j + 1 - len,
                        len,
                    };
                }
            }
        }
        run_ending_at = next;
    }
    best
}
