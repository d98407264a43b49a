//! Approximate name matching against a candidate pool
//!
//! Similarity is the Ratcliff/Obershelp ratio: the longest common block is
//! matched first, then the unmatched text on either side is matched
//! recursively. The matcher then searches for a cutoff that leaves exactly
//! one candidate standing.

use crate::config::MatcherConfig;
use std::collections::HashMap;

/// Sequences this long or longer ignore their most frequent characters when
/// looking for match anchors
const AUTOJUNK_MIN_LEN: usize = 200;

/// Similarity of `a` and `b` in `[0, 1]`: `2 * matched / (len(a) + len(b))`.
///
/// Lengths count characters, not bytes. Two empty strings are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

/// Total size of the matching blocks of `a` and `b`
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let index = anchor_index(b);
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_block(a, b, &index, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Positions of each character of `b`, without the over-represented ones in long input
fn anchor_index(b: &[char]) -> HashMap<char, Vec<usize>> {
    let mut index: HashMap<char, Vec<usize>> = HashMap::new();
    for (position, c) in b.iter().enumerate() {
        index.entry(*c).or_default().push(position);
    }

    if b.len() >= AUTOJUNK_MIN_LEN {
        let popular = b.len() / 100 + 1;
        index.retain(|_, positions| positions.len() <= popular);
    }
    index
}

/// Longest common block of `a[a_lo..a_hi]` and `b[b_lo..b_hi]` as `(i, j, size)`.
///
/// Ties go to the block that starts earliest in `a`, then earliest in `b`.
#[allow(clippy::too_many_arguments)]
fn longest_block(
    a: &[char],
    b: &[char],
    index: &HashMap<char, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_runs = HashMap::new();
        if let Some(positions) = index.get(c) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_ending_at = next_runs;
    }

    // Extend across characters the index left out
    while best_i > a_lo && best_j > b_lo && a[best_i - 1] == b[best_j - 1] {
        best_i -= 1;
        best_j -= 1;
        best_size += 1;
    }
    while best_i + best_size < a_hi
        && best_j + best_size < b_hi
        && a[best_i + best_size] == b[best_j + best_size]
    {
        best_size += 1;
    }

    (best_i, best_j, best_size)
}

/// Adaptive-threshold search for the single best candidate
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatcher {
    config: MatcherConfig,
}

impl SimilarityMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// The one candidate the search isolates, or `None`.
    ///
    /// Candidates below the seed cutoff never enter the search. The cutoff
    /// then moves up while something survives it and back down (restoring the
    /// previous survivors) when nothing does, with a step that halves every
    /// round. The search gives up once the step no longer moves the cutoff,
    /// even if a lone winner exists at a cutoff it never tried.
    pub fn find_best_match<'a>(&self, query: &str, candidates: &[&'a str]) -> Option<&'a str> {
        let mut current: Vec<(&'a str, f64)> = Vec::new();
        for candidate in candidates {
            if current.iter().any(|(seen, _)| seen == candidate) {
                continue;
            }
            let ratio = similarity_ratio(candidate, query);
            if ratio >= self.config.seed_cutoff {
                current.push((*candidate, ratio));
            }
        }
        if current.is_empty() {
            return None;
        }

        let mut cutoff = self.config.initial_cutoff;
        let mut step = self.config.initial_step;

        while current.len() > 1 {
            let previous_cutoff = cutoff;
            let narrowed: Vec<(&'a str, f64)> = current
                .iter()
                .copied()
                .filter(|(_, ratio)| *ratio >= cutoff)
                .collect();

            if narrowed.is_empty() {
                cutoff -= step;
            } else {
                cutoff += step;
                current = narrowed;
            }
            step /= 2.0;

            if cutoff == previous_cutoff {
                return None;
            }
        }

        current.first().map(|(candidate, _)| *candidate)
    }
}
