//! Similarity scores in `[0, 100]` based on the normalized Indel distance.
//!
//! `ratio` compares two strings as a whole. `partial_ratio` slides the
//! shorter string over the longer one and keeps the best alignment, so a
//! component name embedded in a longer observation still scores high.

/// Whole-string similarity: `100 * 2 * LCS / (|a| + |b|)`
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best similarity of the shorter string against any alignment window of
/// the longer one. Comparison is exact; callers fold case beforehand.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    partial_ratio_chars(&a, &b)
}

pub(crate) fn partial_ratio_chars(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return if a.is_empty() && b.is_empty() { 100.0 } else { 0.0 };
    }

    match a.len().cmp(&b.len()) {
        std::cmp::Ordering::Less => best_alignment(a, b),
        std::cmp::Ordering::Greater => best_alignment(b, a),
        // Equal lengths: the partial edge windows differ per direction
        std::cmp::Ordering::Equal => best_alignment(a, b).max(best_alignment(b, a)),
    }
}

pub(crate) fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

/// Score `needle` against every window of `haystack`: the partial windows
/// at the left edge, every full-length window, and the partial windows at
/// the right edge. Requires `needle.len() <= haystack.len()`.
fn best_alignment(needle: &[char], haystack: &[char]) -> f64 {
    let m = needle.len();
    let n = haystack.len();
    let mut best: f64 = 0.0;

    for k in 1..m {
        best = best.max(ratio_chars(needle, &haystack[..k]));
    }

    for start in 0..=(n - m) {
        best = best.max(ratio_chars(needle, &haystack[start..start + m]));
        if best >= 100.0 {
            return 100.0;
        }
    }

    for start in (n - m + 1)..n {
        best = best.max(ratio_chars(needle, &haystack[start..]));
    }

    best
}

/// Length of the longest common subsequence (two-row dynamic programming)
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
