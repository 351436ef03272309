//! Near-duplicate detection by edit distance.

use serde::{Deserialize, Serialize};

use crate::input::Value;

/// Fuzzy duplicate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Compute near-duplicate rates for text columns.
    pub enabled: bool,
    /// Minimum similarity (0-1) for two values to count as the same.
    pub similarity_threshold: f64,
    /// Non-blank values compared per column; the cost is quadratic.
    pub row_cap: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            similarity_threshold: 0.9,
            row_cap: 200,
        }
    }
}

/// Levenshtein edit distance over chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

/// `1 - distance / max_len`; two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / max_len as f64
}

/// Comparison key: trimmed, lowercased display string.
pub fn fuzzy_key(value: &Value) -> Option<String> {
    value.key().map(|k| k.to_lowercase())
}

/// Percentage of value pairs whose similarity reaches the threshold, over
/// the first `row_cap` non-blank values.
pub fn near_duplicate_pct(values: &[Value], config: &FuzzyConfig) -> f64 {
    let keys: Vec<String> = values
        .iter()
        .filter_map(fuzzy_key)
        .take(config.row_cap)
        .collect();

    let n = keys.len();
    if n < 2 {
        return 0.0;
    }

    let mut near = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            if similarity(&keys[i], &keys[j]) >= config.similarity_threshold {
                near += 1;
            }
        }
    }

    let pairs = n * (n - 1) / 2;
    100.0 * near as f64 / pairs as f64
}
