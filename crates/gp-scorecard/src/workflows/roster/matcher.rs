use serde::{Deserialize, Serialize};

use super::normalizer::comparison_key;

/// Similarity at or above which two names are treated as the same presenter.
pub const SAME_PERSON_THRESHOLD: f64 = 0.85;

const EXACT_ROSTER_SCORE: f64 = 100.0;
const CONTAINED_ROSTER_SCORE: f64 = 75.0;
const PARTIAL_ROSTER_CEILING: f64 = 50.0;

/// Candidate name paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    #[serde(rename = "match")]
    pub candidate: String,
    pub score: f64,
}

/// Standard edit distance over characters; insert, delete, and substitute all cost 1.
pub fn levenshtein_distance(left: &str, right: &str) -> usize {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();

    if left.is_empty() {
        return right.len();
    }
    if right.is_empty() {
        return left.len();
    }

    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0; right.len() + 1];

    for (i, left_char) in left.iter().enumerate() {
        current[0] = i + 1;
        for (j, right_char) in right.iter().enumerate() {
            current[j + 1] = if left_char == right_char {
                previous[j]
            } else {
                1 + previous[j].min(previous[j + 1]).min(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}

/// `1 - distance / max_len` on the lowercased inputs, in `[0, 1]`.
pub fn similarity(left: &str, right: &str) -> f64 {
    let left = left.to_lowercase();
    let right = right.to_lowercase();
    let max_len = left.chars().count().max(right.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(&left, &right);
    1.0 - distance as f64 / max_len as f64
}

/// Ranks roster candidates by edit-distance similarity of their comparison keys.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(SAME_PERSON_THRESHOLD)
    }
}

impl FuzzyMatcher {
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            SAME_PERSON_THRESHOLD
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Every candidate with a positive score, best first. Ties keep input order.
    pub fn rank<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Vec<NameMatch> {
        let query_key = comparison_key(query);
        let mut matches: Vec<NameMatch> = candidates
            .iter()
            .map(|candidate| {
                let candidate = candidate.as_ref();
                NameMatch {
                    candidate: candidate.to_string(),
                    score: similarity(&query_key, &comparison_key(candidate)),
                }
            })
            .filter(|entry| entry.score > 0.0)
            .collect();

        sort_by_score(&mut matches);
        matches
    }

    /// Highest ranked candidate, provided it clears the same-person threshold.
    pub fn best_match<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Option<NameMatch> {
        self.rank(query, candidates)
            .into_iter()
            .next()
            .filter(|entry| entry.score >= self.threshold)
    }

    pub fn is_same_person(&self, left: &str, right: &str) -> bool {
        similarity(&comparison_key(left), &comparison_key(right)) >= self.threshold
    }
}

/// Coarse 0-100 roster lookup: exact match, containment, then word-prefix overlap.
pub fn roster_match<S: AsRef<str>>(query: &str, candidates: &[S]) -> Vec<NameMatch> {
    let query_key = comparison_key(query);
    let query_words: Vec<&str> = query_key.split(' ').collect();

    let mut matches: Vec<NameMatch> = candidates
        .iter()
        .map(|candidate| {
            let candidate = candidate.as_ref();
            let candidate_key = comparison_key(candidate);

            let score = if candidate_key == query_key {
                EXACT_ROSTER_SCORE
            } else if candidate_key.contains(&query_key) {
                CONTAINED_ROSTER_SCORE
            } else {
                let candidate_words: Vec<&str> = candidate_key.split(' ').collect();
                let hits = query_words
                    .iter()
                    .filter(|word| {
                        candidate_words
                            .iter()
                            .any(|candidate_word| candidate_word.starts_with(*word))
                    })
                    .count();
                hits as f64 / query_words.len() as f64 * PARTIAL_ROSTER_CEILING
            };

            NameMatch {
                candidate: candidate.to_string(),
                score,
            }
        })
        .filter(|entry| entry.score > 0.0)
        .collect();

    sort_by_score(&mut matches);
    matches
}

fn sort_by_score(matches: &mut [NameMatch]) {
    // sort_by is stable, so equal scores keep candidate order.
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
}
