//! Presenter name canonicalisation and roster matching.

mod matcher;
mod normalizer;

pub use matcher::{
    levenshtein_distance, roster_match, similarity, FuzzyMatcher, NameMatch,
    SAME_PERSON_THRESHOLD,
};
pub use normalizer::{comparison_key, normalize_name};
