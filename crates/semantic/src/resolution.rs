// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Name suggestions with fuzzy matching
//!
//! When a reference does not resolve, the error carries a short list of
//! known names that look like what the user meant:
//! - Case-insensitive matches rank first
//! - Then typo corrections within a small Levenshtein distance
//! - Then names sharing a prefix with the query

use strsim::{levenshtein, normalized_levenshtein};

/// How a candidate matches the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    CaseInsensitive,
    /// Typo correction
    Fuzzy { distance: usize },
    /// Shared prefix (e.g. `order_da` vs `order_date`)
    PrefixMatch,
}

/// A possible intended name with its relevance
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub match_kind: MatchKind,
    /// 0.0 to 1.0, higher is more relevant
    pub relevance_score: f64,
}

/// Configuration for fuzzy matching
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    /// Maximum Levenshtein distance for fuzzy matching (default: 2)
    pub max_distance: usize,
    /// Minimum similarity score (0.0-1.0) for suggestions (default: 0.5)
    pub min_similarity: f64,
    /// Maximum number of suggestions to return (default: 3)
    pub max_suggestions: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_distance: 2,
            min_similarity: 0.5,
            max_suggestions: 3,
        }
    }
}

impl ResolutionConfig {
    fn match_kind(&self, query: &str, name: &str) -> Option<MatchKind> {
        if query.eq_ignore_ascii_case(name) {
            return Some(MatchKind::CaseInsensitive);
        }
        let distance = levenshtein(&query.to_lowercase(), &name.to_lowercase());
        if distance <= self.max_distance {
            return Some(MatchKind::Fuzzy { distance });
        }
        let shared = query
            .chars()
            .zip(name.chars())
            .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
            .count();
        if shared >= 3 {
            return Some(MatchKind::PrefixMatch);
        }
        None
    }

    fn score(&self, query: &str, name: &str, kind: MatchKind) -> f64 {
        let score = match kind {
            MatchKind::CaseInsensitive => 0.95,
            MatchKind::Fuzzy { distance } => {
                let penalty = 1.0 - (distance as f64 / (self.max_distance as f64 + 1.0));
                normalized_levenshtein(query, name) * 0.5 + penalty * 0.5
            }
            MatchKind::PrefixMatch => (query.len().min(name.len()) as f64 / name.len() as f64) * 0.85,
        };
        score.clamp(0.0, 1.0)
    }

    /// Ranked candidates for `query` among `names`
    pub fn candidates<'a>(
        &self,
        query: &str,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = names
            .into_iter()
            .filter(|name| *name != query)
            .filter_map(|name| {
                let match_kind = self.match_kind(query, name)?;
                let relevance_score = self.score(query, name, match_kind);
                (relevance_score >= self.min_similarity).then(|| Candidate {
                    name: name.to_string(),
                    match_kind,
                    relevance_score,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| a.name.cmp(&b.name))
        });
        candidates.dedup_by(|a, b| a.name == b.name);
        candidates.truncate(self.max_suggestions);
        candidates
    }

    /// Names only, best first
    pub fn suggest<'a>(&self, query: &str, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        self.candidates(query, names)
            .into_iter()
            .map(|c| c.name)
            .collect()
    }
}
