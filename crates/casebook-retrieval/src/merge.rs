//! Merging of ranked result lists from independent search paths.

use casebook_protocol::{ConversationId, ScoredConversation};
use std::collections::HashMap;

/// Merge two ranked lists into one.
///
/// Results are keyed by conversation id; when both lists contain an id the
/// entry with the higher score is kept (the vector entry on ties). The union
/// is sorted by score, descending, with ties in first-seen order, and
/// truncated to `limit`.
pub fn merge_results(
    vector: Vec<ScoredConversation>,
    text: Vec<ScoredConversation>,
    limit: usize,
) -> Vec<ScoredConversation> {
    let mut merged: Vec<ScoredConversation> = Vec::with_capacity(vector.len() + text.len());
    let mut positions: HashMap<ConversationId, usize> = HashMap::new();

    for candidate in vector.into_iter().chain(text) {
        match positions.get(candidate.id()) {
            Some(&idx) => {
                if rank_key(candidate.score) > rank_key(merged[idx].score) {
                    merged[idx] = candidate;
                }
            }
            None => {
                positions.insert(candidate.id().clone(), merged.len());
                merged.push(candidate);
            }
        }
    }

    merged.sort_by(|a, b| rank_key(b.score).total_cmp(&rank_key(a.score)));
    merged.truncate(limit);
    merged
}

/// NaN scores rank below everything else.
fn rank_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}
