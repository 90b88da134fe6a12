use crate::distance::edit_distance;
use crate::model::{Catalogue, Entry};
use crate::tokenizer::tokenize;

pub const EXACT_WEIGHT: u32 = 10;
pub const PARTIAL_WEIGHT: u32 = 5;
pub const SHORT_PARTIAL_WEIGHT: u32 = 2;
pub const FUZZY_WEIGHT: u32 = 8;
pub const PHRASE_WEIGHT: u32 = 15;

/// Tokens must be longer than this for full partial credit and for fuzzy matching.
const SHORT_TOKEN_LEN: usize = 3;

/// User input prepared once per resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub lower: String,
    pub tokens: Vec<String>,
}

impl Query {
    pub fn new(input: &str) -> Self {
        Self {
            lower: input.to_lowercase(),
            tokens: tokenize(input),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredCandidate<'c> {
    pub entry: &'c Entry,
    pub score: u32,
}

/// Lexical relevance of `entry` to `query`.
pub fn score(query: &Query, entry: &Entry) -> u32 {
    let keywords = &entry.keywords;
    let mut total = 0;

    for token in &query.tokens {
        if keywords.iter().any(|k| k == token) {
            total += EXACT_WEIGHT;
            continue;
        }
        let long_token = token.chars().count() > SHORT_TOKEN_LEN;
        for keyword in keywords {
            if keyword.contains(token.as_str()) || token.contains(keyword.as_str()) {
                total += if long_token {
                    PARTIAL_WEIGHT
                } else {
                    SHORT_PARTIAL_WEIGHT
                };
            } else if long_token && edit_distance(token, keyword) <= 1 {
                total += FUZZY_WEIGHT;
            }
        }
    }

    // multi-word keywords found verbatim in the raw input
    total += keywords
        .iter()
        .filter(|k| k.contains(' ') && query.lower.contains(k.as_str()))
        .count() as u32
        * PHRASE_WEIGHT;

    total
}

/// Scores every entry and orders them by descending score.
///
/// The sort is stable, so equal scores keep catalogue order. Entries the
/// catalogue flagged as malformed always score zero.
pub fn rank<'c>(query: &Query, catalogue: &'c Catalogue) -> Vec<ScoredCandidate<'c>> {
    let mut candidates: Vec<ScoredCandidate<'c>> = catalogue
        .iter_scorable()
        .map(|(entry, scorable)| ScoredCandidate {
            entry,
            score: if scorable { score(query, entry) } else { 0 },
        })
        .collect();
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn score_of(input: &str, keywords: &[&str]) -> u32 {
        score(&Query::new(input), &Entry::new("e", keywords.iter().copied(), ""))
    }

    #[test]
    fn exact_token_match() {
        assert_eq!(score_of("projects", &["projects", "portfolio"]), 10);
        // an exact hit skips the partial and fuzzy checks for that token
        assert_eq!(score_of("project", &["project", "projects"]), 10);
    }

    #[test]
    fn partial_match_weighted_by_token_length() {
        assert_eq!(score_of("projects", &["project"]), 5);
        assert_eq!(score_of("cv", &["cvs"]), 2);
        // counted once per overlapping keyword
        assert_eq!(score_of("apps", &["app", "apps2"]), 10);
    }

    #[test]
    fn fuzzy_match_needs_long_tokens() {
        assert_eq!(score_of("skils", &["skills"]), 8);
        assert_eq!(score_of("pythn", &["python"]), 8);
        // one edit away on both sides of the length gate
        assert_eq!(score_of("gpx", &["gpa"]), 0);
        assert_eq!(score_of("tach", &["tech"]), 8);
        // two edits away never count
        assert_eq!(score_of("skilz", &["skills"]), 0);
    }

    #[test]
    fn partial_weight_switches_above_three_chars() {
        assert_eq!(score_of("app", &["apps"]), 2);
        assert_eq!(score_of("apps", &["appstore"]), 5);
    }

    #[test]
    fn phrase_bonus_is_independent_of_tokens() {
        // "generative ai" matches as a phrase; "ai" and "generative" also hit exactly
        assert_eq!(
            score_of("Do you know Generative AI?", &["generative ai", "generative", "ai"]),
            15 + 10 + 10
        );
        // the hyphen is stripped, so only the fuzzy signal fires
        assert_eq!(score_of("machine-learning", &["machine learning"]), 8);
    }

    #[test]
    fn no_tokens_no_score() {
        assert_eq!(score_of("", &["projects"]), 0);
        assert_eq!(score_of("?!", &["projects"]), 0);
    }

    #[test]
    fn rank_orders_by_score_then_catalogue_order() {
        let catalogue = Catalogue::new(vec![
            Entry::new("first", ["project"], ""),
            Entry::new("second", ["projects", "portfolio"], ""),
            Entry::new("third", ["project"], ""),
            Entry::new("broken", Vec::<String>::new(), ""),
        ]);
        let ranked = rank(&Query::new("tell me about your projects"), &catalogue);
        let ids: Vec<(&str, u32)> = ranked.iter().map(|c| (c.entry.id.as_str(), c.score)).collect();
        assert_eq!(ids, vec![("second", 10), ("first", 5), ("third", 5), ("broken", 0)]);
    }

    #[test]
    fn duplicate_ids_score_zero() {
        let catalogue = Catalogue::new(vec![
            Entry::new("contact", ["phone"], ""),
            Entry::new("contact", ["email"], ""),
        ]);
        let ranked = rank(&Query::new("email"), &catalogue);
        assert!(ranked.iter().all(|c| c.score == 0));
    }
}
