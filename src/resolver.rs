//! Turns one user input into an entry or an explicit no-match.
//!
//! Order of evaluation:
//! 1. intent interception (a redirect rule fires, scoring is skipped)
//! 2. lexical scoring of the whole catalogue
//! 3. confident match at or above the threshold
//! 4. low-confidence salvage of the best entry with any overlap
//! 5. contextual fallback on a continuation cue when nothing overlapped
//! 6. no match

use serde::{Deserialize, Serialize};

use crate::conversation::ConversationContext;
use crate::intent::{first_redirect, first_social, IntentHit, IntentRule, IntentTable};
use crate::model::{Catalogue, Entry};
use crate::scorer::{rank, Query, ScoredCandidate};

pub const DEFAULT_SCORE_THRESHOLD: u32 = 3;
pub const DEFAULT_CONTINUATION_CUES: &[&str] = &["more", "detail", "tell me"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ResolverConfig {
    pub score_threshold: u32,
    pub continuation_cues: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            continuation_cues: DEFAULT_CONTINUATION_CUES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Intercepted,
    Confident,
    Salvaged,
    Contextual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'c> {
    pub entry: &'c Entry,
    /// Lexical score; zero for intercepted and contextual matches.
    pub score: u32,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'c> {
    Matched(Match<'c>),
    NoMatch,
}

impl<'c> Resolution<'c> {
    pub fn entry(&self) -> Option<&'c Entry> {
        match self {
            Resolution::Matched(m) => Some(m.entry),
            Resolution::NoMatch => None,
        }
    }

    pub fn kind(&self) -> Option<MatchKind> {
        match self {
            Resolution::Matched(m) => Some(m.kind),
            Resolution::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }
}

/// Everything the resolver looked at for one input.
#[derive(Debug, Clone)]
pub struct Trace<'t, 'c> {
    pub detected: Vec<IntentHit<'t>>,
    pub social: Option<&'t IntentRule>,
    /// Empty when an intent intercepted the input.
    pub candidates: Vec<ScoredCandidate<'c>>,
    pub resolution: Resolution<'c>,
}

impl Trace<'_, '_> {
    pub fn top_score(&self) -> u32 {
        self.candidates.first().map_or(0, |c| c.score)
    }
}

#[derive(Debug, Clone)]
pub struct Resolver {
    intents: IntentTable,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(intents: IntentTable, config: ResolverConfig) -> Self {
        Self { intents, config }
    }

    pub fn intents(&self) -> &IntentTable {
        &self.intents
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn resolve<'c>(
        &self,
        input: &str,
        catalogue: &'c Catalogue,
        context: &ConversationContext,
    ) -> Resolution<'c> {
        self.trace(input, catalogue, context).resolution
    }

    pub fn trace<'t, 'c>(
        &'t self,
        input: &str,
        catalogue: &'c Catalogue,
        context: &ConversationContext,
    ) -> Trace<'t, 'c> {
        let query = Query::new(input);
        let detected = self.intents.detect(&query.lower);
        let social = first_social(&detected);

        if let Some((rule, entry)) = first_redirect(&detected, catalogue) {
            log::debug!("Direct intent match: {} -> {}", rule.name, entry.id);
            return Trace {
                detected,
                social,
                candidates: Vec::new(),
                resolution: Resolution::Matched(Match {
                    entry,
                    score: 0,
                    kind: MatchKind::Intercepted,
                }),
            };
        }

        let candidates = rank(&query, catalogue);
        let resolution = self.decide(&query, &candidates, catalogue, context);
        Trace {
            detected,
            social,
            candidates,
            resolution,
        }
    }

    fn decide<'c>(
        &self,
        query: &Query,
        candidates: &[ScoredCandidate<'c>],
        catalogue: &'c Catalogue,
        context: &ConversationContext,
    ) -> Resolution<'c> {
        if let Some(best) = candidates.first().filter(|c| c.score > 0) {
            let kind = if best.score >= self.config.score_threshold {
                log::debug!("Best match: {} (score {})", best.entry.id, best.score);
                MatchKind::Confident
            } else {
                log::debug!("Low score {} for {}, answering anyway", best.score, best.entry.id);
                MatchKind::Salvaged
            };
            return Resolution::Matched(Match {
                entry: best.entry,
                score: best.score,
                kind,
            });
        }

        let topic = context.current_topic.as_deref();
        log::debug!("No lexical overlap, context topic: {:?}", topic);
        let continues = self
            .config
            .continuation_cues
            .iter()
            .any(|cue| query.lower.contains(cue.as_str()));
        if continues {
            if let Some(entry) = topic.and_then(|t| self.intents.route_topic(t, catalogue)) {
                return Resolution::Matched(Match {
                    entry,
                    score: 0,
                    kind: MatchKind::Contextual,
                });
            }
        }
        Resolution::NoMatch
    }
}
