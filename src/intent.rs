//! Fixed intent table consulted before scoring.
//!
//! Rules are checked in declaration order against the lowercased raw input by
//! substring containment. The first rule that redirects to an entry present in
//! the catalogue wins, which makes precedence a property of the table rather
//! than of branch order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{FaqError, Result};
use crate::model::{Catalogue, Entry};

/// What a detected intent does.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntentAction {
    /// Resolve straight to this entry id, bypassing scoring.
    Redirect { entry: String },
    /// Small talk answered with a canned reply by the turn handler.
    Social {
        reply: String,
        #[serde(default)]
        follow_ups: Vec<String>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IntentRule {
    pub name: String,
    pub triggers: Vec<String>,
    #[serde(flatten)]
    pub action: IntentAction,
}

impl IntentRule {
    pub fn redirect<I, K>(name: &str, triggers: I, entry: &str) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            name: name.to_string(),
            triggers: triggers.into_iter().map(Into::into).collect(),
            action: IntentAction::Redirect {
                entry: entry.to_string(),
            },
        }
    }

    pub fn social<I, K>(name: &str, triggers: I, reply: &str) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            name: name.to_string(),
            triggers: triggers.into_iter().map(Into::into).collect(),
            action: IntentAction::Social {
                reply: reply.to_string(),
                follow_ups: Vec::new(),
            },
        }
    }

    /// Number of triggers found anywhere in `lower_input`.
    pub fn match_count(&self, lower_input: &str) -> usize {
        self.triggers
            .iter()
            .filter(|t| lower_input.contains(t.as_str()))
            .count()
    }

    pub fn target(&self) -> Option<&str> {
        match &self.action {
            IntentAction::Redirect { entry } => Some(entry),
            IntentAction::Social { .. } => None,
        }
    }
}

/// Maps conversation topics back to a canonical entry for contextual fallback.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TopicRoute {
    pub topics: Vec<String>,
    pub entry: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentHit<'t> {
    pub rule: &'t IntentRule,
    pub matches: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct IntentTable {
    rules: Vec<IntentRule>,
    #[serde(default)]
    topic_routes: Vec<TopicRoute>,
}

impl IntentTable {
    pub fn new(rules: Vec<IntentRule>, topic_routes: Vec<TopicRoute>) -> Result<Self> {
        let mut names = HashSet::new();
        for rule in &rules {
            if !names.insert(rule.name.as_str()) {
                return Err(FaqError::DuplicateIntent(rule.name.clone()));
            }
        }

        let rules = rules
            .into_iter()
            .map(|mut rule| {
                rule.triggers = rule
                    .triggers
                    .iter()
                    .map(|t| t.to_lowercase())
                    .filter(|t| !t.trim().is_empty())
                    .collect();
                rule
            })
            .collect();
        Ok(Self { rules, topic_routes })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|source| FaqError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;
        let raw: IntentTable = serde_json::from_str(&content).map_err(|source| FaqError::Json {
            path: path_ref.display().to_string(),
            source,
        })?;
        let table = Self::new(raw.rules, raw.topic_routes)?;
        log::info!(
            "Loaded {} intents and {} topic routes from {:?}",
            table.rules.len(),
            table.topic_routes.len(),
            path_ref
        );
        Ok(table)
    }

    /// Fails on the first redirect or topic route whose entry is missing.
    pub fn validate(&self, catalogue: &Catalogue) -> Result<()> {
        for rule in &self.rules {
            if let Some(entry) = rule.target() {
                if !catalogue.contains(entry) {
                    return Err(FaqError::UnknownEntry {
                        intent: rule.name.clone(),
                        entry: entry.to_string(),
                    });
                }
            }
        }
        for route in &self.topic_routes {
            if !catalogue.contains(&route.entry) {
                return Err(FaqError::UnknownEntry {
                    intent: route.topics.join("|"),
                    entry: route.entry.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Every rule with at least one trigger in `lower_input`, in table order.
    pub fn detect<'t>(&'t self, lower_input: &str) -> Vec<IntentHit<'t>> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let matches = rule.match_count(lower_input);
                (matches > 0).then_some(IntentHit { rule, matches })
            })
            .collect()
    }

    /// First detected redirect whose entry exists in `catalogue`.
    pub fn intercept<'t, 'c>(
        &'t self,
        lower_input: &str,
        catalogue: &'c Catalogue,
    ) -> Option<(&'t IntentRule, &'c Entry)> {
        first_redirect(&self.detect(lower_input), catalogue)
    }

    /// First detected social intent.
    pub fn social(&self, lower_input: &str) -> Option<&IntentRule> {
        first_social(&self.detect(lower_input))
    }

    /// Canonical entry for a conversation topic, if one is routed.
    pub fn route_topic<'c>(&self, topic: &str, catalogue: &'c Catalogue) -> Option<&'c Entry> {
        self.topic_routes
            .iter()
            .find(|route| route.topics.iter().any(|t| t == topic))
            .and_then(|route| catalogue.get(&route.entry))
    }
}

/// The first hit, in table order, that redirects to an entry present in `catalogue`.
pub fn first_redirect<'t, 'c>(
    hits: &[IntentHit<'t>],
    catalogue: &'c Catalogue,
) -> Option<(&'t IntentRule, &'c Entry)> {
    hits.iter().find_map(|hit| {
        hit.rule
            .target()
            .and_then(|id| catalogue.get(id))
            .map(|entry| (hit.rule, entry))
    })
}

/// The first social hit, in table order.
pub fn first_social<'t>(hits: &[IntentHit<'t>]) -> Option<&'t IntentRule> {
    hits.iter()
        .map(|hit| hit.rule)
        .find(|rule| matches!(rule.action, IntentAction::Social { .. }))
}
