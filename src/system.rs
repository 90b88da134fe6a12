use parking_lot::RwLock;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::conversation::{ContextTracker, Role};
use crate::error::Result;
use crate::intent::{IntentAction, IntentTable};
use crate::model::Catalogue;
use crate::resolver::{MatchKind, Resolution, Resolver, ResolverConfig};
use crate::settings::Settings;

pub const DECLINE_RESPONSE: &str = "I'm not exactly sure about that, but the <b>Portfolio</b> may have it. \
Try asking about <b>Projects</b>, <b>Skills</b>, or <b>Contact Info</b>.";
pub const DEFAULT_FOLLOW_UPS: &[&str] = &["Skills", "Projects", "Publications", "Contact"];
/// Intent recorded on the agent turn when nothing matched.
pub const FALLBACK_INTENT: &str = "fallback";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Social,
    Intercepted,
    Confident,
    Salvaged,
    Contextual,
    NoMatch,
}

impl From<MatchKind> for ReplyKind {
    fn from(kind: MatchKind) -> Self {
        match kind {
            MatchKind::Intercepted => ReplyKind::Intercepted,
            MatchKind::Confident => ReplyKind::Confident,
            MatchKind::Salvaged => ReplyKind::Salvaged,
            MatchKind::Contextual => ReplyKind::Contextual,
        }
    }
}

/// What the presentation layer should show for one user message.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub response: String,
    pub follow_ups: Vec<String>,
    /// Entry id, or the social intent name for small talk.
    pub matched: Option<String>,
    pub kind: ReplyKind,
}

/// The conversational FAQ: a replaceable catalogue snapshot plus the resolver over it.
pub struct FaqSystem {
    catalogue: RwLock<Arc<Catalogue>>,
    catalogue_file: Option<PathBuf>,
    resolver: Resolver,
    default_follow_ups: Vec<String>,
}

impl FaqSystem {
    /// Fails if the intent table references entries the catalogue lacks.
    pub fn new(catalogue: Catalogue, intents: IntentTable, config: ResolverConfig) -> Result<Self> {
        intents.validate(&catalogue)?;
        Ok(Self {
            catalogue: RwLock::new(Arc::new(catalogue)),
            catalogue_file: None,
            resolver: Resolver::new(intents, config),
            default_follow_ups: DEFAULT_FOLLOW_UPS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let catalogue = Catalogue::load_from_file(&settings.data.catalogue_file)?;
        let intents = IntentTable::load_from_file(&settings.data.intents_file)?;
        let mut system = Self::new(catalogue, intents, settings.resolver_config())?;
        system.catalogue_file = Some(settings.data.catalogue_file.clone());
        Ok(system)
    }

    /// The current snapshot. Callers holding it are unaffected by later replacement.
    pub fn catalogue(&self) -> Arc<Catalogue> {
        Arc::clone(&self.catalogue.read())
    }

    /// Swaps in a new snapshot; resolutions already running keep the old one.
    ///
    /// Redirects whose entry disappeared are logged and skipped at resolution time.
    pub fn replace_catalogue(&self, catalogue: Catalogue) {
        if let Err(e) = self.resolver.intents().validate(&catalogue) {
            log::warn!("Replacement catalogue: {}", e);
        }
        let mut current = self.catalogue.write();
        log::info!(
            "Replacing catalogue: {} -> {} entries",
            current.len(),
            catalogue.len()
        );
        *current = Arc::new(catalogue);
    }

    /// Re-reads `path` and replaces the catalogue with it. Returns the new entry count.
    pub fn reload_catalogue_from<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let catalogue = Catalogue::load_from_file(path)?;
        let len = catalogue.len();
        self.replace_catalogue(catalogue);
        Ok(len)
    }

    /// Re-reads the catalogue file this system was configured with.
    ///
    /// `None` when the system was built from an in-memory catalogue.
    pub fn reload_catalogue(&self) -> Option<Result<usize>> {
        self.catalogue_file
            .as_deref()
            .map(|path| self.reload_catalogue_from(path))
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Handles one user message and records both sides of the exchange.
    ///
    /// Blank input is ignored.
    pub fn handle_user_input(&self, tracker: &mut ContextTracker, input: &str) -> Option<Reply> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        tracker.record_turn(Role::User, input, None);

        let lower_input = input.to_lowercase();
        if let Some(rule) = self.resolver.intents().social(&lower_input) {
            if let IntentAction::Social { reply, follow_ups } = &rule.action {
                tracker.record_turn(Role::Agent, reply.as_str(), Some(rule.name.as_str()));
                return Some(Reply {
                    response: reply.clone(),
                    follow_ups: follow_ups.clone(),
                    matched: Some(rule.name.clone()),
                    kind: ReplyKind::Social,
                });
            }
        }

        let catalogue = self.catalogue();
        let context = tracker.current_context();
        let trace = self.resolver.trace(input, &catalogue, &context);
        log::debug!(
            "Resolved {:?}: intents {:?}, top score {}, outcome {:?}",
            input,
            trace.detected.iter().map(|h| h.rule.name.as_str()).collect::<Vec<_>>(),
            trace.top_score(),
            trace.resolution.entry().map(|e| e.id.as_str())
        );

        let reply = match trace.resolution {
            Resolution::Matched(found) => {
                let entry = found.entry;
                tracker.record_turn(Role::Agent, entry.response.as_str(), Some(entry.topic()));
                let follow_ups = if entry.follow_ups.is_empty() {
                    self.default_follow_ups.clone()
                } else {
                    entry.follow_ups.clone()
                };
                Reply {
                    response: entry.response.clone(),
                    follow_ups,
                    matched: Some(entry.id.clone()),
                    kind: found.kind.into(),
                }
            }
            Resolution::NoMatch => {
                tracker.record_turn(Role::Agent, DECLINE_RESPONSE, Some(FALLBACK_INTENT));
                Reply {
                    response: DECLINE_RESPONSE.to_string(),
                    follow_ups: self.default_follow_ups.clone(),
                    matched: None,
                    kind: ReplyKind::NoMatch,
                }
            }
        };
        Some(reply)
    }
}
