//! Lexical FAQ engine: picks the best knowledge-base entry for a user message
//! using keyword, substring, fuzzy and phrase signals, with intent shortcuts
//! and conversational fallback.

pub mod conversation;
pub mod distance;
pub mod error;
pub mod intent;
pub mod model;
pub mod resolver;
pub mod scorer;
pub mod server;
pub mod settings;
pub mod simulation;
pub mod system;
pub mod tokenizer;

pub use conversation::{ContextTracker, ConversationContext, ConversationTurn, Role};
pub use error::{FaqError, Result};
pub use intent::{IntentAction, IntentRule, IntentTable, TopicRoute};
pub use model::{Catalogue, CatalogueWarning, Entry};
pub use resolver::{Match, MatchKind, Resolution, Resolver, ResolverConfig};
pub use settings::Settings;
pub use system::{FaqSystem, Reply, ReplyKind};
