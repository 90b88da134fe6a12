use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub intent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// What the conversation is currently about.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    pub current_topic: Option<String>,
    pub last_entity: Option<String>,
    pub awaiting_follow_up: bool,
}

impl ConversationContext {
    pub fn with_topic(topic: &str) -> Self {
        Self {
            current_topic: Some(topic.to_string()),
            ..Self::default()
        }
    }
}

/// Bounded window of recent turns plus the derived context.
///
/// `record_turn` is the only way to change either.
#[derive(Debug, Clone)]
pub struct ContextTracker {
    history: VecDeque<ConversationTurn>,
    capacity: usize,
    context: ConversationContext,
}

impl Default for ContextTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ContextTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity + 1),
            capacity,
            context: ConversationContext::default(),
        }
    }

    /// Appends a turn, evicting the oldest once the window is full. Only agent
    /// turns that carry an intent move `current_topic`.
    pub fn record_turn(&mut self, role: Role, content: impl Into<String>, intent: Option<&str>) {
        self.history.push_back(ConversationTurn {
            role,
            content: content.into(),
            intent: intent.map(str::to_string),
            timestamp: Utc::now(),
        });
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        if let (Role::Agent, Some(intent)) = (role, intent) {
            self.context.current_topic = Some(intent.to_string());
        }
    }

    pub fn current_context(&self) -> ConversationContext {
        self.context.clone()
    }

    pub fn last_user_turn(&self) -> Option<&ConversationTurn> {
        self.history.iter().rev().find(|t| t.role == Role::User)
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_turn_past_capacity() {
        let mut tracker = ContextTracker::new(10);
        for i in 0..11 {
            tracker.record_turn(Role::User, format!("turn {}", i), None);
        }
        assert_eq!(tracker.len(), 10);
        assert!(tracker.turns().all(|t| t.content != "turn 0"));
        assert_eq!(tracker.turns().next().map(|t| t.content.as_str()), Some("turn 1"));
    }

    #[test]
    fn only_agent_turns_with_intent_set_topic() {
        let mut tracker = ContextTracker::default();
        tracker.record_turn(Role::User, "show me projects", Some("projects"));
        assert_eq!(tracker.current_context().current_topic, None);

        tracker.record_turn(Role::Agent, "Here are the projects", Some("projects"));
        assert_eq!(tracker.current_context().current_topic.as_deref(), Some("projects"));

        tracker.record_turn(Role::Agent, "...", None);
        assert_eq!(tracker.current_context().current_topic.as_deref(), Some("projects"));

        tracker.record_turn(Role::Agent, "Skills", Some("skills"));
        assert_eq!(tracker.current_context(), ConversationContext::with_topic("skills"));
    }

    #[test]
    fn last_user_turn_skips_agent_turns() {
        let mut tracker = ContextTracker::default();
        assert!(tracker.last_user_turn().is_none());

        tracker.record_turn(Role::User, "first", None);
        tracker.record_turn(Role::User, "second", None);
        tracker.record_turn(Role::Agent, "reply", Some("about"));
        assert_eq!(tracker.last_user_turn().map(|t| t.content.as_str()), Some("second"));
    }

    #[test]
    fn snapshot_is_detached_from_later_turns() {
        let mut tracker = ContextTracker::default();
        tracker.record_turn(Role::Agent, "a", Some("projects"));
        let snapshot = tracker.current_context();
        tracker.record_turn(Role::Agent, "b", Some("skills"));
        assert_eq!(snapshot.current_topic.as_deref(), Some("projects"));
    }

    #[test]
    fn zero_capacity_keeps_latest_turn() {
        let mut tracker = ContextTracker::new(0);
        tracker.record_turn(Role::User, "a", None);
        tracker.record_turn(Role::User, "b", None);
        assert_eq!(tracker.capacity(), 1);
        assert_eq!(tracker.last_user_turn().map(|t| t.content.as_str()), Some("b"));
    }
}
