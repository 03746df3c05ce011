use crate::types::Frame;
use crate::types::constants::{LIVE_MATCHES_TOPIC, QUESTION_TOPIC_PREFIX, outbound};
use serde_json::json;

/// A logical feed the UI wants the server to push.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// The live match listing (`live-matches`)
    LiveMatches,
    /// Questions for one match (`questions:{matchId}`)
    Questions { match_id: String },
}

impl Subscription {
    pub fn questions(match_id: impl Into<String>) -> Self {
        Self::Questions {
            match_id: match_id.into(),
        }
    }

    /// Topic identifier
    pub fn topic(&self) -> String {
        match self {
            Self::LiveMatches => LIVE_MATCHES_TOPIC.to_string(),
            Self::Questions { match_id } => format!("{}{}", QUESTION_TOPIC_PREFIX, match_id),
        }
    }

    pub fn subscribe_frame(&self) -> Frame {
        match self {
            Self::LiveMatches => Frame::new(outbound::MATCHES_SUBSCRIBE, json!({})),
            Self::Questions { match_id } => {
                Frame::new(outbound::QUESTIONS_SUBSCRIBE, json!({ "matchId": match_id }))
            }
        }
    }

    pub fn unsubscribe_frame(&self) -> Frame {
        match self {
            Self::LiveMatches => Frame::new(outbound::MATCHES_UNSUBSCRIBE, json!({})),
            Self::Questions { match_id } => {
                Frame::new(outbound::QUESTIONS_UNSUBSCRIBE, json!({ "matchId": match_id }))
            }
        }
    }
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.topic())
    }
}

/// Subscriptions the client wants active, in insertion order, plus the
/// currently selected match.
#[derive(Debug, Default, Clone)]
pub struct SubscriptionRegistry {
    entries: Vec<Subscription>,
    selected_match: Option<String>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the entry was not present before.
    pub fn insert(&mut self, subscription: Subscription) -> bool {
        if self.entries.contains(&subscription) {
            return false;
        }
        self.entries.push(subscription);
        true
    }

    /// Returns `true` if the entry was present.
    pub fn remove(&mut self, subscription: &Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != subscription);
        if let Subscription::Questions { match_id } = subscription
            && self.selected_match.as_deref() == Some(match_id.as_str())
        {
            self.selected_match = None;
        }
        self.entries.len() != before
    }

    pub fn contains(&self, subscription: &Subscription) -> bool {
        self.entries.contains(subscription)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected_match(&self) -> Option<&str> {
        self.selected_match.as_deref()
    }

    pub(crate) fn set_selected_match(&mut self, match_id: Option<String>) {
        self.selected_match = match_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_ids() {
        assert_eq!(Subscription::LiveMatches.topic(), "live-matches");
        assert_eq!(Subscription::questions("m1").topic(), "questions:m1");
    }

    #[test]
    fn test_request_frames() {
        let frame = Subscription::questions("m7").subscribe_frame();
        assert_eq!(frame.event, "questions:subscribe");
        assert_eq!(frame.data, json!({ "matchId": "m7" }));

        let frame = Subscription::questions("m7").unsubscribe_frame();
        assert_eq!(frame.event, "questions:unsubscribe");
        assert_eq!(frame.data, json!({ "matchId": "m7" }));

        assert_eq!(
            Subscription::LiveMatches.subscribe_frame().event,
            "matches:subscribe"
        );
        assert_eq!(
            Subscription::LiveMatches.unsubscribe_frame().event,
            "matches:unsubscribe"
        );
    }

    #[test]
    fn test_registry_keeps_insertion_order_without_duplicates() {
        let mut registry = SubscriptionRegistry::new();
        assert!(registry.insert(Subscription::LiveMatches));
        assert!(registry.insert(Subscription::questions("m1")));
        assert!(!registry.insert(Subscription::LiveMatches));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&Subscription::questions("m1")));
        assert!(!registry.contains(&Subscription::questions("m2")));

        let topics: Vec<String> = registry.iter().map(Subscription::topic).collect();
        assert_eq!(topics, vec!["live-matches", "questions:m1"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert(Subscription::questions("m1"));
        assert!(registry.remove(&Subscription::questions("m1")));
        assert!(!registry.remove(&Subscription::questions("m1")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_removing_selected_match_clears_selection() {
        let mut registry = SubscriptionRegistry::new();
        registry.insert(Subscription::questions("m1"));
        registry.set_selected_match(Some("m1".to_string()));
        registry.remove(&Subscription::questions("m1"));
        assert_eq!(registry.selected_match(), None);
    }
}
