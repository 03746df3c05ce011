use crate::types::constants::{MATCH_TOPIC_PREFIX, QUESTION_TOPIC_PREFIX, inbound};
use serde::Serialize;

/// Notification class an inbound event name belongs to.
///
/// Classification is by case-sensitive name prefix; every name maps to exactly one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventClass {
    /// Names starting with `matches:`
    Match,
    /// Names starting with `questions:`
    Question,
    /// Anything else
    Generic,
}

impl EventClass {
    pub fn classify(event: &str) -> Self {
        if event.starts_with(MATCH_TOPIC_PREFIX) {
            Self::Match
        } else if event.starts_with(QUESTION_TOPIC_PREFIX) {
            Self::Question
        } else {
            Self::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Question => "question",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for EventClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-safe inbound push events
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PushEvent {
    /// Full live-match listing
    MatchesData,
    /// One or more matches changed
    MatchesUpdate,
    /// A match went live
    MatchesLive,
    /// A match was added
    MatchesNew,
    /// A match ended
    MatchesFinished,
    /// A batch of questions was generated for a match
    QuestionsGenerated,
    /// New questions for a match
    QuestionsNew,
    /// Any other name, routed by prefix
    Other(String),
}

impl PushEvent {
    pub fn parse(s: &str) -> Self {
        match s {
            inbound::MATCHES_DATA => Self::MatchesData,
            inbound::MATCHES_UPDATE => Self::MatchesUpdate,
            inbound::MATCHES_LIVE => Self::MatchesLive,
            inbound::MATCHES_NEW => Self::MatchesNew,
            inbound::MATCHES_FINISHED => Self::MatchesFinished,
            inbound::QUESTIONS_GENERATED => Self::QuestionsGenerated,
            inbound::QUESTIONS_NEW => Self::QuestionsNew,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::MatchesData => inbound::MATCHES_DATA,
            Self::MatchesUpdate => inbound::MATCHES_UPDATE,
            Self::MatchesLive => inbound::MATCHES_LIVE,
            Self::MatchesNew => inbound::MATCHES_NEW,
            Self::MatchesFinished => inbound::MATCHES_FINISHED,
            Self::QuestionsGenerated => inbound::QUESTIONS_GENERATED,
            Self::QuestionsNew => inbound::QUESTIONS_NEW,
            Self::Other(s) => s,
        }
    }

    pub fn class(&self) -> EventClass {
        EventClass::classify(self.as_str())
    }
}

impl std::fmt::Display for PushEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
