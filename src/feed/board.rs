use super::models::{Match, Question};
use crate::messaging::{Notification, PushEvent};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

const MATCH_ID_KEYS: &[&str] = &["id", "matchId", "fixtureId"];
const QUESTION_ID_KEYS: &[&str] = &["id", "questionId"];

/// Deduplicated, incrementally updated view of matches and their questions.
///
/// Matches keep the order in which they were first seen (or the order of the
/// last full listing); questions keep first-arrival order per match. A record
/// that arrives again replaces the earlier one in place.
#[derive(Debug, Default, Clone)]
pub struct LiveBoard {
    matches: Vec<Match>,
    questions: HashMap<String, Vec<Question>>,
}

impl LiveBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one notification into the view. Returns whether anything changed.
    pub fn apply(&mut self, notification: &Notification) -> bool {
        self.apply_event(&PushEvent::parse(&notification.event_type), &notification.data)
    }

    pub fn apply_event(&mut self, event: &PushEvent, data: &Value) -> bool {
        match event {
            PushEvent::MatchesData => {
                let incoming = parse_items::<Match>(data, "matches", MATCH_ID_KEYS, None);
                self.matches.clear();
                for item in incoming {
                    self.upsert_match(item);
                }
                true
            }
            PushEvent::MatchesUpdate | PushEvent::MatchesNew => {
                let incoming = parse_items::<Match>(data, "matches", MATCH_ID_KEYS, None);
                let changed = !incoming.is_empty();
                for item in incoming {
                    self.upsert_match(item);
                }
                changed
            }
            PushEvent::MatchesLive => self.upsert_with_status(data, "live", false),
            PushEvent::MatchesFinished => self.upsert_with_status(data, "finished", true),
            PushEvent::QuestionsGenerated | PushEvent::QuestionsNew => {
                let parent = data.get("matchId").and_then(id_string);
                let key = if data.get("question").is_some_and(Value::is_object) {
                    "question"
                } else {
                    "questions"
                };
                let incoming =
                    parse_items::<Question>(data, key, QUESTION_ID_KEYS, parent.as_deref());
                let mut changed = false;
                for question in incoming {
                    if question.match_id.is_empty() {
                        tracing::warn!("Skipping question {} without a match id", question.id);
                        continue;
                    }
                    self.upsert_question(question);
                    changed = true;
                }
                changed
            }
            PushEvent::Other(name) => {
                tracing::debug!("Board ignores '{}'", name);
                false
            }
        }
    }

    /// Upserts each item, forcing `status` when the item has none (or always, if `force`).
    fn upsert_with_status(&mut self, data: &Value, status: &str, force: bool) -> bool {
        let incoming = parse_items::<Match>(data, "matches", MATCH_ID_KEYS, None);
        let changed = !incoming.is_empty();
        for mut item in incoming {
            if force || item.status.is_none() {
                item.status = Some(status.to_string());
            }
            self.upsert_match(item);
        }
        changed
    }

    fn upsert_match(&mut self, item: Match) {
        match self.matches.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.matches.push(item),
        }
    }

    fn upsert_question(&mut self, question: Question) {
        let list = self.questions.entry(question.match_id.clone()).or_default();
        match list.iter_mut().find(|existing| existing.id == question.id) {
            Some(existing) => *existing = question,
            None => list.push(question),
        }
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn live_matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| !m.is_finished())
    }

    pub fn get_match(&self, match_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub fn questions(&self, match_id: &str) -> &[Question] {
        self.questions
            .get(match_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn question_count(&self) -> usize {
        self.questions.values().map(Vec::len).sum()
    }

    /// Drops cached questions for a match, e.g. after deselecting it.
    pub fn forget_questions(&mut self, match_id: &str) -> usize {
        self.questions
            .remove(match_id)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

/// Extracts records from the payload shapes the backend uses: a bare array,
/// an object holding an array (or object) under `key` or `data`, or a single
/// object. Items without an id or that fail to parse are skipped.
fn parse_items<T>(data: &Value, key: &str, id_keys: &[&str], parent: Option<&str>) -> Vec<T>
where
    T: DeserializeOwned + Identified,
{
    let raw: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get(key).or_else(|| map.get("data")) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(item @ Value::Object(_)) => vec![item],
            _ => vec![data],
        },
        _ => Vec::new(),
    };

    raw.into_iter()
        .filter_map(|item| {
            let Some(id) = id_keys
                .iter()
                .find_map(|key| item.get(*key).and_then(id_string))
            else {
                tracing::warn!("Skipping {} record without an id", key);
                return None;
            };
            match serde_json::from_value::<T>(item.clone()) {
                Ok(mut parsed) => {
                    parsed.set_id(id);
                    if let Some(parent) = parent {
                        parsed.set_parent(parent);
                    }
                    Some(parsed)
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed {} record: {}", key, e);
                    None
                }
            }
        })
        .collect()
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

trait Identified {
    fn set_id(&mut self, id: String);
    fn set_parent(&mut self, _parent: &str) {}
}

impl Identified for Match {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Identified for Question {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_parent(&mut self, parent: &str) {
        if self.match_id.is_empty() {
            self.match_id = parent.to_string();
        }
    }
}
