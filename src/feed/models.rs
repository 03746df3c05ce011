use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A live or upcoming match as pushed by the backend.
///
/// Parsing is lenient: missing fields default and unknown ones are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Match {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "team1", alias = "localTeam")]
    pub home_team: Option<String>,
    #[serde(alias = "team2", alias = "visitorTeam")]
    pub away_team: Option<String>,
    pub status: Option<String>,
    pub venue: Option<String>,
    pub score: Option<Value>,
    pub starting_at: Option<String>,
}

impl Match {
    pub fn is_finished(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("finished"))
    }
}

/// An AI-generated betting question for one match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Question {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub match_id: String,
    #[serde(alias = "question")]
    pub text: String,
    pub options: Vec<Value>,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
    pub confidence: Option<f64>,
    pub created_at: Option<Value>,
}

/// Accepts `"42"`, `42` or `null` for identifier fields.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_accepts_numeric_id_and_team_aliases() {
        let parsed: Match = serde_json::from_value(json!({
            "id": 1234,
            "team1": "India",
            "team2": "Australia",
            "status": "LIVE",
            "ignored": { "deep": true }
        }))
        .unwrap();
        assert_eq!(parsed.id, "1234");
        assert_eq!(parsed.home_team.as_deref(), Some("India"));
        assert_eq!(parsed.away_team.as_deref(), Some("Australia"));
        assert!(!parsed.is_finished());
    }

    #[test]
    fn test_question_defaults_missing_fields() {
        let parsed: Question = serde_json::from_value(json!({
            "id": "q1",
            "question": "Will the next over go for more than 8 runs?",
        }))
        .unwrap();
        assert_eq!(parsed.id, "q1");
        assert_eq!(parsed.match_id, "");
        assert!(parsed.options.is_empty());
        assert_eq!(parsed.text, "Will the next over go for more than 8 runs?");
    }

    #[test]
    fn test_null_id_becomes_empty() {
        let parsed: Match = serde_json::from_value(json!({ "id": null })).unwrap();
        assert!(parsed.id.is_empty());
    }
}
