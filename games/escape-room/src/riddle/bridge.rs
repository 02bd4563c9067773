//! Riddle generation and answer checking through the AI text service,
//! with fixed local fallbacks for every failure.

use escape_engine::service::parse_structured;
use escape_engine::{GenerateRequest, ServiceResult};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Answer tokens accepted by the local check.
pub const ACCEPTED_TOKENS: [&str; 2] = ["shadow", "skuggi"];

const FALLBACK_QUESTION: &str = "Only one color, but not one size, Stuck at the bottom, \
yet easily flies. Present in sun, but not in rain, Doing no harm, and feeling no pain. What am I?";
const FALLBACK_HINT: &str = "I follow you around in the light.";

const GENERATE_PROMPT: &str = "Generate a short, challenging riddle where the answer is \
explicitly 'shadow'. It should be mysterious and poetic.";

/// A question with its hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiddleRecord {
    pub question: String,
    pub hint: String,
}

impl RiddleRecord {
    /// The record used whenever the service cannot supply one.
    pub fn fallback() -> Self {
        Self {
            question: FALLBACK_QUESTION.to_string(),
            hint: FALLBACK_HINT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Verdict {
    correct: bool,
}

/// Request for a new question/hint pair.
pub fn challenge_request() -> GenerateRequest {
    GenerateRequest::structured(
        GENERATE_PROMPT,
        json!({
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "hint": { "type": "STRING" }
            },
            "required": ["question", "hint"]
        }),
    )
}

/// Interpret the reply to `challenge_request`. Never fails.
pub fn challenge_from_reply(reply: &ServiceResult) -> RiddleRecord {
    match parse_structured::<RiddleRecord>(reply) {
        Ok(record) if !record.question.trim().is_empty() => record,
        Ok(_) => {
            log::warn!("riddle service returned an empty question, using fallback");
            RiddleRecord::fallback()
        }
        Err(e) => {
            log::warn!("riddle generation failed ({e}), using fallback");
            RiddleRecord::fallback()
        }
    }
}

/// Request asking the service to judge `answer`.
pub fn verify_request(question: &str, answer: &str) -> GenerateRequest {
    let prompt = format!(
        "Riddle: \"{question}\"\n\
         User Answer: \"{answer}\"\n\n\
         The correct answer to this riddle is \"shadow\". Is the user's answer \"shadow\" \
         or a very close synonym?\n\
         Respond with ONLY valid JSON: {{ \"correct\": boolean }}"
    );
    GenerateRequest::structured(
        prompt,
        json!({
            "type": "OBJECT",
            "properties": { "correct": { "type": "BOOLEAN" } },
            "required": ["correct"]
        }),
    )
}

/// Interpret the reply to `verify_request`. Falls back to `local_verdict`.
pub fn verdict_from_reply(reply: &ServiceResult, answer: &str) -> bool {
    match parse_structured::<Verdict>(reply) {
        Ok(verdict) => verdict.correct,
        Err(e) => {
            log::warn!("answer check failed ({e}), using local match");
            local_verdict(answer)
        }
    }
}

/// Case-insensitive, trimmed substring match against `ACCEPTED_TOKENS`.
pub fn local_verdict(answer: &str) -> bool {
    let normalized = answer.trim().to_lowercase();
    ACCEPTED_TOKENS.iter().any(|token| normalized.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape_engine::ServiceError;

    #[test]
    fn well_formed_record_is_used() {
        let reply = Ok(r#"{"question": "What walks behind you?", "hint": "Light."}"#.to_string());
        let record = challenge_from_reply(&reply);
        assert_eq!(record.question, "What walks behind you?");
        assert_eq!(record.hint, "Light.");
    }

    #[test]
    fn unavailable_service_yields_fallback_record() {
        for reply in [
            Err(ServiceError::MissingCredentials),
            Err(ServiceError::Transport("offline".into())),
            Ok("not json".to_string()),
            Ok(r#"{"question": "only"}"#.to_string()),
            Ok(r#"{"question": " ", "hint": "x"}"#.to_string()),
        ] {
            assert_eq!(challenge_from_reply(&reply), RiddleRecord::fallback());
        }
    }

    #[test]
    fn service_verdict_wins_when_available() {
        assert!(verdict_from_reply(&Ok(r#"{"correct": true}"#.into()), "darkness"));
        assert!(!verdict_from_reply(&Ok(r#"{"correct": false}"#.into()), "shadow"));
    }

    #[test]
    fn fallback_verdict_matches_tokens() {
        let down = Err(ServiceError::Status(500));
        assert!(verdict_from_reply(&down, "  My SHADOW "));
        assert!(verdict_from_reply(&down, "skuggi"));
        assert!(!verdict_from_reply(&down, "a ghost"));
        // A reply without the field counts as a failure too.
        assert!(verdict_from_reply(&Ok("{}".into()), "shadow"));
    }

    #[test]
    fn requests_carry_schema_and_answer() {
        assert!(challenge_request().schema.is_some());
        let req = verify_request("Who follows?", "shade");
        assert!(req.prompt.contains("User Answer: \"shade\""));
        assert!(req.prompt.contains("{ \"correct\": boolean }"));
        assert_eq!(req.schema.unwrap()["properties"]["correct"]["type"], "BOOLEAN");
    }
}
