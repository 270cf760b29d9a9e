use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::{Question, QuestionError};
use crate::topics::Topic;

const MESSAGES_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-3-sonnet-20240229";
const MAX_TOKENS: usize = 3000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation service returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("no text content in response")]
    EmptyResponse,
    #[error("response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("expected {expected} questions, got {got}")]
    WrongQuestionCount { expected: usize, got: usize },
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Where questions come from. The engine only depends on this trait, so tests
/// feed it scripted question sets.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Best effort: either `count` validated questions, or the single
    /// fallback question when the service's output is unusable. Never fails.
    async fn generate(&self, topic: &Topic, count: usize) -> Vec<Question>;
}

/// Generates questions through the Anthropic Messages API. One outbound call
/// per invocation, bounded timeout, no retries.
pub struct ClaudeGenerator {
    client: Client,
    api_key: String,
}

impl ClaudeGenerator {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    async fn request(&self, topic: &Topic, count: usize) -> Result<Vec<Question>, GeneratorError> {
        let body = json!({
            "model": MODEL,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": build_prompt(topic, count) }],
        });

        debug!("requesting {} questions about {}", count, topic.name);

        let response = self
            .client
            .post(MESSAGES_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Api { status, body });
        }

        let raw: serde_json::Value = response.json().await?;
        let text = raw["content"][0]["text"]
            .as_str()
            .ok_or(GeneratorError::EmptyResponse)?;

        parse_questions(text, count)
    }
}

#[async_trait]
impl QuestionSource for ClaudeGenerator {
    async fn generate(&self, topic: &Topic, count: usize) -> Vec<Question> {
        match self.request(topic, count).await {
            Ok(questions) => questions,
            Err(err) => {
                warn!("question generation failed, using fallback: {}", err);
                vec![fallback_question()]
            }
        }
    }
}

fn build_prompt(topic: &Topic, count: usize) -> String {
    format!(
        "Genera {count} preguntas tipo test sobre {} para oposiciones de \
         trabajo social Madrid.\n\nTemario: {}\n\nResponde únicamente con un \
         objeto JSON con este formato:\n{{\"questions\": [{{\"text\": \
         \"¿...?\", \"options\": [\"...\", \"...\", \"...\", \"...\"], \
         \"correctIndex\": 1, \"explanation\": \"...\"}}]}}\n\nCada pregunta \
         debe tener exactamente 4 opciones.",
        topic.name, topic.syllabus
    )
}

#[derive(Deserialize)]
struct GeneratedQuiz {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedQuestion {
    text: String,
    options: Vec<String>,
    correct_index: usize,
    explanation: String,
}

/// Parses the model's reply into validated questions. The reply often arrives
/// wrapped in Markdown code fences, which are stripped first.
fn parse_questions(text: &str, count: usize) -> Result<Vec<Question>, GeneratorError> {
    let cleaned = strip_code_fences(text);
    let parsed: GeneratedQuiz = serde_json::from_str(&cleaned)?;
    if parsed.questions.len() != count {
        return Err(GeneratorError::WrongQuestionCount {
            expected: count,
            got: parsed.questions.len(),
        });
    }
    parsed
        .questions
        .into_iter()
        .map(|q| Question::new(q.text, q.options, q.correct_index, q.explanation))
        .collect::<Result<Vec<_>, _>>()
        .map_err(Into::into)
}

fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// The degraded-service question used whenever the model's output cannot be
/// validated.
pub fn fallback_question() -> Question {
    Question::new(
        "¿Cuál es el principio rector principal según la Ley 12/2022 de Madrid?",
        vec![
            "Universalidad".to_string(),
            "Atención centrada en la persona".to_string(),
            "Proximidad".to_string(),
            "Eficiencia".to_string(),
        ],
        1,
        "La atención centrada en la persona es el principio nuclear del sistema.",
    )
    .expect("fallback question is well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{"questions": [
        {"text": "¿Uno?", "options": ["a", "b", "c", "d"], "correctIndex": 0, "explanation": "por a"},
        {"text": "¿Dos?", "options": ["a", "b", "c", "d"], "correctIndex": 3, "explanation": "por d"}
    ]}"#;

    #[test]
    fn parses_well_formed_response() {
        let questions = parse_questions(WELL_FORMED, 2).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].text(), "¿Uno?");
        assert!(questions[1].is_correct(3));
    }

    #[test]
    fn strips_code_fences_before_parsing() {
        let fenced = format!("```json\n{}\n```", WELL_FORMED);
        let questions = parse_questions(&fenced, 2).unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn rejects_malformed_json() {
        let result = parse_questions("no soy json", 1);
        assert!(matches!(result, Err(GeneratorError::Parse(_))));
    }

    #[test]
    fn rejects_wrong_question_count() {
        let result = parse_questions(WELL_FORMED, 5);
        assert!(matches!(
            result,
            Err(GeneratorError::WrongQuestionCount {
                expected: 5,
                got: 2
            })
        ));
    }

    #[test]
    fn rejects_wrong_option_count() {
        let three_options = r#"{"questions": [
            {"text": "¿?", "options": ["a", "b", "c"], "correctIndex": 0, "explanation": "x"}
        ]}"#;
        let result = parse_questions(three_options, 1);
        assert!(matches!(
            result,
            Err(GeneratorError::Question(QuestionError::WrongOptionCount(3)))
        ));
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let bad_index = r#"{"questions": [
            {"text": "¿?", "options": ["a", "b", "c", "d"], "correctIndex": 4, "explanation": "x"}
        ]}"#;
        let result = parse_questions(bad_index, 1);
        assert!(matches!(
            result,
            Err(GeneratorError::Question(QuestionError::IndexOutOfRange(4)))
        ));
    }

    #[test]
    fn fallback_question_is_a_single_valid_question() {
        let question = fallback_question();
        assert_eq!(question.options().len(), 4);
        assert!(question.is_correct(1));
    }
}
