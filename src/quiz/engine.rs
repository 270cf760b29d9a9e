use std::sync::Arc;

use log::info;

use super::generator::QuestionSource;
use super::store::SessionStore;
use super::{Advance, AnswerOutcome, QuizProgress, QuizSession, QuizSummary};
use crate::topics;

/// A question ready to be presented, with its 1-based position in the quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPrompt {
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub options: Vec<String>,
}

/// Transport-neutral result of one inbound event. The Telegram layer decides
/// how each variant is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Prompt(QuestionPrompt),
    Feedback(AnswerOutcome),
    Summary(QuizSummary),
    NoActiveQuiz,
    Ignored,
}

/// The one place a callback token is told apart: an answer tap carries the
/// option index, a "next" tap carries nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Answer(usize),
    Next,
}

const ANSWER_PREFIX: &str = "resp_";
const NEXT_TOKEN: &str = "siguiente";

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        if data == NEXT_TOKEN {
            return Some(Self::Next);
        }
        let index = data.strip_prefix(ANSWER_PREFIX)?.parse().ok()?;
        Some(Self::Answer(index))
    }

    pub fn token(&self) -> String {
        match self {
            Self::Answer(index) => format!("{ANSWER_PREFIX}{index}"),
            Self::Next => NEXT_TOKEN.to_string(),
        }
    }
}

/// Option `i` is labeled with the letter `'A' + i`.
pub fn option_letter(index: usize) -> char {
    char::from(b'A' + index as u8)
}

/// Drives sessions through `AwaitingStart → InProgress → Completed`. Holds the
/// store it was built with; every mutation goes through the store lock.
pub struct QuizEngine {
    store: SessionStore,
    source: Arc<dyn QuestionSource>,
}

impl QuizEngine {
    pub fn new(store: SessionStore, source: Arc<dyn QuestionSource>) -> Self {
        Self { store, source }
    }

    /// Starts a fresh quiz for the chat, replacing any session already there,
    /// and returns the prompt for question 1.
    pub async fn start_quiz(&self, chat_id: i64, topic_id: &str, count: usize) -> QuestionPrompt {
        let topic = topics::lookup(topic_id);
        let questions = self.source.generate(topic, count).await;
        info!(
            "chat {}: starting quiz on topic {} with {} questions",
            chat_id,
            topic.id,
            questions.len()
        );
        let session = QuizSession::new(questions);
        let prompt = prompt_for(&session);
        self.store.put(chat_id, session);
        prompt
    }

    pub fn handle_callback(&self, chat_id: i64, action: CallbackAction) -> Reply {
        match action {
            CallbackAction::Answer(choice) => self.handle_answer(chat_id, choice),
            CallbackAction::Next => self.handle_advance(chat_id),
        }
    }

    pub fn handle_answer(&self, chat_id: i64, choice: usize) -> Reply {
        match self.store.with_session(chat_id, |s| s.answer(choice)) {
            None => Reply::NoActiveQuiz,
            Some(None) => Reply::Ignored,
            Some(Some(outcome)) => Reply::Feedback(outcome),
        }
    }

    pub fn handle_advance(&self, chat_id: i64) -> Reply {
        let reply = self.store.with_session(chat_id, |s| match s.advance() {
            None => Reply::Ignored,
            Some(Advance::Finished(summary)) => Reply::Summary(summary),
            Some(Advance::Next) => Reply::Prompt(prompt_for(s)),
        });
        reply.unwrap_or(Reply::NoActiveQuiz)
    }

    pub fn progress(&self, chat_id: i64) -> Option<QuizProgress> {
        self.store.with_session(chat_id, |s| s.progress())
    }
}

fn prompt_for(session: &QuizSession) -> QuestionPrompt {
    // New sessions are non-empty and `advance` only lands here mid-quiz.
    let question = session
        .current_question()
        .expect("prompt requested past the end of the quiz");
    QuestionPrompt {
        number: session.current_index() + 1,
        total: session.len(),
        text: question.text().to_string(),
        options: question.options().to_vec(),
    }
}
