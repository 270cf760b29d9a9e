pub mod engine;
pub mod generator;
pub mod store;

use thiserror::Error;

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("expected 4 options, got {0}")]
    WrongOptionCount(usize),
    #[error("correct index {0} does not point at an option")]
    IndexOutOfRange(usize),
}

/// A single multiple-choice question. Always has exactly four options and a
/// correct index that points at one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_index: usize,
    explanation: String,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        if options.len() != OPTIONS_PER_QUESTION {
            return Err(QuestionError::WrongOptionCount(options.len()));
        }
        if correct_index >= options.len() {
            return Err(QuestionError::IndexOutOfRange(correct_index));
        }
        Ok(Self {
            text: text.into(),
            options,
            correct_index,
            explanation: explanation.into(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSummary {
    pub correct: u32,
    pub incorrect: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub current: usize,
    pub total: usize,
    pub correct: u32,
    pub incorrect: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next,
    Finished(QuizSummary),
}

/// The per-chat quiz in progress. `answered_current` tracks whether the
/// question at `current` has been scored already, so a second tap on the same
/// question never counts twice.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    correct: u32,
    incorrect: u32,
    answered_current: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        debug_assert!(!questions.is_empty());
        Self {
            questions,
            current: 0,
            correct: 0,
            incorrect: 0,
            answered_current: false,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_completed(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Scores `choice` against the current question. Returns `None` when the
    /// quiz is over or the current question was already answered.
    pub fn answer(&mut self, choice: usize) -> Option<AnswerOutcome> {
        if self.answered_current {
            return None;
        }
        let question = self.questions.get(self.current)?;
        let correct = question.is_correct(choice);
        let explanation = question.explanation.clone();
        self.answered_current = true;
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        Some(AnswerOutcome {
            correct,
            explanation,
        })
    }

    /// Moves past the current question once it has been answered. Returns
    /// `None` on a completed session or before an answer came in, so a stray
    /// "next" tap never skips a question or repeats the summary.
    pub fn advance(&mut self) -> Option<Advance> {
        if self.is_completed() || !self.answered_current {
            return None;
        }
        self.current += 1;
        self.answered_current = false;
        if self.is_completed() {
            Some(Advance::Finished(self.summary()))
        } else {
            Some(Advance::Next)
        }
    }

    pub fn summary(&self) -> QuizSummary {
        let percentage =
            (100.0 * f64::from(self.correct) / self.questions.len() as f64).round() as u32;
        QuizSummary {
            correct: self.correct,
            incorrect: self.incorrect,
            percentage,
        }
    }

    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            current: self.current,
            total: self.questions.len(),
            correct: self.correct,
            incorrect: self.incorrect,
            completed: self.is_completed(),
        }
    }
}
