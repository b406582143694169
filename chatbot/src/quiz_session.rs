//! Per-session quiz state and grading
//!
//! A session is reset as a whole by `start_new_quiz`. Answers may change
//! freely until `submit`, which freezes the snapshot that `grade` reads.

use crate::error::{ChatbotError, Result};
use crate::models::*;
use serde::Serialize;

pub const NOT_ANSWERED: &str = "Not answered";

#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    summary: Option<Summary>,
    quiz: Vec<QuizQuestion>,
    answers: Vec<Option<usize>>,
    submitted: bool,
    submitted_answers: Option<Vec<Option<usize>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub question: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

impl QuestionResult {
    pub fn user_answer_text(&self) -> &str {
        self.user_answer.as_deref().unwrap_or(NOT_ANSWERED)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub score: usize,
    pub total: usize,
    pub results: Vec<QuestionResult>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// The active quiz, if the last summarize action produced one.
    pub fn quiz(&self) -> Option<&[QuizQuestion]> {
        (!self.quiz.is_empty()).then_some(self.quiz.as_slice())
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Replaces everything: previous quiz, answers and submission are discarded.
    pub fn start_new_quiz(&mut self, summary: Summary, quiz: Vec<QuizQuestion>) {
        self.answers = vec![None; quiz.len()];
        self.summary = Some(summary);
        self.quiz = quiz;
        self.submitted = false;
        self.submitted_answers = None;
    }

    pub fn record_answer(&mut self, question_index: usize, option_index: usize) -> Result<()> {
        let question = self
            .quiz()
            .ok_or(ChatbotError::NoActiveQuiz)?
            .get(question_index)
            .ok_or_else(|| {
                ChatbotError::InvalidAnswer(format!(
                    "question {} does not exist (quiz has {})",
                    question_index,
                    self.quiz.len()
                ))
            })?;

        if option_index >= question.options.len() {
            return Err(ChatbotError::InvalidAnswer(format!(
                "option {} does not exist for question {}",
                option_index, question_index
            )));
        }

        if self.submitted {
            log::debug!("Answer to question {} recorded after submission", question_index);
        }
        self.answers[question_index] = Some(option_index);
        Ok(())
    }

    pub fn submit(&mut self) -> Result<()> {
        if self.quiz().is_none() {
            return Err(ChatbotError::NoActiveQuiz);
        }
        if !self.submitted {
            self.submitted = true;
            self.submitted_answers = Some(self.answers.clone());
        }
        Ok(())
    }

    pub fn grade(&self) -> Result<GradeReport> {
        let answers = match (&self.submitted_answers, self.submitted) {
            (Some(answers), true) => answers,
            _ => return Err(ChatbotError::NotSubmitted),
        };

        let results: Vec<QuestionResult> = self
            .quiz
            .iter()
            .zip(answers)
            .map(|(question, answer)| QuestionResult {
                question: question.question.clone(),
                user_answer: answer.and_then(|i| question.options.get(i).cloned()),
                correct_answer: question.correct_option().to_string(),
                is_correct: *answer == Some(question.correct_answer),
            })
            .collect();

        Ok(GradeReport {
            score: results.iter().filter(|r| r.is_correct).count(),
            total: self.quiz.len(),
            results,
        })
    }
}
