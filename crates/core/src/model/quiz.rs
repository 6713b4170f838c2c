use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Point total assumed when a quiz does not declare one.
pub const DEFAULT_TOTAL_POINTS: u32 = 25;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question {0} has empty text")]
    EmptyQuestion(QuestionId),

    #[error("question id {0} is used more than once")]
    DuplicateQuestion(QuestionId),

    #[error("multiple-choice question {0} needs at least two options")]
    TooFewOptions(QuestionId),

    #[error("multiple-choice question {0} has no correct answer")]
    MissingCorrectAnswer(QuestionId),

    #[error("question {id} correct answer {index} is out of range")]
    CorrectAnswerOutOfRange { id: QuestionId, index: usize },

    #[error("freeform question {0} cannot declare options or a correct answer")]
    FreeformWithOptions(QuestionId),

    #[error("answer refers to unknown question {0}")]
    UnknownQuestion(QuestionId),

    #[error("question {0} was answered more than once")]
    DuplicateAnswer(QuestionId),

    #[error("answer kind does not match question {0}")]
    AnswerKindMismatch(QuestionId),

    #[error("choice {index} is out of range for question {id}")]
    ChoiceOutOfRange { id: QuestionId, index: usize },
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    Freeform,
}

/// A single authored quiz question. Read-only at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub points: u32,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_concepts: Vec<String>,
}

impl QuizQuestion {
    fn validate(&self) -> Result<(), QuizError> {
        if self.question.trim().is_empty() {
            return Err(QuizError::EmptyQuestion(self.id.clone()));
        }
        match self.kind {
            QuestionKind::MultipleChoice => {
                if self.options.len() < 2 {
                    return Err(QuizError::TooFewOptions(self.id.clone()));
                }
                let index = self
                    .correct_answer
                    .ok_or_else(|| QuizError::MissingCorrectAnswer(self.id.clone()))?;
                if index >= self.options.len() {
                    return Err(QuizError::CorrectAnswerOutOfRange {
                        id: self.id.clone(),
                        index,
                    });
                }
            }
            QuestionKind::Freeform => {
                if !self.options.is_empty() || self.correct_answer.is_some() {
                    return Err(QuizError::FreeformWithOptions(self.id.clone()));
                }
            }
        }
        Ok(())
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points: Option<u32>,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Declared point total, or `DEFAULT_TOTAL_POINTS` when unspecified.
    #[must_use]
    pub fn declared_total(&self) -> u32 {
        self.total_points.unwrap_or(DEFAULT_TOTAL_POINTS)
    }

    /// Sum of question points, widened so large authored values cannot wrap.
    #[must_use]
    pub fn points_sum(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.points)).sum()
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Checks the shape of every question.
    ///
    /// Point-total consistency is deliberately not part of this check; it is
    /// reported by content validation instead.
    ///
    /// # Errors
    ///
    /// Returns the first `QuizError` found, in question order.
    pub fn validate(&self) -> Result<(), QuizError> {
        let mut seen = HashSet::with_capacity(self.questions.len());
        for question in &self.questions {
            if !seen.insert(&question.id) {
                return Err(QuizError::DuplicateQuestion(question.id.clone()));
            }
            question.validate()?;
        }
        Ok(())
    }

    /// Grade a set of submitted answers.
    ///
    /// Questions without an answer earn nothing. Freeform answers are
    /// self-assessed; a blank response never earns points.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for unknown questions, duplicate answers, answers of
    /// the wrong kind, or out-of-range choices.
    pub fn grade(&self, answers: &[SubmittedAnswer]) -> Result<GradedQuiz, QuizError> {
        let mut seen = HashSet::with_capacity(answers.len());
        for submitted in answers {
            if self.question(&submitted.question_id).is_none() {
                return Err(QuizError::UnknownQuestion(submitted.question_id.clone()));
            }
            if !seen.insert(&submitted.question_id) {
                return Err(QuizError::DuplicateAnswer(submitted.question_id.clone()));
            }
        }

        let mut results = Vec::with_capacity(self.questions.len());
        for question in &self.questions {
            let answer = answers
                .iter()
                .find(|a| a.question_id == question.id)
                .map(|a| &a.answer);
            let correct = match (question.kind, answer) {
                (_, None) => false,
                (QuestionKind::MultipleChoice, Some(QuizAnswer::Choice { index })) => {
                    if *index >= question.options.len() {
                        return Err(QuizError::ChoiceOutOfRange {
                            id: question.id.clone(),
                            index: *index,
                        });
                    }
                    question.correct_answer == Some(*index)
                }
                (QuestionKind::Freeform, Some(QuizAnswer::Freeform { response, accepted })) => {
                    *accepted && !response.trim().is_empty()
                }
                _ => return Err(QuizError::AnswerKindMismatch(question.id.clone())),
            };
            results.push(QuestionResult {
                question_id: question.id.clone(),
                answered: answer.is_some(),
                correct,
                points_earned: if correct { question.points } else { 0 },
                points_possible: question.points,
            });
        }

        Ok(GradedQuiz { results })
    }
}

//
// ─── ANSWERS & GRADING ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum QuizAnswer {
    /// Index into the question's options.
    Choice { index: usize },
    /// Free text plus the learner's own verdict.
    Freeform { response: String, accepted: bool },
}

impl QuizAnswer {
    #[must_use]
    pub fn choice(index: usize) -> Self {
        Self::Choice { index }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub answer: QuizAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub answered: bool,
    pub correct: bool,
    pub points_earned: u32,
    pub points_possible: u32,
}

/// Outcome of grading one attempt at a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedQuiz {
    results: Vec<QuestionResult>,
}

impl GradedQuiz {
    #[must_use]
    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    #[must_use]
    pub fn earned(&self) -> u64 {
        self.results.iter().map(|r| u64::from(r.points_earned)).sum()
    }

    #[must_use]
    pub fn possible(&self) -> u64 {
        self.results.iter().map(|r| u64::from(r.points_possible)).sum()
    }

    /// Floor of the earned percentage; 0 when nothing could be earned.
    #[must_use]
    pub fn percent(&self) -> u8 {
        percent_floor(self.earned(), self.possible())
    }
}

/// Floor of `100 * earned / possible`, clamped to 100 and 0 for an empty total.
#[must_use]
pub fn percent_floor(earned: u64, possible: u64) -> u8 {
    if possible == 0 {
        return 0;
    }
    let pct = (u128::from(earned) * 100) / u128::from(possible);
    u8::try_from(pct.min(100)).unwrap_or(100)
}
