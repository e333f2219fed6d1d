// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Quiz questions, answer validation and Bloom-level scoring.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Score at or above which a module is passed.
pub const PASS_PERCENT: u32 = 60;
/// A perfect score always passes.
pub const PERFECT_PERCENT: u32 = 100;
/// Every generated question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Bloom's-taxonomy category used to bucket scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BloomLevel {
    #[default]
    Remember,
    Understand,
    Analyze,
}

impl BloomLevel {
    /// Map a free-form label from model output onto a category.
    ///
    /// Unknown labels fall back to `Remember`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if label.starts_with("analy") {
            BloomLevel::Analyze
        } else if label.starts_with("understand") || label.starts_with("comprehen") {
            BloomLevel::Understand
        } else {
            BloomLevel::Remember
        }
    }
}

/// One answer option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizOption {
    pub text: String,
    pub is_correct: bool,
}

/// A multiple-choice question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<QuizOption>,
    pub bloom_level: BloomLevel,
}

impl Question {
    /// The option flagged correct.
    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    /// Compare a selected option text with the correct option.
    pub fn is_correct_answer(&self, selected: &str) -> bool {
        self.correct_option()
            .is_some_and(|o| o.text.trim() == selected.trim())
    }
}

/// A generated set of questions for one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    /// 1-based module the set was generated for
    pub module: u32,
    pub questions: Vec<Question>,
    pub generated_at: String,
}

/// Learner-facing question, without correctness flags.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuestionView {
    pub question: String,
    pub options: Vec<String>,
    pub bloom_level: BloomLevel,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            question: q.question.clone(),
            options: q.options.iter().map(|o| o.text.clone()).collect(),
            bloom_level: q.bloom_level,
        }
    }
}

/// Correct/total counter for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryScore {
    pub correct: u32,
    pub total: u32,
}

impl CategoryScore {
    pub fn add(&mut self, other: CategoryScore) {
        self.correct += other.correct;
        self.total += other.total;
    }

    /// Accuracy as a percentage, 0 when nothing was asked.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) * 100.0 / f64::from(self.total)
        }
    }
}

/// Result of scoring one submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuizScore {
    pub correct: u32,
    pub total: u32,
    /// Integer percent, floored
    pub percent: u32,
    pub remember: CategoryScore,
    pub understand: CategoryScore,
    pub analyze: CategoryScore,
}

/// What a submission does to the learner's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum QuizOutcome {
    /// Module passed; progress moves forward.
    Advance,
    /// Partial score; same questions may be retried.
    Retry,
    /// Nothing correct; the question set is discarded.
    Regenerate,
}

impl QuizOutcome {
    pub fn for_percent(percent: u32) -> Self {
        if percent == PERFECT_PERCENT || percent >= PASS_PERCENT {
            QuizOutcome::Advance
        } else if percent > 0 {
            QuizOutcome::Retry
        } else {
            QuizOutcome::Regenerate
        }
    }
}

/// Score selected option texts against a question list.
///
/// Answers are matched by position; a missing answer is incorrect and extra
/// answers are ignored.
pub fn score_answers(questions: &[Question], answers: &[String]) -> QuizScore {
    let mut score = QuizScore::default();

    for (i, question) in questions.iter().enumerate() {
        let correct = answers
            .get(i)
            .is_some_and(|answer| question.is_correct_answer(answer));

        let bucket = match question.bloom_level {
            BloomLevel::Remember => &mut score.remember,
            BloomLevel::Understand => &mut score.understand,
            BloomLevel::Analyze => &mut score.analyze,
        };
        bucket.total += 1;
        score.total += 1;
        if correct {
            bucket.correct += 1;
            score.correct += 1;
        }
    }

    score.percent = if score.total == 0 {
        0
    } else {
        score.correct * 100 / score.total
    };
    score
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_question(text: &str, correct: &str, level: BloomLevel) -> Question {
        let mut options = vec![QuizOption {
            text: correct.to_string(),
            is_correct: true,
        }];
        for i in 1..OPTIONS_PER_QUESTION {
            options.push(QuizOption {
                text: format!("{correct} distractor {i}"),
                is_correct: false,
            });
        }
        Question {
            question: text.to_string(),
            options,
            bloom_level: level,
        }
    }

    #[test]
    fn test_bloom_level_from_label() {
        assert_eq!(BloomLevel::from_label("Analyze"), BloomLevel::Analyze);
        assert_eq!(BloomLevel::from_label("analysis"), BloomLevel::Analyze);
        assert_eq!(BloomLevel::from_label(" Understanding "), BloomLevel::Understand);
        assert_eq!(BloomLevel::from_label("Remember"), BloomLevel::Remember);
        assert_eq!(BloomLevel::from_label("Evaluate"), BloomLevel::Remember);
    }

    #[test]
    fn test_answer_comparison_trims_whitespace() {
        let q = make_question("2 + 2?", "4", BloomLevel::Remember);
        assert!(q.is_correct_answer(" 4 "));
        assert!(!q.is_correct_answer("4 distractor 1"));
    }

    #[test]
    fn test_score_buckets_by_level() {
        let questions = vec![
            make_question("a", "A", BloomLevel::Remember),
            make_question("b", "B", BloomLevel::Understand),
            make_question("c", "C", BloomLevel::Analyze),
            make_question("d", "D", BloomLevel::Analyze),
        ];
        let answers = vec!["A".to_string(), "wrong".to_string(), "C".to_string()];

        let score = score_answers(&questions, &answers);

        assert_eq!(score.correct, 2);
        assert_eq!(score.total, 4);
        assert_eq!(score.percent, 50);
        assert_eq!(score.remember, CategoryScore { correct: 1, total: 1 });
        assert_eq!(score.understand, CategoryScore { correct: 0, total: 1 });
        assert_eq!(score.analyze, CategoryScore { correct: 1, total: 2 });
    }

    #[test]
    fn test_outcome_thresholds() {
        assert_eq!(QuizOutcome::for_percent(100), QuizOutcome::Advance);
        assert_eq!(QuizOutcome::for_percent(60), QuizOutcome::Advance);
        assert_eq!(QuizOutcome::for_percent(66), QuizOutcome::Advance);
        assert_eq!(QuizOutcome::for_percent(59), QuizOutcome::Retry);
        assert_eq!(QuizOutcome::for_percent(1), QuizOutcome::Retry);
        assert_eq!(QuizOutcome::for_percent(0), QuizOutcome::Regenerate);
    }

    #[test]
    fn test_empty_question_list_scores_zero() {
        let score = score_answers(&[], &["x".to_string()]);
        assert_eq!(score.total, 0);
        assert_eq!(score.percent, 0);
    }
}
