use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    /// The target is above the guess.
    Higher,
    /// The target is below the guess.
    Lower,
}

impl Feedback {
    pub fn compare(guess: i64, target: i64) -> Feedback {
        match guess.cmp(&target) {
            Ordering::Equal => Feedback::Correct,
            Ordering::Less => Feedback::Higher,
            Ordering::Greater => Feedback::Lower,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Correct => "correct",
            Feedback::Higher => "higher",
            Feedback::Lower => "lower",
        }
    }
}

/// One evaluated guess. Never mutated after creation.
#[readonly::make]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessResult {
    pub guess: i64,
    pub feedback: Feedback,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub penalty: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl GuessResult {
    pub fn new(
        guess: i64,
        feedback: Feedback,
        hint: Option<String>,
        penalty: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            guess,
            feedback,
            hint,
            penalty,
            timestamp,
        }
    }

    pub fn correct(guess: i64, timestamp: DateTime<Utc>) -> Self {
        Self::new(guess, Feedback::Correct, None, None, timestamp)
    }

    /// Returned for guesses the session refuses; never recorded.
    pub fn placeholder(guess: i64, timestamp: DateTime<Utc>) -> Self {
        Self::new(guess, Feedback::Lower, None, None, timestamp)
    }

    pub fn is_correct(&self) -> bool {
        self.feedback == Feedback::Correct
    }
}
