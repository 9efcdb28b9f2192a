//! Typed form bodies and their validation rules.

use serde::Deserialize;

/// Longest review accepted by the rating form.
pub const MAX_REVIEW_LEN: usize = 250;

/// Lowest and highest accepted rating.
pub const RATING_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// Field-level validation messages, in form order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, msg)| msg.as_str())
    }
}

/// `POST /add` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddMovieForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl AddMovieForm {
    /// Returns the trimmed search title.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::default();
        let title = self.title.trim();
        if title.is_empty() {
            errors.push("title", "Movie title is required.");
        }

        if errors.is_empty() {
            Ok(title.to_string())
        } else {
            Err(errors)
        }
    }
}

/// `POST /edit` body. Fields arrive as text so bad input can be echoed back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RateMovieForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// A rating form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRating {
    pub rating: f64,
    pub review: String,
}

impl RateMovieForm {
    pub fn validate(&self) -> Result<ValidRating, FieldErrors> {
        let mut errors = FieldErrors::default();

        let raw = self.rating.trim();
        let rating = if raw.is_empty() {
            errors.push("rating", "Rating is required.");
            None
        } else {
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() && RATING_RANGE.contains(&value) => Some(value),
                Ok(_) => {
                    errors.push("rating", "Rating must be between 0 and 10.");
                    None
                }
                Err(_) => {
                    errors.push("rating", "Rating must be a number, e.g. 7.5.");
                    None
                }
            }
        };

        let review = self.review.trim();
        if review.is_empty() {
            errors.push("review", "Review is required.");
        } else if review.chars().count() > MAX_REVIEW_LEN {
            errors.push(
                "review",
                format!("Review must be at most {MAX_REVIEW_LEN} characters."),
            );
        }

        match rating {
            Some(rating) if errors.is_empty() => Ok(ValidRating {
                rating,
                review: review.to_string(),
            }),
            _ => Err(errors),
        }
    }
}
