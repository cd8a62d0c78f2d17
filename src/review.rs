//! Team review boundary.
//!
//! `finalize-team` asks a [`ReviewGenerator`] for a narrative review of a
//! team's submission. The bundled [`StaticReviewGenerator`] returns a fixed
//! text; a real analysis service plugs in behind the same trait.

use crate::error::AppError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::warn;

/// Default placeholder review.
pub const DEFAULT_REVIEW: &str = "Automated analysis completed. Code quality looks good.";

/// Produces a review for a team.
#[async_trait]
pub trait ReviewGenerator: Send + Sync {
    async fn review(&self, team: &str) -> Result<String, AppError>;
}

/// Review generator that answers every team with the same text.
#[derive(Debug, Clone)]
pub struct StaticReviewGenerator {
    message: String,
}

impl StaticReviewGenerator {
    /// A blank message falls back to [`DEFAULT_REVIEW`]; a review is never empty.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            warn!("Configured review message is blank, using the default review");
            return Self {
                message: DEFAULT_REVIEW.to_string(),
            };
        }

        Self { message }
    }
}

impl Default for StaticReviewGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_REVIEW)
    }
}

#[async_trait]
impl ReviewGenerator for StaticReviewGenerator {
    async fn review(&self, _team: &str) -> Result<String, AppError> {
        Ok(self.message.clone())
    }
}

/// Reviews generated during this process, keyed by team name.
#[derive(Debug, Default)]
pub struct ReviewLedger {
    reviews: RwLock<HashMap<String, String>>,
}

impl ReviewLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a review, replacing any earlier one. Returns the number of
    /// teams reviewed so far.
    pub fn record(&self, team: &str, review: &str) -> usize {
        let mut reviews = self.reviews.write();
        reviews.insert(team.to_string(), review.to_string());
        reviews.len()
    }

    pub fn get(&self, team: &str) -> Option<String> {
        self.reviews.read().get(team).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_static_review_default() {
        let generator = StaticReviewGenerator::default();
        let review = assert_ok!(generator.review("Team A").await);
        assert_eq!(review, DEFAULT_REVIEW);
    }

    #[tokio::test]
    async fn test_static_review_custom() {
        let generator = StaticReviewGenerator::new("Nice work");
        assert_eq!(generator.review("Team B").await.unwrap(), "Nice work");
    }

    #[tokio::test]
    async fn test_blank_message_falls_back_to_default() {
        for blank in ["", "   ", "\n\t"] {
            let generator = StaticReviewGenerator::new(blank);
            let review = assert_ok!(generator.review("Team A").await);
            assert_eq!(review, DEFAULT_REVIEW);
        }
    }

    #[test]
    fn test_ledger_records_latest() {
        let ledger = ReviewLedger::new();
        assert_eq!(ledger.get("Team A"), None);

        assert_eq!(ledger.record("Team A", "first"), 1);
        assert_eq!(ledger.record("Team A", "second"), 1);
        assert_eq!(ledger.record("Team B", "other"), 2);

        assert_eq!(ledger.get("Team A").as_deref(), Some("second"));
    }
}
