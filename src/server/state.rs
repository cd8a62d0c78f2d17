use std::sync::Arc;

use tracing::info;

use crate::analytics::{AnalyticsProvider, HttpAnalyticsProvider, TeamAnalyticsAggregator};
use crate::config::Config;
use crate::error::AppError;
use crate::lifecycle::{EventController, StatusFile};
use crate::review::{ReviewGenerator, ReviewLedger, StaticReviewGenerator};

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub events: EventController,
    pub analytics: TeamAnalyticsAggregator,
    pub reviewer: Arc<dyn ReviewGenerator>,
    pub reviews: ReviewLedger,
}

impl AppState {
    /// Build the production state from configuration.
    pub fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let events = match config.server.state_file {
            Some(ref path) => EventController::with_state_file(StatusFile::new(path)),
            None => {
                info!("Event status is kept in memory only");
                EventController::in_memory()
            }
        };

        let provider = Arc::new(HttpAnalyticsProvider::new(&config.upstream)?);
        let reviewer = Arc::new(StaticReviewGenerator::new(config.review.message.clone()));

        Ok(Self::with_parts(config, events, provider, reviewer))
    }

    /// Assemble state from explicit collaborators.
    pub fn with_parts(
        config: Config,
        events: EventController,
        provider: Arc<dyn AnalyticsProvider>,
        reviewer: Arc<dyn ReviewGenerator>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            events,
            analytics: TeamAnalyticsAggregator::new(provider),
            reviewer,
            reviews: ReviewLedger::new(),
        })
    }
}
