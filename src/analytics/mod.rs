//! Team analytics: upstream fetch, payload normalization and statistics.

pub mod aggregator;
pub mod normalize;
pub mod provider;
pub mod shape;
pub mod teams;

pub use aggregator::*;
pub use provider::{AnalyticsProvider, HttpAnalyticsProvider};
