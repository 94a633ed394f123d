//! `TripScout` - Destination recommendations backed by live travel pricing
//!
//! This library prices planner-suggested destinations against the Amadeus hotel
//! and flight APIs and keeps only the destinations that can actually be booked.

pub mod aggregation;
pub mod amadeus;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod planner;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use aggregation::{Aggregator, FlightPricing, HotelPricing};
pub use amadeus::{
    AmadeusClient, Credential, FlightPricingAdapter, HotelPricingAdapter, ProviderRequest,
    TokenCache,
};
pub use config::TripScoutConfig;
pub use error::TripScoutError;
pub use models::{CandidateDestination, DestinationEvidence, FlightOffer, HotelOffer, RoomOffer};
pub use planner::{Planner, RecommendationRequest, RecommendationService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
