//! Concurrent hotel and flight pricing for planner-suggested destinations

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::amadeus::{AmadeusClient, FlightPricingAdapter, HotelPricingAdapter};
use crate::config::TripScoutConfig;
use crate::models::{
    CandidateDestination, DestinationEvidence, FlightOffer, HotelOffer, TripRequest,
};

/// Source of hotel prices for a city. Implementations absorb their own failures.
#[async_trait]
pub trait HotelPricing: Send + Sync {
    async fn fetch_hotels(
        &self,
        location_code: &str,
        check_in: &str,
        check_out: &str,
        adults: u32,
    ) -> Vec<HotelOffer>;
}

/// Source of flight prices for a route. Implementations absorb their own failures.
#[async_trait]
pub trait FlightPricing: Send + Sync {
    async fn fetch_flights(
        &self,
        origin: &str,
        destination: &str,
        departure_date: &str,
        adults: u32,
    ) -> Vec<FlightOffer>;
}

#[derive(Clone)]
pub struct Aggregator {
    hotels: Arc<dyn HotelPricing>,
    flights: Arc<dyn FlightPricing>,
}

impl Aggregator {
    pub fn new(hotels: Arc<dyn HotelPricing>, flights: Arc<dyn FlightPricing>) -> Self {
        Self { hotels, flights }
    }

    /// Both adapters share one client and therefore one cached credential.
    pub fn from_client(client: Arc<AmadeusClient>, config: &TripScoutConfig) -> Self {
        let hotels = HotelPricingAdapter::new(client.clone(), config.pricing.clone());
        let flights = FlightPricingAdapter::new(
            client,
            config.amadeus.currency.clone(),
            config.pricing.max_flights,
        );
        Self::new(Arc::new(hotels), Arc::new(flights))
    }

    /// Price every candidate and keep those with both hotel and flight offers.
    ///
    /// All candidates are validated before any provider call; one invalid candidate
    /// fails the whole run. Results follow input order.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn aggregate(
        &self,
        candidates: &[CandidateDestination],
    ) -> Result<Vec<DestinationEvidence>> {
        let trips = candidates
            .iter()
            .map(CandidateDestination::validate)
            .collect::<Result<Vec<TripRequest>>>()?;

        let priced = join_all(trips.into_iter().map(|trip| self.price(trip))).await;

        let evidence: Vec<DestinationEvidence> = priced
            .into_iter()
            .filter(|e| {
                let keep = !e.hotel_prices.is_empty() && !e.flight_prices.is_empty();
                if !keep {
                    info!(
                        "Dropping {}: {} hotel offers, {} flight offers",
                        e.destination,
                        e.hotel_prices.len(),
                        e.flight_prices.len()
                    );
                }
                keep
            })
            .collect();

        info!(
            "{} of {} destinations have live pricing",
            evidence.len(),
            candidates.len()
        );
        Ok(evidence)
    }

    async fn price(&self, trip: TripRequest) -> DestinationEvidence {
        debug!("Pricing {}", trip.destination);

        let (hotel_prices, flight_prices) = tokio::join!(
            self.hotels.fetch_hotels(
                &trip.destination_code,
                &trip.check_in_date,
                &trip.check_out_date,
                trip.travelers,
            ),
            self.flights.fetch_flights(
                &trip.origin_code,
                &trip.destination_code,
                &trip.departure_date,
                trip.travelers,
            ),
        );

        DestinationEvidence {
            destination: trip.destination,
            score: trip.score,
            hotel_prices,
            flight_prices,
        }
    }
}
