//! Flight pricing via the Amadeus flight offers search

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::client::{AmadeusClient, ProviderRequest};
use super::model::{FlightOffersResponse, RawFlightOffer};
use crate::Result;
use crate::aggregation::FlightPricing;
use crate::models::FlightOffer;

const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";

pub struct FlightPricingAdapter {
    client: Arc<AmadeusClient>,
    currency: String,
    max_flights: usize,
}

impl FlightPricingAdapter {
    pub fn new(client: Arc<AmadeusClient>, currency: impl Into<String>, max_flights: usize) -> Self {
        Self {
            client,
            currency: currency.into(),
            max_flights,
        }
    }

    async fn try_fetch_flights(
        &self,
        origin: &str,
        destination: &str,
        departure_date: &str,
        adults: u32,
    ) -> Result<Vec<FlightOffer>> {
        let offers: FlightOffersResponse = self
            .client
            .call(
                &ProviderRequest::get(FLIGHT_OFFERS_PATH)
                    .param("originLocationCode", origin)
                    .param("destinationLocationCode", destination)
                    .param("departureDate", departure_date)
                    .param("adults", adults)
                    .param("currencyCode", &self.currency),
            )
            .await?;

        Ok(normalize_flights(offers.data, self.max_flights))
    }
}

#[async_trait]
impl FlightPricing for FlightPricingAdapter {
    /// Never fails: any error yields an empty list.
    #[instrument(skip(self))]
    async fn fetch_flights(
        &self,
        origin: &str,
        destination: &str,
        departure_date: &str,
        adults: u32,
    ) -> Vec<FlightOffer> {
        match self
            .try_fetch_flights(origin, destination, departure_date, adults)
            .await
        {
            Ok(flights) => {
                debug!(
                    "Found {} flight offers {} -> {}",
                    flights.len(),
                    origin,
                    destination
                );
                flights
            }
            Err(e) => {
                warn!(
                    "Flight price fetch failed for {} -> {}: {}",
                    origin, destination, e
                );
                Vec::new()
            }
        }
    }
}

/// First `max_flights` offers in provider order
pub fn normalize_flights(raw: Vec<RawFlightOffer>, max_flights: usize) -> Vec<FlightOffer> {
    raw.into_iter().take(max_flights).map(flight_offer).collect()
}

fn flight_offer(offer: RawFlightOffer) -> FlightOffer {
    let outbound = offer.itineraries.first();
    let segments = outbound.map(|i| i.segments.as_slice()).unwrap_or_default();
    let first = segments.first();
    let last = segments.last();

    let return_date = offer
        .itineraries
        .get(1)
        .and_then(|i| i.segments.first())
        .map(|s| s.departure.at.clone())
        .filter(|at| !at.is_empty());

    let segment_count = u32::try_from(segments.len()).unwrap_or(u32::MAX).max(1);
    let has_adult = offer
        .traveler_pricings
        .iter()
        .any(|t| t.traveler_type == "ADULT");

    FlightOffer {
        origin: first.map(|s| s.departure.iata_code.clone()).unwrap_or_default(),
        destination: last.map(|s| s.arrival.iata_code.clone()).unwrap_or_default(),
        departure_date: first.map(|s| s.departure.at.clone()).unwrap_or_default(),
        return_date,
        adults: u32::from(has_adult),
        currency: offer.price.currency,
        total_price: offer.price.total.unwrap_or_default(),
        duration: outbound.map(|i| i.duration.clone()).unwrap_or_default(),
        direct_flight: segments.len() == 1,
        layovers: segment_count - 1,
    }
}
