//! Hotel pricing via the Amadeus hotel list and hotel offers endpoints

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::client::{AmadeusClient, ProviderRequest};
use super::model::{HotelListResponse, HotelOffersResponse, RawHotelOffer, RawOffer};
use crate::aggregation::HotelPricing;
use crate::config::PricingConfig;
use crate::models::{HotelOffer, RoomOffer};
use crate::{Result, TripScoutError};

const HOTEL_LIST_PATH: &str = "/v1/reference-data/locations/hotels/by-city";
const HOTEL_OFFERS_PATH: &str = "/v3/shopping/hotel-offers";

/// Fetches, ranks and trims hotel offers for a city.
pub struct HotelPricingAdapter {
    client: Arc<AmadeusClient>,
    limits: PricingConfig,
}

impl HotelPricingAdapter {
    pub fn new(client: Arc<AmadeusClient>, limits: PricingConfig) -> Self {
        Self { client, limits }
    }

    async fn try_fetch_hotels(
        &self,
        location_code: &str,
        check_in: &str,
        check_out: &str,
        adults: u32,
    ) -> Result<Vec<HotelOffer>> {
        if check_in.trim().is_empty() || check_out.trim().is_empty() {
            return Err(TripScoutError::validation(
                "checkInDate and checkOutDate are required",
            ));
        }

        let list: HotelListResponse = self
            .client
            .call(&ProviderRequest::get(HOTEL_LIST_PATH).param("cityCode", location_code))
            .await?;

        let hotel_ids: Vec<String> = list
            .data
            .into_iter()
            .map(|h| h.hotel_id)
            .filter(|id| !id.is_empty())
            .take(self.limits.max_hotel_ids)
            .collect();

        if hotel_ids.is_empty() {
            debug!("No hotels listed for {}", location_code);
            return Ok(Vec::new());
        }

        let offers: HotelOffersResponse = self
            .client
            .call(
                &ProviderRequest::get(HOTEL_OFFERS_PATH)
                    .param("hotelIds", hotel_ids.join(","))
                    .param("adults", adults)
                    .param("checkInDate", check_in)
                    .param("checkOutDate", check_out),
            )
            .await?;

        Ok(normalize_hotels(offers.data, &self.limits))
    }
}

#[async_trait]
impl HotelPricing for HotelPricingAdapter {
    /// Never fails: any error yields an empty list.
    #[instrument(skip(self))]
    async fn fetch_hotels(
        &self,
        location_code: &str,
        check_in: &str,
        check_out: &str,
        adults: u32,
    ) -> Vec<HotelOffer> {
        match self
            .try_fetch_hotels(location_code, check_in, check_out, adults)
            .await
        {
            Ok(hotels) => {
                debug!("Found {} priced hotels for {}", hotels.len(), location_code);
                hotels
            }
            Err(e) => {
                warn!("Hotel price fetch failed for {}: {}", location_code, e);
                Vec::new()
            }
        }
    }
}

/// Provider rating of a hotel
#[derive(Debug, Clone, Copy, PartialEq)]
enum Rating {
    Unrated,
    Rated(f64),
    /// Present but not a number
    Unreadable,
}

impl Rating {
    fn of(hotel: &RawHotelOffer) -> Self {
        match hotel.hotel.rating.as_deref().map(str::trim) {
            None | Some("") => Rating::Unrated,
            Some(text) => match text.parse::<f64>() {
                Ok(r) if r.is_finite() => Rating::Rated(r),
                _ => Rating::Unreadable,
            },
        }
    }

    fn sort_key(self) -> f64 {
        match self {
            Rating::Rated(r) => r,
            _ => 0.0,
        }
    }

    fn passes(self, minimum: f64) -> bool {
        match self {
            Rating::Unrated => true,
            Rating::Rated(r) => r >= minimum,
            Rating::Unreadable => false,
        }
    }
}

/// Rank by rating (when any hotel is rated), drop low-rated hotels, keep the first few.
pub fn normalize_hotels(raw: Vec<RawHotelOffer>, limits: &PricingConfig) -> Vec<HotelOffer> {
    let mut rated: Vec<(Rating, RawHotelOffer)> =
        raw.into_iter().map(|h| (Rating::of(&h), h)).collect();

    if rated.iter().any(|(r, _)| *r != Rating::Unrated) {
        // stable, so equal ratings keep provider order
        rated.sort_by(|(a, _), (b, _)| b.sort_key().total_cmp(&a.sort_key()));
    }

    rated
        .into_iter()
        .filter(|(rating, _)| rating.passes(limits.min_hotel_rating))
        .take(limits.max_hotels)
        .map(|(rating, h)| HotelOffer {
            hotel_id: h.hotel.hotel_id,
            name: h.hotel.name,
            rating: match rating {
                Rating::Rated(r) => Some(r),
                _ => None,
            },
            offers: h.offers.iter().map(room_offer).collect(),
        })
        .collect()
}

fn room_offer(offer: &RawOffer) -> RoomOffer {
    RoomOffer {
        total_price: offer.price.total.clone().unwrap_or_default(),
        rooms_count: room_count(offer),
        adults: offer
            .guests
            .adults
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
    }
}

/// Rooms list length, else a positive room quantity, else 1 for a single room object.
pub fn room_count(offer: &RawOffer) -> u32 {
    if let Some(rooms) = offer.rooms.as_ref().and_then(Value::as_array) {
        return u32::try_from(rooms.len()).unwrap_or(u32::MAX);
    }

    if let Some(quantity) = offer
        .room_quantity
        .as_ref()
        .and_then(Value::as_u64)
        .filter(|q| *q > 0)
    {
        return u32::try_from(quantity).unwrap_or(u32::MAX);
    }

    if offer.room.as_ref().is_some_and(Value::is_object) {
        return 1;
    }

    0
}
