//! Raw Amadeus payloads
//!
//! Every field defaults when absent so partially populated records still decode;
//! the adapters decide what a missing value means.

use serde::Deserialize;
use serde_json::Value;

use crate::models::lenient;

/// Error code Amadeus returns with a 401 when the bearer token has expired
pub const ACCESS_TOKEN_EXPIRED: i64 = 38192;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorEntry {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub code: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorResponse {
    /// Whether the first reported error is the expired-token code
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        self.errors
            .first()
            .and_then(|e| e.code)
            .is_some_and(|code| code == ACCESS_TOKEN_EXPIRED)
    }
}

// hotels

#[derive(Debug, Default, Deserialize)]
pub struct HotelListResponse {
    #[serde(default)]
    pub data: Vec<HotelReference>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HotelReference {
    #[serde(default, rename = "hotelId")]
    pub hotel_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HotelOffersResponse {
    #[serde(default)]
    pub data: Vec<RawHotelOffer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawHotelOffer {
    #[serde(default)]
    pub hotel: RawHotel,
    #[serde(default)]
    pub offers: Vec<RawOffer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawHotel {
    #[serde(default, rename = "hotelId")]
    pub hotel_id: String,
    #[serde(default)]
    pub name: String,
    /// Star rating, usually a quoted number such as "4"
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub rating: Option<String>,
}

/// One priced room offer.
///
/// The room fields arrive with inconsistent shapes across hotels, so they are kept
/// as raw JSON and interpreted by the hotel adapter.
#[derive(Debug, Default, Deserialize)]
pub struct RawOffer {
    #[serde(default)]
    pub price: RawPrice,
    #[serde(default)]
    pub rooms: Option<Value>,
    #[serde(default, rename = "roomQuantity")]
    pub room_quantity: Option<Value>,
    #[serde(default)]
    pub room: Option<Value>,
    #[serde(default)]
    pub guests: RawGuests,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPrice {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub total: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawGuests {
    #[serde(default)]
    pub adults: Option<Value>,
}

// flights

#[derive(Debug, Default, Deserialize)]
pub struct FlightOffersResponse {
    #[serde(default)]
    pub data: Vec<RawFlightOffer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawFlightOffer {
    #[serde(default)]
    pub itineraries: Vec<RawItinerary>,
    #[serde(default, rename = "travelerPricings")]
    pub traveler_pricings: Vec<RawTravelerPricing>,
    #[serde(default)]
    pub price: RawFlightPrice,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawItinerary {
    /// ISO 8601 duration, e.g. "PT2H10M"
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub departure: RawEndpoint,
    #[serde(default)]
    pub arrival: RawEndpoint,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawEndpoint {
    #[serde(default, rename = "iataCode")]
    pub iata_code: String,
    #[serde(default)]
    pub at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTravelerPricing {
    #[serde(default, rename = "travelerType")]
    pub traveler_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawFlightPrice {
    #[serde(default)]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub total: Option<String>,
}
