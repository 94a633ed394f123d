//! Core data models for candidate destinations and normalized pricing evidence

use serde::{Deserialize, Serialize};

use crate::{Result, TripScoutError};

/// A planner-suggested destination awaiting price validation.
///
/// Every field is optional on the wire; [`CandidateDestination::validate`] decides
/// whether the candidate can be priced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateDestination {
    #[serde(default)]
    pub destination: Option<String>,
    /// Origin airport / city code
    #[serde(default)]
    pub origin_city: Option<String>,
    /// Destination airport / city code
    #[serde(default)]
    pub destination_city: Option<String>,
    #[serde(default)]
    pub check_in_date: Option<String>,
    #[serde(default)]
    pub check_out_date: Option<String>,
    #[serde(default)]
    pub departure_date: Option<String>,
    #[serde(
        default,
        rename = "numberOfTravelers",
        deserialize_with = "lenient::opt_i64"
    )]
    pub number_of_travelers: Option<i64>,
    /// Planner relevance score
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub score: Option<f64>,
}

/// A candidate with every required field present.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub destination: String,
    pub origin_code: String,
    pub destination_code: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub departure_date: String,
    pub travelers: u32,
    pub score: Option<f64>,
}

impl CandidateDestination {
    /// Check field presence and resolve the traveler count.
    pub fn validate(&self) -> Result<TripRequest> {
        let required = |value: &Option<String>, field: &str| -> Result<String> {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => Err(TripScoutError::validation(format!(
                    "Missing required value '{field}' in candidate destination: {}",
                    self.describe()
                ))),
            }
        };

        Ok(TripRequest {
            destination: required(&self.destination, "destination")?,
            origin_code: required(&self.origin_city, "origin_city")?,
            destination_code: required(&self.destination_city, "destination_city")?,
            check_in_date: required(&self.check_in_date, "check_in_date")?,
            check_out_date: required(&self.check_out_date, "check_out_date")?,
            departure_date: required(&self.departure_date, "departure_date")?,
            travelers: self
                .number_of_travelers
                .filter(|n| *n > 0)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(1),
            score: self.score,
        })
    }

    fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// A priced hotel with its room offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelOffer {
    pub hotel_id: String,
    pub name: String,
    /// Star rating, absent when the provider does not rate the hotel
    pub rating: Option<f64>,
    pub offers: Vec<RoomOffer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomOffer {
    /// Total price as quoted by the provider
    pub total_price: String,
    pub rooms_count: u32,
    pub adults: u32,
}

/// A priced flight itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    #[serde(rename = "from_city")]
    pub origin: String,
    #[serde(rename = "to_city")]
    pub destination: String,
    pub departure_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub adults: u32,
    pub currency: String,
    pub total_price: String,
    pub duration: String,
    pub direct_flight: bool,
    pub layovers: u32,
}

/// A candidate enriched with live pricing, passed to the final planning stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationEvidence {
    pub destination: String,
    pub score: Option<f64>,
    pub hotel_prices: Vec<HotelOffer>,
    pub flight_prices: Vec<FlightOffer>,
}

/// Planner and provider payloads disagree on whether numbers are quoted.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: Option<Value>) -> Option<f64> {
        match value? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(number(Option::<Value>::deserialize(deserializer)?).filter(|n| n.is_finite()))
    }

    pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(number(Option::<Value>::deserialize(deserializer)?)
            .filter(|n| n.is_finite())
            .map(|n| n.trunc() as i64))
    }

    /// Text or number rendered as text; empty strings count as absent.
    pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }
}
