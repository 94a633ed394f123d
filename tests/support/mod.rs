//! In-process stand-in for the Amadeus API
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use tripscout::AmadeusClient;
use tripscout::config::{AmadeusConfig, TripScoutConfig};

pub const API_KEY: &str = "test-key";
pub const API_SECRET: &str = "test-secret";

/// Ratings handed out by hotel position, cycling
const RATINGS: [Option<&str>; 4] = [Some("2.5"), Some("4"), None, Some("3")];

pub struct FakeState {
    pub token_requests: AtomicUsize,
    pub api_requests: AtomicUsize,
    /// Lifetime reported for issued tokens
    pub expires_in: AtomicU64,
    pub token_delay_ms: AtomicU64,
    /// Status for token requests; 200 issues a token
    pub auth_status: AtomicU16,
    /// Upcoming API calls answered with the expired-token 401
    pub expire_next: AtomicUsize,
    /// Tokens answered with the expired-token 401 on every use
    pub revoked_tokens: Mutex<HashSet<String>>,
    /// Answer every API call with this status and raw body
    pub forced_response: Mutex<Option<(u16, String)>>,
    pub hotels_per_city: Mutex<HashMap<String, usize>>,
    /// Destination codes without any flights
    pub unserved_routes: Mutex<HashSet<String>>,
    pub bearers: Mutex<Vec<String>>,
    pub last_hotel_ids: Mutex<Vec<String>>,
    pub last_flight_query: Mutex<HashMap<String, String>>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            token_requests: AtomicUsize::new(0),
            api_requests: AtomicUsize::new(0),
            expires_in: AtomicU64::new(1799),
            token_delay_ms: AtomicU64::new(0),
            auth_status: AtomicU16::new(200),
            expire_next: AtomicUsize::new(0),
            revoked_tokens: Mutex::new(HashSet::new()),
            forced_response: Mutex::new(None),
            hotels_per_city: Mutex::new(HashMap::new()),
            unserved_routes: Mutex::new(HashSet::new()),
            bearers: Mutex::new(Vec::new()),
            last_hotel_ids: Mutex::new(Vec::new()),
            last_flight_query: Mutex::new(HashMap::new()),
        }
    }
}

impl FakeState {
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn api_requests(&self) -> usize {
        self.api_requests.load(Ordering::SeqCst)
    }

    pub fn set_expires_in(&self, seconds: u64) {
        self.expires_in.store(seconds, Ordering::SeqCst);
    }

    pub fn set_token_delay(&self, delay: Duration) {
        self.token_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set_auth_status(&self, status: u16) {
        self.auth_status.store(status, Ordering::SeqCst);
    }

    pub fn expire_next(&self, calls: usize) {
        self.expire_next.store(calls, Ordering::SeqCst);
    }

    pub fn revoke(&self, token: &str) {
        self.revoked_tokens
            .lock()
            .unwrap()
            .insert(token.to_string());
    }

    pub fn force_response(&self, status: u16, body: &str) {
        *self.forced_response.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn set_hotel_count(&self, city: &str, count: usize) {
        self.hotels_per_city
            .lock()
            .unwrap()
            .insert(city.to_string(), count);
    }

    pub fn unserve(&self, destination: &str) {
        self.unserved_routes
            .lock()
            .unwrap()
            .insert(destination.to_string());
    }

    pub fn bearers(&self) -> Vec<String> {
        self.bearers.lock().unwrap().clone()
    }

    pub fn last_hotel_ids(&self) -> Vec<String> {
        self.last_hotel_ids.lock().unwrap().clone()
    }

    pub fn last_flight_query(&self) -> HashMap<String, String> {
        self.last_flight_query.lock().unwrap().clone()
    }

    /// Bookkeeping shared by every data endpoint; `Some` short-circuits the handler.
    fn gate(&self, headers: &HeaderMap) -> Option<Response> {
        self.api_requests.fetch_add(1, Ordering::SeqCst);

        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);
        if let Some(token) = &bearer {
            self.bearers.lock().unwrap().push(token.clone());
        }

        if let Some((status, body)) = self.forced_response.lock().unwrap().clone() {
            return Some(
                (
                    StatusCode::from_u16(status).unwrap(),
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
                    .into_response(),
            );
        }

        let expired = self
            .expire_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if expired {
            return Some(unauthorized(38192, "Access token expired"));
        }

        let revoked = bearer
            .as_ref()
            .is_some_and(|token| self.revoked_tokens.lock().unwrap().contains(token));
        if revoked {
            return Some(unauthorized(38192, "Access token expired"));
        }

        if bearer.is_none() {
            return Some(unauthorized(38190, "Invalid access token"));
        }

        None
    }
}

fn unauthorized(code: i64, title: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"errors": [{"code": code, "title": title, "status": 401}]})),
    )
        .into_response()
}

pub struct FakeAmadeus {
    pub addr: SocketAddr,
    pub state: Arc<FakeState>,
}

impl FakeAmadeus {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());

        let app = Router::new()
            .route("/v1/security/oauth2/token", post(token))
            .route("/v1/reference-data/locations/hotels/by-city", get(hotel_list))
            .route("/v3/shopping/hotel-offers", get(hotel_offers))
            .route("/v2/shopping/flight-offers", get(flight_offers))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn amadeus_config(&self) -> AmadeusConfig {
        AmadeusConfig {
            api_key: Some(API_KEY.to_string()),
            api_secret: Some(API_SECRET.to_string()),
            base_url: self.base_url(),
            timeout_seconds: 5,
            ..AmadeusConfig::default()
        }
    }

    pub fn config(&self) -> TripScoutConfig {
        TripScoutConfig {
            amadeus: self.amadeus_config(),
            ..TripScoutConfig::default()
        }
    }

    pub fn client(&self) -> Arc<AmadeusClient> {
        Arc::new(AmadeusClient::new(&self.amadeus_config()).unwrap())
    }
}

async fn token(
    State(state): State<Arc<FakeState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let issued = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;

    let delay = state.token_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let status = state.auth_status.load(Ordering::SeqCst);
    let valid = form.get("grant_type").map(String::as_str) == Some("client_credentials")
        && form.get("client_id").map(String::as_str) == Some(API_KEY)
        && form.get("client_secret").map(String::as_str) == Some(API_SECRET);

    if status != 200 || !valid {
        let status = if status == 200 { 401 } else { status };
        return (
            StatusCode::from_u16(status).unwrap(),
            Json(json!({"error": "invalid_client", "code": 38187})),
        )
            .into_response();
    }

    Json(json!({
        "type": "amadeusOAuth2Token",
        "access_token": format!("token-{issued}"),
        "token_type": "Bearer",
        "expires_in": state.expires_in.load(Ordering::SeqCst),
        "state": "approved"
    }))
    .into_response()
}

async fn hotel_list(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = state.gate(&headers) {
        return response;
    }

    let city = query.get("cityCode").cloned().unwrap_or_default();
    let count = state
        .hotels_per_city
        .lock()
        .unwrap()
        .get(&city)
        .copied()
        .unwrap_or(4);

    let data: Vec<Value> = (0..count)
        .map(|i| json!({"hotelId": format!("HL{city}{i:03}"), "name": format!("{city} hotel {i}")}))
        .collect();
    Json(json!({ "data": data })).into_response()
}

async fn hotel_offers(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = state.gate(&headers) {
        return response;
    }

    let ids: Vec<String> = query
        .get("hotelIds")
        .map(|ids| ids.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    *state.last_hotel_ids.lock().unwrap() = ids.clone();

    let adults: u64 = query
        .get("adults")
        .and_then(|a| a.parse().ok())
        .unwrap_or(1);

    let data: Vec<Value> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let mut hotel = json!({"hotelId": id, "name": format!("Hotel {id}")});
            if let Some(rating) = RATINGS[i % RATINGS.len()] {
                hotel["rating"] = json!(rating);
            }
            json!({
                "type": "hotel-offers",
                "hotel": hotel,
                "offers": [{
                    "price": {"currency": "INR", "total": format!("{}.00", 4000 + i * 250)},
                    "roomQuantity": 1,
                    "guests": {"adults": adults}
                }]
            })
        })
        .collect();
    Json(json!({ "data": data })).into_response()
}

async fn flight_offers(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = state.gate(&headers) {
        return response;
    }
    *state.last_flight_query.lock().unwrap() = query.clone();

    let origin = query.get("originLocationCode").cloned().unwrap_or_default();
    let destination = query
        .get("destinationLocationCode")
        .cloned()
        .unwrap_or_default();
    let date = query.get("departureDate").cloned().unwrap_or_default();
    let currency = query.get("currencyCode").cloned().unwrap_or_default();

    if state.unserved_routes.lock().unwrap().contains(&destination) {
        return Json(json!({"meta": {"count": 0}, "data": []})).into_response();
    }

    Json(json!({
        "meta": {"count": 2},
        "data": [
            {
                "itineraries": [{
                    "duration": "PT2H10M",
                    "segments": [{
                        "departure": {"iataCode": origin, "at": format!("{date}T06:00:00")},
                        "arrival": {"iataCode": destination, "at": format!("{date}T08:10:00")}
                    }]
                }],
                "travelerPricings": [{"travelerType": "ADULT"}],
                "price": {"currency": currency, "total": "5400.00"}
            },
            {
                "itineraries": [{
                    "duration": "PT6H40M",
                    "segments": [
                        {
                            "departure": {"iataCode": origin, "at": format!("{date}T09:00:00")},
                            "arrival": {"iataCode": "DEL", "at": format!("{date}T11:00:00")}
                        },
                        {
                            "departure": {"iataCode": "DEL", "at": format!("{date}T13:20:00")},
                            "arrival": {"iataCode": destination, "at": format!("{date}T15:40:00")}
                        }
                    ]
                }],
                "travelerPricings": [{"travelerType": "ADULT"}],
                "price": {"currency": currency, "total": "3900.00"}
            }
        ]
    }))
    .into_response()
}
