//! Amadeus self-service API integration

pub mod auth;
pub mod client;
pub mod flights;
pub mod hotels;
pub mod model;

pub use auth::{Credential, TokenCache};
pub use client::{AmadeusClient, ProviderRequest};
pub use flights::FlightPricingAdapter;
pub use hotels::HotelPricingAdapter;
