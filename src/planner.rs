//! Two-pass recommendation pipeline around the pricing aggregator
//!
//! A planner proposes candidate destinations, the aggregator prices them, and the
//! planner turns the priced evidence into the final trip plan.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::aggregation::Aggregator;
use crate::models::CandidateDestination;
use crate::{Result, TripScoutError};

/// Questionnaire answers forwarded verbatim to the planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub answers: Value,
    #[serde(default)]
    pub question_context: Value,
}

/// Language model backed planner. Both passes return the raw message content.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Pass one: a JSON array of candidate destinations
    async fn propose_destinations(&self, request: &RecommendationRequest) -> Result<String>;

    /// Pass two: the final plan, given the priced evidence as compact JSON
    async fn final_recommendation(
        &self,
        request: &RecommendationRequest,
        evidence_json: &str,
    ) -> Result<String>;
}

#[derive(Clone)]
pub struct RecommendationService {
    planner: Arc<dyn Planner>,
    aggregator: Aggregator,
}

impl RecommendationService {
    pub fn new(planner: Arc<dyn Planner>, aggregator: Aggregator) -> Self {
        Self {
            planner,
            aggregator,
        }
    }

    #[instrument(skip_all)]
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<Value> {
        let proposal = self.planner.propose_destinations(request).await?;
        let candidates = parse_candidates(&proposal)?;
        info!("Planner proposed {} destinations", candidates.len());

        let evidence = self.aggregator.aggregate(&candidates).await?;
        let evidence_json = serde_json::to_string(&evidence).map_err(|e| {
            TripScoutError::planner(format!("Failed to serialize pricing evidence: {e}"))
        })?;

        let content = self
            .planner
            .final_recommendation(request, &evidence_json)
            .await?;

        Ok(serde_json::from_str(strip_code_fence(&content)).unwrap_or_else(|e| {
            warn!("Failed to parse final planner response: {}", e);
            json!({ "trip_plan": [] })
        }))
    }
}

fn parse_candidates(content: &str) -> Result<Vec<CandidateDestination>> {
    let value: Value = serde_json::from_str(strip_code_fence(content)).map_err(|e| {
        TripScoutError::planner(format!("Failed to parse initial planner response, {e}"))
    })?;

    if !value.is_array() {
        return Err(TripScoutError::planner(
            "Initial destinations is not an array",
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        TripScoutError::planner(format!("Failed to parse initial planner response, {e}"))
    })
}

/// Models sometimes wrap JSON in a markdown code block.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}
