//! Resource need prediction and deployment recommendations.
//!
//! Predictions from the stand-in are fixed. Recommendations are computed
//! from the actual shortage of each allocation, so they stay meaningful
//! when a real predictor replaces the stub.

use aegis_core::metrics::{is_shortage, shortage_quantity};
use aegis_core::urgency::PriorityBand;
use aegis_core::{DisasterKind, GeoPoint, ResourceAllocation, ResourceKind, Score, Severity};
use tracing::{debug, info};

use crate::error::AiError;

/// Inputs describing an incident.
#[derive(Debug, Clone, PartialEq)]
pub struct NeedsRequest {
    pub disaster: DisasterKind,
    pub affected_area_km2: f64,
    pub population: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub kind: ResourceKind,
    pub estimated_quantity: u32,
    /// 1 is most urgent.
    pub priority: u8,
    pub confidence: Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Send units to an existing allocation's location.
    Deploy,
    /// Pre-position a predicted resource that has no allocation yet.
    Stage,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Stage => "stage",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub action: Action,
    pub kind: ResourceKind,
    pub quantity: u32,
    pub region: Option<String>,
    pub target: Option<GeoPoint>,
    pub urgency: Severity,
}

/// Service that predicts needs and recommends how to close gaps.
pub trait ResourcePredictor {
    fn predict_needs(&mut self, request: &NeedsRequest) -> Result<Vec<Prediction>, AiError>;

    /// Most urgent first.
    fn recommend(
        &self,
        current: &[ResourceAllocation],
        predicted: &[Prediction],
    ) -> Vec<Recommendation>;
}

#[derive(Debug, Clone, Default)]
pub struct StubPredictor;

impl ResourcePredictor for StubPredictor {
    fn predict_needs(&mut self, request: &NeedsRequest) -> Result<Vec<Prediction>, AiError> {
        if request.population == 0 {
            return Err(AiError::EmptyInput("population"));
        }

        let predictions = vec![
            Prediction {
                kind: ResourceKind::Medical,
                estimated_quantity: 200,
                priority: 1,
                confidence: Score::new(0.91)?,
            },
            Prediction {
                kind: ResourceKind::Rescue,
                estimated_quantity: 12,
                priority: 1,
                confidence: Score::new(0.89)?,
            },
        ];
        info!(
            disaster = request.disaster.as_str(),
            population = request.population,
            predictions = predictions.len(),
            "predicted resource needs"
        );
        Ok(predictions)
    }

    fn recommend(
        &self,
        current: &[ResourceAllocation],
        predicted: &[Prediction],
    ) -> Vec<Recommendation> {
        let mut recs: Vec<(u8, Recommendation)> = Vec::new();

        for alloc in current {
            if !is_shortage(alloc.current_allocation, alloc.estimated_need) {
                continue;
            }
            let gap = shortage_quantity(alloc.current_allocation, alloc.estimated_need);
            recs.push((
                alloc.priority,
                Recommendation {
                    action: Action::Deploy,
                    kind: alloc.kind,
                    // Positive and at most u32::MAX since current < estimated.
                    quantity: u32::try_from(gap).unwrap_or(u32::MAX),
                    region: Some(alloc.region.clone()),
                    target: Some(alloc.coordinates),
                    urgency: PriorityBand::of(alloc.priority).severity(),
                },
            ));
        }

        for pred in predicted {
            if current.iter().any(|a| a.kind == pred.kind) {
                continue;
            }
            recs.push((
                pred.priority,
                Recommendation {
                    action: Action::Stage,
                    kind: pred.kind,
                    quantity: pred.estimated_quantity,
                    region: None,
                    target: None,
                    urgency: PriorityBand::of(pred.priority).severity(),
                },
            ));
        }

        recs.sort_by(|(pa, a), (pb, b)| b.urgency.cmp(&a.urgency).then(pa.cmp(pb)));
        debug!(count = recs.len(), "built recommendations");
        recs.into_iter().map(|(_, r)| r).collect()
    }
}
