//! Evacuation route planning.
//!
//! The stand-in does no optimisation: each start point is joined in a
//! straight line to its nearest safe zone, with the fixed time, safety, and
//! capacity figures the planning service reports for a clear road.

use aegis_core::{EvacuationRoute, GeoPoint, ModelError, RouteStatus, Score};
use tracing::info;

use crate::error::AiError;

/// Inputs to a planning run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteRequest {
    pub start_points: Vec<GeoPoint>,
    pub safe_zones: Vec<GeoPoint>,
    /// Hazard polygons for the router to take into account.
    pub hazards: Vec<Vec<GeoPoint>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    pub id: String,
    pub path: Vec<GeoPoint>,
    /// Minutes.
    pub estimated_time: u32,
    pub safety_score: Score,
    pub capacity: u32,
}

impl PlannedRoute {
    /// Split the path into start, waypoints, and end.
    pub fn into_route(self, status: RouteStatus) -> Result<EvacuationRoute, ModelError> {
        let len = self.path.len();
        let mut points = self.path.into_iter();
        let (Some(start), Some(end)) = (points.next(), points.next_back()) else {
            return Err(ModelError::ShortPath { points: len });
        };
        let route = EvacuationRoute {
            id: self.id,
            start,
            end,
            waypoints: points.collect(),
            estimated_time: self.estimated_time,
            safety_score: self.safety_score,
            capacity: self.capacity,
            status,
        };
        route.validate()?;
        Ok(route)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub routes: Vec<PlannedRoute>,
    pub processing_secs: f64,
}

/// A live re-plan of one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteAdjustment {
    pub updated_path: Vec<GeoPoint>,
    pub adjustments: Vec<String>,
}

/// Routing service that plans and re-plans evacuation routes.
pub trait RouteOptimizer {
    fn find_routes(&mut self, request: &RouteRequest) -> Result<RoutePlan, AiError>;

    fn optimize_real_time(&mut self, route_id: &str) -> Result<RouteAdjustment, AiError>;
}

/// Nearest-safe-zone stand-in. Remembers its last plan for re-planning.
/// Hazards are counted, not routed around.
#[derive(Debug, Clone, Default)]
pub struct StubRouter {
    last_plan: Vec<PlannedRoute>,
    hazards_seen: usize,
}

impl RouteOptimizer for StubRouter {
    fn find_routes(&mut self, request: &RouteRequest) -> Result<RoutePlan, AiError> {
        if request.start_points.is_empty() {
            return Err(AiError::EmptyInput("start points"));
        }
        if request.safe_zones.is_empty() {
            return Err(AiError::EmptyInput("safe zones"));
        }

        let mut routes = Vec::with_capacity(request.start_points.len());
        for (i, start) in request.start_points.iter().enumerate() {
            let Some(safe) = nearest(start, &request.safe_zones) else {
                continue;
            };
            let mid = GeoPoint::new((start.lat + safe.lat) / 2.0, (start.lon + safe.lon) / 2.0);
            routes.push(PlannedRoute {
                id: format!("route_{}", i + 1),
                path: vec![*start, mid, *safe],
                estimated_time: 25,
                safety_score: Score::new(0.85)?,
                capacity: 500,
            });
        }

        self.last_plan.clone_from(&routes);
        self.hazards_seen = request.hazards.len();
        info!(
            routes = routes.len(),
            hazards = request.hazards.len(),
            "planned evacuation routes"
        );
        Ok(RoutePlan {
            routes,
            processing_secs: 2.8,
        })
    }

    fn optimize_real_time(&mut self, route_id: &str) -> Result<RouteAdjustment, AiError> {
        let route = self
            .last_plan
            .iter()
            .find(|r| r.id == route_id)
            .ok_or_else(|| AiError::UnknownRoute(route_id.to_string()))?;

        let adjustments = if self.hazards_seen > 0 {
            vec![
                "Avoiding flooded intersection".to_string(),
                "Rerouting through safe zone".to_string(),
            ]
        } else {
            Vec::new()
        };
        Ok(RouteAdjustment {
            updated_path: route.path.clone(),
            adjustments,
        })
    }
}

/// Closest point by squared degree distance. Good enough at city scale.
fn nearest<'a>(from: &GeoPoint, candidates: &'a [GeoPoint]) -> Option<&'a GeoPoint> {
    let dist = |p: &GeoPoint| (p.lat - from.lat).powi(2) + (p.lon - from.lon).powi(2);
    candidates
        .iter()
        .min_by(|a, b| dist(*a).total_cmp(&dist(*b)))
}
