//! Read-model records produced by the ingestion and inference services.
//!
//! Records are immutable values. Field names serialise in camelCase and
//! enum variants in lowercase, matching the feed's JSON. Each record has a
//! `validate` method that re-checks its invariants; sources call it before
//! handing records to consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ModelError;
use crate::urgency::{Priority, Severity};

// ── Primitives ──

/// A `(latitude, longitude)` pair, serialised as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.lat.is_finite() && self.lon.is_finite() {
            Ok(())
        } else {
            Err(ModelError::NonFiniteCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lat, p.lon]
    }
}

/// A value in `[0, 1]`: detection confidence or route safety.
///
/// Only constructible through [`Score::new`] (or deserialisation, which
/// goes through the same check), so a held `Score` is always in range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub const ZERO: Score = Score(0.0);
    pub const ONE: Score = Score(1.0);

    /// Fails with [`ModelError::InvalidRange`] outside `[0, 1]` or for NaN.
    pub fn new(value: f64) -> Result<Self, ModelError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ModelError::InvalidRange {
                what: "score",
                value,
                min: 0.0,
                max: 1.0,
            })
        }
    }

    /// Seed-data constructor for literals known to be in range.
    pub(crate) const fn literal(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }
}

impl TryFrom<f64> for Score {
    type Error = ModelError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(s: Score) -> Self {
        s.0
    }
}

fn validate_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Result<(), ModelError> {
    points.into_iter().try_for_each(GeoPoint::validate)
}

fn not_after(what: &'static str, at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ModelError> {
    if at > now {
        return Err(ModelError::FutureTimestamp { what, at });
    }
    Ok(())
}

// ── Disaster zones ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisasterKind {
    Flood,
    Fire,
    Earthquake,
    Storm,
}

impl DisasterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flood => "flood",
            Self::Fire => "fire",
            Self::Earthquake => "earthquake",
            Self::Storm => "storm",
        }
    }
}

/// A geographic polygon flagged as disaster-affected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterZone {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DisasterKind,
    pub severity: Severity,
    #[serde(rename = "coordinates")]
    pub polygon: Vec<GeoPoint>,
    pub detected_at: DateTime<Utc>,
    pub confidence: Score,
}

impl DisasterZone {
    /// Polygon has at least 3 finite points and detection is not in the future.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ModelError> {
        if self.polygon.len() < 3 {
            return Err(ModelError::DegeneratePolygon {
                points: self.polygon.len(),
            });
        }
        validate_points(&self.polygon)?;
        not_after("detectedAt", self.detected_at, now)
    }
}

// ── Emergency messages ──

/// An inbound message after NLP classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyMessage {
    pub id: String,
    pub content: String,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub classification: String,
    pub confidence: Score,
    pub processed: bool,
}

impl EmergencyMessage {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ModelError> {
        if let Some(loc) = &self.location {
            loc.validate()?;
        }
        not_after("timestamp", self.timestamp, now)
    }
}

// ── Evacuation routes ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Available,
    Congested,
    Blocked,
}

impl RouteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Congested => "congested",
            Self::Blocked => "blocked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationRoute {
    pub id: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
    /// Minutes.
    pub estimated_time: u32,
    pub safety_score: Score,
    /// People the route can move.
    pub capacity: u32,
    pub status: RouteStatus,
}

impl EvacuationRoute {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_points(self.path())
    }

    /// Start, waypoints in order, then end.
    pub fn path(&self) -> impl Iterator<Item = &GeoPoint> {
        std::iter::once(&self.start)
            .chain(&self.waypoints)
            .chain(std::iter::once(&self.end))
    }

    pub fn is_passable(&self) -> bool {
        self.status != RouteStatus::Blocked
    }
}

// ── Resource allocations ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Medical,
    Rescue,
    Shelter,
    Supplies,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Rescue => "rescue",
            Self::Shelter => "shelter",
            Self::Supplies => "supplies",
        }
    }
}

/// Deployed resources against estimated need for one region.
///
/// `current_allocation` may exceed `estimated_need` (surplus) or fall short
/// of it; metrics in [`crate::metrics`] report either case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAllocation {
    pub id: String,
    pub region: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub quantity: u32,
    /// 1 is most urgent.
    pub priority: u8,
    pub estimated_need: u32,
    pub current_allocation: u32,
    pub coordinates: GeoPoint,
}

impl ResourceAllocation {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.priority == 0 {
            return Err(ModelError::InvalidPriority);
        }
        self.coordinates.validate()
    }
}

// ── System status ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelState {
    Active,
    Inactive,
    Processing,
}

impl ModelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Processing => "processing",
        }
    }

    /// Operator-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Online",
            Self::Inactive => "Offline",
            Self::Processing => "Processing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub cv_model: ModelState,
    pub nlp_model: ModelState,
    pub route_optimizer: ModelState,
    pub resource_predictor: ModelState,
    pub last_update: DateTime<Utc>,
}

impl SystemStatus {
    /// Subsystem states in display order.
    pub fn states(&self) -> [(&'static str, ModelState); 4] {
        [
            ("CV Model", self.cv_model),
            ("NLP Model", self.nlp_model),
            ("Route Optimizer", self.route_optimizer),
            ("Resource Predictor", self.resource_predictor),
        ]
    }

    pub fn all_online(&self) -> bool {
        self.states()
            .iter()
            .all(|(_, state)| *state == ModelState::Active)
    }

    /// Copy with `last_update` moved to `at`. Never moves it backwards.
    pub fn refresh(&self, at: DateTime<Utc>) -> Self {
        let last_update = if at < self.last_update {
            warn!(
                previous = %self.last_update,
                requested = %at,
                "status refresh went backwards, keeping previous timestamp"
            );
            self.last_update
        } else {
            at
        };
        Self {
            last_update,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(40.7589, -73.9851),
            GeoPoint::new(40.7609, -73.9831),
            GeoPoint::new(40.7569, -73.9811),
            GeoPoint::new(40.7549, -73.9831),
        ]
    }

    fn zone(polygon: Vec<GeoPoint>) -> DisasterZone {
        DisasterZone {
            id: "z1".into(),
            kind: DisasterKind::Flood,
            severity: Severity::High,
            polygon,
            detected_at: now() - Duration::minutes(30),
            confidence: Score::new(0.94).unwrap(),
        }
    }

    #[test]
    fn score_accepts_bounds() {
        assert_eq!(Score::new(0.0).unwrap(), Score::ZERO);
        assert_eq!(Score::new(1.0).unwrap(), Score::ONE);
        assert!((Score::new(0.875).unwrap().percent() - 87.5).abs() < 1e-9);
    }

    #[test]
    fn score_rejects_out_of_range() {
        for bad in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            let err = Score::new(bad).unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidRange { what: "score", .. }),
                "{bad} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn score_deserialise_is_checked() {
        assert!(serde_json::from_str::<Score>("0.5").is_ok());
        assert!(serde_json::from_str::<Score>("1.5").is_err());
    }

    #[test]
    fn zone_with_three_points_is_valid() {
        let mut polygon = square();
        polygon.pop();
        assert!(zone(polygon).validate(now()).is_ok());
    }

    #[test]
    fn zone_rejects_degenerate_polygon() {
        let err = zone(square()[..2].to_vec()).validate(now()).unwrap_err();
        assert_eq!(err, ModelError::DegeneratePolygon { points: 2 });
    }

    #[test]
    fn zone_rejects_non_finite_point() {
        let mut polygon = square();
        polygon[1].lat = f64::NAN;
        let err = zone(polygon).validate(now()).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteCoordinate { .. }));
    }

    #[test]
    fn zone_rejects_future_detection() {
        let mut z = zone(square());
        z.detected_at = now() + Duration::seconds(1);
        assert!(matches!(
            z.validate(now()),
            Err(ModelError::FutureTimestamp {
                what: "detectedAt",
                ..
            })
        ));
    }

    #[test]
    fn message_timestamp_equal_to_now_is_valid() {
        let msg = EmergencyMessage {
            id: "m1".into(),
            content: "Need medical supplies".into(),
            priority: Priority::High,
            timestamp: now(),
            location: None,
            classification: "medical_request".into(),
            confidence: Score::new(0.87).unwrap(),
            processed: true,
        };
        assert!(msg.validate(now()).is_ok());

        let late = EmergencyMessage {
            timestamp: now() + Duration::minutes(1),
            ..msg
        };
        assert!(late.validate(now()).is_err());
    }

    #[test]
    fn zone_json_matches_feed_shape() {
        let json = r#"{
            "id": "2",
            "type": "fire",
            "severity": "critical",
            "coordinates": [[40.7489, -73.9951], [40.7509, -73.9931], [40.7469, -73.9911]],
            "detectedAt": "2026-03-14T11:45:00Z",
            "confidence": 0.89
        }"#;
        let z: DisasterZone = serde_json::from_str(json).unwrap();
        assert_eq!(z.kind, DisasterKind::Fire);
        assert_eq!(z.severity, Severity::Critical);
        assert_eq!(z.polygon[0], GeoPoint::new(40.7489, -73.9951));
        assert!(z.validate(now()).is_ok());
    }

    #[test]
    fn zone_json_with_bad_confidence_is_rejected() {
        let json = r#"{
            "id": "2", "type": "fire", "severity": "critical",
            "coordinates": [[0, 0], [0, 1], [1, 1]],
            "detectedAt": "2026-03-14T11:45:00Z",
            "confidence": 1.2
        }"#;
        assert!(serde_json::from_str::<DisasterZone>(json).is_err());
    }

    #[test]
    fn route_path_runs_start_to_end() {
        let route = EvacuationRoute {
            id: "r1".into(),
            start: GeoPoint::new(1.0, 1.0),
            end: GeoPoint::new(4.0, 4.0),
            waypoints: vec![GeoPoint::new(2.0, 2.0), GeoPoint::new(3.0, 3.0)],
            estimated_time: 25,
            safety_score: Score::new(0.85).unwrap(),
            capacity: 500,
            status: RouteStatus::Blocked,
        };
        let lats: Vec<f64> = route.path().map(|p| p.lat).collect();
        assert_eq!(lats, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(!route.is_passable());
        assert!(route.validate().is_ok());
    }

    #[test]
    fn allocation_priority_zero_is_invalid() {
        let alloc = ResourceAllocation {
            id: "a".into(),
            region: "Zone Alpha".into(),
            kind: ResourceKind::Medical,
            quantity: 150,
            priority: 0,
            estimated_need: 200,
            current_allocation: 75,
            coordinates: GeoPoint::new(40.7629, -73.9791),
        };
        assert_eq!(alloc.validate(), Err(ModelError::InvalidPriority));
        assert!(
            ResourceAllocation {
                priority: 1,
                ..alloc
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn status_refresh_never_goes_backwards() {
        let status = SystemStatus {
            cv_model: ModelState::Active,
            nlp_model: ModelState::Active,
            route_optimizer: ModelState::Processing,
            resource_predictor: ModelState::Active,
            last_update: now(),
        };

        let later = status.refresh(now() + Duration::seconds(5));
        assert_eq!(later.last_update, now() + Duration::seconds(5));

        let earlier = later.refresh(now());
        assert_eq!(earlier.last_update, now() + Duration::seconds(5));
        assert_eq!(earlier.route_optimizer, ModelState::Processing);
    }

    #[test]
    fn status_labels_and_online() {
        let mut status = SystemStatus {
            cv_model: ModelState::Active,
            nlp_model: ModelState::Active,
            route_optimizer: ModelState::Active,
            resource_predictor: ModelState::Active,
            last_update: now(),
        };
        assert!(status.all_online());
        status.nlp_model = ModelState::Inactive;
        assert!(!status.all_online());
        assert_eq!(status.states()[1], ("NLP Model", ModelState::Inactive));
        assert_eq!(ModelState::Inactive.label(), "Offline");
        assert_eq!(ModelState::Processing.label(), "Processing");
    }
}
