//! Seed data standing in for the ingestion and inference pipeline.
//!
//! Relative timestamps ("detected 30 minutes ago") are anchored on the
//! `now` given at construction, so two sources built with the same instant
//! return identical data.

use chrono::{DateTime, Duration, Utc};

use crate::model::{
    DisasterKind, DisasterZone, EmergencyMessage, EvacuationRoute, GeoPoint, ModelState,
    ResourceAllocation, ResourceKind, RouteStatus, Score, SystemStatus,
};
use crate::source::DataSource;
use crate::urgency::{Priority, Severity};

/// Fixed demonstration data for a Manhattan flood and fire.
#[derive(Debug, Clone)]
pub struct MockSource {
    now: DateTime<Utc>,
}

impl MockSource {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn anchored_at(&self) -> DateTime<Utc> {
        self.now
    }
}

const fn pt(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon)
}

impl DataSource for MockSource {
    fn list_disaster_zones(&self) -> Vec<DisasterZone> {
        vec![
            DisasterZone {
                id: "1".into(),
                kind: DisasterKind::Flood,
                severity: Severity::High,
                polygon: vec![
                    pt(40.7589, -73.9851),
                    pt(40.7609, -73.9831),
                    pt(40.7569, -73.9811),
                    pt(40.7549, -73.9831),
                ],
                detected_at: self.now - Duration::minutes(30),
                confidence: Score::literal(0.94),
            },
            DisasterZone {
                id: "2".into(),
                kind: DisasterKind::Fire,
                severity: Severity::Critical,
                polygon: vec![
                    pt(40.7489, -73.9951),
                    pt(40.7509, -73.9931),
                    pt(40.7469, -73.9911),
                    pt(40.7449, -73.9931),
                ],
                detected_at: self.now - Duration::minutes(15),
                confidence: Score::literal(0.89),
            },
        ]
    }

    fn list_messages(&self) -> Vec<EmergencyMessage> {
        vec![
            EmergencyMessage {
                id: "1".into(),
                content: "Building collapse on 5th Avenue, multiple people trapped".into(),
                priority: Priority::Critical,
                timestamp: self.now - Duration::minutes(5),
                location: Some(pt(40.7529, -73.9891)),
                classification: "structure_collapse".into(),
                confidence: Score::literal(0.96),
                processed: false,
            },
            EmergencyMessage {
                id: "2".into(),
                content: "Need medical supplies at evacuation center".into(),
                priority: Priority::High,
                timestamp: self.now - Duration::minutes(10),
                location: Some(pt(40.7629, -73.9791)),
                classification: "medical_request".into(),
                confidence: Score::literal(0.87),
                processed: true,
            },
            EmergencyMessage {
                id: "3".into(),
                content: "Family of 4 requesting evacuation from flooded area".into(),
                priority: Priority::High,
                timestamp: self.now - Duration::minutes(2),
                location: Some(pt(40.7579, -73.9841)),
                classification: "evacuation_request".into(),
                confidence: Score::literal(0.91),
                processed: false,
            },
        ]
    }

    fn list_routes(&self) -> Vec<EvacuationRoute> {
        vec![
            EvacuationRoute {
                id: "1".into(),
                start: pt(40.7589, -73.9851),
                end: pt(40.7689, -73.9751),
                waypoints: vec![
                    pt(40.7609, -73.9831),
                    pt(40.7639, -73.9801),
                    pt(40.7669, -73.9771),
                ],
                estimated_time: 25,
                safety_score: Score::literal(0.85),
                capacity: 500,
                status: RouteStatus::Available,
            },
            EvacuationRoute {
                id: "2".into(),
                start: pt(40.7489, -73.9951),
                end: pt(40.7389, -73.9851),
                waypoints: vec![
                    pt(40.7459, -73.9921),
                    pt(40.7429, -73.9891),
                    pt(40.7399, -73.9871),
                ],
                estimated_time: 35,
                safety_score: Score::literal(0.72),
                capacity: 300,
                status: RouteStatus::Congested,
            },
        ]
    }

    fn list_allocations(&self) -> Vec<ResourceAllocation> {
        vec![
            ResourceAllocation {
                id: "1".into(),
                region: "Zone Alpha".into(),
                kind: ResourceKind::Medical,
                quantity: 150,
                priority: 1,
                estimated_need: 200,
                current_allocation: 75,
                coordinates: pt(40.7629, -73.9791),
            },
            ResourceAllocation {
                id: "2".into(),
                region: "Zone Beta".into(),
                kind: ResourceKind::Rescue,
                quantity: 8,
                priority: 1,
                estimated_need: 12,
                current_allocation: 4,
                coordinates: pt(40.7529, -73.9891),
            },
            ResourceAllocation {
                id: "3".into(),
                region: "Zone Gamma".into(),
                kind: ResourceKind::Shelter,
                quantity: 500,
                priority: 2,
                estimated_need: 800,
                current_allocation: 200,
                coordinates: pt(40.7689, -73.9751),
            },
        ]
    }

    fn get_system_status(&self) -> SystemStatus {
        SystemStatus {
            cv_model: ModelState::Active,
            nlp_model: ModelState::Active,
            route_optimizer: ModelState::Processing,
            resource_predictor: ModelState::Active,
            last_update: self.now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{AllocationMetrics, Tier};
    use crate::source::Snapshot;
    use crate::urgency::sort_by_urgency;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn seed_data_satisfies_invariants() {
        let snap = Snapshot::capture(&MockSource::new(now()));
        assert_eq!(snap.validate(now()), Ok(()));
    }

    #[test]
    fn timestamps_are_anchored() {
        let a = Snapshot::capture(&MockSource::new(now()));
        let b = Snapshot::capture(&MockSource::new(now()));
        assert_eq!(a, b);
        assert_eq!(a.zones[0].detected_at, now() - Duration::minutes(30));
        assert_eq!(a.status.last_update, now());
    }

    #[test]
    fn seed_allocations_are_all_short() {
        let source = MockSource::new(now());
        let metrics: Vec<AllocationMetrics> = source
            .list_allocations()
            .iter()
            .map(|a| AllocationMetrics::derive(a).unwrap())
            .collect();

        // Zone Alpha 75/200, Beta 4/12, Gamma 200/800.
        assert_eq!(metrics[0].percentage, 37.5);
        assert_eq!(metrics[0].shortage, 125);
        assert_eq!(metrics[1].shortage, 8);
        assert_eq!(metrics[2].percentage, 25.0);
        assert!(metrics.iter().all(|m| m.in_shortage));
        assert!(metrics.iter().all(|m| m.tier == Tier::Critical));
    }

    #[test]
    fn fire_zone_sorts_first() {
        let mut zones = MockSource::new(now()).list_disaster_zones();
        sort_by_urgency(&mut zones);
        assert_eq!(zones[0].kind, DisasterKind::Fire);
    }
}
