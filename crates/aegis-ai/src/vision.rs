//! Satellite and aerial imagery analysis.

use aegis_core::{DisasterKind, DisasterZone, GeoPoint, ModelError, Score, Severity};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::AiError;

/// A zone as reported by the detector, before it gets an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedZone {
    pub kind: DisasterKind,
    pub polygon: Vec<GeoPoint>,
    pub confidence: Score,
    pub severity: Severity,
}

impl DetectedZone {
    /// Promote to a read-model record, checking the polygon invariants.
    pub fn into_zone(
        self,
        id: String,
        detected_at: DateTime<Utc>,
    ) -> Result<DisasterZone, ModelError> {
        let zone = DisasterZone {
            id,
            kind: self.kind,
            severity: self.severity,
            polygon: self.polygon,
            detected_at,
            confidence: self.confidence,
        };
        zone.validate(detected_at)?;
        Ok(zone)
    }
}

/// Result of analysing one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub zones: Vec<DetectedZone>,
    /// Seconds the model reports it spent.
    pub processing_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Processing,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStatus {
    pub state: StreamState,
    pub detected_changes: u32,
}

/// Computer-vision service that segments disaster zones from imagery.
pub trait ZoneDetector {
    fn analyze_image(&mut self, image: &[u8]) -> Result<Detection, AiError>;

    fn process_live_stream(&mut self, stream_url: &str) -> Result<StreamStatus, AiError>;
}

/// Returns a fixed flood detection for any non-empty image.
#[derive(Debug, Clone, Default)]
pub struct StubDetector;

impl ZoneDetector for StubDetector {
    fn analyze_image(&mut self, image: &[u8]) -> Result<Detection, AiError> {
        if image.is_empty() {
            return Err(AiError::EmptyInput("image"));
        }

        let detection = Detection {
            zones: vec![DetectedZone {
                kind: DisasterKind::Flood,
                polygon: vec![
                    GeoPoint::new(40.7589, -73.9851),
                    GeoPoint::new(40.7609, -73.9831),
                    GeoPoint::new(40.7569, -73.9811),
                ],
                confidence: Score::new(0.94)?,
                severity: Severity::High,
            }],
            processing_secs: 2.1,
        };
        info!(
            bytes = image.len(),
            zones = detection.zones.len(),
            "analysed image"
        );
        Ok(detection)
    }

    fn process_live_stream(&mut self, stream_url: &str) -> Result<StreamStatus, AiError> {
        if stream_url.trim().is_empty() {
            return Err(AiError::EmptyInput("stream url"));
        }
        info!(url = stream_url, "polled live stream");
        Ok(StreamStatus {
            state: StreamState::Processing,
            detected_changes: 3,
        })
    }
}
