//! Stand-in inference runs over the current snapshot.

use std::path::Path;

use aegis_ai::{NeedsRequest, RouteRequest, ZoneDetector};
use aegis_core::{DisasterZone, Snapshot, sort_by_urgency};
use aegis_feed::IngestKind;
use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::info;

/// Plan from every passable route's start towards every known route end.
/// Active zone polygons go to the router as hazards; whether they are
/// avoided is up to the router.
pub fn route_request(snapshot: &Snapshot) -> RouteRequest {
    RouteRequest {
        start_points: snapshot
            .routes
            .iter()
            .filter(|r| r.is_passable())
            .map(|r| r.start)
            .collect(),
        safe_zones: snapshot.routes.iter().map(|r| r.end).collect(),
        hazards: snapshot.zones.iter().map(|z| z.polygon.clone()).collect(),
    }
}

/// Build a needs request for the most severe active zone.
pub fn needs_request(
    snapshot: &Snapshot,
    population: u32,
    affected_area_km2: f64,
) -> anyhow::Result<NeedsRequest> {
    let mut zones = snapshot.zones.clone();
    sort_by_urgency(&mut zones);
    let zone = zones
        .first()
        .context("no active disaster zones to predict needs for")?;
    Ok(NeedsRequest {
        disaster: zone.kind,
        affected_area_km2,
        population,
    })
}

/// Analyse one image file and promote the detections to zone records.
pub fn detect_zones(
    detector: &mut dyn ZoneDetector,
    path: &Path,
    now: DateTime<Utc>,
) -> anyhow::Result<(f64, Vec<DisasterZone>)> {
    let image = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let detection = detector
        .analyze_image(&image)
        .with_context(|| format!("analysing {}", path.display()))?;

    let zones = detection
        .zones
        .into_iter()
        .enumerate()
        .map(|(i, z)| z.into_zone(format!("det_{}", i + 1), now))
        .collect::<Result<Vec<_>, _>>()
        .context("promoting detections to zones")?;

    info!(
        file = %path.display(),
        zones = zones.len(),
        "detection complete"
    );
    Ok((detection.processing_secs, zones))
}

/// Sort each named file by what it feeds into.
pub fn sort_uploads(names: &[String], mime: Option<&str>) -> Vec<(String, IngestKind)> {
    names
        .iter()
        .map(|name| {
            let file_name = Path::new(name)
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            (name.clone(), IngestKind::detect(&file_name, mime))
        })
        .collect()
}
