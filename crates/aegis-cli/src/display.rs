//! Text cards for the read model.
//!
//! Every renderer writes to a `std::io::Write` so output can be captured in
//! tests; `main` hands them a locked stdout.

use std::io::{self, Write};

use aegis_ai::{BatchLabel, MessageLabel, Recommendation, RoutePlan};
use aegis_core::urgency::sort_allocations_by_priority;
use aegis_core::{
    AllocationMetrics, DisasterZone, EmergencyMessage, EvacuationRoute, GeoPoint,
    ResourceAllocation, SystemStatus, sort_by_urgency,
};
use aegis_feed::IngestKind;
use aegis_sim::{Simulation, TrainingRun};
use chrono::{DateTime, Utc};

const MAX_CONTENT_CHARS: usize = 72;

// ── Read model ──

/// Zones, most severe first.
pub fn write_zones(
    out: &mut impl Write,
    zones: &[DisasterZone],
    now: DateTime<Utc>,
) -> io::Result<()> {
    let mut zones = zones.to_vec();
    sort_by_urgency(&mut zones);

    writeln!(out, "=== Active Disaster Zones ({}) ===", zones.len())?;
    writeln!(out)?;
    for zone in &zones {
        writeln!(
            out,
            "{} - {} severity",
            capitalize(zone.kind.as_str()),
            zone.severity
        )?;
        writeln!(out, "  {:<26} {}", "id", zone.id)?;
        writeln!(out, "  {:<26} {}", "detected", format_age(now, zone.detected_at))?;
        writeln!(out, "  {:<26} {:.1}%", "confidence", zone.confidence.percent())?;
        writeln!(out, "  {:<26} {} points", "polygon", zone.polygon.len())?;
        writeln!(out)?;
    }
    Ok(())
}

/// Messages, highest priority first. Feed order is kept within a priority.
pub fn write_messages(
    out: &mut impl Write,
    messages: &[EmergencyMessage],
    unprocessed_only: bool,
    now: DateTime<Utc>,
) -> io::Result<()> {
    let mut messages: Vec<EmergencyMessage> = messages
        .iter()
        .filter(|m| !unprocessed_only || !m.processed)
        .cloned()
        .collect();
    sort_by_urgency(&mut messages);

    let heading = if unprocessed_only {
        "Unprocessed Messages"
    } else {
        "Emergency Messages"
    };
    writeln!(out, "=== {heading} ({}) ===", messages.len())?;
    writeln!(out)?;
    for msg in &messages {
        writeln!(
            out,
            "[{}] {}  ({:.1}%)  {}",
            msg.priority.as_str().to_uppercase(),
            msg.classification,
            msg.confidence.percent(),
            format_age(now, msg.timestamp)
        )?;
        writeln!(out, "  {}", truncate(&msg.content, MAX_CONTENT_CHARS))?;
        if let Some(loc) = msg.location {
            writeln!(out, "  {:<26} {}", "location", format_point(loc))?;
        }
        writeln!(
            out,
            "  {:<26} {}",
            "processed",
            if msg.processed { "yes" } else { "no" }
        )?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_routes(out: &mut impl Write, routes: &[EvacuationRoute]) -> io::Result<()> {
    writeln!(out, "=== Evacuation Routes ({}) ===", routes.len())?;
    writeln!(out)?;
    for route in routes {
        writeln!(out, "Route {}  [{}]", route.id, route.status.as_str())?;
        write_route_body(out, route)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_route_body(out: &mut impl Write, route: &EvacuationRoute) -> io::Result<()> {
    writeln!(out, "  {:<26} {}", "from", format_point(route.start))?;
    writeln!(out, "  {:<26} {}", "to", format_point(route.end))?;
    writeln!(out, "  {:<26} {}", "waypoints", route.waypoints.len())?;
    writeln!(out, "  {:<26} {} min", "estimated time", route.estimated_time)?;
    writeln!(out, "  {:<26} {:.0}%", "safety", route.safety_score.percent())?;
    writeln!(out, "  {:<26} {} people", "capacity", route.capacity)?;
    if !route.is_passable() {
        writeln!(out, "  ! Route blocked")?;
    }
    Ok(())
}

/// Allocation cards in priority order, then a summary line over all of them.
pub fn write_resources(out: &mut impl Write, allocations: &[ResourceAllocation]) -> io::Result<()> {
    let mut sorted = allocations.to_vec();
    sort_allocations_by_priority(&mut sorted);

    writeln!(out, "=== Resource Allocation ({}) ===", sorted.len())?;
    writeln!(out)?;
    for alloc in &sorted {
        writeln!(
            out,
            "{} Resources  {}  P{}",
            capitalize(alloc.kind.as_str()),
            alloc.region,
            alloc.priority
        )?;
        writeln!(
            out,
            "  {:<26} {} / {}",
            "current / need", alloc.current_allocation, alloc.estimated_need
        )?;
        match AllocationMetrics::derive(alloc) {
            Ok(m) => {
                writeln!(
                    out,
                    "  {:<26} {:.0}% ({})",
                    "allocated",
                    m.percentage,
                    m.tier.label()
                )?;
                if m.shortage >= 0 {
                    writeln!(out, "  {:<26} {}", "needed", m.shortage)?;
                } else {
                    writeln!(out, "  {:<26} {}", "surplus", -m.shortage)?;
                }
                if m.in_shortage {
                    writeln!(out, "  ! Resource shortage detected")?;
                }
            }
            Err(e) => writeln!(out, "  {:<26} n/a ({e})", "allocated")?,
        }
        writeln!(out)?;
    }

    let summary = AllocationMetrics::summarize(allocations);
    write!(
        out,
        "Total: {} / {} allocated",
        summary.total_allocated, summary.total_need
    )?;
    if let Some(pct) = summary.overall_percentage() {
        write!(out, " ({pct:.0}%)")?;
    }
    writeln!(
        out,
        ", {} of {} in shortage",
        summary.in_shortage, summary.allocations
    )?;
    writeln!(
        out,
        "Tiers: {} ample, {} moderate, {} critical",
        summary.ample, summary.moderate, summary.critical
    )?;
    if summary.undefined_need > 0 {
        writeln!(out, "{} with no estimated need", summary.undefined_need)?;
    }
    Ok(())
}

pub fn write_status(
    out: &mut impl Write,
    status: &SystemStatus,
    now: DateTime<Utc>,
) -> io::Result<()> {
    writeln!(out, "=== System Status ===")?;
    writeln!(out)?;
    for (name, state) in status.states() {
        writeln!(out, "  {:<26} {}", name, state.label())?;
    }
    writeln!(
        out,
        "  {:<26} {}",
        "last update",
        format_age(now, status.last_update)
    )?;
    if !status.all_online() {
        writeln!(out, "  ! Not all subsystems online")?;
    }
    Ok(())
}

// ── Simulation and training ──

pub fn write_sim_header(out: &mut impl Write, sim: &Simulation) -> io::Result<()> {
    writeln!(out, "=== {} ===", sim.scenario())?;
    writeln!(
        out,
        "speed {}x, {} participants, starting {}",
        sim.speed(),
        sim.participants(),
        sim.current_time().format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(out)
}

pub fn write_sim_tick(out: &mut impl Write, tick: u32, sim: &Simulation) -> io::Result<()> {
    writeln!(
        out,
        "  tick {:>4}  {}  events {:>6}",
        tick,
        sim.current_time().format("%H:%M:%S"),
        sim.processed_events()
    )
}

pub fn write_training_progress(out: &mut impl Write, run: &TrainingRun) -> io::Result<()> {
    write!(
        out,
        "  {:<26} epoch {:>4}/{:<4} {:>5.1}%",
        run.id,
        run.epoch,
        run.total_epochs,
        run.progress()
    )?;
    if let (Some(acc), Some(loss)) = (run.accuracy, run.loss) {
        write!(out, "  acc {acc:.3}  loss {loss:.3}")?;
    }
    writeln!(out, "  [{}]", run.status.as_str())
}

// ── Inference ──

pub fn write_labels(out: &mut impl Write, texts: &[String], labels: &[MessageLabel]) -> io::Result<()> {
    for (text, label) in texts.iter().zip(labels) {
        writeln!(out, "{}", truncate(text, MAX_CONTENT_CHARS))?;
        writeln!(out, "  {:<26} {}", "classification", label.classification)?;
        writeln!(out, "  {:<26} {}", "priority", label.priority)?;
        writeln!(out, "  {:<26} {:.1}%", "confidence", label.confidence.percent())?;
        if !label.keywords.is_empty() {
            writeln!(out, "  {:<26} {}", "keywords", label.keywords.join(", "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_batch_labels(out: &mut impl Write, labels: &[BatchLabel]) -> io::Result<()> {
    for label in labels {
        writeln!(
            out,
            "  {:<10} {:<20} {:<8} {:.1}%",
            label.message_id,
            label.classification,
            label.priority.as_str(),
            label.confidence.percent()
        )?;
    }
    Ok(())
}

pub fn write_route_plan(out: &mut impl Write, plan: &RoutePlan) -> io::Result<()> {
    writeln!(
        out,
        "=== Planned Routes ({}) in {:.1}s ===",
        plan.routes.len(),
        plan.processing_secs
    )?;
    writeln!(out)?;
    for route in &plan.routes {
        writeln!(out, "{}", route.id)?;
        let path: Vec<String> = route.path.iter().map(|p| format_point(*p)).collect();
        writeln!(out, "  {:<26} {}", "path", path.join(" -> "))?;
        writeln!(out, "  {:<26} {} min", "estimated time", route.estimated_time)?;
        writeln!(out, "  {:<26} {:.0}%", "safety", route.safety_score.percent())?;
        writeln!(out, "  {:<26} {} people", "capacity", route.capacity)?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_recommendations(out: &mut impl Write, recs: &[Recommendation]) -> io::Result<()> {
    writeln!(out, "=== Recommendations ({}) ===", recs.len())?;
    writeln!(out)?;
    for rec in recs {
        write!(
            out,
            "[{}] {} {} {}",
            rec.urgency.as_str().to_uppercase(),
            rec.action.as_str(),
            rec.quantity,
            rec.kind.as_str()
        )?;
        if let Some(region) = &rec.region {
            write!(out, " to {region}")?;
        }
        if let Some(target) = rec.target {
            write!(out, " ({})", format_point(target))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_ingest(out: &mut impl Write, files: &[(String, IngestKind)]) -> io::Result<()> {
    for (name, kind) in files {
        writeln!(out, "  {:<40} {}", name, kind.as_str())?;
    }
    Ok(())
}

// ── Helpers ──

/// Relative age in whole units, e.g. "15 minutes ago".
pub fn format_age(now: DateTime<Utc>, at: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    let (n, unit) = match secs {
        i64::MIN..=-1 => return "in the future".to_string(),
        0..=59 => return "just now".to_string(),
        60..=3_599 => (secs / 60, "minute"),
        3_600..=86_399 => (secs / 3_600, "hour"),
        _ => (secs / 86_400, "day"),
    };
    let plural = if n == 1 { "" } else { "s" };
    format!("{n} {unit}{plural} ago")
}

fn format_point(p: GeoPoint) -> String {
    format!("{:.4}, {:.4}", p.lat, p.lon)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}
