//! Derived allocation metrics.
//!
//! Pure functions over `(current, estimated)` pairs. They own no state and
//! can be called from any thread without coordination.
//!
//! # Zero need
//!
//! A percentage against an estimated need of zero is undefined.
//! [`allocation_percentage`] and [`progress_tier`] always fail with
//! [`MetricsError::DivisionUndefined`] in that case; no sentinel value is
//! returned. [`shortage_quantity`] and [`is_shortage`] stay total.

use serde::Serialize;
use tracing::debug;

use crate::error::MetricsError;
use crate::model::ResourceAllocation;

/// Tier thresholds, in percent. A value equal to a threshold takes the higher tier.
pub const AMPLE_THRESHOLD: u32 = 80;
pub const MODERATE_THRESHOLD: u32 = 50;

/// Share of the estimated need currently allocated, capped at 100.
///
/// The cap is deliberate: a surplus still shows as a full bar, and
/// [`shortage_quantity`] reports how large the surplus is.
pub fn allocation_percentage(current: u32, estimated: u32) -> Result<f64, MetricsError> {
    if estimated == 0 {
        return Err(MetricsError::DivisionUndefined);
    }
    Ok((f64::from(current) / f64::from(estimated) * 100.0).min(100.0))
}

/// Units still needed. Negative means surplus and is never clamped.
pub fn shortage_quantity(current: u32, estimated: u32) -> i64 {
    i64::from(estimated) - i64::from(current)
}

/// How well the need is met, bucketed at 80% and 50%.
pub fn progress_tier(current: u32, estimated: u32) -> Result<Tier, MetricsError> {
    if estimated == 0 {
        return Err(MetricsError::DivisionUndefined);
    }
    // current / estimated >= t / 100, in integers.
    let scaled = u64::from(current) * 100;
    let estimated = u64::from(estimated);
    let tier = if scaled >= estimated * u64::from(AMPLE_THRESHOLD) {
        Tier::Ample
    } else if scaled >= estimated * u64::from(MODERATE_THRESHOLD) {
        Tier::Moderate
    } else {
        Tier::Critical
    };
    Ok(tier)
}

pub fn is_shortage(current: u32, estimated: u32) -> bool {
    current < estimated
}

/// Coarse bucket summarising how well an allocation's need is met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Ample,
    Moderate,
    Critical,
}

impl Tier {
    /// Classify an already-computed percentage.
    pub fn from_percentage(percentage: f64) -> Result<Self, MetricsError> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(MetricsError::InvalidRange(percentage));
        }
        Ok(if percentage >= f64::from(AMPLE_THRESHOLD) {
            Self::Ample
        } else if percentage >= f64::from(MODERATE_THRESHOLD) {
            Self::Moderate
        } else {
            Self::Critical
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ample => "ample",
            Self::Moderate => "moderate",
            Self::Critical => "critical",
        }
    }
}

/// Everything the resource panel shows for one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AllocationMetrics {
    pub percentage: f64,
    pub shortage: i64,
    pub tier: Tier,
    pub in_shortage: bool,
}

impl AllocationMetrics {
    pub fn derive(allocation: &ResourceAllocation) -> Result<Self, MetricsError> {
        Self::compute(allocation.current_allocation, allocation.estimated_need)
    }

    pub fn compute(current: u32, estimated: u32) -> Result<Self, MetricsError> {
        Ok(Self {
            percentage: allocation_percentage(current, estimated)?,
            shortage: shortage_quantity(current, estimated),
            tier: progress_tier(current, estimated)?,
            in_shortage: is_shortage(current, estimated),
        })
    }

    /// Aggregate a set of allocations for a report header.
    ///
    /// Allocations with zero estimated need are counted in
    /// `undefined_need` and left out of the tier counts.
    pub fn summarize(allocations: &[ResourceAllocation]) -> AllocationSummary {
        let mut summary = AllocationSummary::default();

        for alloc in allocations {
            summary.allocations += 1;
            summary.total_need += u64::from(alloc.estimated_need);
            summary.total_allocated += u64::from(alloc.current_allocation);
            if is_shortage(alloc.current_allocation, alloc.estimated_need) {
                summary.in_shortage += 1;
            }
            match progress_tier(alloc.current_allocation, alloc.estimated_need) {
                Ok(Tier::Ample) => summary.ample += 1,
                Ok(Tier::Moderate) => summary.moderate += 1,
                Ok(Tier::Critical) => summary.critical += 1,
                Err(_) => summary.undefined_need += 1,
            }
        }

        debug!(
            allocations = summary.allocations,
            in_shortage = summary.in_shortage,
            undefined_need = summary.undefined_need,
            "summarised allocations"
        );
        summary
    }
}

/// Totals over a set of allocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationSummary {
    pub allocations: usize,
    pub total_need: u64,
    pub total_allocated: u64,
    pub in_shortage: usize,
    pub undefined_need: usize,
    pub ample: usize,
    pub moderate: usize,
    pub critical: usize,
}

impl AllocationSummary {
    /// Overall percentage across all allocations, capped at 100.
    ///
    /// `None` when the total need is zero.
    pub fn overall_percentage(&self) -> Option<f64> {
        if self.total_need == 0 {
            return None;
        }
        Some((self.total_allocated as f64 / self.total_need as f64 * 100.0).min(100.0))
    }

    pub fn total_shortage(&self) -> i64 {
        self.total_need as i64 - self.total_allocated as i64
    }
}
