//! Urgency ordering for zones, messages, and allocations.
//!
//! Severity labels must never be sorted as strings: alphabetically,
//! "critical" < "high" < "low" < "medium", which puts low above medium.
//! [`Severity`] carries the real order through `Ord`.

use serde::{Deserialize, Serialize};

use crate::model::{DisasterZone, EmergencyMessage, ResourceAllocation};

/// Zone severity and message priority share one scale.
///
/// Variant order is the total order: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Message priority uses the severity scale.
pub type Priority = Severity;

impl Severity {
    /// Most urgent first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Presentation-neutral rank: 0 for critical through 3 for low.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can be ranked on the severity scale.
pub trait Urgent {
    fn urgency(&self) -> Severity;
}

impl Urgent for Severity {
    fn urgency(&self) -> Severity {
        *self
    }
}

impl Urgent for DisasterZone {
    fn urgency(&self) -> Severity {
        self.severity
    }
}

impl Urgent for EmergencyMessage {
    fn urgency(&self) -> Severity {
        self.priority
    }
}

/// Sort most urgent first. Stable: equally urgent items keep feed order.
pub fn sort_by_urgency<T: Urgent>(items: &mut [T]) {
    items.sort_by_key(|item| std::cmp::Reverse(item.urgency()));
}

/// Keep items at or above `min`, preserving order.
pub fn filter_at_least<T: Urgent>(items: impl IntoIterator<Item = T>, min: Severity) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| item.urgency() >= min)
        .collect()
}

/// Sort allocations by ascending numeric priority (1 first). Stable.
pub fn sort_allocations_by_priority(allocations: &mut [ResourceAllocation]) {
    allocations.sort_by_key(|a| a.priority);
}

/// Coarse band for an allocation's numeric priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityBand {
    /// Priority 1.
    Urgent,
    /// Priority 2.
    Elevated,
    /// Priority 3 and above.
    Routine,
}

impl PriorityBand {
    pub fn of(priority: u8) -> Self {
        match priority {
            0 | 1 => Self::Urgent,
            2 => Self::Elevated,
            _ => Self::Routine,
        }
    }

    /// The severity a band maps onto when it has to be shown on that scale.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Urgent => Severity::Critical,
            Self::Elevated => Severity::High,
            Self::Routine => Severity::Medium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoPoint, ResourceKind};

    #[test]
    fn sorts_most_severe_first() {
        let mut levels = vec![
            Severity::Low,
            Severity::Critical,
            Severity::Medium,
            Severity::High,
        ];
        sort_by_urgency(&mut levels);
        assert_eq!(
            levels,
            vec![
                Severity::Critical,
                Severity::High,
                Severity::Medium,
                Severity::Low
            ]
        );
        assert_eq!(levels, Severity::ALL.to_vec());
    }

    #[test]
    fn string_sort_gets_it_wrong() {
        let mut labels = vec!["low", "critical", "medium", "high"];
        labels.sort();
        labels.reverse();
        // Alphabetical descending ranks medium first and critical last.
        assert_eq!(labels, vec!["medium", "low", "high", "critical"]);
        assert_ne!(
            labels,
            Severity::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn rank_matches_order() {
        for pair in Severity::ALL.windows(2) {
            assert!(pair[0] > pair[1]);
            assert!(pair[0].rank() < pair[1].rank());
        }
        assert_eq!(Severity::Critical.rank(), 0);
        assert_eq!(Severity::Low.rank(), 3);
    }

    #[test]
    fn sort_is_stable_within_a_level() {
        #[derive(Debug, PartialEq)]
        struct Item(&'static str, Severity);
        impl Urgent for Item {
            fn urgency(&self) -> Severity {
                self.1
            }
        }

        let mut items = vec![
            Item("a", Severity::High),
            Item("b", Severity::Critical),
            Item("c", Severity::High),
            Item("d", Severity::Critical),
        ];
        sort_by_urgency(&mut items);
        let ids: Vec<&str> = items.iter().map(|i| i.0).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn filter_keeps_threshold_and_above() {
        let kept = filter_at_least(
            vec![
                Severity::Low,
                Severity::High,
                Severity::Medium,
                Severity::Critical,
            ],
            Severity::High,
        );
        assert_eq!(kept, vec![Severity::High, Severity::Critical]);
    }

    #[test]
    fn allocations_sort_by_numeric_priority() {
        let alloc = |id: &str, priority| ResourceAllocation {
            id: id.into(),
            region: "r".into(),
            kind: ResourceKind::Supplies,
            quantity: 1,
            priority,
            estimated_need: 1,
            current_allocation: 0,
            coordinates: GeoPoint::new(0.0, 0.0),
        };
        let mut allocs = vec![alloc("x", 3), alloc("y", 1), alloc("z", 2), alloc("w", 1)];
        sort_allocations_by_priority(&mut allocs);
        let ids: Vec<&str> = allocs.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "w", "z", "x"]);
    }

    #[test]
    fn priority_bands() {
        assert_eq!(PriorityBand::of(1), PriorityBand::Urgent);
        assert_eq!(PriorityBand::of(2), PriorityBand::Elevated);
        assert_eq!(PriorityBand::of(3), PriorityBand::Routine);
        assert_eq!(PriorityBand::of(9), PriorityBand::Routine);
        assert_eq!(PriorityBand::Urgent.severity(), Severity::Critical);
    }

    #[test]
    fn severity_serialises_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
        let parsed: Severity = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Severity::Medium);
    }
}
