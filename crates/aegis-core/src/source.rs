//! The boundary between the read model and whatever supplies it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::{
    DisasterZone, EmergencyMessage, EvacuationRoute, ResourceAllocation, SystemStatus,
};

/// Supplier of read-model entities.
///
/// Every call returns a finite snapshot that is complete when it returns.
/// Asynchronous suppliers fetch a whole [`Snapshot`] first and serve from
/// that, so a caller never sees a partially populated list.
pub trait DataSource {
    fn list_disaster_zones(&self) -> Vec<DisasterZone>;
    fn list_messages(&self) -> Vec<EmergencyMessage>;
    fn list_routes(&self) -> Vec<EvacuationRoute>;
    fn list_allocations(&self) -> Vec<ResourceAllocation>;
    fn get_system_status(&self) -> SystemStatus;
}

/// An owned copy of all five collections taken at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub zones: Vec<DisasterZone>,
    pub messages: Vec<EmergencyMessage>,
    pub routes: Vec<EvacuationRoute>,
    pub allocations: Vec<ResourceAllocation>,
    pub status: SystemStatus,
}

impl Snapshot {
    /// Copy everything a source currently holds.
    pub fn capture(source: &dyn DataSource) -> Self {
        Self {
            zones: source.list_disaster_zones(),
            messages: source.list_messages(),
            routes: source.list_routes(),
            allocations: source.list_allocations(),
            status: source.get_system_status(),
        }
    }

    /// Check every record, returning the first violation with the record id.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), (String, ModelError)> {
        for z in &self.zones {
            z.validate(now).map_err(|e| (z.id.clone(), e))?;
        }
        for m in &self.messages {
            m.validate(now).map_err(|e| (m.id.clone(), e))?;
        }
        for r in &self.routes {
            r.validate().map_err(|e| (r.id.clone(), e))?;
        }
        for a in &self.allocations {
            a.validate().map_err(|e| (a.id.clone(), e))?;
        }
        Ok(())
    }

    pub fn unprocessed_messages(&self) -> impl Iterator<Item = &EmergencyMessage> {
        self.messages.iter().filter(|m| !m.processed)
    }
}

impl DataSource for Snapshot {
    fn list_disaster_zones(&self) -> Vec<DisasterZone> {
        self.zones.clone()
    }

    fn list_messages(&self) -> Vec<EmergencyMessage> {
        self.messages.clone()
    }

    fn list_routes(&self) -> Vec<EvacuationRoute> {
        self.routes.clone()
    }

    fn list_allocations(&self) -> Vec<ResourceAllocation> {
        self.allocations.clone()
    }

    fn get_system_status(&self) -> SystemStatus {
        self.status.clone()
    }
}
