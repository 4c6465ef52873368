//! JSON snapshot format for stops and routes.
//!
//! ```json
//! {
//!   "stops": {
//!     "central": { "name": "Central", "connected_with": ["harbour"] },
//!     "harbour": { "name": "Harbour", "connected_with": ["central"] }
//!   },
//!   "routes": [
//!     {
//!       "id": "r1",
//!       "number": 12,
//!       "position": 0,
//!       "stops": [{ "id": "rs1", "stop_id": "central", "position": 0 }]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Route, RouteId, RouteNumber, RouteStop, RouteStopId, Stop, StopId};

use super::error::StoreError;

/// A stop as stored on disk (the id is the map key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRecord {
    pub name: String,
    #[serde(default)]
    pub connected_with: Vec<String>,
}

/// A route stop as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStopRecord {
    pub id: String,
    pub stop_id: String,
    pub position: u32,
}

/// A route as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: String,
    pub number: i64,
    pub position: u32,
    #[serde(default)]
    pub stops: Vec<RouteStopRecord>,
}

/// Everything the store persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub stops: BTreeMap<String, StopRecord>,
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

fn integrity(err: impl std::fmt::Display) -> StoreError {
    StoreError::Integrity(err.to_string())
}

impl Snapshot {
    /// Build a snapshot from domain values.
    pub fn from_parts(stops: &[Stop], routes: &[Route]) -> Self {
        let stops = stops
            .iter()
            .map(|s| {
                (
                    s.id.to_string(),
                    StopRecord {
                        name: s.name.clone(),
                        connected_with: s.connected_with.iter().map(|c| c.to_string()).collect(),
                    },
                )
            })
            .collect();

        let routes = routes
            .iter()
            .map(|r| RouteRecord {
                id: r.id.to_string(),
                number: i64::from(r.number.get()),
                position: r.position,
                stops: r
                    .stops
                    .iter()
                    .map(|s| RouteStopRecord {
                        id: s.id.to_string(),
                        stop_id: s.stop_id.to_string(),
                        position: s.position,
                    })
                    .collect(),
            })
            .collect();

        Self { stops, routes }
    }

    /// Validate the snapshot and convert it into domain values.
    ///
    /// Ids must parse, route numbers must be positive, and every route stop
    /// must reference a stop in the snapshot. Adjacency targets are not
    /// checked.
    pub fn into_parts(self) -> Result<(Vec<Stop>, Vec<Route>), StoreError> {
        let mut stops = Vec::with_capacity(self.stops.len());
        for (id, record) in self.stops {
            let id = StopId::parse(&id).map_err(integrity)?;
            let connected_with = record
                .connected_with
                .iter()
                .map(|c| StopId::parse(c))
                .collect::<Result<Vec<_>, _>>()
                .map_err(integrity)?;
            stops.push(Stop::new(id, record.name, connected_with));
        }

        let mut routes = Vec::with_capacity(self.routes.len());
        for record in self.routes {
            let id = RouteId::parse(&record.id).map_err(integrity)?;
            let number = RouteNumber::new(record.number).map_err(integrity)?;
            let mut route = Route::new(id, number, record.position);
            for stop in record.stops {
                let stop_id = StopId::parse(&stop.stop_id).map_err(integrity)?;
                if !stops.iter().any(|s| s.id == stop_id) {
                    return Err(StoreError::Integrity(format!(
                        "route {} references unknown stop {}",
                        route.id, stop_id
                    )));
                }
                let id = RouteStopId::parse(&stop.id).map_err(integrity)?;
                route.stops.push(RouteStop::new(id, stop_id, stop.position));
            }
            routes.push(route);
        }

        Ok((stops, routes))
    }

    /// Read a snapshot from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write the snapshot to a JSON file, replacing it atomically.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(self)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
