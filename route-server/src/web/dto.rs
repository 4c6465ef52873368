//! Data transfer objects for web requests and responses.
//!
//! All JSON field names are camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Route, RouteStop, Stop};
use crate::reconcile::PositionUpdate;
use crate::service::InvalidRoute;

/// A stop in the `GET /stops` map (the id is the key).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDto {
    pub name: String,
    pub connected_with: Vec<String>,
}

impl From<&Stop> for StopDto {
    fn from(stop: &Stop) -> Self {
        Self {
            name: stop.name.clone(),
            connected_with: stop.connected_with.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Response of `GET /stops`.
pub type StopsResponse = BTreeMap<String, StopDto>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStopDto {
    pub id: String,
    pub stop_id: String,
    pub position: u32,
}

impl From<&RouteStop> for RouteStopDto {
    fn from(rs: &RouteStop) -> Self {
        Self {
            id: rs.id.to_string(),
            stop_id: rs.stop_id.to_string(),
            position: rs.position,
        }
    }
}

/// A route with its stops in position order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    pub id: String,
    pub number: u32,
    pub position: u32,
    pub stops: Vec<RouteStopDto>,
}

impl From<&Route> for RouteDto {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id.to_string(),
            number: route.number.get(),
            position: route.position,
            stops: route.stops.iter().map(RouteStopDto::from).collect(),
        }
    }
}

/// Response of `GET /routes`.
#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub routes: Vec<RouteDto>,
}

/// A route that is not a legal path.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRouteDto {
    pub route_id: String,
    pub number: u32,
}

impl From<&InvalidRoute> for InvalidRouteDto {
    fn from(route: &InvalidRoute) -> Self {
        Self {
            route_id: route.id.to_string(),
            number: route.number.get(),
        }
    }
}

pub fn invalid_route_dtos(routes: &[InvalidRoute]) -> Vec<InvalidRouteDto> {
    routes.iter().map(InvalidRouteDto::from).collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdateDto {
    pub route_stop_id: String,
    pub position: u32,
}

impl From<&PositionUpdate> for PositionUpdateDto {
    fn from(update: &PositionUpdate) -> Self {
        Self {
            route_stop_id: update.route_stop_id.to_string(),
            position: update.position,
        }
    }
}

// ========== requests ==========

/// Body of `POST /routes`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRouteRequest {
    pub route_id: String,
    pub number: i64,
    /// Defaults to one past the last route's position.
    pub position: Option<i64>,
}

/// Body of `PATCH /routes/:route_id`.
#[derive(Debug, Deserialize)]
pub struct UpdateRouteRequest {
    pub number: i64,
}

/// Body of `PUT /routes/:route_id/order`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub route_stop_ids: Vec<String>,
}

/// Body of `POST /route-stops`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRouteStopRequest {
    pub route_stop_id: String,
    pub route_id: String,
    pub stop_id: String,
}

/// Body of `PATCH /route-stops/:route_stop_id`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteStopRequest {
    pub stop_id: String,
}

/// Body of `POST /route-stops/:route_stop_id/move`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRouteStopRequest {
    pub route_id: String,
    /// Insertion index in the destination's order; defaults to the end.
    pub index: Option<usize>,
}

// ========== mutation responses ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub route: RouteDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRouteStopResponse {
    pub route_stop: RouteStopDto,
    pub invalid_routes: Vec<InvalidRouteDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRouteStopResponse {
    pub route_id: String,
    pub invalid_routes: Vec<InvalidRouteDto>,
}

/// Response of mutations that only report topology.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyResponse {
    pub invalid_routes: Vec<InvalidRouteDto>,
}

/// Response of reorder and move: the position writes made.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResponse {
    pub updates: Vec<PositionUpdateDto>,
    pub invalid_routes: Vec<InvalidRouteDto>,
}

/// Error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// RFC 3339 time the error was produced
    pub timestamp: String,
    pub status_code: u16,
    pub message: String,
}
