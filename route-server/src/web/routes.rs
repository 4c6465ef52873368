//! HTTP route handlers.

use std::path::Path;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{InvalidId, RouteId, RouteStopId, StopId};
use crate::service::ServiceError;
use crate::store::RouteStore;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// When `static_dir` is given, paths that match no route are served from it.
pub fn create_router<S: RouteStore + 'static>(
    state: AppState<S>,
    static_dir: Option<&Path>,
) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/stops", get(list_stops::<S>))
        .route("/routes", get(list_routes::<S>).post(add_route::<S>))
        .route("/routes/invalid", get(invalid_routes::<S>))
        .route(
            "/routes/:route_id",
            patch(update_route::<S>).delete(delete_route::<S>),
        )
        .route("/routes/:route_id/order", put(reorder_route_stops::<S>))
        .route("/route-stops", post(add_route_stop::<S>))
        .route(
            "/route-stops/:route_stop_id",
            patch(update_route_stop::<S>).delete(delete_route_stop::<S>),
        )
        .route("/route-stops/:route_stop_id/move", post(move_route_stop::<S>));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Parse a JSON body, logging it on failure.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "Rejected request body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_stops<S: RouteStore>(State(state): State<AppState<S>>) -> Json<StopsResponse> {
    let stops = state
        .service
        .stops()
        .await
        .iter()
        .map(|s| (s.id.to_string(), StopDto::from(s)))
        .collect();
    Json(stops)
}

async fn list_routes<S: RouteStore>(State(state): State<AppState<S>>) -> Json<RoutesResponse> {
    let routes = state.service.routes().await;
    Json(RoutesResponse {
        routes: routes.iter().map(RouteDto::from).collect(),
    })
}

async fn invalid_routes<S: RouteStore>(
    State(state): State<AppState<S>>,
) -> Json<Vec<InvalidRouteDto>> {
    Json(invalid_route_dtos(&state.service.invalid_routes().await))
}

async fn add_route<S: RouteStore>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: AddRouteRequest = parse_body(&body)?;
    let id = RouteId::parse(&req.route_id)?;

    let route = state
        .service
        .add_route(id, req.number, req.position)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RouteResponse {
            route: RouteDto::from(&route),
        }),
    )
        .into_response())
}

async fn delete_route<S: RouteStore>(
    State(state): State<AppState<S>>,
    UrlPath(route_id): UrlPath<String>,
) -> Result<Json<RouteResponse>, AppError> {
    let id = RouteId::parse(&route_id)?;
    let route = state.service.delete_route(&id).await?;
    Ok(Json(RouteResponse {
        route: RouteDto::from(&route),
    }))
}

async fn update_route<S: RouteStore>(
    State(state): State<AppState<S>>,
    UrlPath(route_id): UrlPath<String>,
    body: Bytes,
) -> Result<Json<RouteResponse>, AppError> {
    let req: UpdateRouteRequest = parse_body(&body)?;
    let id = RouteId::parse(&route_id)?;

    state.service.update_route_number(&id, req.number).await?;
    let route = state.service.route(&id).await?;
    Ok(Json(RouteResponse {
        route: RouteDto::from(&route),
    }))
}

async fn reorder_route_stops<S: RouteStore>(
    State(state): State<AppState<S>>,
    UrlPath(route_id): UrlPath<String>,
    body: Bytes,
) -> Result<Json<PositionsResponse>, AppError> {
    let req: ReorderRequest = parse_body(&body)?;
    let id = RouteId::parse(&route_id)?;
    let order = req
        .route_stop_ids
        .iter()
        .map(|s| RouteStopId::parse(s))
        .collect::<Result<Vec<_>, _>>()?;

    let outcome = state.service.reorder_route_stops(&id, order).await?;
    Ok(Json(PositionsResponse {
        updates: outcome.value.iter().map(PositionUpdateDto::from).collect(),
        invalid_routes: invalid_route_dtos(&outcome.invalid_routes),
    }))
}

async fn add_route_stop<S: RouteStore>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: AddRouteStopRequest = parse_body(&body)?;
    let route_stop_id = RouteStopId::parse(&req.route_stop_id)?;
    let route_id = RouteId::parse(&req.route_id)?;
    let stop_id = StopId::parse(&req.stop_id)?;

    let outcome = state
        .service
        .add_route_stop(&route_id, route_stop_id, stop_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddRouteStopResponse {
            route_stop: RouteStopDto::from(&outcome.value),
            invalid_routes: invalid_route_dtos(&outcome.invalid_routes),
        }),
    )
        .into_response())
}

async fn delete_route_stop<S: RouteStore>(
    State(state): State<AppState<S>>,
    UrlPath(route_stop_id): UrlPath<String>,
) -> Result<Json<DeleteRouteStopResponse>, AppError> {
    let id = RouteStopId::parse(&route_stop_id)?;
    let outcome = state.service.delete_route_stop(&id).await?;
    Ok(Json(DeleteRouteStopResponse {
        route_id: outcome.value.to_string(),
        invalid_routes: invalid_route_dtos(&outcome.invalid_routes),
    }))
}

async fn update_route_stop<S: RouteStore>(
    State(state): State<AppState<S>>,
    UrlPath(route_stop_id): UrlPath<String>,
    body: Bytes,
) -> Result<Json<TopologyResponse>, AppError> {
    let req: UpdateRouteStopRequest = parse_body(&body)?;
    let id = RouteStopId::parse(&route_stop_id)?;
    let stop_id = StopId::parse(&req.stop_id)?;

    let outcome = state.service.update_route_stop_target(&id, stop_id).await?;
    Ok(Json(TopologyResponse {
        invalid_routes: invalid_route_dtos(&outcome.invalid_routes),
    }))
}

async fn move_route_stop<S: RouteStore>(
    State(state): State<AppState<S>>,
    UrlPath(route_stop_id): UrlPath<String>,
    body: Bytes,
) -> Result<Json<PositionsResponse>, AppError> {
    let req: MoveRouteStopRequest = parse_body(&body)?;
    let id = RouteStopId::parse(&route_stop_id)?;
    let destination = RouteId::parse(&req.route_id)?;

    let outcome = state
        .service
        .move_route_stop(&id, &destination, req.index)
        .await?;
    Ok(Json(PositionsResponse {
        updates: outcome.value.iter().map(PositionUpdateDto::from).collect(),
        invalid_routes: invalid_route_dtos(&outcome.invalid_routes),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<InvalidId> for AppError {
    fn from(e: InvalidId) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e {
            ServiceError::UnknownRoute(_)
            | ServiceError::UnknownRouteStop(_)
            | ServiceError::UnknownStop(_) => AppError::NotFound { message },
            ServiceError::Store(_) => AppError::Internal { message },
            ServiceError::InvalidInput(_)
            | ServiceError::DuplicateRoute(_)
            | ServiceError::DuplicateRouteStop(_) => AppError::BadRequest { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), %message, "Request failed");
        } else {
            warn!(status = status.as_u16(), %message, "Request rejected");
        }

        let body = Json(ErrorResponse {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status_code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}
