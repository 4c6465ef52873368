//! Unit tests for the route service.

use std::collections::HashMap;
use std::sync::Mutex;

use super::*;
use crate::store::MemoryStore;

fn stop_id(s: &str) -> StopId {
    StopId::parse(s).unwrap()
}

fn route_id(s: &str) -> RouteId {
    RouteId::parse(s).unwrap()
}

fn rs(s: &str) -> RouteStopId {
    RouteStopId::parse(s).unwrap()
}

/// a -> b -> c -> a, b -> a, c -> d
fn network() -> Vec<Stop> {
    vec![
        Stop::new(stop_id("a"), "Alpha", vec![stop_id("b")]),
        Stop::new(stop_id("b"), "Bravo", vec![stop_id("c"), stop_id("a")]),
        Stop::new(stop_id("c"), "Charlie", vec![stop_id("a"), stop_id("d")]),
        Stop::new(stop_id("d"), "Delta", vec![]),
    ]
}

async fn service() -> RouteService<MemoryStore> {
    RouteService::load(MemoryStore::new(network()), ServiceConfig::default())
        .await
        .unwrap()
}

/// Route `id` with stops `rs{prefix}{i}` visiting `stops` in order.
async fn add_route_with_stops(
    service: &RouteService<MemoryStore>,
    id: &str,
    number: i64,
    stops: &[&str],
) {
    service.add_route(route_id(id), number, None).await.unwrap();
    for (i, stop) in stops.iter().enumerate() {
        service
            .add_route_stop(&route_id(id), rs(&format!("{id}-{i}")), stop_id(stop))
            .await
            .unwrap();
    }
}

fn order(route: &Route) -> Vec<(String, u32)> {
    route
        .stops
        .iter()
        .map(|s| (s.id.to_string(), s.position))
        .collect()
}

fn pairs(items: &[(&str, u32)]) -> Vec<(String, u32)> {
    items.iter().map(|(id, p)| (id.to_string(), *p)).collect()
}

/// Memory and store must agree after every successful operation.
async fn assert_store_matches(service: &RouteService<MemoryStore>) {
    let stored = service.store().fetch_routes().await.unwrap();
    assert_eq!(stored, service.routes().await);
}

// ========== loading ==========

#[tokio::test]
async fn load_rejects_route_stop_with_unknown_stop() {
    let mut route = Route::new(route_id("r"), RouteNumber::new(1).unwrap(), 0);
    route
        .stops
        .push(RouteStop::new(rs("x"), stop_id("nowhere"), 0));
    let store = MemoryStore::with_routes(network(), vec![route]).unwrap();

    let result = RouteService::load(store, ServiceConfig::default()).await;

    assert!(matches!(
        result,
        Err(ServiceError::Store(StoreError::Integrity(_)))
    ));
}

#[tokio::test]
async fn load_existing_routes() {
    let mut route = Route::new(route_id("r"), RouteNumber::new(7).unwrap(), 3);
    route.stops.push(RouteStop::new(rs("x"), stop_id("a"), 0));
    route.stops.push(RouteStop::new(rs("y"), stop_id("c"), 1));
    let store = MemoryStore::with_routes(network(), vec![route]).unwrap();

    let service = RouteService::load(store, ServiceConfig::default())
        .await
        .unwrap();

    assert_eq!(service.stops().await.len(), 4);
    assert_eq!(service.routes().await.len(), 1);
    // a -> c has no edge
    let invalid = service.invalid_routes().await;
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].number.get(), 7);
}

// ========== routes ==========

#[tokio::test]
async fn add_route_defaults_position_after_last() {
    let service = service().await;
    let first = service.add_route(route_id("r1"), 5, None).await.unwrap();
    let second = service.add_route(route_id("r2"), 6, Some(10)).await.unwrap();
    let third = service.add_route(route_id("r3"), 7, None).await.unwrap();

    assert_eq!(first.position, 0);
    assert_eq!(second.position, 10);
    assert_eq!(third.position, 11);
    assert!(first.stops.is_empty());
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn add_route_rejects_bad_input_before_store() {
    let service = service().await;

    let err = service.add_route(route_id("r"), 0, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert!(err.is_client_fault());

    let err = service
        .add_route(route_id("r"), 3, Some(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    assert!(service.store().fetch_routes().await.unwrap().is_empty());
}

#[tokio::test]
async fn add_route_rejects_duplicate_id() {
    let service = service().await;
    service.add_route(route_id("r"), 1, None).await.unwrap();

    let err = service.add_route(route_id("r"), 2, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateRoute(_)));
}

#[tokio::test]
async fn update_route_number() {
    let service = service().await;
    service.add_route(route_id("r"), 1, None).await.unwrap();

    service.update_route_number(&route_id("r"), 44).await.unwrap();
    assert_eq!(service.route(&route_id("r")).await.unwrap().number.get(), 44);

    let err = service
        .update_route_number(&route_id("r"), -4)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = service
        .update_route_number(&route_id("nope"), 4)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownRoute(_)));
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn delete_route_removes_its_stops() {
    let service = service().await;
    add_route_with_stops(&service, "r", 1, &["a", "b"]).await;

    let removed = service.delete_route(&route_id("r")).await.unwrap();

    assert_eq!(removed.stops.len(), 2);
    assert!(service.routes().await.is_empty());
    let err = service.delete_route_stop(&rs("r-0")).await.unwrap_err();
    assert!(matches!(err, ServiceError::UnknownRouteStop(_)));
    assert_store_matches(&service).await;
}

// ========== route stops ==========

#[tokio::test]
async fn add_route_stop_appends_at_stop_count() {
    let service = service().await;
    add_route_with_stops(&service, "r", 1, &["a", "b", "c"]).await;

    let route = service.route(&route_id("r")).await.unwrap();
    assert_eq!(order(&route), pairs(&[("r-0", 0), ("r-1", 1), ("r-2", 2)]));
    assert!(service.invalid_routes().await.is_empty());
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn add_route_stop_reports_broken_topology() {
    let service = service().await;
    add_route_with_stops(&service, "r", 9, &["a"]).await;

    let outcome = service
        .add_route_stop(&route_id("r"), rs("x"), stop_id("d"))
        .await
        .unwrap();

    // Still added: topology is advisory.
    assert_eq!(outcome.value.position, 1);
    assert!(!outcome.all_routes_legal());
    assert_eq!(outcome.invalid_numbers(), vec![RouteNumber::new(9).unwrap()]);
    assert_eq!(service.route(&route_id("r")).await.unwrap().stops.len(), 2);
}

#[tokio::test]
async fn closed_loop_is_legal() {
    let service = service().await;
    add_route_with_stops(&service, "loop", 3, &["a", "b", "c", "a"]).await;
    assert!(service.invalid_routes().await.is_empty());
}

#[tokio::test]
async fn add_route_stop_rejects_unknowns() {
    let service = service().await;
    service.add_route(route_id("r"), 1, None).await.unwrap();

    let err = service
        .add_route_stop(&route_id("r"), rs("x"), stop_id("zz"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownStop(_)));

    let err = service
        .add_route_stop(&route_id("nope"), rs("x"), stop_id("a"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownRoute(_)));

    service
        .add_route_stop(&route_id("r"), rs("x"), stop_id("a"))
        .await
        .unwrap();
    let err = service
        .add_route_stop(&route_id("r"), rs("x"), stop_id("b"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateRouteStop(_)));
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn delete_route_stop_leaves_gap() {
    let service = service().await;
    add_route_with_stops(&service, "r", 2, &["a", "b", "c"]).await;

    let outcome = service.delete_route_stop(&rs("r-1")).await.unwrap();

    assert_eq!(outcome.value, route_id("r"));
    let route = service.route(&route_id("r")).await.unwrap();
    assert_eq!(order(&route), pairs(&[("r-0", 0), ("r-2", 2)]));
    // a -> c has no edge
    assert_eq!(outcome.invalid_routes.len(), 1);
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn append_after_delete_can_share_a_position() {
    let service = service().await;
    add_route_with_stops(&service, "r", 2, &["a", "b", "c"]).await;
    service.delete_route_stop(&rs("r-0")).await.unwrap();

    let outcome = service
        .add_route_stop(&route_id("r"), rs("a0"), stop_id("d"))
        .await
        .unwrap();

    // Two stops remain, so the new one lands on position 2 next to r-2.
    // The tie is broken by id: a0 comes before r-2.
    assert_eq!(outcome.value.position, 2);
    let expected = pairs(&[("r-1", 1), ("a0", 2), ("r-2", 2)]);
    let route = service.route(&route_id("r")).await.unwrap();
    assert_eq!(order(&route), expected);
    // b -> d has no edge
    assert_eq!(outcome.invalid_numbers(), vec![RouteNumber::new(2).unwrap()]);
    assert_store_matches(&service).await;

    service.reload().await.unwrap();
    let reloaded = service.route(&route_id("r")).await.unwrap();
    assert_eq!(order(&reloaded), expected);
    assert_eq!(service.invalid_routes().await, outcome.invalid_routes);
}

#[tokio::test]
async fn retarget_route_stop() {
    let service = service().await;
    add_route_with_stops(&service, "r", 1, &["a", "b", "d"]).await;
    assert_eq!(service.invalid_routes().await.len(), 1);

    let outcome = service
        .update_route_stop_target(&rs("r-2"), stop_id("c"))
        .await
        .unwrap();

    assert!(outcome.all_routes_legal());
    let route = service.route(&route_id("r")).await.unwrap();
    assert_eq!(route.stops[2].stop_id, stop_id("c"));
    assert_eq!(route.stops[2].position, 2);
    assert_store_matches(&service).await;

    let err = service
        .update_route_stop_target(&rs("r-2"), stop_id("zz"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownStop(_)));

    let err = service
        .update_route_stop_target(&rs("nope"), stop_id("a"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownRouteStop(_)));
}

// ========== reorder ==========

#[tokio::test]
async fn reorder_writes_only_changed_positions() {
    let service = service().await;
    add_route_with_stops(&service, "r", 1, &["a", "b", "c"]).await;

    let outcome = service
        .reorder_route_stops(&route_id("r"), vec![rs("r-0"), rs("r-2"), rs("r-1")])
        .await
        .unwrap();

    assert_eq!(
        outcome.value,
        vec![
            PositionUpdate::new(rs("r-2"), 1),
            PositionUpdate::new(rs("r-1"), 2)
        ]
    );
    let route = service.route(&route_id("r")).await.unwrap();
    assert_eq!(order(&route), pairs(&[("r-0", 0), ("r-2", 1), ("r-1", 2)]));
    // a -> c has no edge
    assert_eq!(outcome.invalid_routes.len(), 1);
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn reorder_same_order_writes_nothing() {
    let service = service().await;
    add_route_with_stops(&service, "r", 1, &["a", "b"]).await;

    let outcome = service
        .reorder_route_stops(&route_id("r"), vec![rs("r-0"), rs("r-1")])
        .await
        .unwrap();

    assert!(outcome.value.is_empty());
}

#[tokio::test]
async fn reorder_closes_gaps() {
    let service = service().await;
    add_route_with_stops(&service, "r", 1, &["a", "b", "c", "d"]).await;
    service.delete_route_stop(&rs("r-1")).await.unwrap();

    let outcome = service
        .reorder_route_stops(&route_id("r"), vec![rs("r-0"), rs("r-2"), rs("r-3")])
        .await
        .unwrap();

    assert_eq!(outcome.value.len(), 2);
    let route = service.route(&route_id("r")).await.unwrap();
    assert_eq!(order(&route), pairs(&[("r-0", 0), ("r-2", 1), ("r-3", 2)]));
}

#[tokio::test]
async fn reorder_requires_a_permutation() {
    let service = service().await;
    add_route_with_stops(&service, "r", 1, &["a", "b"]).await;
    add_route_with_stops(&service, "q", 2, &["c"]).await;

    for bad in [
        vec![rs("r-0")],
        vec![rs("r-0"), rs("r-0")],
        vec![rs("r-0"), rs("r-1"), rs("q-0")],
        vec![rs("r-1"), rs("ghost")],
    ] {
        let err = service
            .reorder_route_stops(&route_id("r"), bad)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    let err = service
        .reorder_route_stops(&route_id("nope"), vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownRoute(_)));
}

// ========== move ==========

#[tokio::test]
async fn move_between_routes_reconciles_both() {
    let service = service().await;
    add_route_with_stops(&service, "src", 1, &["a", "b", "c"]).await;
    add_route_with_stops(&service, "dst", 2, &["c", "d"]).await;

    let outcome = service
        .move_route_stop(&rs("src-0"), &route_id("dst"), Some(1))
        .await
        .unwrap();

    let src = service.route(&route_id("src")).await.unwrap();
    let dst = service.route(&route_id("dst")).await.unwrap();
    assert_eq!(order(&src), pairs(&[("src-1", 0), ("src-2", 1)]));
    assert_eq!(
        order(&dst),
        pairs(&[("dst-0", 0), ("src-0", 1), ("dst-1", 2)])
    );

    let written: HashMap<String, u32> = outcome
        .value
        .iter()
        .map(|u| (u.route_stop_id.to_string(), u.position))
        .collect();
    assert_eq!(
        written,
        HashMap::from([
            ("src-1".to_string(), 0),
            ("src-2".to_string(), 1),
            ("src-0".to_string(), 1),
            ("dst-1".to_string(), 2),
        ])
    );
    // src: b -> c legal; dst: c -> a -> d has no a -> d edge
    assert_eq!(outcome.invalid_numbers(), vec![RouteNumber::new(2).unwrap()]);
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn move_defaults_to_end_of_destination() {
    let service = service().await;
    add_route_with_stops(&service, "src", 1, &["c"]).await;
    add_route_with_stops(&service, "dst", 2, &["a", "b"]).await;

    service
        .move_route_stop(&rs("src-0"), &route_id("dst"), None)
        .await
        .unwrap();

    let dst = service.route(&route_id("dst")).await.unwrap();
    assert_eq!(
        order(&dst),
        pairs(&[("dst-0", 0), ("dst-1", 1), ("src-0", 2)])
    );
    assert!(service.route(&route_id("src")).await.unwrap().stops.is_empty());
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn move_into_empty_route() {
    let service = service().await;
    add_route_with_stops(&service, "src", 1, &["a", "b"]).await;
    service.add_route(route_id("dst"), 2, None).await.unwrap();

    let outcome = service
        .move_route_stop(&rs("src-1"), &route_id("dst"), Some(5))
        .await
        .unwrap();

    let dst = service.route(&route_id("dst")).await.unwrap();
    assert_eq!(order(&dst), pairs(&[("src-1", 0)]));
    assert!(outcome.all_routes_legal());
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn move_within_route_is_a_reorder() {
    let service = service().await;
    add_route_with_stops(&service, "r", 1, &["a", "b", "c"]).await;

    let outcome = service
        .move_route_stop(&rs("r-2"), &route_id("r"), Some(0))
        .await
        .unwrap();

    let route = service.route(&route_id("r")).await.unwrap();
    assert_eq!(order(&route), pairs(&[("r-2", 0), ("r-0", 1), ("r-1", 2)]));
    assert_eq!(outcome.value.len(), 3);
    // c -> a -> b is legal
    assert!(outcome.all_routes_legal());
    assert_store_matches(&service).await;
}

#[tokio::test]
async fn move_rejects_unknowns() {
    let service = service().await;
    add_route_with_stops(&service, "r", 1, &["a"]).await;

    let err = service
        .move_route_stop(&rs("ghost"), &route_id("r"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownRouteStop(_)));

    let err = service
        .move_route_stop(&rs("r-0"), &route_id("nope"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownRoute(_)));
    assert_store_matches(&service).await;
}

// ========== route length ==========

#[tokio::test]
async fn full_route_rejects_more_stops() {
    let config = ServiceConfig::new(4).with_max_route_stops(2);
    let service = RouteService::load(MemoryStore::new(network()), config)
        .await
        .unwrap();
    add_route_with_stops(&service, "full", 1, &["a", "b"]).await;
    add_route_with_stops(&service, "other", 2, &["c"]).await;

    let err = service
        .add_route_stop(&route_id("full"), rs("x"), stop_id("c"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = service
        .move_route_stop(&rs("other-0"), &route_id("full"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert_eq!(service.route(&route_id("other")).await.unwrap().stops.len(), 1);

    // Reordering within a full route adds nothing.
    service
        .move_route_stop(&rs("full-1"), &route_id("full"), Some(0))
        .await
        .unwrap();
    assert_store_matches(&service).await;
}

// ========== store failures ==========

/// Store that delegates to a `MemoryStore` but fails position writes for
/// selected route stops.
struct FlakyStore {
    inner: MemoryStore,
    fail_positions_for: Mutex<Vec<RouteStopId>>,
}

impl FlakyStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_positions_for: Mutex::new(Vec::new()),
        }
    }

    fn fail_position_writes_for(&self, id: RouteStopId) {
        self.fail_positions_for.lock().unwrap().push(id);
    }
}

impl RouteStore for FlakyStore {
    async fn fetch_stops(&self) -> Result<HashMap<StopId, Stop>, StoreError> {
        self.inner.fetch_stops().await
    }

    async fn fetch_routes(&self) -> Result<Vec<Route>, StoreError> {
        self.inner.fetch_routes().await
    }

    async fn insert_route(
        &self,
        id: &RouteId,
        number: RouteNumber,
        position: u32,
    ) -> Result<(), StoreError> {
        self.inner.insert_route(id, number, position).await
    }

    async fn delete_route(&self, id: &RouteId) -> Result<(), StoreError> {
        self.inner.delete_route(id).await
    }

    async fn update_route_number(
        &self,
        id: &RouteId,
        number: RouteNumber,
    ) -> Result<(), StoreError> {
        self.inner.update_route_number(id, number).await
    }

    async fn insert_route_stop(
        &self,
        route_id: &RouteId,
        route_stop: &RouteStop,
    ) -> Result<(), StoreError> {
        self.inner.insert_route_stop(route_id, route_stop).await
    }

    async fn delete_route_stop(&self, id: &RouteStopId) -> Result<(), StoreError> {
        self.inner.delete_route_stop(id).await
    }

    async fn update_route_stop_target(
        &self,
        id: &RouteStopId,
        stop_id: &StopId,
    ) -> Result<(), StoreError> {
        self.inner.update_route_stop_target(id, stop_id).await
    }

    async fn move_route_stop(&self, id: &RouteStopId, route_id: &RouteId) -> Result<(), StoreError> {
        self.inner.move_route_stop(id, route_id).await
    }

    async fn update_route_stop_position(
        &self,
        id: &RouteStopId,
        position: u32,
    ) -> Result<(), StoreError> {
        let fail = self.fail_positions_for.lock().unwrap().contains(id);
        if fail {
            return Err(StoreError::Integrity(format!("write to {id} refused")));
        }
        self.inner.update_route_stop_position(id, position).await
    }
}

#[tokio::test]
async fn partial_batch_failure_fails_operation() {
    let inner = MemoryStore::new(network());
    let service = RouteService::load(FlakyStore::new(inner), ServiceConfig::new(1))
        .await
        .unwrap();
    service.add_route(route_id("r"), 1, None).await.unwrap();
    for (i, stop) in ["a", "b", "c"].iter().enumerate() {
        service
            .add_route_stop(&route_id("r"), rs(&format!("r-{i}")), stop_id(stop))
            .await
            .unwrap();
    }
    service.store().fail_position_writes_for(rs("r-0"));

    // r-2 -> 0 is written before r-0 -> 1 fails.
    let err = service
        .reorder_route_stops(&route_id("r"), vec![rs("r-2"), rs("r-0"), rs("r-1")])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Store(_)));
    assert!(!err.is_client_fault());

    // Memory is untouched, the store kept the first write.
    let in_memory = service.route(&route_id("r")).await.unwrap();
    assert_eq!(order(&in_memory), pairs(&[("r-0", 0), ("r-1", 1), ("r-2", 2)]));

    service.reload().await.unwrap();
    let reloaded = service.route(&route_id("r")).await.unwrap();
    let stored = service.store().fetch_routes().await.unwrap();
    assert_eq!(reloaded, stored[0]);
    let r2 = reloaded.stops.iter().find(|s| s.id == rs("r-2")).unwrap();
    assert_eq!(r2.position, 0);
}
