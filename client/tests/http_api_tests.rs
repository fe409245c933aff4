//! HTTP transport tests against a fake INNOFarms backend
//!
//! Tests for:
//! - Endpoint paths, query parameters and request bodies
//! - Error message extraction and fallbacks
//! - Server rejections inside a successful envelope
//! - The full planting flow over HTTP, including the recently queued flag

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use innofarms_planner::config::{ApiConfig, Config, FarmConfig, StateConfig};
use innofarms_planner::error::AppError;
use innofarms_planner::events::EventBus;
use innofarms_planner::external::{FarmApi, HttpFarmApi};
use innofarms_planner::services::{PlantingWorkflow, QueueService, ReallocationPanel, SaveOutcome};
use innofarms_planner::state::{record_queue_events, ClientStateStore};
use innofarms_planner::AppState;
use innofarms_shared::{
    AllocationRow, CropBatchItem, CropTypeCapacity, CycleStatus, FarmId, ShelfRef, WaitPanel,
};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct Backend {
    bodies: Arc<Mutex<Vec<Value>>>,
    request_ids: Arc<Mutex<Vec<String>>>,
}

// ============================================================================
// Fake Backend
// ============================================================================

async fn shelf_availability(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        backend.request_ids.lock().unwrap().push(id.to_string());
    }

    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Session expired, please sign in again" })),
        );
    }

    if params.get("farmId").map(String::as_str) != Some("4") {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "unknown farm" })));
    }

    (
        StatusCode::OK,
        Json(json!({
            "data": {
                "shelves": {
                    "availableShelves": [
                        { "rack_id": 1, "shelf_id": 1, "crop_type": null, "status": "AVAILABLE", "isAvailable": true }
                    ],
                    "occupiedShelves": [
                        {
                            "rack_id": 1,
                            "shelf_id": 2,
                            "crop_type": "basil",
                            "status": "ACTIVE",
                            "isAvailable": false,
                            "currentCycle": {
                                "cycle_id": 70,
                                "crop_name": "Basil",
                                "crop_variety": "Thai",
                                "current_stage": "HARVESTING",
                                "days_until_harvest": 0,
                                "expected_harvest_date": "2024-06-01"
                            }
                        },
                        {
                            "rack_id": 2,
                            "shelf_id": 1,
                            "crop_type": "kale",
                            "status": "ACTIVE",
                            "isAvailable": false,
                            "currentCycle": {
                                "cycle_id": 71,
                                "crop_name": "Kale",
                                "crop_variety": "Curly",
                                "current_stage": "GROWING",
                                "days_until_harvest": 12,
                                "expected_harvest_date": "2024-06-13"
                            }
                        }
                    ],
                    "totalAvailable": 1,
                    "totalOccupied": 2
                },
                "completion_suggestions": [],
                "queue_recommendations": {},
                "summary": { "totalShelves": 3 }
            }
        })),
    )
}

async fn plant_crops(
    State(backend): State<Backend>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.bodies.lock().unwrap().push(body);
    (
        StatusCode::CREATED,
        Json(json!({
            "statusCode": 201,
            "message": "Crop cycles created",
            "data": {
                "immediate": [{
                    "cycle_id": 101,
                    "crop_name": "Lettuce",
                    "crop_variety": "Romaine",
                    "rack_id": 1,
                    "shelf_id": 1,
                    "status": "SEEDING"
                }],
                "queued": [{
                    "cycle_id": 102,
                    "crop_name": "Kale",
                    "crop_variety": "Curly",
                    "rack_id": 2,
                    "shelf_id": 1,
                    "status": "PENDING",
                    "waiting_for_cycle": 71,
                    "waiting_for_crop": "Kale"
                }],
                "total": 2
            }
        })),
    )
}

async fn reallocate(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    backend.bodies.lock().unwrap().push(body.clone());
    match body["changedAllocation"][0]["newAllocation"].as_i64() {
        Some(9) => (
            StatusCode::OK,
            Json(json!({ "statusCode": 422, "message": "Crop type lettuce exceeds capacity by 1 shelf" })),
        )
            .into_response(),
        Some(2) => StatusCode::NO_CONTENT.into_response(),
        _ => (
            StatusCode::OK,
            Json(json!({ "statusCode": 200, "message": "Shelf allocation updated successfully" })),
        )
            .into_response(),
    }
}

async fn pending(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if params.get("farmId").map(String::as_str) != Some("4") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Farm has no queue configured" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "data": [{
                "cycle_id": 102,
                "crop_name": "Kale",
                "crop_variety": "Curly",
                "crop_type": "kale",
                "status": "PENDING",
                "waiting_for_shelf": {
                    "rack_id": null,
                    "shelf_id": null,
                    "current_cycle_id": 71,
                    "current_crop": "Basil batch #4",
                    "expected_available_date": "not scheduled",
                    "days_until_available": 2,
                    "current_status": "GROWING"
                },
                "queued_at": "2024-05-02T08:30:00Z",
                "will_start_from": "SEEDING",
                "queue_position": 1
            }]
        })),
    )
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/cropcycle/shelf-availability", get(shelf_availability))
        .route("/api/cropcycle/pending", get(pending))
        .route("/api/cropcycle", post(plant_crops).put(reallocate))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/", addr), backend)
}

fn farm(id: i64) -> FarmId {
    FarmId::new(id).unwrap()
}

fn temp_state_path() -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("innofarms-http-{}", uuid::Uuid::new_v4()))
        .join("client-state.json")
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
async fn test_shelf_availability_sends_auth_and_request_id() {
    let (url, backend) = spawn_backend().await;
    let api = HttpFarmApi::new(url).with_auth_token(TOKEN);

    let data = assert_ok!(api.shelf_availability(farm(4)).await);
    assert_eq!(data.shelves.occupied_shelves.len(), 2);
    assert_eq!(data.summary["totalShelves"], 3);

    let ids = backend.request_ids.lock().unwrap();
    assert_eq!(ids.len(), 1);
    assert!(uuid::Uuid::parse_str(&ids[0]).is_ok());
}

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let (url, _) = spawn_backend().await;
    let api = HttpFarmApi::new(url);

    match api.shelf_availability(farm(4)).await {
        Err(AppError::Transport { status, message }) => {
            assert_eq!(status, Some(401));
            assert_eq!(message, "Session expired, please sign in again");
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_without_message_uses_fallback() {
    let (url, _) = spawn_backend().await;
    let api = HttpFarmApi::new(url).with_auth_token(TOKEN);

    let err = assert_err!(api.shelf_availability(farm(9)).await);
    assert_eq!(err.user_message(), "Failed to fetch shelf availability");
}

#[tokio::test]
async fn test_unreachable_backend_uses_fallback() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = HttpFarmApi::new(format!("http://{}", addr));

    match api.pending_cycles(farm(4)).await {
        Err(AppError::Transport { status, message }) => {
            assert_eq!(status, None);
            assert_eq!(message, "Failed to fetch queued crops");
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_queue_fetch_and_projection() {
    let (url, _) = spawn_backend().await;
    let queue = QueueService::new(Arc::new(HttpFarmApi::new(url)));

    let projections = assert_ok!(queue.projections(4).await);
    assert_eq!(projections.len(), 1);
    assert_eq!(
        projections[0].panel,
        WaitPanel::General {
            current_crop: Some("Basil batch #4".to_string()),
            wait_estimate: Some("2 days".to_string()),
        }
    );
    assert_eq!(projections[0].queued_at.as_deref(), Some("May 2, 2024"));

    let err = assert_err!(queue.fetch(5).await);
    assert_eq!(err.user_message(), "Farm has no queue configured");
}

#[tokio::test]
async fn test_reallocation_rejection_and_success_messages() {
    let (url, backend) = spawn_backend().await;
    let api: Arc<dyn FarmApi> = Arc::new(HttpFarmApi::new(url));

    let mut capacities = std::collections::BTreeMap::new();
    capacities.insert(
        "lettuce".to_string(),
        CropTypeCapacity {
            total_available_shelves: 12,
            total_shelves_by_type: 16,
        },
    );
    let mut panel = ReallocationPanel::open(
        4,
        api,
        vec![AllocationRow::new(11, "Lettuce", "Romaine", "lettuce", CycleStatus::Seeding, 4)],
        capacities,
    )
    .unwrap();

    panel.set_shelves(11, 9).unwrap();
    match panel.save().await {
        Err(AppError::ServerRejection { status_code, message }) => {
            assert_eq!(status_code, 422);
            assert_eq!(message, "Crop type lettuce exceeds capacity by 1 shelf");
        }
        other => panic!("expected server rejection, got {:?}", other),
    }

    panel.set_shelves(11, 6).unwrap();
    assert_eq!(
        panel.save().await.unwrap(),
        SaveOutcome::Saved {
            message: Some("Shelf allocation updated successfully".to_string())
        }
    );

    let bodies = backend.bodies.lock().unwrap();
    assert_eq!(
        bodies[1],
        json!({ "farmId": 4, "changedAllocation": [{ "cycleId": 11, "newAllocation": 6 }] })
    );
}

#[tokio::test]
async fn test_reallocation_with_empty_success_body() {
    let (url, _) = spawn_backend().await;
    let api: Arc<dyn FarmApi> = Arc::new(HttpFarmApi::new(url));

    let mut capacities = std::collections::BTreeMap::new();
    capacities.insert(
        "kale".to_string(),
        CropTypeCapacity {
            total_available_shelves: 6,
            total_shelves_by_type: 8,
        },
    );
    let mut panel = ReallocationPanel::open(
        4,
        api,
        vec![AllocationRow::new(21, "Kale", "Curly", "kale", CycleStatus::Transplant, 3)],
        capacities,
    )
    .unwrap();

    panel.set_shelves(21, 2).unwrap();
    assert_eq!(
        assert_ok!(panel.save().await),
        SaveOutcome::Saved { message: None }
    );
    assert!(!panel.can_save());
}

// ============================================================================
// End-to-end Planting Flow
// ============================================================================

#[tokio::test]
async fn test_planting_flow_over_http() {
    let (url, backend) = spawn_backend().await;
    let api: Arc<dyn FarmApi> = Arc::new(HttpFarmApi::new(url).with_auth_token(TOKEN));
    let events = EventBus::new();
    let store = ClientStateStore::new(temp_state_path());
    let recorder = tokio::spawn(record_queue_events(events.subscribe(), store.clone()));

    let workflow = PlantingWorkflow::new(4, api, events.clone());
    workflow
        .open(&[
            CropBatchItem {
                crop_name: "Lettuce".to_string(),
                crop_variety: "Romaine".to_string(),
                crop_type: "lettuce".to_string(),
            },
            CropBatchItem {
                crop_name: "Kale".to_string(),
                crop_variety: "Curly".to_string(),
                crop_type: "kale".to_string(),
            },
        ])
        .await;
    assert!(workflow.refresh_availability().await.unwrap());

    let snapshot = workflow.snapshot().await.unwrap();
    // Shelf 1-2 is harvest-ready, so it counts as available
    assert_eq!(snapshot.visible_shelves.len(), 3);
    assert!(snapshot
        .visible_shelves
        .iter()
        .filter(|s| s.is_available)
        .any(|s| s.location() == ShelfRef::new(1, 2)));

    workflow.select_shelf(ShelfRef::new(1, 1)).await.unwrap();
    workflow.select_shelf(ShelfRef::new(2, 1)).await.unwrap();

    let outcome = workflow.submit().await.unwrap();
    assert_eq!(outcome.immediate.len(), 1);
    assert_eq!(outcome.queued[0].waiting_for_crop.as_deref(), Some("Kale"));

    let body = backend.bodies.lock().unwrap()[0].clone();
    assert_eq!(
        body,
        json!({
            "farm_id": 4,
            "crops": [
                {
                    "crop_name": "Lettuce",
                    "crop_variety": "Romaine",
                    "crop_type": "lettuce",
                    "target_rack_id": 1,
                    "target_shelf_id": 1
                },
                {
                    "crop_name": "Kale",
                    "crop_variety": "Curly",
                    "crop_type": "kale",
                    "target_rack_id": 2,
                    "target_shelf_id": 1
                }
            ]
        })
    );

    drop(workflow);
    drop(events);
    recorder.await.unwrap();
    assert!(store.take_recently_queued().await.unwrap());
}

#[tokio::test]
async fn test_app_state_persists_recently_queued() {
    let (url, _) = spawn_backend().await;
    let state_path = temp_state_path();
    let state = AppState::from_config(Config {
        environment: "test".to_string(),
        api: ApiConfig {
            base_url: url,
            auth_token: Some(TOKEN.to_string()),
            timeout_secs: 5,
        },
        farm: FarmConfig { id: 4 },
        state: StateConfig {
            path: state_path.to_string_lossy().into_owned(),
        },
    })
    .unwrap();

    let workflow = PlantingWorkflow::new(4, state.api.clone(), state.events.clone());
    workflow
        .open(&[CropBatchItem {
            crop_name: "Kale".to_string(),
            crop_variety: "Curly".to_string(),
            crop_type: "kale".to_string(),
        }])
        .await;
    workflow.select_shelf(ShelfRef::new(2, 1)).await.unwrap();
    let outcome = workflow.submit().await.unwrap();
    assert_eq!(outcome.queued.len(), 1);

    let mut persisted = false;
    for _ in 0..100 {
        if state.store.load().await.unwrap().recently_queued {
            persisted = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(persisted);
    assert!(!state.recorder.is_finished());
}
