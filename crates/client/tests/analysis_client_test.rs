//! Exercises `AnalysisClient` against an in-process mock of the analysis API.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use spe_client::{
    fetch_config_or_default, AnalysisClient, AnalysisService, ClientError, HeatmapQuery,
    RemoteConfig,
};
use spe_core::{
    build_scenario, AgentDraft, EntityStore, GeoPoint, HeatmapFeature, ResolutionConfig,
    ScenarioSettings, Schedule,
};

async fn spawn_mock(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

fn client(base: &str) -> AnalysisClient {
    AnalysisClient::new(base, Duration::from_secs(5)).unwrap()
}

fn mock_router() -> Router {
    Router::new()
        .route(
            "/api/config",
            get(|| async {
                Json(json!({
                    "mapboxToken": "pk.mock",
                    "initialViewState": {"latitude": 41.0, "longitude": -87.6, "zoom": 10},
                    "ui": {"embeddingTab": true, "spectralTab": true, "heatmapTab": false},
                    "defaults": {"resServiceStopTime": 512},
                    "h3Levels": [6, 7],
                    "cycleDays": 28,
                    "baseFrequency": 16
                }))
            }),
        )
        .route(
            "/api/embed",
            post(|Json(scenario): Json<Value>| async move {
                let agents = scenario["agents"].as_array().map(|a| a.len()).unwrap_or(0);
                Json(json!({
                    "embedding": [agents as f64, 0.5, 0.25],
                    "components": {"service_stop_time": [1.0, 0.0, -1.0, 0.0]},
                    "offsets": {"service_stop_time": [0, 3]},
                    "meta": {"order": ["service_stop_time"], "cycle_days": 28}
                }))
            }),
        )
        .route(
            "/api/scenario/save",
            post(|Json(_): Json<Value>| async { Json(json!({"id": "scn-42"})) }),
        )
        .route(
            "/api/index",
            post(|Json(body): Json<Value>| async move {
                let id = body["scenario_id"].as_str().unwrap_or_default().to_string();
                Json(json!({"embedding_id": format!("emb-{}", id)}))
            }),
        )
        .route(
            "/api/search",
            post(|Json(body): Json<Value>| async move {
                let k = body["k"].as_u64().unwrap_or(0) as usize;
                let hits: Vec<Value> = (0..k)
                    .map(|i| json!({"ref": format!("scn-{}", i), "distance": i as f64 * 0.1}))
                    .collect();
                Json(json!({"hits": hits}))
            }),
        )
        .route(
            "/api/simulate",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "stats": {
                        "unassigned_stops": body["day"],
                        "driving_sec_per_rep": [600.0],
                        "service_sec_per_rep": [3600.0],
                        "reps_used_per_day": [1]
                    },
                    "vector": [1.0, 2.0]
                }))
            }),
        )
        .route(
            "/api/heatmap",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "cells": [{
                        "h3": format!("{}-{}", body["feature"].as_str().unwrap_or(""), body["h3_level"]),
                        "lat": 37.8,
                        "lng": -85.0,
                        "value": 3.0
                    }]
                }))
            }),
        )
}

fn sample_scenario(agents: usize) -> spe_core::Scenario {
    let mut store = EntityStore::new();
    for i in 0..agents {
        store.add_agent(AgentDraft {
            name: format!("Agent {}", i + 1),
            position: GeoPoint::new(37.8, -85.0),
            schedule: Schedule::default(),
        });
    }
    build_scenario(
        store.agents(),
        store.accounts(),
        &ResolutionConfig::default(),
        &ScenarioSettings::default(),
    )
}

#[tokio::test]
async fn config_is_parsed_with_per_field_fallback() {
    let base = spawn_mock(mock_router()).await;
    let cfg = client(&base).config().await.unwrap();

    assert_eq!(cfg.mapbox_token, "pk.mock");
    assert!(!cfg.ui.heatmap_tab);
    let res = cfg.resolution();
    assert_eq!(res.res_service_stop_time, 512);
    assert_eq!(res.res_service_window_start, 1024);
    assert_eq!(res.res_agents_available, 128);
}

#[tokio::test]
async fn embed_save_index_search_roundtrip() {
    let base = spawn_mock(mock_router()).await;
    let client = client(&base);
    let scenario = sample_scenario(3);

    let embedding = client.embed(&scenario).await.unwrap();
    assert_eq!(embedding.embedding[0], 3.0);
    assert_eq!(embedding.component_names(), vec!["service_stop_time"]);
    assert_eq!(embedding.offsets["service_stop_time"], [0, 3]);

    let saved = client.save_scenario(&scenario).await.unwrap();
    assert_eq!(saved, "scn-42");

    let embedding_id = client.index(&saved, &embedding.embedding).await.unwrap();
    assert_eq!(embedding_id, "emb-scn-42");

    let hits = client.search(&embedding.embedding, 4).await.unwrap();
    assert_eq!(hits.len(), 4);
    assert_eq!(hits[2].reference, "scn-2");
}

#[tokio::test]
async fn simulate_and_heatmap() {
    let base = spawn_mock(mock_router()).await;
    let client = client(&base);
    let scenario = sample_scenario(1);

    let outcome = client.simulate(&scenario, 5).await.unwrap();
    assert_eq!(outcome.stats.unassigned_stops, 5);
    assert_eq!(outcome.stats.reps_used(), 1);
    assert_eq!(outcome.vector, Some(vec![1.0, 2.0]));

    let cells = client
        .heatmap(&HeatmapQuery {
            scenario,
            feature: HeatmapFeature::PinnedAccounts,
            day: 0,
            h3_level: 8,
        })
        .await
        .unwrap();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].h3.as_deref(), Some("pinned_accounts-8"));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let app = Router::new().route(
        "/api/embed",
        post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "no accounts") }),
    );
    let base = spawn_mock(app).await;

    let err = client(&base).embed(&sample_scenario(0)).await.unwrap_err();
    match err {
        ClientError::Api { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "no accounts");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let app = Router::new().route("/api/scenario/save", post(|| async { "not json" }));
    let base = spawn_mock(app).await;

    let err = client(&base).save_scenario(&sample_scenario(0)).await.unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)));
}

#[tokio::test]
async fn config_failure_falls_back_to_builtin_default() {
    let app = Router::new().route(
        "/api/config",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = spawn_mock(app).await;

    let cfg = fetch_config_or_default(&client(&base)).await;
    assert_eq!(cfg, RemoteConfig::default());
}

#[tokio::test]
async fn unreachable_service_falls_back_to_builtin_default() {
    // Bind and drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let unreachable =
        AnalysisClient::new(&format!("http://{}", addr), Duration::from_millis(500)).unwrap();
    let cfg = fetch_config_or_default(&unreachable).await;
    assert_eq!(cfg.initial_view_state.latitude, 37.8);
    assert_eq!(cfg.resolution(), ResolutionConfig::default());
}
