//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use ev_dss::api::{AppState, router};
use ev_dss::config::DssConfig;

mod common;
use common::read_fixture;

fn build_api_state(config: DssConfig) -> Arc<AppState> {
    Arc::new(AppState::new(config))
}

fn post(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn zones_endpoint_annotates_the_collection() {
    let app = router(build_api_state(DssConfig::baseline()));
    let resp = app
        .oneshot(post("/zones/validate", read_fixture("zones.geojson")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;

    assert_eq!(json["all_inputs_valid"], false);
    assert_eq!(json["inputs_count"]["FACCS"], 3);
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["name"], "centre_zones");

    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 3);
    assert!(features[0]["properties"].get("invalid").is_none());
    assert_eq!(features[2]["properties"]["invalid"], true);
}

#[tokio::test]
async fn payload_endpoint_honours_power_flag() {
    let app = router(build_api_state(DssConfig::baseline()));
    let resp = app
        .oneshot(post(
            "/analyses/payload?power=false",
            r#"{"name": "Centre", "bevs_ratio": 15}"#.to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["ubmY"]["input"]["bevs_ratio"], 0.15);
    assert!(json.get("powerY").is_none());
    assert!(json.get("ciY").is_none());
}

#[tokio::test]
async fn payload_endpoint_uses_configured_defaults() {
    let app = router(build_api_state(DssConfig::urban()));
    let resp = app
        .oneshot(post("/analyses/payload", r#"{"name": "Urban"}"#.to_string()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["ubmY"]["input"]["bevs_ratio"], 0.2);
    assert_eq!(json["ubmY"]["config"]["km_travelled_dist"]["2,5"], 0.25);
    assert_eq!(json["ciY"]["CI_database"].as_array().map(Vec::len), Some(10));
}

#[tokio::test]
async fn invalid_form_lists_failing_fields() {
    let app = router(build_api_state(DssConfig::baseline()));
    let resp = app
        .oneshot(post(
            "/analyses/payload",
            r#"{"name": "Over", "bevs_ratio": 80, "phevs_ratio": 30}"#.to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    let fields: Vec<&str> = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["bevs_ratio", "phevs_ratio"]);
}

#[tokio::test]
async fn dictionary_endpoint_flags_incomplete_distribution() {
    let app = router(build_api_state(DssConfig::baseline()));
    let resp = app
        .oneshot(post(
            "/distribution/dictionary",
            r#"[{"key": "1", "value": "10"}, {"key": "2", "value": "25"}]"#.to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["valid"], false);
    assert_eq!(json["distribution"]["2"], 0.25);
}
