//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde_json::{Map, Value};

use super::AppState;
use super::types::{DictionaryResponse, ErrorResponse, LegendQuery, PayloadQuery, ZonesResponse};
use crate::choropleth::{self, LegendRow};
use crate::distribution::{self, DistributionDict, DistributionEntry};
use crate::geo::FeatureCollection;
use crate::submission::{AnalysisForm, AnalysisPayload};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error)))
}

/// `POST /distribution/dictionary` → 200 + `DictionaryResponse`
pub async fn to_dictionary(Json(rows): Json<Vec<DistributionEntry>>) -> Json<DictionaryResponse> {
    let distribution = distribution::to_dictionary(&rows);
    let valid = distribution::is_valid(&distribution);
    Json(DictionaryResponse {
        distribution,
        valid,
    })
}

/// `POST /distribution/array` → 200 + `Vec<DistributionEntry>`
pub async fn to_array(Json(dict): Json<DistributionDict>) -> Json<Vec<DistributionEntry>> {
    Json(distribution::to_array(&dict))
}

/// Validates the zone inputs of a GeoJSON collection.
///
/// `POST /zones/validate` → 200 + `ZonesResponse`; invalid zones come back
/// with `"invalid": true` in their properties.
pub async fn validate_zones(
    State(state): State<Arc<AppState>>,
    Json(mut collection): Json<FeatureCollection>,
) -> Json<ZonesResponse> {
    let report = collection.validate_inputs(state.schema);
    Json(ZonesResponse { report, collection })
}

/// Builds the backend payload for a (possibly partial) form.
///
/// `POST /analyses/payload` → 200 + `AnalysisPayload`
/// `POST /analyses/payload?power=false` → payload without `powerY`/`ciY`
/// Invalid or unknown members → 400 + `ErrorResponse`
pub async fn build_payload(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PayloadQuery>,
    Json(overrides): Json<Map<String, Value>>,
) -> Result<Json<AnalysisPayload>, ApiError> {
    let form = AnalysisForm::from_overrides(overrides, &state.config)
        .map_err(|e| bad_request(format!("malformed form: {e}")))?;

    let fields = form.validate(&[]);
    if !fields.is_empty() {
        tracing::debug!(errors = fields.len(), "rejected analysis form");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "form validation failed".to_string(),
                fields,
            }),
        ));
    }

    let power = query.power.unwrap_or(true);
    Ok(Json(form.to_payload_with(power, &state.config.output)))
}

/// `GET /defaults` → 200 + initial `AnalysisForm`
pub async fn get_defaults(State(state): State<Arc<AppState>>) -> Json<AnalysisForm> {
    Json(AnalysisForm::from_defaults(&state.config))
}

/// `GET /legend?max=N[&theme=dark]` → 200 + six `LegendRow`s
/// Non-finite or negative `max` → 400 + `ErrorResponse`
pub async fn get_legend(Query(query): Query<LegendQuery>) -> Result<Json<Vec<LegendRow>>, ApiError> {
    if !query.max.is_finite() || query.max < 0.0 {
        return Err(bad_request(format!(
            "`max` must be a non-negative number, got {}",
            query.max
        )));
    }
    Ok(Json(choropleth::legend(query.max, query.theme)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::DssConfig;

    fn make_test_state() -> Arc<AppState> {
        Arc::new(AppState::new(DssConfig::baseline()))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn dictionary_returns_200() {
        let app = router(make_test_state());
        let req = post_json(
            "/distribution/dictionary",
            r#"[{"key": "2.5", "value": "40"}, {"key": "10", "value": "60"}]"#,
        );
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["distribution"]["2,5"], 0.4);
        assert_eq!(json["valid"], true);
    }

    #[tokio::test]
    async fn array_returns_rows() {
        let app = router(make_test_state());
        let req = post_json("/distribution/array", r#"{"10": 0.6, "2,5": 0.4}"#);
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json[0]["key"], "2.5");
        assert_eq!(json[0]["value"], "40.00");
    }

    #[tokio::test]
    async fn defaults_returns_form() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/defaults")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["bevs_ratio"], 10.0);
        assert_eq!(json["tdp"], "Weekdays");
    }

    #[tokio::test]
    async fn legend_follows_theme() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/legend?max=100&theme=dark")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json.as_array().map(Vec::len), Some(6));
        assert_eq!(json[0]["max"], 17.0);
        assert_eq!(json[5]["max"], 100.0);
        assert_eq!(json[0]["text_color"], "#e5e7eb");
    }

    #[tokio::test]
    async fn negative_legend_max_returns_400() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/legend?max=-1")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unnamed_form_returns_400_with_fields() {
        let app = router(make_test_state());
        let resp = app.oneshot(post_json("/analyses/payload", "{}")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["fields"][0]["field"], "name");
    }

    #[tokio::test]
    async fn unknown_member_returns_400() {
        let app = router(make_test_state());
        let resp = app
            .oneshot(post_json("/analyses/payload", r#"{"name": "x", "colour": 1}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json.get("fields").is_none());
    }
}
