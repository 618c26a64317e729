//! Integration tests for the prediction form and health endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use predictor_lib::{
    fields,
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    predictor::{
        ConstantModel, FeatureLayout, LabelDecoder, ModelHandle, PrecipTypePredictor,
        PredictorKind, PredictorRegistry, TemperaturePredictor, WeatherSummaryPredictor,
    },
    PredictError,
};
use std::sync::Arc;
use tower::ServiceExt;
use weather_server::api::{create_router, AppState, INVALID_INPUT_MESSAGE};

const SHARED_FORM: &str = "temp=15.2&apparent_temp=14.8&humidity=0.80&wind_speed=12.5\
&wind_bearing=220.0&visibility=9.5&pressure=1014.0&hour=14&month=11";

fn summary_predictor() -> WeatherSummaryPredictor {
    let handle = ModelHandle::from_parts(
        "summary_forecast_model",
        FeatureLayout::base().with_one_hot(fields::PRECIP_TYPE, ["rain", "snow"]),
        Box::new(ConstantModel(0.0)),
        Some(LabelDecoder::new(["Clear", "Foggy", "Overcast"])),
    );
    WeatherSummaryPredictor::from_handle(handle).unwrap()
}

fn precip_predictor(raw: f64) -> PrecipTypePredictor {
    let handle = ModelHandle::from_parts(
        "preciptype_forecast_model",
        FeatureLayout::base(),
        Box::new(ConstantModel(raw)),
        Some(LabelDecoder::new(["rain", "snow"])),
    );
    PrecipTypePredictor::from_handle(handle).unwrap()
}

fn temperature_predictor() -> TemperaturePredictor {
    let handle = ModelHandle::from_parts(
        "temperature_forecast_model",
        FeatureLayout::base()
            .with_one_hot(fields::SUMMARY, ["Clear", "Overcast"])
            .with_one_hot(fields::PRECIP_TYPE, ["rain", "snow"]),
        Box::new(ConstantModel(13.4567)),
        None,
    );
    TemperaturePredictor::from_handle(handle).unwrap()
}

async fn setup_app(predictors: PredictorRegistry) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.sync_predictors(&predictors).await;
    health_registry.set_ready(true).await;

    let state = Arc::new(AppState::new(
        predictors,
        health_registry,
        ServiceMetrics::new(),
        StructuredLogger::new("test-node"),
    ));
    (create_router(state.clone()), state)
}

async fn full_app() -> (Router, Arc<AppState>) {
    setup_app(
        PredictorRegistry::new()
            .with(summary_predictor())
            .with(precip_predictor(1.0))
            .with(temperature_predictor()),
    )
    .await
}

async fn post_form(app: Router, uri: &str, body: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_summary_prediction_redirects_with_result() {
    let (app, _state) = full_app().await;

    let response = post_form(
        app,
        "/predict/summary",
        &format!("{}&precip_type=rain", SHARED_FORM),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?mode=summary&result=Clear");
}

#[tokio::test]
async fn test_precip_prediction_redirects_with_result() {
    let (app, _state) = full_app().await;

    let response = post_form(app, "/predict/precip", SHARED_FORM).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?mode=precip&result=snow");
}

#[tokio::test]
async fn test_temperature_result_is_formatted() {
    let (app, _state) = full_app().await;

    let response = post_form(
        app,
        "/predict/temp",
        &format!("{}&summary=Overcast&precip_type=rain", SHARED_FORM),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?mode=temp&result=13.46+C");
}

#[tokio::test]
async fn test_type_error_shows_generic_message() {
    let (app, _state) = full_app().await;

    let body = SHARED_FORM.replace("hour=14", "hour=afternoon");
    let response = post_form(app, "/predict/precip", &body).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let expected = weather_server::api::index_location(
        PredictorKind::PrecipType,
        "error",
        INVALID_INPUT_MESSAGE,
    );
    assert_eq!(location(&response), expected);
}

#[tokio::test]
async fn test_missing_field_shows_error_text() {
    let (app, _state) = full_app().await;

    let response = post_form(app, "/predict/summary", SHARED_FORM).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let expected = weather_server::api::index_location(
        PredictorKind::Summary,
        "error",
        &PredictError::MissingField("Precip Type".to_string()).to_string(),
    );
    assert_eq!(location(&response), expected);
}

#[tokio::test]
async fn test_decode_error_shows_error_text() {
    let (app, _state) = setup_app(PredictorRegistry::new().with(precip_predictor(5.0))).await;

    let response = post_form(app, "/predict/precip", SHARED_FORM).await;

    let expected = weather_server::api::index_location(
        PredictorKind::PrecipType,
        "error",
        &PredictError::Decode(5.0).to_string(),
    );
    assert_eq!(location(&response), expected);
}

#[tokio::test]
async fn test_unloaded_predictor_surfaces_load_error() {
    let (app, _state) = setup_app(PredictorRegistry::new().with(precip_predictor(0.0))).await;

    let response = post_form(
        app,
        "/predict/temp",
        &format!("{}&summary=Clear&precip_type=snow", SHARED_FORM),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/?mode=temp&error="), "got {}", target);
    assert!(target.contains("temperature_forecast_model"));
}

#[tokio::test]
async fn test_index_renders_selected_form() {
    let (app, _state) = full_app().await;

    let response = get(app, "/?mode=temp&result=13.46%20C").await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("action=\"/predict/temp\""));
    assert!(page.contains("name=\"summary\""));
    assert!(page.contains("13.46 C"));
}

#[tokio::test]
async fn test_index_defaults_to_summary() {
    let (app, _state) = full_app().await;

    let response = get(app, "/?mode=bogus").await;

    let page = body_string(response).await;
    assert!(page.contains("action=\"/predict/summary\""));
}

#[tokio::test]
async fn test_index_escapes_error() {
    let (app, _state) = full_app().await;

    let response = get(app, "/?error=%3Cscript%3E").await;

    let page = body_string(response).await;
    assert!(page.contains("&lt;script&gt;"));
    assert!(!page.contains("<script>"));
}

#[tokio::test]
async fn test_healthz_returns_ok_when_all_loaded() {
    let (app, _state) = full_app().await;

    let response = get(app, "/healthz").await;

    assert_eq!(response.status(), StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["components"][components::SUMMARY_MODEL]["status"], "healthy");
}

#[tokio::test]
async fn test_healthz_unavailable_with_missing_model() {
    let (app, _state) = setup_app(PredictorRegistry::new().with(precip_predictor(0.0))).await;

    let response = get(app, "/healthz").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let health: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health["status"], "unhealthy");
    assert_eq!(health["components"][components::PRECIP_MODEL]["status"], "healthy");
}

#[tokio::test]
async fn test_readyz_ready_with_partial_models() {
    let (app, _state) = setup_app(PredictorRegistry::new().with(precip_predictor(0.0))).await;

    let response = get(app, "/readyz").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readyz_unavailable_without_models() {
    let (app, _state) = setup_app(PredictorRegistry::new()).await;

    let response = get(app, "/readyz").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let readiness: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(readiness["ready"], false);
}

#[tokio::test]
async fn test_readyz_unavailable_before_init() {
    let (app, state) = full_app().await;
    state.health_registry.set_ready(false).await;

    let response = get(app, "/readyz").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_counts_predictions() {
    let (app, state) = full_app().await;
    let before = state.metrics.predictions_served(PredictorKind::Summary);

    post_form(
        app.clone(),
        "/predict/summary",
        &format!("{}&precip_type=snow", SHARED_FORM),
    )
    .await;
    assert!(state.metrics.predictions_served(PredictorKind::Summary) > before);

    let response = get(app, "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_string(response).await;
    assert!(text.contains("weather_predictor_predictions_total"));
}
