mod dto;
mod error;
mod handlers;
mod services;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use premia_config::ServerConfig;
use premia_engine::{ArtifactPaths, Predictor};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub struct ServerState {
    pub predictor: Predictor,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let state = Arc::new(init_server_state(&config).await?);
    let app = router(state);

    let addr = config.bind_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn init_server_state(config: &ServerConfig) -> Result<ServerState> {
    let predictor = Predictor::new(ArtifactPaths {
        model: config.model_path.clone(),
        encoder: config.encoder_path.clone(),
    });

    if config.preload_artifacts {
        predictor
            .preload()
            .await
            .context("failed to load prediction artifacts")?;
    } else {
        warn!("Artifact preload disabled; loading on first prediction");
    }

    Ok(ServerState { predictor })
}

fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/", get(handlers::welcome).post(handlers::echo))
        .route(
            "/getInsurancePremiumPrediction",
            post(handlers::prediction::predict).fallback(handlers::prediction::method_not_allowed),
        )
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use premia_engine::Artifacts;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let artifacts = Artifacts::from_json(
            include_str!("../../../artifacts/model.json"),
            include_str!("../../../artifacts/encoder.json"),
        )
        .unwrap();
        router(Arc::new(ServerState {
            predictor: Predictor::with_artifacts(artifacts),
        }))
    }

    fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()));
        (status, body)
    }

    fn applicant() -> Value {
        json!({
            "age": 19,
            "sex": "female",
            "bmi": 27.9,
            "children": 0,
            "smoker": "yes",
            "region": "southwest"
        })
    }

    #[tokio::test]
    async fn test_predict_success() {
        let (status, body) = send(app(), post_json("/getInsurancePremiumPrediction", applicant().to_string())).await;
        assert_eq!(status, StatusCode::OK);
        let predict = body["predict"].as_f64().expect("predict field");
        assert!(predict.is_finite());
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_predict_is_deterministic() {
        let (_, first) = send(app(), post_json("/getInsurancePremiumPrediction", applicant().to_string())).await;
        let (_, second) = send(app(), post_json("/getInsurancePremiumPrediction", applicant().to_string())).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_predict_unknown_region() {
        let mut payload = applicant();
        payload["region"] = json!("mars");
        let (status, body) = send(app(), post_json("/getInsurancePremiumPrediction", payload.to_string())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("mars"));
        assert!(body.get("predict").is_none());
    }

    #[tokio::test]
    async fn test_predict_missing_field() {
        let mut payload = applicant();
        payload.as_object_mut().unwrap().remove("age");
        let (status, body) = send(app(), post_json("/getInsurancePremiumPrediction", payload.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field: age");
    }

    #[tokio::test]
    async fn test_predict_malformed_json() {
        let (status, body) = send(app(), post_json("/getInsurancePremiumPrediction", "{\"age\": 19,")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_predict_get_is_rejected() {
        let req = Request::builder()
            .uri("/getInsurancePremiumPrediction")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "error": "Invalid Method." }));
    }

    #[tokio::test]
    async fn test_predict_other_methods_use_error_envelope() {
        for method in ["PUT", "DELETE", "PATCH"] {
            let req = Request::builder()
                .method(method)
                .uri("/getInsurancePremiumPrediction")
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(app(), req).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(body, json!({ "error": "Invalid Method." }));
        }
    }

    #[tokio::test]
    async fn test_predict_oversized_numbers_rejected() {
        for field in ["age", "bmi"] {
            let mut payload = applicant();
            payload[field] = json!(1e200);
            let (status, body) = send(app(), post_json("/getInsurancePremiumPrediction", payload.to_string())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
            assert!(body["error"].as_str().unwrap().contains(field));
            assert!(body.get("predict").is_none());
        }
    }

    #[tokio::test]
    async fn test_predict_without_artifacts() {
        let app = router(Arc::new(ServerState {
            predictor: Predictor::new(ArtifactPaths {
                model: "/nonexistent/model.json".into(),
                encoder: "/nonexistent/encoder.json".into(),
            }),
        }));
        let (status, body) = send(app, post_json("/getInsurancePremiumPrediction", applicant().to_string())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("model.json"));
    }

    #[tokio::test]
    async fn test_welcome() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_str().unwrap().starts_with("Welcome"));
    }

    #[tokio::test]
    async fn test_echo() {
        let (status, body) = send(app(), post_json("/", r#"{"hello": "world"}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "Post Values": { "hello": "world" } }));
    }

    #[tokio::test]
    async fn test_echo_invalid_format() {
        for body in ["{}", "null", "not json"] {
            let (status, res) = send(app(), post_json("/", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(res, json!({ "error": "Invalid format." }));
        }
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let mut req = post_json("/getInsurancePremiumPrediction", applicant().to_string());
        req.headers_mut()
            .insert(header::ORIGIN, "https://example.com".parse().unwrap());
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
