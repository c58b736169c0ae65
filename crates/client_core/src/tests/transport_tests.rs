use super::*;
use crate::{
    catalog::{fetch_categories, fetch_platforms},
    controller::SubmitOutcome,
    error::{FailureKind, SubmitError},
    forms::{account, prediction},
    test_support::{raw, RecordingSurface},
};
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Value {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map_or(Value::Null, |value| Value::String(value.to_string()))
}

async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "success": true,
        "content_type": header_text(&headers, header::CONTENT_TYPE),
        "accept": header_text(&headers, header::ACCEPT),
        "echo": body,
    }))
}

async fn login() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, "session=ada; Path=/")],
        Json(json!({
            "success": true,
            "token": "demo_token_ada@example.com",
            "user": { "email": "ada@example.com" },
        })),
    )
}

async fn predict(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let signed_in = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookie| cookie.contains("session=ada"));
    if !signed_in {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "User not authenticated" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "predicted_discount": 12.5,
            "best_platform": "Flipkart",
            "platform_confidence": 64.2,
            "estimated_price": 5000.0,
            "discounted_price": 4375.0,
            "savings": 625.0,
            "category": "Electronics",
            "model_used": "Random Forest",
            "recommendations": ["Compare prices across platforms before purchasing"],
        })),
    )
}

#[tokio::test]
async fn posts_json_with_content_type_and_optional_accept_header() {
    let server_url = spawn_server(Router::new().route("/api/echo", post(echo))).await;
    let transport =
        HttpTransport::new(&server_url, Some(Duration::from_secs(5))).expect("transport");

    let reply = transport
        .send(JsonRequest::post("/api/echo", json!({ "name": "Ada" })).accept_json(true))
        .await
        .expect("reply");
    assert_eq!(reply.status, 200);
    let body: Value = serde_json::from_str(&reply.body).expect("json");
    assert_eq!(body["content_type"], "application/json");
    assert_eq!(body["accept"], "application/json");
    assert_eq!(body["echo"], json!({ "name": "Ada" }));

    let reply = transport
        .send(JsonRequest::post("/api/echo", json!({})))
        .await
        .expect("reply");
    let body: Value = serde_json::from_str(&reply.body).expect("json");
    assert_ne!(body["accept"], "application/json");
}

#[test]
fn endpoint_paths_join_below_base_path() {
    let transport = HttpTransport::new("http://localhost:5000/app", None).expect("transport");
    assert_eq!(
        transport.endpoint_url("/api/contact").expect("url").as_str(),
        "http://localhost:5000/app/api/contact"
    );

    let transport = HttpTransport::new("http://localhost:5000", None).expect("transport");
    assert_eq!(
        transport.endpoint_url("/api/predict").expect("url").as_str(),
        "http://localhost:5000/api/predict"
    );
}

#[test]
fn rejects_unparseable_server_url() {
    assert!(matches!(
        HttpTransport::new("not a url", None),
        Err(TransportError::InvalidUrl { .. })
    ));
}

#[tokio::test]
async fn unreachable_server_is_a_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let transport = HttpTransport::new(&format!("http://{addr}"), Some(Duration::from_secs(5)))
        .expect("transport");
    let err = transport
        .send(JsonRequest::post("/api/contact", json!({})))
        .await
        .expect_err("nothing listening");

    assert_eq!(SubmitError::from(err).kind(), FailureKind::CannotConnect);
}

#[tokio::test]
async fn slow_server_times_out_as_a_connectivity_failure() {
    let app = Router::new().route(
        "/api/predict",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "success": true }))
        }),
    );
    let server_url = spawn_server(app).await;
    let transport =
        HttpTransport::new(&server_url, Some(Duration::from_millis(100))).expect("transport");

    let err = transport
        .send(JsonRequest::post("/api/predict", json!({})))
        .await
        .expect_err("client timeout");

    assert!(
        matches!(err, TransportError::Timeout { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(SubmitError::from(err).kind(), FailureKind::CannotConnect);
}

#[tokio::test]
async fn non_success_status_keeps_server_detail() {
    let server_url = spawn_server(Router::new()).await;
    let transport = HttpTransport::new(&server_url, None).expect("transport");

    let reply = transport
        .send(JsonRequest::post("/api/missing", json!({})))
        .await
        .expect("reply");
    assert_eq!(reply.status, 404);
    assert_eq!(
        reply.into_envelope().expect_err("404"),
        TransportError::Status {
            status: 404,
            detail: None
        }
    );

    let reply = HttpReply::json(
        400,
        &json!({ "success": false, "error": "All fields are required" }),
    );
    assert_eq!(
        reply.into_envelope().expect_err("400"),
        TransportError::Status {
            status: 400,
            detail: Some("All fields are required".into())
        }
    );
}

#[tokio::test]
async fn catalog_lookups_return_option_lists() {
    let app = Router::new()
        .route(
            "/api/categories",
            get(|| async {
                Json(json!({ "success": true, "categories": ["Books", "Electronics"] }))
            }),
        )
        .route(
            "/api/platforms",
            get(|| async { Json(json!({ "success": false, "error": "database offline" })) }),
        );
    let server_url = spawn_server(app).await;
    let transport = HttpTransport::new(&server_url, None).expect("transport");

    assert_eq!(
        fetch_categories(&transport).await.expect("categories"),
        vec!["Books".to_string(), "Electronics".to_string()]
    );
    assert_eq!(
        fetch_platforms(&transport).await.expect_err("platforms"),
        SubmitError::Application("database offline".into())
    );
}

#[tokio::test]
async fn prediction_succeeds_once_session_cookie_is_set() {
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/predict", post(predict));
    let server_url = spawn_server(app).await;
    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::new(&server_url, Some(Duration::from_secs(5))).expect("transport"));

    let predict_surface = RecordingSurface::new("Find Best Deals");
    let predict_form = prediction::controller(transport.clone(), predict_surface.clone());
    let fields = raw(&[("category", "Electronics"), ("budget", "5000")]);

    let outcome = predict_form.submit(&fields).await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(
        predict_surface.snapshot().error.as_deref(),
        Some("An error occurred: server returned 401: User not authenticated")
    );

    let login_form = account::login_controller(transport.clone(), RecordingSurface::new("Sign In"));
    let outcome = login_form
        .submit(&raw(&[("email", "ada@example.com"), ("password", "secret")]))
        .await;
    assert_eq!(outcome, SubmitOutcome::Succeeded);

    let outcome = predict_form.submit(&fields).await;
    assert_eq!(outcome, SubmitOutcome::Succeeded);
    let log = predict_surface.snapshot();
    assert_eq!(log.text(prediction::DISCOUNT_VALUE), Some("12.5%"));
    assert_eq!(log.text(prediction::PLATFORM_BADGE), Some("Flipkart"));
    assert_eq!(log.text(prediction::DISCOUNTED_PRICE), Some("4375.00"));
    assert_eq!(log.text(prediction::MODEL_NAME), Some("Random Forest"));
    assert_eq!(log.error, None);
}
