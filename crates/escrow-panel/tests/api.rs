//! http api against an in-memory chain

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::*;
use escrow_panel::router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(chain: MockChain) -> Router {
    router(Arc::new(panel(Arc::new(chain))))
}

fn app_with_chain(chain: MockChain) -> (Router, Arc<MockChain>) {
    let chain = Arc::new(chain);
    (router(Arc::new(panel(chain.clone()))), chain)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK, "{uri}");
    serde_json::from_slice(&body).unwrap()
}

fn transfer_body(amount: &str) -> Value {
    json!({
        "recipient_address": RECIPIENT,
        "from_address": USER,
        "amount": amount,
    })
}

#[tokio::test]
async fn health_is_ok() {
    let app = app(MockChain::new());
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn index_serves_the_form() {
    let app = app(MockChain::new());
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    for id in [
        "transferForm",
        "recipientAddress",
        "fromAddress",
        "amount",
        "transferBtn",
        "transfersList",
    ] {
        assert!(html.contains(&format!("id=\"{id}\"")), "missing #{id}");
    }

    // submit is disabled before the transfer request goes out, and the
    // balance report is shown from the response itself
    let submit = html.find("setLoading(true)").unwrap();
    let request = html.find("api(\"/api/transfer\"").unwrap();
    assert!(submit < request);
    assert!(html.contains("r.balance_display"));
}

#[tokio::test]
async fn info_lists_contracts() {
    let app = app(MockChain::new());
    let info = get_json(&app, "/api/info").await;

    assert_eq!(info["token"], TOKEN);
    assert_eq!(info["escrow"], addr(ESCROW).to_string());
    assert_eq!(info["company_wallet"], addr(COMPANY).to_string());
    assert_eq!(info["symbol"], "USDT");
}

#[tokio::test]
async fn idle_status() {
    let app = app(MockChain::new());
    let status = get_json(&app, "/api/status").await;

    assert_eq!(status["phase"], "idle");
    assert_eq!(status["control"]["submit_enabled"], true);
    assert_eq!(status["control"]["loading"], false);
    assert_eq!(status["transfers"], 0);
    assert!(status["latest_notification"].is_null());
}

#[tokio::test]
async fn invalid_transfer_is_bad_request() {
    let app = app(MockChain::new());
    let body = json!({ "recipient_address": "nope", "from_address": USER, "amount": "1" });

    let (status, body) = post(&app, "/api/transfer", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "invalid recipient");

    let status = get_json(&app, "/api/status").await;
    assert_eq!(status["latest_notification"]["kind"], "error");
    assert_eq!(status["latest_notification"]["message"], "invalid recipient");
}

#[tokio::test]
async fn transfer_is_recorded() {
    let app = app(MockChain::new());

    let (status, record) = post(&app, "/api/transfer", transfer_body("12.5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["amount"], "12.5");
    assert_eq!(record["to"], addr(RECIPIENT).to_string());
    assert_eq!(record["block_number"], 42);

    let transfers = get_json(&app, "/api/transfers").await;
    let transfers = transfers.as_array().unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0], record);

    let status = get_json(&app, "/api/status").await;
    assert_eq!(status["transfers"], 1);
    assert_eq!(status["latest_notification"]["kind"], "success");
}

#[tokio::test]
async fn low_allowance_is_unprocessable() {
    let app = app(MockChain::new().with_allowance(tokens(5)));

    let (status, body) = post(&app, "/api/transfer", transfer_body("6")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        "user has not approved enough USDT. allowance: 5.0 USDT"
    );

    let transfers = get_json(&app, "/api/transfers").await;
    assert!(transfers.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chain_failure_is_bad_gateway() {
    let app = app(MockChain::new().with_submit_error("insufficient funds for gas"));

    let (status, body) = post(&app, "/api/transfer", transfer_body("1")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "insufficient funds for gas");
}

#[tokio::test]
async fn balance_report() {
    let app = app(MockChain::new());

    let (status, report) = post(&app, "/api/balance", json!({ "from_address": USER })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["balance"], "1000.0");
    assert_eq!(report["balance_display"], "1000.00");
    assert_eq!(report["allowance_display"], "500.00");
    assert_eq!(report["symbol"], "USDT");

    let (status, body) = post(&app, "/api/balance", json!({ "from_address": "0x12" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid wallet");
}

#[tokio::test]
async fn cross_origin_preflight_is_not_allowed() {
    let (app, chain) = app_with_chain(MockChain::new());

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/transfer")
        .header(header::ORIGIN, "https://other-site.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();

    assert!(!response.status().is_success());
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .is_none());
    assert_eq!(chain.calls.total(), 0);
}

#[tokio::test]
async fn cross_origin_simple_post_never_transfers() {
    let (app, chain) = app_with_chain(MockChain::new());

    // a plain form post needs no preflight in a browser
    let request = Request::post("/api/transfer")
        .header(header::ORIGIN, "https://other-site.example")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(transfer_body("1").to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    assert_eq!(chain.calls.total(), 0);
}
