//! Capture pipeline tests driven through the router with `oneshot`.

use attack_log_server::config::{AppConfig, ServerMode};
use attack_log_server::http::X_REQUEST_ID;
use axum::http::StatusCode;
use tower::ServiceExt; // .oneshot()

mod common;
use common::{app, body_json, body_text, form_post, get_req, json_post};

#[tokio::test]
async fn sql_injection_body_lands_in_both_logs() {
    let (router, state) = app(&AppConfig::default());

    let resp = router
        .oneshot(form_post("/login", "username=' OR '1'='1&password=x"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let requests = state.logs.requests().snapshot();
    let attacks = state.logs.attacks().snapshot();
    assert_eq!(requests.len(), 1);
    assert_eq!(attacks.len(), 1);
    assert_eq!(requests[0].id, attacks[0].id);
    assert!(attacks[0].is_attack);
    assert_eq!(attacks[0].attack_labels(), "SQL Injection");
    assert_eq!(attacks[0].body, "username=' OR '1'='1&password=x");
    assert_eq!(attacks[0].remote_addr, "unknown");
}

#[tokio::test]
async fn clean_request_only_in_request_log() {
    let (router, state) = app(&AppConfig::default());

    router.clone().oneshot(get_req("/?page=home")).await.unwrap();
    let resp = router.oneshot(get_req("/api/status")).await.unwrap();
    let status = body_json(resp).await;

    assert_eq!(status["status"], "online");
    assert_eq!(status["captured_total"], 2);
    assert_eq!(status["request_log_len"], 2);
    assert_eq!(status["attack_log_len"], 0);
    assert!(state.logs.attacks().is_empty());
    assert_eq!(state.logs.requests().snapshot()[0].query, "page=home");
}

#[tokio::test]
async fn attack_in_query_string_is_flagged() {
    let (router, state) = app(&AppConfig::default());

    router
        .oneshot(get_req("/comments?id=1%20UNION%20SELECT%20password"))
        .await
        .unwrap();

    let attacks = state.logs.attacks().snapshot();
    assert_eq!(attacks.len(), 1);
    assert_eq!(attacks[0].path, "/comments");
}

#[tokio::test]
async fn unknown_routes_are_still_captured() {
    let (router, state) = app(&AppConfig::default());

    let resp = router.oneshot(get_req("/wp-admin/../etc;passwd")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.logs.requests().len(), 1);
    assert_eq!(state.logs.attacks().len(), 0);
}

#[tokio::test]
async fn request_log_evicts_oldest() {
    let mut config = AppConfig::default();
    config.logs.request_capacity = 3;
    let (router, state) = app(&config);

    for i in 0..5 {
        router.clone().oneshot(get_req(&format!("/?n={i}"))).await.unwrap();
    }
    let queries: Vec<String> = state
        .logs
        .requests()
        .snapshot()
        .iter()
        .map(|r| r.query.clone())
        .collect();
    assert_eq!(queries, vec!["n=2", "n=3", "n=4"]);

    // The listing request is itself captured before it is answered.
    let logs = body_json(router.oneshot(get_req("/api/logs")).await.unwrap()).await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0]["path"], "/api/logs");
    assert_eq!(logs[1]["query"], "n=4");
}

#[tokio::test]
async fn records_carry_request_id() {
    let (router, state) = app(&AppConfig::default());

    let resp = router.oneshot(get_req("/")).await.unwrap();
    let request_id = resp
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();

    let record = &state.logs.requests().snapshot()[0];
    assert_eq!(record.headers.get(X_REQUEST_ID), Some(&request_id));
}

#[tokio::test]
async fn dashboards_render_in_dev() {
    let (router, _state) = app(&AppConfig::default());

    router
        .clone()
        .oneshot(form_post("/comments", "comment=DROP TABLE comments"))
        .await
        .unwrap();

    let logs = body_text(router.clone().oneshot(get_req("/logs")).await.unwrap()).await;
    assert!(logs.contains("Request log"));
    assert!(logs.contains("/comments"));

    let attacks = body_text(router.oneshot(get_req("/attack-logs")).await.unwrap()).await;
    assert!(attacks.contains("SQL Injection"));
    assert!(attacks.contains("curl -X POST"));
}

#[tokio::test]
async fn prod_mode_hides_dashboards_but_still_captures() {
    let config = AppConfig {
        mode: ServerMode::Prod,
        ..AppConfig::default()
    };
    let (router, state) = app(&config);

    for path in ["/logs", "/attack-logs", "/api/logs", "/api/attack-logs"] {
        let resp = router.clone().oneshot(get_req(path)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path} should be hidden");
    }
    assert_eq!(state.logs.requests().len(), 4);
}

#[tokio::test]
async fn login_simulates_sql_and_debug_info() {
    let (router, _) = app(&AppConfig::default());
    let resp = router
        .oneshot(form_post("/login", "username=admin'--&password=pw"))
        .await
        .unwrap();
    let json = body_json(resp).await;

    assert_eq!(json["status"], "success");
    assert_eq!(
        json["query"],
        "SELECT * FROM users WHERE username='admin'--' AND password='pw'"
    );
    assert_eq!(json["debug_info"]["username_length"], 8);
    assert_eq!(json["debug_info"]["has_special_chars"], true);

    let config = AppConfig {
        mode: ServerMode::Prod,
        ..AppConfig::default()
    };
    let (router, _) = app(&config);
    let json = body_json(
        router
            .oneshot(form_post("/login", "username=alice&password=pw"))
            .await
            .unwrap(),
    )
    .await;
    assert!(json.get("debug_info").is_none());
}

#[tokio::test]
async fn comments_echo_unescaped() {
    let (router, _) = app(&AppConfig::default());
    let resp = router
        .oneshot(form_post("/comments", "comment=%3Cscript%3Ealert(1)%3C%2Fscript%3E"))
        .await
        .unwrap();
    assert_eq!(
        body_text(resp).await,
        "<p>Comment added: <script>alert(1)</script></p>"
    );
}

#[tokio::test]
async fn log_receiver_acknowledges() {
    let (router, state) = app(&AppConfig::default());
    let resp = router
        .oneshot(json_post("/api/login", serde_json::json!({"source": "edge", "path": "/x"})))
        .await
        .unwrap();

    let json = body_json(resp).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Log received and printed");
    assert_eq!(state.logs.requests().len(), 1);
}

#[tokio::test]
async fn oversized_body_without_length_is_rejected_but_captured() {
    let mut config = AppConfig::default();
    config.listener.max_body_size = 64;
    let (router, state) = app(&config);

    // No Content-Length header, so the limit is only hit while reading.
    let request = axum::http::Request::builder()
        .method(axum::http::Method::POST)
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("x".repeat(220)))
        .unwrap();
    assert!(request.headers().get("content-length").is_none());

    let resp = router.oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "request body exceeds 64 bytes");

    let requests = state.logs.requests().snapshot();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/login");
    assert_eq!(requests[0].body, "");
}

#[tokio::test]
async fn oversized_body_with_length_is_rejected() {
    let mut config = AppConfig::default();
    config.listener.max_body_size = 64;
    let (router, _) = app(&config);

    let resp = router
        .oneshot(
            axum::http::Request::builder()
                .method(axum::http::Method::POST)
                .uri("/api/log")
                .header("content-length", "220")
                .body(axum::body::Body::from("x".repeat(220)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn body_at_limit_reaches_handler() {
    let mut config = AppConfig::default();
    config.listener.max_body_size = 64;
    let (router, state) = app(&config);

    let body = format!("{{\"pad\":\"{}\"}}", "a".repeat(54));
    assert_eq!(body.len(), 64);
    let resp = router
        .oneshot(
            axum::http::Request::builder()
                .method(axum::http::Method::POST)
                .uri("/api/login")
                .body(axum::body::Body::from(body.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(state.logs.requests().snapshot()[0].body, body);
}
