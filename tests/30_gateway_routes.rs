mod common;

use anyhow::Result;
use autobank_gateway::server::{app, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use common::{gateway_config, MockDownstream, MockReply, RecordedCall};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

fn car_payload() -> Value {
    json!({
        "make": "Toyota",
        "model": "Corolla",
        "year": 2021,
        "price": 18500.0,
        "mileage": 12000,
        "description": "clean",
        "color": "white",
        "fuel_type": "petrol",
        "transmission": "automatic",
        "image": ""
    })
}

async fn banking_and_cars() -> Result<MockDownstream> {
    MockDownstream::start(|call: &RecordedCall| match (call.method.as_str(), call.path()) {
        ("GET", "/api/v1/customers") => MockReply::json(200, json!([{ "fullName": "Dara Sok" }])),
        ("GET", "/api/v1/missing") => MockReply::json(404, json!({ "message": "Not here" })),
        ("POST", "/car/cars") => MockReply::json(422, json!({ "message": "year is required", "detail": [] })),
        ("PUT", "/car/cars/c-1") => MockReply::text(500, "internal"),
        ("POST", "/identity/refresh") => MockReply::json(200, json!({ "accessToken": "T2", "refreshToken": "R2" })),
        ("POST", "/identity/logout") => MockReply::json(200, json!({})),
        _ => MockReply::json(200, json!({ "ok": true })),
    })
    .await
}

fn set_cookies(res: &reqwest::Response) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn health_responds_without_a_session() -> Result<()> {
    let mock = banking_and_cars().await?;
    let router = app(AppState::from_config(gateway_config(&mock))?);

    let res = router
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await?)?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_the_gateway() -> Result<()> {
    let mock = banking_and_cars().await?;
    let router = app(AppState::from_config(gateway_config(&mock))?);

    let res = router
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await?)?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["endpoints"]["proxy"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_404() -> Result<()> {
    let mock = banking_and_cars().await?;
    let router = app(AppState::from_config(gateway_config(&mock))?);

    let res = router
        .oneshot(Request::builder().uri("/nope").body(Body::empty())?)
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn proxy_without_credential_is_401_and_never_reaches_downstream() -> Result<()> {
    let mock = banking_and_cars().await?;
    let router = app(AppState::from_config(gateway_config(&mock))?);

    let res = router
        .oneshot(Request::builder().uri("/api/proxy/customers").body(Body::empty())?)
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await?)?;
    assert_eq!(body["message"], "Unauthorized");
    assert!(mock.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn proxy_forwards_bearer_path_and_query() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;

    let res = reqwest::Client::new()
        .get(format!("{}/api/proxy/customers?segment=REGULAR", gateway))
        .bearer_auth("T1")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body[0]["fullName"], "Dara Sok");

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path_and_query, "/api/v1/customers?segment=REGULAR");
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer T1"));
    Ok(())
}

#[tokio::test]
async fn proxy_reads_credential_from_cookie() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/proxy/customers", gateway))
        .header(header::COOKIE, "accessToken=C1")
        .json(&json!({ "fullName": "Dara Sok" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let calls = mock.calls();
    assert_eq!(calls[0].method, Method::POST);
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer C1"));
    assert_eq!(calls[0].body, r#"{"fullName":"Dara Sok"}"#);
    Ok(())
}

#[tokio::test]
async fn proxy_passes_downstream_errors_through() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;

    let res = reqwest::Client::new()
        .get(format!("{}/api/proxy/missing", gateway))
        .bearer_auth("T1")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({ "message": "Not here" }));
    Ok(())
}

#[tokio::test]
async fn crud_errors_are_reduced_to_the_downstream_message() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/crud/create", gateway))
        .bearer_auth("T1")
        .json(&car_payload())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json::<Value>().await?, json!({ "message": "year is required" }));

    let mut update = car_payload();
    update["is_sold"] = json!(true);
    let res = client
        .put(format!("{}/api/crud/update-car/c-1", gateway))
        .bearer_auth("T1")
        .json(&update)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await?, json!({ "message": "Failed to update" }));

    let calls = mock.calls();
    assert_eq!(calls[0].path(), "/car/cars");
    assert_eq!(calls[1].path(), "/car/cars/c-1");
    let sent: Value = serde_json::from_str(&calls[1].body)?;
    assert_eq!(sent["is_sold"], true);
    assert_eq!(sent["make"], "Toyota");
    Ok(())
}

#[tokio::test]
async fn crud_rejects_malformed_payloads() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/crud/create", gateway))
        .bearer_auth("T1")
        .json(&json!({ "make": "Toyota" }))
        .send()
        .await?;

    assert!(res.status().is_client_error());
    assert!(mock.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn refresh_without_refresh_token_is_401() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/refresh", gateway))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(mock.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn refresh_sets_new_session_cookies() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/refresh", gateway))
        .header(header::COOKIE, "refreshToken=R1")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let cookies = set_cookies(&res);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=T2")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=R2")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));

    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "accessToken": "T2", "refreshToken": "R2" }));

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(serde_json::from_str::<Value>(&calls[0].body)?, json!({ "refreshToken": "R1" }));
    Ok(())
}

#[tokio::test]
async fn refresh_passes_caller_cookies_to_identity_provider() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/refresh", gateway))
        .header(header::COOKIE, "refreshToken=R1; device=d-7")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path(), "/identity/refresh");
    let cookie = calls[0].cookie.as_deref().unwrap_or_default();
    assert!(cookie.contains("refreshToken=R1"));
    assert!(cookie.contains("device=d-7"));
    Ok(())
}

#[tokio::test]
async fn refresh_accepts_token_in_body() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/refresh", gateway))
        .json(&json!({ "refreshToken": "R1" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["accessToken"], "T2");
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_cookies() -> Result<()> {
    let mock = banking_and_cars().await?;
    let gateway = common::spawn_gateway(gateway_config(&mock)).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/logout", gateway))
        .header(header::COOKIE, "accessToken=T1; refreshToken=R1")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let cookies = set_cookies(&res);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=;") && c.contains("Max-Age=0")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=;") && c.contains("Max-Age=0")));
    assert_eq!(res.json::<Value>().await?, json!({ "message": "Logged out" }));

    assert_eq!(mock.calls_to("/identity/logout"), 1);
    Ok(())
}
