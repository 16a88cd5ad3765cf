use reqwest::{Method, StatusCode};
use serde_json::json;

use super::utils::TestServer;
use crate::api::ext::MAX_BODY_SIZE;

#[tokio::test]
async fn test_health() {
	let server = TestServer::start().await;

	let (status, body) = server.get("/api/health", None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], "OK");
	assert!(body["uptime"].as_f64().unwrap() >= 0.0);
	assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());

	server.shutdown().await;
}

#[tokio::test]
async fn test_preflight_and_cors() {
	let server = TestServer::start().await;

	let resp = server
		.client
		.request(Method::OPTIONS, format!("{}/api/studios", server.url()))
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), StatusCode::NO_CONTENT);
	assert_eq!(resp.headers()["access-control-allow-origin"], "*");
	assert!(resp.headers()["access-control-allow-methods"]
		.to_str()
		.unwrap()
		.contains("PATCH"));

	let resp = server
		.client
		.get(format!("{}/api/health", server.url()))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.headers()["access-control-allow-origin"], "*");

	server.shutdown().await;
}

#[tokio::test]
async fn test_unknown_route() {
	let server = TestServer::start().await;

	let (status, body) = server.get("/api/nothing-here", None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["success"], false);

	server.shutdown().await;
}

#[tokio::test]
async fn test_request_body_limits() {
	let server = TestServer::start().await;

	let resp = server
		.client
		.post(format!("{}/api/auth/login", server.url()))
		.header("content-type", "application/json")
		.body("{not json")
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

	let padding = "x".repeat(MAX_BODY_SIZE);
	let (status, _) = server
		.request(
			Method::POST,
			"/api/auth/login",
			None,
			Some(json!({ "username": padding, "password": "whatever" })),
		)
		.await;
	assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

	server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_with_open_connection() {
	let server = TestServer::seeded().await;

	// Leaves a keep-alive connection open in the client pool.
	let token = server.login("viewer", "viewer123").await;
	let (status, _) = server.get("/api/studios", Some(token.as_str())).await;
	assert_eq!(status, StatusCode::OK);

	server.shutdown().await;
}
