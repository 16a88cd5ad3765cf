use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::context::Handler;
use common::prelude::FutureTimeout;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::config::ApiConfig;
use crate::database::{Database, MemoryDatabase};
use crate::seed::seed_demo;
use crate::tests::global::{mock_global_state, GlobalState};

pub struct TestServer {
	pub global: Arc<GlobalState>,
	pub db: Arc<MemoryDatabase>,
	pub client: reqwest::Client,
	handler: Handler,
	url: String,
	server: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
	/// Starts the api on a free port over a fresh in-memory database.
	pub async fn start() -> Self {
		let port = portpicker::pick_unused_port().expect("failed to pick port");
		let bind_address: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();

		let db = Arc::new(MemoryDatabase::new());
		let (global, handler) = mock_global_state(
			ApiConfig {
				bind_address,
				tls: None,
			},
			db.clone(),
		)
		.await;

		let server = tokio::spawn(crate::api::run(global.clone()));

		// Wait for the listener.
		let url = format!("http://{bind_address}");
		let client = reqwest::Client::new();
		for _ in 0..50 {
			if client.get(format!("{url}/api/health")).send().await.is_ok() {
				break;
			}
			tokio::time::sleep(Duration::from_millis(20)).await;
		}

		Self {
			global,
			db,
			client,
			handler,
			url,
			server,
		}
	}

	/// Starts the api with the demo data loaded.
	pub async fn seeded() -> Self {
		let server = Self::start().await;
		seed_demo(server.db.as_ref()).await.expect("failed to seed");
		server
	}

	pub fn database(&self) -> &dyn Database {
		self.db.as_ref()
	}

	pub async fn request(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
		let mut req = self.client.request(method, format!("{}{path}", self.url));

		if let Some(token) = token {
			req = req.bearer_auth(token);
		}

		if let Some(body) = body {
			req = req.json(&body);
		}

		let resp = req.send().await.expect("request failed");
		let status = resp.status();
		let text = resp.text().await.expect("failed to read body");
		let body = if text.is_empty() {
			Value::Null
		} else {
			serde_json::from_str(&text).expect("response is not json")
		};

		(status, body)
	}

	pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
		self.request(Method::GET, path, token, None).await
	}

	pub async fn login(&self, username: &str, password: &str) -> String {
		let (status, body) = self
			.request(
				Method::POST,
				"/api/auth/login",
				None,
				Some(serde_json::json!({ "username": username, "password": password })),
			)
			.await;

		assert_eq!(status, StatusCode::OK, "login failed: {body}");
		body["token"].as_str().expect("no token").to_string()
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	/// Cancels the global context and checks the server stops promptly.
	pub async fn shutdown(self) {
		let Self {
			global,
			db,
			client,
			handler,
			server,
			..
		} = self;

		drop(client);
		drop(db);
		drop(global);

		handler
			.cancel()
			.timeout(Duration::from_secs(2))
			.await
			.expect("failed to cancel context");

		server
			.timeout(Duration::from_secs(2))
			.await
			.expect("server did not stop")
			.expect("server panicked")
			.expect("server failed");
	}
}

pub fn names(value: &Value) -> Vec<String> {
	value
		.as_array()
		.expect("expected an array")
		.iter()
		.map(|v| v["name"].as_str().unwrap_or_default().to_string())
		.collect()
}
