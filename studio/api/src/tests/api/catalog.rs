use reqwest::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use super::utils::{names, TestServer};
use crate::database::{NewUser, UserRole};

#[tokio::test]
async fn test_nashville_scenario() {
	let server = TestServer::start().await;
	crate::seed::ensure_admin(
		server.database(),
		&crate::config::BootstrapAdminConfig {
			username: "admin".to_string(),
			password: "admin123".to_string(),
			email: None,
		},
	)
	.await
	.unwrap();

	let admin = server.login("admin", "admin123").await;

	let (status, viewer) = server
		.request(
			Method::POST,
			"/api/admin/users",
			Some(admin.as_str()),
			Some(json!({ "username": "viewer", "password": "viewer123", "role": "viewer" })),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, studio) = server
		.request(
			Method::POST,
			"/api/admin/studios",
			Some(admin.as_str()),
			Some(json!({ "name": "Nashville", "location": "Nashville, Tennessee" })),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, _) = server
		.request(
			Method::POST,
			"/api/admin/streams",
			Some(admin.as_str()),
			Some(json!({
				"studioId": studio["id"],
				"name": "Nashville Main Camera",
				"streamUrl": "webrtc://stream.obtv.com/live/nashville_main",
			})),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);

	let viewer_token = server.login("viewer", "viewer123").await;

	let (status, body) = server.get("/api/studios", Some(viewer_token.as_str())).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!([]));

	let (status, _) = server
		.request(
			Method::POST,
			"/api/admin/permissions",
			Some(admin.as_str()),
			Some(json!({ "userId": viewer["id"], "studioId": studio["id"], "canView": true })),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, body) = server.get("/api/studios", Some(viewer_token.as_str())).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(names(&body), vec!["Nashville"]);
	assert_eq!(names(&body[0]["streams"]), vec!["Nashville Main Camera"]);
	assert_eq!(body[0]["streams"][0]["resolution"], "1080p");
	assert_eq!(body[0]["streams"][0]["fps"], 30);

	server.shutdown().await;
}

#[tokio::test]
async fn test_studio_listing_is_filtered_and_sorted() {
	let server = TestServer::seeded().await;

	let admin = server.login("admin", "admin123").await;
	let (_, body) = server.get("/api/studios", Some(admin.as_str())).await;
	assert_eq!(names(&body), vec!["Irving", "Nashville", "Plex", "SoCal"]);
	assert_eq!(
		names(&body[0]["streams"]),
		vec!["Irving Close Up", "Irving Main Camera", "Irving Overhead", "Irving Wide Shot"]
	);

	let operator = server.login("operator", "operator123").await;
	let (_, body) = server.get("/api/studios", Some(operator.as_str())).await;
	assert_eq!(names(&body), vec!["Plex", "SoCal"]);

	let viewer = server.login("viewer", "viewer123").await;
	let (_, body) = server.get("/api/studios", Some(viewer.as_str())).await;
	assert_eq!(names(&body), vec!["SoCal"]);

	server.shutdown().await;
}

#[tokio::test]
async fn test_studio_access() {
	let server = TestServer::seeded().await;
	let db = server.database();
	let socal = db.studio_by_name("SoCal").await.unwrap().unwrap();
	let irving = db.studio_by_name("Irving").await.unwrap().unwrap();

	let viewer = server.login("viewer", "viewer123").await;

	let (status, body) = server.get(&format!("/api/studios/{}", socal.id), Some(viewer.as_str())).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["streams"].as_array().unwrap().len(), 4);

	let (status, body) = server.get(&format!("/api/studios/{}", irving.id), Some(viewer.as_str())).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "No access to this studio");

	// Unknown and ungranted look the same to a non-admin.
	let (status, _) = server
		.get(&format!("/api/studios/{}", Uuid::new_v4()), Some(viewer.as_str()))
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let admin = server.login("admin", "admin123").await;
	let (status, _) = server.get(&format!("/api/studios/{}", Uuid::new_v4()), Some(admin.as_str())).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, _) = server.get("/api/studios/not-a-uuid", Some(admin.as_str())).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	server.shutdown().await;
}

#[tokio::test]
async fn test_stream_access() {
	let server = TestServer::seeded().await;
	let db = server.database();
	let socal = db.studio_by_name("SoCal").await.unwrap().unwrap();
	let irving = db.studio_by_name("Irving").await.unwrap().unwrap();
	let socal_stream = db.streams_by_studios(&[socal.id], true).await.unwrap().remove(0);
	let irving_stream = db.streams_by_studios(&[irving.id], true).await.unwrap().remove(0);

	let viewer = server.login("viewer", "viewer123").await;

	let (status, body) = server
		.get(&format!("/api/streams/{}", socal_stream.id), Some(viewer.as_str()))
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["streamUrl"], socal_stream.stream_url.as_str());

	let (status, body) = server
		.get(&format!("/api/streams/{}", irving_stream.id), Some(viewer.as_str()))
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "No access to this stream");

	let (status, _) = server
		.get(&format!("/api/streams/{}", Uuid::new_v4()), Some(viewer.as_str()))
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	server.shutdown().await;
}

#[tokio::test]
async fn test_stream_status_control() {
	let server = TestServer::seeded().await;
	let db = server.database();
	let socal = db.studio_by_name("SoCal").await.unwrap().unwrap();
	let irving = db.studio_by_name("Irving").await.unwrap().unwrap();
	let socal_stream = db.streams_by_studios(&[socal.id], true).await.unwrap().remove(0);
	let irving_stream = db.streams_by_studios(&[irving.id], true).await.unwrap().remove(0);

	let set_status = |token: String, id: Uuid, status: &'static str| {
		let server = &server;
		async move {
			server
				.request(
					Method::PATCH,
					&format!("/api/streams/{id}/status"),
					Some(token.as_str()),
					Some(json!({ "status": status })),
				)
				.await
		}
	};

	// View without control.
	let viewer = server.login("viewer", "viewer123").await;
	let (status, body) = set_status(viewer.clone(), socal_stream.id, "error").await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "No control access to this stream");

	// Control on its own studios only.
	let operator = server.login("operator", "operator123").await;
	let (status, body) = set_status(operator.clone(), socal_stream.id, "error").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["stream"]["status"], "error");

	// Any status may follow any other, repeating one is fine.
	for next in ["offline", "online", "online", "error", "offline"] {
		let (status, body) = set_status(operator.clone(), socal_stream.id, next).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["stream"]["status"], next);
	}

	let (status, _) = set_status(operator.clone(), irving_stream.id, "online").await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, _) = set_status(operator.clone(), socal_stream.id, "paused").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	// Admins need no grant.
	let admin = server.login("admin", "admin123").await;
	let (status, _) = set_status(admin, irving_stream.id, "error").await;
	assert_eq!(status, StatusCode::OK);

	server.shutdown().await;
}

#[tokio::test]
async fn test_control_requires_view() {
	let server = TestServer::seeded().await;
	let db = server.database();
	let irving = db.studio_by_name("Irving").await.unwrap().unwrap();
	let stream = db.streams_by_studios(&[irving.id], true).await.unwrap().remove(0);

	let user = db
		.create_user(NewUser {
			username: "odd".to_string(),
			email: None,
			password_hash: crate::database::User::hash_password("odd-password").unwrap(),
			first_name: None,
			last_name: None,
			role: UserRole::Operator,
			is_active: true,
		})
		.await
		.unwrap();

	db.upsert_permission(crate::database::NewPermission {
		user_id: user.id,
		studio_id: irving.id,
		can_view: false,
		can_control: true,
	})
	.await
	.unwrap();

	let token = server.login("odd", "odd-password").await;
	let (status, _) = server
		.request(
			Method::PATCH,
			&format!("/api/streams/{}/status", stream.id),
			Some(token.as_str()),
			Some(json!({ "status": "error" })),
		)
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	server.shutdown().await;
}

#[tokio::test]
async fn test_soft_deleted_content_is_hidden() {
	let server = TestServer::seeded().await;
	let db = server.database();
	let socal = db.studio_by_name("SoCal").await.unwrap().unwrap();
	let stream = db
		.streams_by_studios(&[socal.id], true)
		.await
		.unwrap()
		.into_iter()
		.find(|s| s.name == "SoCal Overhead")
		.unwrap();

	let admin = server.login("admin", "admin123").await;
	let viewer = server.login("viewer", "viewer123").await;

	let (status, _) = server
		.request(
			Method::DELETE,
			&format!("/api/admin/streams/{}", stream.id),
			Some(admin.as_str()),
			None,
		)
		.await;
	assert_eq!(status, StatusCode::OK);

	let (_, body) = server.get("/api/studios", Some(viewer.as_str())).await;
	assert_eq!(
		names(&body[0]["streams"]),
		vec!["SoCal Close Up", "SoCal Main Camera", "SoCal Wide Shot"]
	);

	let (status, _) = server
		.get(&format!("/api/streams/{}", stream.id), Some(viewer.as_str()))
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	// Still there for admin CRUD.
	let (status, body) = server
		.get(&format!("/api/admin/streams/{}", stream.id), Some(admin.as_str()))
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["isActive"], false);

	let (status, _) = server
		.request(
			Method::DELETE,
			&format!("/api/admin/studios/{}", socal.id),
			Some(admin.as_str()),
			None,
		)
		.await;
	assert_eq!(status, StatusCode::OK);

	let (_, body) = server.get("/api/studios", Some(viewer.as_str())).await;
	assert_eq!(body, json!([]));

	let (status, _) = server.get(&format!("/api/studios/{}", socal.id), Some(viewer.as_str())).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (_, body) = server.get("/api/studios", Some(admin.as_str())).await;
	assert!(!names(&body).contains(&"SoCal".to_string()));

	let (_, body) = server.get("/api/admin/studios-with-streams", Some(admin.as_str())).await;
	let socal_json = body
		.as_array()
		.unwrap()
		.iter()
		.find(|s| s["name"] == "SoCal")
		.unwrap();
	assert_eq!(socal_json["isActive"], false);
	assert_eq!(socal_json["streams"].as_array().unwrap().len(), 4);

	server.shutdown().await;
}
