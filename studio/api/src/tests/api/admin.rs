use reqwest::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use super::utils::{names, TestServer};

#[tokio::test]
async fn test_admin_only() {
	let server = TestServer::seeded().await;
	let operator = server.login("operator", "operator123").await;

	for path in ["/api/admin/users", "/api/admin/studios", "/api/admin/streams", "/api/admin/studios-with-streams"] {
		let (status, body) = server.get(path, Some(operator.as_str())).await;
		assert_eq!(status, StatusCode::FORBIDDEN, "{path}");
		assert_eq!(body["success"], false);

		let (status, _) = server.get(path, None).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
	}

	let (status, _) = server
		.request(
			Method::POST,
			"/api/admin/permissions",
			Some(operator.as_str()),
			Some(json!({ "userId": Uuid::new_v4(), "studioId": Uuid::new_v4() })),
		)
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	server.shutdown().await;
}

#[tokio::test]
async fn test_user_crud() {
	let server = TestServer::seeded().await;
	let admin = server.login("admin", "admin123").await;
	let admin_id = server.database().user_by_username("admin").await.unwrap().unwrap().id;

	let create = |body: serde_json::Value| server.request(Method::POST, "/api/admin/users", Some(admin.as_str()), Some(body));

	let (status, user) = create(json!({
		"username": "director",
		"password": "director-password",
		"email": "director@example.com",
		"firstName": "Dee",
		"role": "operator",
	}))
	.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(user["role"], "operator");
	assert_eq!(user["isActive"], true);
	assert!(user.get("passwordHash").is_none());
	assert!(user.get("password").is_none());

	let (status, body) = create(json!({ "username": "director", "password": "another-password" })).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["message"], "Username or email already exists");

	let (status, _) = create(json!({
		"username": "someone",
		"password": "another-password",
		"email": "director@example.com",
	}))
	.await;
	assert_eq!(status, StatusCode::CONFLICT);

	let (status, _) = create(json!({ "username": "x", "password": "long-enough" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = create(json!({ "username": "badmail", "password": "long-enough", "email": "nope" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let id = user["id"].as_str().unwrap().to_string();

	let (status, updated) = server
		.request(
			Method::PATCH,
			&format!("/api/admin/users/{id}"),
			Some(admin.as_str()),
			Some(json!({ "password": "rotated-password", "email": null, "lastName": "Director" })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(updated["email"], serde_json::Value::Null);
	assert_eq!(updated["firstName"], "Dee");
	assert_eq!(updated["lastName"], "Director");

	server.login("director", "rotated-password").await;

	let (status, _) = server
		.request(
			Method::PATCH,
			&format!("/api/admin/users/{id}"),
			Some(admin.as_str()),
			Some(json!({ "username": "viewer" })),
		)
		.await;
	assert_eq!(status, StatusCode::CONFLICT);

	let (status, _) = server
		.request(Method::DELETE, &format!("/api/admin/users/{id}"), Some(admin.as_str()), None)
		.await;
	assert_eq!(status, StatusCode::OK);

	// Soft deleted: still readable by admins, unable to log in.
	let (status, body) = server.get(&format!("/api/admin/users/{id}"), Some(admin.as_str())).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["isActive"], false);

	let (status, _) = server
		.request(
			Method::POST,
			"/api/auth/login",
			None,
			Some(json!({ "username": "director", "password": "rotated-password" })),
		)
		.await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let (status, _) = server
		.request(Method::DELETE, &format!("/api/admin/users/{admin_id}"), Some(admin.as_str()), None)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = server
		.get(&format!("/api/admin/users/{}", Uuid::new_v4()), Some(admin.as_str()))
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (_, body) = server.get("/api/admin/users", Some(admin.as_str())).await;
	let usernames = body
		.as_array()
		.unwrap()
		.iter()
		.map(|u| u["username"].as_str().unwrap())
		.collect::<Vec<_>>();
	assert_eq!(usernames, vec!["admin", "director", "operator", "viewer"]);

	server.shutdown().await;
}

#[tokio::test]
async fn test_studio_crud() {
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

	let (status, studio) = server
		.request(
			Method::POST,
			"/api/admin/studios",
			Some(admin.as_str()),
			Some(json!({ "name": "Austin" })),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(studio["primaryColor"], "#4A5568");
	assert_eq!(studio["colorCode"], serde_json::Value::Null);

	let (status, _) = server
		.request(
			Method::POST,
			"/api/admin/studios",
			Some(admin.as_str()),
			Some(json!({ "name": "Bad", "colorCode": "red" })),
		)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = server
		.request(Method::POST, "/api/admin/studios", Some(admin.as_str()), Some(json!({ "name": "  " })))
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let id = studio["id"].as_str().unwrap().to_string();
	let (status, updated) = server
		.request(
			Method::PATCH,
			&format!("/api/admin/studios/{id}"),
			Some(admin.as_str()),
			Some(json!({ "primaryColor": "#112233", "description": "Live music" })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(updated["colorCode"], "#112233");
	assert_eq!(updated["primaryColor"], "#112233");
	assert_eq!(updated["name"], "Austin");

	let (status, body) = server.get(&format!("/api/admin/studios/{id}"), Some(admin.as_str())).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["description"], "Live music");
	assert_eq!(body["streams"], json!([]));

	let (_, body) = server.get("/api/admin/studios", Some(admin.as_str())).await;
	assert_eq!(names(&body), vec!["Austin"]);

	let (status, _) = server
		.request(
			Method::DELETE,
			&format!("/api/admin/studios/{}", Uuid::new_v4()),
			Some(admin.as_str()),
			None,
		)
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	server.shutdown().await;
}

#[tokio::test]
async fn test_stream_crud() {
	let server = TestServer::seeded().await;
	let admin = server.login("admin", "admin123").await;
	let plex = server.database().studio_by_name("Plex").await.unwrap().unwrap();
	let irving = server.database().studio_by_name("Irving").await.unwrap().unwrap();

	let (status, body) = server
		.request(
			Method::POST,
			"/api/admin/streams",
			Some(admin.as_str()),
			Some(json!({ "studioId": Uuid::new_v4(), "name": "Ghost", "streamUrl": "webrtc://x/ghost" })),
		)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["message"], "Studio does not exist");

	let (status, _) = server
		.request(
			Method::POST,
			"/api/admin/streams",
			Some(admin.as_str()),
			Some(json!({ "studioId": plex.id, "name": "Drone", "streamUrl": "webrtc://x/drone", "fps": 500 })),
		)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, stream) = server
		.request(
			Method::POST,
			"/api/admin/streams",
			Some(admin.as_str()),
			Some(json!({ "studioId": plex.id, "name": "Plex Drone", "streamUrl": "webrtc://x/drone", "fps": 60 })),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(stream["status"], "offline");
	assert_eq!(stream["fps"], 60);

	let id = stream["id"].as_str().unwrap().to_string();
	let (status, moved) = server
		.request(
			Method::PATCH,
			&format!("/api/admin/streams/{id}"),
			Some(admin.as_str()),
			Some(json!({ "studioId": irving.id, "resolution": "4K" })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(moved["studioId"], irving.id.to_string());
	assert_eq!(moved["resolution"], "4K");

	let (status, _) = server
		.request(
			Method::PATCH,
			&format!("/api/admin/streams/{id}"),
			Some(admin.as_str()),
			Some(json!({ "studioId": Uuid::new_v4() })),
		)
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	for blank in ["", "   "] {
		let (status, _) = server
			.request(
				Method::PATCH,
				&format!("/api/admin/streams/{id}"),
				Some(admin.as_str()),
				Some(json!({ "resolution": blank })),
			)
			.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	let (status, unchanged) = server.get(&format!("/api/admin/streams/{id}"), Some(admin.as_str())).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(unchanged["resolution"], "4K");

	let (_, body) = server.get("/api/admin/streams", Some(admin.as_str())).await;
	assert_eq!(body.as_array().unwrap().len(), 17);

	server.shutdown().await;
}

#[tokio::test]
async fn test_permission_upsert_and_revoke() {
	let server = TestServer::seeded().await;
	let admin = server.login("admin", "admin123").await;
	let db = server.database();
	let viewer = db.user_by_username("viewer").await.unwrap().unwrap();
	let irving = db.studio_by_name("Irving").await.unwrap().unwrap();

	let grant = |body: serde_json::Value| server.request(Method::POST, "/api/admin/permissions", Some(admin.as_str()), Some(body));

	let (status, first) = grant(json!({ "userId": viewer.id, "studioId": irving.id })).await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(first["canView"], true);
	assert_eq!(first["canControl"], false);

	let (status, second) = grant(json!({ "userId": viewer.id, "studioId": irving.id, "canControl": true })).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(second["id"], first["id"]);
	assert_eq!(second["canControl"], true);

	let rows = db.permissions_by_user(viewer.id).await.unwrap();
	assert_eq!(rows.iter().filter(|p| p.studio_id == irving.id).count(), 1);

	let (status, _) = grant(json!({ "userId": Uuid::new_v4(), "studioId": irving.id })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = grant(json!({ "userId": viewer.id })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (_, body) = server
		.get(&format!("/api/admin/users/{}/permissions", viewer.id), Some(admin.as_str()))
		.await;
	assert_eq!(body.as_array().unwrap().len(), 2);

	let revoke = format!("/api/admin/permissions/{}/{}", viewer.id, irving.id);
	let (status, _) = server.request(Method::DELETE, &revoke, Some(admin.as_str()), None).await;
	assert_eq!(status, StatusCode::OK);
	assert!(db.permission(viewer.id, irving.id).await.unwrap().is_none());

	// Revoking again is not an error.
	let (status, _) = server.request(Method::DELETE, &revoke, Some(admin.as_str()), None).await;
	assert_eq!(status, StatusCode::OK);

	server.shutdown().await;
}
