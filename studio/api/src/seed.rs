//! Demo data and the startup admin account.

use anyhow::Context as _;

use crate::config::BootstrapAdminConfig;
use crate::database::{
	Database, NewPermission, NewStream, NewStudio, NewUser, StreamStatus, Studio, User, UserRole,
};

struct DemoUser {
	username: &'static str,
	password: &'static str,
	email: &'static str,
	first_name: &'static str,
	last_name: &'static str,
	role: UserRole,
}

const USERS: [DemoUser; 3] = [
	DemoUser {
		username: "admin",
		password: "admin123",
		email: "admin@obtv.com",
		first_name: "Admin",
		last_name: "User",
		role: UserRole::Admin,
	},
	DemoUser {
		username: "operator",
		password: "operator123",
		email: "operator@obtv.com",
		first_name: "Studio",
		last_name: "Operator",
		role: UserRole::Operator,
	},
	DemoUser {
		username: "viewer",
		password: "viewer123",
		email: "viewer@obtv.com",
		first_name: "Content",
		last_name: "Viewer",
		role: UserRole::Viewer,
	},
];

/// (name, location, description, colour)
const STUDIOS: [(&str, &str, &str, &str); 4] = [
	("SoCal", "Southern California", "Main studio facility in Southern California", "#FEDC97"),
	("Plex", "Plexus Studios", "Secondary production facility", "#7C9885"),
	("Irving", "Irving, Texas", "Texas regional studio", "#B5B682"),
	("Nashville", "Nashville, Tennessee", "Music City production center", "#28666E"),
];

/// (name suffix, url suffix, description, resolution, fps, status)
const STREAMS: [(&str, &str, &str, &str, i32, StreamStatus); 4] = [
	("Main Camera", "main", "Primary camera feed", "1080p", 30, StreamStatus::Online),
	("Wide Shot", "wide", "Wide angle studio view", "1080p", 30, StreamStatus::Online),
	("Close Up", "close", "Close-up camera feed", "720p", 30, StreamStatus::Online),
	("Overhead", "overhead", "Overhead camera view", "720p", 24, StreamStatus::Offline),
];

/// What a seeding run created. Rows that already existed are not counted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
	pub users: usize,
	pub studios: usize,
	pub streams: usize,
}

/// Loads the demo data set. Users and studios that already exist (by
/// username or name) are reused, so running it twice changes nothing.
pub async fn seed_demo(db: &dyn Database) -> anyhow::Result<SeedReport> {
	let mut report = SeedReport::default();

	let mut users = Vec::with_capacity(USERS.len());
	for demo in &USERS {
		let (user, created) = ensure_user(
			db,
			NewUserInput {
				username: demo.username,
				password: demo.password,
				email: Some(demo.email),
				first_name: Some(demo.first_name),
				last_name: Some(demo.last_name),
				role: demo.role,
			},
		)
		.await?;

		report.users += usize::from(created);
		users.push(user);
	}

	let mut studios = Vec::with_capacity(STUDIOS.len());
	for (name, location, description, color) in STUDIOS {
		let studio = match db.studio_by_name(name).await? {
			Some(studio) => studio,
			None => {
				report.studios += 1;
				db.create_studio(NewStudio {
					name: name.to_string(),
					location: Some(location.to_string()),
					description: Some(description.to_string()),
					color_code: Some(color.to_string()),
					image_url: None,
					is_active: true,
				})
				.await
				.with_context(|| format!("failed to create studio {name}"))?
			}
		};

		report.streams += seed_streams(db, &studio).await?;
		studios.push(studio);
	}

	let [_, operator, viewer] = &users[..] else {
		anyhow::bail!("demo users missing");
	};

	for studio in studios.iter().take(2) {
		grant(db, operator, studio, true).await?;
	}

	if let Some(studio) = studios.first() {
		grant(db, viewer, studio, false).await?;
	}

	tracing::info!(
		users = report.users,
		studios = report.studios,
		streams = report.streams,
		"demo data seeded"
	);

	Ok(report)
}

async fn seed_streams(db: &dyn Database, studio: &Studio) -> anyhow::Result<usize> {
	let existing = db.streams_by_studios(&[studio.id], false).await?;
	let key = studio.name.to_lowercase();

	let mut created = 0;
	for (kind, suffix, description, resolution, fps, status) in STREAMS {
		let name = format!("{} {kind}", studio.name);
		if existing.iter().any(|s| s.name == name) {
			continue;
		}

		db.create_stream(NewStream {
			studio_id: studio.id,
			name,
			description: Some(description.to_string()),
			stream_url: format!("webrtc://stream.obtv.com/live/{key}_{suffix}"),
			resolution: resolution.to_string(),
			fps,
			status,
			is_active: true,
		})
		.await
		.with_context(|| format!("failed to create {kind} stream for {}", studio.name))?;

		created += 1;
	}

	Ok(created)
}

async fn grant(db: &dyn Database, user: &User, studio: &Studio, can_control: bool) -> anyhow::Result<()> {
	db.upsert_permission(NewPermission {
		user_id: user.id,
		studio_id: studio.id,
		can_view: true,
		can_control,
	})
	.await
	.with_context(|| format!("failed to grant {} access to {}", user.username, studio.name))?;

	Ok(())
}

struct NewUserInput<'a> {
	username: &'a str,
	password: &'a str,
	email: Option<&'a str>,
	first_name: Option<&'a str>,
	last_name: Option<&'a str>,
	role: UserRole,
}

/// Returns the user with that username, creating it first if needed.
async fn ensure_user(db: &dyn Database, input: NewUserInput<'_>) -> anyhow::Result<(User, bool)> {
	if let Some(user) = db.user_by_username(input.username).await? {
		return Ok((user, false));
	}

	let password = input.password.to_owned();
	let password_hash = tokio::task::spawn_blocking(move || User::hash_password(&password))
		.await?
		.map_err(|err| anyhow::anyhow!("failed to hash password: {err}"))?;

	let user = db
		.create_user(NewUser {
			username: input.username.to_owned(),
			email: input.email.map(str::to_owned),
			password_hash,
			first_name: input.first_name.map(str::to_owned),
			last_name: input.last_name.map(str::to_owned),
			role: input.role,
			is_active: true,
		})
		.await
		.with_context(|| format!("failed to create user {}", input.username))?;

	Ok((user, true))
}

/// Makes sure the configured admin account exists. An existing user of that
/// name is left untouched.
pub async fn ensure_admin(db: &dyn Database, config: &BootstrapAdminConfig) -> anyhow::Result<User> {
	User::validate_username(&config.username).map_err(|err| anyhow::anyhow!("bootstrap_admin.username: {err}"))?;
	User::validate_password(&config.password).map_err(|err| anyhow::anyhow!("bootstrap_admin.password: {err}"))?;

	let (user, created) = ensure_user(
		db,
		NewUserInput {
			username: &config.username,
			password: &config.password,
			email: config.email.as_deref(),
			first_name: None,
			last_name: None,
			role: UserRole::Admin,
		},
	)
	.await?;

	if created {
		tracing::info!(user_id = %user.id, username = %user.username, "bootstrap admin created");
	} else if !user.is_admin() {
		tracing::warn!(username = %user.username, "bootstrap admin username belongs to a non-admin user");
	}

	Ok(user)
}
