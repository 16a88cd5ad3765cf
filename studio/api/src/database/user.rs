use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
	Admin,
	Operator,
	#[default]
	Viewer,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// The unique identifier for the user.
	pub id: Uuid,
	/// The login name, matched case-sensitively.
	pub username: String,
	pub email: Option<String>,
	/// The hashed password of the user. (argon2)
	#[serde(skip_serializing)]
	pub password_hash: String,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub role: UserRole,
	/// Inactive users can neither log in nor use existing tokens.
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// The subset of a user returned alongside a fresh token.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
	pub id: Uuid,
	pub username: String,
	pub email: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub role: UserRole,
}

impl From<&User> for PublicUser {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			username: user.username.clone(),
			email: user.email.clone(),
			first_name: user.first_name.clone(),
			last_name: user.last_name.clone(),
			role: user.role,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
	pub username: String,
	pub email: Option<String>,
	pub password_hash: String,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub role: UserRole,
	pub is_active: bool,
}

/// Fields left as `None` are unchanged. The nested options of nullable
/// columns distinguish "clear" (`Some(None)`) from "keep" (`None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
	pub username: Option<String>,
	pub email: Option<Option<String>>,
	pub password_hash: Option<String>,
	pub first_name: Option<Option<String>>,
	pub last_name: Option<Option<String>>,
	pub role: Option<UserRole>,
	pub is_active: Option<bool>,
}

impl UserUpdate {
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}
}

impl User {
	pub fn is_admin(&self) -> bool {
		self.role == UserRole::Admin
	}

	/// Uses argon2 to verify the password hash against the provided password.
	pub fn verify_password(&self, password: &str) -> bool {
		verify_hash(&self.password_hash, password)
	}

	/// Generates a new password hash using argon2.
	pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
		let salt = SaltString::generate(&mut OsRng);

		Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
	}

	/// Validates a username.
	pub fn validate_username(username: &str) -> Result<(), &'static str> {
		if username.len() < 3 {
			return Err("Username must be at least 3 characters long");
		}

		if username.len() > 50 {
			return Err("Username must be at most 50 characters long");
		}

		if !username
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
		{
			return Err("Username may only contain letters, digits, '_', '.' and '-'");
		}

		Ok(())
	}

	/// Validates a password.
	pub fn validate_password(password: &str) -> Result<(), &'static str> {
		if password.chars().count() < 8 {
			return Err("Password must be at least 8 characters long");
		}

		if password.chars().count() > 100 {
			return Err("Password must be at most 100 characters long");
		}

		Ok(())
	}

	/// Validates an email.
	pub fn validate_email(email: &str) -> Result<(), &'static str> {
		if email.len() > 100 {
			return Err("Email must be at most 100 characters long");
		}

		if !email_address::EmailAddress::is_valid(email) {
			return Err("Invalid email address");
		}

		Ok(())
	}

	/// Validates a first or last name.
	pub fn validate_name(name: &str) -> Result<(), &'static str> {
		if name.chars().count() > 50 {
			return Err("Names must be at most 50 characters long");
		}

		Ok(())
	}
}

pub(crate) fn verify_hash(hash: &str, password: &str) -> bool {
	let hash = match PasswordHash::new(hash) {
		Ok(hash) => hash,
		Err(err) => {
			tracing::error!("failed to parse password hash: {}", err);
			return false;
		}
	};

	Argon2::default().verify_password(password.as_bytes(), &hash).is_ok()
}
