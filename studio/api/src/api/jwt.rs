use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::JwtConfig;

/// The session token handed out by login. Carries nothing but the user id
/// and its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthJwtPayload {
	pub user_id: Uuid,
	pub issued_at: DateTime<Utc>,
	pub expiration: DateTime<Utc>,
}

impl AuthJwtPayload {
	/// Returns `None` when the configured lifetime cannot be represented.
	pub fn new(user_id: Uuid, config: &JwtConfig) -> Option<Self> {
		let issued_at = Utc::now();
		let lifetime = Duration::try_seconds(i64::try_from(config.expiry).ok()?)?;

		Some(Self {
			user_id,
			issued_at,
			expiration: issued_at.checked_add_signed(lifetime)?,
		})
	}
}

pub trait JwtState: Sized {
	fn to_claims(&self) -> Claims;

	fn from_claims(claims: &Claims) -> Option<Self>;

	fn serialize(&self, config: &JwtConfig) -> Option<String> {
		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let mut claims = self.to_claims();

		claims.registered.issuer = Some(config.issuer.clone());

		if claims.registered.issued_at.is_none() {
			claims.registered.issued_at = Some(Utc::now().timestamp() as u64);
		}

		claims.sign_with_key(&key).ok()
	}

	fn verify(config: &JwtConfig, token: &str) -> Option<Self> {
		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let token: Token<Header, Claims, _> = token.verify_with_key(&key).ok()?;

		let claims = token.claims();

		if claims.registered.issuer.as_ref() != Some(&config.issuer) {
			return None;
		}

		let now = Utc::now();

		let iat = timestamp(claims.registered.issued_at?)?;
		if iat > now {
			return None;
		}

		if let Some(nbf) = claims.registered.not_before.and_then(timestamp) {
			if nbf > now {
				return None;
			}
		}

		if let Some(exp) = claims.registered.expiration.and_then(timestamp) {
			if exp <= now {
				return None;
			}
		}

		Self::from_claims(claims)
	}
}

fn timestamp(secs: u64) -> Option<DateTime<Utc>> {
	Utc.timestamp_opt(i64::try_from(secs).ok()?, 0).single()
}

impl JwtState for AuthJwtPayload {
	fn to_claims(&self) -> Claims {
		Claims {
			registered: RegisteredClaims {
				issuer: None,
				subject: Some(self.user_id.to_string()),
				audience: None,
				expiration: Some(self.expiration.timestamp() as u64),
				not_before: None,
				issued_at: Some(self.issued_at.timestamp() as u64),
				json_web_token_id: None,
			},
			private: Default::default(),
		}
	}

	fn from_claims(claims: &Claims) -> Option<Self> {
		Some(Self {
			user_id: claims.registered.subject.as_ref().and_then(|x| Uuid::parse_str(x).ok())?,
			issued_at: timestamp(claims.registered.issued_at?)?,
			// Tokens without an expiry are never accepted.
			expiration: timestamp(claims.registered.expiration?)?,
		})
	}
}
