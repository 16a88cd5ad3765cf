#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
	#[error("unique constraint violated: {0}")]
	UniqueViolation(String),
	#[error("foreign key constraint violated: {0}")]
	ForeignKeyViolation(String),
	#[error("sqlx: {0}")]
	Sqlx(sqlx::Error),
	#[error("migrate: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for DatabaseError {
	fn from(err: sqlx::Error) -> Self {
		if let Some(db_err) = err.as_database_error() {
			let constraint = db_err.constraint().unwrap_or_default().to_owned();

			if db_err.is_unique_violation() {
				return Self::UniqueViolation(constraint);
			}

			if db_err.is_foreign_key_violation() {
				return Self::ForeignKeyViolation(constraint);
			}
		}

		Self::Sqlx(err)
	}
}
