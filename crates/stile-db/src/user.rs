// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository for database operations.
//!
//! This module provides database access for locally provisioned accounts.
//! Both `email` and `username` carry unique constraints; the repository maps
//! unique-constraint violations to [`DbError::Conflict`] so callers can treat
//! "already exists" as a signal rather than a failure.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use stile_auth::{username_base_from_email, validate_username, User, UserId, UserState};
use stile_common_secret::SecretString;
use uuid::Uuid;

use crate::error::DbError;

/// Maximum number of suffixed candidates probed when deriving a unique
/// username. Past this the search fails with [`DbError::NamespaceExhausted`].
pub const USERNAME_SUFFIX_CAP: u32 = 1000;

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(&self, user: &User) -> Result<(), DbError>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;
	async fn is_username_available(&self, username: &str) -> Result<bool, DbError>;
	async fn generate_unique_username(&self, base: &str) -> Result<String, DbError>;
	async fn count_users(&self) -> Result<i64, DbError>;
}

/// Repository for user database operations.
///
/// All user IDs are UUIDs stored as strings in SQLite; timestamps are
/// RFC 3339 strings.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given connection pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new user.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the email or username is already taken;
	/// other insert failures surface as `DbError::Sqlx`.
	///
	/// # Database Constraints
	/// - `id`, `username`, and `email` must each be unique
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id, username = %user.username))]
	pub async fn create_user(&self, user: &User) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			INSERT INTO users (id, username, email, fullname, password, state, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.username)
		.bind(&user.email)
		.bind(&user.fullname)
		.bind(user.password.expose())
		.bind(user.state.to_string())
		.bind(user.created_at.to_rfc3339())
		.bind(user.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await;

		match result {
			Ok(_) => {
				tracing::debug!(user_id = %user.id, "user created");
				Ok(())
			}
			Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(DbError::Conflict(
				format!("user with this email or username already exists: {db}"),
			)),
			Err(e) => Err(e.into()),
		}
	}

	/// Get a user by ID.
	///
	/// # Returns
	/// `None` if no user exists with this ID.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, username, email, fullname, password, state, created_at, updated_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_user(&r)).transpose()
	}

	/// Get a user by email address.
	///
	/// This is the idempotence lookup for the provisioning flow: a hit means
	/// the principal already has a local account.
	///
	/// # Returns
	/// `None` if no user exists with this email.
	#[tracing::instrument(skip(self, email))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, username, email, fullname, password, state, created_at, updated_at
			FROM users
			WHERE email = ?
			"#,
		)
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_user(&r)).transpose()
	}

	/// Get a user by username.
	#[tracing::instrument(skip(self), fields(username = %username))]
	pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, username, email, fullname, password, state, created_at, updated_at
			FROM users
			WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_user(&r)).transpose()
	}

	/// Check whether a username is free.
	#[tracing::instrument(skip(self), fields(username = %username))]
	pub async fn is_username_available(&self, username: &str) -> Result<bool, DbError> {
		let row: (i64,) = sqlx::query_as(
			r#"
			SELECT COUNT(*) FROM users WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_one(&self.pool)
		.await?;

		Ok(row.0 == 0)
	}

	/// Derive a unique username from a base string (typically an email).
	///
	/// Probes the sanitised base first, then `base1`, `base2`, … up to
	/// [`USERNAME_SUFFIX_CAP`], returning the first free name that also
	/// passes [`validate_username`]. A reserved base such as `admin` falls
	/// through to the suffix loop; a base at the length limit is truncated
	/// so the suffix still fits.
	///
	/// # Errors
	/// Returns `DbError::NamespaceExhausted` when every candidate within the
	/// cap is taken.
	#[tracing::instrument(skip(self), fields(base = %base))]
	pub async fn generate_unique_username(&self, base: &str) -> Result<String, DbError> {
		let sanitized = username_base_from_email(base);

		if validate_username(&sanitized).is_ok() && self.is_username_available(&sanitized).await? {
			return Ok(sanitized);
		}

		for i in 1..USERNAME_SUFFIX_CAP {
			let suffix = i.to_string();
			let keep = stile_auth::USERNAME_MAX_LEN - suffix.len();
			// sanitised bases are ASCII, so byte slicing is safe
			let stem = if sanitized.len() > keep {
				&sanitized[..keep]
			} else {
				&sanitized[..]
			};
			let candidate = format!("{}{}", stem, suffix);
			if validate_username(&candidate).is_ok() && self.is_username_available(&candidate).await? {
				return Ok(candidate);
			}
		}

		Err(DbError::NamespaceExhausted(format!(
			"no free username within {} candidates of '{}'",
			USERNAME_SUFFIX_CAP, sanitized
		)))
	}

	/// Count all users.
	#[tracing::instrument(skip(self))]
	pub async fn count_users(&self) -> Result<i64, DbError> {
		let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
			.fetch_one(&self.pool)
			.await?;
		Ok(row.0)
	}

	fn row_to_user(&self, row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
		let id_str: String = row.get("id");
		let state_str: String = row.get("state");
		let password: String = row.get("password");
		let created_at: String = row.get("created_at");
		let updated_at: String = row.get("updated_at");

		let id =
			Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;
		let state = state_str
			.parse::<UserState>()
			.map_err(|_| DbError::Internal(format!("Invalid user state '{state_str}'")))?;

		Ok(User {
			id: UserId::new(id),
			username: row.get("username"),
			email: row.get("email"),
			fullname: row.get("fullname"),
			password: SecretString::new(password),
			state,
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
			updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at)
				.map_err(|e| DbError::Internal(format!("Invalid updated_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[async_trait]
impl UserStore for UserRepository {
	async fn create_user(&self, user: &User) -> Result<(), DbError> {
		self.create_user(user).await
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.get_user_by_id(id).await
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_email(email).await
	}

	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_username(username).await
	}

	async fn is_username_available(&self, username: &str) -> Result<bool, DbError> {
		self.is_username_available(username).await
	}

	async fn generate_unique_username(&self, base: &str) -> Result<String, DbError> {
		self.generate_unique_username(base).await
	}

	async fn count_users(&self) -> Result<i64, DbError> {
		self.count_users().await
	}
}
