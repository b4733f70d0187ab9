// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Username namespace exhausted: {0}")]
	NamespaceExhausted(String),

	#[error("Internal: {0}")]
	Internal(String),
}

impl DbError {
	/// Returns true if the underlying cause is a unique-constraint violation.
	///
	/// Callers use this to treat "already exists" as a benign signal instead
	/// of an error, closing the read-then-create race at the store boundary.
	pub fn is_unique_violation(&self) -> bool {
		match self {
			DbError::Conflict(_) => true,
			DbError::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, DbError>;
