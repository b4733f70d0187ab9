// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous};
use std::str::FromStr;

use crate::error::DbError;

/// Open the provisioning database, creating the file if missing.
///
/// WAL journal mode keeps concurrent identify callbacks from blocking each
/// other on writes. Foreign keys are enabled because membership rows
/// reference users and organizations.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./stile.db")
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid; connection failures
/// surface as `DbError::Sqlx`.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn creates_database_file_and_accepts_queries() {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}/stile.db", dir.path().display());

		let pool = create_pool(&url).await.unwrap();
		crate::testing::create_all_tables(&pool).await;

		let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(count.0, 0);
		assert!(dir.path().join("stile.db").exists());
	}

	#[tokio::test]
	async fn rejects_malformed_url() {
		let err = create_pool("not-a-database-url://x").await.unwrap_err();
		assert!(matches!(err, DbError::Internal(_)));
	}
}
