// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test helpers for in-memory SQLite pools.
//!
//! Intended for use from `#[cfg(test)]` modules in this workspace. Each
//! helper creates exactly the tables a repository needs so tests stay fast
//! and independent.

use sqlx::sqlite::SqlitePool;

/// Create an in-memory SQLite pool for tests.
pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect("sqlite::memory:")
		.await
		.expect("Failed to create test pool")
}

/// Create the users table.
pub async fn create_users_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE users (
			id TEXT PRIMARY KEY,
			username TEXT NOT NULL UNIQUE,
			email TEXT NOT NULL UNIQUE,
			fullname TEXT NOT NULL,
			password TEXT NOT NULL,
			state TEXT NOT NULL,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.expect("Failed to create users table");
}

/// Create the organizations and org_memberships tables.
pub async fn create_orgs_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE organizations (
			id TEXT PRIMARY KEY,
			name TEXT NOT NULL UNIQUE,
			title TEXT NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.expect("Failed to create organizations table");

	sqlx::query(
		r#"
		CREATE TABLE org_memberships (
			id TEXT PRIMARY KEY,
			org_id TEXT NOT NULL,
			user_id TEXT NOT NULL,
			role TEXT NOT NULL,
			provisioned_by TEXT,
			created_at TEXT NOT NULL,
			UNIQUE(org_id, user_id)
		)
		"#,
	)
	.execute(pool)
	.await
	.expect("Failed to create org_memberships table");
}

/// Create every table the provisioning flow touches.
pub async fn create_all_tables(pool: &SqlitePool) {
	create_users_table(pool).await;
	create_orgs_table(pool).await;
}
