// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization repository for database operations.
//!
//! Memberships carry a `(org_id, user_id)` unique constraint and a
//! `provisioned_by` provenance column. Enrollment uses an idempotent upsert:
//! re-adding an existing member is a no-op, not an error.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use stile_auth::{MembershipId, OrgId, OrgMembership, OrgRole, Organization, UserId};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait OrgStore: Send + Sync {
	async fn create_org(&self, org: &Organization) -> Result<(), DbError>;
	async fn get_org_by_id(&self, id: &OrgId) -> Result<Option<Organization>, DbError>;
	async fn get_org_by_name(&self, name: &str) -> Result<Option<Organization>, DbError>;
	async fn add_member(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role: OrgRole,
		provisioned_by: Option<&str>,
	) -> Result<(), DbError>;
	async fn get_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
	) -> Result<Option<OrgMembership>, DbError>;
	async fn list_members(&self, org_id: &OrgId) -> Result<Vec<OrgMembership>, DbError>;
}

/// Repository for organization database operations.
#[derive(Clone)]
pub struct OrgRepository {
	pool: SqlitePool,
}

impl OrgRepository {
	/// Create a new repository with the given connection pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new organization.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if an organization with this name exists.
	#[tracing::instrument(skip(self, org), fields(org_id = %org.id, name = %org.name))]
	pub async fn create_org(&self, org: &Organization) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			INSERT INTO organizations (id, name, title, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(org.id.to_string())
		.bind(&org.name)
		.bind(&org.title)
		.bind(org.created_at.to_rfc3339())
		.execute(&self.pool)
		.await;

		match result {
			Ok(_) => Ok(()),
			Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(DbError::Conflict(
				format!("organization '{}' already exists", org.name),
			)),
			Err(e) => Err(e.into()),
		}
	}

	/// Get an organization by ID.
	#[tracing::instrument(skip(self), fields(org_id = %id))]
	pub async fn get_org_by_id(&self, id: &OrgId) -> Result<Option<Organization>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, title, created_at
			FROM organizations
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_org(&r)).transpose()
	}

	/// Get an organization by its unique name.
	///
	/// The enrollment path resolves the configured target organization through
	/// this lookup; a miss means enrollment is skipped, never that an
	/// organization gets created.
	#[tracing::instrument(skip(self), fields(name = %name))]
	pub async fn get_org_by_name(&self, name: &str) -> Result<Option<Organization>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, title, created_at
			FROM organizations
			WHERE name = ?
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_org(&r)).transpose()
	}

	/// Add a user to an organization, recording who provisioned the membership.
	///
	/// Idempotent: if the membership already exists the insert is a no-op and
	/// the existing row (including its role) is left untouched.
	#[tracing::instrument(skip(self), fields(org_id = %org_id, user_id = %user_id, role = %role))]
	pub async fn add_member(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role: OrgRole,
		provisioned_by: Option<&str>,
	) -> Result<(), DbError> {
		let membership_id = MembershipId::generate();
		let now = Utc::now().to_rfc3339();

		sqlx::query(
			r#"
			INSERT INTO org_memberships (id, org_id, user_id, role, provisioned_by, created_at)
			VALUES (?, ?, ?, ?, ?, ?)
			ON CONFLICT(org_id, user_id) DO NOTHING
			"#,
		)
		.bind(membership_id.to_string())
		.bind(org_id.to_string())
		.bind(user_id.to_string())
		.bind(role.to_string())
		.bind(provisioned_by)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		tracing::debug!(org_id = %org_id, user_id = %user_id, "membership ensured");
		Ok(())
	}

	/// Get a user's membership in an organization, if any.
	#[tracing::instrument(skip(self), fields(org_id = %org_id, user_id = %user_id))]
	pub async fn get_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
	) -> Result<Option<OrgMembership>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT org_id, user_id, role, provisioned_by, created_at
			FROM org_memberships
			WHERE org_id = ? AND user_id = ?
			"#,
		)
		.bind(org_id.to_string())
		.bind(user_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_membership(&r)).transpose()
	}

	/// List all memberships in an organization.
	#[tracing::instrument(skip(self), fields(org_id = %org_id))]
	pub async fn list_members(&self, org_id: &OrgId) -> Result<Vec<OrgMembership>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT org_id, user_id, role, provisioned_by, created_at
			FROM org_memberships
			WHERE org_id = ?
			ORDER BY created_at
			"#,
		)
		.bind(org_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows
			.iter()
			.map(|r| self.row_to_membership(r))
			.collect::<Result<Vec<_>, _>>()
	}

	fn row_to_org(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Organization, DbError> {
		let id_str: String = row.get("id");
		let created_at: String = row.get("created_at");

		let id =
			Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid org ID: {e}")))?;

		Ok(Organization {
			id: OrgId::new(id),
			name: row.get("name"),
			title: row.get("title"),
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
		})
	}

	fn row_to_membership(&self, row: &sqlx::sqlite::SqliteRow) -> Result<OrgMembership, DbError> {
		let org_id_str: String = row.get("org_id");
		let user_id_str: String = row.get("user_id");
		let role_str: String = row.get("role");
		let created_at: String = row.get("created_at");

		let org_id = Uuid::parse_str(&org_id_str)
			.map_err(|e| DbError::Internal(format!("Invalid org ID: {e}")))?;
		let user_id = Uuid::parse_str(&user_id_str)
			.map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;
		let role = role_str
			.parse::<OrgRole>()
			.map_err(|e| DbError::Internal(e.to_string()))?;

		Ok(OrgMembership {
			org_id: OrgId::new(org_id),
			user_id: UserId::new(user_id),
			role,
			provisioned_by: row.get("provisioned_by"),
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[async_trait]
impl OrgStore for OrgRepository {
	async fn create_org(&self, org: &Organization) -> Result<(), DbError> {
		self.create_org(org).await
	}

	async fn get_org_by_id(&self, id: &OrgId) -> Result<Option<Organization>, DbError> {
		self.get_org_by_id(id).await
	}

	async fn get_org_by_name(&self, name: &str) -> Result<Option<Organization>, DbError> {
		self.get_org_by_name(name).await
	}

	async fn add_member(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role: OrgRole,
		provisioned_by: Option<&str>,
	) -> Result<(), DbError> {
		self.add_member(org_id, user_id, role, provisioned_by).await
	}

	async fn get_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
	) -> Result<Option<OrgMembership>, DbError> {
		self.get_membership(org_id, user_id).await
	}

	async fn list_members(&self, org_id: &OrgId) -> Result<Vec<OrgMembership>, DbError> {
		self.list_members(org_id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_orgs_table, create_test_pool};

	async fn make_repo() -> OrgRepository {
		let pool = create_test_pool().await;
		create_orgs_table(&pool).await;
		OrgRepository::new(pool)
	}

	fn make_org(name: &str) -> Organization {
		Organization {
			id: OrgId::generate(),
			name: name.to_string(),
			title: name.to_string(),
			created_at: Utc::now(),
		}
	}

	#[tokio::test]
	async fn create_and_get_by_name() {
		let repo = make_repo().await;
		let org = make_org("scion");
		repo.create_org(&org).await.unwrap();

		let fetched = repo.get_org_by_name("scion").await.unwrap().unwrap();
		assert_eq!(fetched.id, org.id);
		assert_eq!(fetched.name, "scion");
	}

	#[tokio::test]
	async fn get_by_name_misses_for_unknown_org() {
		let repo = make_repo().await;
		assert!(repo.get_org_by_name("missing").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn duplicate_org_name_is_conflict() {
		let repo = make_repo().await;
		repo.create_org(&make_org("scion")).await.unwrap();
		let err = repo.create_org(&make_org("scion")).await.unwrap_err();
		assert!(matches!(err, DbError::Conflict(_)));
	}

	#[tokio::test]
	async fn add_member_records_provenance() {
		let repo = make_repo().await;
		let org = make_org("scion");
		repo.create_org(&org).await.unwrap();
		let user_id = UserId::generate();

		repo
			.add_member(&org.id, &user_id, OrgRole::Member, Some("sso"))
			.await
			.unwrap();

		let membership = repo
			.get_membership(&org.id, &user_id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(membership.role, OrgRole::Member);
		assert_eq!(membership.provisioned_by.as_deref(), Some("sso"));
	}

	#[tokio::test]
	async fn add_member_is_idempotent_and_keeps_original_role() {
		let repo = make_repo().await;
		let org = make_org("scion");
		repo.create_org(&org).await.unwrap();
		let user_id = UserId::generate();

		repo
			.add_member(&org.id, &user_id, OrgRole::Member, Some("sso"))
			.await
			.unwrap();
		repo
			.add_member(&org.id, &user_id, OrgRole::Admin, Some("sso"))
			.await
			.unwrap();

		let membership = repo
			.get_membership(&org.id, &user_id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(membership.role, OrgRole::Member);

		let members = repo.list_members(&org.id).await.unwrap();
		assert_eq!(members.len(), 1);
	}

	#[tokio::test]
	async fn get_membership_misses_for_non_member() {
		let repo = make_repo().await;
		let org = make_org("scion");
		repo.create_org(&org).await.unwrap();

		let membership = repo
			.get_membership(&org.id, &UserId::generate())
			.await
			.unwrap();
		assert!(membership.is_none());
	}

	#[tokio::test]
	async fn list_members_returns_all_memberships() {
		let repo = make_repo().await;
		let org = make_org("scion");
		repo.create_org(&org).await.unwrap();

		for _ in 0..3 {
			repo
				.add_member(&org.id, &UserId::generate(), OrgRole::Member, Some("sso"))
				.await
				.unwrap();
		}

		assert_eq!(repo.list_members(&org.id).await.unwrap().len(), 3);
	}
}
