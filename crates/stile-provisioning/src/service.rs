// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use chrono::Utc;
use stile_auth::{generate_password_placeholder, User, UserId, UserState};
use stile_config::ProvisioningConfig;
use stile_db::{OrgRepository, UserRepository};

use crate::error::ProvisioningError;
use crate::request::ProvisioningRequest;

/// Result type for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisioningError>;

/// Outcome of resolving a provisioning request to a local account.
#[derive(Debug, Clone)]
pub struct ProvisionedUser {
	pub user: User,
	/// True when this call created the account, false when an account with
	/// the same email already existed.
	pub created: bool,
}

/// Service for provisioning users and enrolling them in the default org.
///
/// This is the single code path for account creation from SSO assertions:
/// - If a user with the email exists, it is returned untouched
/// - Otherwise an active account is created with a derived unique username
/// - Newly created accounts can then be enrolled in the configured
///   organization via [`ensure_default_membership`](Self::ensure_default_membership)
#[derive(Clone)]
pub struct ProvisioningService {
	user_repo: Arc<UserRepository>,
	org_repo: Arc<OrgRepository>,
	config: ProvisioningConfig,
}

impl ProvisioningService {
	/// Create a new provisioning service.
	pub fn new(
		user_repo: Arc<UserRepository>,
		org_repo: Arc<OrgRepository>,
		config: ProvisioningConfig,
	) -> Self {
		Self {
			user_repo,
			org_repo,
			config,
		}
	}

	/// Configured target organization name.
	pub fn default_org(&self) -> &str {
		&self.config.default_org
	}

	/// Configured enrollment role.
	pub fn default_role(&self) -> stile_auth::OrgRole {
		self.config.default_role
	}

	/// Resolve a request to a local account, creating one if absent.
	///
	/// Lookup is by email. Creation derives a username from the email's local
	/// part, probing numeric suffixes until a free one is found. A concurrent
	/// create racing this call is absorbed: the unique-constraint violation is
	/// treated as "already exists" and the winner's row is returned.
	#[tracing::instrument(skip(self, request), fields(email = %request.email, source = %request.source))]
	pub async fn provision_user(&self, request: &ProvisioningRequest) -> Result<ProvisionedUser> {
		if request.email.is_empty() {
			return Err(ProvisioningError::MissingEmail);
		}

		if let Some(user) = self.user_repo.get_user_by_email(&request.email).await? {
			tracing::info!(user_id = %user.id, "user already exists, skipping creation");
			return Ok(ProvisionedUser {
				user,
				created: false,
			});
		}

		match self.create_new_user(request).await {
			Ok(user) => Ok(ProvisionedUser {
				user,
				created: true,
			}),
			Err(ProvisioningError::Database(e)) if e.is_unique_violation() => {
				// Lost a race with a concurrent provision of the same email.
				let user = self
					.user_repo
					.get_user_by_email(&request.email)
					.await?
					.ok_or(ProvisioningError::Database(e))?;
				tracing::debug!(user_id = %user.id, "concurrent create won the race");
				Ok(ProvisionedUser {
					user,
					created: false,
				})
			}
			Err(e) => Err(e),
		}
	}

	/// Create a new active account from the request.
	async fn create_new_user(&self, request: &ProvisioningRequest) -> Result<User> {
		let now = Utc::now();
		let username = self
			.user_repo
			.generate_unique_username(&request.email)
			.await?;

		let user = User {
			id: UserId::generate(),
			username,
			email: request.email.clone(),
			fullname: request.fullname(),
			// Random placeholder; the account authenticates via SSO only.
			password: generate_password_placeholder(),
			state: UserState::Active,
			created_at: now,
			updated_at: now,
		};

		self.user_repo.create_user(&user).await?;

		tracing::info!(
			user_id = %user.id,
			username = %user.username,
			email = %request.email,
			source = %request.source,
			"created new user"
		);

		Ok(user)
	}

	/// Ensure the user is a member of the configured default organization.
	///
	/// The organization must already exist; a missing org is a typed error,
	/// never an implicit create. Enrollment is idempotent and records the
	/// request source as provenance.
	#[tracing::instrument(skip(self, request), fields(user_id = %user.id, org = %self.config.default_org))]
	pub async fn ensure_default_membership(
		&self,
		user: &User,
		request: &ProvisioningRequest,
	) -> Result<()> {
		let org = self
			.org_repo
			.get_org_by_name(&self.config.default_org)
			.await?
			.ok_or_else(|| {
				ProvisioningError::OrganizationNotFound(self.config.default_org.clone())
			})?;

		if let Some(_existing) = self.org_repo.get_membership(&org.id, &user.id).await? {
			tracing::debug!(user_id = %user.id, org_id = %org.id, "membership already exists");
			return Ok(());
		}

		let provisioned_by = request.source.to_string();
		self
			.org_repo
			.add_member(
				&org.id,
				&user.id,
				self.config.default_role,
				Some(&provisioned_by),
			)
			.await?;

		tracing::info!(
			user_id = %user.id,
			org_id = %org.id,
			role = %self.config.default_role,
			provisioned_by = %provisioned_by,
			"enrolled user in default org"
		);
		Ok(())
	}
}
